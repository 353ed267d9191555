//! Per-column ray casting.
//!
//! The grid variant walks cell boundaries with DDA; the segment variant
//! intersects the ray against every wall segment analytically. Either way
//! the reported distance is the perpendicular distance from the camera
//! plane (ray length scaled by the cosine of the view-angle offset), which
//! is what keeps a flat projection plane free of fisheye warping.

use crate::config::RenderConfig;
use crate::core::map::{Cell, DEFAULT_WALL, MapModel, OccupancyGrid, SegmentMap};

/// Which face orientation the ray crossed. Used for shading and to pick the
/// texture axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallSide {
    /// A vertical grid line (east/west face).
    X,
    /// A horizontal grid line (north/south face).
    Y,
}

/// Per-column hit result, recomputed every frame and never persisted.
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    /// Perpendicular distance from the camera plane, world units. Zero only
    /// when the ray origin sits inside a solid cell, or flush against one
    /// it is heading into.
    pub distance: f64,
    pub side: WallSide,
    /// Fractional intersection position along the hit face, in [0,1).
    pub texture_u: f64,
    pub texture: char,
}

/// Casts one ray and returns the nearest wall hit, or `None` when nothing
/// solid lies within `max_render_distance`.
///
/// `view_offset_deg` is the angle between this ray and the camera's central
/// axis; it drives the fisheye correction.
pub fn cast(
    config: &RenderConfig,
    map: &MapModel,
    origin: (f64, f64),
    ray_angle_deg: f64,
    view_offset_deg: f64,
) -> Option<RayHit> {
    match map {
        MapModel::Grid(grid) => cast_grid(config, grid, origin, ray_angle_deg, view_offset_deg),
        MapModel::Segments(segs) => {
            cast_segments(config, segs, origin, ray_angle_deg, view_offset_deg)
        }
    }
}

fn cast_grid(
    config: &RenderConfig,
    grid: &OccupancyGrid,
    origin: (f64, f64),
    ray_angle_deg: f64,
    view_offset_deg: f64,
) -> Option<RayHit> {
    let rad = ray_angle_deg.to_radians();
    let (dir_x, dir_y) = (rad.cos(), rad.sin());
    let correction = view_offset_deg.to_radians().cos();
    let tile = grid.tile_size();

    // Everything below runs in cell space; distances scale back by `tile`.
    let ox = origin.0 / tile;
    let oy = origin.1 / tile;
    let mut cx = ox.floor() as i64;
    let mut cy = oy.floor() as i64;

    if let Cell::Wall(texture) = grid.cell(cx, cy) {
        // Origin already inside a wall: report it rather than skipping, or
        // the column would show whatever lies behind the wall.
        return Some(RayHit {
            distance: 0.0,
            side: WallSide::X,
            texture_u: 0.0,
            texture,
        });
    }

    // Axis-parallel rays never cross the perpendicular axis; an infinite
    // step keeps them out of the comparison instead of dividing by zero.
    let delta_x = if dir_x == 0.0 {
        f64::INFINITY
    } else {
        (1.0 / dir_x).abs()
    };
    let delta_y = if dir_y == 0.0 {
        f64::INFINITY
    } else {
        (1.0 / dir_y).abs()
    };

    let step_x: i64 = if dir_x < 0.0 { -1 } else { 1 };
    let step_y: i64 = if dir_y < 0.0 { -1 } else { 1 };
    let mut side_x = if dir_x < 0.0 {
        (ox - cx as f64) * delta_x
    } else {
        (cx as f64 + 1.0 - ox) * delta_x
    };
    let mut side_y = if dir_y < 0.0 {
        (oy - cy as f64) * delta_y
    } else {
        (cy as f64 + 1.0 - oy) * delta_y
    };

    // An origin exactly on a cell face heading into the neighbor crosses it
    // at zero length. Resolve that cell up front so the loop only ever
    // reports strictly positive crossings.
    if side_x == 0.0 {
        cx += step_x;
        side_x = delta_x;
        if let Cell::Wall(texture) = grid.cell(cx, cy) {
            return Some(RayHit {
                distance: 0.0,
                side: WallSide::X,
                texture_u: 0.0,
                texture,
            });
        }
    }
    if side_y == 0.0 {
        cy += step_y;
        side_y = delta_y;
        if let Cell::Wall(texture) = grid.cell(cx, cy) {
            return Some(RayHit {
                distance: 0.0,
                side: WallSide::Y,
                texture_u: 0.0,
                texture,
            });
        }
    }

    let max_cells = config.max_render_distance / tile;
    loop {
        let (crossing, side) = if side_x < side_y {
            cx += step_x;
            let c = side_x;
            side_x += delta_x;
            (c, WallSide::X)
        } else {
            cy += step_y;
            let c = side_y;
            side_y += delta_y;
            (c, WallSide::Y)
        };

        if crossing > max_cells {
            return None;
        }

        if let Cell::Wall(texture) = grid.cell(cx, cy) {
            let hit_x = ox + dir_x * crossing;
            let hit_y = oy + dir_y * crossing;
            let texture_u = match side {
                WallSide::X => hit_y.rem_euclid(1.0),
                WallSide::Y => hit_x.rem_euclid(1.0),
            };
            return Some(RayHit {
                distance: crossing * tile * correction,
                side,
                texture_u,
                texture,
            });
        }
    }
}

fn cast_segments(
    config: &RenderConfig,
    map: &SegmentMap,
    origin: (f64, f64),
    ray_angle_deg: f64,
    view_offset_deg: f64,
) -> Option<RayHit> {
    let rad = ray_angle_deg.to_radians();
    let (dir_x, dir_y) = (rad.cos(), rad.sin());
    let correction = view_offset_deg.to_radians().cos();
    let (ox, oy) = origin;

    if map.is_solid(ox, oy) {
        return Some(RayHit {
            distance: 0.0,
            side: WallSide::X,
            texture_u: 0.0,
            texture: DEFAULT_WALL,
        });
    }

    let mut best: Option<(f64, f64, &crate::core::map::Segment)> = None;
    for seg in map.segments() {
        let ex = seg.x2 - seg.x1;
        let ey = seg.y2 - seg.y1;
        let denom = dir_x * ey - dir_y * ex;
        if denom.abs() < f64::EPSILON {
            continue; // parallel to the segment
        }
        let wx = seg.x1 - ox;
        let wy = seg.y1 - oy;
        let t = (wx * ey - wy * ex) / denom;
        let s = (wx * dir_y - wy * dir_x) / denom;
        if t <= 0.0 || !(0.0..=1.0).contains(&s) {
            continue;
        }
        if t > config.max_render_distance {
            continue;
        }
        if best.map(|(bt, _, _)| t < bt).unwrap_or(true) {
            best = Some((t, s, seg));
        }
    }

    best.map(|(t, s, seg)| {
        let side = if (seg.x2 - seg.x1).abs() >= (seg.y2 - seg.y1).abs() {
            WallSide::Y
        } else {
            WallSide::X
        };
        RayHit {
            distance: t * correction,
            side,
            texture_u: s.rem_euclid(1.0),
            texture: seg.texture,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoundaryPolicy;
    use crate::core::map::SegmentMap;
    use crate::wad::{LevelGeometry, Linedef, Vertex};

    const TILE: f64 = 64.0;

    fn config() -> RenderConfig {
        RenderConfig::default()
    }

    /// 5x5 open interior bordered by walls (7x7 cells overall).
    fn bordered_room() -> MapModel {
        let text = "#######\n\
                    #.....#\n\
                    #.....#\n\
                    #..P..#\n\
                    #.....#\n\
                    #.....#\n\
                    #######";
        MapModel::Grid(OccupancyGrid::from_text(text, &config()))
    }

    fn center() -> (f64, f64) {
        (3.5 * TILE, 3.5 * TILE)
    }

    #[test]
    fn center_ray_hits_right_border_at_expected_distance() {
        let map = bordered_room();
        let hit = cast(&config(), &map, center(), 0.0, 0.0).unwrap();
        assert!((hit.distance - 2.5 * TILE).abs() < 1e-6);
        assert_eq!(hit.side, WallSide::X);
    }

    #[test]
    fn downward_ray_crosses_horizontal_face() {
        let map = bordered_room();
        let hit = cast(&config(), &map, center(), 90.0, 0.0).unwrap();
        assert!((hit.distance - 2.5 * TILE).abs() < 1e-6);
        assert_eq!(hit.side, WallSide::Y);
    }

    #[test]
    fn view_offset_shortens_reported_distance() {
        let map = bordered_room();
        let straight = cast(&config(), &map, center(), 0.0, 0.0).unwrap();
        let offset = cast(&config(), &map, center(), 0.0, 60.0).unwrap();
        assert!((offset.distance - straight.distance * 0.5).abs() < 1e-6);
    }

    #[test]
    fn origin_inside_wall_reports_zero_distance() {
        let map = bordered_room();
        let hit = cast(&config(), &map, (0.5 * TILE, 0.5 * TILE), 0.0, 0.0).unwrap();
        assert_eq!(hit.distance, 0.0);
    }

    #[test]
    fn origin_flush_against_wall_face_reports_zero_distance() {
        let map = bordered_room();
        // Exactly on the face shared by open cell (1,3) and wall cell (0,3),
        // heading into the wall.
        let hit = cast(&config(), &map, (1.0 * TILE, 3.5 * TILE), 180.0, 0.0).unwrap();
        assert_eq!(hit.distance, 0.0);
        assert_eq!(hit.texture_u, 0.0);
        assert_eq!(hit.side, WallSide::X);
    }

    #[test]
    fn origin_on_open_cell_face_keeps_walking() {
        let map = bordered_room();
        // On the face between two open cells; the wall is still a full cell
        // away, so the distance must not collapse to zero.
        let hit = cast(&config(), &map, (2.0 * TILE, 3.5 * TILE), 180.0, 0.0).unwrap();
        assert!((hit.distance - 1.0 * TILE).abs() < 1e-6);
    }

    #[test]
    fn no_wall_within_range_is_none() {
        let cfg = RenderConfig {
            max_render_distance: 100.0,
            ..RenderConfig::default()
        };
        let map = bordered_room();
        // Nearest wall along this ray is 2.5 tiles = 160 world units away.
        assert!(cast(&cfg, &map, center(), 0.0, 0.0).is_none());
    }

    #[test]
    fn open_boundary_lets_rays_escape() {
        let map = MapModel::Grid(OccupancyGrid::from_text("...\n.P.\n...", &config()));
        for angle in [0.0, 33.0, 90.0, 180.0, 271.5] {
            assert!(cast(&config(), &map, (1.5 * TILE, 1.5 * TILE), angle, 0.0).is_none());
        }
    }

    #[test]
    fn solid_boundary_stops_every_ray() {
        let cfg = RenderConfig {
            boundary: BoundaryPolicy::Solid,
            ..RenderConfig::default()
        };
        let map = MapModel::Grid(OccupancyGrid::from_text("...\n.P.\n...", &cfg));
        for angle in [0.0, 45.0, 133.7, 270.0] {
            let hit = cast(&cfg, &map, (1.5 * TILE, 1.5 * TILE), angle, 0.0).unwrap();
            assert!(hit.distance > 0.0);
        }
    }

    #[test]
    fn hits_stay_within_limits_across_angles() {
        let map = bordered_room();
        let cfg = config();
        let mut angle = 0.0;
        while angle < 360.0 {
            if let Some(hit) = cast(&cfg, &map, center(), angle, 0.0) {
                assert!(hit.distance > 0.0);
                assert!(hit.distance <= cfg.max_render_distance);
                assert!((0.0..1.0).contains(&hit.texture_u));
            } else {
                panic!("bordered room should stop every ray (angle {angle})");
            }
            angle += 7.3;
        }
    }

    #[test]
    fn axis_parallel_rays_are_safe() {
        let map = bordered_room();
        // At 0 degrees dir_y is exactly zero, so the vertical step must be
        // the inf sentinel rather than a division blow-up.
        assert!(cast(&config(), &map, center(), 0.0, 0.0).is_some());
        assert!(cast(&config(), &map, center(), 180.0, 0.0).is_some());
    }

    #[test]
    fn segment_map_ray_hits_nearest_wall() {
        let geometry = LevelGeometry {
            vertices: vec![
                Vertex { x: 0, y: 0 },
                Vertex { x: 200, y: 0 },
                Vertex { x: 200, y: 200 },
                Vertex { x: 0, y: 200 },
            ],
            linedefs: vec![
                Linedef { start: 0, end: 1 },
                Linedef { start: 1, end: 2 },
                Linedef { start: 2, end: 3 },
                Linedef { start: 3, end: 0 },
            ],
        };
        let map = MapModel::Segments(SegmentMap::from_geometry(&geometry));
        let hit = cast(&config(), &map, (100.0, 100.0), 0.0, 0.0).unwrap();
        assert!((hit.distance - 100.0).abs() < 1e-6);
        assert_eq!(hit.side, WallSide::X);
        assert!((hit.texture_u - 0.5).abs() < 1e-6);
    }
}
