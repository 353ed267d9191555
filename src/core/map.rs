//! In-memory map model.
//!
//! Two interchangeable representations behind one surface: a character-grid
//! occupancy map loaded from text, and a vertex/linedef segment map loaded
//! from the binary container. Both are built once at level load and stay
//! read-only while rendering; a reload replaces the whole value.

use std::path::Path;

use tracing::warn;

use crate::config::{BoundaryPolicy, RenderConfig};
use crate::error::LevelError;
use crate::wad::LevelGeometry;

/// Wall texture key used when a cell or segment has no explicit one.
pub const DEFAULT_WALL: char = '#';
const SPAWN_MARKER: char = 'P';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Open,
    /// Solid cell; the char keys its wall texture.
    Wall(char),
}

impl Cell {
    pub fn is_wall(self) -> bool {
        matches!(self, Cell::Wall(_))
    }
}

/// One wall segment resolved to world-space endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub texture: char,
}

#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    cells: Vec<Cell>,
    width: usize,
    height: usize,
    tile_size: f64,
    boundary: BoundaryPolicy,
    spawn: (f64, f64),
}

impl OccupancyGrid {
    /// Builds a grid from newline-delimited rows of single-character cells.
    ///
    /// `#`, `+`, `-`, `|` and `1`..`4` are walls keyed by their character;
    /// space and `.` are open; `P` marks the spawn cell and is stored as
    /// open. Anything else is treated as open space so newer map authoring
    /// characters load instead of failing. Short rows are padded with open
    /// cells to keep the grid rectangular.
    pub fn from_text(text: &str, config: &RenderConfig) -> Self {
        let rows: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let height = rows.len();

        let mut cells = vec![Cell::Open; width * height];
        let mut spawn = None;
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                cells[y * width + x] = match ch {
                    '#' | '+' | '-' | '|' | '1'..='4' => Cell::Wall(ch),
                    SPAWN_MARKER => {
                        spawn = Some((
                            (x as f64 + 0.5) * config.tile_size,
                            (y as f64 + 0.5) * config.tile_size,
                        ));
                        Cell::Open
                    }
                    _ => Cell::Open,
                };
            }
        }

        let spawn = spawn.unwrap_or_else(|| {
            warn!("map has no spawn marker '{SPAWN_MARKER}', defaulting to cell (0,0)");
            (0.5 * config.tile_size, 0.5 * config.tile_size)
        });
        if width == 0 {
            warn!("map text is empty");
        }

        Self {
            cells,
            width,
            height,
            tile_size: config.tile_size,
            boundary: config.boundary,
            spawn,
        }
    }

    pub fn from_file(path: impl AsRef<Path>, config: &RenderConfig) -> Result<Self, LevelError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_text(&text, config))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tile_size(&self) -> f64 {
        self.tile_size
    }

    /// Cell at grid coordinates; out-of-bounds resolves through the boundary
    /// policy instead of reading memory.
    pub fn cell(&self, cx: i64, cy: i64) -> Cell {
        if cx < 0 || cy < 0 || cx as usize >= self.width || cy as usize >= self.height {
            return match self.boundary {
                BoundaryPolicy::Open => Cell::Open,
                BoundaryPolicy::Solid => Cell::Wall(DEFAULT_WALL),
            };
        }
        self.cells[cy as usize * self.width + cx as usize]
    }

    pub fn is_wall_at(&self, cx: i64, cy: i64) -> bool {
        self.cell(cx, cy).is_wall()
    }

    pub fn is_solid(&self, x: f64, y: f64) -> bool {
        let cx = (x / self.tile_size).floor() as i64;
        let cy = (y / self.tile_size).floor() as i64;
        self.is_wall_at(cx, cy)
    }

    pub fn spawn(&self) -> (f64, f64) {
        self.spawn
    }

    /// Boundary edges of every wall cell, in world units.
    pub fn wall_segments(&self) -> Vec<Segment> {
        let mut segments = Vec::new();
        let t = self.tile_size;
        for cy in 0..self.height {
            for cx in 0..self.width {
                let Cell::Wall(texture) = self.cells[cy * self.width + cx] else {
                    continue;
                };
                let (x0, y0) = (cx as f64 * t, cy as f64 * t);
                let (x1, y1) = (x0 + t, y0 + t);
                let edge = |ax, ay, bx, by| Segment {
                    x1: ax,
                    y1: ay,
                    x2: bx,
                    y2: by,
                    texture,
                };
                segments.push(edge(x0, y0, x1, y0));
                segments.push(edge(x1, y0, x1, y1));
                segments.push(edge(x1, y1, x0, y1));
                segments.push(edge(x0, y1, x0, y0));
            }
        }
        segments
    }
}

/// Map built from binary-container geometry. There is no grid here: walls
/// are arbitrary segments and point solidity is a crossing-parity test.
#[derive(Debug, Clone)]
pub struct SegmentMap {
    segments: Vec<Segment>,
    spawn: (f64, f64),
}

impl SegmentMap {
    pub fn from_geometry(geometry: &LevelGeometry) -> Self {
        let segments = geometry
            .linedefs
            .iter()
            .map(|ld| {
                // Indices were validated by the reader.
                let a = geometry.vertices[ld.start as usize];
                let b = geometry.vertices[ld.end as usize];
                Segment {
                    x1: a.x as f64,
                    y1: a.y as f64,
                    x2: b.x as f64,
                    y2: b.y as f64,
                    texture: DEFAULT_WALL,
                }
            })
            .collect();
        let spawn = bounds_center(&geometry.vertices);
        warn!(
            x = spawn.0,
            y = spawn.1,
            "segment map carries no spawn point, defaulting to bounds center"
        );
        Self { segments, spawn }
    }

    /// Even-odd crossing parity against the wall set. Walls enclose the
    /// playable area, so a point whose rightward ray crosses an even number
    /// of segments lies outside it and counts as solid.
    pub fn is_solid(&self, x: f64, y: f64) -> bool {
        let mut crossings = 0usize;
        for s in &self.segments {
            if (s.y1 > y) == (s.y2 > y) {
                continue;
            }
            let t = (y - s.y1) / (s.y2 - s.y1);
            let ix = s.x1 + t * (s.x2 - s.x1);
            if ix > x {
                crossings += 1;
            }
        }
        crossings % 2 == 0
    }

    pub fn spawn(&self) -> (f64, f64) {
        self.spawn
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

fn bounds_center(vertices: &[crate::wad::Vertex]) -> (f64, f64) {
    if vertices.is_empty() {
        return (0.0, 0.0);
    }
    let (mut min_x, mut max_x) = (f64::MAX, f64::MIN);
    let (mut min_y, mut max_y) = (f64::MAX, f64::MIN);
    for v in vertices {
        min_x = min_x.min(v.x as f64);
        max_x = max_x.max(v.x as f64);
        min_y = min_y.min(v.y as f64);
        max_y = max_y.max(v.y as f64);
    }
    ((min_x + max_x) * 0.5, (min_y + max_y) * 0.5)
}

/// The level geometry the renderer reads, in either representation.
#[derive(Debug, Clone)]
pub enum MapModel {
    Grid(OccupancyGrid),
    Segments(SegmentMap),
}

impl MapModel {
    pub fn is_solid(&self, x: f64, y: f64) -> bool {
        match self {
            MapModel::Grid(grid) => grid.is_solid(x, y),
            MapModel::Segments(map) => map.is_solid(x, y),
        }
    }

    pub fn wall_segments(&self) -> Vec<Segment> {
        match self {
            MapModel::Grid(grid) => grid.wall_segments(),
            MapModel::Segments(map) => map.segments().to_vec(),
        }
    }

    pub fn spawn(&self) -> (f64, f64) {
        match self {
            MapModel::Grid(grid) => grid.spawn(),
            MapModel::Segments(map) => map.spawn(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wad::{Linedef, Vertex};

    fn config() -> RenderConfig {
        RenderConfig::default()
    }

    #[test]
    fn grid_is_rectangular_with_padded_rows() {
        let grid = OccupancyGrid::from_text("###\n#P\n####", &config());
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        // Padded tail of row 0 is open.
        assert!(!grid.is_wall_at(3, 0));
        assert!(grid.is_wall_at(3, 2));
    }

    #[test]
    fn spawn_marker_becomes_open_and_centers_in_cell() {
        let grid = OccupancyGrid::from_text("###\n#P#\n###", &config());
        assert!(!grid.is_wall_at(1, 1));
        assert_eq!(grid.spawn(), (1.5 * 64.0, 1.5 * 64.0));
    }

    #[test]
    fn missing_spawn_marker_defaults_to_origin_cell() {
        let grid = OccupancyGrid::from_text("##\n##", &config());
        assert_eq!(grid.spawn(), (32.0, 32.0));
    }

    #[test]
    fn unknown_characters_load_as_open_space() {
        let grid = OccupancyGrid::from_text("#?#", &config());
        assert!(!grid.is_wall_at(1, 0));
    }

    #[test]
    fn out_of_bounds_is_open_under_open_policy() {
        let grid = OccupancyGrid::from_text("##\n##", &config());
        for (cx, cy) in [(-1, 0), (0, -1), (2, 0), (0, 2), (-50, 99)] {
            assert!(!grid.is_wall_at(cx, cy), "({cx},{cy}) should not be a wall");
        }
    }

    #[test]
    fn out_of_bounds_is_wall_under_solid_policy() {
        let cfg = RenderConfig {
            boundary: BoundaryPolicy::Solid,
            ..RenderConfig::default()
        };
        let grid = OccupancyGrid::from_text("..\n..", &cfg);
        assert!(grid.is_wall_at(-1, 0));
        assert!(grid.is_wall_at(0, 5));
        assert!(!grid.is_wall_at(1, 1));
    }

    #[test]
    fn wall_cells_enumerate_four_edges() {
        let grid = OccupancyGrid::from_text("#", &config());
        let segments = grid.wall_segments();
        assert_eq!(segments.len(), 4);
        assert!(segments.iter().all(|s| s.texture == '#'));
    }

    fn square_geometry() -> LevelGeometry {
        LevelGeometry {
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
        }
    }

    #[test]
    fn segment_map_resolves_linedefs_to_endpoints() {
        let map = SegmentMap::from_geometry(&square_geometry());
        assert_eq!(map.segments().len(), 4);
        assert_eq!(map.segments()[1].x1, 200.0);
        assert_eq!(map.segments()[1].y2, 200.0);
    }

    #[test]
    fn segment_map_point_solidity_by_parity() {
        let map = SegmentMap::from_geometry(&square_geometry());
        assert!(!map.is_solid(100.0, 100.0), "inside the square is open");
        assert!(map.is_solid(-50.0, 100.0), "outside the square is solid");
        assert!(map.is_solid(300.0, 300.0));
    }

    #[test]
    fn segment_map_spawn_is_bounds_center() {
        let map = SegmentMap::from_geometry(&square_geometry());
        assert_eq!(map.spawn(), (100.0, 100.0));
    }
}
