//! Screen-space projection of ray hits and billboards.

use crate::config::RenderConfig;
use crate::core::camera::{Camera, wrap_degrees};

/// Distance below which geometry counts as coincident with the camera.
const MIN_PROJECT_DISTANCE: f64 = 0.01;

/// Vertical on-screen interval of one wall column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallSlice {
    pub top_y: f64,
    pub bottom_y: f64,
}

impl WallSlice {
    pub fn height(&self) -> f64 {
        self.bottom_y - self.top_y
    }
}

/// Height in pixels of a wall at the given perpendicular distance.
pub fn slice_height(config: &RenderConfig, corrected_distance: f64) -> f64 {
    let screen_h = config.screen_height as f64;
    if corrected_distance <= MIN_PROJECT_DISTANCE {
        return screen_h;
    }
    (config.wall_height / corrected_distance) * (screen_h / (2.0 * config.half_fov_rad().tan()))
}

/// Wall slice centered on the horizon. The interval may extend past the
/// screen for close walls; the rasterizer clips when drawing.
pub fn wall_slice(config: &RenderConfig, corrected_distance: f64) -> WallSlice {
    let half = slice_height(config, corrected_distance) * 0.5;
    let mid = config.horizon();
    WallSlice {
        top_y: mid - half,
        bottom_y: mid + half,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteProjection {
    pub screen_x: f64,
    pub screen_y: f64,
    pub half_width: f64,
    pub half_height: f64,
    pub distance: f64,
}

/// Projects a world-space billboard onto the screen. `None` means the
/// sprite sits outside the camera frustum and is not drawn.
pub fn project_sprite(
    config: &RenderConfig,
    camera: &Camera,
    x: f64,
    y: f64,
    half_size: f64,
) -> Option<SpriteProjection> {
    let dx = x - camera.x;
    let dy = y - camera.y;
    let distance = dx.hypot(dy);

    let bearing = dy.atan2(dx).to_degrees();
    let delta = wrap_degrees(bearing - camera.facing_deg);
    if delta.abs() > camera.fov_deg * 0.5 {
        return None;
    }

    let screen_dist = config.screen_dist();
    let screen_x = config.screen_width as f64 * 0.5 + delta.to_radians().tan() * screen_dist;

    // A camera standing on top of a sprite would otherwise divide by
    // (nearly) zero; clamp to a full-screen billboard instead.
    let screen_h = config.screen_height as f64;
    let size = if distance > MIN_PROJECT_DISTANCE {
        ((half_size * 2.0 / distance) * screen_dist).min(screen_h)
    } else {
        screen_h
    };

    Some(SpriteProjection {
        screen_x,
        screen_y: config.horizon(),
        half_width: size * 0.5,
        half_height: size * 0.5,
        distance,
    })
}
