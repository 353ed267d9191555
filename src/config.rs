//! Render configuration, built once at startup and passed by reference into
//! the caster, projector and compositor.

/// What a map query outside the defined grid reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryPolicy {
    /// Out-of-bounds cells are open. The map simply ends; nothing stops a
    /// walker from leaving it.
    Open,
    /// Out-of-bounds cells count as an implicit wall.
    Solid,
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub screen_width: u32,
    pub screen_height: u32,
    pub fov_deg: f64,
    /// Size of one map cell in world units.
    pub tile_size: f64,
    pub wall_height: f64,
    pub max_render_distance: f64,
    /// Number of columns to cast. Normally equal to `screen_width`.
    pub num_rays: u32,
    pub boundary: BoundaryPolicy,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            screen_width: 1000,
            screen_height: 700,
            fov_deg: 60.0,
            tile_size: 64.0,
            wall_height: 64.0,
            max_render_distance: 1000.0,
            num_rays: 1000,
            boundary: BoundaryPolicy::Open,
        }
    }
}

impl RenderConfig {
    pub fn half_fov_rad(&self) -> f64 {
        (self.fov_deg * 0.5).to_radians()
    }

    /// Distance from the eye to the projection plane, in pixels.
    pub fn screen_dist(&self) -> f64 {
        (self.screen_width as f64 * 0.5) / self.half_fov_rad().tan()
    }

    /// Horizon line: vertical center of the screen.
    pub fn horizon(&self) -> f64 {
        self.screen_height as f64 * 0.5
    }
}
