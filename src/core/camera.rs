//! Player camera: world position plus facing and field of view in degrees.
//! The update phase mutates it once per frame; the renderer only reads it.

#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub x: f64,
    pub y: f64,
    pub facing_deg: f64,
    pub fov_deg: f64,
}

impl Camera {
    pub fn new(x: f64, y: f64, facing_deg: f64, fov_deg: f64) -> Self {
        Self {
            x,
            y,
            facing_deg,
            fov_deg,
        }
    }

    pub fn at_spawn(spawn: (f64, f64), fov_deg: f64) -> Self {
        Self::new(spawn.0, spawn.1, 0.0, fov_deg)
    }

    /// Unit facing vector.
    pub fn direction(&self) -> (f64, f64) {
        let rad = self.facing_deg.to_radians();
        (rad.cos(), rad.sin())
    }

    pub fn advance(&mut self, distance: f64) {
        let (dx, dy) = self.direction();
        self.x += dx * distance;
        self.y += dy * distance;
    }

    pub fn strafe(&mut self, distance: f64) {
        let rad = (self.facing_deg + 90.0).to_radians();
        self.x += rad.cos() * distance;
        self.y += rad.sin() * distance;
    }

    pub fn turn(&mut self, degrees: f64) {
        self.facing_deg = wrap_degrees(self.facing_deg + degrees);
    }
}

/// Wraps an angle into (-180, 180].
pub fn wrap_degrees(deg: f64) -> f64 {
    let mut a = deg % 360.0;
    if a > 180.0 {
        a -= 360.0;
    } else if a <= -180.0 {
        a += 360.0;
    }
    a
}
