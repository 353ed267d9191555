//! Per-frame movement glue for the demo binary. The renderer never sees
//! raw input, only the camera snapshot this produces.

use raylib::prelude::*;

use crate::core::camera::Camera;
use crate::core::map::MapModel;

const WALK_SPEED: f64 = 150.0;
const SPRINT_SPEED: f64 = 260.0;
const TURN_SPEED_DEG: f64 = 100.0;
const PLAYER_RADIUS: f64 = 12.0;

/// The player circle must not penetrate walls; sample the center plus a
/// ring of eight points around it.
fn is_free_with_radius(map: &MapModel, wx: f64, wy: f64, r: f64) -> bool {
    let d = r * std::f64::consts::FRAC_1_SQRT_2;
    let samples = [
        (wx, wy),
        (wx + r, wy),
        (wx - r, wy),
        (wx, wy + r),
        (wx, wy - r),
        (wx + d, wy + d),
        (wx - d, wy + d),
        (wx + d, wy - d),
        (wx - d, wy - d),
    ];
    samples.iter().all(|&(sx, sy)| !map.is_solid(sx, sy))
}

/// Applies held movement/turn keys to the camera, collision-checked per
/// axis so the player slides along walls.
pub fn process_events(rl: &RaylibHandle, camera: &mut Camera, map: &MapModel) {
    let dt = rl.get_frame_time() as f64;

    let mut turn = 0.0;
    if rl.is_key_down(KeyboardKey::KEY_LEFT) {
        turn -= 1.0;
    }
    if rl.is_key_down(KeyboardKey::KEY_RIGHT) {
        turn += 1.0;
    }
    camera.turn(turn * TURN_SPEED_DEG * dt);

    let speed = if rl.is_key_down(KeyboardKey::KEY_LEFT_SHIFT) {
        SPRINT_SPEED
    } else {
        WALK_SPEED
    };
    let mut forward = 0.0;
    if rl.is_key_down(KeyboardKey::KEY_W) || rl.is_key_down(KeyboardKey::KEY_UP) {
        forward += 1.0;
    }
    if rl.is_key_down(KeyboardKey::KEY_S) || rl.is_key_down(KeyboardKey::KEY_DOWN) {
        forward -= 1.0;
    }
    let mut strafe = 0.0;
    if rl.is_key_down(KeyboardKey::KEY_D) {
        strafe += 1.0;
    }
    if rl.is_key_down(KeyboardKey::KEY_A) {
        strafe -= 1.0;
    }
    if forward == 0.0 && strafe == 0.0 {
        return;
    }

    let facing = camera.facing_deg.to_radians();
    let side = (camera.facing_deg + 90.0).to_radians();
    let step = speed * dt;
    let dx = (facing.cos() * forward + side.cos() * strafe) * step;
    let dy = (facing.sin() * forward + side.sin() * strafe) * step;

    if is_free_with_radius(map, camera.x + dx, camera.y, PLAYER_RADIUS) {
        camera.x += dx;
    }
    if is_free_with_radius(map, camera.x, camera.y + dy, PLAYER_RADIUS) {
        camera.y += dy;
    }
}
