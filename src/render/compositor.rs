//! Frame composition: one ordered draw list per frame.
//!
//! Order matters and is the whole depth story: background first, wall
//! columns left to right, then sprites farthest-first so nearer billboards
//! overdraw farther ones (painter's algorithm, no sprite depth buffer).
//! The rasterizer must submit the list as given.

use tracing::warn;

use crate::config::RenderConfig;
use crate::core::camera::Camera;
use crate::core::entity::Sprite;
use crate::core::map::MapModel;
use crate::render::caster;
use crate::render::projector;

/// A draw primitive for the external rasterizer.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Flat fill above the horizon.
    Sky,
    /// Flat fill below the horizon.
    Floor,
    /// Textured vertical strip, one screen column wide.
    WallStrip {
        screen_x: u32,
        top_y: f64,
        bottom_y: f64,
        texture: char,
        u: f64,
    },
    /// Camera-facing textured quad.
    SpriteQuad {
        screen_x: f64,
        screen_y: f64,
        half_width: f64,
        half_height: f64,
        texture: char,
    },
}

/// Texture availability check, so the compositor can drop unrenderable
/// sprites instead of handing the rasterizer a dangling key.
pub trait TextureLookup {
    fn has_texture(&self, key: char) -> bool;
}

/// Builds the draw list for one frame.
pub fn compose(
    config: &RenderConfig,
    camera: &Camera,
    map: &MapModel,
    sprites: &[Sprite],
    textures: &impl TextureLookup,
) -> Vec<DrawCommand> {
    let mut commands = Vec::with_capacity(config.num_rays as usize + sprites.len() + 2);
    commands.push(DrawCommand::Sky);
    commands.push(DrawCommand::Floor);

    // Wall columns, left to right across the field of view.
    let num_rays = config.num_rays.max(1);
    let origin = (camera.x, camera.y);
    for column in 0..num_rays {
        let t = if num_rays > 1 {
            column as f64 / (num_rays - 1) as f64
        } else {
            0.5
        };
        let offset = -camera.fov_deg * 0.5 + camera.fov_deg * t;
        let ray_angle = camera.facing_deg + offset;
        let Some(hit) = caster::cast(config, map, origin, ray_angle, offset) else {
            continue; // background shows through
        };
        let slice = projector::wall_slice(config, hit.distance);
        commands.push(DrawCommand::WallStrip {
            screen_x: column,
            top_y: slice.top_y,
            bottom_y: slice.bottom_y,
            texture: hit.texture,
            u: hit.texture_u,
        });
    }

    // Sprites, farthest first.
    let mut by_distance: Vec<(f64, &Sprite)> = sprites
        .iter()
        .map(|s| ((s.x - camera.x).hypot(s.y - camera.y), s))
        .collect();
    by_distance.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    for (_, sprite) in by_distance {
        if !textures.has_texture(sprite.texture) {
            warn!(texture = %sprite.texture, "skipping sprite with no loadable texture");
            continue;
        }
        let Some(p) =
            projector::project_sprite(config, camera, sprite.x, sprite.y, sprite.half_size)
        else {
            continue; // outside the frustum
        };
        commands.push(DrawCommand::SpriteQuad {
            screen_x: p.screen_x,
            screen_y: p.screen_y,
            half_width: p.half_width,
            half_height: p.half_height,
            texture: sprite.texture,
        });
    }

    commands
}
