//! CPU framebuffer and draw-list rasterizer.
//!
//! The compositor hands over an ordered list of draw commands; `execute`
//! rasterizes them in that order, never reordering or culling. Pixels live
//! in a plain `Vec<Color>` that is uploaded to a persistent GPU texture
//! once per frame.

use raylib::core::texture::RaylibTexture2D;
use raylib::prelude::*;

use crate::render::compositor::DrawCommand;
use crate::render::textures::{GROUND_KEY, SKY_KEY, TextureManager};

pub struct Framebuffer {
    pub color_buffer: Vec<Color>,
    pub width: u32,
    pub height: u32,
    pub background_color: Color,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let size = (width * height) as usize;
        let bg = Color::BLACK;
        Self {
            color_buffer: vec![bg; size],
            width,
            height,
            background_color: bg,
        }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.color_buffer.fill(self.background_color);
    }

    #[inline]
    pub fn set_pixel_color(&mut self, x: u32, y: u32, color: Color) {
        if x < self.width && y < self.height {
            self.color_buffer[(y * self.width + x) as usize] = color;
        }
    }

    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Color {
        if x < self.width && y < self.height {
            return self.color_buffer[(y * self.width + x) as usize];
        }
        self.background_color
    }

    /// Rasterizes one frame's draw list in submission order.
    pub fn execute(&mut self, commands: &[DrawCommand], texman: &TextureManager) {
        for command in commands {
            match command {
                DrawCommand::Sky => self.fill_sky(texman),
                DrawCommand::Floor => self.fill_floor(texman),
                DrawCommand::WallStrip {
                    screen_x,
                    top_y,
                    bottom_y,
                    texture,
                    u,
                } => self.draw_wall_strip(texman, *screen_x, *top_y, *bottom_y, *texture, *u),
                DrawCommand::SpriteQuad {
                    screen_x,
                    screen_y,
                    half_width,
                    half_height,
                    texture,
                } => self.draw_sprite_quad(
                    texman,
                    *screen_x,
                    *screen_y,
                    *half_width,
                    *half_height,
                    *texture,
                ),
            }
        }
    }

    fn fill_sky(&mut self, texman: &TextureManager) {
        let hh = self.height / 2;
        let (tw, th) = texman.image_size(SKY_KEY).unwrap_or((64, 64));
        for y in 0..hh {
            let ty = y * th / hh.max(1);
            for x in 0..self.width {
                let tx = x * tw / self.width.max(1);
                let c = texman.get_pixel_color(SKY_KEY, tx, ty);
                self.set_pixel_color(x, y, c);
            }
        }
    }

    fn fill_floor(&mut self, texman: &TextureManager) {
        let hh = self.height / 2;
        let span = (self.height - hh).max(1);
        let (tw, th) = texman.image_size(GROUND_KEY).unwrap_or((64, 64));
        for y in hh..self.height {
            let ty = (y - hh) * th / span;
            for x in 0..self.width {
                let tx = x * tw / self.width.max(1);
                let c = texman.get_pixel_color(GROUND_KEY, tx, ty);
                self.set_pixel_color(x, y, c);
            }
        }
    }

    fn draw_wall_strip(
        &mut self,
        texman: &TextureManager,
        screen_x: u32,
        top_y: f64,
        bottom_y: f64,
        texture: char,
        u: f64,
    ) {
        if screen_x >= self.width || bottom_y <= top_y {
            return;
        }
        let span = bottom_y - top_y;
        let (tw, th) = texman.image_size(texture).unwrap_or((64, 64));
        let tx = ((u * tw as f64) as u32).min(tw - 1);

        let y0 = top_y.max(0.0) as u32;
        let y1 = (bottom_y.min(self.height as f64)).ceil() as u32;
        for y in y0..y1 {
            // v runs over the unclipped slice so close walls do not stretch.
            let v = (y as f64 - top_y) / span;
            let ty = ((v * th as f64) as u32).min(th - 1);
            let c = texman.get_pixel_color(texture, tx, ty);
            self.set_pixel_color(screen_x, y, c);
        }
    }

    fn draw_sprite_quad(
        &mut self,
        texman: &TextureManager,
        screen_x: f64,
        screen_y: f64,
        half_width: f64,
        half_height: f64,
        texture: char,
    ) {
        let left = screen_x - half_width;
        let top = screen_y - half_height;
        let w = half_width * 2.0;
        let h = half_height * 2.0;
        if w < 1.0 || h < 1.0 {
            return;
        }
        let (tw, th) = texman.image_size(texture).unwrap_or((64, 64));

        let x0 = left.max(0.0) as u32;
        let x1 = ((screen_x + half_width).min(self.width as f64)).ceil() as u32;
        let y0 = top.max(0.0) as u32;
        let y1 = ((screen_y + half_height).min(self.height as f64)).ceil() as u32;
        for sx in x0..x1 {
            let tx = ((((sx as f64 - left) / w) * tw as f64) as u32).min(tw - 1);
            for sy in y0..y1 {
                let ty = ((((sy as f64 - top) / h) * th as f64) as u32).min(th - 1);
                let c = texman.get_pixel_color(texture, tx, ty);
                if c.a < 8 {
                    continue; // transparent texel
                }
                self.set_pixel_color(sx, sy, c);
            }
        }
    }

    /// Uploads the pixel buffer to a persistent texture for presentation.
    pub fn upload_to_texture(&self, tex: &mut Texture2D) {
        let byte_len = self.color_buffer.len() * std::mem::size_of::<Color>();
        let bytes: &[u8] = unsafe {
            std::slice::from_raw_parts(self.color_buffer.as_ptr() as *const u8, byte_len)
        };
        let _ = tex.update_texture(bytes);
    }
}
