//! CPU-side texture storage.
//!
//! Pixmaps are keyed by the same single characters the map grid uses, so a
//! wall cell's char is directly its texture id. Image files are loaded from
//! `assets/` when present; every known key falls back to a procedural
//! pixmap so the renderer always has something to sample.

use std::collections::HashMap;

use raylib::prelude::*;
use tracing::debug;

use crate::render::compositor::TextureLookup;

/// Immutable CPU pixmap, sampled per pixel with wraparound.
#[derive(Clone)]
struct Pixmap {
    w: u32,
    h: u32,
    px: Vec<Color>,
}

impl Pixmap {
    fn new(w: u32, h: u32, px: Vec<Color>) -> Self {
        Self { w, h, px }
    }

    #[inline]
    fn sample(&self, x: u32, y: u32) -> Color {
        let xi = (x % self.w) as usize;
        let yi = (y % self.h) as usize;
        self.px[yi * self.w as usize + xi]
    }
}

pub struct TextureManager {
    maps: HashMap<char, Pixmap>,
}

/// Sky and ground keys used by the background fills.
pub const SKY_KEY: char = 'K';
pub const GROUND_KEY: char = 'G';

impl TextureManager {
    pub fn new() -> Self {
        let mut tm = Self {
            maps: HashMap::new(),
        };

        let candidates: &[(&str, char)] = &[
            ("assets/wall1.png", '1'),
            ("assets/wall2.png", '2'),
            ("assets/wall3.png", '3'),
            ("assets/wall4.png", '4'),
            ("assets/wall1.png", '#'),
            ("assets/sky.png", SKY_KEY),
            ("assets/ground.png", GROUND_KEY),
            ("assets/enemy.png", 'N'),
            ("assets/orb.png", 'o'),
        ];
        for (path, key) in candidates {
            if tm.maps.contains_key(key) {
                continue;
            }
            if let Ok(img) = Image::load_image(path) {
                let w = img.width().max(1) as u32;
                let h = img.height().max(1) as u32;
                let data = img.get_image_data().to_vec();
                debug!(path, key = %key, "loaded texture");
                tm.maps.insert(*key, Pixmap::new(w, h, data));
            }
        }

        let fallbacks: &[char] = &[
            SKY_KEY, GROUND_KEY, '#', '+', '-', '|', '1', '2', '3', '4', 'N', 'o',
        ];
        for &k in fallbacks {
            if tm.maps.contains_key(&k) {
                continue;
            }
            let pm = match k {
                SKY_KEY => Self::make_gradient(256, 128, Color::new(12, 16, 26, 255), Color::new(20, 28, 44, 255)),
                GROUND_KEY => Self::make_checker(128, 128, Color::new(48, 48, 52, 255)),
                'N' => Self::make_blob(64, 64, Color::new(255, 120, 120, 255)),
                'o' => Self::make_blob(64, 64, Color::new(255, 240, 80, 255)),
                _ => Self::make_checker(64, 64, Self::color_from_char(k)),
            };
            tm.maps.insert(k, pm);
        }

        tm
    }

    fn color_from_char(c: char) -> Color {
        let k = c as u32;
        let r = ((k * 97) % 200 + 40) as u8;
        let g = ((k * 57) % 200 + 40) as u8;
        let b = ((k * 31) % 200 + 40) as u8;
        Color::new(r, g, b, 255)
    }

    fn make_gradient(w: u32, h: u32, top: Color, bottom: Color) -> Pixmap {
        let mut px = vec![Color::BLACK; (w * h) as usize];
        for y in 0..h {
            let t = (y * 255 / h.max(1)) as u8;
            let col = Self::mix(top, bottom, t);
            for x in 0..w {
                px[(y * w + x) as usize] = col;
            }
        }
        Pixmap::new(w, h, px)
    }

    fn make_checker(w: u32, h: u32, base: Color) -> Pixmap {
        let mut px = vec![base; (w * h) as usize];
        let cell = 8u32;
        for y in 0..h {
            for x in 0..w {
                if ((x / cell) + (y / cell)) % 2 == 0 {
                    let i = (y * w + x) as usize;
                    px[i] = Self::mix(px[i], Color::WHITE, 24);
                }
            }
        }
        Pixmap::new(w, h, px)
    }

    /// Round billboard blob on a transparent background.
    fn make_blob(w: u32, h: u32, body: Color) -> Pixmap {
        let mut px = vec![Color::new(0, 0, 0, 0); (w * h) as usize];
        let cx = w as f32 * 0.5;
        let cy = h as f32 * 0.5;
        let r = w.min(h) as f32 * 0.4;
        for y in 0..h {
            for x in 0..w {
                let dx = x as f32 - cx;
                let dy = y as f32 - cy;
                let d = (dx * dx + dy * dy).sqrt();
                if d <= r {
                    let i = (y * w + x) as usize;
                    let t = (1.0 - d / r).clamp(0.0, 1.0);
                    px[i] = Self::mix(body, Color::WHITE, (t * 180.0) as u8);
                    px[i].a = 255;
                }
            }
        }
        Pixmap::new(w, h, px)
    }

    #[inline]
    fn mix(a: Color, b: Color, t: u8) -> Color {
        let ta = t as u16;
        let na = 255u16 - ta;
        let mixc = |x: u8, y: u8| -> u8 { ((x as u16 * na + y as u16 * ta) / 255) as u8 };
        Color::new(mixc(a.r, b.r), mixc(a.g, b.g), mixc(a.b, b.b), mixc(a.a, b.a))
    }

    /// Sample by key; white if the key is unknown.
    pub fn get_pixel_color(&self, key: char, tx: u32, ty: u32) -> Color {
        if let Some(pm) = self.maps.get(&key) {
            return pm.sample(tx, ty);
        }
        Color::WHITE
    }

    pub fn image_size(&self, key: char) -> Option<(u32, u32)> {
        self.maps.get(&key).map(|p| (p.w, p.h))
    }
}

impl Default for TextureManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureLookup for TextureManager {
    fn has_texture(&self, key: char) -> bool {
        self.maps.contains_key(&key)
    }
}
