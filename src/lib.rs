//! A 2.5D raycasting renderer with a binary level-container reader.
//!
//! Level geometry comes from either a character-grid text map or a
//! lump-indexed binary container (WAD layout). Each frame, the compositor
//! casts one DDA ray per screen column, projects the hits and any sprite
//! billboards into screen space, and emits an ordered draw list for the
//! rasterizer.

pub mod config;
pub mod core;
pub mod error;
pub mod render;
pub mod wad;

pub use config::{BoundaryPolicy, RenderConfig};
pub use error::LevelError;
