//! Rendering pipeline: ray casting, projection, frame composition, and the
//! CPU rasterizer that executes the resulting draw list.

pub mod caster;
pub mod compositor;
pub mod framebuffer;
pub mod projector;
pub mod textures;
