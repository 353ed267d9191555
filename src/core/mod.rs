//! World-side types: camera, map model, entities, and input glue.

pub mod camera;
pub mod entity;
pub mod input;
pub mod map;
