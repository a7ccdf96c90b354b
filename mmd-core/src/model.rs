mod mmd_camera;
mod mmd_model;

pub use mmd_camera::*;
pub use mmd_model::*;
