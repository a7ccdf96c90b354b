mod mmd_material_morph_controller;
mod mmd_morph_controller;
mod mmd_parameter_controller;

pub use mmd_material_morph_controller::*;
pub use mmd_morph_controller::*;
pub use mmd_parameter_controller::*;
