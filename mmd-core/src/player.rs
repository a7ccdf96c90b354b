mod animation_sequence_player;
mod frame_player;
mod mmd_camera_player;
mod mmd_model_player;
mod physics;

pub use animation_sequence_player::*;
pub use frame_player::*;
pub use mmd_camera_player::*;
pub use mmd_model_player::*;
pub use physics::*;
