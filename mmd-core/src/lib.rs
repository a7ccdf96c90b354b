pub mod animation;
pub mod clock;
pub mod config;
pub mod error;
pub mod loader;
pub mod material;
pub mod model;
pub mod morph;
pub mod perf;
pub mod player;
pub mod scene;

pub use error::*;
