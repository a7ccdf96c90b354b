use crate::player::PhysicsConfig;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PlaybackConfig {
    /// MMD motions are authored at 30 frames per second.
    pub fps: f32,
    pub loop_playback: bool,
    pub playback_rate: f64,
    pub use_physics: bool,
    pub physics: PhysicsConfig,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            fps: 30.0,
            loop_playback: false,
            playback_rate: 1.0,
            use_physics: true,
            physics: PhysicsConfig::default(),
        }
    }
}
