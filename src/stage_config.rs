use anyhow::{Context, Error as AnyError};
use mmd_core::{config::PlaybackConfig, scene::Fog};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Description of a stage to play: which models dance to which motions, and for how long.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StageConfig {
    pub models: Vec<StageModel>,
    pub camera_animation: Option<String>,
    /// Drives playback from a simulated audio clock when present.
    pub audio: Option<AudioConfig>,
    /// Seconds to play.
    pub duration: f64,
    /// Host ticks per second.
    pub tick_rate: f64,
    pub playback: PlaybackConfig,
    pub fog: Option<Fog>,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            models: Vec::new(),
            camera_animation: None,
            audio: None,
            duration: 10.0,
            tick_rate: 60.0,
            playback: PlaybackConfig::default(),
            fog: None,
        }
    }
}

impl StageConfig {
    pub fn load(path: &Path) -> Result<Self, AnyError> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read the stage config `{}`", path.display()))?;
        let config = serde_json::from_str(&content).with_context(|| {
            format!("failed to parse the stage config `{}`", path.display())
        })?;

        Ok(config)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StageModel {
    pub model: String,
    pub animation: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AudioConfig {
    /// Granularity of the reported audio position, in seconds.
    pub resolution: f64,
}
