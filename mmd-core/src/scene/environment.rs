use super::EntityTable;
use crate::{config::PlaybackConfig, EnvironmentError};
use log::info;
use mmd_math::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Vec3,
    pub near: f32,
    pub far: f32,
}

impl Fog {
    /// Fog factor at `distance`, `0` before `near` and `1` past `far`.
    pub fn factor(&self, distance: f32) -> f32 {
        if self.far <= self.near {
            return if distance < self.near { 0.0 } else { 1.0 };
        }

        ((distance - self.near) / (self.far - self.near)).clamp(0.0, 1.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub fog: Option<Fog>,
    pub playback: PlaybackConfig,
}

/// Scene-wide state: fog, playback defaults and the entity table.
#[derive(Debug)]
pub struct SceneEnvironment {
    fog: Option<Fog>,
    playback: PlaybackConfig,
    entities: EntityTable,
}

impl SceneEnvironment {
    pub fn fog(&self) -> Option<&Fog> {
        self.fog.as_ref()
    }

    pub fn set_fog(&mut self, fog: Option<Fog>) {
        self.fog = fog;
    }

    pub fn playback(&self) -> &PlaybackConfig {
        &self.playback
    }

    pub fn entities(&self) -> &EntityTable {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut EntityTable {
        &mut self.entities
    }
}

/// Hands out the scene environment at most once.
#[derive(Debug, Default)]
pub struct SceneEnvironmentFactory {
    is_created: bool,
}

impl SceneEnvironmentFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, config: EnvironmentConfig) -> Result<SceneEnvironment, EnvironmentError> {
        if self.is_created {
            return Err(EnvironmentError::AlreadyCreated);
        }

        self.is_created = true;
        info!(
            "scene environment created at {} fps; fog {}",
            config.playback.fps,
            if config.fog.is_some() { "on" } else { "off" }
        );

        Ok(SceneEnvironment {
            fog: config.fog,
            playback: config.playback,
            entities: EntityTable::new(),
        })
    }
}
