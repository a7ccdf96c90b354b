use crate::model::MmdModel;
use mmd_math::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Fixed simulation step in seconds.
    pub unit_step: f32,
    /// Maximum simulation steps per tick; time beyond that is dropped.
    pub max_step_num: u32,
    pub gravity: Vec3,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            unit_step: 1.0 / 65.0,
            max_step_num: 3,
            gravity: Vec3::new(0.0, -98.0, 0.0),
        }
    }
}

/// Rigid body simulation of one model.
pub trait PhysicsStepper {
    /// Advances the simulation by `delta` seconds and writes the result back to the model.
    fn step(&mut self, model: &mut MmdModel, delta: f32);
    /// Snaps rigid bodies back onto the current pose.
    fn reset(&mut self, model: &mut MmdModel);
}

/// Creates a stepper for each model that has rigid bodies.
pub trait PhysicsBackend {
    fn create_stepper(&mut self, model: &MmdModel, config: &PhysicsConfig)
        -> Box<dyn PhysicsStepper>;
}

/// Splits variable tick lengths into fixed simulation steps.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    unit_step: f32,
    max_step_num: u32,
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(config: &PhysicsConfig) -> Self {
        Self {
            unit_step: config.unit_step,
            max_step_num: config.max_step_num,
            accumulator: 0.0,
        }
    }

    pub fn unit_step(&self) -> f32 {
        self.unit_step
    }

    /// Number of unit steps to run for this tick.
    pub fn steps(&mut self, delta: f32) -> u32 {
        if self.unit_step <= 0.0 || delta <= 0.0 {
            return 0;
        }

        self.accumulator += delta;

        let steps = (self.accumulator / self.unit_step).floor() as u32;
        self.accumulator -= steps as f32 * self.unit_step;

        if self.max_step_num < steps {
            self.accumulator = 0.0;
            self.max_step_num
        } else {
            steps
        }
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_timestep_accumulates() {
        let mut timestep = FixedTimestep::new(&PhysicsConfig {
            unit_step: 0.25,
            max_step_num: 3,
            gravity: Vec3::ZERO,
        });

        assert_eq!(timestep.steps(0.125), 0);
        assert_eq!(timestep.steps(0.125), 1);
        assert_eq!(timestep.steps(0.5), 2);
    }

    #[test]
    fn test_fixed_timestep_caps_steps() {
        let mut timestep = FixedTimestep::new(&PhysicsConfig {
            unit_step: 0.25,
            max_step_num: 3,
            gravity: Vec3::ZERO,
        });

        assert_eq!(timestep.steps(2.0), 3);
        assert_eq!(timestep.steps(0.125), 0);
        assert_eq!(timestep.steps(0.0), 0);
    }

    #[test]
    fn test_physics_config_defaults() {
        let config: PhysicsConfig = serde_json::from_str("{\"max_step_num\": 5}").unwrap();

        assert_eq!(config.max_step_num, 5);
        assert_eq!(config.unit_step, 1.0 / 65.0);
        assert_eq!(config.gravity, Vec3::new(0.0, -98.0, 0.0));
    }
}
