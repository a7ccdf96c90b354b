use crate::stage_config::StageConfig;
use anyhow::{anyhow, Context, Error as AnyError};
use log::{debug, info, trace};
use mmd_core::{
    CoreError,
    clock::{ClockCalibrator, CoarseClock, WallClock},
    loader::{CameraLoader, LoadKind, ModelLoader, ProgressEvent, ResourceFetcher},
    model::{MmdCamera, MmdModel},
    player::{
        AnimationSequencePlayer, FixedTimestep, PhysicsBackend, PhysicsConfig, PhysicsStepper,
    },
    scene::{
        Component, ComponentStorage, EnvironmentConfig, SceneEntity, SceneEnvironment,
        SceneEnvironmentFactory,
    },
};
use mmd_resource::ResourceFile;
use std::{cell::Cell, cell::RefCell, rc::Rc};

/// Simulated seconds since the stage started.
#[derive(Debug, Clone, Default)]
struct StageTime(Rc<Cell<f64>>);

impl StageTime {
    fn advance(&self, delta: f64) {
        self.0.set(self.0.get() + delta);
    }
}

impl WallClock for StageTime {
    fn now(&self) -> f64 {
        self.0.get()
    }
}

/// An audio track that only reports its position in steps of `resolution` seconds.
#[derive(Debug)]
struct SimulatedAudioClock {
    time: StageTime,
    resolution: f64,
}

impl CoarseClock for SimulatedAudioClock {
    fn current_time(&self) -> f64 {
        if self.resolution <= 0.0 {
            return self.time.now();
        }

        (self.time.now() / self.resolution).floor() * self.resolution
    }

    fn playback_rate(&self) -> f64 {
        1.0
    }
}

/// Counts fixed physics steps without simulating rigid bodies.
#[derive(Debug)]
struct LoggingPhysicsStepper {
    model_name: String,
    timestep: FixedTimestep,
    step_count: u64,
}

impl PhysicsStepper for LoggingPhysicsStepper {
    fn step(&mut self, _model: &mut MmdModel, delta: f32) {
        let steps = self.timestep.steps(delta);
        self.step_count += steps as u64;
        trace!(
            "`{}` physics advanced {} steps of {:.4}s",
            self.model_name,
            steps,
            self.timestep.unit_step()
        );
    }

    fn reset(&mut self, model: &mut MmdModel) {
        self.timestep.reset();
        debug!(
            "`{}` physics reset after {} steps; {} rigid bodies snapped to pose",
            self.model_name,
            self.step_count,
            model.rigidbody_count()
        );
    }
}

#[derive(Debug, Default)]
struct LoggingPhysicsBackend;

impl PhysicsBackend for LoggingPhysicsBackend {
    fn create_stepper(
        &mut self,
        model: &MmdModel,
        config: &PhysicsConfig,
    ) -> Box<dyn PhysicsStepper> {
        info!(
            "physics enabled for `{}`: {} rigid bodies, {} joints, gravity ({}, {}, {})",
            model.name(),
            model.rigidbody_count(),
            model.joint_count(),
            config.gravity.x,
            config.gravity.y,
            config.gravity.z
        );

        Box::new(LoggingPhysicsStepper {
            model_name: model.name().to_owned(),
            timestep: FixedTimestep::new(config),
            step_count: 0,
        })
    }
}

/// A headless scene: loaders, the sequence and a simulated clock, ticked at a fixed rate.
pub struct Stage {
    environment: SceneEnvironment,
    components: ComponentStorage,
    sequence: Rc<RefCell<AnimationSequencePlayer>>,
    time: StageTime,
}

impl Stage {
    pub fn new(resource: ResourceFile, config: &StageConfig) -> Result<Self, AnyError> {
        if config.models.is_empty() {
            return Err(anyhow!("the stage has no models"));
        }

        let fetcher = ResourceFetcher::new(resource);
        let mut environment =
            create_environment(config).context("failed to create the scene environment")?;
        let mut components = ComponentStorage::new();
        let time = StageTime::default();

        let mut sequence = AnimationSequencePlayer::new(config.playback.clone());
        sequence.set_physics_backend(Some(Box::new(LoggingPhysicsBackend)));

        if let Some(audio) = &config.audio {
            info!("following a simulated audio clock at {}s resolution", audio.resolution);
            sequence.attach_calibrator(ClockCalibrator::with_wall_clock(
                Box::new(SimulatedAudioClock {
                    time: time.clone(),
                    resolution: audio.resolution,
                }),
                Box::new(time.clone()),
            ));
        }

        for stage_model in &config.models {
            let mut loader = ModelLoader::new();
            loader.on_progress(Box::new(|kind: LoadKind, name: &str, event: &ProgressEvent| {
                debug!(
                    "{} `{}` progress: {}/{}",
                    load_kind_name(kind),
                    name,
                    event.loaded,
                    event
                        .total
                        .map_or_else(|| "?".to_owned(), |total| total.to_string())
                );
            }));
            loader.on_loaded(Box::new(|kind: LoadKind, name: &str| {
                info!("{} `{}` loaded", load_kind_name(kind), name);
            }));
            loader.load_model(&fetcher, &stage_model.model);
            loader.load_animation(&fetcher, &stage_model.animation);

            let loader = loader.into_shared();
            sequence.add_model_loader(loader.clone());
            attach(
                &mut environment,
                &mut components,
                SceneEntity::Model(loader.clone()),
                Box::new(loader),
            )?;
        }

        if let Some(camera_animation) = &config.camera_animation {
            let mut loader = CameraLoader::new(MmdCamera::new());
            loader.load_animation(&fetcher, camera_animation);

            let loader = loader.into_shared();
            sequence.set_camera_loader(Some(loader.clone()));
            attach(
                &mut environment,
                &mut components,
                SceneEntity::Camera(loader.clone()),
                Box::new(loader),
            )?;
        }

        start_playback(&mut sequence, config)
            .context("failed to start the animation sequence")?;

        let sequence = Rc::new(RefCell::new(sequence));
        attach(
            &mut environment,
            &mut components,
            SceneEntity::Other("sequence".to_owned()),
            Box::new(sequence.clone()),
        )?;

        for (id, entity) in environment.entities().iter() {
            debug!("entity {}: {}", id, entity.summary());
        }

        Ok(Self {
            environment,
            components,
            sequence,
            time,
        })
    }

    pub fn run(&mut self, duration: f64, tick_rate: f64) -> Result<(), AnyError> {
        if tick_rate <= 0.0 {
            return Err(anyhow!("the tick rate must be positive, got {}", tick_rate));
        }

        let delta = 1.0 / tick_rate;
        let tick_count = (duration * tick_rate).ceil() as u64;
        let report_interval = tick_rate.round().max(1.0) as u64;

        info!("playing {} ticks at {} ticks per second.", tick_count, tick_rate);

        for tick in 0..tick_count {
            self.time.advance(delta);
            self.components.update(&mut self.environment, delta);

            if (tick + 1) % report_interval == 0 {
                let sequence = self.sequence.borrow();
                info!(
                    "t={:.2}s frame {:.2}/{} ({:?})",
                    sequence.current_time(),
                    sequence.current_frame(),
                    sequence.animation_end_frame(),
                    sequence.state()
                );
            }
        }

        info!("{}", self.sequence.borrow().perf_report());

        for (id, camera) in self.environment.entities().cameras() {
            let camera = camera.borrow();
            let eye = camera.camera().eye_position();
            info!(
                "camera {} ends at ({:.2}, {:.2}, {:.2})",
                id, eye.x, eye.y, eye.z
            );
        }

        self.components.destroy_all(&mut self.environment);
        info!("stage finished.");

        Ok(())
    }
}

fn create_environment(config: &StageConfig) -> Result<SceneEnvironment, CoreError> {
    let environment = SceneEnvironmentFactory::new().create(EnvironmentConfig {
        fog: config.fog,
        playback: config.playback.clone(),
    })?;

    Ok(environment)
}

fn start_playback(
    sequence: &mut AnimationSequencePlayer,
    config: &StageConfig,
) -> Result<(), CoreError> {
    let animation_names: Vec<&str> = config
        .models
        .iter()
        .map(|model| model.animation.as_str())
        .collect();

    sequence.async_play(&animation_names, config.camera_animation.as_deref())?;
    sequence.start()?;

    Ok(())
}

fn attach(
    environment: &mut SceneEnvironment,
    components: &mut ComponentStorage,
    entity: SceneEntity,
    component: Box<dyn Component>,
) -> Result<(), AnyError> {
    let id = environment
        .entities_mut()
        .insert(entity)
        .ok_or_else(|| anyhow!("out of object ids"))?;
    components.attach(id, component, environment);
    Ok(())
}

fn load_kind_name(kind: LoadKind) -> &'static str {
    match kind {
        LoadKind::Model => "model",
        LoadKind::Motion => "motion",
    }
}
