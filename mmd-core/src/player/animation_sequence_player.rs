use super::{FramePlayer, MmdCameraPlayer, MmdModelPlayer, PhysicsBackend};
use crate::{
    clock::{ClockCalibrator, CoarseClock, PlaybackClock},
    config::PlaybackConfig,
    loader::{SharedCameraLoader, SharedModelLoader},
    perf::{PerfRecorder, PerfReport},
    SequenceError,
};
use log::{debug, info, warn};
use std::fmt::{Debug, Formatter, Result as FmtResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceState {
    Idle,
    WaitingForAssets,
    Bound,
    Playing,
    Paused,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PlayRequest {
    animation_names: Vec<String>,
    camera_animation_name: Option<String>,
}

/// Drives every model and the camera from a single clock.
pub struct AnimationSequencePlayer {
    config: PlaybackConfig,
    is_started: bool,
    deferred_requests: Vec<PlayRequest>,
    pending_request: Option<PlayRequest>,
    is_stall_reported: bool,
    model_loaders: Vec<SharedModelLoader>,
    camera_loader: Option<SharedCameraLoader>,
    physics_backend: Option<Box<dyn PhysicsBackend>>,
    players: Vec<Box<dyn FramePlayer>>,
    camera_player: Option<Box<dyn FramePlayer>>,
    animation_end_frame: u32,
    clock: PlaybackClock,
    calibrator: Option<ClockCalibrator>,
    state: SequenceState,
    current_frame: f32,
    perf: PerfRecorder,
}

impl AnimationSequencePlayer {
    pub fn new(config: PlaybackConfig) -> Self {
        Self {
            clock: PlaybackClock::new(config.playback_rate),
            config,
            is_started: false,
            deferred_requests: Vec::new(),
            pending_request: None,
            is_stall_reported: false,
            model_loaders: Vec::new(),
            camera_loader: None,
            physics_backend: None,
            players: Vec::new(),
            camera_player: None,
            animation_end_frame: 0,
            calibrator: None,
            state: SequenceState::Idle,
            current_frame: 0.0,
            perf: PerfRecorder::new("sequence"),
        }
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn state(&self) -> SequenceState {
        self.state
    }

    pub fn current_frame(&self) -> f32 {
        self.current_frame
    }

    pub fn current_time(&self) -> f64 {
        self.clock.current_time()
    }

    pub fn animation_end_frame(&self) -> u32 {
        self.animation_end_frame
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn has_camera_player(&self) -> bool {
        self.camera_player.is_some()
    }

    pub fn perf_report(&self) -> PerfReport {
        self.perf.report()
    }

    /// Replays every `async_play` issued before the first start, in order.
    ///
    /// Every request is replayed even if an earlier one fails; the first error is returned.
    pub fn start(&mut self) -> Result<(), SequenceError> {
        if self.is_started {
            return Ok(());
        }

        self.is_started = true;

        let mut first_error = None;

        for request in std::mem::take(&mut self.deferred_requests) {
            if let Err(err) = self.request_play(request) {
                warn!("deferred play request failed: {}", err);
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn model_loaders(&self) -> &[SharedModelLoader] {
        &self.model_loaders
    }

    pub fn add_model_loader(&mut self, loader: SharedModelLoader) {
        self.model_loaders.push(loader);
    }

    /// Also tears down the current session.
    pub fn remove_all_model_loaders(&mut self) {
        self.remove_all_mmd_players();
        self.model_loaders.clear();
    }

    pub fn camera_loader(&self) -> Option<&SharedCameraLoader> {
        self.camera_loader.as_ref()
    }

    pub fn set_camera_loader(&mut self, loader: Option<SharedCameraLoader>) {
        self.camera_loader = loader;
    }

    pub fn set_physics_backend(&mut self, backend: Option<Box<dyn PhysicsBackend>>) {
        self.physics_backend = backend;
    }

    /// Makes `source` the only time source of the sequence, replacing any previous one.
    pub fn attach_clock(&mut self, source: Box<dyn CoarseClock>) {
        self.attach_calibrator(ClockCalibrator::new(source));
    }

    pub fn attach_calibrator(&mut self, mut calibrator: ClockCalibrator) {
        calibrator.reset();
        self.calibrator = Some(calibrator);
    }

    pub fn detach_clock(&mut self) {
        self.calibrator = None;
    }

    pub fn set_playback_rate(&mut self, playback_rate: f64) {
        self.clock.set_playback_rate(playback_rate);
        self.config.playback_rate = self.clock.playback_rate();
    }

    /// Plays one animation per model loader, plus an optional camera animation, once loaded.
    ///
    /// Calls made before [`Self::start`] are deferred and validated when replayed.
    pub fn async_play(
        &mut self,
        animation_names: &[&str],
        camera_animation_name: Option<&str>,
    ) -> Result<(), SequenceError> {
        let request = PlayRequest {
            animation_names: animation_names.iter().map(|name| (*name).to_owned()).collect(),
            camera_animation_name: camera_animation_name.map(str::to_owned),
        };

        if !self.is_started {
            debug!("sequence not started; deferring play request");
            self.deferred_requests.push(request);
            return Ok(());
        }

        self.request_play(request)
    }

    fn request_play(&mut self, request: PlayRequest) -> Result<(), SequenceError> {
        if self.model_loaders.is_empty() {
            return Err(SequenceError::NoModelLoader);
        }

        if let Some(name) = &request.camera_animation_name {
            if self.camera_loader.is_none() {
                return Err(SequenceError::NoCameraLoader(name.clone()));
            }
        }

        if request.animation_names.len() != self.model_loaders.len() {
            return Err(SequenceError::AnimationCountMismatch {
                loaders: self.model_loaders.len(),
                animations: request.animation_names.len(),
            });
        }

        self.remove_all_mmd_players();

        info!(
            "waiting for assets of [{}]",
            request.animation_names.join(", ")
        );
        self.pending_request = Some(request);
        self.is_stall_reported = false;
        self.state = SequenceState::WaitingForAssets;
        Ok(())
    }

    /// Drops the bound players and any play request waiting for assets.
    pub fn remove_all_mmd_players(&mut self) {
        if !self.players.is_empty() || self.camera_player.is_some() {
            info!("tearing down {} players", self.players.len());
        }

        self.pending_request = None;
        self.players.clear();
        self.camera_player = None;
        self.animation_end_frame = 0;
        self.current_frame = 0.0;
        self.clock.stop();
        self.state = SequenceState::Idle;
    }

    /// Binds players directly, bypassing the loaders.
    pub fn bind_players(
        &mut self,
        players: Vec<Box<dyn FramePlayer>>,
        camera_player: Option<Box<dyn FramePlayer>>,
    ) {
        self.animation_end_frame = players
            .iter()
            .chain(camera_player.iter())
            .map(|player| player.end_frame())
            .max()
            .unwrap_or(0);
        self.players = players;
        self.camera_player = camera_player;
        self.pending_request = None;
        self.current_frame = 0.0;
        self.clock.stop();

        if let Some(calibrator) = &mut self.calibrator {
            calibrator.reset();
        }

        self.state = SequenceState::Bound;
        debug!(
            "bound {} players; end frame {}",
            self.players.len(),
            self.animation_end_frame
        );
    }

    pub fn play(&mut self) {
        match self.state {
            SequenceState::Bound | SequenceState::Paused | SequenceState::Stopped => {
                // A fresh binding follows the attached clock as is.
                if self.state != SequenceState::Bound {
                    self.rebase_calibrator();
                }

                self.clock.play();
                self.state = SequenceState::Playing;
                info!("playing from frame {:.2}", self.current_frame);
            }
            _ => {}
        }
    }

    pub fn pause(&mut self) {
        if self.state == SequenceState::Playing {
            self.clock.pause();
            self.state = SequenceState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == SequenceState::Paused {
            self.play();
        }
    }

    pub fn stop(&mut self) {
        match self.state {
            SequenceState::Playing | SequenceState::Paused | SequenceState::Bound => {
                self.clock.stop();
                self.current_frame = 0.0;
                self.reset_physics();
                self.state = SequenceState::Stopped;
            }
            _ => {}
        }
    }

    /// Jumps to `time` seconds. Physics is reset on every player.
    pub fn seek(&mut self, time: f64) {
        self.clock.seek(time);
        self.current_frame = (self.clock.current_time() * self.config.fps as f64) as f32;
        self.rebase_calibrator();
        self.reset_physics();
    }

    /// Makes the attached clock continue from the playback clock's position.
    fn rebase_calibrator(&mut self) {
        if let Some(calibrator) = &mut self.calibrator {
            calibrator.rebase_to(self.clock.current_time());
        }
    }

    fn reset_physics(&mut self) {
        for player in &mut self.players {
            player.reset_physics();
        }
    }

    /// Advances the sequence by one host tick of `delta` wall seconds.
    ///
    /// Returns the frame every player was posed at, if any.
    pub fn update(&mut self, delta: f64) -> Option<f32> {
        self.poll_loaders();

        if self.state == SequenceState::WaitingForAssets {
            if self.try_bind() {
                self.play();
            } else {
                self.report_stalled_loaders();
            }
        }

        if self.state != SequenceState::Playing {
            return None;
        }

        let previous_time = self.clock.current_time();

        match &mut self.calibrator {
            Some(calibrator) => self.clock.sync_to(calibrator.calibrated_time()),
            None => self.clock.advance(delta),
        }

        let elapsed = (self.clock.current_time() - previous_time).max(0.0);
        let fps = self.config.fps as f64;
        let mut frame = self.clock.current_time() * fps;
        let end_frame = self.animation_end_frame as f64;

        if 0.0 < end_frame && end_frame <= frame {
            if self.config.loop_playback {
                frame %= end_frame;
                self.clock.seek(frame / fps);
                self.rebase_calibrator();
                self.reset_physics();
                debug!("looped to frame {:.2}", frame);
            } else {
                frame = end_frame;
                self.clock.seek(end_frame / fps);
                self.clock.pause();
                self.state = SequenceState::Paused;
                info!("reached end frame {}", self.animation_end_frame);
            }
        }

        self.current_frame = frame as f32;
        self.run_frame(self.current_frame, elapsed as f32);

        Some(self.current_frame)
    }

    fn run_frame(&mut self, frame: f32, delta: f32) {
        self.perf.frame_begin();

        for player in &mut self.players {
            player.animate(frame);
        }

        if let Some(camera_player) = &mut self.camera_player {
            camera_player.animate(frame);
        }

        self.perf.frame_animation_end();

        if self.config.use_physics {
            for player in &mut self.players {
                player.step_physics(delta);
            }
        }

        self.perf.frame_physics_end();
    }

    fn poll_loaders(&mut self) {
        for loader in &self.model_loaders {
            loader.borrow_mut().poll();
        }

        if let Some(loader) = &self.camera_loader {
            loader.borrow_mut().poll();
        }
    }

    /// Indices of model loaders that have no model and no model load in flight.
    ///
    /// A pending play request never binds while any exist.
    pub fn stalled_model_loaders(&self) -> Vec<usize> {
        self.model_loaders
            .iter()
            .enumerate()
            .filter(|(_, loader)| {
                let loader = loader.borrow();
                !loader.is_model_loaded() && !loader.is_model_loading()
            })
            .map(|(index, _)| index)
            .collect()
    }

    fn report_stalled_loaders(&mut self) {
        if self.is_stall_reported {
            return;
        }

        let stalled = self.stalled_model_loaders();

        if stalled.is_empty() {
            return;
        }

        self.is_stall_reported = true;
        warn!(
            "play request is blocked: model loaders {:?} have no model and nothing loading",
            stalled
        );
    }

    fn is_request_ready(&self, request: &PlayRequest) -> bool {
        let models_ready = self
            .model_loaders
            .iter()
            .zip(&request.animation_names)
            .all(|(loader, name)| {
                let loader = loader.borrow();
                loader.is_model_loaded() && !loader.is_animation_loading(name)
            });

        let camera_ready = match (&request.camera_animation_name, &self.camera_loader) {
            (Some(name), Some(loader)) => !loader.borrow().is_animation_loading(name),
            _ => true,
        };

        models_ready && camera_ready
    }

    fn try_bind(&mut self) -> bool {
        let request = match &self.pending_request {
            Some(request) if self.is_request_ready(request) => request.clone(),
            _ => return false,
        };

        let mut players: Vec<Box<dyn FramePlayer>> = Vec::with_capacity(request.animation_names.len());

        for (loader, name) in self.model_loaders.iter().zip(&request.animation_names) {
            let loader = loader.borrow();
            let model = match loader.model() {
                Some(model) => model.clone(),
                None => continue,
            };
            let clip = loader.animation(name);

            if clip.is_none() {
                warn!(
                    "animation `{}` is not loaded; model `{}` is bound without motion",
                    name,
                    model.borrow().name()
                );
            }

            let physics = match &mut self.physics_backend {
                Some(backend) if self.config.use_physics && model.borrow().has_physics() => {
                    Some(backend.create_stepper(&model.borrow(), &self.config.physics))
                }
                _ => None,
            };

            debug!(
                "binding model `{}` with animation `{}`; physics {}",
                model.borrow().name(),
                name,
                if physics.is_some() { "on" } else { "off" }
            );
            players.push(Box::new(MmdModelPlayer::new(model, clip, physics)));
        }

        let camera_player = match (&request.camera_animation_name, &self.camera_loader) {
            (Some(name), Some(loader)) => {
                let clip = loader.borrow().animation(name);

                if clip.is_none() {
                    warn!("camera animation `{}` is not loaded; camera stays still", name);
                }

                Some(Box::new(MmdCameraPlayer::new(loader.clone(), clip)) as Box<dyn FramePlayer>)
            }
            _ => None,
        };

        self.bind_players(players, camera_player);
        true
    }
}

impl Debug for AnimationSequencePlayer {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AnimationSequencePlayer")
            .field("state", &self.state)
            .field("clock_state", &self.clock.state())
            .field("current_frame", &self.current_frame)
            .field("animation_end_frame", &self.animation_end_frame)
            .field("players", &self.players.len())
            .field("has_camera_player", &self.camera_player.is_some())
            .field("pending_request", &self.pending_request)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        animation::AnimationClip,
        loader::{CameraLoader, ModelLoader},
        model::{MmdCamera, MmdModel},
        player::{PhysicsConfig, PhysicsStepper},
    };
    use mmd_resource::{
        AnimationSource, MmdModelSource, MorphKeyFrame, MorphTrackSource, Interpolation,
    };
    use crate::clock::WallClock;
    use std::{
        cell::{Cell, RefCell},
        rc::Rc,
    };

    type EventLog = Rc<RefCell<Vec<(String, &'static str, f32)>>>;

    struct StubPlayer {
        name: String,
        end_frame: u32,
        log: EventLog,
    }

    impl FramePlayer for StubPlayer {
        fn end_frame(&self) -> u32 {
            self.end_frame
        }

        fn animate(&mut self, frame: f32) {
            self.log
                .borrow_mut()
                .push((self.name.clone(), "animate", frame));
        }

        fn step_physics(&mut self, delta: f32) {
            self.log
                .borrow_mut()
                .push((self.name.clone(), "physics", delta));
        }

        fn reset_physics(&mut self) {
            self.log
                .borrow_mut()
                .push((self.name.clone(), "reset", 0.0));
        }
    }

    fn stub(name: &str, end_frame: u32, log: &EventLog) -> Box<dyn FramePlayer> {
        Box::new(StubPlayer {
            name: name.to_owned(),
            end_frame,
            log: log.clone(),
        })
    }

    fn started_sequence(config: PlaybackConfig) -> AnimationSequencePlayer {
        let mut sequence = AnimationSequencePlayer::new(config);
        sequence.start().unwrap();
        sequence
    }

    fn motion(name: &str, end_frame: u32) -> AnimationClip {
        let source = AnimationSource {
            morph_tracks: vec![MorphTrackSource {
                morph_name: "a".to_owned(),
                key_frames: vec![MorphKeyFrame {
                    frame_index: end_frame,
                    weight: 1.0,
                    interpolation: Interpolation::Linear,
                }],
            }],
            ..Default::default()
        };

        AnimationClip::from_source(name, &source)
    }

    fn model_loader(animation: Option<AnimationClip>) -> SharedModelLoader {
        let mut loader = ModelLoader::new();
        loader.set_model(MmdModel::from_source(&MmdModelSource::new("miku".to_owned())));

        if let Some(animation) = animation {
            loader.insert_animation(animation);
        }

        loader.into_shared()
    }

    #[test]
    fn test_sequence_gives_every_player_the_same_frame() {
        let log = EventLog::default();
        let mut sequence = started_sequence(PlaybackConfig::default());

        sequence.bind_players(
            vec![stub("first", 100, &log), stub("second", 60, &log)],
            Some(stub("camera", 120, &log)),
        );
        assert_eq!(sequence.animation_end_frame(), 120);
        assert_eq!(sequence.state(), SequenceState::Bound);

        sequence.play();
        assert_eq!(sequence.update(0.5), Some(15.0));

        let log = log.borrow();
        let kinds: Vec<(&str, &str)> = log
            .iter()
            .map(|(name, kind, _)| (name.as_str(), *kind))
            .collect();

        assert_eq!(
            kinds,
            vec![
                ("first", "animate"),
                ("second", "animate"),
                ("camera", "animate"),
                ("first", "physics"),
                ("second", "physics"),
            ]
        );
        assert!(log
            .iter()
            .filter(|(_, kind, _)| *kind == "animate")
            .all(|(_, _, frame)| *frame == 15.0));
    }

    #[test]
    fn test_sequence_pauses_at_end_frame() {
        let log = EventLog::default();
        let mut sequence = started_sequence(PlaybackConfig::default());

        sequence.bind_players(vec![stub("only", 30, &log)], None);
        sequence.play();

        assert_eq!(sequence.update(2.0), Some(30.0));
        assert_eq!(sequence.state(), SequenceState::Paused);
        assert_eq!(sequence.update(1.0), None);

        sequence.resume();
        assert_eq!(sequence.state(), SequenceState::Playing);
    }

    #[test]
    fn test_sequence_loops_and_resets_physics() {
        let log = EventLog::default();
        let mut sequence = started_sequence(PlaybackConfig {
            loop_playback: true,
            ..Default::default()
        });

        sequence.bind_players(vec![stub("only", 30, &log)], None);
        sequence.play();

        assert_eq!(sequence.update(1.5), Some(15.0));
        assert_eq!(sequence.state(), SequenceState::Playing);
        assert_eq!(log.borrow()[0].1, "reset");
    }

    #[test]
    fn test_sequence_without_physics() {
        let log = EventLog::default();
        let mut sequence = started_sequence(PlaybackConfig {
            use_physics: false,
            ..Default::default()
        });

        sequence.bind_players(vec![stub("only", 30, &log)], None);
        sequence.play();
        sequence.update(0.1);

        assert!(log.borrow().iter().all(|(_, kind, _)| *kind == "animate"));
    }

    #[test]
    fn test_sequence_defers_play_until_start() {
        let mut sequence = AnimationSequencePlayer::new(PlaybackConfig::default());

        assert_eq!(sequence.async_play(&["dance"], None), Ok(()));
        assert_eq!(sequence.state(), SequenceState::Idle);
        assert_eq!(sequence.start(), Err(SequenceError::NoModelLoader));
    }

    #[test]
    fn test_sequence_setup_errors() {
        let mut sequence = started_sequence(PlaybackConfig::default());
        assert_eq!(
            sequence.async_play(&["dance"], None),
            Err(SequenceError::NoModelLoader)
        );

        sequence.add_model_loader(model_loader(None));
        assert_eq!(
            sequence.async_play(&["dance"], Some("camera")),
            Err(SequenceError::NoCameraLoader("camera".to_owned()))
        );
        assert_eq!(
            sequence.async_play(&["dance", "extra"], None),
            Err(SequenceError::AnimationCountMismatch {
                loaders: 1,
                animations: 2
            })
        );
    }

    #[test]
    fn test_sequence_binds_loaded_assets() {
        let mut sequence = AnimationSequencePlayer::new(PlaybackConfig::default());
        let camera_loader = CameraLoader::new(MmdCamera::new()).into_shared();

        sequence.add_model_loader(model_loader(Some(motion("dance", 90))));
        sequence.add_model_loader(model_loader(Some(motion("walk", 45))));
        sequence.set_camera_loader(Some(camera_loader));

        sequence
            .async_play(&["dance", "walk"], Some("camera"))
            .unwrap();
        sequence.start().unwrap();
        assert_eq!(sequence.state(), SequenceState::WaitingForAssets);

        assert_eq!(sequence.update(0.5), Some(15.0));
        assert_eq!(sequence.state(), SequenceState::Playing);
        assert_eq!(sequence.player_count(), 2);
        assert!(sequence.has_camera_player());
        assert_eq!(sequence.animation_end_frame(), 90);
    }

    #[test]
    fn test_sequence_binds_unknown_animation_without_clip() {
        let mut sequence = started_sequence(PlaybackConfig::default());
        sequence.add_model_loader(model_loader(None));

        sequence.async_play(&["missing"], None).unwrap();
        sequence.update(0.0);

        assert_eq!(sequence.state(), SequenceState::Playing);
        assert_eq!(sequence.player_count(), 1);
        assert_eq!(sequence.animation_end_frame(), 0);
    }

    #[test]
    fn test_sequence_replay_tears_down_previous_session() {
        let log = EventLog::default();
        let mut sequence = started_sequence(PlaybackConfig::default());
        sequence.add_model_loader(model_loader(None));

        sequence.bind_players(vec![stub("old", 30, &log)], None);
        sequence.play();
        sequence.async_play(&["missing"], None).unwrap();

        assert_eq!(sequence.player_count(), 0);
        assert_eq!(sequence.state(), SequenceState::WaitingForAssets);

        sequence.remove_all_model_loaders();
        assert_eq!(sequence.state(), SequenceState::Idle);
        assert!(sequence.model_loaders().is_empty());
    }

    #[test]
    fn test_sequence_follows_attached_clock() {
        struct FixedClock(f64);

        impl CoarseClock for FixedClock {
            fn current_time(&self) -> f64 {
                self.0
            }

            fn playback_rate(&self) -> f64 {
                0.0
            }
        }

        let log = EventLog::default();
        let mut sequence = started_sequence(PlaybackConfig::default());

        sequence.bind_players(vec![stub("only", 300, &log)], None);
        sequence.attach_clock(Box::new(FixedClock(2.0)));
        sequence.play();

        assert_eq!(sequence.update(0.016), Some(60.0));
        assert_eq!(sequence.update(0.016), Some(60.0));
    }

    #[test]
    fn test_sequence_creates_steppers_for_physics_models() {
        struct NullStepper;

        impl PhysicsStepper for NullStepper {
            fn step(&mut self, _model: &mut MmdModel, _delta: f32) {}
            fn reset(&mut self, _model: &mut MmdModel) {}
        }

        struct CountingBackend(Rc<RefCell<usize>>);

        impl PhysicsBackend for CountingBackend {
            fn create_stepper(
                &mut self,
                _model: &MmdModel,
                _config: &PhysicsConfig,
            ) -> Box<dyn PhysicsStepper> {
                *self.0.borrow_mut() += 1;
                Box::new(NullStepper)
            }
        }

        let created = Rc::new(RefCell::new(0));
        let mut sequence = started_sequence(PlaybackConfig::default());
        sequence.set_physics_backend(Some(Box::new(CountingBackend(created.clone()))));

        let mut rigid = MmdModelSource::new("rigid".to_owned());
        rigid.rigidbody_count = 4;
        let mut loader = ModelLoader::new();
        loader.set_model(MmdModel::from_source(&rigid));

        sequence.add_model_loader(loader.into_shared());
        sequence.add_model_loader(model_loader(None));
        sequence.async_play(&["a", "b"], None).unwrap();
        sequence.update(0.0);

        assert_eq!(*created.borrow(), 1);
    }

    struct SharedTimeClock(Rc<Cell<f64>>);

    impl CoarseClock for SharedTimeClock {
        fn current_time(&self) -> f64 {
            self.0.get()
        }

        fn playback_rate(&self) -> f64 {
            1.0
        }
    }

    impl WallClock for SharedTimeClock {
        fn now(&self) -> f64 {
            self.0.get()
        }
    }

    fn attach_running_clock(sequence: &mut AnimationSequencePlayer) -> Rc<Cell<f64>> {
        let time = Rc::new(Cell::new(0.0));
        sequence.attach_calibrator(ClockCalibrator::with_wall_clock(
            Box::new(SharedTimeClock(time.clone())),
            Box::new(SharedTimeClock(time.clone())),
        ));
        time
    }

    fn reset_count(log: &EventLog) -> usize {
        log.borrow()
            .iter()
            .filter(|(_, kind, _)| *kind == "reset")
            .count()
    }

    #[test]
    fn test_sequence_seek_with_running_clock() {
        let log = EventLog::default();
        let mut sequence = started_sequence(PlaybackConfig::default());

        sequence.bind_players(vec![stub("only", 300, &log)], None);
        let time = attach_running_clock(&mut sequence);
        sequence.play();

        time.set(0.8);
        let frame = sequence.update(0.8).unwrap();
        assert!((frame - 24.0).abs() < 1e-3);

        sequence.seek(0.1);
        assert_eq!(reset_count(&log), 1);

        time.set(0.85);
        let frame = sequence.update(0.05).unwrap();
        assert!((frame - 4.5).abs() < 1e-3, "frame = {}", frame);

        sequence.seek(5.0);
        time.set(0.9);
        let frame = sequence.update(0.05).unwrap();
        assert!((frame - 151.5).abs() < 1e-3, "frame = {}", frame);
    }

    #[test]
    fn test_sequence_loops_with_running_clock() {
        let log = EventLog::default();
        let mut sequence = started_sequence(PlaybackConfig {
            loop_playback: true,
            ..Default::default()
        });

        sequence.bind_players(vec![stub("only", 30, &log)], None);
        let time = attach_running_clock(&mut sequence);
        sequence.play();

        let mut frames = Vec::new();

        for tick in 1..=8 {
            time.set(tick as f64 * 0.25);
            frames.push(sequence.update(0.25).unwrap());
        }

        assert_eq!(frames, vec![7.5, 15.0, 22.5, 0.0, 7.5, 15.0, 22.5, 0.0]);
        assert_eq!(reset_count(&log), 2);
    }

    #[test]
    fn test_sequence_resume_continues_from_paused_frame() {
        let log = EventLog::default();
        let mut sequence = started_sequence(PlaybackConfig::default());

        sequence.bind_players(vec![stub("only", 300, &log)], None);
        let time = attach_running_clock(&mut sequence);
        sequence.play();

        time.set(1.0);
        assert_eq!(sequence.update(1.0), Some(30.0));

        sequence.pause();
        time.set(3.0);
        assert_eq!(sequence.update(2.0), None);

        sequence.resume();
        time.set(3.5);
        assert_eq!(sequence.update(0.5), Some(45.0));
    }

    #[test]
    fn test_sequence_start_replays_every_deferred_request() {
        let mut sequence = AnimationSequencePlayer::new(PlaybackConfig::default());
        sequence.add_model_loader(model_loader(None));

        sequence.async_play(&["a", "b"], None).unwrap();
        sequence.async_play(&["a"], None).unwrap();

        assert_eq!(
            sequence.start(),
            Err(SequenceError::AnimationCountMismatch {
                loaders: 1,
                animations: 2
            })
        );
        assert_eq!(sequence.state(), SequenceState::WaitingForAssets);

        sequence.update(0.0);
        assert_eq!(sequence.state(), SequenceState::Playing);
    }

    #[test]
    fn test_sequence_reports_loaders_without_model() {
        let mut sequence = started_sequence(PlaybackConfig::default());
        sequence.add_model_loader(ModelLoader::new().into_shared());
        sequence.add_model_loader(model_loader(None));

        sequence.async_play(&["a", "b"], None).unwrap();
        sequence.update(0.0);
        sequence.update(0.0);

        assert_eq!(sequence.state(), SequenceState::WaitingForAssets);
        assert_eq!(sequence.stalled_model_loaders(), vec![0]);
    }
}
