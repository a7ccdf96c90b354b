use super::{AnimationStore, AssetFetcher, LoadEvents, LoadedListener, ProgressListener};
use crate::{animation::AnimationClip, model::MmdCamera};
use log::warn;
use std::{cell::RefCell, rc::Rc};

pub type SharedCameraLoader = Rc<RefCell<CameraLoader>>;

/// Owns the scene camera and the camera motions that can drive it.
#[derive(Debug, Default)]
pub struct CameraLoader {
    camera: MmdCamera,
    animations: AnimationStore,
    events: LoadEvents,
}

impl CameraLoader {
    pub fn new(camera: MmdCamera) -> Self {
        Self {
            camera,
            ..Default::default()
        }
    }

    pub fn into_shared(self) -> SharedCameraLoader {
        Rc::new(RefCell::new(self))
    }

    pub fn camera(&self) -> &MmdCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut MmdCamera {
        &mut self.camera
    }

    /// Starts loading a camera motion. Returns `false` if it is already loaded or in flight.
    pub fn load_animation(&mut self, fetcher: &dyn AssetFetcher, name: &str) -> bool {
        self.animations.load(fetcher, name)
    }

    pub fn insert_animation(&mut self, clip: AnimationClip) -> Rc<AnimationClip> {
        if !clip.has_camera_track() {
            warn!("animation `{}` has no camera key frames", clip.name());
        }

        self.animations.insert(clip)
    }

    pub fn poll(&mut self) {
        self.animations.poll(&mut self.events);
    }

    pub fn animations(&self) -> impl Iterator<Item = (&str, &Rc<AnimationClip>)> {
        self.animations.iter()
    }

    pub fn animation(&self, name: &str) -> Option<Rc<AnimationClip>> {
        self.animations.get(name)
    }

    pub fn is_animation_loading(&self, name: &str) -> bool {
        self.animations.is_loading(name)
    }

    pub fn on_progress(&mut self, listener: ProgressListener) {
        self.events.on_progress(listener);
    }

    pub fn on_loaded(&mut self, listener: LoadedListener) {
        self.events.on_loaded(listener);
    }

    pub fn disable(&mut self) {
        self.animations.cancel_pending();
    }

    pub fn destroy(&mut self) {
        self.animations.clear();
    }
}
