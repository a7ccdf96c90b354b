use super::FramePlayer;
use crate::{animation::AnimationClip, loader::SharedCameraLoader};
use std::rc::Rc;

/// Drives the camera owned by a camera loader with a camera clip.
#[derive(Debug)]
pub struct MmdCameraPlayer {
    camera_loader: SharedCameraLoader,
    clip: Option<Rc<AnimationClip>>,
}

impl MmdCameraPlayer {
    pub fn new(camera_loader: SharedCameraLoader, clip: Option<Rc<AnimationClip>>) -> Self {
        Self {
            camera_loader,
            clip,
        }
    }

    pub fn clip(&self) -> Option<&Rc<AnimationClip>> {
        self.clip.as_ref()
    }
}

impl FramePlayer for MmdCameraPlayer {
    fn end_frame(&self) -> u32 {
        self.clip.as_ref().map_or(0, |clip| clip.end_frame())
    }

    fn animate(&mut self, frame: f32) {
        let transform = match self.clip.as_ref().and_then(|clip| clip.sample_camera(frame)) {
            Some(transform) => transform,
            None => return,
        };

        self.camera_loader
            .borrow_mut()
            .camera_mut()
            .apply(&transform);
    }
}
