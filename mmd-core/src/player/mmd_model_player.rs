use super::{FramePlayer, PhysicsStepper};
use crate::{animation::AnimationClip, model::SharedMmdModel};
use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    rc::Rc,
};

/// Plays one clip on one model, with optional physics.
pub struct MmdModelPlayer {
    model: SharedMmdModel,
    clip: Option<Rc<AnimationClip>>,
    physics: Option<Box<dyn PhysicsStepper>>,
}

impl MmdModelPlayer {
    pub fn new(
        model: SharedMmdModel,
        clip: Option<Rc<AnimationClip>>,
        physics: Option<Box<dyn PhysicsStepper>>,
    ) -> Self {
        Self {
            model,
            clip,
            physics,
        }
    }

    pub fn model(&self) -> &SharedMmdModel {
        &self.model
    }

    pub fn clip(&self) -> Option<&Rc<AnimationClip>> {
        self.clip.as_ref()
    }

    pub fn has_physics(&self) -> bool {
        self.physics.is_some()
    }
}

impl FramePlayer for MmdModelPlayer {
    fn end_frame(&self) -> u32 {
        self.clip.as_ref().map_or(0, |clip| clip.end_frame())
    }

    fn animate(&mut self, frame: f32) {
        let mut model = self.model.borrow_mut();

        if let Some(clip) = &self.clip {
            for (bone_name, transform) in clip.sample_bones(frame) {
                model.set_bone_pose(bone_name, transform);
            }

            for (morph_name, weight) in clip.sample_morphs(frame) {
                model.set_morph_weight(morph_name, weight);
            }
        }

        model.update_morphs();
    }

    fn step_physics(&mut self, delta: f32) {
        if let Some(physics) = &mut self.physics {
            physics.step(&mut self.model.borrow_mut(), delta);
        }
    }

    fn reset_physics(&mut self) {
        if let Some(physics) = &mut self.physics {
            physics.reset(&mut self.model.borrow_mut());
        }
    }
}

impl Debug for MmdModelPlayer {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("MmdModelPlayer")
            .field("model", &self.model.borrow().name())
            .field("clip", &self.clip.as_ref().map(|clip| clip.name()))
            .field("has_physics", &self.has_physics())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{material::Material, model::MmdModel};
    use mmd_math::{Quat, Vec3, Vec4};
    use mmd_resource::{
        AnimationSource, BoneInterpolation, BoneKeyFrame, BoneTrackSource, Interpolation,
        MaterialSource, MmdBoneSource, MmdModelSource, MmdMorphKind, MmdMorphMaterialElement,
        MmdMorphMaterialOffsetMode, MmdMorphSource, MorphKeyFrame, MorphTrackSource,
    };
    use std::{cell::RefCell, collections::BTreeMap};

    struct CountingStepper {
        steps: Rc<RefCell<Vec<f32>>>,
    }

    impl PhysicsStepper for CountingStepper {
        fn step(&mut self, _model: &mut crate::model::MmdModel, delta: f32) {
            self.steps.borrow_mut().push(delta);
        }

        fn reset(&mut self, _model: &mut crate::model::MmdModel) {
            self.steps.borrow_mut().clear();
        }
    }

    fn make_model() -> SharedMmdModel {
        let mut source = MmdModelSource::new("miku".to_owned());
        source.materials = vec![MaterialSource::new("body".to_owned(), BTreeMap::new())];
        source.bones = vec![MmdBoneSource {
            name: "センター".to_owned(),
            parent_index: None,
            position: Vec3::ZERO,
        }];

        let mut element = MmdMorphMaterialElement::identity(0, MmdMorphMaterialOffsetMode::Multiply);
        element.diffuse = Vec4::new(1.0, 1.0, 1.0, 0.0);
        source.morphs = vec![MmdMorphSource {
            name: "fade".to_owned(),
            kind: MmdMorphKind::Material(vec![element]),
        }];

        MmdModel::from_source(&source).into_shared()
    }

    fn make_clip() -> Rc<AnimationClip> {
        let source = AnimationSource {
            bone_tracks: vec![BoneTrackSource {
                bone_name: "センター".to_owned(),
                key_frames: vec![BoneKeyFrame {
                    frame_index: 0,
                    translation: Vec3::new(0.0, 1.0, 0.0),
                    rotation: Quat::IDENTITY,
                    interpolation: BoneInterpolation::default(),
                }],
            }],
            morph_tracks: vec![MorphTrackSource {
                morph_name: "fade".to_owned(),
                key_frames: vec![
                    MorphKeyFrame {
                        frame_index: 0,
                        weight: 0.0,
                        interpolation: Interpolation::Linear,
                    },
                    MorphKeyFrame {
                        frame_index: 10,
                        weight: 1.0,
                        interpolation: Interpolation::Linear,
                    },
                ],
            }],
            camera_key_frames: Vec::new(),
        };

        Rc::new(AnimationClip::from_source("dance", &source))
    }

    #[test]
    fn test_model_player_animates_pose_and_morphs() {
        let model = make_model();
        let mut player = MmdModelPlayer::new(model.clone(), Some(make_clip()), None);
        assert_eq!(player.end_frame(), 10);

        player.animate(5.0);

        let model = model.borrow();
        assert_eq!(model.morph_weight("fade"), 0.5);
        assert_eq!(
            model.bone_pose("センター").map(|pose| pose.translation),
            Some(Vec3::new(0.0, 1.0, 0.0))
        );
        assert_eq!(model.materials()[0].borrow().opacity(), 0.5);
        assert_eq!(
            model.materials()[0].borrow().get_float(Material::OPACITY),
            Some(0.5)
        );
    }

    #[test]
    fn test_model_player_without_clip_or_physics() {
        let mut player = MmdModelPlayer::new(make_model(), None, None);
        assert_eq!(player.end_frame(), 0);

        player.animate(3.0);
        player.step_physics(0.1);
        player.reset_physics();
        assert!(!player.has_physics());
    }

    #[test]
    fn test_model_player_steps_physics() {
        let steps = Rc::new(RefCell::new(Vec::new()));
        let mut player = MmdModelPlayer::new(
            make_model(),
            None,
            Some(Box::new(CountingStepper {
                steps: steps.clone(),
            })),
        );

        player.step_physics(0.5);
        assert_eq!(steps.borrow().as_slice(), &[0.5]);

        player.reset_physics();
        assert!(steps.borrow().is_empty());
    }
}
