use crate::{
    animation::BoneTransform,
    material::{Material, SharedMaterial},
    morph::{MmdParameterController, MorphApplyReport},
};
use mmd_math::Vec3;
use mmd_resource::MmdModelSource;
use std::{cell::RefCell, collections::HashMap, rc::Rc};

pub type SharedMmdModel = Rc<RefCell<MmdModel>>;

#[derive(Debug, Clone)]
pub struct MmdBone {
    pub name: String,
    pub parent_index: Option<u32>,
    pub rest_position: Vec3,
    pub pose: BoneTransform,
}

/// Runtime state of a loaded model: bone poses, live materials and morph state.
#[derive(Debug)]
pub struct MmdModel {
    name: String,
    materials: Vec<SharedMaterial>,
    bones: Vec<MmdBone>,
    bone_name_index_map: HashMap<String, u32>,
    parameter_controller: MmdParameterController,
    rigidbody_count: u32,
    joint_count: u32,
}

impl MmdModel {
    pub fn from_source(source: &MmdModelSource) -> Self {
        let materials: Vec<SharedMaterial> = source
            .materials
            .iter()
            .map(|material| Material::load_from_source(material).into_shared())
            .collect();

        let mut bones = Vec::with_capacity(source.bones.len());
        let mut bone_name_index_map = HashMap::with_capacity(source.bones.len());

        for (index, bone) in source.bones.iter().enumerate() {
            bone_name_index_map
                .entry(bone.name.clone())
                .or_insert(index as u32);
            bones.push(MmdBone {
                name: bone.name.clone(),
                parent_index: bone.parent_index,
                rest_position: bone.position,
                pose: BoneTransform::default(),
            });
        }

        let parameter_controller =
            MmdParameterController::new(&source.morphs, &materials, bones.len());

        Self {
            name: source.name.clone(),
            materials,
            bones,
            bone_name_index_map,
            parameter_controller,
            rigidbody_count: source.rigidbody_count,
            joint_count: source.joint_count,
        }
    }

    pub fn into_shared(self) -> SharedMmdModel {
        Rc::new(RefCell::new(self))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn materials(&self) -> &[SharedMaterial] {
        &self.materials
    }

    pub fn bones(&self) -> &[MmdBone] {
        &self.bones
    }

    pub fn bone_index(&self, name: &str) -> Option<u32> {
        self.bone_name_index_map.get(name).copied()
    }

    /// Whether the model carries rigid bodies to simulate.
    pub fn has_physics(&self) -> bool {
        self.rigidbody_count != 0
    }

    pub fn rigidbody_count(&self) -> u32 {
        self.rigidbody_count
    }

    pub fn joint_count(&self) -> u32 {
        self.joint_count
    }

    pub fn parameter_controller(&self) -> &MmdParameterController {
        &self.parameter_controller
    }

    pub fn parameter_controller_mut(&mut self) -> &mut MmdParameterController {
        &mut self.parameter_controller
    }

    /// Unknown bone names are ignored.
    pub fn set_bone_pose(&mut self, name: &str, pose: BoneTransform) {
        if let Some(index) = self.bone_index(name) {
            self.bones[index as usize].pose = pose;
        }
    }

    pub fn bone_pose(&self, name: &str) -> Option<BoneTransform> {
        self.bone_index(name)
            .map(|index| self.bones[index as usize].pose)
    }

    pub fn reset_pose(&mut self) {
        for bone in &mut self.bones {
            bone.pose = BoneTransform::default();
        }
    }

    /// Local transform of a bone with its bone morph offset applied.
    pub fn final_bone_transform(&self, index: u32) -> Option<BoneTransform> {
        let bone = self.bones.get(index as usize)?;
        let offset = self
            .parameter_controller
            .morph_controller()
            .bone_offset(index)
            .copied()
            .unwrap_or_default();

        Some(BoneTransform {
            translation: bone.pose.translation + offset.translation,
            rotation: bone.pose.rotation * offset.rotation,
        })
    }

    pub fn set_morph_weight(&mut self, name: &str, weight: f32) {
        self.parameter_controller.set_morph_weight(name, weight);
    }

    pub fn morph_weight(&self, name: &str) -> f32 {
        self.parameter_controller.morph_weight(name)
    }

    /// Resolves pending morph weight changes into materials and bone offsets.
    pub fn update_morphs(&mut self) -> MorphApplyReport {
        self.parameter_controller.apply()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmd_math::Quat;
    use mmd_resource::{MmdBoneSource, MmdMorphBoneElement, MmdMorphKind, MmdMorphSource};

    fn make_source() -> MmdModelSource {
        let mut source = MmdModelSource::new("miku".to_owned());
        source.bones = vec![
            MmdBoneSource {
                name: "全ての親".to_owned(),
                parent_index: None,
                position: Vec3::ZERO,
            },
            MmdBoneSource {
                name: "頭".to_owned(),
                parent_index: Some(0),
                position: Vec3::new(0.0, 15.0, 0.0),
            },
        ];
        source.morphs = vec![MmdMorphSource {
            name: "lift".to_owned(),
            kind: MmdMorphKind::Bone(vec![MmdMorphBoneElement {
                bone_index: 1,
                translation: Vec3::new(0.0, 2.0, 0.0),
                rotation: Quat::IDENTITY,
            }]),
        }];
        source
    }

    #[test]
    fn test_model_final_bone_transform_includes_morph_offset() {
        let mut model = MmdModel::from_source(&make_source());
        assert!(!model.has_physics());

        model.set_bone_pose(
            "頭",
            BoneTransform {
                translation: Vec3::new(1.0, 0.0, 0.0),
                rotation: Quat::IDENTITY,
            },
        );
        model.set_bone_pose("unknown", BoneTransform::default());
        model.set_morph_weight("lift", 1.0);
        model.update_morphs();

        let transform = model.final_bone_transform(1).unwrap();
        assert_eq!(transform.translation, Vec3::new(1.0, 2.0, 0.0));
        assert!(model.final_bone_transform(2).is_none());
    }

    #[test]
    fn test_model_reset_pose() {
        let mut model = MmdModel::from_source(&make_source());
        model.set_bone_pose(
            "全ての親",
            BoneTransform {
                translation: Vec3::ONE,
                rotation: Quat::IDENTITY,
            },
        );
        model.reset_pose();

        assert_eq!(model.bone_pose("全ての親"), Some(BoneTransform::default()));
    }
}
