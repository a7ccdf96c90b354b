use crate::{FromResourceKind, MaterialSource, ResourceKind};
use mmd_math::{Quat, Vec3, Vec4};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MmdModelSource {
    pub name: String,
    pub materials: Vec<MaterialSource>,
    pub bones: Vec<MmdBoneSource>,
    pub morphs: Vec<MmdMorphSource>,
    pub rigidbody_count: u32,
    pub joint_count: u32,
}

impl MmdModelSource {
    pub fn new(name: String) -> Self {
        Self {
            name,
            materials: Vec::new(),
            bones: Vec::new(),
            morphs: Vec::new(),
            rigidbody_count: 0,
            joint_count: 0,
        }
    }

    pub fn has_physics(&self) -> bool {
        self.rigidbody_count != 0
    }
}

impl FromResourceKind for MmdModelSource {
    fn from(kind: &ResourceKind) -> Option<&Self> {
        match kind {
            ResourceKind::MmdModel(model) => Some(model),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MmdBoneSource {
    pub name: String,
    pub parent_index: Option<u32>,
    pub position: Vec3,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MmdMorphSource {
    pub name: String,
    pub kind: MmdMorphKind,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub enum MmdMorphKind {
    Group(Vec<MmdMorphGroupElement>),
    Vertex,
    Bone(Vec<MmdMorphBoneElement>),
    Uv,
    /// Additional UV channel, `1..=4`.
    AdditionalUv(u8),
    Material(Vec<MmdMorphMaterialElement>),
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MmdMorphGroupElement {
    pub morph_index: u32,
    pub ratio: f32,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MmdMorphBoneElement {
    pub bone_index: u32,
    pub translation: Vec3,
    pub rotation: Quat,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MmdMorphMaterialOffsetMode {
    Multiply = 0,
    Additive = 1,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MmdMorphMaterialElement {
    /// Target material index, `-1` for every material of the model.
    pub material_index: i32,
    pub offset_mode: MmdMorphMaterialOffsetMode,
    pub diffuse: Vec4,
    pub specular: Vec3,
    pub shininess: f32,
    pub ambient: Vec3,
    pub edge_color: Vec4,
    pub edge_size: f32,
}

impl MmdMorphMaterialElement {
    /// Values that leave a material unchanged under the given offset mode.
    pub fn identity(material_index: i32, offset_mode: MmdMorphMaterialOffsetMode) -> Self {
        let (v3, v4, scalar) = match offset_mode {
            MmdMorphMaterialOffsetMode::Multiply => (Vec3::ONE, Vec4::ONE, 1.0),
            MmdMorphMaterialOffsetMode::Additive => (Vec3::ZERO, Vec4::ZERO, 0.0),
        };

        Self {
            material_index,
            offset_mode,
            diffuse: v4,
            specular: v3,
            shininess: scalar,
            ambient: v3,
            edge_color: v4,
            edge_size: scalar,
        }
    }
}
