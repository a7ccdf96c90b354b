use mmd_math::{Vec3, Vec4};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MaterialSource {
    pub name: String,
    pub properties: BTreeMap<String, MaterialPropertyValue>,
}

impl MaterialSource {
    pub fn new(name: String, properties: BTreeMap<String, MaterialPropertyValue>) -> Self {
        Self { name, properties }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum MaterialPropertyValue {
    Float(f32),
    Vec3(Vec3),
    Vec4(Vec4),
}

impl MaterialPropertyValue {
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            Self::Vec3(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_vec4(&self) -> Option<Vec4> {
        match self {
            Self::Vec4(value) => Some(*value),
            _ => None,
        }
    }
}
