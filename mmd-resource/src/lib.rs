mod animation_source;
mod material_source;
mod mmd_model_source;

pub use animation_source::*;
pub use material_source::*;
pub use mmd_model_source::*;

use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter, Result as FmtResult},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResourceFileError {
    #[error("failed to encode resource file: {0}")]
    EncodeError(#[source] bincode::Error),
    #[error("failed to decode resource file: {0}")]
    DecodeError(#[source] bincode::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ResourceFile {
    version: ResourceFileVersion,
    resources: BTreeMap<String, Resource>,
}

impl ResourceFile {
    pub fn new(version: ResourceFileVersion, resources: Vec<Resource>) -> Self {
        Self {
            version,
            resources: BTreeMap::from_iter(
                resources
                    .into_iter()
                    .map(|resource| (resource.name.clone(), resource)),
            ),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ResourceFileError> {
        bincode::deserialize(bytes).map_err(ResourceFileError::DecodeError)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ResourceFileError> {
        bincode::serialize(self).map_err(ResourceFileError::EncodeError)
    }

    pub fn version(&self) -> ResourceFileVersion {
        self.version
    }

    pub fn resources(&self) -> &BTreeMap<String, Resource> {
        &self.resources
    }

    pub fn find<T>(&self, name: &str) -> Option<&T>
    where
        T: FromResourceKind,
    {
        self.resources
            .get(name)
            .and_then(|resource| T::from(&resource.kind))
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Resource> {
        self.resources.get(name)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceFileVersion {
    V1,
}

impl Display for ResourceFileVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::V1 => write!(f, "v1"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Resource {
    pub name: String,
    pub kind: ResourceKind,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub enum ResourceKind {
    MmdModel(MmdModelSource),
    Animation(AnimationSource),
}

impl ResourceKind {
    pub fn as_mmd_model_source(&self) -> Option<&MmdModelSource> {
        match self {
            Self::MmdModel(model) => Some(model),
            _ => None,
        }
    }

    pub fn as_animation_source(&self) -> Option<&AnimationSource> {
        match self {
            Self::Animation(animation) => Some(animation),
            _ => None,
        }
    }
}

pub trait FromResourceKind {
    fn from(kind: &ResourceKind) -> Option<&Self>;
}
