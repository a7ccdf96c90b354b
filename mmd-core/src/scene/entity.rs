use super::{ObjectId, ObjectIdAllocator};
use crate::loader::{SharedCameraLoader, SharedModelLoader};
use std::fmt::{Display, Formatter, Result as FmtResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Model,
    Camera,
    Other,
}

/// Everything the scene can hold.
#[derive(Debug, Clone)]
pub enum SceneEntity {
    Model(SharedModelLoader),
    Camera(SharedCameraLoader),
    Other(String),
}

impl SceneEntity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Model(_) => EntityKind::Model,
            Self::Camera(_) => EntityKind::Camera,
            Self::Other(_) => EntityKind::Other,
        }
    }

    /// One line description for inspectors.
    pub fn summary(&self) -> EntitySummary {
        match self {
            Self::Model(loader) => {
                let loader = loader.borrow();
                let name = loader.model().map_or_else(
                    || "(loading)".to_owned(),
                    |model| model.borrow().name().to_owned(),
                );
                let animation_count = loader.animations().count();

                EntitySummary {
                    kind: EntityKind::Model,
                    name,
                    animation_count,
                }
            }
            Self::Camera(loader) => EntitySummary {
                kind: EntityKind::Camera,
                name: "camera".to_owned(),
                animation_count: loader.borrow().animations().count(),
            },
            Self::Other(name) => EntitySummary {
                kind: EntityKind::Other,
                name: name.clone(),
                animation_count: 0,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySummary {
    pub kind: EntityKind,
    pub name: String,
    pub animation_count: usize,
}

impl Display for EntitySummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{:?} `{}` ({} animations)",
            self.kind, self.name, self.animation_count
        )
    }
}

/// Scene entities keyed by object id.
#[derive(Debug, Default)]
pub struct EntityTable {
    allocator: ObjectIdAllocator,
    entities: Vec<Option<SceneEntity>>,
    len: usize,
}

impl EntityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert(&mut self, entity: SceneEntity) -> Option<ObjectId> {
        let id = self.allocator.allocate()?;
        let index = id.index();

        if self.entities.len() <= index {
            self.entities.resize_with(index + 1, || None);
        }

        self.entities[index] = Some(entity);
        self.len += 1;
        Some(id)
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<SceneEntity> {
        let entity = self.entities.get_mut(id.index())?.take()?;
        self.allocator.deallocate(id);
        self.len -= 1;
        Some(entity)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneEntity> {
        self.entities.get(id.index())?.as_ref()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &SceneEntity)> {
        self.entities
            .iter()
            .enumerate()
            .filter_map(|(index, entity)| {
                let id = std::num::NonZeroU32::new(index as u32 + 1)?;
                entity.as_ref().map(|entity| (ObjectId::new(id), entity))
            })
    }

    pub fn models(&self) -> impl Iterator<Item = (ObjectId, &SharedModelLoader)> {
        self.iter().filter_map(|(id, entity)| match entity {
            SceneEntity::Model(loader) => Some((id, loader)),
            _ => None,
        })
    }

    pub fn cameras(&self) -> impl Iterator<Item = (ObjectId, &SharedCameraLoader)> {
        self.iter().filter_map(|(id, entity)| match entity {
            SceneEntity::Camera(loader) => Some((id, loader)),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        loader::{CameraLoader, ModelLoader},
        model::{MmdCamera, MmdModel},
    };
    use mmd_resource::MmdModelSource;

    #[test]
    fn test_entity_table_insert_remove() {
        let mut table = EntityTable::new();
        let light = table.insert(SceneEntity::Other("light".to_owned())).unwrap();
        let camera = table
            .insert(SceneEntity::Camera(CameraLoader::new(MmdCamera::new()).into_shared()))
            .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(camera).map(SceneEntity::kind), Some(EntityKind::Camera));

        assert!(table.remove(light).is_some());
        assert!(table.remove(light).is_none());
        assert!(table.get(light).is_none());
        assert_eq!(table.cameras().count(), 1);

        let reused = table.insert(SceneEntity::Other("fog".to_owned())).unwrap();
        assert_eq!(reused, light);
    }

    #[test]
    fn test_entity_summary() {
        let mut loader = ModelLoader::new();
        loader.set_model(MmdModel::from_source(&MmdModelSource::new("miku".to_owned())));
        let entity = SceneEntity::Model(loader.into_shared());

        assert_eq!(
            entity.summary(),
            EntitySummary {
                kind: EntityKind::Model,
                name: "miku".to_owned(),
                animation_count: 0,
            }
        );
        assert_eq!(
            SceneEntity::Model(ModelLoader::new().into_shared())
                .summary()
                .to_string(),
            "Model `(loading)` (0 animations)"
        );
    }
}
