use super::LoadTask;
use crate::LoadError;
use log::debug;
use mmd_resource::{AnimationSource, FromResourceKind, MmdModelSource, ResourceFile};

/// Source of parsed model and motion data.
pub trait AssetFetcher {
    fn fetch_model(&self, name: &str) -> LoadTask<MmdModelSource>;
    fn fetch_animation(&self, name: &str) -> LoadTask<AnimationSource>;
}

/// Serves assets out of a loaded resource file. Every fetch completes immediately.
#[derive(Debug)]
pub struct ResourceFetcher {
    resource: ResourceFile,
}

impl ResourceFetcher {
    pub fn new(resource: ResourceFile) -> Self {
        Self { resource }
    }

    pub fn resource(&self) -> &ResourceFile {
        &self.resource
    }

    fn fetch<T>(&self, name: &str, kind: &str) -> LoadTask<T>
    where
        T: FromResourceKind + Clone,
    {
        let (task, completer) = super::load_task();
        completer.report_progress(1, Some(1));

        let result = match self.resource.find::<T>(name) {
            Some(source) => {
                debug!("fetched resource `{}`", name);
                Ok(source.clone())
            }
            None if self.resource.find_by_name(name).is_some() => Err(LoadError::FetchFailed {
                name: name.to_owned(),
                reason: format!("the resource is not a {}", kind),
            }),
            None => Err(LoadError::NotFound(name.to_owned())),
        };

        completer.complete(result);
        task
    }
}

impl AssetFetcher for ResourceFetcher {
    fn fetch_model(&self, name: &str) -> LoadTask<MmdModelSource> {
        self.fetch(name, "model")
    }

    fn fetch_animation(&self, name: &str) -> LoadTask<AnimationSource> {
        self.fetch(name, "motion")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmd_resource::{Resource, ResourceFileVersion, ResourceKind};

    #[test]
    fn test_resource_fetcher() {
        let fetcher = ResourceFetcher::new(ResourceFile::new(
            ResourceFileVersion::V1,
            vec![Resource {
                name: "dance".to_owned(),
                kind: ResourceKind::Animation(AnimationSource::default()),
            }],
        ));

        let mut task = fetcher.fetch_animation("dance");
        assert!(matches!(task.try_take(), Some(Ok(_))));

        let mut task = fetcher.fetch_model("dance");
        assert_eq!(
            task.try_take().map(|result| result.err()),
            Some(Some(LoadError::FetchFailed {
                name: "dance".to_owned(),
                reason: "the resource is not a model".to_owned(),
            }))
        );

        let mut task = fetcher.fetch_animation("walk");
        assert_eq!(
            task.try_take().map(|result| result.err()),
            Some(Some(LoadError::NotFound("walk".to_owned())))
        );
    }
}
