use super::{
    AnimationStore, AssetFetcher, LoadEvents, LoadKind, LoadedListener, PendingLoad,
    ProgressListener,
};
use crate::{
    animation::AnimationClip,
    model::{MmdModel, SharedMmdModel},
};
use log::{info, warn};
use mmd_resource::MmdModelSource;
use std::{cell::RefCell, rc::Rc};

pub type SharedModelLoader = Rc<RefCell<ModelLoader>>;

/// Loads one model and the motions that can be played on it.
#[derive(Debug, Default)]
pub struct ModelLoader {
    model: Option<SharedMmdModel>,
    pending_model: Option<PendingLoad<MmdModelSource>>,
    animations: AnimationStore,
    events: LoadEvents,
}

impl ModelLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_shared(self) -> SharedModelLoader {
        Rc::new(RefCell::new(self))
    }

    /// Starts loading a model. A model load already in flight is abandoned.
    pub fn load_model(&mut self, fetcher: &dyn AssetFetcher, name: &str) {
        self.pending_model = Some(PendingLoad::new(name, fetcher.fetch_model(name)));
    }

    /// Uses an already built model.
    pub fn set_model(&mut self, model: MmdModel) -> SharedMmdModel {
        self.pending_model = None;
        let model = model.into_shared();
        self.model = Some(model.clone());
        model
    }

    /// Starts loading a motion. Returns `false` if it is already loaded or in flight.
    pub fn load_animation(&mut self, fetcher: &dyn AssetFetcher, name: &str) -> bool {
        self.animations.load(fetcher, name)
    }

    pub fn insert_animation(&mut self, clip: AnimationClip) -> Rc<AnimationClip> {
        self.animations.insert(clip)
    }

    /// Observes completed loads. An asset that became ready is visible after this call.
    pub fn poll(&mut self) {
        if let Some(pending) = &mut self.pending_model {
            if let Some(progress) = pending.poll_progress() {
                self.events
                    .emit_progress(LoadKind::Model, &pending.name, &progress);
            }

            if let Some(result) = pending.task.try_take() {
                let name = pending.name.clone();
                self.pending_model = None;

                match result {
                    Ok(source) => {
                        let model = MmdModel::from_source(&source);
                        info!(
                            "model `{}` loaded; {} materials, {} bones, {} morphs",
                            name,
                            model.materials().len(),
                            model.bones().len(),
                            model.parameter_controller().morph_controller().morph_count()
                        );
                        self.model = Some(model.into_shared());
                        self.events.emit_loaded(LoadKind::Model, &name);
                    }
                    Err(err) => {
                        warn!("failed to load model `{}`: {}", name, err);
                    }
                }
            }
        }

        self.animations.poll(&mut self.events);
    }

    pub fn model(&self) -> Option<&SharedMmdModel> {
        self.model.as_ref()
    }

    pub fn is_model_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn is_model_loading(&self) -> bool {
        self.pending_model.is_some()
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

    /// Drops in-flight loads. Loaded assets stay.
    pub fn disable(&mut self) {
        self.pending_model = None;
        self.animations.cancel_pending();
    }

    /// Drops in-flight loads and every loaded asset.
    pub fn destroy(&mut self) {
        self.disable();
        self.model = None;
        self.animations.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{load_task, LoadCompleter, LoadTask, ProgressEvent};
    use mmd_resource::AnimationSource;

    #[derive(Default)]
    struct DeferredFetcher {
        model: RefCell<Option<LoadCompleter<MmdModelSource>>>,
    }

    impl AssetFetcher for DeferredFetcher {
        fn fetch_model(&self, _name: &str) -> LoadTask<MmdModelSource> {
            let (task, completer) = load_task();
            *self.model.borrow_mut() = Some(completer);
            task
        }

        fn fetch_animation(&self, _name: &str) -> LoadTask<AnimationSource> {
            LoadTask::ready(Ok(AnimationSource::default()))
        }
    }

    #[test]
    fn test_model_loader_completes_on_next_poll() {
        let fetcher = DeferredFetcher::default();
        let mut loader = ModelLoader::new();
        let progress = Rc::new(RefCell::new(Vec::new()));

        let sink = progress.clone();
        loader.on_progress(Box::new(move |kind, _, event| {
            sink.borrow_mut().push((kind, *event));
        }));

        loader.load_model(&fetcher, "miku");
        loader.poll();
        assert!(loader.is_model_loading());
        assert!(!loader.is_model_loaded());

        let completer = fetcher.model.borrow_mut().take().unwrap();
        completer.report_progress(10, Some(10));
        completer.complete(Ok(MmdModelSource::new("miku".to_owned())));
        loader.poll();

        assert!(loader.is_model_loaded());
        assert_eq!(
            progress.borrow().last(),
            Some(&(LoadKind::Model, ProgressEvent::new(10, Some(10))))
        );
    }

    #[test]
    fn test_model_loader_disable_abandons_model_load() {
        let fetcher = DeferredFetcher::default();
        let mut loader = ModelLoader::new();

        loader.load_model(&fetcher, "miku");
        loader.load_animation(&fetcher, "dance");
        loader.disable();

        let completer = fetcher.model.borrow_mut().take().unwrap();
        assert!(!completer.complete(Ok(MmdModelSource::new("miku".to_owned()))));

        loader.poll();
        assert!(!loader.is_model_loaded());
        assert!(loader.animation("dance").is_none());
    }

    #[test]
    fn test_model_loader_animation_ready_after_poll() {
        let fetcher = DeferredFetcher::default();
        let mut loader = ModelLoader::new();

        assert!(loader.load_animation(&fetcher, "dance"));
        assert!(loader.is_animation_loading("dance"));

        loader.poll();
        assert!(!loader.is_animation_loading("dance"));
        assert_eq!(loader.animations().count(), 1);
    }
}
