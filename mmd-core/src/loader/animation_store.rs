use super::{AssetFetcher, LoadEvents, LoadKind, PendingLoad};
use crate::animation::AnimationClip;
use log::{debug, warn};
use mmd_resource::AnimationSource;
use std::{
    collections::{BTreeMap, HashSet},
    rc::Rc,
};

/// Loaded and in-flight animation clips of one loader, keyed by name.
#[derive(Debug, Default)]
pub struct AnimationStore {
    animations: BTreeMap<String, Rc<AnimationClip>>,
    loading: HashSet<String>,
    pending: Vec<PendingLoad<AnimationSource>>,
}

impl AnimationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts loading `name`. Returns `false` if it is already loaded or in flight.
    pub fn load(&mut self, fetcher: &dyn AssetFetcher, name: &str) -> bool {
        if self.animations.contains_key(name) || self.loading.contains(name) {
            return false;
        }

        debug!("loading animation `{}`", name);
        self.loading.insert(name.to_owned());
        self.pending
            .push(PendingLoad::new(name, fetcher.fetch_animation(name)));
        true
    }

    /// Registers an already built clip under its own name, replacing any clip with that name.
    pub fn insert(&mut self, clip: AnimationClip) -> Rc<AnimationClip> {
        let clip = Rc::new(clip);
        self.animations
            .insert(clip.name().to_owned(), clip.clone());
        clip
    }

    /// Moves completed loads into the store. Returns the number of clips that became available.
    pub fn poll(&mut self, events: &mut LoadEvents) -> usize {
        let mut loaded = 0;
        let mut index = 0;

        while index < self.pending.len() {
            let pending = &mut self.pending[index];

            if let Some(progress) = pending.poll_progress() {
                events.emit_progress(LoadKind::Motion, &pending.name, &progress);
            }

            let result = match pending.task.try_take() {
                Some(result) => result,
                None => {
                    index += 1;
                    continue;
                }
            };

            let pending = self.pending.remove(index);
            self.loading.remove(&pending.name);

            match result {
                Ok(source) => {
                    let clip = AnimationClip::from_source(pending.name.clone(), &source);
                    debug!(
                        "animation `{}` loaded; end frame {}",
                        pending.name,
                        clip.end_frame()
                    );
                    self.animations
                        .insert(pending.name.clone(), Rc::new(clip));
                    events.emit_loaded(LoadKind::Motion, &pending.name);
                    loaded += 1;
                }
                Err(err) => {
                    warn!("failed to load animation `{}`: {}", pending.name, err);
                }
            }
        }

        loaded
    }

    pub fn get(&self, name: &str) -> Option<Rc<AnimationClip>> {
        self.animations.get(name).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rc<AnimationClip>)> {
        self.animations
            .iter()
            .map(|(name, clip)| (name.as_str(), clip))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.animations.keys().map(String::as_str)
    }

    pub fn is_loading(&self, name: &str) -> bool {
        self.loading.contains(name)
    }

    pub fn has_pending(&self) -> bool {
        !self.loading.is_empty()
    }

    /// Drops every in-flight load. Late completions are discarded.
    pub fn cancel_pending(&mut self) {
        self.loading.clear();
        self.pending.clear();
    }

    pub fn clear(&mut self) {
        self.cancel_pending();
        self.animations.clear();
    }
}
