#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadKind {
    Model,
    Motion,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub loaded: u64,
    /// `None` when the size is not known up front.
    pub total: Option<u64>,
}

impl ProgressEvent {
    pub fn new(loaded: u64, total: Option<u64>) -> Self {
        Self { loaded, total }
    }

    pub fn ratio(&self) -> Option<f32> {
        match self.total {
            Some(0) => Some(1.0),
            Some(total) => Some(self.loaded as f32 / total as f32),
            None => None,
        }
    }
}

pub type ProgressListener = Box<dyn FnMut(LoadKind, &str, &ProgressEvent)>;
pub type LoadedListener = Box<dyn FnMut(LoadKind, &str)>;

/// Listeners interested in the loads of one loader.
#[derive(Default)]
pub struct LoadEvents {
    progress_listeners: Vec<ProgressListener>,
    loaded_listeners: Vec<LoadedListener>,
}

impl LoadEvents {
    pub fn on_progress(&mut self, listener: ProgressListener) {
        self.progress_listeners.push(listener);
    }

    pub fn on_loaded(&mut self, listener: LoadedListener) {
        self.loaded_listeners.push(listener);
    }

    pub(crate) fn emit_progress(&mut self, kind: LoadKind, name: &str, event: &ProgressEvent) {
        for listener in &mut self.progress_listeners {
            listener(kind, name, event);
        }
    }

    pub(crate) fn emit_loaded(&mut self, kind: LoadKind, name: &str) {
        for listener in &mut self.loaded_listeners {
            listener(kind, name);
        }
    }
}

impl std::fmt::Debug for LoadEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadEvents")
            .field("progress_listeners", &self.progress_listeners.len())
            .field("loaded_listeners", &self.loaded_listeners.len())
            .finish()
    }
}
