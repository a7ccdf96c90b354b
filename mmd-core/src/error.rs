use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    #[error("no model loader is registered; at least one is required to play")]
    NoModelLoader,
    #[error("camera animation `{0}` was requested but no camera loader is registered")]
    NoCameraLoader(String),
    #[error("{animations} animation names were given for {loaders} model loaders")]
    AnimationCountMismatch { loaders: usize, animations: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
    #[error("the scene environment has already been created")]
    AlreadyCreated,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("asset `{0}` was not found")]
    NotFound(String),
    #[error("asset `{name}` could not be fetched: {reason}")]
    FetchFailed { name: String, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("sequencing error: {0}")]
    SequenceError(#[from] SequenceError),
    #[error("scene environment error: {0}")]
    EnvironmentError(#[from] EnvironmentError),
    #[error("load error: {0}")]
    LoadError(#[from] LoadError),
}
