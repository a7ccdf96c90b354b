mod animation_store;
mod asset_fetcher;
mod camera_loader;
mod load_task;
mod model_loader;
mod progress;

pub use animation_store::*;
pub use asset_fetcher::*;
pub use camera_loader::*;
pub use load_task::*;
pub use model_loader::*;
pub use progress::*;
