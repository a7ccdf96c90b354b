mod animation_clip;
mod bezier_curve;
mod interpolation;

pub use animation_clip::*;
pub use bezier_curve::*;
pub use interpolation::*;
