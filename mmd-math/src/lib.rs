mod ops;
mod quat;
mod vec3;
mod vec4;

pub use quat::*;
pub use vec3::*;
pub use vec4::*;

pub fn lerp_unclamped(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
