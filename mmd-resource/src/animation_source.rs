use crate::{FromResourceKind, ResourceKind};
use mmd_math::{Quat, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct AnimationSource {
    pub bone_tracks: Vec<BoneTrackSource>,
    pub morph_tracks: Vec<MorphTrackSource>,
    pub camera_key_frames: Vec<CameraKeyFrame>,
}

impl FromResourceKind for AnimationSource {
    fn from(kind: &ResourceKind) -> Option<&Self> {
        match kind {
            ResourceKind::Animation(animation) => Some(animation),
            _ => None,
        }
    }
}

/// Timing curve of the segment that ends at a key frame.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum Interpolation {
    Linear,
    Step,
    /// Four-point Bezier curve `(0, 0)`, `(x1, y1)`, `(x2, y2)`, `(1, 1)`.
    Bezier {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    },
    /// Cubic Hermite easing from `0` to `1` with the given end slopes.
    Hermite {
        start_slope: f32,
        end_slope: f32,
    },
}

impl Interpolation {
    /// VMD stores Bezier control points as `[x1, y1, x2, y2]` in `0..=127`.
    pub fn from_vmd_bezier(data: [u8; 4]) -> Self {
        Self::Bezier {
            x1: data[0] as f32 / 127.0,
            y1: data[1] as f32 / 127.0,
            x2: data[2] as f32 / 127.0,
            y2: data[3] as f32 / 127.0,
        }
    }
}

impl Default for Interpolation {
    fn default() -> Self {
        Self::Linear
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BoneTrackSource {
    pub bone_name: String,
    pub key_frames: Vec<BoneKeyFrame>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BoneKeyFrame {
    pub frame_index: u32,
    pub translation: Vec3,
    pub rotation: Quat,
    pub interpolation: BoneInterpolation,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct BoneInterpolation {
    pub x_axis: Interpolation,
    pub y_axis: Interpolation,
    pub z_axis: Interpolation,
    pub rotation: Interpolation,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MorphTrackSource {
    pub morph_name: String,
    pub key_frames: Vec<MorphKeyFrame>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MorphKeyFrame {
    pub frame_index: u32,
    pub weight: f32,
    #[serde(default)]
    pub interpolation: Interpolation,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CameraKeyFrame {
    pub frame_index: u32,
    /// Distance from the camera to the target.
    pub distance: f32,
    pub target_position: Vec3,
    /// Euler angles of the camera, in radians.
    pub rotation: Vec3,
    /// Vertical field of view, in degrees.
    pub fov: f32,
    /// `true` if the camera is in perspective mode, orthographic mode otherwise.
    pub is_perspective: bool,
    pub interpolation: CameraInterpolation,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraInterpolation {
    pub x_axis: Interpolation,
    pub y_axis: Interpolation,
    pub z_axis: Interpolation,
    pub rotation: Interpolation,
    pub distance: Interpolation,
    pub fov: Interpolation,
}
