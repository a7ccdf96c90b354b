use super::{ease, find_segment, KeyFrameSegment};
use mmd_math::{lerp_unclamped, Quat, Vec3};
use mmd_resource::{AnimationSource, BoneKeyFrame, CameraKeyFrame, MorphKeyFrame};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneTransform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for BoneTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTransform {
    pub target_position: Vec3,
    pub rotation: Vec3,
    pub distance: f32,
    pub fov: f32,
    pub is_perspective: bool,
}

/// A named, immutable set of key frame tracks.
#[derive(Debug)]
pub struct AnimationClip {
    name: String,
    bone_tracks: HashMap<String, Vec<BoneKeyFrame>>,
    morph_tracks: HashMap<String, Vec<MorphKeyFrame>>,
    camera_key_frames: Vec<CameraKeyFrame>,
    end_frame: u32,
}

impl AnimationClip {
    pub fn from_source(name: impl Into<String>, source: &AnimationSource) -> Self {
        let mut end_frame = 0;
        let mut bone_tracks = HashMap::with_capacity(source.bone_tracks.len());
        let mut morph_tracks = HashMap::with_capacity(source.morph_tracks.len());

        for track in &source.bone_tracks {
            let key_frames: &mut Vec<BoneKeyFrame> =
                bone_tracks.entry(track.bone_name.clone()).or_default();
            key_frames.extend(track.key_frames.iter().cloned());
        }

        for track in &source.morph_tracks {
            let key_frames: &mut Vec<MorphKeyFrame> =
                morph_tracks.entry(track.morph_name.clone()).or_default();
            key_frames.extend(track.key_frames.iter().cloned());
        }

        for key_frames in bone_tracks.values_mut() {
            end_frame = end_frame.max(normalize_key_frames(key_frames, |kf| kf.frame_index));
        }

        for key_frames in morph_tracks.values_mut() {
            end_frame = end_frame.max(normalize_key_frames(key_frames, |kf| kf.frame_index));
        }

        let mut camera_key_frames = source.camera_key_frames.clone();
        end_frame = end_frame.max(normalize_key_frames(&mut camera_key_frames, |kf| {
            kf.frame_index
        }));

        Self {
            name: name.into(),
            bone_tracks,
            morph_tracks,
            camera_key_frames,
            end_frame,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The last key frame index over every track.
    pub fn end_frame(&self) -> u32 {
        self.end_frame
    }

    pub fn has_camera_track(&self) -> bool {
        !self.camera_key_frames.is_empty()
    }

    pub fn bone_names(&self) -> impl Iterator<Item = &str> {
        self.bone_tracks.keys().map(String::as_str)
    }

    pub fn morph_names(&self) -> impl Iterator<Item = &str> {
        self.morph_tracks.keys().map(String::as_str)
    }

    pub fn sample_bone(&self, bone_name: &str, frame: f32) -> Option<BoneTransform> {
        let key_frames = self.bone_tracks.get(bone_name)?;

        match find_segment(key_frames, frame, |kf| kf.frame_index) {
            KeyFrameSegment::Empty => None,
            KeyFrameSegment::Single(key_frame) => Some(BoneTransform {
                translation: key_frame.translation,
                rotation: key_frame.rotation,
            }),
            KeyFrameSegment::Between {
                current,
                next,
                amount,
            } => {
                let curves = &next.interpolation;
                let translation = Vec3::new(
                    lerp_unclamped(
                        current.translation.x,
                        next.translation.x,
                        ease(curves.x_axis, amount),
                    ),
                    lerp_unclamped(
                        current.translation.y,
                        next.translation.y,
                        ease(curves.y_axis, amount),
                    ),
                    lerp_unclamped(
                        current.translation.z,
                        next.translation.z,
                        ease(curves.z_axis, amount),
                    ),
                );
                let rotation = Quat::slerp(
                    current.rotation,
                    next.rotation,
                    ease(curves.rotation, amount),
                );

                Some(BoneTransform {
                    translation,
                    rotation,
                })
            }
        }
    }

    pub fn sample_bones(&self, frame: f32) -> impl Iterator<Item = (&str, BoneTransform)> {
        self.bone_tracks.keys().filter_map(move |name| {
            self.sample_bone(name, frame)
                .map(|transform| (name.as_str(), transform))
        })
    }

    pub fn sample_morph(&self, morph_name: &str, frame: f32) -> Option<f32> {
        let key_frames = self.morph_tracks.get(morph_name)?;

        match find_segment(key_frames, frame, |kf| kf.frame_index) {
            KeyFrameSegment::Empty => None,
            KeyFrameSegment::Single(key_frame) => Some(key_frame.weight),
            KeyFrameSegment::Between {
                current,
                next,
                amount,
            } => Some(lerp_unclamped(
                current.weight,
                next.weight,
                ease(next.interpolation, amount),
            )),
        }
    }

    pub fn sample_morphs(&self, frame: f32) -> impl Iterator<Item = (&str, f32)> {
        self.morph_tracks.keys().filter_map(move |name| {
            self.sample_morph(name, frame)
                .map(|weight| (name.as_str(), weight))
        })
    }

    /// Key frames one frame apart are treated as a camera cut and never blended.
    pub fn sample_camera(&self, frame: f32) -> Option<CameraTransform> {
        match find_segment(&self.camera_key_frames, frame, |kf| kf.frame_index) {
            KeyFrameSegment::Empty => None,
            KeyFrameSegment::Single(key_frame) => Some(camera_transform_of(key_frame)),
            KeyFrameSegment::Between { current, next, .. }
                if next.frame_index - current.frame_index <= 1 =>
            {
                Some(camera_transform_of(current))
            }
            KeyFrameSegment::Between {
                current,
                next,
                amount,
            } => {
                let curves = &next.interpolation;
                let rotation_amount = ease(curves.rotation, amount);

                Some(CameraTransform {
                    target_position: Vec3::new(
                        lerp_unclamped(
                            current.target_position.x,
                            next.target_position.x,
                            ease(curves.x_axis, amount),
                        ),
                        lerp_unclamped(
                            current.target_position.y,
                            next.target_position.y,
                            ease(curves.y_axis, amount),
                        ),
                        lerp_unclamped(
                            current.target_position.z,
                            next.target_position.z,
                            ease(curves.z_axis, amount),
                        ),
                    ),
                    rotation: Vec3::lerp_unclamped(
                        current.rotation,
                        next.rotation,
                        rotation_amount,
                    ),
                    distance: lerp_unclamped(
                        current.distance,
                        next.distance,
                        ease(curves.distance, amount),
                    ),
                    fov: lerp_unclamped(current.fov, next.fov, ease(curves.fov, amount)),
                    is_perspective: current.is_perspective,
                })
            }
        }
    }
}

fn camera_transform_of(key_frame: &CameraKeyFrame) -> CameraTransform {
    CameraTransform {
        target_position: key_frame.target_position,
        rotation: key_frame.rotation,
        distance: key_frame.distance,
        fov: key_frame.fov,
        is_perspective: key_frame.is_perspective,
    }
}

/// Sorts by frame index, keeps the last key of duplicated frames and returns the last frame index.
fn normalize_key_frames<K>(key_frames: &mut Vec<K>, frame_index: impl Fn(&K) -> u32) -> u32 {
    key_frames.sort_by_key(|kf| frame_index(kf));

    let mut deduped: Vec<K> = Vec::with_capacity(key_frames.len());

    for key_frame in key_frames.drain(..) {
        match deduped.last_mut() {
            Some(last) if frame_index(last) == frame_index(&key_frame) => *last = key_frame,
            _ => deduped.push(key_frame),
        }
    }

    *key_frames = deduped;
    key_frames.last().map_or(0, |kf| frame_index(kf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmd_resource::{
        BoneInterpolation, BoneTrackSource, CameraInterpolation, Interpolation, MorphTrackSource,
    };

    fn bone_key_frame(frame_index: u32, x: f32) -> BoneKeyFrame {
        BoneKeyFrame {
            frame_index,
            translation: Vec3::new(x, 0.0, 0.0),
            rotation: Quat::IDENTITY,
            interpolation: BoneInterpolation::default(),
        }
    }

    fn camera_key_frame(frame_index: u32, distance: f32) -> CameraKeyFrame {
        CameraKeyFrame {
            frame_index,
            distance,
            target_position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            fov: 30.0,
            is_perspective: true,
            interpolation: CameraInterpolation::default(),
        }
    }

    fn make_clip() -> AnimationClip {
        let source = AnimationSource {
            bone_tracks: vec![BoneTrackSource {
                bone_name: "センター".to_owned(),
                key_frames: vec![bone_key_frame(20, 2.0), bone_key_frame(0, 0.0)],
            }],
            morph_tracks: vec![MorphTrackSource {
                morph_name: "まばたき".to_owned(),
                key_frames: vec![
                    MorphKeyFrame {
                        frame_index: 0,
                        weight: 0.0,
                        interpolation: Interpolation::Linear,
                    },
                    MorphKeyFrame {
                        frame_index: 10,
                        weight: 1.0,
                        interpolation: Interpolation::Step,
                    },
                ],
            }],
            camera_key_frames: vec![
                camera_key_frame(0, -40.0),
                camera_key_frame(30, -20.0),
                camera_key_frame(31, -10.0),
                camera_key_frame(45, -10.0),
            ],
        };

        AnimationClip::from_source("dance", &source)
    }

    #[test]
    fn test_clip_end_frame_spans_all_tracks() {
        let clip = make_clip();
        assert_eq!(clip.name(), "dance");
        assert_eq!(clip.end_frame(), 45);
        assert!(clip.has_camera_track());
    }

    #[test]
    fn test_clip_sample_bone_sorts_key_frames() {
        let clip = make_clip();
        let transform = clip.sample_bone("センター", 10.0).unwrap();
        assert!((transform.translation.x - 1.0).abs() < 1e-5);

        let after_end = clip.sample_bone("センター", 100.0).unwrap();
        assert_eq!(after_end.translation.x, 2.0);
        assert!(clip.sample_bone("unknown", 10.0).is_none());
    }

    #[test]
    fn test_clip_sample_morph_step() {
        let clip = make_clip();
        assert_eq!(clip.sample_morph("まばたき", 9.5), Some(0.0));
        assert_eq!(clip.sample_morph("まばたき", 10.0), Some(1.0));
        assert_eq!(clip.sample_morphs(10.0).count(), 1);
    }

    #[test]
    fn test_clip_sample_camera_cut() {
        let clip = make_clip();

        let blended = clip.sample_camera(15.0).unwrap();
        assert!((blended.distance + 30.0).abs() < 1e-4);

        let cut = clip.sample_camera(30.5).unwrap();
        assert_eq!(cut.distance, -20.0);
    }

    #[test]
    fn test_normalize_key_frames_keeps_last_duplicate() {
        let mut key_frames = vec![(5, 'a'), (1, 'b'), (5, 'c')];
        let last = normalize_key_frames(&mut key_frames, |kf| kf.0);

        assert_eq!(last, 5);
        assert_eq!(key_frames, vec![(1, 'b'), (5, 'c')]);
    }
}
