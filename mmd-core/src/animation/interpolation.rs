use super::BezierCurve;
use mmd_resource::Interpolation;

/// Maps the linear progress `t` of a key frame segment through its timing curve.
pub fn ease(interpolation: Interpolation, t: f32) -> f32 {
    match interpolation {
        Interpolation::Linear => t,
        Interpolation::Step => 0.0,
        Interpolation::Bezier { x1, y1, x2, y2 } => BezierCurve::interpolate(t, x1, y1, x2, y2),
        Interpolation::Hermite {
            start_slope,
            end_slope,
        } => {
            let t2 = t * t;
            let t3 = t2 * t;
            (t3 - 2.0 * t2 + t) * start_slope + (-2.0 * t3 + 3.0 * t2) + (t3 - t2) * end_slope
        }
    }
}

/// Position of a frame between two key frames.
#[derive(Debug)]
pub(crate) enum KeyFrameSegment<'a, K> {
    Empty,
    Single(&'a K),
    Between {
        current: &'a K,
        next: &'a K,
        /// `0` exactly at `current`, approaching `1` at `next`.
        amount: f32,
    },
}

/// `key_frames` must be sorted by frame index without duplicates.
pub(crate) fn find_segment<K>(
    key_frames: &[K],
    frame: f32,
    frame_index: impl Fn(&K) -> u32,
) -> KeyFrameSegment<K> {
    let (first, last) = match (key_frames.first(), key_frames.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return KeyFrameSegment::Empty,
    };

    if frame <= frame_index(first) as f32 {
        return KeyFrameSegment::Single(first);
    }

    if frame_index(last) as f32 <= frame {
        return KeyFrameSegment::Single(last);
    }

    let next_index = key_frames.partition_point(|key_frame| frame_index(key_frame) as f32 <= frame);
    let current = &key_frames[next_index - 1];
    let next = &key_frames[next_index];
    let span = (frame_index(next) - frame_index(current)) as f32;

    KeyFrameSegment::Between {
        current,
        next,
        amount: (frame - frame_index(current) as f32) / span,
    }
}
