use std::sync::Arc;

use glam::{Quat, Vec3};
use rustc_hash::FxHashMap;

use crate::animation::binder::TargetPath;
use crate::animation::tracks::KeyframeTrack;

#[derive(Debug, Clone)]
pub struct TrackMeta {
    pub joint_name: String,
    pub target: TargetPath,
}

#[derive(Debug, Clone)]
pub enum TrackData {
    Vector3(KeyframeTrack<Vec3>),
    Quaternion(KeyframeTrack<Quat>),
}

impl TrackData {
    #[must_use]
    pub fn last_frame(&self) -> f32 {
        match self {
            TrackData::Vector3(t) => t.last_frame(),
            TrackData::Quaternion(t) => t.last_frame(),
        }
    }
}

/// A track definition: which joint channel it drives plus its keyframes.
#[derive(Debug, Clone)]
pub struct Track {
    pub meta: TrackMeta,
    pub data: TrackData,
}

impl Track {
    #[must_use]
    pub fn rotation(joint_name: &str, track: KeyframeTrack<Quat>) -> Self {
        Self {
            meta: TrackMeta {
                joint_name: joint_name.to_string(),
                target: TargetPath::Rotation,
            },
            data: TrackData::Quaternion(track),
        }
    }

    #[must_use]
    pub fn translation(joint_name: &str, track: KeyframeTrack<Vec3>) -> Self {
        Self {
            meta: TrackMeta {
                joint_name: joint_name.to_string(),
                target: TargetPath::Translation,
            },
            data: TrackData::Vector3(track),
        }
    }

    #[must_use]
    pub fn scale(joint_name: &str, track: KeyframeTrack<Vec3>) -> Self {
        Self {
            meta: TrackMeta {
                joint_name: joint_name.to_string(),
                target: TargetPath::Scale,
            },
            data: TrackData::Vector3(track),
        }
    }
}

/// Keyframed joint animation. `frame_count` is the frame of the last key.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub frame_count: f32,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    #[must_use]
    pub fn new(name: &str, tracks: Vec<Track>) -> Self {
        let frame_count = tracks
            .iter()
            .map(|t| t.data.last_frame())
            .fold(0.0_f32, f32::max);

        Self {
            name: name.to_string(),
            frame_count,
            tracks,
        }
    }
}

/// Clips addressable by url, used by the graph loader to resolve clip nodes.
pub type ClipLibrary = FxHashMap<String, Arc<AnimationClip>>;
