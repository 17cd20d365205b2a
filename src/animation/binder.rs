use crate::animation::clip::{AnimationClip, TrackData};
use crate::animation::skeleton::AnimSkeleton;

/// Defines the joint channel a track drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetPath {
    Translation,
    Rotation,
    Scale,
}

/// Maps track `track_index` of a clip onto joint `joint_index` of a skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointBinding {
    pub track_index: usize,
    pub joint_index: usize,
    pub target: TargetPath,
}

pub struct Binder;

impl Binder {
    /// Resolves clip tracks to skeleton joints by name.
    ///
    /// Tracks whose joint is missing, or whose value type does not match the
    /// target channel, are skipped.
    #[must_use]
    pub fn bind(skeleton: &AnimSkeleton, clip: &AnimationClip) -> Vec<JointBinding> {
        let mut bindings = Vec::with_capacity(clip.tracks.len());

        for (track_index, track) in clip.tracks.iter().enumerate() {
            let target = track.meta.target;
            let type_ok = matches!(
                (&track.data, target),
                (TrackData::Quaternion(_), TargetPath::Rotation)
                    | (TrackData::Vector3(_), TargetPath::Translation | TargetPath::Scale)
            );
            if !type_ok {
                log::warn!(
                    "Clip '{}': track {track_index} has a value type that cannot drive {target:?}",
                    clip.name
                );
                continue;
            }

            match skeleton.name_to_joint_index(&track.meta.joint_name) {
                Some(joint_index) => bindings.push(JointBinding {
                    track_index,
                    joint_index,
                    target,
                }),
                None => log::debug!(
                    "Clip '{}': joint '{}' not in skeleton, track skipped",
                    clip.name,
                    track.meta.joint_name
                ),
            }
        }

        bindings
    }
}
