use std::sync::Arc;

use crate::animation::binder::{Binder, JointBinding, TargetPath};
use crate::animation::clip::{AnimationClip, TrackData};
use crate::animation::nodes::{Triggers, accumulate_time};
use crate::animation::pose::AnimPoseVec;
use crate::animation::skeleton::AnimSkeleton;
use crate::animation::tracks::KeyframeCursor;
use crate::animation::variant::AnimVariantMap;

/// Leaf node playing a keyframed clip between two frames.
#[derive(Debug)]
pub struct AnimClip {
    id: String,
    clip: Arc<AnimationClip>,

    pub start_frame: f32,
    pub end_frame: f32,
    pub time_scale: f32,
    pub loop_flag: bool,

    time_scale_var: String,
    loop_flag_var: String,

    frame: f32,

    skeleton: Option<Arc<AnimSkeleton>>,
    bindings: Vec<JointBinding>,
    track_cursors: Vec<KeyframeCursor>,
    poses: AnimPoseVec,
}

impl AnimClip {
    #[must_use]
    pub fn new(
        id: &str,
        clip: Arc<AnimationClip>,
        start_frame: f32,
        end_frame: f32,
        time_scale: f32,
        loop_flag: bool,
    ) -> Self {
        let track_count = clip.tracks.len();
        Self {
            id: id.to_string(),
            clip,
            start_frame,
            end_frame,
            time_scale,
            loop_flag,
            time_scale_var: String::new(),
            loop_flag_var: String::new(),
            frame: start_frame.min(end_frame),
            skeleton: None,
            bindings: Vec::new(),
            track_cursors: vec![KeyframeCursor::default(); track_count],
            poses: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    pub fn set_time_scale_var(&mut self, var: &str) {
        self.time_scale_var = var.to_string();
    }

    pub fn set_loop_flag_var(&mut self, var: &str) {
        self.loop_flag_var = var.to_string();
    }

    /// Current playback frame.
    #[must_use]
    pub fn frame(&self) -> f32 {
        self.frame
    }

    /// Frames in one loop, counting the wrap frame between end and start.
    #[must_use]
    pub fn natural_length(&self) -> f32 {
        (self.end_frame - self.start_frame).abs() + 1.0
    }

    #[must_use]
    pub fn poses(&self) -> &AnimPoseVec {
        &self.poses
    }

    pub fn set_skeleton(&mut self, skeleton: Arc<AnimSkeleton>) {
        self.bindings = Binder::bind(&skeleton, &self.clip);
        self.track_cursors.fill(KeyframeCursor::default());
        self.skeleton = Some(skeleton);
    }

    pub fn set_current_frame(&mut self, frame: f32) {
        let start = self.start_frame.min(self.end_frame);
        let end = self.start_frame.max(self.end_frame);
        self.frame = if self.loop_flag {
            start + (frame - start).rem_euclid(self.natural_length())
        } else {
            frame.clamp(start, end)
        };
    }

    pub fn set_phase(&mut self, phase: f32) {
        let start = self.start_frame.min(self.end_frame);
        self.set_current_frame(start + phase * self.natural_length());
    }

    pub fn evaluate(
        &mut self,
        variables: &AnimVariantMap,
        dt: f32,
        triggers: &mut Triggers,
    ) -> &AnimPoseVec {
        let time_scale = variables.lookup_float(&self.time_scale_var, self.time_scale);
        let loop_flag = variables.lookup_bool(&self.loop_flag_var, self.loop_flag);

        self.frame = accumulate_time(
            self.start_frame,
            self.end_frame,
            time_scale,
            self.frame,
            dt,
            loop_flag,
            &self.id,
            triggers,
        );

        self.sample_poses();
        &self.poses
    }

    fn sample_poses(&mut self) {
        let Some(skeleton) = self.skeleton.as_deref() else {
            self.poses.clear();
            return;
        };
        self.poses.clone_from(skeleton.relative_default_poses());

        // The wrap frame between end and start holds the end pose.
        let frame = self.frame.min(self.start_frame.max(self.end_frame));

        for binding in &self.bindings {
            let track = &self.clip.tracks[binding.track_index];
            let cursor = &mut self.track_cursors[binding.track_index];
            let Some(pose) = self.poses.get_mut(binding.joint_index) else {
                continue;
            };

            match (&track.data, binding.target) {
                (TrackData::Quaternion(t), TargetPath::Rotation) => {
                    pose.rotation = t.sample_with_cursor(frame, cursor).normalize();
                }
                (TrackData::Vector3(t), TargetPath::Translation) => {
                    pose.translation = t.sample_with_cursor(frame, cursor);
                }
                (TrackData::Vector3(t), TargetPath::Scale) => {
                    pose.scale = t.sample_with_cursor(frame, cursor);
                }
                _ => {}
            }
        }
    }
}
