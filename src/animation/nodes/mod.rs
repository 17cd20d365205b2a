//! Animation graph nodes.
//!
//! The node set is closed: [`AnimNode`] is an enum over the three node kinds
//! and dispatches evaluation by `match`. Each node exclusively owns its
//! children, so a graph is always a tree evaluated top-down, depth-first, in
//! child registration order.
//!
//! Every node keeps its own output buffer. `evaluate` / `overlay` return a
//! borrow of that buffer, valid until the next call on the same node;
//! [`AnimNode::poses`] exposes the last result without recomputing it.

mod blend_linear;
mod clip;
mod manipulator;

use std::sync::Arc;

pub use blend_linear::AnimBlendLinear;
pub use clip::AnimClip;
pub use manipulator::{AnimManipulator, JointVar, JointVarKind};

use crate::animation::pose::{AnimPose, AnimPoseVec};
use crate::animation::skeleton::AnimSkeleton;
use crate::animation::variant::AnimVariantMap;

/// Named events emitted during evaluation, in evaluation order.
pub type Triggers = Vec<String>;

/// Playback rate of clip frames.
pub const FRAMES_PER_SECOND: f32 = 30.0;

const TIME_EPSILON: f32 = 1e-4;

/// Upper bound on `OnLoop` triggers pushed by a single advance.
const MAX_LOOP_TRIGGERS: usize = 4;

/// Advances `current_frame` by `dt` seconds between `start_frame` and `end_frame`.
///
/// When looping, one extra frame sits between end and start (so the loop is
/// `end - start + 1` frames long) and every wrap pushes `"<id>OnLoop"`, up to
/// [`MAX_LOOP_TRIGGERS`] per call. Otherwise playback stops at `end_frame` and
/// pushes `"<id>OnDone"`. Non-positive or non-finite advances leave the frame
/// where it is.
pub(crate) fn accumulate_time(
    start_frame: f32,
    end_frame: f32,
    time_scale: f32,
    current_frame: f32,
    dt: f32,
    loop_flag: bool,
    id: &str,
    triggers: &mut Triggers,
) -> f32 {
    let start = start_frame.min(end_frame);
    if (end_frame - start).abs() < 1.0 {
        return end_frame;
    }

    let advance = dt * time_scale * FRAMES_PER_SECOND;
    if !advance.is_finite() || advance <= TIME_EPSILON {
        return current_frame;
    }

    if !loop_flag {
        if advance >= end_frame - current_frame {
            triggers.push(format!("{id}OnDone"));
            return end_frame;
        }
        return current_frame + advance;
    }

    let loop_length = end_frame - start + 1.0;
    let till_wrap = end_frame + 1.0 - current_frame;
    if advance < till_wrap {
        return current_frame + advance;
    }

    // Whole loops collapse into a single remainder.
    let overshoot = advance - till_wrap;
    let extra_loops = (overshoot / loop_length).floor().min(MAX_LOOP_TRIGGERS as f32) as usize;
    let wraps = (1 + extra_loops).min(MAX_LOOP_TRIGGERS);
    for _ in 0..wraps {
        triggers.push(format!("{id}OnLoop"));
    }
    start + overshoot.rem_euclid(loop_length)
}

/// A node of the animation graph.
#[derive(Debug)]
pub enum AnimNode {
    Clip(AnimClip),
    BlendLinear(AnimBlendLinear),
    Manipulator(AnimManipulator),
}

impl AnimNode {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            AnimNode::Clip(n) => n.id(),
            AnimNode::BlendLinear(n) => n.id(),
            AnimNode::Manipulator(n) => n.id(),
        }
    }

    /// Produces this tick's pose, advancing internal time by `dt` seconds.
    pub fn evaluate(
        &mut self,
        variables: &AnimVariantMap,
        dt: f32,
        triggers: &mut Triggers,
    ) -> &AnimPoseVec {
        match self {
            AnimNode::Clip(n) => n.evaluate(variables, dt, triggers),
            AnimNode::BlendLinear(n) => n.evaluate(variables, dt, triggers),
            AnimNode::Manipulator(n) => n.evaluate(variables, dt, triggers),
        }
    }

    /// Like `evaluate`, but layered over `under_poses`. Only manipulators use
    /// the under pose; other nodes evaluate normally.
    pub fn overlay(
        &mut self,
        variables: &AnimVariantMap,
        dt: f32,
        triggers: &mut Triggers,
        under_poses: &[AnimPose],
    ) -> &AnimPoseVec {
        match self {
            AnimNode::Manipulator(n) => n.overlay(variables, dt, triggers, under_poses),
            _ => self.evaluate(variables, dt, triggers),
        }
    }

    /// Last computed pose, for debug visualization.
    #[must_use]
    pub fn poses(&self) -> &AnimPoseVec {
        match self {
            AnimNode::Clip(n) => n.poses(),
            AnimNode::BlendLinear(n) => n.poses(),
            AnimNode::Manipulator(n) => n.poses(),
        }
    }

    /// Attaches `skeleton` to this node and its whole subtree.
    pub fn set_skeleton(&mut self, skeleton: Arc<AnimSkeleton>) {
        match self {
            AnimNode::Clip(n) => n.set_skeleton(skeleton),
            AnimNode::BlendLinear(n) => n.set_skeleton(skeleton),
            AnimNode::Manipulator(n) => n.set_skeleton(skeleton),
        }
    }

    /// Scrubs to an absolute frame.
    pub fn set_current_frame(&mut self, frame: f32) {
        match self {
            AnimNode::Clip(n) => n.set_current_frame(frame),
            AnimNode::BlendLinear(n) => n.set_current_frame(frame),
            AnimNode::Manipulator(n) => n.set_current_frame(frame),
        }
    }

    /// Scrubs to a normalized position in `[0, 1)` of the natural loop.
    pub fn set_phase(&mut self, phase: f32) {
        match self {
            AnimNode::Clip(n) => n.set_phase(phase),
            AnimNode::BlendLinear(n) => n.set_phase(phase),
            AnimNode::Manipulator(n) => n.set_phase(phase),
        }
    }

    /// Loop length in frames, if this node has one.
    #[must_use]
    pub fn natural_length(&self) -> Option<f32> {
        match self {
            AnimNode::Clip(n) => Some(n.natural_length()),
            AnimNode::BlendLinear(n) => n.natural_length(),
            AnimNode::Manipulator(n) => n.natural_length(),
        }
    }

    #[must_use]
    pub fn children(&self) -> &[AnimNode] {
        match self {
            AnimNode::Clip(_) => &[],
            AnimNode::BlendLinear(n) => n.children(),
            AnimNode::Manipulator(n) => match n.child() {
                Some(child) => std::slice::from_ref(child),
                None => &[],
            },
        }
    }

    fn children_mut(&mut self) -> &mut [AnimNode] {
        match self {
            AnimNode::Clip(_) => &mut [],
            AnimNode::BlendLinear(n) => n.children_mut(),
            AnimNode::Manipulator(n) => match n.child_mut() {
                Some(child) => std::slice::from_mut(child),
                None => &mut [],
            },
        }
    }

    /// Depth-first search of this subtree by node id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&AnimNode> {
        if self.id() == id {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut AnimNode> {
        if self.id() == id {
            return Some(self);
        }
        self.children_mut().iter_mut().find_map(|c| c.find_mut(id))
    }
}

impl From<AnimClip> for AnimNode {
    fn from(node: AnimClip) -> Self {
        AnimNode::Clip(node)
    }
}

impl From<AnimBlendLinear> for AnimNode {
    fn from(node: AnimBlendLinear) -> Self {
        AnimNode::BlendLinear(node)
    }
}

impl From<AnimManipulator> for AnimNode {
    fn from(node: AnimManipulator) -> Self {
        AnimNode::Manipulator(node)
    }
}
