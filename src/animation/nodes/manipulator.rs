use std::sync::Arc;

use serde::Deserialize;

use crate::animation::nodes::{AnimNode, Triggers};
use crate::animation::pose::{AnimPose, AnimPoseVec};
use crate::animation::skeleton::AnimSkeleton;
use crate::animation::variant::AnimVariantMap;

/// How a [`JointVar`] overrides its joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JointVarKind {
    /// Replace the model-space rotation (quat variable).
    AbsoluteRotation,
    /// Replace the model-space translation (vec3 variable).
    AbsolutePosition,
    /// Multiply onto the parent-relative rotation (quat variable).
    RelativeRotation,
    /// Add to the parent-relative translation (vec3 variable).
    RelativePosition,
}

/// Binds a variable to a joint override.
///
/// The joint index is looked up lazily by name, once per skeleton
/// generation. A joint that is not found leaves the binding inert until a
/// different skeleton is attached.
#[derive(Debug, Clone)]
pub struct JointVar {
    pub var: String,
    pub joint_name: String,
    pub kind: JointVarKind,
    joint_index: Option<usize>,
    resolved_generation: Option<u64>,
}

impl JointVar {
    #[must_use]
    pub fn new(var: &str, joint_name: &str, kind: JointVarKind) -> Self {
        Self {
            var: var.to_string(),
            joint_name: joint_name.to_string(),
            kind,
            joint_index: None,
            resolved_generation: None,
        }
    }

    /// Resolved joint index, if a lookup has happened and succeeded.
    #[must_use]
    pub fn joint_index(&self) -> Option<usize> {
        self.joint_index
    }

    fn invalidate(&mut self) {
        self.joint_index = None;
        self.resolved_generation = None;
    }

    fn resolve(&mut self, skeleton: &AnimSkeleton, node_id: &str) -> Option<usize> {
        if self.resolved_generation != Some(skeleton.generation()) {
            self.joint_index = skeleton.name_to_joint_index(&self.joint_name);
            self.resolved_generation = Some(skeleton.generation());
            if self.joint_index.is_none() {
                log::warn!(
                    "AnimManipulator '{node_id}': could not find joint '{}'",
                    self.joint_name
                );
            }
        }
        self.joint_index
    }

    /// The manipulated parent-relative pose, or `None` to pass the under
    /// pose through (unbound or wrongly typed variable).
    fn compute_relative_pose(
        &self,
        index: usize,
        skeleton: &AnimSkeleton,
        variables: &AnimVariantMap,
        under_poses: &[AnimPose],
    ) -> Option<AnimPose> {
        let value = variables.get(&self.var)?;
        let mut rel = *under_poses.get(index)?;

        match self.kind {
            JointVarKind::AbsoluteRotation | JointVarKind::AbsolutePosition => {
                let mut abs = skeleton.absolute_pose(index, under_poses);
                if self.kind == JointVarKind::AbsoluteRotation {
                    abs.rotation = value.as_quat()?.normalize();
                } else {
                    abs.translation = value.as_vec3()?;
                }
                // An absolute override needs the parent's absolute frame to become relative again.
                let parent_abs = skeleton
                    .parent_index(index)
                    .map_or(AnimPose::IDENTITY, |parent| {
                        skeleton.absolute_pose(parent, under_poses)
                    });
                Some(parent_abs.inverse() * abs)
            }
            JointVarKind::RelativeRotation => {
                rel.rotation = (rel.rotation * value.as_quat()?).normalize();
                Some(rel)
            }
            JointVarKind::RelativePosition => {
                rel.translation += value.as_vec3()?;
                Some(rel)
            }
        }
    }
}

/// Procedural control over a set of joints, layered over an under pose.
#[derive(Debug)]
pub struct AnimManipulator {
    id: String,
    child: Option<Box<AnimNode>>,

    pub alpha: f32,
    alpha_var: String,

    joint_vars: Vec<JointVar>,

    skeleton: Option<Arc<AnimSkeleton>>,
    poses: AnimPoseVec,
}

impl AnimManipulator {
    #[must_use]
    pub fn new(id: &str, alpha: f32) -> Self {
        Self {
            id: id.to_string(),
            child: None,
            alpha,
            alpha_var: String::new(),
            joint_vars: Vec::new(),
            skeleton: None,
            poses: Vec::new(),
        }
    }

    /// Sets the node whose output is manipulated by `evaluate`.
    #[must_use]
    pub fn with_child(mut self, child: AnimNode) -> Self {
        self.set_child(child);
        self
    }

    pub fn set_child(&mut self, mut child: AnimNode) {
        if let Some(skeleton) = &self.skeleton {
            child.set_skeleton(Arc::clone(skeleton));
        }
        self.child = Some(Box::new(child));
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn child(&self) -> Option<&AnimNode> {
        self.child.as_deref()
    }

    pub fn child_mut(&mut self) -> Option<&mut AnimNode> {
        self.child.as_deref_mut()
    }

    pub fn set_alpha_var(&mut self, var: &str) {
        self.alpha_var = var.to_string();
    }

    pub fn add_joint_var(&mut self, joint_var: JointVar) {
        self.joint_vars.push(joint_var);
    }

    pub fn remove_all_joint_vars(&mut self) {
        self.joint_vars.clear();
    }

    #[must_use]
    pub fn joint_vars(&self) -> &[JointVar] {
        &self.joint_vars
    }

    #[must_use]
    pub fn poses(&self) -> &AnimPoseVec {
        &self.poses
    }

    pub fn set_skeleton(&mut self, skeleton: Arc<AnimSkeleton>) {
        for joint_var in &mut self.joint_vars {
            joint_var.invalidate();
        }
        if let Some(child) = &mut self.child {
            child.set_skeleton(Arc::clone(&skeleton));
        }
        self.skeleton = Some(skeleton);
    }

    #[must_use]
    pub fn natural_length(&self) -> Option<f32> {
        self.child.as_ref().and_then(|c| c.natural_length())
    }

    pub fn set_current_frame(&mut self, frame: f32) {
        if let Some(child) = &mut self.child {
            child.set_current_frame(frame);
        }
    }

    pub fn set_phase(&mut self, phase: f32) {
        if let Some(child) = &mut self.child {
            child.set_phase(phase);
        }
    }

    /// Manipulates the child's pose, or the skeleton's default pose when
    /// there is no child.
    pub fn evaluate(
        &mut self,
        variables: &AnimVariantMap,
        dt: f32,
        triggers: &mut Triggers,
    ) -> &AnimPoseVec {
        let alpha = variables.lookup_float(&self.alpha_var, self.alpha);
        let Self {
            id,
            child,
            joint_vars,
            skeleton,
            poses,
            ..
        } = self;

        let under: &[AnimPose] = match child {
            Some(child) => child.evaluate(variables, dt, triggers),
            None => match skeleton.as_deref() {
                Some(skeleton) => skeleton.relative_default_poses(),
                None => &[],
            },
        };
        manipulate(id, poses, joint_vars, skeleton.as_deref(), alpha, variables, under);
        &self.poses
    }

    /// Manipulates `under_poses` supplied by the caller. The child, if any, is
    /// not evaluated.
    pub fn overlay(
        &mut self,
        variables: &AnimVariantMap,
        _dt: f32,
        _triggers: &mut Triggers,
        under_poses: &[AnimPose],
    ) -> &AnimPoseVec {
        let alpha = variables.lookup_float(&self.alpha_var, self.alpha);
        manipulate(
            &self.id,
            &mut self.poses,
            &mut self.joint_vars,
            self.skeleton.as_deref(),
            alpha,
            variables,
            under_poses,
        );
        &self.poses
    }
}

fn manipulate(
    id: &str,
    poses: &mut AnimPoseVec,
    joint_vars: &mut [JointVar],
    skeleton: Option<&AnimSkeleton>,
    alpha: f32,
    variables: &AnimVariantMap,
    under_poses: &[AnimPose],
) {
    poses.clear();
    poses.extend_from_slice(under_poses);

    let Some(skeleton) = skeleton else {
        return;
    };
    let alpha = if alpha.is_finite() { alpha.clamp(0.0, 1.0) } else { 0.0 };
    if under_poses.is_empty() || alpha <= 0.0 {
        return;
    }

    for joint_var in joint_vars {
        let Some(index) = joint_var.resolve(skeleton, id) else {
            continue;
        };
        if let Some(rel) = joint_var.compute_relative_pose(index, skeleton, variables, under_poses)
        {
            poses[index] = under_poses[index].blend(&rel, alpha);
        }
    }
}
