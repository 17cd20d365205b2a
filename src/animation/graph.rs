use std::sync::Arc;

use crate::animation::nodes::{AnimNode, Triggers};
use crate::animation::pose::AnimPoseVec;
use crate::animation::skeleton::AnimSkeleton;
use crate::animation::state::RigStateVariables;
use crate::animation::variant::AnimVariantMap;

/// Drives an animation graph once per simulation tick.
///
/// Each `update` builds the tick's variables in three layers, later layers
/// winning: the shared [`RigStateVariables`] snapshot, the caller's
/// overrides, then the triggers emitted on the previous tick (as `true`
/// bools). Nothing else touches the graph while it evaluates.
#[derive(Debug)]
pub struct AnimGraph {
    root: AnimNode,
    skeleton: Option<Arc<AnimSkeleton>>,
    state: Arc<RigStateVariables>,

    variables: AnimVariantMap,
    triggers: Triggers,
}

impl AnimGraph {
    #[must_use]
    pub fn new(root: AnimNode) -> Self {
        Self::with_state(root, Arc::new(RigStateVariables::new()))
    }

    /// Uses an existing store, typically shared with scripting threads.
    #[must_use]
    pub fn with_state(root: AnimNode, state: Arc<RigStateVariables>) -> Self {
        Self {
            root,
            skeleton: None,
            state,
            variables: AnimVariantMap::new(),
            triggers: Triggers::new(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &AnimNode {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut AnimNode {
        &mut self.root
    }

    #[must_use]
    pub fn state(&self) -> &Arc<RigStateVariables> {
        &self.state
    }

    #[must_use]
    pub fn skeleton(&self) -> Option<&Arc<AnimSkeleton>> {
        self.skeleton.as_ref()
    }

    /// Swaps the skeleton for the whole graph, invalidating cached joint lookups.
    pub fn set_skeleton(&mut self, skeleton: Arc<AnimSkeleton>) {
        log::debug!(
            "AnimGraph '{}': attaching skeleton with {} joints (generation {})",
            self.root.id(),
            skeleton.num_joints(),
            skeleton.generation()
        );
        self.root.set_skeleton(Arc::clone(&skeleton));
        self.skeleton = Some(skeleton);
    }

    /// Evaluates one tick and returns the root's relative poses.
    pub fn update(&mut self, dt: f32, overrides: &AnimVariantMap) -> &AnimPoseVec {
        self.variables = self.state.snapshot_all();
        self.variables.extend_from(overrides);
        for trigger in self.triggers.drain(..) {
            self.variables.set_trigger(&trigger);
        }

        self.root.evaluate(&self.variables, dt, &mut self.triggers);
        if !self.triggers.is_empty() {
            log::trace!("AnimGraph '{}': triggers {:?}", self.root.id(), self.triggers);
        }
        self.root.poses()
    }

    /// Triggers emitted by the last `update`, in evaluation order.
    #[must_use]
    pub fn triggers(&self) -> &Triggers {
        &self.triggers
    }

    /// Variables the last `update` evaluated with.
    #[must_use]
    pub fn variables(&self) -> &AnimVariantMap {
        &self.variables
    }

    #[must_use]
    pub fn poses(&self) -> &AnimPoseVec {
        self.root.poses()
    }

    /// Last result in model space. Empty until a skeleton is attached and a
    /// tick has run.
    #[must_use]
    pub fn absolute_poses(&self) -> AnimPoseVec {
        match &self.skeleton {
            Some(skeleton) => skeleton.to_absolute(self.root.poses()),
            None => Vec::new(),
        }
    }
}
