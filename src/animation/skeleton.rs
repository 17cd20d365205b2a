use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::FxHashMap;

use crate::animation::pose::{AnimPose, AnimPoseVec};
use crate::errors::{AnimError, Result};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Joint description used to build an [`AnimSkeleton`].
#[derive(Debug, Clone)]
pub struct Joint {
    pub name: String,
    /// Index of the parent joint; must be smaller than this joint's index.
    pub parent: Option<usize>,
    /// Bind pose relative to the parent.
    pub default_pose: AnimPose,
}

impl Joint {
    #[must_use]
    pub fn new(name: &str, parent: Option<usize>, default_pose: AnimPose) -> Self {
        Self {
            name: name.to_string(),
            parent,
            default_pose,
        }
    }
}

/// Immutable joint hierarchy shared by every node of a graph.
///
/// Joints are stored parents-first, so a single forward pass converts
/// relative poses to absolute ones. Each skeleton gets a process-unique
/// `generation`, which nodes use to detect skeleton swaps.
#[derive(Debug)]
pub struct AnimSkeleton {
    generation: u64,
    names: Vec<String>,
    parents: Vec<Option<usize>>,
    relative_default_poses: AnimPoseVec,
    absolute_default_poses: AnimPoseVec,
    lookup: FxHashMap<String, usize>,
}

impl AnimSkeleton {
    pub fn new(joints: Vec<Joint>) -> Result<Self> {
        let mut names = Vec::with_capacity(joints.len());
        let mut parents = Vec::with_capacity(joints.len());
        let mut relative_default_poses = Vec::with_capacity(joints.len());
        let mut lookup = FxHashMap::default();

        for (index, joint) in joints.into_iter().enumerate() {
            if let Some(parent) = joint.parent
                && parent >= index
            {
                return Err(AnimError::InvalidParent {
                    joint: index,
                    name: joint.name,
                    parent,
                });
            }
            if lookup.insert(joint.name.clone(), index).is_some() {
                return Err(AnimError::DuplicateJoint(joint.name));
            }
            names.push(joint.name);
            parents.push(joint.parent);
            relative_default_poses.push(joint.default_pose);
        }

        let mut skeleton = Self {
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
            names,
            parents,
            relative_default_poses,
            absolute_default_poses: Vec::new(),
            lookup,
        };
        skeleton.absolute_default_poses = skeleton.to_absolute(&skeleton.relative_default_poses);
        Ok(skeleton)
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn num_joints(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn name_to_joint_index(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    #[must_use]
    pub fn joint_name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn parent_index(&self, index: usize) -> Option<usize> {
        self.parents.get(index).copied().flatten()
    }

    #[must_use]
    pub fn relative_default_poses(&self) -> &AnimPoseVec {
        &self.relative_default_poses
    }

    #[must_use]
    pub fn absolute_default_poses(&self) -> &AnimPoseVec {
        &self.absolute_default_poses
    }

    /// Model-space pose of joint `index`, walking its parent chain in `relative_poses`.
    ///
    /// Missing entries fall back to the bind pose.
    #[must_use]
    pub fn absolute_pose(&self, index: usize, relative_poses: &[AnimPose]) -> AnimPose {
        let mut pose = AnimPose::IDENTITY;
        let mut current = Some(index);
        while let Some(i) = current {
            let rel = relative_poses
                .get(i)
                .or_else(|| self.relative_default_poses.get(i))
                .copied()
                .unwrap_or(AnimPose::IDENTITY);
            pose = rel * pose;
            current = self.parent_index(i);
        }
        pose
    }

    /// Converts a relative pose buffer to model space.
    #[must_use]
    pub fn to_absolute(&self, relative_poses: &[AnimPose]) -> AnimPoseVec {
        let mut absolute: AnimPoseVec = Vec::with_capacity(relative_poses.len());
        for (i, rel) in relative_poses.iter().enumerate() {
            let pose = match self.parent_index(i) {
                Some(parent) if parent < absolute.len() => absolute[parent] * *rel,
                _ => *rel,
            };
            absolute.push(pose);
        }
        absolute
    }

    /// Converts a model-space pose buffer back to parent-relative poses.
    #[must_use]
    pub fn to_relative(&self, absolute_poses: &[AnimPose]) -> AnimPoseVec {
        absolute_poses
            .iter()
            .enumerate()
            .map(|(i, abs)| match self.parent_index(i) {
                Some(parent) if parent < absolute_poses.len() => {
                    absolute_poses[parent].inverse() * *abs
                }
                _ => *abs,
            })
            .collect()
    }
}
