#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! Skeletal animation blend graph.
//!
//! A tree of [`AnimNode`]s is evaluated once per simulation tick. Leaf clip
//! nodes sample keyframed tracks, blend-linear nodes mix and time-synchronize
//! their children, and manipulator nodes override individual joints from
//! per-tick variables. [`AnimGraph`] drives a tree against a shared
//! [`RigStateVariables`] store.

pub mod animation;
pub mod errors;

pub use animation::{
    AnimBlendLinear, AnimClip, AnimGraph, AnimGraphLoader, AnimManipulator, AnimNode, AnimPose,
    AnimPoseVec, AnimSkeleton, AnimVariant, AnimVariantMap, AnimationClip, ClipLibrary, JointVar,
    JointVarKind, RigStateVariables, Triggers,
};
pub use errors::{AnimError, Result};
