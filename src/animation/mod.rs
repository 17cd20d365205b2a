//! Animation Module
//!
//! - [`pose`]: per-joint transforms and pose blending
//! - [`skeleton`]: shared immutable joint hierarchy
//! - [`variant`]: typed per-tick variables
//! - [`state`]: thread-safe variable store shared with scripting threads
//! - [`tracks`] / [`clip`] / [`binder`]: keyframed clips bound to skeleton joints
//! - [`nodes`]: the graph nodes (clip, blend-linear, manipulator)
//! - [`graph`]: per-tick driver
//! - [`loader`]: JSON graph descriptions

pub mod binder;
pub mod clip;
pub mod graph;
pub mod loader;
pub mod nodes;
pub mod pose;
pub mod skeleton;
pub mod state;
pub mod tracks;
pub mod values;
pub mod variant;

pub use binder::{Binder, JointBinding, TargetPath};
pub use clip::{AnimationClip, ClipLibrary, Track, TrackData, TrackMeta};
pub use graph::AnimGraph;
pub use loader::AnimGraphLoader;
pub use nodes::{
    AnimBlendLinear, AnimClip, AnimManipulator, AnimNode, FRAMES_PER_SECOND, JointVar,
    JointVarKind, Triggers,
};
pub use pose::{AnimPose, AnimPoseVec, blend_poses};
pub use skeleton::{AnimSkeleton, Joint};
pub use state::RigStateVariables;
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
pub use values::Interpolatable;
pub use variant::{AnimVariant, AnimVariantMap};
