//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! Evaluation of an animation graph never fails: unresolved joints, unbound
//! variables and out-of-range blend parameters all degrade to a pass-through
//! pose. Errors are therefore only produced while *building* things:
//! - Skeleton topology validation
//! - Keyframe track validation
//! - Node construction (e.g. a blend with no children)
//! - Loading a graph description from JSON
//!
//! All fallible constructors return [`Result<T>`], an alias for
//! `std::result::Result<T, AnimError>`.

use thiserror::Error;

/// The main error type for graph and asset construction.
#[derive(Error, Debug)]
pub enum AnimError {
    // ========================================================================
    // Skeleton Errors
    // ========================================================================
    /// A joint references a parent that is not an earlier joint.
    #[error("Joint {joint} ('{name}') has invalid parent index {parent}")]
    InvalidParent {
        /// Index of the offending joint
        joint: usize,
        /// Name of the offending joint
        name: String,
        /// The parent index it declared
        parent: usize,
    },

    /// Two joints share the same name.
    #[error("Duplicate joint name: {0}")]
    DuplicateJoint(String),

    // ========================================================================
    // Track Errors
    // ========================================================================
    /// Keyframe data is malformed (empty, mismatched or unsorted).
    #[error("Invalid keyframe track: {0}")]
    InvalidTrack(String),

    // ========================================================================
    // Node Construction Errors
    // ========================================================================
    /// A blend node was built without any children.
    #[error("Node '{0}' requires at least one child")]
    NoChildren(String),

    /// A node was given more children than it can own.
    #[error("Node '{id}' accepts at most {max} child(ren), got {got}")]
    TooManyChildren {
        /// Node id
        id: String,
        /// Maximum supported
        max: usize,
        /// Number supplied
        got: usize,
    },

    // ========================================================================
    // Loader Errors
    // ========================================================================
    /// The graph description declares a version this loader cannot read.
    #[error("Unsupported graph version: {0}")]
    UnsupportedVersion(String),

    /// A clip node references a url that is not in the clip library.
    #[error("Unknown clip url '{url}' in node '{id}'")]
    UnknownClip {
        /// Node id
        id: String,
        /// Url that failed to resolve
        url: String,
    },

    /// Node `data` could not be decoded for the declared node type.
    #[error("Bad data for node '{id}': {source}")]
    BadNodeData {
        /// Node id
        id: String,
        /// Underlying decode failure
        #[source]
        source: serde_json::Error,
    },

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Alias for `Result<T, AnimError>`.
pub type Result<T> = std::result::Result<T, AnimError>;
