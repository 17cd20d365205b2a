//! Typed evaluation-time variables.
//!
//! An [`AnimVariantMap`] is rebuilt every tick by the owning rig and is
//! read-only while the graph evaluates. Lookups never fail: a missing key, an
//! empty key or a value of a different type all yield the caller's default.

use glam::{Quat, Vec3};
use rustc_hash::FxHashMap;

use crate::animation::pose::AnimPose;

/// A single tagged variable value.
#[derive(Debug, Clone, PartialEq)]
pub enum AnimVariant {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec3(Vec3),
    Quat(Quat),
    Pose(AnimPose),
    String(String),
}

impl AnimVariant {
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AnimVariant::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i32> {
        match self {
            AnimVariant::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f32> {
        match self {
            AnimVariant::Float(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            AnimVariant::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_quat(&self) -> Option<Quat> {
        match self {
            AnimVariant::Quat(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_pose(&self) -> Option<AnimPose> {
        match self {
            AnimVariant::Pose(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnimVariant::String(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for AnimVariant {
    fn from(v: bool) -> Self {
        AnimVariant::Bool(v)
    }
}

impl From<i32> for AnimVariant {
    fn from(v: i32) -> Self {
        AnimVariant::Int(v)
    }
}

impl From<f32> for AnimVariant {
    fn from(v: f32) -> Self {
        AnimVariant::Float(v)
    }
}

impl From<Vec3> for AnimVariant {
    fn from(v: Vec3) -> Self {
        AnimVariant::Vec3(v)
    }
}

impl From<Quat> for AnimVariant {
    fn from(v: Quat) -> Self {
        AnimVariant::Quat(v.normalize())
    }
}

impl From<AnimPose> for AnimVariant {
    fn from(v: AnimPose) -> Self {
        AnimVariant::Pose(v)
    }
}

impl From<String> for AnimVariant {
    fn from(v: String) -> Self {
        AnimVariant::String(v)
    }
}

impl From<&str> for AnimVariant {
    fn from(v: &str) -> Self {
        AnimVariant::String(v.to_string())
    }
}

/// Variable name to value mapping, produced fresh each tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimVariantMap {
    map: FxHashMap<String, AnimVariant>,
}

impl AnimVariantMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: impl Into<AnimVariant>) {
        self.map.insert(key.to_string(), value.into());
    }

    /// Marks a trigger as fired for this tick.
    pub fn set_trigger(&mut self, key: &str) {
        self.set(key, true);
    }

    pub fn unset(&mut self, key: &str) -> Option<AnimVariant> {
        self.map.remove(key)
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        !key.is_empty() && self.map.contains_key(key)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AnimVariant> {
        if key.is_empty() {
            return None;
        }
        self.map.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnimVariant)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copies every entry of `other` into this map, overwriting duplicates.
    pub fn extend_from(&mut self, other: &AnimVariantMap) {
        for (k, v) in &other.map {
            self.map.insert(k.clone(), v.clone());
        }
    }

    #[must_use]
    pub fn lookup_bool(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(AnimVariant::as_bool).unwrap_or(default)
    }

    #[must_use]
    pub fn lookup_int(&self, key: &str, default: i32) -> i32 {
        self.get(key).and_then(AnimVariant::as_int).unwrap_or(default)
    }

    #[must_use]
    pub fn lookup_float(&self, key: &str, default: f32) -> f32 {
        self.get(key).and_then(AnimVariant::as_float).unwrap_or(default)
    }

    #[must_use]
    pub fn lookup_vec3(&self, key: &str, default: Vec3) -> Vec3 {
        self.get(key).and_then(AnimVariant::as_vec3).unwrap_or(default)
    }

    #[must_use]
    pub fn lookup_quat(&self, key: &str, default: Quat) -> Quat {
        self.get(key).and_then(AnimVariant::as_quat).unwrap_or(default)
    }

    #[must_use]
    pub fn lookup_pose(&self, key: &str, default: AnimPose) -> AnimPose {
        self.get(key).and_then(AnimVariant::as_pose).unwrap_or(default)
    }
}

impl FromIterator<(String, AnimVariant)> for AnimVariantMap {
    fn from_iter<I: IntoIterator<Item = (String, AnimVariant)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}
