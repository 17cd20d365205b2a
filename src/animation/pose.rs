use std::ops::Mul;

use glam::{Affine3A, Quat, Vec3};

use crate::animation::values::Interpolatable;

/// Per-joint pose buffer, indexed by joint.
///
/// A zero-length vector is the "not yet evaluated" sentinel.
pub type AnimPoseVec = Vec<AnimPose>;

/// Rigid transform of a single joint: scale, then rotation, then translation.
///
/// Scale is treated as (near) uniform when composing or inverting poses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimPose {
    pub rotation: Quat,
    pub translation: Vec3,
    pub scale: Vec3,
}

impl AnimPose {
    pub const IDENTITY: Self = Self {
        rotation: Quat::IDENTITY,
        translation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    /// Builds a pose, normalizing the rotation.
    #[must_use]
    pub fn new(rotation: Quat, translation: Vec3, scale: Vec3) -> Self {
        Self {
            rotation: rotation.normalize(),
            translation,
            scale,
        }
    }

    #[must_use]
    pub fn from_rotation(rotation: Quat) -> Self {
        Self::new(rotation, Vec3::ZERO, Vec3::ONE)
    }

    #[must_use]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    #[must_use]
    pub fn from_rotation_translation(rotation: Quat, translation: Vec3) -> Self {
        Self::new(rotation, translation, Vec3::ONE)
    }

    /// Decomposes an affine matrix. Shear is lost.
    #[must_use]
    pub fn from_affine(mat: Affine3A) -> Self {
        let (scale, rotation, translation) = mat.to_scale_rotation_translation();
        Self::new(rotation, translation, scale)
    }

    #[must_use]
    pub fn to_affine(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Inverse transform. Zero scale components invert to zero.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let inv_rotation = self.rotation.inverse();
        let inv_scale = Vec3::new(
            safe_recip(self.scale.x),
            safe_recip(self.scale.y),
            safe_recip(self.scale.z),
        );
        Self {
            rotation: inv_rotation,
            translation: -(inv_scale * (inv_rotation * self.translation)),
            scale: inv_scale,
        }
    }

    #[must_use]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.translation + self.rotation * (self.scale * point)
    }

    /// Interpolates towards `other`: shortest-arc slerp for rotation, lerp for
    /// translation and scale.
    #[must_use]
    pub fn blend(&self, other: &Self, alpha: f32) -> Self {
        if alpha <= 0.0 {
            return *self;
        }
        if alpha >= 1.0 {
            return *other;
        }
        Self {
            rotation: Quat::interpolate_linear(self.rotation, other.rotation, alpha),
            translation: Vec3::interpolate_linear(self.translation, other.translation, alpha),
            scale: Vec3::interpolate_linear(self.scale, other.scale, alpha),
        }
    }
}

impl Default for AnimPose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// `parent * child`: expresses `child` (relative to `parent`) in `parent`'s frame.
impl Mul for AnimPose {
    type Output = AnimPose;

    fn mul(self, rhs: AnimPose) -> AnimPose {
        AnimPose {
            rotation: (self.rotation * rhs.rotation).normalize(),
            translation: self.transform_point(rhs.translation),
            scale: self.scale * rhs.scale,
        }
    }
}

fn safe_recip(v: f32) -> f32 {
    if v.abs() > f32::EPSILON { v.recip() } else { 0.0 }
}

/// Blends two pose buffers joint by joint into `out`.
///
/// When the inputs differ in length, joints present in only one input are
/// copied through unchanged.
pub fn blend_poses(a: &[AnimPose], b: &[AnimPose], alpha: f32, out: &mut AnimPoseVec) {
    let len = a.len().max(b.len());
    out.clear();
    out.reserve(len);
    for i in 0..len {
        let pose = match (a.get(i), b.get(i)) {
            (Some(pa), Some(pb)) => pa.blend(pb, alpha),
            (Some(p), None) | (None, Some(p)) => *p,
            (None, None) => AnimPose::IDENTITY,
        };
        out.push(pose);
    }
}
