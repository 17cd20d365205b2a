//! Manipulator Tests
//!
//! Tests for:
//! - Absolute and relative joint overrides
//! - Alpha weighting against the under pose
//! - Pass-through for unresolved joints and unbound variables
//! - Lazy joint lookup across skeleton swaps
//! - Overlay evaluation over a caller-supplied pose

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use glam::{Quat, Vec3};

use rig_anim::animation::{
    AnimClip, AnimManipulator, AnimNode, AnimPose, AnimSkeleton, AnimVariantMap, AnimationClip,
    Joint, JointVar, JointVarKind, KeyframeTrack, Track, Triggers,
};

const DT: f32 = 1.0 / 30.0;

fn quat_approx(a: Quat, b: Quat) -> bool {
    a.angle_between(b) < 1e-3
}

fn vec_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-4
}

fn skeleton_with_root(root: AnimPose) -> Arc<AnimSkeleton> {
    Arc::new(
        AnimSkeleton::new(vec![
            Joint::new("root", None, root),
            Joint::new("spine", Some(0), AnimPose::from_translation(Vec3::Y)),
            Joint::new("head", Some(1), AnimPose::from_translation(Vec3::Y)),
        ])
        .unwrap(),
    )
}

fn skeleton() -> Arc<AnimSkeleton> {
    skeleton_with_root(AnimPose::IDENTITY)
}

fn spine_clip(rotation: Quat) -> AnimNode {
    let clip = Arc::new(AnimationClip::new(
        "idle",
        vec![Track::rotation("spine", KeyframeTrack::constant(rotation))],
    ));
    AnimClip::new("idle", clip, 0.0, 9.0, 1.0, true).into()
}

fn manipulator(kind: JointVarKind, joint: &str, alpha: f32) -> AnimManipulator {
    let mut node = AnimManipulator::new("ik", alpha).with_child(spine_clip(Quat::IDENTITY));
    node.add_joint_var(JointVar::new("target", joint, kind));
    node.set_skeleton(skeleton());
    node
}

fn evaluate(node: &mut AnimManipulator, vars: &AnimVariantMap) -> Vec<AnimPose> {
    let mut triggers = Triggers::new();
    node.evaluate(vars, DT, &mut triggers).clone()
}

// ============================================================================
// Absolute Overrides
// ============================================================================

#[test]
fn absolute_rotation_full_alpha() {
    let mut node = manipulator(JointVarKind::AbsoluteRotation, "spine", 1.0);
    let mut vars = AnimVariantMap::new();
    vars.set("target", Quat::from_rotation_z(FRAC_PI_2));

    let poses = evaluate(&mut node, &vars);
    let abs = skeleton().to_absolute(&poses);
    assert!(quat_approx(abs[1].rotation, Quat::from_rotation_z(FRAC_PI_2)));
    // The spine stays where it was; the head swings with it
    assert!(vec_approx(abs[1].translation, Vec3::Y));
    assert!(vec_approx(abs[2].translation, Vec3::new(-1.0, 1.0, 0.0)));
}

#[test]
fn absolute_rotation_accounts_for_parent_frame() {
    let root = AnimPose::from_rotation(Quat::from_rotation_z(FRAC_PI_2));
    let skeleton = skeleton_with_root(root);
    let mut node = AnimManipulator::new("ik", 1.0).with_child(spine_clip(Quat::IDENTITY));
    node.add_joint_var(JointVar::new("target", "spine", JointVarKind::AbsoluteRotation));
    node.set_skeleton(Arc::clone(&skeleton));

    let mut vars = AnimVariantMap::new();
    vars.set("target", Quat::IDENTITY);
    let poses = evaluate(&mut node, &vars);

    // Relative rotation undoes the root's turn so the model-space result is identity
    assert!(quat_approx(poses[1].rotation, Quat::from_rotation_z(-FRAC_PI_2)));
    let abs = skeleton.to_absolute(&poses);
    assert!(quat_approx(abs[1].rotation, Quat::IDENTITY));
}

#[test]
fn absolute_rotation_zero_alpha_is_identity_op() {
    let mut node = manipulator(JointVarKind::AbsoluteRotation, "spine", 0.0);
    let mut vars = AnimVariantMap::new();
    vars.set("target", Quat::from_rotation_z(FRAC_PI_2));

    let poses = evaluate(&mut node, &vars);
    assert!(quat_approx(poses[1].rotation, Quat::IDENTITY));
}

#[test]
fn absolute_rotation_half_alpha() {
    let mut node = manipulator(JointVarKind::AbsoluteRotation, "spine", 0.5);
    let mut vars = AnimVariantMap::new();
    vars.set("target", Quat::from_rotation_z(FRAC_PI_2));

    let poses = evaluate(&mut node, &vars);
    assert!(quat_approx(poses[1].rotation, Quat::from_rotation_z(FRAC_PI_2 / 2.0)));
}

#[test]
fn absolute_position() {
    let mut node = manipulator(JointVarKind::AbsolutePosition, "head", 1.0);
    let mut vars = AnimVariantMap::new();
    vars.set("target", Vec3::new(0.0, 3.0, 1.0));

    let poses = evaluate(&mut node, &vars);
    let abs = skeleton().to_absolute(&poses);
    assert!(vec_approx(abs[2].translation, Vec3::new(0.0, 3.0, 1.0)));
    assert!(vec_approx(poses[2].translation, Vec3::new(0.0, 2.0, 1.0)));
}

#[test]
fn alpha_is_clamped() {
    let mut node = manipulator(JointVarKind::AbsoluteRotation, "spine", 4.0);
    let mut vars = AnimVariantMap::new();
    vars.set("target", Quat::from_rotation_z(FRAC_PI_2));

    let poses = evaluate(&mut node, &vars);
    assert!(quat_approx(poses[1].rotation, Quat::from_rotation_z(FRAC_PI_2)));

    node.alpha = -1.0;
    let poses = evaluate(&mut node, &vars);
    assert!(quat_approx(poses[1].rotation, Quat::IDENTITY));
}

#[test]
fn alpha_var_overrides_static_alpha() {
    let mut node = manipulator(JointVarKind::AbsoluteRotation, "spine", 1.0);
    node.set_alpha_var("ikAlpha");
    let mut vars = AnimVariantMap::new();
    vars.set("target", Quat::from_rotation_z(FRAC_PI_2));
    vars.set("ikAlpha", 0.0_f32);

    let poses = evaluate(&mut node, &vars);
    assert!(quat_approx(poses[1].rotation, Quat::IDENTITY));
    assert_eq!(node.alpha, 1.0);
}

// ============================================================================
// Relative Overrides
// ============================================================================

#[test]
fn relative_rotation_composes_with_under_pose() {
    let mut node = AnimManipulator::new("look", 1.0)
        .with_child(spine_clip(Quat::from_rotation_z(0.5)));
    node.add_joint_var(JointVar::new("twist", "spine", JointVarKind::RelativeRotation));
    node.set_skeleton(skeleton());

    let mut vars = AnimVariantMap::new();
    vars.set("twist", Quat::from_rotation_x(0.3));
    let poses = evaluate(&mut node, &vars);
    assert!(quat_approx(
        poses[1].rotation,
        Quat::from_rotation_z(0.5) * Quat::from_rotation_x(0.3)
    ));
}

#[test]
fn relative_position_adds_offset() {
    let mut node = manipulator(JointVarKind::RelativePosition, "head", 1.0);
    let mut vars = AnimVariantMap::new();
    vars.set("target", Vec3::new(0.5, 0.0, 0.0));

    let poses = evaluate(&mut node, &vars);
    assert!(vec_approx(poses[2].translation, Vec3::new(0.5, 1.0, 0.0)));
}

// ============================================================================
// Pass-through
// ============================================================================

#[test]
fn unresolved_joint_is_inert() {
    let mut node = manipulator(JointVarKind::AbsoluteRotation, "tail", 1.0);
    let mut vars = AnimVariantMap::new();
    vars.set("target", Quat::from_rotation_z(FRAC_PI_2));

    // Every joint matches the under pose, which is the bind pose here
    let poses = evaluate(&mut node, &vars);
    assert_eq!(&poses, skeleton().relative_default_poses());
    assert_eq!(node.joint_vars()[0].joint_index(), None);
}

#[test]
fn unbound_variable_passes_through() {
    let mut node = manipulator(JointVarKind::AbsoluteRotation, "spine", 1.0);
    let poses = evaluate(&mut node, &AnimVariantMap::new());
    assert!(quat_approx(poses[1].rotation, Quat::IDENTITY));
    assert_eq!(node.joint_vars()[0].joint_index(), Some(1));
}

#[test]
fn wrongly_typed_variable_passes_through() {
    let mut node = manipulator(JointVarKind::AbsoluteRotation, "spine", 1.0);
    let mut vars = AnimVariantMap::new();
    vars.set("target", Vec3::ONE);

    let poses = evaluate(&mut node, &vars);
    assert!(quat_approx(poses[1].rotation, Quat::IDENTITY));
}

#[test]
fn no_child_uses_default_pose() {
    let mut node = AnimManipulator::new("ik", 1.0);
    node.add_joint_var(JointVar::new("target", "head", JointVarKind::RelativePosition));
    node.set_skeleton(skeleton());

    let mut vars = AnimVariantMap::new();
    vars.set("target", Vec3::X);
    let poses = evaluate(&mut node, &vars);
    assert_eq!(poses.len(), 3);
    assert!(vec_approx(poses[1].translation, Vec3::Y));
    assert!(vec_approx(poses[2].translation, Vec3::new(1.0, 1.0, 0.0)));
}

#[test]
fn no_skeleton_produces_empty_pose() {
    let mut node = AnimManipulator::new("ik", 1.0);
    node.add_joint_var(JointVar::new("target", "head", JointVarKind::RelativePosition));
    let poses = evaluate(&mut node, &AnimVariantMap::new());
    assert!(poses.is_empty());
}

// ============================================================================
// Skeleton Swap
// ============================================================================

#[test]
fn skeleton_swap_re_resolves_joints() {
    let mut node = manipulator(JointVarKind::AbsoluteRotation, "spine", 1.0);
    let mut vars = AnimVariantMap::new();
    vars.set("target", Quat::from_rotation_z(FRAC_PI_2));
    evaluate(&mut node, &vars);
    assert_eq!(node.joint_vars()[0].joint_index(), Some(1));

    let swapped = Arc::new(
        AnimSkeleton::new(vec![
            Joint::new("root", None, AnimPose::IDENTITY),
            Joint::new("hips", Some(0), AnimPose::IDENTITY),
            Joint::new("spine", Some(1), AnimPose::from_translation(Vec3::Y)),
        ])
        .unwrap(),
    );
    node.set_skeleton(Arc::clone(&swapped));
    assert_eq!(node.joint_vars()[0].joint_index(), None);

    let poses = evaluate(&mut node, &vars);
    assert_eq!(node.joint_vars()[0].joint_index(), Some(2));
    let abs = swapped.to_absolute(&poses);
    assert!(quat_approx(abs[2].rotation, Quat::from_rotation_z(FRAC_PI_2)));
}

#[test]
fn missing_joint_resolves_after_swap() {
    let mut node = manipulator(JointVarKind::RelativePosition, "hips", 1.0);
    let mut vars = AnimVariantMap::new();
    vars.set("target", Vec3::X);
    evaluate(&mut node, &vars);
    assert_eq!(node.joint_vars()[0].joint_index(), None);

    node.set_skeleton(Arc::new(
        AnimSkeleton::new(vec![
            Joint::new("root", None, AnimPose::IDENTITY),
            Joint::new("hips", Some(0), AnimPose::IDENTITY),
        ])
        .unwrap(),
    ));
    let poses = evaluate(&mut node, &vars);
    assert_eq!(node.joint_vars()[0].joint_index(), Some(1));
    assert!(vec_approx(poses[1].translation, Vec3::X));
}

// ============================================================================
// Overlay
// ============================================================================

#[test]
fn overlay_uses_supplied_under_pose() {
    let node = manipulator(JointVarKind::RelativeRotation, "spine", 1.0);
    let mut node = AnimNode::from(node);

    let under = vec![
        AnimPose::IDENTITY,
        AnimPose::from_rotation_translation(Quat::from_rotation_y(0.4), Vec3::Y),
        AnimPose::from_translation(Vec3::Y),
    ];
    let mut vars = AnimVariantMap::new();
    vars.set("target", Quat::from_rotation_x(0.2));

    let mut triggers = Triggers::new();
    let poses = node.overlay(&vars, DT, &mut triggers, &under).clone();
    assert!(quat_approx(
        poses[1].rotation,
        Quat::from_rotation_y(0.4) * Quat::from_rotation_x(0.2)
    ));

    // The child was not evaluated, so its clock has not moved
    match &node.children()[0] {
        AnimNode::Clip(clip) => assert_eq!(clip.frame(), 0.0),
        _ => panic!("expected clip child"),
    }
}

#[test]
fn overlay_on_non_manipulator_evaluates_normally() {
    let mut node = spine_clip(Quat::from_rotation_x(0.6));
    node.set_skeleton(skeleton());
    let under = vec![AnimPose::from_translation(Vec3::Z); 3];

    let mut triggers = Triggers::new();
    let poses = node.overlay(&AnimVariantMap::new(), DT, &mut triggers, &under);
    assert!(quat_approx(poses[1].rotation, Quat::from_rotation_x(0.6)));
}

#[test]
fn natural_length_comes_from_child() {
    let node = manipulator(JointVarKind::RelativeRotation, "spine", 1.0);
    assert_eq!(node.natural_length(), Some(10.0));
    assert_eq!(AnimManipulator::new("bare", 1.0).natural_length(), None);
}
