//! Rig State Variable Tests
//!
//! Tests for:
//! - Typed getters with defaults
//! - Snapshots of selected keys and of the whole store
//! - Concurrent access from many threads

use std::sync::Arc;
use std::thread;

use glam::Vec3;

use rig_anim::animation::{AnimVariant, RigStateVariables};

// ============================================================================
// Basic Access
// ============================================================================

#[test]
fn getters_fall_back_to_default() {
    let state = RigStateVariables::new();
    assert!(state.is_empty());
    assert!(state.get_bool("isFlying", true));
    assert_eq!(state.get_float("speed", 1.5), 1.5);

    state.set("speed", 3.0_f32);
    state.set("isFlying", false);
    assert!(!state.get_bool("isFlying", true));
    assert_eq!(state.get_float("speed", 1.5), 3.0);

    // Wrong type reads as absent
    assert!(state.get_bool("speed", true));
    assert_eq!(state.len(), 2);
}

#[test]
fn get_returns_owned_copy() {
    let state = RigStateVariables::new();
    state.set("lookAt", Vec3::new(1.0, 2.0, 3.0));

    let value = state.get("lookAt");
    state.set("lookAt", Vec3::ZERO);
    assert_eq!(value, Some(AnimVariant::Vec3(Vec3::new(1.0, 2.0, 3.0))));
}

#[test]
fn remove_clears_key() {
    let state = RigStateVariables::new();
    state.set("state", "idle");
    assert_eq!(state.remove("state"), Some(AnimVariant::String("idle".into())));
    assert_eq!(state.remove("state"), None);
    assert!(state.get("state").is_none());
}

// ============================================================================
// Snapshots
// ============================================================================

#[test]
fn snapshot_selected_keys() {
    let state = RigStateVariables::new();
    state.set("speed", 2.0_f32);
    state.set("isTurning", true);
    state.set("unrelated", 7_i32);

    let snap = state.snapshot(&["speed", "isTurning", "missing"]);
    assert_eq!(snap.len(), 2);
    assert_eq!(snap.lookup_float("speed", 0.0), 2.0);
    assert!(snap.lookup_bool("isTurning", false));
    assert!(!snap.has("missing"));
    assert!(!snap.has("unrelated"));
}

#[test]
fn snapshot_is_detached_from_store() {
    let state = RigStateVariables::new();
    state.set("speed", 2.0_f32);
    let snap = state.snapshot_all();

    state.set("speed", 9.0_f32);
    state.set("extra", true);
    assert_eq!(snap.len(), 1);
    assert_eq!(snap.lookup_float("speed", 0.0), 2.0);
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn concurrent_writers_and_readers() {
    let state = Arc::new(RigStateVariables::new());
    state.set("target", Vec3::ZERO);

    let writers: Vec<_> = (0..4)
        .map(|id| {
            let state = Arc::clone(&state);
            thread::spawn(move || {
                for i in 0..500 {
                    let v = (id * 1000 + i) as f32;
                    state.set("target", Vec3::splat(v));
                    state.set(&format!("writer{id}"), v);
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let state = Arc::clone(&state);
            thread::spawn(move || {
                for _ in 0..500 {
                    // Every observed vector was written whole
                    if let Some(AnimVariant::Vec3(v)) = state.get("target") {
                        assert!(v.x == v.y && v.y == v.z, "torn value {v:?}");
                    }
                    let snap = state.snapshot_all();
                    if let Some(AnimVariant::Vec3(v)) = snap.get("target") {
                        assert!(v.x == v.y && v.y == v.z, "torn value {v:?}");
                    }
                }
            })
        })
        .collect();

    for handle in writers.into_iter().chain(readers) {
        handle.join().unwrap();
    }

    for id in 0..4 {
        let last = (id * 1000 + 499) as f32;
        assert_eq!(state.get_float(&format!("writer{id}"), -1.0), last);
    }
}

#[test]
fn concurrent_bool_toggle_is_never_torn() {
    let state = Arc::new(RigStateVariables::new());
    state.set("x", false);

    let writer = {
        let state = Arc::clone(&state);
        thread::spawn(move || {
            for i in 0..2000 {
                state.set("x", i % 2 == 0);
            }
        })
    };
    let reader = {
        let state = Arc::clone(&state);
        thread::spawn(move || {
            for _ in 0..2000 {
                let value = state.get("x");
                assert!(
                    matches!(value, Some(AnimVariant::Bool(_))),
                    "unexpected value {value:?}"
                );
            }
        })
    };

    writer.join().unwrap();
    reader.join().unwrap();
    // Last write was i = 1999
    assert!(!state.get_bool("x", true));
}
