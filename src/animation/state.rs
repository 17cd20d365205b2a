use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::animation::variant::{AnimVariant, AnimVariantMap};

/// Thread-safe variable store shared between the simulation thread and
/// scripting/UI threads.
///
/// One mutex guards the whole mapping; every accessor holds it only for the
/// duration of a single call. Multi-key reads go through [`snapshot`] /
/// [`snapshot_all`], which copy under the lock and hand back an owned map, so
/// no caller code ever runs while the lock is held.
///
/// [`snapshot`]: RigStateVariables::snapshot
/// [`snapshot_all`]: RigStateVariables::snapshot_all
#[derive(Debug, Default)]
pub struct RigStateVariables {
    inner: Mutex<FxHashMap<String, AnimVariant>>,
}

impl RigStateVariables {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored bool, or `default` when absent or not a bool.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        let guard = self.inner.lock();
        guard.get(key).and_then(AnimVariant::as_bool).unwrap_or(default)
    }

    /// Returns the stored float, or `default` when absent or not a float.
    #[must_use]
    pub fn get_float(&self, key: &str, default: f32) -> f32 {
        let guard = self.inner.lock();
        guard.get(key).and_then(AnimVariant::as_float).unwrap_or(default)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<AnimVariant> {
        self.inner.lock().get(key).cloned()
    }

    pub fn set(&self, key: &str, value: impl Into<AnimVariant>) {
        let value = value.into();
        self.inner.lock().insert(key.to_string(), value);
    }

    pub fn remove(&self, key: &str) -> Option<AnimVariant> {
        self.inner.lock().remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Atomic read of several keys. Keys that are not set are omitted.
    #[must_use]
    pub fn snapshot(&self, keys: &[&str]) -> AnimVariantMap {
        let guard = self.inner.lock();
        keys.iter()
            .filter_map(|&k| guard.get(k).map(|v| (k.to_string(), v.clone())))
            .collect()
    }

    /// Atomic copy of the whole store.
    #[must_use]
    pub fn snapshot_all(&self) -> AnimVariantMap {
        let guard = self.inner.lock();
        guard.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}
