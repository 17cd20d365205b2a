use std::sync::Arc;

use crate::animation::nodes::{AnimNode, FRAMES_PER_SECOND, TIME_EPSILON, Triggers};
use crate::animation::pose::{AnimPoseVec, blend_poses};
use crate::animation::skeleton::AnimSkeleton;
use crate::animation::variant::AnimVariantMap;
use crate::errors::{AnimError, Result};

/// Linear blend between child poses.
///
/// With two children `alpha` lies in `[0, 1]`: child 0 is weighted
/// `1 - alpha`, child 1 `alpha`. With more children `alpha` lies in
/// `[0, n - 1]` and blends the two nearest children, sweeping through the
/// sequence. Out-of-range alphas are clamped.
///
/// With `sync` enabled the active children are time-scaled so that each
/// completes its own loop in the time of the blended average loop, keeping
/// e.g. a walk and a run cycle phase-aligned while they cross-fade.
#[derive(Debug)]
pub struct AnimBlendLinear {
    id: String,
    children: Vec<AnimNode>,

    pub alpha: f32,
    pub sync: bool,
    pub time_scale: f32,

    alpha_var: String,
    time_scale_var: String,

    /// Playback position in frames of the current average loop.
    sync_frame: f32,
    /// Alpha-weighted loop length of the active children, in frames.
    average_length: f32,
    /// Children blended on the previous tick.
    active: Option<(usize, usize)>,

    poses: AnimPoseVec,
}

impl AnimBlendLinear {
    pub fn new(
        id: &str,
        alpha: f32,
        sync: bool,
        time_scale: f32,
        children: Vec<AnimNode>,
    ) -> Result<Self> {
        if children.is_empty() {
            return Err(AnimError::NoChildren(id.to_string()));
        }
        Ok(Self {
            id: id.to_string(),
            children,
            alpha,
            sync,
            time_scale,
            alpha_var: String::new(),
            time_scale_var: String::new(),
            sync_frame: 0.0,
            average_length: 0.0,
            active: None,
            poses: Vec::new(),
        })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_alpha_var(&mut self, var: &str) {
        self.alpha_var = var.to_string();
    }

    pub fn set_time_scale_var(&mut self, var: &str) {
        self.time_scale_var = var.to_string();
    }

    pub fn add_child(&mut self, child: AnimNode) {
        self.children.push(child);
    }

    #[must_use]
    pub fn children(&self) -> &[AnimNode] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [AnimNode] {
        &mut self.children
    }

    #[must_use]
    pub fn sync_frame(&self) -> f32 {
        self.sync_frame
    }

    #[must_use]
    pub fn average_length(&self) -> f32 {
        self.average_length
    }

    #[must_use]
    pub fn poses(&self) -> &AnimPoseVec {
        &self.poses
    }

    pub fn set_skeleton(&mut self, skeleton: Arc<AnimSkeleton>) {
        for child in &mut self.children {
            child.set_skeleton(Arc::clone(&skeleton));
        }
    }

    /// In sync mode this is the blended average loop; unsynced blends have
    /// no loop of their own.
    ///
    /// Before the first synced tick there is no average yet, and the length is
    /// estimated from the static `alpha`: a bound alpha variable is only seen
    /// by `evaluate`. From the first synced tick on, the average reflects the
    /// alpha that tick resolved.
    #[must_use]
    pub fn natural_length(&self) -> Option<f32> {
        if !self.sync {
            return None;
        }
        if self.average_length > 0.0 {
            return Some(self.average_length);
        }
        let (prev, next, frac) = self.window(self.alpha);
        self.blended_length(prev, next, frac)
    }

    pub fn set_current_frame(&mut self, frame: f32) {
        if self.sync && self.average_length > 0.0 {
            self.sync_frame = frame.rem_euclid(self.average_length);
            let phase = self.sync_frame / self.average_length;
            for child in &mut self.children {
                child.set_phase(phase);
            }
        } else {
            self.sync_frame = frame.max(0.0);
            for child in &mut self.children {
                child.set_current_frame(frame);
            }
        }
    }

    pub fn set_phase(&mut self, phase: f32) {
        match self.natural_length() {
            Some(length) if self.sync => {
                self.average_length = length;
                self.set_current_frame(phase * length);
            }
            _ => {
                for child in &mut self.children {
                    child.set_phase(phase);
                }
            }
        }
    }

    pub fn evaluate(
        &mut self,
        variables: &AnimVariantMap,
        dt: f32,
        triggers: &mut Triggers,
    ) -> &AnimPoseVec {
        let alpha = variables.lookup_float(&self.alpha_var, self.alpha);
        let time_scale = variables.lookup_float(&self.time_scale_var, self.time_scale);
        let (prev, next, frac) = self.window(alpha);

        let unsynced = dt * time_scale;
        // A sync fallback leaves nothing marked active, so every child is
        // re-aligned once sync resumes.
        let (prev_dt, next_dt, active) = if self.sync {
            match self.synchronize(dt, time_scale, prev, next, frac) {
                Some((prev_dt, next_dt)) => (prev_dt, next_dt, Some((prev, next))),
                None => (unsynced, unsynced, None),
            }
        } else {
            (unsynced, unsynced, Some((prev, next)))
        };

        let Self {
            children, poses, ..
        } = self;

        if prev == next {
            children[prev].evaluate(variables, prev_dt, triggers);
            poses.clone_from(children[prev].poses());
        } else {
            children[prev].evaluate(variables, prev_dt, triggers);
            children[next].evaluate(variables, next_dt, triggers);
            blend_poses(children[prev].poses(), children[next].poses(), frac, poses);
        }

        self.active = active;
        &self.poses
    }

    /// Clamps `alpha` and splits it into the two nearest children plus the
    /// blend fraction between them.
    fn window(&self, alpha: f32) -> (usize, usize, f32) {
        let last = self.children.len().saturating_sub(1);
        let alpha = if alpha.is_finite() { alpha.clamp(0.0, last as f32) } else { 0.0 };
        let prev = (alpha.floor() as usize).min(last);
        let next = (alpha.ceil() as usize).min(last);
        (prev, next, alpha - prev as f32)
    }

    fn blended_length(&self, prev: usize, next: usize, frac: f32) -> Option<f32> {
        let prev_len = self.children[prev].natural_length()?;
        let next_len = self.children[next].natural_length()?;
        let average = prev_len + (next_len - prev_len) * frac;
        (average > 0.0).then_some(average)
    }

    /// Updates the sync clock and returns the per-child time steps that keep
    /// the active pair in phase. `None` when a child has no natural length.
    fn synchronize(
        &mut self,
        dt: f32,
        time_scale: f32,
        prev: usize,
        next: usize,
        frac: f32,
    ) -> Option<(f32, f32)> {
        let Some(average) = self.blended_length(prev, next, frac) else {
            log::trace!("AnimBlendLinear '{}': sync skipped, child has no length", self.id);
            return None;
        };
        let prev_len = self.children[prev].natural_length().unwrap_or(average);
        let next_len = self.children[next].natural_length().unwrap_or(average);

        // Keep the phase when the average loop stretches or shrinks.
        if self.average_length > 0.0 && (average - self.average_length).abs() > f32::EPSILON {
            self.sync_frame *= average / self.average_length;
        }
        self.average_length = average;
        self.sync_frame = self.sync_frame.rem_euclid(average);

        // Children entering the window start at the shared phase.
        let phase = self.sync_frame / average;
        let previously_active = self.active;
        let was_active = |i: usize| matches!(previously_active, Some((a, b)) if a == i || b == i);
        if !was_active(prev) {
            self.children[prev].set_phase(phase);
        }
        if next != prev && !was_active(next) {
            self.children[next].set_phase(phase);
        }

        // Paused or reversed playback holds the clock, matching the children.
        if dt <= TIME_EPSILON || time_scale <= TIME_EPSILON || !time_scale.is_finite() {
            return Some((0.0, 0.0));
        }
        let step = dt * time_scale;
        self.sync_frame = (self.sync_frame + step * FRAMES_PER_SECOND).rem_euclid(average);

        Some((step * (prev_len / average), step * (next_len / average)))
    }
}
