use crate::animation::values::Interpolatable;
use crate::errors::{AnimError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMode {
    Linear,
    Step,
    /// glTF-style layout: each key stores `[in_tangent, value, out_tangent]`.
    CubicSpline,
}

/// How far the cursor scans linearly before falling back to binary search.
const MAX_SCAN_OFFSET: usize = 3;

/// Remembers the last keyframe interval so sequential playback samples in O(1).
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

/// Keyframes for a single joint channel. Key times are in frames.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    times: Vec<f32>,
    values: Vec<T>,
    interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    /// Validates and builds a track.
    ///
    /// Key times must be non-empty and non-decreasing; `values` must hold one
    /// entry per key (three for `CubicSpline`).
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: InterpolationMode) -> Result<Self> {
        if times.is_empty() {
            return Err(AnimError::InvalidTrack("track has no keyframes".to_string()));
        }
        let expected = match interpolation {
            InterpolationMode::CubicSpline => times.len() * 3,
            _ => times.len(),
        };
        if values.len() != expected {
            return Err(AnimError::InvalidTrack(format!(
                "expected {expected} values for {} keys, got {}",
                times.len(),
                values.len()
            )));
        }
        if times.windows(2).any(|w| w[1] < w[0]) {
            return Err(AnimError::InvalidTrack("key times are not sorted".to_string()));
        }
        Ok(Self {
            times,
            values,
            interpolation,
        })
    }

    /// Single-key track holding `value` forever.
    #[must_use]
    pub fn constant(value: T) -> Self {
        Self {
            times: vec![0.0],
            values: vec![value],
            interpolation: InterpolationMode::Step,
        }
    }

    #[must_use]
    pub fn times(&self) -> &[f32] {
        &self.times
    }

    #[must_use]
    pub fn interpolation(&self) -> InterpolationMode {
        self.interpolation
    }

    /// Frame of the last key.
    #[must_use]
    pub fn last_frame(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Stateless sample (binary search).
    #[must_use]
    pub fn sample(&self, frame: f32) -> T {
        let next_idx = self.times.partition_point(|&t| t <= frame);
        self.sample_at_key(next_idx.saturating_sub(1), frame)
    }

    /// Sample using `cursor` as a locality hint; the cursor is updated.
    pub fn sample_with_cursor(&self, frame: f32, cursor: &mut KeyframeCursor) -> T {
        let len = self.times.len();
        if len == 1 {
            return *self.value_at(0);
        }

        // A cursor from another track (e.g. after a clip swap) restarts at 0.
        let i = if cursor.last_index < len { cursor.last_index } else { 0 };

        let local = if frame >= self.times[i] {
            // Forward: find the first interval [idx, idx+1) containing frame.
            (i..=(i + MAX_SCAN_OFFSET).min(len - 1))
                .find(|&idx| idx == len - 1 || frame < self.times[idx + 1])
                .filter(|&idx| idx < len - 1 || frame >= self.times[len - 1])
        } else {
            // Backward: loop wrap or reverse playback.
            (0..=MAX_SCAN_OFFSET.min(i))
                .map(|offset| i - offset)
                .find(|&idx| frame >= self.times[idx])
        };

        let index = local.unwrap_or_else(|| {
            self.times
                .partition_point(|&t| t <= frame)
                .saturating_sub(1)
        });
        cursor.last_index = index;
        self.sample_at_key(index, frame)
    }

    fn value_at(&self, key: usize) -> &T {
        match self.interpolation {
            InterpolationMode::CubicSpline => &self.values[key * 3 + 1],
            _ => &self.values[key],
        }
    }

    fn sample_at_key(&self, index: usize, frame: f32) -> T {
        let len = self.times.len();
        if index >= len - 1 {
            return *self.value_at(len - 1);
        }
        if frame <= self.times[0] {
            return *self.value_at(0);
        }

        let next = index + 1;
        let t0 = self.times[index];
        let span = self.times[next] - t0;
        let t = if span > 1e-6 { ((frame - t0) / span).clamp(0.0, 1.0) } else { 0.0 };

        match self.interpolation {
            InterpolationMode::Step => *self.value_at(index),
            InterpolationMode::Linear => {
                T::interpolate_linear(*self.value_at(index), *self.value_at(next), t)
            }
            InterpolationMode::CubicSpline => {
                let v0 = self.values[index * 3 + 1];
                let out_tangent0 = self.values[index * 3 + 2];
                let in_tangent1 = self.values[next * 3];
                let v1 = self.values[next * 3 + 1];
                T::interpolate_cubic(v0, out_tangent0, in_tangent1, v1, t, span)
            }
        }
    }
}
