//! Core configuration for vizij-blend-core.

use serde::{Deserialize, Serialize};

/// Configuration shared by the per-frame adapters and the preview surface.
///
/// Numeric thresholds used by the timing and weight rules are crate constants,
/// not configuration: both call sites must agree bit for bit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial capacity hint for per-entity weight buffers.
    pub scratch_weights: usize,

    /// Duration (seconds) substituted when the authoring layer hands us a
    /// non-finite or non-positive clip duration.
    pub fallback_duration: f32,

    /// Loop the preview timeline when `advance` runs past the end.
    pub preview_loop: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scratch_weights: 16,
            fallback_duration: 1.0,
            preview_loop: false,
        }
    }
}

impl Config {
    /// Replace a meaningless duration with the configured fallback.
    #[inline]
    pub fn sanitize_duration(&self, seconds: f32) -> f32 {
        sanitize_duration(seconds, self.fallback_duration)
    }
}

/// Returns `seconds` when it is finite and positive, otherwise `fallback`.
#[inline]
pub fn sanitize_duration(seconds: f32, fallback: f32) -> f32 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        fallback
    }
}
