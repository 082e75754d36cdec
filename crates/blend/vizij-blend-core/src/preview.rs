//! Single-threaded scrub/preview session over one transition.
//!
//! Holds a [`TransitionStateConfig`] and a normalized timeline position.
//! Every query goes through the same functions the per-frame path uses.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::curve::{pack_or_linear, AuthoredCurve};
use crate::interp::functions::saturate;
use crate::timing::{TransitionTimingInput, TransitionTimingResult};
use crate::transition::{
    calculate_state, calculate_state_from_progress, TransitionStateConfig,
    TransitionStateSnapshot,
};

/// A transition as requested by an editor: raw timing plus authored curve.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionRequest {
    #[serde(flatten)]
    pub timing: TransitionTimingInput,
    pub transition_offset: f32,
    pub curve: Option<AuthoredCurve>,
}

impl TransitionRequest {
    /// Resolve into an evaluable config. Meaningless clip durations are
    /// replaced with the configured fallback.
    pub fn into_config(self, cfg: &Config) -> TransitionStateConfig {
        let mut input = self.timing;
        input.from_state_duration = cfg.sanitize_duration(input.from_state_duration);
        input.to_state_duration = cfg.sanitize_duration(input.to_state_duration);
        TransitionStateConfig::new(
            input,
            self.transition_offset,
            pack_or_linear(self.curve.as_ref()),
        )
    }
}

#[derive(Clone, Debug)]
pub struct TransitionPreview {
    config: TransitionStateConfig,
    settings: Config,
    /// Normalized timeline position in [0, 1].
    position: f32,
}

impl TransitionPreview {
    pub fn new(config: TransitionStateConfig, settings: Config) -> Self {
        Self {
            config,
            settings,
            position: 0.0,
        }
    }

    pub fn from_request(request: TransitionRequest, settings: Config) -> Self {
        let config = request.into_config(&settings);
        Self::new(config, settings)
    }

    #[inline]
    pub fn config(&self) -> &TransitionStateConfig {
        &self.config
    }

    #[inline]
    pub fn timing(&self) -> &TransitionTimingResult {
        &self.config.timing
    }

    #[inline]
    pub fn position(&self) -> f32 {
        self.position
    }

    /// Jump to a normalized timeline position.
    pub fn scrub(&mut self, normalized_time: f32) -> TransitionStateSnapshot {
        self.position = saturate(normalized_time);
        calculate_state(&self.config, self.position)
    }

    /// Jump to a transition-only progress value.
    pub fn set_progress(&mut self, progress: f32) -> TransitionStateSnapshot {
        let snapshot = calculate_state_from_progress(&self.config, progress);
        self.position = snapshot.normalized_time;
        snapshot
    }

    /// Play forward by `dt` seconds. Past the end the position either wraps
    /// (when `preview_loop` is set) or holds at the end.
    pub fn advance(&mut self, dt: f32) -> TransitionStateSnapshot {
        let total = self.config.total_duration();
        let dt = if dt.is_finite() { dt } else { 0.0 };
        let seconds = self.position * total + dt;
        let seconds = if self.settings.preview_loop {
            seconds.rem_euclid(total)
        } else {
            seconds.clamp(0.0, total)
        };
        self.position = saturate(seconds / total);
        calculate_state(&self.config, self.position)
    }

    /// Evaluate at the current position without moving it.
    pub fn snapshot(&self) -> TransitionStateSnapshot {
        calculate_state(&self.config, self.position)
    }

    /// Replace the transition, keeping the current position.
    pub fn set_config(&mut self, config: TransitionStateConfig) {
        self.config = config;
    }
}
