//! Transition state evaluation.
//!
//! Given a [`TransitionStateConfig`] and a position on its timeline, produce a
//! [`TransitionStateSnapshot`]: the current section, each state's normalized
//! clip time, raw progress and the curve-shaped blend weight. The same
//! functions back the per-frame runtime and interactive scrubbing.

use serde::{Deserialize, Serialize};

use crate::curve::{evaluate_blend_curve, BlendCurve};
use crate::interp::functions::{frac, saturate};
use crate::timing::{calculate_timing, TransitionTimingInput, TransitionTimingResult};

/// Timelines shorter than this are floored to it.
pub const MIN_TIMELINE_DURATION: f32 = 0.001;
/// Clips at or below this duration report normalized time 0.
pub const MIN_CLIP_DURATION: f32 = 0.001;
/// Transition durations below this snap progress to 0 or 1.
const MIN_PROGRESS_SPAN: f32 = 1e-6;
/// Positions within this many ulps of the timeline length land on a section
/// boundary.
const BOUNDARY_SNAP_ULPS: f32 = 4.0;

/// Timeline section, in timeline order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionSection {
    GhostFrom,
    #[default]
    FromBar,
    Transition,
    ToBar,
    GhostTo,
}

/// Everything needed to evaluate one transition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionStateConfig {
    pub from_state_duration: f32,
    pub to_state_duration: f32,
    /// Clamped exit time, equal to `timing.exit_time`.
    pub exit_time: f32,
    /// Clamped transition duration, equal to `timing.transition_duration`.
    pub transition_duration: f32,
    /// Fraction of the "to" clip at which it is entered.
    pub transition_offset: f32,
    pub timing: TransitionTimingResult,
    #[serde(default)]
    pub curve: BlendCurve,
}

impl TransitionStateConfig {
    /// Build a config from requested values, computing the timing layout.
    /// The stored exit time and duration are the clamped ones.
    pub fn new(input: TransitionTimingInput, transition_offset: f32, curve: BlendCurve) -> Self {
        let timing = calculate_timing(&input);
        Self {
            from_state_duration: input.from_state_duration,
            to_state_duration: input.to_state_duration,
            exit_time: timing.exit_time,
            transition_duration: timing.transition_duration,
            transition_offset,
            timing,
            curve,
        }
    }

    /// Timeline length, floored to [`MIN_TIMELINE_DURATION`].
    #[inline]
    pub fn total_duration(&self) -> f32 {
        self.timing.total_duration().max(MIN_TIMELINE_DURATION)
    }

    /// Raw progress after `elapsed` seconds inside the transition section.
    #[inline]
    pub fn progress_at(&self, elapsed: f32) -> f32 {
        let span = self.timing.transition_duration;
        if span < MIN_PROGRESS_SPAN {
            return if elapsed > 0.0 { 1.0 } else { 0.0 };
        }
        saturate(elapsed / span)
    }
}

/// Result of evaluating a transition at one timeline position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionStateSnapshot {
    pub from_normalized_time: f32,
    pub to_normalized_time: f32,
    /// Pre-curve transition completion in [0, 1].
    pub raw_progress: f32,
    /// Post-curve "to" weight in [0, 1].
    pub blend_weight: f32,
    pub section: TransitionSection,
    pub current_seconds: f32,
    pub total_seconds: f32,
    /// Timeline position normalized to [0, 1].
    pub normalized_time: f32,
}

impl TransitionStateSnapshot {
    /// True once the transition section has been fully traversed.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.raw_progress >= 1.0
    }
}

/// `frac(seconds / duration)`; 0 for clips at or below [`MIN_CLIP_DURATION`].
#[inline]
pub fn calculate_normalized_time(seconds: f32, duration: f32) -> f32 {
    if !(duration > MIN_CLIP_DURATION) {
        return 0.0;
    }
    frac(seconds / duration)
}

/// Section containing `seconds`; first match wins.
#[inline]
pub fn section_at(timing: &TransitionTimingResult, seconds: f32) -> TransitionSection {
    let ghost_from_end = timing.ghost_from_duration;
    let from_bar_end = ghost_from_end + timing.from_bar_duration;
    let transition_end = from_bar_end + timing.transition_duration;
    let to_bar_end = transition_end + timing.to_bar_duration;
    if seconds < ghost_from_end {
        TransitionSection::GhostFrom
    } else if seconds < from_bar_end {
        TransitionSection::FromBar
    } else if seconds < transition_end {
        TransitionSection::Transition
    } else if seconds < to_bar_end {
        TransitionSection::ToBar
    } else {
        TransitionSection::GhostTo
    }
}

/// Clip time wrapped inside a window of `cycles` loops, then normalized.
#[inline]
fn looped_normalized_time(seconds: f32, duration: f32, cycles: u32) -> f32 {
    let window = duration * cycles.max(1) as f32;
    let local = if window > MIN_CLIP_DURATION {
        seconds.rem_euclid(window)
    } else {
        0.0
    };
    calculate_normalized_time(local, duration)
}

/// Evaluate the transition at a normalized timeline position in [0, 1].
pub fn calculate_state(config: &TransitionStateConfig, normalized_time: f32) -> TransitionStateSnapshot {
    let total = config.total_duration();
    evaluate_at(config, saturate(normalized_time) * total, total)
}

/// Evaluate at a transition-only progress value in [0, 1] by mapping it to
/// a normalized timeline position.
pub fn calculate_state_from_progress(
    config: &TransitionStateConfig,
    progress: f32,
) -> TransitionStateSnapshot {
    let timing = &config.timing;
    let seconds = timing.transition_start() + saturate(progress) * timing.transition_duration;
    calculate_state(config, seconds / config.total_duration())
}

/// Evaluate at an absolute timeline position in seconds.
pub fn calculate_state_at_seconds(
    config: &TransitionStateConfig,
    seconds: f32,
) -> TransitionStateSnapshot {
    let total = config.total_duration();
    let seconds = if seconds.is_finite() { seconds } else { 0.0 };
    evaluate_at(config, seconds.clamp(0.0, total), total)
}

/// Nearest section boundary within rounding distance of `current`, else
/// `current` unchanged.
fn snap_to_boundary(timing: &TransitionTimingResult, current: f32, total: f32) -> f32 {
    let tolerance = total * BOUNDARY_SNAP_ULPS * f32::EPSILON;
    let ghost_from_end = timing.ghost_from_duration;
    let from_bar_end = ghost_from_end + timing.from_bar_duration;
    let transition_end = from_bar_end + timing.transition_duration;
    let to_bar_end = transition_end + timing.to_bar_duration;
    [ghost_from_end, from_bar_end, transition_end, to_bar_end]
        .into_iter()
        .filter(|b| (current - b).abs() <= tolerance)
        .min_by(|a, b| (current - a).abs().total_cmp(&(current - b).abs()))
        .unwrap_or(current)
}

fn evaluate_at(config: &TransitionStateConfig, current: f32, total: f32) -> TransitionStateSnapshot {
    let timing = &config.timing;
    let current = snap_to_boundary(timing, current, total);
    let section = section_at(timing, current);

    let transition_start = timing.transition_start();
    let raw_progress = if current < transition_start {
        0.0
    } else if current >= timing.transition_end() || timing.transition_duration < MIN_PROGRESS_SPAN {
        1.0
    } else {
        saturate((current - transition_start) / timing.transition_duration)
    };

    let blend_weight = evaluate_blend_curve(&config.curve, raw_progress);

    let from_normalized_time = looped_normalized_time(
        current,
        config.from_state_duration,
        timing.from_visual_cycles,
    );

    let to_elapsed = (current - transition_start).max(0.0);
    let to_seconds = to_elapsed + saturate(config.transition_offset) * config.to_state_duration;
    let to_normalized_time =
        looped_normalized_time(to_seconds, config.to_state_duration, timing.to_visual_cycles);

    TransitionStateSnapshot {
        from_normalized_time,
        to_normalized_time,
        raw_progress,
        blend_weight,
        section,
        current_seconds: current,
        total_seconds: total,
        normalized_time: saturate(current / total),
    }
}
