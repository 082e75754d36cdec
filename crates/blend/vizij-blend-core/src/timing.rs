//! Transition timeline layout.
//!
//! A transition timeline is five consecutive sections:
//! `[GhostFrom][FromBar][Transition][ToBar][GhostTo]`.
//! Ghost sections are never sampled; they show how many times a short clip
//! loops inside the requested window.

use serde::{Deserialize, Serialize};

use crate::interp::functions::clamp_soft;

/// Smallest legal transition duration (seconds).
pub const MIN_TRANSITION_DURATION: f32 = 0.01;
/// About one frame at 60 fps; bars shorter than this collapse.
pub const FRAME_THRESHOLD: f32 = 0.017;
/// Upper bound for ghost / visual cycle counts.
pub const MAX_VISUAL_CYCLES: u32 = 4;
/// Tolerance for "bars end together" and "exit at zero" context ghosts.
pub const CONTEXT_GHOST_EPSILON: f32 = 0.001;

/// Requested timing of a transition between two states.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionTimingInput {
    pub from_state_duration: f32,
    pub to_state_duration: f32,
    pub requested_exit_time: f32,
    pub requested_transition_duration: f32,
    /// The "from" side is a multi-clip blend state.
    pub from_is_blend: bool,
    /// The "to" side is a multi-clip blend state.
    pub to_is_blend: bool,
}

/// Derived section durations of a transition timeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionTimingResult {
    pub exit_time: f32,
    pub transition_duration: f32,
    pub from_bar_duration: f32,
    pub to_bar_duration: f32,
    pub ghost_from_duration: f32,
    pub ghost_to_duration: f32,
    pub min_exit_time: f32,
    pub from_visual_cycles: u32,
    pub to_visual_cycles: u32,
}

impl TransitionTimingResult {
    /// Sum of the five section durations.
    #[inline]
    pub fn total_duration(&self) -> f32 {
        self.ghost_from_duration
            + self.from_bar_duration
            + self.transition_duration
            + self.to_bar_duration
            + self.ghost_to_duration
    }

    /// Timeline seconds at which the transition section begins.
    #[inline]
    pub fn transition_start(&self) -> f32 {
        self.ghost_from_duration + self.from_bar_duration
    }

    /// Timeline seconds at which the transition section ends.
    #[inline]
    pub fn transition_end(&self) -> f32 {
        self.transition_start() + self.transition_duration
    }
}

/// Number of clip loops needed to cover `window`, clamped to [1, MAX_VISUAL_CYCLES].
#[inline]
fn loop_cycles(window: f32, clip: f32) -> u32 {
    let cycles = (window / clip).ceil();
    if cycles.is_finite() {
        (cycles as i64).clamp(1, MAX_VISUAL_CYCLES as i64) as u32
    } else {
        1
    }
}

#[inline]
fn non_negative(v: f32) -> f32 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}

/// Lay out the timeline for one transition.
pub fn calculate_timing(input: &TransitionTimingInput) -> TransitionTimingResult {
    let from = non_negative(input.from_state_duration);
    let to = non_negative(input.to_state_duration);
    let requested_exit = non_negative(input.requested_exit_time);
    let requested_transition = non_negative(input.requested_transition_duration);

    let min_exit_time = (from - to).max(0.0);
    let exit_time = clamp_soft(requested_exit, min_exit_time, from);
    let transition_duration = clamp_soft(
        requested_transition,
        MIN_TRANSITION_DURATION,
        to.max(MIN_TRANSITION_DURATION),
    );

    let mut from_bar = 0.0;
    let mut ghost_from = 0.0;
    let mut ghost_to = 0.0;
    let mut ghost_from_cycles = 1;
    let mut ghost_to_cycles = 1;

    if input.from_is_blend || input.to_is_blend {
        // Blend states exit at their end.
        let remaining = from - transition_duration;
        if remaining > FRAME_THRESHOLD {
            from_bar = remaining;
        } else {
            ghost_from = from;
        }
        if to > FRAME_THRESHOLD && requested_transition > to + FRAME_THRESHOLD {
            ghost_to_cycles = loop_cycles(requested_transition, to);
            ghost_to = (ghost_to_cycles - 1) as f32 * to;
        }
    } else {
        from_bar = exit_time;
        if from > FRAME_THRESHOLD && requested_exit > from + FRAME_THRESHOLD {
            ghost_from_cycles = loop_cycles(requested_exit, from);
            ghost_from = (ghost_from_cycles - 1) as f32 * from;
        }
        if to > FRAME_THRESHOLD && requested_transition > to + FRAME_THRESHOLD {
            ghost_to_cycles = loop_cycles(requested_transition, to);
            ghost_to = (ghost_to_cycles - 1) as f32 * to;
        }
    }

    let mut to_bar = to - transition_duration;
    if to_bar <= FRAME_THRESHOLD {
        to_bar = 0.0;
        if ghost_to <= 0.0 {
            ghost_to = to;
        }
    }

    // Visual cycles.
    let from_bar_collapsed = from_bar <= FRAME_THRESHOLD && from > FRAME_THRESHOLD;
    let exits_at_start =
        exit_time.abs() < CONTEXT_GHOST_EPSILON && min_exit_time.abs() < CONTEXT_GHOST_EPSILON;
    let mut from_visual_cycles = ghost_from_cycles;
    if from_bar_collapsed || exits_at_start {
        from_visual_cycles = from_visual_cycles.max(2);
    }

    let overruns_to = to > FRAME_THRESHOLD && requested_transition > to + FRAME_THRESHOLD;
    // From bar spans through the transition; the bars end together when no to-bar is left.
    let from_end = ghost_from + from_bar + transition_duration;
    let to_end = from_end + to_bar;
    let bars_end_together = (to_end - from_end).abs() < CONTEXT_GHOST_EPSILON;
    let mut to_visual_cycles = ghost_to_cycles;
    if overruns_to || bars_end_together {
        to_visual_cycles = to_visual_cycles.max(2);
    }

    TransitionTimingResult {
        exit_time,
        transition_duration,
        from_bar_duration: from_bar,
        to_bar_duration: to_bar,
        ghost_from_duration: ghost_from,
        ghost_to_duration: ghost_to,
        min_exit_time,
        from_visual_cycles: from_visual_cycles.clamp(1, MAX_VISUAL_CYCLES),
        to_visual_cycles: to_visual_cycles.clamp(1, MAX_VISUAL_CYCLES),
    }
}
