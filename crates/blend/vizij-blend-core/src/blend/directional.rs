//! Simple-directional 2D blending.
//!
//! At most one idle clip (at the origin) plus the two directional clips that
//! bracket the input angle are ever active, which reproduces radial / 8-way
//! locomotion blending.

use super::{one_hot, POSITION_EPSILON_SQ};
use crate::interp::functions::{distance_sq, length_sq, saturate, wrap_angle};

/// Below this the neighbor span or magnitude is treated as zero.
const MIN_SPAN: f32 = 1e-6;

/// Simple-directional weights. `out.len()` must equal `positions.len()`.
pub fn simple_directional_weights(input: [f32; 2], positions: &[[f32; 2]], out: &mut [f32]) {
    let n = positions.len();
    if n == 0 {
        return;
    }
    if n == 1 {
        out[0] = 1.0;
        return;
    }
    out.fill(0.0);

    let idle = positions
        .iter()
        .position(|p| length_sq(*p) < POSITION_EPSILON_SQ);

    let input_len_sq = length_sq(input);
    if input_len_sq < POSITION_EPSILON_SQ {
        match idle {
            Some(i) => out[i] = 1.0,
            None => out[nearest(input, positions)] = 1.0,
        }
        return;
    }

    let input_angle = input[1].atan2(input[0]);

    // Smallest counter-clockwise delta ("left") and clockwise delta ("right").
    let mut left: Option<(usize, f32)> = None;
    let mut right: Option<(usize, f32)> = None;
    for (i, p) in positions.iter().enumerate() {
        if Some(i) == idle {
            continue;
        }
        let clip_angle = p[1].atan2(p[0]);
        let ccw = wrap_angle(clip_angle - input_angle);
        let cw = wrap_angle(input_angle - clip_angle);
        if left.map_or(true, |(_, d)| ccw < d) {
            left = Some((i, ccw));
        }
        if right.map_or(true, |(_, d)| cw < d) {
            right = Some((i, cw));
        }
    }

    let (Some((li, left_delta)), Some((ri, right_delta))) = (left, right) else {
        // Only the idle clip is left.
        if let Some(i) = idle {
            out[i] = 1.0;
        }
        return;
    };

    let input_len = input_len_sq.sqrt();

    if li == ri {
        match idle {
            Some(idle_i) => {
                let clip_len = length_sq(positions[li]).sqrt();
                let t = if clip_len > MIN_SPAN {
                    saturate(input_len / clip_len)
                } else {
                    1.0
                };
                out[idle_i] = 1.0 - t;
                out[li] = t;
            }
            None => one_hot(out, li),
        }
        return;
    }

    // 0 at the left neighbor, 1 at the right neighbor.
    let span = left_delta + right_delta;
    let angular_t = if span > MIN_SPAN {
        saturate(left_delta / span)
    } else {
        0.0
    };
    let left_weight = 1.0 - angular_t;
    let right_weight = angular_t;

    match idle {
        Some(idle_i) => {
            let left_len = length_sq(positions[li]).sqrt();
            let right_len = length_sq(positions[ri]).sqrt();
            let avg_len = left_weight * left_len + right_weight * right_len;
            let magnitude_t = if avg_len > MIN_SPAN {
                saturate(input_len / avg_len)
            } else {
                1.0
            };
            out[idle_i] = 1.0 - magnitude_t;
            out[li] = left_weight * magnitude_t;
            out[ri] = right_weight * magnitude_t;
        }
        None => {
            out[li] = left_weight;
            out[ri] = right_weight;
        }
    }
}

/// Index of the clip closest to `input`; ties go to the first found.
fn nearest(input: [f32; 2], positions: &[[f32; 2]]) -> usize {
    let mut best = 0;
    let mut best_d = f32::INFINITY;
    for (i, p) in positions.iter().enumerate() {
        let d = distance_sq(input, *p);
        if d < best_d {
            best = i;
            best_d = d;
        }
    }
    best
}
