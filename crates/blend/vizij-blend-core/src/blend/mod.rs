//! Blend-space weight computation.
//!
//! Every entry point writes one non-negative weight per clip and the weights
//! sum to 1. Three calling conventions share one implementation, so the
//! per-frame path and the preview path produce identical numbers:
//! - [`compute_weights_into`]: slice in, caller-owned buffer out, no allocation
//! - [`compute_weights_fixed`]: fixed-size arrays
//! - [`compute_weights`]: convenience, returns a `Vec<f32>`

pub mod directional;
pub mod idw;
pub mod linear;

use serde::{Deserialize, Serialize};

pub use directional::simple_directional_weights;
pub use idw::inverse_distance_weights;
pub use linear::linear_blend_weights;

/// Squared-distance threshold (`1e-4²`) for "at the origin" / "at the clip".
pub const POSITION_EPSILON_SQ: f32 = 1e-4 * 1e-4;

/// 2D blend algorithm, chosen per blend space at authoring time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Blend2DAlgorithm {
    /// Angular two-neighbor interpolation with optional idle clip at the origin.
    #[default]
    SimpleDirectional,
    /// Every clip contributes `1 / distance²`.
    InverseDistanceWeighting,
}

/// Compute weights for `input` over `positions` into `out`.
///
/// Only `out[..positions.len()]` is written. Does nothing when `positions` is empty.
///
/// # Panics
/// If `out` is shorter than `positions`.
#[inline]
pub fn compute_weights_into(
    algorithm: Blend2DAlgorithm,
    input: [f32; 2],
    positions: &[[f32; 2]],
    out: &mut [f32],
) {
    let out = &mut out[..positions.len()];
    match algorithm {
        Blend2DAlgorithm::SimpleDirectional => simple_directional_weights(input, positions, out),
        Blend2DAlgorithm::InverseDistanceWeighting => {
            inverse_distance_weights(input, positions, out)
        }
    }
}

/// Fixed-array calling convention.
#[inline]
pub fn compute_weights_fixed<const N: usize>(
    algorithm: Blend2DAlgorithm,
    input: [f32; 2],
    positions: &[[f32; 2]; N],
) -> [f32; N] {
    let mut out = [0.0; N];
    compute_weights_into(algorithm, input, positions, &mut out);
    out
}

/// Convenience calling convention.
pub fn compute_weights(
    algorithm: Blend2DAlgorithm,
    input: [f32; 2],
    positions: &[[f32; 2]],
) -> Vec<f32> {
    let mut out = vec![0.0; positions.len()];
    compute_weights_into(algorithm, input, positions, &mut out);
    out
}

/// Effective duration of a blend state: the weight-averaged clip duration.
/// Returns 0 when the weights sum to ~0.
pub fn blend_state_duration(weights: &[f32], durations: &[f32]) -> f32 {
    let mut total_w = 0.0;
    let mut acc = 0.0;
    for (w, d) in weights.iter().zip(durations) {
        total_w += *w;
        acc += *w * *d;
    }
    if total_w > 1e-6 {
        acc / total_w
    } else {
        0.0
    }
}

#[inline]
pub(crate) fn one_hot(out: &mut [f32], index: usize) {
    out.fill(0.0);
    out[index] = 1.0;
}
