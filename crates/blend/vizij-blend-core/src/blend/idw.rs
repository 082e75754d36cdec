//! Inverse-distance weighting for arbitrary (non-radial) clip layouts.

use super::{one_hot, POSITION_EPSILON_SQ};
use crate::interp::functions::distance_sq;

/// Inverse-distance weights (`1 / d²`, normalized). `out.len()` must equal `positions.len()`.
///
/// An input on top of a clip gives that clip weight 1 (first match wins).
pub fn inverse_distance_weights(input: [f32; 2], positions: &[[f32; 2]], out: &mut [f32]) {
    let n = positions.len();
    if n == 0 {
        return;
    }
    if n == 1 {
        out[0] = 1.0;
        return;
    }

    if let Some(i) = positions
        .iter()
        .position(|p| distance_sq(input, *p) < POSITION_EPSILON_SQ)
    {
        one_hot(out, i);
        return;
    }

    let mut total = 0.0;
    for (w, p) in out.iter_mut().zip(positions) {
        *w = 1.0 / distance_sq(input, *p);
        total += *w;
    }
    if total > 0.0 && total.is_finite() {
        let inv = total.recip();
        for w in out.iter_mut() {
            *w *= inv;
        }
    } else {
        // Only reachable with non-finite positions.
        one_hot(out, 0);
    }
}
