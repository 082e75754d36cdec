//! Scalar helpers shared by every per-frame rule:
//! - saturate / guarded clamp (never panics on inverted bounds)
//! - cubic Hermite segment evaluation
//! - angle wrapping for the directional blend search
//! - fractional part for loop wrapping

use std::f32::consts::TAU;

/// Segments shorter than this evaluate to their start value.
pub const DEGENERATE_SEGMENT: f32 = 1e-6;

/// Clamp to [0, 1]. NaN maps to 0.
#[inline]
pub fn saturate(v: f32) -> f32 {
    if v > 0.0 {
        if v < 1.0 {
            v
        } else {
            1.0
        }
    } else {
        0.0
    }
}

/// Clamp that tolerates `lo > hi` (returns `lo`) instead of panicking like `f32::clamp`.
#[inline]
pub fn clamp_soft(v: f32, lo: f32, hi: f32) -> f32 {
    v.min(hi).max(lo)
}

/// Cubic Hermite basis: (h00, h10, h01, h11) at local parameter `s`.
#[inline]
pub fn hermite_basis(s: f32) -> [f32; 4] {
    let s2 = s * s;
    let s3 = s2 * s;
    [
        2.0 * s3 - 3.0 * s2 + 1.0,
        s3 - 2.0 * s2 + s,
        -2.0 * s3 + 3.0 * s2,
        s3 - s2,
    ]
}

/// Evaluate one Hermite segment between `(t0, v0)` leaving with tangent `m0`
/// and `(t1, v1)` arriving with tangent `m1`. Tangents are per unit time and
/// are scaled by the segment duration.
#[inline]
pub fn hermite_segment(t0: f32, v0: f32, m0: f32, t1: f32, v1: f32, m1: f32, t: f32) -> f32 {
    let dt = t1 - t0;
    if dt < DEGENERATE_SEGMENT {
        return v0;
    }
    let s = (t - t0) / dt;
    let [h00, h10, h01, h11] = hermite_basis(s);
    h00 * v0 + h10 * (m0 * dt) + h01 * v1 + h11 * (m1 * dt)
}

/// Wrap an angle into [0, TAU).
#[inline]
pub fn wrap_angle(a: f32) -> f32 {
    let w = a.rem_euclid(TAU);
    // rem_euclid may round up to exactly TAU for tiny negative inputs.
    if w >= TAU {
        0.0
    } else {
        w
    }
}

/// Fractional part in [0, 1) for non-negative and negative inputs alike.
#[inline]
pub fn frac(v: f32) -> f32 {
    let f = v - v.floor();
    if f >= 1.0 {
        0.0
    } else {
        f
    }
}

#[inline]
pub fn length_sq(v: [f32; 2]) -> f32 {
    v[0] * v[0] + v[1] * v[1]
}

#[inline]
pub fn distance_sq(a: [f32; 2], b: [f32; 2]) -> f32 {
    length_sq([a[0] - b[0], a[1] - b[1]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturate_handles_nan_and_bounds() {
        assert_eq!(saturate(-1.0), 0.0);
        assert_eq!(saturate(2.0), 1.0);
        assert_eq!(saturate(0.25), 0.25);
        assert_eq!(saturate(f32::NAN), 0.0);
    }

    #[test]
    fn clamp_soft_inverted_bounds() {
        assert_eq!(clamp_soft(0.5, 1.0, 0.0), 1.0);
        assert_eq!(clamp_soft(0.5, 0.0, 1.0), 0.5);
    }

    #[test]
    fn hermite_unit_tangents_are_linear() {
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            let v = hermite_segment(0.0, 0.0, 1.0, 1.0, 1.0, 1.0, t);
            assert!((v - t).abs() < 1e-6, "t={t} v={v}");
        }
    }

    #[test]
    fn hermite_degenerate_returns_start() {
        assert_eq!(hermite_segment(0.5, 0.3, 4.0, 0.5, 0.9, 4.0, 0.5), 0.3);
    }

    #[test]
    fn frac_and_wrap() {
        assert!((frac(2.25) - 0.25).abs() < 1e-6);
        assert!((frac(-0.25) - 0.75).abs() < 1e-6);
        assert!(wrap_angle(-1e-9) < TAU);
        assert!((wrap_angle(-std::f32::consts::FRAC_PI_2) - 1.5 * std::f32::consts::PI).abs() < 1e-5);
    }
}
