//! 1D linear blending over sorted thresholds.

/// Linear-blend weights for a scalar `parameter`.
///
/// `thresholds` must be sorted ascending. The parameter is clamped to the
/// threshold range and the two bracketing clips share weight linearly.
/// Coincident thresholds resolve to the first clip.
pub fn linear_blend_weights(parameter: f32, thresholds: &[f32], out: &mut [f32]) {
    let n = thresholds.len();
    if n == 0 {
        return;
    }
    let out = &mut out[..n];
    out.fill(0.0);
    if n == 1 || !parameter.is_finite() {
        out[0] = 1.0;
        return;
    }

    if parameter <= thresholds[0] {
        out[0] = 1.0;
        return;
    }
    if parameter >= thresholds[n - 1] {
        // First of any run of equal trailing thresholds.
        let first = thresholds
            .iter()
            .position(|t| *t >= thresholds[n - 1])
            .unwrap_or(n - 1);
        out[first] = 1.0;
        return;
    }

    for i in 0..n - 1 {
        let (lo, hi) = (thresholds[i], thresholds[i + 1]);
        if parameter >= lo && parameter < hi {
            let span = hi - lo;
            let t = if span > 1e-6 {
                (parameter - lo) / span
            } else {
                0.0
            };
            out[i] = 1.0 - t;
            out[i + 1] = t;
            return;
        }
    }
    out[n - 1] = 1.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights(p: f32, th: &[f32]) -> Vec<f32> {
        let mut out = vec![0.0; th.len()];
        linear_blend_weights(p, th, &mut out);
        out
    }

    #[test]
    fn clamps_to_ends() {
        assert_eq!(weights(-1.0, &[0.0, 1.0, 2.0]), vec![1.0, 0.0, 0.0]);
        assert_eq!(weights(5.0, &[0.0, 1.0, 2.0]), vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn interpolates_between_bracket() {
        let w = weights(1.25, &[0.0, 1.0, 2.0]);
        assert!((w[1] - 0.75).abs() < 1e-6);
        assert!((w[2] - 0.25).abs() < 1e-6);
        assert_eq!(w[0], 0.0);
    }

    #[test]
    fn coincident_thresholds_pick_first() {
        assert_eq!(weights(1.0, &[0.0, 1.0, 1.0]), vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn nan_parameter_falls_back() {
        assert_eq!(weights(f32::NAN, &[0.0, 1.0]), vec![1.0, 0.0]);
    }
}
