use approx::assert_relative_eq;
use vizij_blend_core::{
    compute_weights, compute_weights_into, linear_blend_weights, Blend2DAlgorithm,
};

const ALGORITHMS: [Blend2DAlgorithm; 2] = [
    Blend2DAlgorithm::SimpleDirectional,
    Blend2DAlgorithm::InverseDistanceWeighting,
];

/// Idle at the origin plus eight directions on the unit circle.
fn eight_way() -> Vec<[f32; 2]> {
    let mut positions = vec![[0.0, 0.0]];
    for i in 0..8 {
        let a = i as f32 * std::f32::consts::FRAC_PI_4;
        positions.push([a.cos(), a.sin()]);
    }
    positions
}

fn sample_inputs() -> Vec<[f32; 2]> {
    let mut inputs = vec![[0.0, 0.0], [1e-6, 0.0], [5.0, 5.0], [-0.3, 0.2]];
    for i in 0..24 {
        let a = i as f32 * 0.27 + 0.05;
        for r in [0.1, 0.5, 0.99, 1.7] {
            inputs.push([r * a.cos(), r * a.sin()]);
        }
    }
    inputs
}

#[test]
fn weights_are_a_partition_of_unity() {
    let positions = eight_way();
    for algo in ALGORITHMS {
        for input in sample_inputs() {
            let w = compute_weights(algo, input, &positions);
            let sum: f32 = w.iter().sum();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-4);
            assert!(w.iter().all(|v| *v >= 0.0 && v.is_finite()), "{algo:?} {input:?} {w:?}");
        }
    }
}

#[test]
fn directional_activates_at_most_three_clips() {
    let positions = eight_way();
    for input in sample_inputs() {
        let w = compute_weights(Blend2DAlgorithm::SimpleDirectional, input, &positions);
        let active = w.iter().filter(|v| **v > 0.0).count();
        assert!(active <= 3, "{input:?} -> {w:?}");
    }
}

#[test]
fn mirrored_input_gives_mirrored_weights() {
    // positions symmetric about the x axis: index i mirrors to index mirror[i]
    let positions = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [-1.0, 0.0], [0.0, -1.0]];
    let mirror = [0, 1, 4, 3, 2];
    for algo in ALGORITHMS {
        for input in [[0.4, 0.3], [0.9, 0.2], [-0.5, 0.6], [0.1, 0.05]] {
            let a = compute_weights(algo, input, &positions);
            let b = compute_weights(algo, [input[0], -input[1]], &positions);
            for i in 0..positions.len() {
                assert_relative_eq!(a[i], b[mirror[i]], epsilon = 1e-5);
            }
        }
    }
}

#[test]
fn exact_clip_position_is_one_hot() {
    let positions = eight_way();
    for algo in ALGORITHMS {
        for (i, p) in positions.iter().enumerate() {
            let w = compute_weights(algo, *p, &positions);
            assert_relative_eq!(w[i], 1.0, epsilon = 1e-5);
        }
    }
}

#[test]
fn caller_buffer_matches_vec_convention() {
    let positions = eight_way();
    let mut buf = vec![0.0; positions.len()];
    for algo in ALGORITHMS {
        for input in sample_inputs() {
            compute_weights_into(algo, input, &positions, &mut buf);
            let v = compute_weights(algo, input, &positions);
            assert_eq!(buf, v);
        }
    }
}

#[test]
fn linear_blend_partition_of_unity() {
    let thresholds = [-1.0, 0.0, 0.5, 2.0];
    let mut out = [0.0; 4];
    for i in -30..=30 {
        let p = i as f32 * 0.1;
        linear_blend_weights(p, &thresholds, &mut out);
        let sum: f32 = out.iter().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-5);
        assert!(out.iter().filter(|w| **w > 0.0).count() <= 2);
    }
}
