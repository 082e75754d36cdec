//! Interpolation and scalar helpers used by the curve, weight and timing rules.

pub mod functions;

pub use functions::{clamp_soft, frac, hermite_segment, saturate};
