//! Vizij Blend Core (engine-agnostic)
//!
//! Numeric core for clip blending and transitions driven by a hierarchical
//! state machine:
//! - build time: flatten an authored [`StateMachineDef`] into an
//!   index-addressed [`FlattenedMachine`] and pack authored curves;
//! - per frame: 2D/1D blend weights, packed curve evaluation, transition
//!   timing layout and transition state snapshots.
//!
//! The per-frame functions are pure and allocation-free; adapters (Bevy
//! systems, the wasm preview) call them with identical inputs and get
//! identical results.

pub mod blend;
pub mod config;
pub mod curve;
pub mod error;
pub mod flatten;
pub mod ids;
pub mod interp;
pub mod machine;
pub mod preview;
pub mod timing;
pub mod transition;

// Re-exports for consumers (adapters)
pub use blend::{
    blend_state_duration, compute_weights, compute_weights_fixed, compute_weights_into,
    linear::linear_blend_weights, Blend2DAlgorithm,
};
pub use config::{sanitize_duration, Config};
pub use curve::{
    evaluate, evaluate_blend_curve, pack, pack_or_linear, parse_authored_curve_json,
    AuthoredCurve, AuthoredKey, BlendCurve, CurveKeyframe,
};
pub use error::BuildError;
pub use flatten::{
    collect_clips, flatten, ExitTransitionGroup, FlattenedMachine, FlattenedState,
    ResolvedTransition, RuntimeStateKind, NO_EXIT_GROUP,
};
pub use ids::{ClipId, IdAllocator, StateId};
pub use machine::{
    parse_state_machine_json, BlendClip1D, BlendClip2D, StateDef, StateKind, StateMachineDef,
    TransitionDef,
};
pub use preview::{TransitionPreview, TransitionRequest};
pub use timing::{calculate_timing, TransitionTimingInput, TransitionTimingResult};
pub use transition::{
    calculate_normalized_time, calculate_state, calculate_state_at_seconds,
    calculate_state_from_progress, TransitionSection, TransitionStateConfig,
    TransitionStateSnapshot,
};

/// Result alias for the build-time layer.
pub type Result<T> = core::result::Result<T, BuildError>;
