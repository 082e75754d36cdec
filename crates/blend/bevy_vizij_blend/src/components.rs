use bevy::prelude::*;
use vizij_blend_core::{
    Blend2DAlgorithm, FlattenedMachine, ResolvedTransition, TransitionStateConfig,
    TransitionStateSnapshot,
};

/// 2D blend space evaluated every fixed tick into [`BlendWeights`].
#[derive(Component, Debug, Clone, Default)]
pub struct BlendSpace2D {
    pub algorithm: Blend2DAlgorithm,
    pub positions: Vec<[f32; 2]>,
    /// Current blend parameter (e.g. local velocity).
    pub input: Vec2,
}

/// 1D blend space over thresholds sorted ascending.
#[derive(Component, Debug, Clone, Default)]
pub struct BlendSpace1D {
    pub thresholds: Vec<f32>,
    pub parameter: f32,
}

/// One weight per clip of the entity's blend space.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct BlendWeights(pub Vec<f32>);

/// A transition in flight. `elapsed` counts seconds since the transition section began.
#[derive(Component, Debug, Clone)]
pub struct ActiveTransition {
    pub config: TransitionStateConfig,
    pub elapsed: f32,
    /// Flat state indices.
    pub from: usize,
    pub to: usize,
}

impl ActiveTransition {
    pub fn new(config: TransitionStateConfig, from: usize, to: usize) -> Self {
        Self {
            config,
            elapsed: 0.0,
            from,
            to,
        }
    }

    /// Start `transition` out of the flat state `from`. `None` for out-of-range indices.
    pub fn from_machine(
        machine: &FlattenedMachine,
        from: usize,
        transition: &ResolvedTransition,
        from_duration: f32,
        to_duration: f32,
    ) -> Option<Self> {
        machine
            .transition_config(from, transition, from_duration, to_duration)
            .map(|config| Self::new(config, from, transition.target))
    }
}

/// Latest evaluation of the entity's [`ActiveTransition`].
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct TransitionState(pub TransitionStateSnapshot);

#[derive(Bundle)]
pub struct TransitionBundle {
    pub active: ActiveTransition,
    pub state: TransitionState,
}

impl From<ActiveTransition> for TransitionBundle {
    fn from(active: ActiveTransition) -> Self {
        Self {
            active,
            state: TransitionState::default(),
        }
    }
}
