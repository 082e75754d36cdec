use bevy::prelude::*;
use vizij_blend_core::Config;

/// Core configuration shared by the blend systems.
#[derive(Resource, Debug, Clone, Default)]
pub struct BlendSettings(pub Config);

/// Fixed timestep configuration (seconds per tick).
#[derive(Resource)]
pub struct FixedDt(pub f32);

impl Default for FixedDt {
    fn default() -> Self {
        Self(1.0 / 60.0)
    }
}

/// Sent once when a transition's progress reaches 1.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionFinished {
    pub entity: Entity,
    pub from: usize,
    pub to: usize,
}
