//! Bevy adapter for `vizij-blend-core`.
//!
//! Blend spaces and in-flight transitions live on entities; fixed-tick systems
//! evaluate them in parallel with the same core functions the preview uses.

use bevy::prelude::*;

pub mod components;
pub mod resources;
pub mod systems;

pub use components::{
    ActiveTransition, BlendSpace1D, BlendSpace2D, BlendWeights, TransitionBundle,
    TransitionState,
};
pub use resources::{BlendSettings, FixedDt, TransitionFinished};

pub struct VizijBlendPlugin;

impl Plugin for VizijBlendPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BlendSettings>()
            .init_resource::<FixedDt>()
            .add_event::<TransitionFinished>()
            .add_systems(
                FixedUpdate,
                (
                    systems::init_blend_weights_system,
                    systems::compute_blend_weights_system,
                    systems::advance_transitions_system,
                    systems::finish_transitions_system,
                )
                    .chain(),
            );
    }
}
