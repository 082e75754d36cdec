use bevy::prelude::*;
use vizij_blend_core::{
    calculate_state_from_progress, compute_weights_into, linear_blend_weights,
};

use crate::components::{ActiveTransition, BlendSpace1D, BlendSpace2D, BlendWeights, TransitionState};
use crate::resources::{BlendSettings, FixedDt, TransitionFinished};

/// Gives every blend space without weights a buffer sized from [`BlendSettings`].
pub fn init_blend_weights_system(
    mut commands: Commands,
    settings: Res<BlendSettings>,
    spaces: Query<Entity, (Or<(With<BlendSpace2D>, With<BlendSpace1D>)>, Without<BlendWeights>)>,
) {
    for entity in spaces.iter() {
        commands
            .entity(entity)
            .insert(BlendWeights(Vec::with_capacity(settings.0.scratch_weights)));
    }
}

/// Evaluates every blend space in parallel. Buffers are resized only when
/// the clip count changes.
pub fn compute_blend_weights_system(
    mut spaces_2d: Query<(&BlendSpace2D, &mut BlendWeights)>,
    mut spaces_1d: Query<(&BlendSpace1D, &mut BlendWeights), Without<BlendSpace2D>>,
) {
    spaces_2d.par_iter_mut().for_each(|(space, mut weights)| {
        let n = space.positions.len();
        if weights.0.len() != n {
            weights.0.resize(n, 0.0);
        }
        compute_weights_into(
            space.algorithm,
            space.input.to_array(),
            &space.positions,
            &mut weights.0,
        );
    });

    spaces_1d.par_iter_mut().for_each(|(space, mut weights)| {
        let n = space.thresholds.len();
        if weights.0.len() != n {
            weights.0.resize(n, 0.0);
        }
        linear_blend_weights(space.parameter, &space.thresholds, &mut weights.0);
    });
}

/// Advances every active transition by one fixed tick.
pub fn advance_transitions_system(
    dt: Res<FixedDt>,
    mut transitions: Query<(&mut ActiveTransition, &mut TransitionState)>,
) {
    let dt = dt.0;
    transitions
        .par_iter_mut()
        .for_each(|(mut active, mut state)| {
            active.elapsed += dt;
            let progress = active.config.progress_at(active.elapsed);
            state.0 = calculate_state_from_progress(&active.config, progress);
        });
}

/// Retires transitions whose progress reached 1.
pub fn finish_transitions_system(
    mut commands: Commands,
    transitions: Query<(Entity, &ActiveTransition, &TransitionState)>,
    mut finished: EventWriter<TransitionFinished>,
) {
    for (entity, active, state) in transitions.iter() {
        if !state.0.is_complete() {
            continue;
        }
        debug!(
            "transition {} -> {} finished on {:?} after {:.3}s",
            active.from, active.to, entity, active.elapsed
        );
        commands.entity(entity).remove::<ActiveTransition>();
        finished.send(TransitionFinished {
            entity,
            from: active.from,
            to: active.to,
        });
    }
}
