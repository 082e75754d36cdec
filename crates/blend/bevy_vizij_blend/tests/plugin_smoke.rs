use bevy::ecs::event::Events;
use bevy::prelude::*;
use bevy_vizij_blend::{
    ActiveTransition, BlendSettings, BlendSpace1D, BlendSpace2D, BlendWeights, FixedDt,
    TransitionBundle, TransitionFinished, TransitionState, VizijBlendPlugin,
};
use vizij_blend_core::{
    compute_weights, flatten, linear_blend_weights, parse_state_machine_json, Blend2DAlgorithm,
    TransitionSection,
};

fn app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins).add_plugins(VizijBlendPlugin);
    app
}

fn tick(app: &mut App, n: usize) {
    for _ in 0..n {
        app.world_mut().run_schedule(FixedUpdate);
    }
}

#[test]
fn plugin_inserts_resources() {
    let app = app();
    assert!(app.world().get_resource::<BlendSettings>().is_some());
    assert_eq!(app.world().resource::<FixedDt>().0, 1.0 / 60.0);
}

/// it should write exactly the numbers the core computes for the same input
#[test]
fn blend_space_weights_match_core() {
    let mut app = app();
    let positions = vec![
        [0.0, 0.0],
        [1.0, 0.0],
        [0.0, 1.0],
        [-1.0, 0.0],
        [0.0, -1.0],
    ];
    let mut entities = Vec::new();
    for (i, algorithm) in [
        Blend2DAlgorithm::SimpleDirectional,
        Blend2DAlgorithm::InverseDistanceWeighting,
    ]
    .into_iter()
    .enumerate()
    {
        let input = Vec2::new(0.35 + i as f32 * 0.1, -0.6);
        let e = app
            .world_mut()
            .spawn(BlendSpace2D {
                algorithm,
                positions: positions.clone(),
                input,
            })
            .id();
        entities.push((e, algorithm, input));
    }
    tick(&mut app, 2);

    for (e, algorithm, input) in entities {
        let weights = app.world().get::<BlendWeights>(e).expect("weights inserted");
        let expected = compute_weights(algorithm, input.to_array(), &positions);
        assert_eq!(weights.0, expected);
    }
}

#[test]
fn linear_blend_space_follows_parameter() {
    let mut app = app();
    let thresholds = vec![0.0, 1.0, 3.0];
    let e = app
        .world_mut()
        .spawn(BlendSpace1D {
            thresholds: thresholds.clone(),
            parameter: 2.0,
        })
        .id();
    tick(&mut app, 2);

    let mut expected = [0.0; 3];
    linear_blend_weights(2.0, &thresholds, &mut expected);
    assert_eq!(app.world().get::<BlendWeights>(e).unwrap().0, expected.to_vec());

    app.world_mut().get_mut::<BlendSpace1D>(e).unwrap().parameter = -4.0;
    tick(&mut app, 1);
    assert_eq!(
        app.world().get::<BlendWeights>(e).unwrap().0,
        vec![1.0, 0.0, 0.0]
    );
}

/// it should run a fixture transition to completion and announce it once
#[test]
fn transition_runs_to_completion() {
    let mut app = app();
    let json = vizij_test_fixtures::state_machines::json("flat-pair").expect("fixture");
    let machine = flatten(&parse_state_machine_json(&json).expect("parse")).expect("flatten");
    let transition = &machine.states[0].transitions[0];
    let active = ActiveTransition::from_machine(&machine, 0, transition, 1.2, 0.9)
        .expect("indices in range");
    let duration = active.config.timing.transition_duration;
    let e = app.world_mut().spawn(TransitionBundle::from(active)).id();

    tick(&mut app, 3);
    let state = app.world().get::<TransitionState>(e).unwrap().0;
    assert_eq!(state.section, TransitionSection::Transition);
    assert!(state.raw_progress > 0.0 && state.raw_progress < 1.0);

    let frames = (duration * 60.0).ceil() as usize + 2;
    tick(&mut app, frames);
    assert!(app.world().get::<ActiveTransition>(e).is_none());
    assert!(app.world().get::<TransitionState>(e).unwrap().0.is_complete());

    let events = app.world().resource::<Events<TransitionFinished>>();
    let mut reader = events.get_reader();
    let sent: Vec<_> = reader.read(events).copied().collect();
    assert_eq!(
        sent,
        vec![TransitionFinished {
            entity: e,
            from: 0,
            to: 1,
        }]
    );
}
