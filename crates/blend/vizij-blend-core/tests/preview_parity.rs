use vizij_blend_core::{
    calculate_state, calculate_state_from_progress, flatten, parse_state_machine_json, Config,
    TransitionPreview, TransitionSection,
};
use vizij_test_fixtures::state_machines;

#[test]
fn preview_and_frame_loop_agree_on_fixture_transitions() {
    let json = state_machines::json("character").unwrap();
    let flat = flatten(&parse_state_machine_json(&json).unwrap()).unwrap();

    for (from, state) in flat.states.iter().enumerate() {
        for t in &state.transitions {
            let cfg = flat
                .transition_config(from, t, 1.0, 0.8)
                .expect("indices are in range");
            let mut preview = TransitionPreview::new(cfg, Config::default());

            // frame loop: normalized position recomputed from accumulated seconds
            let total = cfg.total_duration();
            let dt = 1.0 / 60.0;
            let mut seconds = 0.0f32;
            for _ in 0..240 {
                seconds = (seconds + dt).min(total);
                let frame = calculate_state(&cfg, seconds / total);
                let previewed = preview.advance(dt);
                assert!((frame.raw_progress - previewed.raw_progress).abs() < 1e-4);
                assert!((frame.blend_weight - previewed.blend_weight).abs() < 1e-4);
            }
            assert_eq!(preview.snapshot().section, TransitionSection::GhostTo);
            assert!(preview.snapshot().is_complete());
        }
    }
}

#[test]
fn scrub_is_a_pure_function_of_position() {
    let json = state_machines::json("flat-pair").unwrap();
    let flat = flatten(&parse_state_machine_json(&json).unwrap()).unwrap();
    let t = &flat.states[0].transitions[0];
    let cfg = flat.transition_config(0, t, 1.2, 0.9).unwrap();
    let mut preview = TransitionPreview::new(cfg, Config::default());

    let a = preview.scrub(0.4);
    preview.scrub(0.9);
    preview.advance(0.3);
    let b = preview.scrub(0.4);
    assert_eq!(a, b);

    let p = preview.set_progress(0.5);
    assert_eq!(p, calculate_state_from_progress(&cfg, 0.5));
    assert_eq!(preview.snapshot().section, TransitionSection::Transition);
}

#[test]
fn out_of_range_indices_have_no_config() {
    let json = state_machines::json("flat-pair").unwrap();
    let flat = flatten(&parse_state_machine_json(&json).unwrap()).unwrap();
    let t = flat.states[0].transitions[0].clone();
    assert!(flat.transition_config(7, &t, 1.0, 1.0).is_none());
}
