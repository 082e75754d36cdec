use vizij_blend_core::{
    collect_clips, flatten, parse_authored_curve_json, parse_state_machine_json, pack,
    BuildError, ClipId, FlattenedMachine, RuntimeStateKind, StateId, StateMachineDef,
    NO_EXIT_GROUP,
};
use vizij_test_fixtures::{curves, state_machines};

fn character() -> FlattenedMachine {
    let json = state_machines::json("character").expect("fixture");
    let def = parse_state_machine_json(&json).expect("parse");
    flatten(&def).expect("flatten")
}

#[test]
fn character_leaves_and_paths() {
    let flat = character();
    let paths: Vec<&str> = flat.states.iter().map(|s| s.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "Idle",
            "Locomotion/Walk",
            "Locomotion/Strafe",
            "Airborne/Jump",
            "Airborne/Fall/FallLoop",
            "Airborne/Fall/Land",
        ]
    );
    assert_eq!(flat.default_state, Some(0));
    for sub in [2, 3, 32] {
        assert_eq!(flat.index_of(StateId(sub)), None, "sub-machine {sub} leaked");
    }
    assert_eq!(flat.resolve(StateId(2)), Some(1));
    assert_eq!(flat.resolve(StateId(3)), Some(3));
    assert_eq!(flat.resolve(StateId(32)), Some(4));
}

#[test]
fn transitions_target_leaves() {
    let flat = character();
    for state in &flat.states {
        for t in &state.transitions {
            assert!(t.target < flat.len(), "{} -> {}", state.path, t.target);
        }
    }
    let idle = &flat.states[0];
    let targets: Vec<usize> = idle.transitions.iter().map(|t| t.target).collect();
    assert_eq!(targets, vec![1, 3]);
    // Jump -> Fall enters FallLoop
    assert_eq!(flat.states[3].transitions[0].target, 4);
    assert!(flat.states[3].transitions[0].has_exit_time);
    // Strafe -> Walk carries a shaped curve
    assert!(!flat.states[2].transitions[0].curve.is_linear());
    assert!(flat.states[0].transitions[0].curve.is_linear());
}

#[test]
fn exit_groups_are_post_order() {
    let flat = character();
    assert_eq!(flat.exit_groups.len(), 2);

    let loco = &flat.exit_groups[0];
    assert_eq!(loco.path, "Locomotion");
    assert_eq!(loco.machine, StateId(2));
    assert_eq!(loco.exit_states, vec![2]);
    assert_eq!(loco.transitions.len(), 1);
    assert_eq!(loco.transitions[0].target, 0);

    let fall = &flat.exit_groups[1];
    assert_eq!(fall.path, "Airborne/Fall");
    assert_eq!(fall.exit_states, vec![5]);
    assert_eq!(fall.transitions[0].target, 0);
    assert_eq!(fall.transitions[0].offset, 0.5);

    assert_eq!(flat.states[2].exit_group(), Some(0));
    assert_eq!(flat.states[5].exit_group(), Some(1));
    assert_eq!(flat.states[0].exit_group, NO_EXIT_GROUP);
    assert_eq!(flat.exit_group_of(5).map(|g| g.machine), Some(StateId(32)));
    assert!(flat.exit_group_of(0).is_none());
}

#[test]
fn clip_table_is_first_seen_and_distinct() {
    let json = state_machines::json("character").unwrap();
    let def = parse_state_machine_json(&json).unwrap();
    let clips = collect_clips(&def);
    let ids: Vec<u32> = clips.iter().map(|c| c.0).collect();
    assert_eq!(ids, vec![0, 2, 1, 3, 4, 5, 6, 7, 8, 9]);

    let flat = flatten(&def).unwrap();
    assert_eq!(flat.clips, clips);
    match &flat.states[1].kind {
        RuntimeStateKind::LinearBlend {
            clips, thresholds, ..
        } => {
            // sorted by threshold: clip 1 (index 2) then clip 2 (index 1)
            assert_eq!(thresholds, &vec![0.0, 1.0]);
            assert_eq!(clips, &vec![2, 1]);
        }
        other => panic!("unexpected {other:?}"),
    }
    match &flat.states[5].kind {
        RuntimeStateKind::Single {
            clip,
            speed,
            looping,
        } => {
            assert_eq!(flat.clips[*clip as usize], ClipId(9));
            assert_eq!(*speed, 1.5);
            assert!(!looping);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn flat_machine_honours_default_state() {
    let def: StateMachineDef = state_machines::load("flat-pair").unwrap();
    let flat = flatten(&def).unwrap();
    assert_eq!(flat.len(), 2);
    assert_eq!(flat.default_state, Some(1));
    assert!(flat.exit_groups.is_empty());
    assert_eq!(flat.find_by_path("B"), Some(1));
}

#[test]
fn empty_sub_machine_target_is_rejected() {
    let json = state_machines::json("broken-empty-target").unwrap();
    let def = parse_state_machine_json(&json).unwrap();
    let err = flatten(&def).unwrap_err();
    assert!(matches!(err, BuildError::EmptyTarget { target } if target == StateId(2)));
    assert_eq!(err.category(), "transition");
}

#[test]
fn flattened_form_round_trips_through_json() {
    let flat = character();
    let json = serde_json::to_string(&flat).unwrap();
    let back: FlattenedMachine = serde_json::from_str(&json).unwrap();
    assert_eq!(back, flat);
}

#[test]
fn curve_fixtures_pack() {
    let linear = parse_authored_curve_json(&curves::json("linear").unwrap()).unwrap();
    assert!(pack(&linear).is_none());

    let ease = parse_authored_curve_json(&curves::json("ease-in-out").unwrap()).unwrap();
    assert_eq!(ease.keys[0].time, 0.0);
    let packed = pack(&ease).expect("ease curve is not linear");
    assert_eq!(packed.len(), 1);
    assert_eq!(packed.keys()[0].value, 0.5);
    assert_eq!(packed.keys()[0].in_tangent, 1.5);

    let many = parse_authored_curve_json(&curves::json("overshoot-keys").unwrap()).unwrap();
    let packed = pack(&many).unwrap();
    assert_eq!(packed.len(), 4);
    assert_eq!(packed.keys()[3].time, 0.7);
}
