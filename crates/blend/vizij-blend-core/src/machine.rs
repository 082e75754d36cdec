//! Hierarchical state-machine authoring model.
//!
//! This is the shape the authoring layer hands to [`crate::flatten::flatten`].
//! It may nest sub-state-machines to any depth; none of it is read on the
//! per-frame path.

use serde::{Deserialize, Serialize};

use crate::blend::Blend2DAlgorithm;
use crate::curve::AuthoredCurve;
use crate::error::BuildError;
use crate::ids::{ClipId, StateId};

fn one() -> f32 {
    1.0
}

fn yes() -> bool {
    true
}

fn default_transition_duration() -> f32 {
    0.25
}

/// One clip of a 1D blend state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlendClip1D {
    pub clip: ClipId,
    pub threshold: f32,
    #[serde(default = "one")]
    pub speed: f32,
}

/// One clip of a 2D blend space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlendClip2D {
    pub clip: ClipId,
    pub position: [f32; 2],
    #[serde(default = "one")]
    pub speed: f32,
}

/// Authoring-time state variants. `SubMachine` never survives flattening.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateKind {
    Single {
        clip: ClipId,
        #[serde(default = "one")]
        speed: f32,
        #[serde(default = "yes")]
        looping: bool,
    },
    LinearBlend {
        clips: Vec<BlendClip1D>,
    },
    #[serde(rename = "directional_2d_blend")]
    Directional2DBlend {
        clips: Vec<BlendClip2D>,
        #[serde(default)]
        algorithm: Blend2DAlgorithm,
    },
    SubMachine {
        #[serde(default)]
        machine: Option<StateMachineDef>,
    },
}

/// Transition descriptor as authored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionDef {
    pub target: StateId,
    #[serde(default)]
    pub has_exit_time: bool,
    /// Seconds into the source state.
    #[serde(default)]
    pub exit_time: f32,
    #[serde(default = "default_transition_duration")]
    pub duration: f32,
    /// Fraction of the target clip at which it is entered.
    #[serde(default)]
    pub offset: f32,
    #[serde(default)]
    pub curve: Option<AuthoredCurve>,
}

impl TransitionDef {
    pub fn to(target: StateId) -> Self {
        Self {
            target,
            has_exit_time: false,
            exit_time: 0.0,
            duration: default_transition_duration(),
            offset: 0.0,
            curve: None,
        }
    }

    pub fn with_duration(mut self, seconds: f32) -> Self {
        self.duration = seconds;
        self
    }

    pub fn with_exit_time(mut self, seconds: f32) -> Self {
        self.has_exit_time = true;
        self.exit_time = seconds;
        self
    }

    pub fn with_offset(mut self, fraction: f32) -> Self {
        self.offset = fraction;
        self
    }

    pub fn with_curve(mut self, curve: AuthoredCurve) -> Self {
        self.curve = Some(curve);
        self
    }
}

/// One authored state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateDef {
    pub id: StateId,
    pub name: String,
    pub kind: StateKind,
    #[serde(default)]
    pub transitions: Vec<TransitionDef>,
}

impl StateDef {
    pub fn new(id: StateId, name: impl Into<String>, kind: StateKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            transitions: Vec::new(),
        }
    }

    pub fn single(id: StateId, name: impl Into<String>, clip: ClipId) -> Self {
        Self::new(
            id,
            name,
            StateKind::Single {
                clip,
                speed: 1.0,
                looping: true,
            },
        )
    }

    pub fn linear_blend(id: StateId, name: impl Into<String>, clips: Vec<BlendClip1D>) -> Self {
        Self::new(id, name, StateKind::LinearBlend { clips })
    }

    pub fn directional(
        id: StateId,
        name: impl Into<String>,
        algorithm: Blend2DAlgorithm,
        clips: Vec<BlendClip2D>,
    ) -> Self {
        Self::new(id, name, StateKind::Directional2DBlend { clips, algorithm })
    }

    pub fn sub_machine(id: StateId, name: impl Into<String>, machine: StateMachineDef) -> Self {
        Self::new(
            id,
            name,
            StateKind::SubMachine {
                machine: Some(machine),
            },
        )
    }

    pub fn with_transition(mut self, transition: TransitionDef) -> Self {
        self.transitions.push(transition);
        self
    }

    #[inline]
    pub fn is_sub_machine(&self) -> bool {
        matches!(self.kind, StateKind::SubMachine { .. })
    }

    /// Nested machine of a sub-state-machine state.
    #[inline]
    pub fn nested(&self) -> Option<&StateMachineDef> {
        match &self.kind {
            StateKind::SubMachine { machine } => machine.as_ref(),
            _ => None,
        }
    }

    /// Whether following entry pointers from this state ends on a leaf.
    pub fn reaches_leaf(&self) -> bool {
        match self.nested() {
            Some(machine) => machine.entry_state().is_some_and(StateDef::reaches_leaf),
            None => !self.is_sub_machine(),
        }
    }
}

/// A (possibly nested) state machine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateMachineDef {
    pub name: String,
    #[serde(default)]
    pub states: Vec<StateDef>,
    /// Entry pointer. When absent the first state is the entry.
    #[serde(default)]
    pub default_state: Option<StateId>,
    /// States through which control may return to the parent level.
    #[serde(default)]
    pub exit_states: Vec<StateId>,
    /// Transitions fired when control exits through an exit state.
    #[serde(default)]
    pub exit_transitions: Vec<TransitionDef>,
}

impl StateMachineDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_state(mut self, state: StateDef) -> Self {
        self.states.push(state);
        self
    }

    pub fn with_default(mut self, id: StateId) -> Self {
        self.default_state = Some(id);
        self
    }

    pub fn with_exit_state(mut self, id: StateId) -> Self {
        self.exit_states.push(id);
        self
    }

    pub fn with_exit_transition(mut self, transition: TransitionDef) -> Self {
        self.exit_transitions.push(transition);
        self
    }

    /// Direct member lookup.
    pub fn state(&self, id: StateId) -> Option<&StateDef> {
        self.states.iter().find(|s| s.id == id)
    }

    /// Designated entry state (direct member), or else the first state whose
    /// entry chain reaches a leaf. Empty sub-machines are never picked
    /// implicitly. `None` when no state qualifies or the entry pointer dangles.
    pub fn entry_state(&self) -> Option<&StateDef> {
        match self.default_state {
            Some(id) => self.state(id),
            None => self.states.iter().find(|s| s.reaches_leaf()),
        }
    }
}

/// Parse a state-machine definition from JSON.
pub fn parse_state_machine_json(s: &str) -> Result<StateMachineDef, BuildError> {
    Ok(serde_json::from_str(s)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_defaults_to_first_state() {
        let m = StateMachineDef::new("Root")
            .with_state(StateDef::single(StateId(1), "Idle", ClipId(0)))
            .with_state(StateDef::single(StateId(2), "Walk", ClipId(1)));
        assert_eq!(m.entry_state().map(|s| s.id), Some(StateId(1)));
        let m = m.with_default(StateId(2));
        assert_eq!(m.entry_state().map(|s| s.id), Some(StateId(2)));
        assert!(StateMachineDef::new("Empty").entry_state().is_none());
    }

    #[test]
    fn implicit_entry_skips_empty_sub_machines() {
        let hollow = StateDef::sub_machine(StateId(1), "Hollow", StateMachineDef::new("Hollow"));
        let m = StateMachineDef::new("Root")
            .with_state(hollow.clone())
            .with_state(StateDef::single(StateId(2), "A", ClipId(0)));
        assert!(!hollow.reaches_leaf());
        assert_eq!(m.entry_state().map(|s| s.id), Some(StateId(2)));

        // an explicit default is honored even when it leads nowhere
        let m = m.with_default(StateId(1));
        assert_eq!(m.entry_state().map(|s| s.id), Some(StateId(1)));

        let only_hollow = StateMachineDef::new("Root").with_state(hollow);
        assert!(only_hollow.entry_state().is_none());
    }

    #[test]
    fn parse_tagged_kinds() {
        let m = parse_state_machine_json(
            r#"{
                "name": "Root",
                "states": [
                    { "id": 1, "name": "Idle", "kind": { "type": "single", "clip": 3 } },
                    { "id": 2, "name": "Move", "kind": { "type": "directional_2d_blend",
                        "algorithm": "inverse_distance_weighting",
                        "clips": [ { "clip": 4, "position": [1.0, 0.0] } ] },
                      "transitions": [ { "target": 1 } ] }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(m.states.len(), 2);
        match &m.states[0].kind {
            StateKind::Single { clip, speed, looping } => {
                assert_eq!(*clip, ClipId(3));
                assert_eq!(*speed, 1.0);
                assert!(*looping);
            }
            other => panic!("unexpected kind {other:?}"),
        }
        assert_eq!(m.states[1].transitions[0].duration, 0.25);
    }

    #[test]
    fn parse_error_is_reported() {
        let err = parse_state_machine_json("{ \"states\": 3 }").unwrap_err();
        assert_eq!(err.category(), "parse");
    }
}
