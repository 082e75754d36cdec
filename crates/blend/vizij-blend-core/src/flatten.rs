//! Build-time flattening of hierarchical state machines.
//!
//! [`flatten`] walks a [`StateMachineDef`] depth-first and produces a
//! [`FlattenedMachine`]: leaf states in a flat, index-addressed list with
//! slash-delimited paths, an identity→index map, transitions whose targets
//! are flat indices (sub-machine targets redirected to their entry leaf), and
//! exit-transition groups for sub-machines that hand control back to their
//! parent. Runtime consumers only ever see indices.

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use crate::blend::Blend2DAlgorithm;
use crate::curve::{pack_or_linear, BlendCurve};
use crate::error::BuildError;
use crate::ids::{ClipId, StateId};
use crate::machine::{StateDef, StateKind, StateMachineDef, TransitionDef};
use crate::timing::TransitionTimingInput;
use crate::transition::TransitionStateConfig;

/// Exit-group sentinel for leaves that are not an exit point of any sub-machine.
pub const NO_EXIT_GROUP: i32 = -1;

/// Runtime state variants. Clip references are indices into [`FlattenedMachine::clips`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeStateKind {
    Single {
        clip: u32,
        speed: f32,
        looping: bool,
    },
    LinearBlend {
        clips: Vec<u32>,
        thresholds: Vec<f32>,
        speeds: Vec<f32>,
    },
    #[serde(rename = "directional_2d_blend")]
    Directional2DBlend {
        clips: Vec<u32>,
        positions: Vec<[f32; 2]>,
        speeds: Vec<f32>,
        algorithm: Blend2DAlgorithm,
    },
}

impl RuntimeStateKind {
    /// Multi-clip state.
    #[inline]
    pub fn is_blend(&self) -> bool {
        !matches!(self, RuntimeStateKind::Single { .. })
    }

    /// Clip-table indices used by this state.
    pub fn clip_indices(&self) -> &[u32] {
        match self {
            RuntimeStateKind::Single { clip, .. } => std::slice::from_ref(clip),
            RuntimeStateKind::LinearBlend { clips, .. }
            | RuntimeStateKind::Directional2DBlend { clips, .. } => clips,
        }
    }
}

/// A transition with its target resolved to a flat index and its curve packed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTransition {
    pub target: usize,
    pub has_exit_time: bool,
    pub exit_time: f32,
    pub duration: f32,
    pub offset: f32,
    pub curve: BlendCurve,
}

impl ResolvedTransition {
    /// Timing request for this transition given the two state durations.
    pub fn timing_input(
        &self,
        from_duration: f32,
        to_duration: f32,
        from_is_blend: bool,
        to_is_blend: bool,
    ) -> TransitionTimingInput {
        TransitionTimingInput {
            from_state_duration: from_duration,
            to_state_duration: to_duration,
            requested_exit_time: if self.has_exit_time {
                self.exit_time
            } else {
                from_duration
            },
            requested_transition_duration: self.duration,
            from_is_blend,
            to_is_blend,
        }
    }
}

/// One leaf state's runtime identity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlattenedState {
    /// Identity of the authored state this leaf came from.
    pub source: StateId,
    /// Slash-delimited hierarchical path, e.g. `"Locomotion/Run"`.
    pub path: String,
    /// Index into [`FlattenedMachine::exit_groups`], or [`NO_EXIT_GROUP`].
    pub exit_group: i32,
    pub kind: RuntimeStateKind,
    pub transitions: Vec<ResolvedTransition>,
}

impl FlattenedState {
    #[inline]
    pub fn exit_group(&self) -> Option<usize> {
        usize::try_from(self.exit_group).ok()
    }
}

/// Exit states of one sub-machine and the transitions fired through them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExitTransitionGroup {
    /// Identity of the sub-state-machine state.
    pub machine: StateId,
    pub path: String,
    pub exit_states: Vec<usize>,
    pub transitions: Vec<ResolvedTransition>,
}

/// Flat runtime form of a state machine. Immutable once built.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FlattenedMachine {
    pub name: String,
    pub states: Vec<FlattenedState>,
    /// Leaf identity → flat index. Never contains sub-machine identities.
    pub index_of: HashMap<StateId, usize>,
    /// Sub-machine identity → flat index of its resolved entry leaf.
    pub sub_machine_entries: HashMap<StateId, usize>,
    pub exit_groups: Vec<ExitTransitionGroup>,
    /// Every distinct clip referenced, in first-seen order.
    pub clips: Vec<ClipId>,
    pub default_state: Option<usize>,
}

impl FlattenedMachine {
    #[inline]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    #[inline]
    pub fn state(&self, index: usize) -> Option<&FlattenedState> {
        self.states.get(index)
    }

    /// Flat index of a leaf identity.
    #[inline]
    pub fn index_of(&self, id: StateId) -> Option<usize> {
        self.index_of.get(&id).copied()
    }

    /// Flat index a transition to `id` lands on: the leaf itself, or the
    /// entry leaf of a sub-machine.
    pub fn resolve(&self, id: StateId) -> Option<usize> {
        self.index_of(id)
            .or_else(|| self.sub_machine_entries.get(&id).copied())
    }

    pub fn find_by_path(&self, path: &str) -> Option<usize> {
        self.states.iter().position(|s| s.path == path)
    }

    pub fn exit_group(&self, index: usize) -> Option<&ExitTransitionGroup> {
        self.exit_groups.get(index)
    }

    /// Exit group of the leaf at `state`, if it is an exit point.
    pub fn exit_group_of(&self, state: usize) -> Option<&ExitTransitionGroup> {
        self.state(state)
            .and_then(FlattenedState::exit_group)
            .and_then(|g| self.exit_groups.get(g))
    }

    pub fn clip_index(&self, clip: ClipId) -> Option<u32> {
        self.clips.iter().position(|c| *c == clip).map(|i| i as u32)
    }

    /// Transition config for `transition` leaving the leaf at `from`.
    /// `None` when `from` or the target is out of range.
    pub fn transition_config(
        &self,
        from: usize,
        transition: &ResolvedTransition,
        from_duration: f32,
        to_duration: f32,
    ) -> Option<TransitionStateConfig> {
        let from_state = self.state(from)?;
        let to_state = self.state(transition.target)?;
        let input = transition.timing_input(
            from_duration,
            to_duration,
            from_state.kind.is_blend(),
            to_state.kind.is_blend(),
        );
        Some(TransitionStateConfig::new(
            input,
            transition.offset,
            transition.curve,
        ))
    }
}

/// Every distinct clip referenced anywhere in the hierarchy, in first-seen order.
pub fn collect_clips(root: &StateMachineDef) -> Vec<ClipId> {
    fn push(clip: ClipId, seen: &mut HashSet<ClipId>, out: &mut Vec<ClipId>) {
        if seen.insert(clip) {
            out.push(clip);
        }
    }
    fn walk(machine: &StateMachineDef, seen: &mut HashSet<ClipId>, out: &mut Vec<ClipId>) {
        for state in &machine.states {
            match &state.kind {
                StateKind::Single { clip, .. } => push(*clip, seen, out),
                StateKind::LinearBlend { clips } => {
                    for c in clips {
                        push(c.clip, seen, out);
                    }
                }
                StateKind::Directional2DBlend { clips, .. } => {
                    for c in clips {
                        push(c.clip, seen, out);
                    }
                }
                StateKind::SubMachine { machine: Some(m) } => walk(m, seen, out),
                StateKind::SubMachine { machine: None } => {}
            }
        }
    }
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    walk(root, &mut seen, &mut out);
    out
}

/// A sub-machine with declared exit states, recorded during traversal.
struct GroupSource<'a> {
    state: &'a StateDef,
    machine: &'a StateMachineDef,
    path: String,
}

#[derive(Default)]
struct Flattener<'a> {
    defs: HashMap<StateId, &'a StateDef>,
    leaves: Vec<FlattenedState>,
    leaf_defs: Vec<&'a StateDef>,
    index_of: HashMap<StateId, usize>,
    clip_index: HashMap<ClipId, u32>,
    groups: Vec<GroupSource<'a>>,
}

impl<'a> Flattener<'a> {
    /// Register identities and validate structure before anything is emitted.
    fn index_defs(&mut self, machine: &'a StateMachineDef) -> Result<(), BuildError> {
        if let Some(entry) = machine.default_state {
            if machine.state(entry).is_none() {
                return Err(BuildError::EntryNotMember {
                    machine: machine.name.clone(),
                    entry,
                });
            }
        }
        for state in &machine.states {
            if self.defs.insert(state.id, state).is_some() {
                return Err(BuildError::DuplicateState {
                    id: state.id,
                    name: state.name.clone(),
                });
            }
            if let StateKind::SubMachine { machine: nested } = &state.kind {
                let nested = nested.as_ref().ok_or_else(|| BuildError::MissingNestedMachine {
                    id: state.id,
                    name: state.name.clone(),
                })?;
                for exit in &nested.exit_states {
                    if nested.state(*exit).is_none() {
                        return Err(BuildError::ExitStateNotMember {
                            machine: state.name.clone(),
                            state: *exit,
                        });
                    }
                }
                self.index_defs(nested)?;
            }
        }
        Ok(())
    }

    fn emit(&mut self, machine: &'a StateMachineDef, prefix: &str) {
        for state in &machine.states {
            let path = format!("{prefix}{}", state.name);
            match &state.kind {
                StateKind::SubMachine { machine: nested } => {
                    let Some(nested) = nested else { continue };
                    self.emit(nested, &format!("{path}/"));
                    if !nested.exit_states.is_empty() {
                        self.groups.push(GroupSource {
                            state,
                            machine: nested,
                            path,
                        });
                    } else if !state.transitions.is_empty() {
                        log::warn!(
                            "sub-state-machine '{path}' has transitions but no exit states; they never fire"
                        );
                    }
                }
                kind => {
                    let Some(kind) = self.runtime_kind(kind) else {
                        continue;
                    };
                    self.index_of.insert(state.id, self.leaves.len());
                    self.leaves.push(FlattenedState {
                        source: state.id,
                        path,
                        exit_group: NO_EXIT_GROUP,
                        kind,
                        transitions: Vec::new(),
                    });
                    self.leaf_defs.push(state);
                }
            }
        }
    }

    fn clip(&self, clip: ClipId) -> u32 {
        self.clip_index.get(&clip).copied().unwrap_or(0)
    }

    fn runtime_kind(&self, kind: &StateKind) -> Option<RuntimeStateKind> {
        let kind = match kind {
            StateKind::Single {
                clip,
                speed,
                looping,
            } => RuntimeStateKind::Single {
                clip: self.clip(*clip),
                speed: *speed,
                looping: *looping,
            },
            StateKind::LinearBlend { clips } => {
                let mut sorted: Vec<_> = clips.iter().collect();
                sorted.sort_by(|a, b| {
                    a.threshold
                        .partial_cmp(&b.threshold)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                RuntimeStateKind::LinearBlend {
                    clips: sorted.iter().map(|c| self.clip(c.clip)).collect(),
                    thresholds: sorted.iter().map(|c| c.threshold).collect(),
                    speeds: sorted.iter().map(|c| c.speed).collect(),
                }
            }
            StateKind::Directional2DBlend { clips, algorithm } => {
                RuntimeStateKind::Directional2DBlend {
                    clips: clips.iter().map(|c| self.clip(c.clip)).collect(),
                    positions: clips.iter().map(|c| c.position).collect(),
                    speeds: clips.iter().map(|c| c.speed).collect(),
                    algorithm: *algorithm,
                }
            }
            StateKind::SubMachine { .. } => return None,
        };
        Some(kind)
    }

    /// Follow entry pointers from `id` down to a leaf.
    fn resolve_entry(&self, from: &str, id: StateId) -> Result<usize, BuildError> {
        let mut current = id;
        loop {
            if let Some(&index) = self.index_of.get(&current) {
                return Ok(index);
            }
            let def = self
                .defs
                .get(&current)
                .ok_or_else(|| BuildError::UnknownTarget {
                    from: from.to_string(),
                    target: current,
                })?;
            let entry = def
                .nested()
                .and_then(StateMachineDef::entry_state)
                .ok_or(BuildError::EmptyTarget { target: id })?;
            current = entry.id;
        }
    }

    fn resolve_transition(
        &self,
        from: &str,
        t: &TransitionDef,
    ) -> Result<ResolvedTransition, BuildError> {
        Ok(ResolvedTransition {
            target: self.resolve_entry(from, t.target)?,
            has_exit_time: t.has_exit_time,
            exit_time: t.exit_time,
            duration: t.duration,
            offset: t.offset,
            curve: pack_or_linear(t.curve.as_ref()),
        })
    }
}

/// Flatten `root` into its runtime form.
///
/// Fails on structural problems (missing nested machine, dangling entry or
/// exit pointers, unknown or empty transition targets, duplicate identities).
pub fn flatten(root: &StateMachineDef) -> Result<FlattenedMachine, BuildError> {
    let clips = collect_clips(root);
    let mut cx = Flattener {
        clip_index: clips
            .iter()
            .enumerate()
            .map(|(i, c)| (*c, i as u32))
            .collect(),
        ..Default::default()
    };

    cx.index_defs(root)?;
    cx.emit(root, "");

    if !root.exit_states.is_empty() {
        log::warn!(
            "root machine '{}' declares exit states; there is no parent to exit to",
            root.name
        );
    }

    // Entry leaf of every non-empty sub-machine.
    let mut sub_machine_entries = HashMap::new();
    for (id, def) in cx.defs.iter() {
        if def.is_sub_machine() {
            match cx.resolve_entry(&def.name, *id) {
                Ok(index) => {
                    sub_machine_entries.insert(*id, index);
                }
                Err(BuildError::EmptyTarget { .. }) => {}
                Err(err) => return Err(err),
            }
        }
    }

    let default_state = match root.entry_state() {
        Some(entry) => Some(cx.resolve_entry(&root.name, entry.id)?),
        None => None,
    };

    let mut transitions = Vec::with_capacity(cx.leaves.len());
    for (leaf, def) in cx.leaves.iter().zip(&cx.leaf_defs) {
        let resolved = def
            .transitions
            .iter()
            .map(|t| cx.resolve_transition(&leaf.path, t))
            .collect::<Result<Vec<_>, _>>()?;
        transitions.push(resolved);
    }

    let mut exit_groups = Vec::with_capacity(cx.groups.len());
    let mut exit_marks: Vec<(usize, usize)> = Vec::new();
    for (group_index, src) in cx.groups.iter().enumerate() {
        let exit_states = src
            .machine
            .exit_states
            .iter()
            .map(|id| cx.resolve_entry(&src.path, *id))
            .collect::<Result<Vec<_>, _>>()?;
        let resolved = src
            .machine
            .exit_transitions
            .iter()
            .chain(&src.state.transitions)
            .map(|t| cx.resolve_transition(&src.path, t))
            .collect::<Result<Vec<_>, _>>()?;
        exit_marks.extend(exit_states.iter().map(|s| (*s, group_index)));
        exit_groups.push(ExitTransitionGroup {
            machine: src.state.id,
            path: src.path.clone(),
            exit_states,
            transitions: resolved,
        });
    }

    let Flattener {
        mut leaves,
        index_of,
        ..
    } = cx;

    for (leaf, resolved) in leaves.iter_mut().zip(transitions) {
        leaf.transitions = resolved;
    }
    // Innermost group wins: groups are recorded in post-order.
    for (state, group) in exit_marks {
        let leaf = &mut leaves[state];
        if leaf.exit_group == NO_EXIT_GROUP {
            leaf.exit_group = group as i32;
        } else if leaf.exit_group != group as i32 {
            log::warn!(
                "'{}' is an exit state of several sub-machines; keeping group {}",
                leaf.path,
                leaf.exit_group
            );
        }
    }

    log::debug!(
        "flattened '{}': {} leaves, {} exit groups, {} clips",
        root.name,
        leaves.len(),
        exit_groups.len(),
        clips.len()
    );

    Ok(FlattenedMachine {
        name: root.name.clone(),
        states: leaves,
        index_of,
        sub_machine_entries,
        exit_groups,
        clips,
        default_state,
    })
}
