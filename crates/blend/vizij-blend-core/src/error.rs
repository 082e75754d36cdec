//! Build-time error types.
//!
//! Only the load/bake layer reports errors. Per-frame functions resolve every
//! numeric edge case to a documented fallback and never fail.

use crate::ids::StateId;

/// Validation and parse failures raised while loading authoring data or flattening a state machine.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum BuildError {
    /// A sub-state-machine state without its nested machine.
    #[error("sub-state-machine '{name}' ({id:?}) has no nested machine")]
    MissingNestedMachine { id: StateId, name: String },

    /// The designated entry state does not belong to the machine that names it.
    #[error("entry state {entry:?} is not a member of machine '{machine}'")]
    EntryNotMember { machine: String, entry: StateId },

    /// A declared exit state does not belong to its sub-state-machine.
    #[error("exit state {state:?} is not a member of sub-state-machine '{machine}'")]
    ExitStateNotMember { machine: String, state: StateId },

    /// A transition names an identity that exists nowhere in the hierarchy.
    #[error("transition from '{from}' targets unknown state {target:?}")]
    UnknownTarget { from: String, target: StateId },

    /// A transition (or entry pointer) resolves to a sub-machine without states.
    #[error("state {target:?} resolves to an empty sub-state-machine")]
    EmptyTarget { target: StateId },

    /// The same identity was declared twice.
    #[error("duplicate state id {id:?} ('{name}')")]
    DuplicateState { id: StateId, name: String },

    /// Authoring JSON could not be parsed.
    #[error("parse error: {reason}")]
    Parse { reason: String },
}

impl BuildError {
    /// Error category for logging.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::MissingNestedMachine { .. }
            | Self::EntryNotMember { .. }
            | Self::ExitStateNotMember { .. }
            | Self::DuplicateState { .. } => "structure",
            Self::UnknownTarget { .. } | Self::EmptyTarget { .. } => "transition",
            Self::Parse { .. } => "parse",
        }
    }
}

impl From<serde_json::Error> for BuildError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            reason: err.to_string(),
        }
    }
}
