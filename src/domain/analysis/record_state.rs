//! RecordState enum for tracking persistence of an open analysis.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Persistence state of an analysis record held by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecordState {
    #[default]
    Uninitialized,
    Loaded,
    Dirty,
    Saving,
    Deleted,
}

impl RecordState {
    /// Returns true if the record has edits not yet confirmed by the store.
    pub fn has_unsaved_changes(&self) -> bool {
        matches!(self, RecordState::Dirty | RecordState::Saving)
    }
}

impl StateMachine for RecordState {
    /// Valid transitions:
    /// - Uninitialized -> Loaded | Dirty
    /// - Loaded -> Dirty | Deleted
    /// - Dirty -> Dirty | Saving | Deleted
    /// - Saving -> Loaded | Dirty
    fn can_transition_to(&self, target: &Self) -> bool {
        use RecordState::*;
        matches!(
            (self, target),
            (Uninitialized, Loaded)
                | (Uninitialized, Dirty)
                | (Loaded, Dirty)
                | (Loaded, Deleted)
                | (Dirty, Dirty)
                | (Dirty, Saving)
                | (Dirty, Deleted)
                | (Saving, Loaded)
                | (Saving, Dirty)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use RecordState::*;
        match self {
            Uninitialized => vec![Loaded, Dirty],
            Loaded => vec![Dirty, Deleted],
            Dirty => vec![Dirty, Saving, Deleted],
            Saving => vec![Loaded, Dirty],
            Deleted => vec![],
        }
    }
}

impl fmt::Display for RecordState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecordState::Uninitialized => "Uninitialized",
            RecordState::Loaded => "Loaded",
            RecordState::Dirty => "Dirty",
            RecordState::Saving => "Saving",
            RecordState::Deleted => "Deleted",
        };
        write!(f, "{}", s)
    }
}
