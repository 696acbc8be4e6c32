//! Engine errors.

use crate::core::Phase;
use thiserror::Error;

/// Error type host callbacks use to report failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while building an index or driving a state machine.
///
/// Identifiers are rendered with their `Debug` representation so the error
/// type stays independent of the machine's state and trigger types.
#[derive(Debug, Error)]
pub enum HfsmError {
    #[error("Duplicate state '{state}' in configuration")]
    DuplicateState { state: String },

    #[error("State '{state}' declares unconfigured parent '{parent}'")]
    UnknownParent { state: String, parent: String },

    #[error("Transition from '{from}' on '{trigger}' targets unconfigured state '{target}'")]
    UnknownTarget {
        from: String,
        trigger: String,
        target: String,
    },

    #[error("Configuration declares {count} states, the index holds at most {max}")]
    TooManyStates { count: usize, max: usize },

    /// Also reported for parent cycles, which never reach a root.
    #[error("Hierarchy of state '{state}' exceeds the maximum depth of {max}")]
    HierarchyTooDeep { state: String, max: usize },

    #[error("State '{state}' is not configured in this state machine")]
    UnknownState { state: String },

    #[error("No transition for trigger '{trigger}' from state '{state}'")]
    NoTransition { trigger: String, state: String },

    #[error("Guard for trigger '{trigger}' failed")]
    Guard {
        trigger: String,
        #[source]
        source: BoxError,
    },

    #[error("{phase} handler of state '{state}' failed")]
    Handler {
        state: String,
        phase: Phase,
        #[source]
        source: BoxError,
    },

    #[error("{phase} handler of state '{state}' is async, use the async fire methods")]
    AsyncHandler { state: String, phase: Phase },
}

/// Result alias used throughout the crate.
pub type Result<T, E = HfsmError> = std::result::Result<T, E>;

pub(crate) fn render<D: std::fmt::Debug + ?Sized>(value: &D) -> String {
    format!("{value:?}")
}
