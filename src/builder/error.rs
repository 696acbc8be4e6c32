//! Build errors for configuration builders.

use thiserror::Error;

/// Errors that can occur while assembling a configuration.
///
/// These are caught before any index is built. Structural problems the
/// builder cannot see (unknown parents or targets, capacity limits) surface
/// later as [`crate::HfsmError`] when a machine or resolver is created.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("State '{state}' declares parent '{first}' and '{second}'. A state has at most one parent")]
    ParentAlreadyDeclared {
        state: String,
        first: String,
        second: String,
    },

    #[error("State '{state}' is declared as its own parent")]
    SelfParent { state: String },

    #[error("State '{state}' was already added. Configure each state with a single builder")]
    DuplicateState { state: String },
}
