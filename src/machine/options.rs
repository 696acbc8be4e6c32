//! Per-machine construction options.

use serde::{Deserialize, Serialize};

/// Options applied when a [`crate::StateMachine`] is constructed.
///
/// Missing fields deserialize to their defaults, so hosts can keep a partial
/// table in their own configuration files.
///
/// # Example
///
/// ```rust
/// use hfsm::MachineOptions;
///
/// let options = MachineOptions::default().with_precompute(true);
/// assert!(options.precompute);
/// assert!(!options.enter_initial_state);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineOptions {
    /// Flatten every state's reachable transitions when the resolver is built.
    pub precompute: bool,

    /// Run the enter callbacks of the initial state and each of its
    /// ancestors, initial state first, during construction.
    ///
    /// The synchronous constructors fail with
    /// [`crate::HfsmError::AsyncHandler`] when any of those callbacks is
    /// async; build with [`crate::StateMachine::with_options_async`] instead.
    pub enter_initial_state: bool,
}

impl MachineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_precompute(mut self, precompute: bool) -> Self {
        self.precompute = precompute;
        self
    }

    pub fn with_enter_initial_state(mut self, enter: bool) -> Self {
        self.enter_initial_state = enter;
        self
    }
}
