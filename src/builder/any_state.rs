//! Builder for the any-state pseudostate.

use crate::core::{AnyState, Guard, GuardedTransition, StateId, TriggerId};

/// Transitions available from every state, tried after the current branch.
pub struct AnyStateBuilder<S, T> {
    transitions: Vec<GuardedTransition<S, T>>,
}

impl<S: StateId, T: TriggerId> AnyStateBuilder<S, T> {
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    pub fn permit(mut self, trigger: T, target: S) -> Self {
        self.transitions.push(GuardedTransition::new(trigger, target));
        self
    }

    pub fn permit_if<F>(self, trigger: T, target: S, guard: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.permit_guarded(trigger, target, Guard::new(guard))
    }

    pub fn permit_guarded(mut self, trigger: T, target: S, guard: Guard) -> Self {
        self.transitions
            .push(GuardedTransition::guarded(trigger, target, guard));
        self
    }

    pub fn build(self) -> AnyState<S, T> {
        AnyState::new(self.transitions)
    }
}

impl<S: StateId, T: TriggerId> Default for AnyStateBuilder<S, T> {
    fn default() -> Self {
        Self::new()
    }
}
