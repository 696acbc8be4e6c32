//! Builder for a whole configuration.

use crate::builder::any_state::AnyStateBuilder;
use crate::builder::error::BuildError;
use crate::builder::state::StateBuilder;
use crate::core::{AnyState, Configuration, StateId, StateNode, TransitionObserver, TriggerId};
use crate::error::render;
use std::collections::HashSet;
use std::sync::Arc;

/// Builder for constructing a [`Configuration`] with a fluent API.
///
/// States keep the order in which they are added. Parents may be added
/// after their children.
pub struct ConfigurationBuilder<S, T> {
    states: Vec<StateNode<S, T>>,
    seen: HashSet<S>,
    any_state: Option<AnyState<S, T>>,
    on_transition: Option<TransitionObserver<S>>,
}

impl<S: StateId, T: TriggerId> ConfigurationBuilder<S, T> {
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            seen: HashSet::new(),
            any_state: None,
            on_transition: None,
        }
    }

    /// Add a state using a builder.
    /// Returns an error if the builder fails validation or the state was
    /// already added.
    pub fn state(self, builder: StateBuilder<S, T>) -> Result<Self, BuildError> {
        let node = builder.build()?;
        self.add_state(node)
    }

    /// Add a pre-built state node.
    pub fn add_state(mut self, node: StateNode<S, T>) -> Result<Self, BuildError> {
        if !self.seen.insert(node.state().clone()) {
            return Err(BuildError::DuplicateState {
                state: render(node.state()),
            });
        }
        self.states.push(node);
        Ok(self)
    }

    /// Add any-state transitions. Repeated calls append in call order.
    pub fn any_state(mut self, builder: AnyStateBuilder<S, T>) -> Self {
        let added = builder.build();
        self.any_state = Some(match self.any_state.take() {
            Some(existing) => {
                let mut transitions = existing.transitions().to_vec();
                transitions.extend_from_slice(added.transitions());
                AnyState::new(transitions)
            }
            None => added,
        });
        self
    }

    /// Set the machine-wide observer, called with (state left, state entered)
    /// between the exit and enter chains. Replaces any previous observer.
    pub fn on_transition<F>(mut self, observer: F) -> Self
    where
        F: Fn(&S, &S) + Send + Sync + 'static,
    {
        self.on_transition = Some(Arc::new(observer));
        self
    }

    pub fn build(self) -> Configuration<S, T> {
        Configuration::new(self.states, self.any_state, self.on_transition)
    }
}

impl<S: StateId, T: TriggerId> Default for ConfigurationBuilder<S, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn states_keep_insertion_order() {
        let config = ConfigurationBuilder::<&str, &str>::new()
            .state(StateBuilder::new("Idle").substate_of("Root"))
            .unwrap()
            .state(StateBuilder::new("Root"))
            .unwrap()
            .build();

        let names: Vec<_> = config.states().iter().map(|n| *n.state()).collect();
        assert_eq!(names, vec!["Idle", "Root"]);
        assert!(config.any_state().is_none());
    }

    #[test]
    fn duplicate_state_is_rejected() {
        let result = ConfigurationBuilder::<&str, &str>::new()
            .state(StateBuilder::new("Idle"))
            .unwrap()
            .state(StateBuilder::new("Idle").permit("Go", "Idle"));

        assert!(matches!(result, Err(BuildError::DuplicateState { .. })));
    }

    #[test]
    fn invalid_state_builder_propagates() {
        let result = ConfigurationBuilder::<&str, &str>::new()
            .state(StateBuilder::new("Idle").substate_of("A").substate_of("B"));

        assert!(matches!(result, Err(BuildError::ParentAlreadyDeclared { .. })));
    }

    #[test]
    fn any_state_calls_accumulate() {
        let config = ConfigurationBuilder::<&str, &str>::new()
            .any_state(AnyStateBuilder::new().permit("Die", "Dead"))
            .any_state(AnyStateBuilder::new().permit_if("Reset", "Idle", || true))
            .build();

        let triggers: Vec<_> = config
            .any_state()
            .map(|any| any.transitions().iter().map(|t| t.trigger).collect())
            .unwrap_or_default();
        assert_eq!(triggers, vec!["Die", "Reset"]);
    }

    #[test]
    fn observer_is_stored() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let config = ConfigurationBuilder::<&str, &str>::new()
            .on_transition(move |from, to| sink.lock().unwrap().push((*from, *to)))
            .build();

        let observer = config.on_transition().unwrap();
        observer(&"A", &"B");
        assert_eq!(*seen.lock().unwrap(), vec![("A", "B")]);
    }
}
