//! Builder for a single state node.

use crate::builder::error::BuildError;
use crate::core::{
    async_handler_callbacks, handler_callbacks, AsyncStateHandler, Callback, Guard,
    GuardedTransition, Phase, StateHandler, StateId, StateNode, TriggerId,
};
use crate::error::{render, BoxError};
use std::future::Future;
use std::sync::Arc;

/// Builder for one state with a fluent API.
///
/// Transitions and callbacks keep the order in which they are added.
///
/// # Example
///
/// ```rust
/// use hfsm::builder::StateBuilder;
///
/// let node = StateBuilder::<&str, &str>::new("Walking")
///     .substate_of("Grounded")
///     .permit("Jump", "Airborne")
///     .permit_if("Run", "Running", || true)
///     .on_enter(|| println!("walking"))
///     .build()?;
///
/// assert_eq!(node.parent(), Some(&"Grounded"));
/// assert_eq!(node.transitions().len(), 2);
/// # Ok::<(), hfsm::builder::BuildError>(())
/// ```
pub struct StateBuilder<S, T> {
    state: S,
    parents: Vec<S>,
    transitions: Vec<GuardedTransition<S, T>>,
    callbacks: Vec<(Phase, Callback)>,
}

impl<S: StateId, T: TriggerId> StateBuilder<S, T> {
    pub fn new(state: S) -> Self {
        Self {
            state,
            parents: Vec::new(),
            transitions: Vec::new(),
            callbacks: Vec::new(),
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Declare the parent state. Declaring a second, different parent fails
    /// at [`StateBuilder::build`].
    pub fn substate_of(mut self, parent: S) -> Self {
        self.parents.push(parent);
        self
    }

    /// Unconditional transition.
    pub fn permit(mut self, trigger: T, target: S) -> Self {
        self.transitions.push(GuardedTransition::new(trigger, target));
        self
    }

    /// Transition taken only while `guard` returns `true`.
    pub fn permit_if<F>(self, trigger: T, target: S, guard: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.permit_guarded(trigger, target, Guard::new(guard))
    }

    /// Transition with a prepared (possibly fallible) guard.
    pub fn permit_guarded(mut self, trigger: T, target: S, guard: Guard) -> Self {
        self.transitions
            .push(GuardedTransition::guarded(trigger, target, guard));
        self
    }

    pub fn on_enter<F>(self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.callback(Phase::Enter, Callback::new(f))
    }

    pub fn on_exit<F>(self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.callback(Phase::Exit, Callback::new(f))
    }

    /// Fallible enter callback; an error aborts the transition.
    pub fn try_on_enter<F, E>(self, f: F) -> Self
    where
        F: Fn() -> Result<(), E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.callback(Phase::Enter, Callback::try_new(f))
    }

    pub fn try_on_exit<F, E>(self, f: F) -> Self
    where
        F: Fn() -> Result<(), E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.callback(Phase::Exit, Callback::try_new(f))
    }

    /// Async enter callback, awaited by the machine's `*_async` methods.
    pub fn on_enter_async<F, Fut, E>(self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<BoxError>,
    {
        self.callback(Phase::Enter, Callback::from_async(f))
    }

    pub fn on_exit_async<F, Fut, E>(self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<BoxError>,
    {
        self.callback(Phase::Exit, Callback::from_async(f))
    }

    /// Register an object reacting to both enter and exit.
    pub fn handler<H: StateHandler>(self, handler: Arc<H>) -> Self {
        let (enter, exit) = handler_callbacks(handler);
        self.callback(Phase::Enter, enter).callback(Phase::Exit, exit)
    }

    /// Register an async object reacting to both enter and exit.
    pub fn handler_async<H: AsyncStateHandler>(self, handler: Arc<H>) -> Self {
        let (enter, exit) = async_handler_callbacks(handler);
        self.callback(Phase::Enter, enter).callback(Phase::Exit, exit)
    }

    pub fn callback(mut self, phase: Phase, callback: Callback) -> Self {
        self.callbacks.push((phase, callback));
        self
    }

    /// Build the state node.
    pub fn build(self) -> Result<StateNode<S, T>, BuildError> {
        let parent = self.single_parent()?;

        let mut node = StateNode::new(self.state);
        if let Some(parent) = parent {
            node = node.with_parent(parent);
        }
        for transition in self.transitions {
            node = node.with_transition(transition);
        }
        for (phase, callback) in self.callbacks {
            node = node.with_callback(phase, callback);
        }
        Ok(node)
    }

    fn single_parent(&self) -> Result<Option<S>, BuildError> {
        let Some(first) = self.parents.first() else {
            return Ok(None);
        };
        if let Some(second) = self.parents.iter().find(|p| *p != first) {
            return Err(BuildError::ParentAlreadyDeclared {
                state: render(&self.state),
                first: render(first),
                second: render(second),
            });
        }
        if *first == self.state {
            return Err(BuildError::SelfParent {
                state: render(&self.state),
            });
        }
        Ok(Some(first.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_node_in_declaration_order() {
        let node = StateBuilder::<&str, &str>::new("Idle")
            .permit("Go", "Moving")
            .permit_if("Go", "Blocked", || false)
            .permit_guarded("Stop", "Idle", Guard::always())
            .build()
            .unwrap();

        let targets: Vec<_> = node.transitions().iter().map(|t| t.target).collect();
        assert_eq!(targets, vec!["Moving", "Blocked", "Idle"]);
        assert!(node.parent().is_none());
    }

    #[test]
    fn repeated_identical_parent_is_accepted() {
        let node = StateBuilder::<&str, &str>::new("Idle")
            .substate_of("Root")
            .substate_of("Root")
            .build()
            .unwrap();
        assert_eq!(node.parent(), Some(&"Root"));
    }

    #[test]
    fn conflicting_parents_are_rejected() {
        let result = StateBuilder::<&str, &str>::new("Idle")
            .substate_of("Root")
            .substate_of("Other")
            .build();

        assert!(matches!(result, Err(BuildError::ParentAlreadyDeclared { .. })));
    }

    #[test]
    fn own_parent_is_rejected() {
        let result = StateBuilder::<&str, &str>::new("Idle").substate_of("Idle").build();
        assert_eq!(
            result.unwrap_err(),
            BuildError::SelfParent {
                state: "\"Idle\"".to_string()
            }
        );
    }

    #[test]
    fn callbacks_land_in_their_chains() {
        struct Noop;
        impl StateHandler for Noop {}

        let node = StateBuilder::<&str, &str>::new("Idle")
            .on_enter(|| {})
            .on_exit(|| {})
            .try_on_exit(|| Ok::<(), BoxError>(()))
            .on_enter_async(|| async { Ok::<(), BoxError>(()) })
            .handler(Arc::new(Noop))
            .build()
            .unwrap();

        let enter = node.subscribers(Phase::Enter);
        let exit = node.subscribers(Phase::Exit);
        assert_eq!(enter.len(), 3);
        assert!(enter.has_async());
        assert_eq!(exit.len(), 3);
        assert!(!exit.has_async());
    }

    #[test]
    fn async_handler_lands_in_both_chains() {
        struct Quiet;
        impl AsyncStateHandler for Quiet {}

        let node = StateBuilder::<&str, &str>::new("Idle")
            .on_exit(|| {})
            .handler_async(Arc::new(Quiet))
            .build()
            .unwrap();

        assert_eq!(node.subscribers(Phase::Enter).len(), 1);
        assert!(node.subscribers(Phase::Enter).has_async());
        assert_eq!(node.subscribers(Phase::Exit).len(), 2);
        assert!(node.subscribers(Phase::Exit).has_async());
    }
}
