//! Immutable description of a statechart.
//!
//! A [`Configuration`] lists states in declaration order, each with an
//! optional parent, its guarded transitions and its enter/exit chains, plus an
//! optional any-state pseudostate and a machine-wide transition observer.
//! It is usually produced by [`crate::builder::ConfigurationBuilder`] and is
//! shared read-only (behind an `Arc`) by every machine built from it.

use super::guard::Guard;
use super::handler::{Callback, Phase, Subscribers, TransitionObserver};
use super::id::{StateId, TriggerId};
use std::fmt;

/// A declared `(trigger, guard, target)` triple.
#[derive(Clone, Debug)]
pub struct GuardedTransition<S, T> {
    pub trigger: T,
    pub guard: Guard,
    pub target: S,
}

impl<S, T> GuardedTransition<S, T> {
    /// Transition guarded by [`Guard::always`].
    pub fn new(trigger: T, target: S) -> Self {
        Self {
            trigger,
            guard: Guard::always(),
            target,
        }
    }

    /// Transition taken only while `guard` passes.
    pub fn guarded(trigger: T, target: S, guard: Guard) -> Self {
        Self {
            trigger,
            guard,
            target,
        }
    }
}

/// One node of the state forest.
#[derive(Clone, Debug)]
pub struct StateNode<S, T> {
    state: S,
    parent: Option<S>,
    transitions: Vec<GuardedTransition<S, T>>,
    on_enter: Subscribers,
    on_exit: Subscribers,
}

impl<S: StateId, T: TriggerId> StateNode<S, T> {
    /// Parentless node with no transitions or callbacks.
    pub fn new(state: S) -> Self {
        Self {
            state,
            parent: None,
            transitions: Vec::new(),
            on_enter: Subscribers::new(),
            on_exit: Subscribers::new(),
        }
    }

    /// Nest this state under `parent`.
    pub fn with_parent(mut self, parent: S) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Append a transition after those already declared.
    pub fn with_transition(mut self, transition: GuardedTransition<S, T>) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Append `callback` to the enter or exit chain.
    pub fn with_callback(mut self, phase: Phase, callback: Callback) -> Self {
        match phase {
            Phase::Enter => self.on_enter.push(callback),
            Phase::Exit => self.on_exit.push(callback),
        }
        self
    }

    /// Identifier of this state.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Declared parent, if any.
    pub fn parent(&self) -> Option<&S> {
        self.parent.as_ref()
    }

    /// Declared transitions, in declaration order.
    pub fn transitions(&self) -> &[GuardedTransition<S, T>] {
        &self.transitions
    }

    /// Callbacks run when this state is entered or exited.
    pub fn subscribers(&self, phase: Phase) -> &Subscribers {
        match phase {
            Phase::Enter => &self.on_enter,
            Phase::Exit => &self.on_exit,
        }
    }
}

/// Transitions with no fixed source, tried only after the whole hierarchy of
/// the current state failed to match.
#[derive(Clone, Debug, Default)]
pub struct AnyState<S, T> {
    transitions: Vec<GuardedTransition<S, T>>,
}

impl<S, T> AnyState<S, T> {
    /// Any-state holding `transitions` in priority order.
    pub fn new(transitions: Vec<GuardedTransition<S, T>>) -> Self {
        Self { transitions }
    }

    /// Transitions in priority order.
    pub fn transitions(&self) -> &[GuardedTransition<S, T>] {
        &self.transitions
    }
}

/// The full, immutable statechart description.
#[derive(Clone)]
pub struct Configuration<S, T> {
    states: Vec<StateNode<S, T>>,
    any_state: Option<AnyState<S, T>>,
    on_transition: Option<TransitionObserver<S>>,
}

impl<S: StateId, T: TriggerId> Configuration<S, T> {
    /// Assemble a configuration from already built parts.
    pub fn new(
        states: Vec<StateNode<S, T>>,
        any_state: Option<AnyState<S, T>>,
        on_transition: Option<TransitionObserver<S>>,
    ) -> Self {
        Self {
            states,
            any_state,
            on_transition,
        }
    }

    /// Start a fluent builder.
    pub fn builder() -> crate::builder::ConfigurationBuilder<S, T> {
        crate::builder::ConfigurationBuilder::new()
    }

    /// States in declaration order.
    pub fn states(&self) -> &[StateNode<S, T>] {
        &self.states
    }

    /// The any-state pseudostate, when one is declared.
    pub fn any_state(&self) -> Option<&AnyState<S, T>> {
        self.any_state.as_ref()
    }

    /// Observer called between the exit and enter chains.
    pub fn on_transition(&self) -> Option<&TransitionObserver<S>> {
        self.on_transition.as_ref()
    }
}

impl<S: fmt::Debug, T: fmt::Debug> fmt::Debug for Configuration<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("states", &self.states)
            .field("any_state", &self.any_state)
            .field("on_transition", &self.on_transition.is_some())
            .finish()
    }
}
