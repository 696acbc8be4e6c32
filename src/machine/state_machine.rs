//! The state machine facade.
//!
//! A [`StateMachine`] owns one current-state cursor and shares an immutable
//! [`Resolver`] with any other machine built from the same configuration.
//! Every executed transition runs in the same order: exit chain, cursor
//! update, global observer, enter chain.

use super::options::MachineOptions;
use crate::core::{Configuration, Phase, StateId, TriggerId};
use crate::error::{render, HfsmError, Result};
use crate::index::{ChainPlan, Resolver, Slot};
use std::sync::Arc;
use tracing::{debug, trace};

/// A hierarchical state machine driven by triggers.
///
/// # Example
///
/// ```rust
/// use hfsm::builder::StateBuilder;
/// use hfsm::{Configuration, StateMachine};
/// use std::sync::Arc;
///
/// let config = Configuration::builder()
///     .state(StateBuilder::new("Grounded"))?
///     .state(
///         StateBuilder::new("Idle")
///             .substate_of("Grounded")
///             .permit("Walk", "Walking"),
///     )?
///     .state(
///         StateBuilder::new("Walking")
///             .substate_of("Grounded")
///             .permit("Stop", "Idle"),
///     )?
///     .build();
///
/// let mut machine = StateMachine::new("Idle", Arc::new(config))?;
/// assert!(machine.try_fire(&"Walk")?);
/// assert_eq!(machine.current_state(), &"Walking");
/// assert!(!machine.try_fire(&"Jump")?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct StateMachine<S, T> {
    resolver: Arc<Resolver<S, T>>,
    current: S,
    options: MachineOptions,
}

impl<S: StateId, T: TriggerId> StateMachine<S, T> {
    /// Create a machine in `initial` with default options.
    ///
    /// # Errors
    ///
    /// Any configuration error, or [`HfsmError::UnknownState`] when `initial`
    /// is not configured.
    pub fn new(initial: S, config: Arc<Configuration<S, T>>) -> Result<Self> {
        Self::with_options(initial, config, MachineOptions::default())
    }

    /// Create a machine in `initial`, building a resolver in the mode
    /// `options` asks for.
    ///
    /// # Errors
    ///
    /// - [`HfsmError::DuplicateState`], [`HfsmError::UnknownParent`],
    ///   [`HfsmError::UnknownTarget`], [`HfsmError::TooManyStates`] or
    ///   [`HfsmError::HierarchyTooDeep`] when `config` is malformed
    /// - [`HfsmError::UnknownState`] when `initial` is not configured; this is
    ///   the configuration error for a missing initial state
    /// - [`HfsmError::AsyncHandler`] when `options.enter_initial_state` is set
    ///   and the initial enter chain holds an async callback; use
    ///   [`StateMachine::with_options_async`] for those
    /// - [`HfsmError::Handler`] when an initial enter callback fails
    pub fn with_options(
        initial: S,
        config: Arc<Configuration<S, T>>,
        options: MachineOptions,
    ) -> Result<Self> {
        let resolver = Resolver::with_mode(config, options.precompute)?;
        Self::from_resolver(initial, Arc::new(resolver), options)
    }

    /// Create a machine over an existing, possibly shared, resolver.
    ///
    /// The resolver's own mode wins over `options.precompute`.
    ///
    /// # Errors
    ///
    /// - [`HfsmError::UnknownState`] when `initial` is not configured
    /// - [`HfsmError::AsyncHandler`] when the initial enter chain must be
    ///   awaited; nothing runs in that case
    /// - [`HfsmError::Handler`] when an initial enter callback fails
    pub fn from_resolver(
        initial: S,
        resolver: Arc<Resolver<S, T>>,
        options: MachineOptions,
    ) -> Result<Self> {
        let slot = initial_slot(&resolver, &initial)?;
        if options.enter_initial_state {
            let plan = resolver.plan_between(None, Some(slot));
            ensure_sync(&resolver, &plan)?;
            run_chain(&resolver, plan.enters(), Phase::Enter)?;
        }
        Ok(Self::assemble(initial, resolver, options))
    }

    /// Async counterpart of [`StateMachine::with_options`]; awaits the
    /// initial enter chain when `options.enter_initial_state` is set.
    pub async fn with_options_async(
        initial: S,
        config: Arc<Configuration<S, T>>,
        options: MachineOptions,
    ) -> Result<Self> {
        let resolver = Resolver::with_mode(config, options.precompute)?;
        Self::from_resolver_async(initial, Arc::new(resolver), options).await
    }

    /// Async counterpart of [`StateMachine::from_resolver`].
    ///
    /// # Errors
    ///
    /// [`HfsmError::UnknownState`] when `initial` is not configured, or
    /// [`HfsmError::Handler`] when an initial enter callback fails.
    pub async fn from_resolver_async(
        initial: S,
        resolver: Arc<Resolver<S, T>>,
        options: MachineOptions,
    ) -> Result<Self> {
        let slot = initial_slot(&resolver, &initial)?;
        if options.enter_initial_state {
            let plan = resolver.plan_between(None, Some(slot));
            run_chain_async(&resolver, plan.enters(), Phase::Enter).await?;
        }
        Ok(Self::assemble(initial, resolver, options))
    }

    fn assemble(initial: S, resolver: Arc<Resolver<S, T>>, options: MachineOptions) -> Self {
        debug!(initial = ?initial, precomputed = resolver.is_precomputed(), "state machine created");
        Self {
            resolver,
            current: initial,
            options,
        }
    }

    pub fn current_state(&self) -> &S {
        &self.current
    }

    pub fn resolver(&self) -> &Arc<Resolver<S, T>> {
        &self.resolver
    }

    pub fn options(&self) -> MachineOptions {
        self.options
    }

    /// Swap in a resolver built from `config`, keeping the current state.
    ///
    /// # Errors
    ///
    /// Configuration errors, or [`HfsmError::UnknownState`] when `config`
    /// does not declare the current state. On error the previous resolver
    /// stays in place.
    pub fn configure(&mut self, config: Arc<Configuration<S, T>>) -> Result<()> {
        let resolver = Resolver::with_mode(config, self.options.precompute)?;
        self.set_resolver(Arc::new(resolver))
    }

    /// Swap in an already built resolver, keeping the current state.
    pub fn set_resolver(&mut self, resolver: Arc<Resolver<S, T>>) -> Result<()> {
        if !resolver.index().contains(&self.current) {
            return Err(HfsmError::UnknownState {
                state: render(&self.current),
            });
        }
        debug!(state = ?self.current, "state machine reconfigured");
        self.resolver = resolver;
        Ok(())
    }

    /// Fire `trigger`, returning whether a transition ran.
    ///
    /// A missing transition is not an error.
    ///
    /// # Errors
    ///
    /// - [`HfsmError::UnknownState`] when the cursor sits on an unconfigured state
    /// - [`HfsmError::Guard`] when a guard fails; the state is unchanged
    /// - [`HfsmError::AsyncHandler`] when the chain needs awaiting; nothing runs
    /// - [`HfsmError::Handler`] when a callback fails, see
    ///   [`StateMachine::force_transition_with_handlers`] for where that leaves
    ///   the cursor
    pub fn try_fire(&mut self, trigger: &T) -> Result<bool> {
        let Some((plan, next)) = self.resolve_next(trigger)? else {
            return Ok(false);
        };
        ensure_sync(&self.resolver, &plan)?;
        transition(&self.resolver, &mut self.current, &plan, next)?;
        Ok(true)
    }

    /// Fire `trigger`, treating a missing transition as an error.
    pub fn fire(&mut self, trigger: &T) -> Result<()> {
        if self.try_fire(trigger)? {
            Ok(())
        } else {
            Err(self.no_transition(trigger))
        }
    }

    /// Whether `trigger` would fire right now.
    ///
    /// Guards are evaluated, so the answer matches [`StateMachine::try_fire`],
    /// but no enter, exit or observer callback runs and the state is never
    /// changed. Use [`StateMachine::has_transition_for`] for a guard-free check.
    pub fn can_fire(&self, trigger: &T) -> Result<bool> {
        let from = self.current_slot()?;
        Ok(self.resolver.resolve(from, trigger)?.is_some())
    }

    /// Whether a transition for `trigger` is declared anywhere on the current
    /// branch or on the any-state, ignoring guards.
    pub fn has_transition_for(&self, trigger: &T) -> bool {
        self.resolver.has_transition_for(&self.current, trigger)
    }

    /// Triggers declared on the current branch and the any-state.
    pub fn permitted_triggers(&self) -> Vec<&T> {
        match self.resolver.index().slot_of(&self.current) {
            Some(slot) => self.resolver.declared_triggers(slot),
            None => Vec::new(),
        }
    }

    /// Overwrite the current state. No callback runs and no transition is
    /// consulted; `target` need not be configured.
    pub fn force_transition(&mut self, target: S) {
        debug!(from = ?self.current, to = ?target, "forced transition");
        self.current = target;
    }

    /// [`StateMachine::force_transition`], rejecting unconfigured targets.
    pub fn force_transition_checked(&mut self, target: S) -> Result<()> {
        self.ensure_configured(&target)?;
        self.force_transition(target);
        Ok(())
    }

    /// Move to `target` running the full exit/enter chain, without consulting
    /// triggers or guards.
    ///
    /// An unconfigured current state contributes no exits and an unconfigured
    /// target no enters. Moving to the current state runs its own exit then
    /// enter.
    ///
    /// A failing exit callback aborts before the state changes. A failing
    /// enter callback aborts the remaining enters with the state already set
    /// to `target`. Nothing is rolled back.
    pub fn force_transition_with_handlers(&mut self, target: S) -> Result<()> {
        let plan = self.forced_plan(&target);
        ensure_sync(&self.resolver, &plan)?;
        debug!(from = ?self.current, to = ?target, "forced transition with handlers");
        transition(&self.resolver, &mut self.current, &plan, target)
    }

    /// [`StateMachine::force_transition_with_handlers`], rejecting
    /// unconfigured targets before anything runs.
    pub fn force_transition_with_handlers_checked(&mut self, target: S) -> Result<()> {
        self.ensure_configured(&target)?;
        self.force_transition_with_handlers(target)
    }

    /// Async counterpart of [`StateMachine::try_fire`]; awaits every callback
    /// in chain order.
    pub async fn try_fire_async(&mut self, trigger: &T) -> Result<bool> {
        let Some((plan, next)) = self.resolve_next(trigger)? else {
            return Ok(false);
        };
        transition_async(&self.resolver, &mut self.current, &plan, next).await?;
        Ok(true)
    }

    pub async fn fire_async(&mut self, trigger: &T) -> Result<()> {
        if self.try_fire_async(trigger).await? {
            Ok(())
        } else {
            Err(self.no_transition(trigger))
        }
    }

    pub async fn force_transition_with_handlers_async(&mut self, target: S) -> Result<()> {
        let plan = self.forced_plan(&target);
        debug!(from = ?self.current, to = ?target, "forced transition with handlers");
        transition_async(&self.resolver, &mut self.current, &plan, target).await
    }

    fn current_slot(&self) -> Result<Slot> {
        self.resolver
            .index()
            .slot_of(&self.current)
            .ok_or_else(|| HfsmError::UnknownState {
                state: render(&self.current),
            })
    }

    fn ensure_configured(&self, state: &S) -> Result<()> {
        if self.resolver.index().contains(state) {
            Ok(())
        } else {
            Err(HfsmError::UnknownState {
                state: render(state),
            })
        }
    }

    fn no_transition(&self, trigger: &T) -> HfsmError {
        HfsmError::NoTransition {
            trigger: render(trigger),
            state: render(&self.current),
        }
    }

    fn forced_plan(&self, target: &S) -> ChainPlan {
        let index = self.resolver.index();
        self.resolver
            .plan_between(index.slot_of(&self.current), index.slot_of(target))
    }

    /// Resolve `trigger` into the plan to run and the state to land in.
    fn resolve_next(&self, trigger: &T) -> Result<Option<(ChainPlan, S)>> {
        let from = self.current_slot()?;
        match self.resolver.resolve(from, trigger)? {
            Some(resolved) => {
                let next = self.resolver.index().state_at(resolved.target()).clone();
                debug!(
                    trigger = ?trigger,
                    from = ?self.current,
                    to = ?next,
                    origin = ?resolved.origin(),
                    "transition resolved"
                );
                Ok(Some((*resolved.plan(), next)))
            }
            None => {
                trace!(trigger = ?trigger, state = ?self.current, "no transition");
                Ok(None)
            }
        }
    }
}

fn initial_slot<S: StateId, T: TriggerId>(resolver: &Resolver<S, T>, initial: &S) -> Result<Slot> {
    resolver
        .index()
        .slot_of(initial)
        .ok_or_else(|| HfsmError::UnknownState {
            state: render(initial),
        })
}

fn ensure_sync<S: StateId, T: TriggerId>(resolver: &Resolver<S, T>, plan: &ChainPlan) -> Result<()> {
    match resolver.first_async(plan) {
        Some((slot, phase)) => Err(HfsmError::AsyncHandler {
            state: render(resolver.index().state_at(slot)),
            phase,
        }),
        None => Ok(()),
    }
}

fn run_chain<S: StateId, T: TriggerId>(
    resolver: &Resolver<S, T>,
    slots: &[Slot],
    phase: Phase,
) -> Result<()> {
    for &slot in slots {
        let node = resolver.node(slot);
        let ran = node
            .subscribers(phase)
            .invoke()
            .map_err(|source| HfsmError::Handler {
                state: render(node.state()),
                phase,
                source,
            })?;
        if !ran {
            return Err(HfsmError::AsyncHandler {
                state: render(node.state()),
                phase,
            });
        }
    }
    Ok(())
}

async fn run_chain_async<S: StateId, T: TriggerId>(
    resolver: &Resolver<S, T>,
    slots: &[Slot],
    phase: Phase,
) -> Result<()> {
    for &slot in slots {
        let node = resolver.node(slot);
        node.subscribers(phase)
            .invoke_async()
            .await
            .map_err(|source| HfsmError::Handler {
                state: render(node.state()),
                phase,
                source,
            })?;
    }
    Ok(())
}

fn transition<S: StateId, T: TriggerId>(
    resolver: &Resolver<S, T>,
    current: &mut S,
    plan: &ChainPlan,
    next: S,
) -> Result<()> {
    run_chain(resolver, plan.exits(), Phase::Exit)?;
    let previous = std::mem::replace(current, next);
    if let Some(observer) = resolver.configuration().on_transition() {
        observer(&previous, current);
    }
    run_chain(resolver, plan.enters(), Phase::Enter)
}

async fn transition_async<S: StateId, T: TriggerId>(
    resolver: &Resolver<S, T>,
    current: &mut S,
    plan: &ChainPlan,
    next: S,
) -> Result<()> {
    run_chain_async(resolver, plan.exits(), Phase::Exit).await?;
    let previous = std::mem::replace(current, next);
    if let Some(observer) = resolver.configuration().on_transition() {
        observer(&previous, current);
    }
    run_chain_async(resolver, plan.enters(), Phase::Enter).await
}
