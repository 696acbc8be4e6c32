//! Transition resolution.
//!
//! A [`Resolver`] answers "given this state and trigger, which transition
//! runs, and which callbacks does it invoke?". It owns the hierarchy index and
//! transition table derived from one [`Configuration`] and is immutable once
//! built, so it can be shared behind an `Arc` by any number of machines.
//!
//! # Resolution order
//!
//! 1. Walk the branch of the current state, leaf to root.
//! 2. At each level, try that level's candidates for the trigger in
//!    declaration order. The first passing guard wins and the walk stops.
//!    A level whose guards all fail does not block its ancestors.
//! 3. If no level matched, try the any-state candidates in declaration order.
//! 4. Otherwise there is no transition.
//!
//! In precomputed mode the same order is baked into one flat list per state.

use super::hierarchy::{Branch, HierarchyIndex, Slot};
use super::plan::ChainPlan;
use super::precompute::PrecomputedTable;
use super::table::TransitionTable;
use crate::core::{Configuration, Guard, Phase, StateId, StateNode, TriggerId};
use crate::error::{render, HfsmError, Result};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Where the winning transition was declared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Declared on this hierarchy level (the current state or an ancestor).
    State(Slot),
    /// Declared on the any-state pseudostate.
    AnyState,
}

/// A transition chosen for execution, with its handler plan.
#[derive(Clone, Debug)]
pub struct ResolvedTransition<'t, T> {
    source: Slot,
    origin: Origin,
    target: Slot,
    trigger: &'t T,
    plan: ChainPlan,
}

impl<'t, T> ResolvedTransition<'t, T> {
    /// The state the machine was in when the trigger fired.
    pub fn source(&self) -> Slot {
        self.source
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn target(&self) -> Slot {
        self.target
    }

    pub fn trigger(&self) -> &'t T {
        self.trigger
    }

    pub fn plan(&self) -> &ChainPlan {
        &self.plan
    }
}

/// Immutable index/table pair derived from one configuration.
#[derive(Debug)]
pub struct Resolver<S, T> {
    config: Arc<Configuration<S, T>>,
    index: HierarchyIndex<S>,
    table: TransitionTable<T>,
    precomputed: Option<PrecomputedTable<T>>,
}

impl<S: StateId, T: TriggerId> Resolver<S, T> {
    /// Build a resolver that walks the hierarchy on every fire.
    pub fn new(config: Arc<Configuration<S, T>>) -> Result<Self> {
        Self::with_mode(config, false)
    }

    /// Build a resolver with every state's transitions flattened up front.
    pub fn precomputed(config: Arc<Configuration<S, T>>) -> Result<Self> {
        Self::with_mode(config, true)
    }

    /// Build a resolver, choosing the resolution mode.
    ///
    /// # Errors
    ///
    /// Any configuration error from [`HierarchyIndex::build`] or
    /// [`TransitionTable::build`]. Nothing is built partially.
    pub fn with_mode(config: Arc<Configuration<S, T>>, precompute: bool) -> Result<Self> {
        let index = HierarchyIndex::build(
            config
                .states()
                .iter()
                .map(|node| (node.state(), node.parent())),
        )?;
        let table = TransitionTable::build(&config, &index)?;
        let precomputed = precompute.then(|| PrecomputedTable::build(&index, &table));

        debug!(
            states = index.len(),
            precomputed = precompute,
            flattened = precomputed.as_ref().map_or(0, PrecomputedTable::len),
            "built transition resolver"
        );

        Ok(Self {
            config,
            index,
            table,
            precomputed,
        })
    }

    pub fn configuration(&self) -> &Arc<Configuration<S, T>> {
        &self.config
    }

    pub fn index(&self) -> &HierarchyIndex<S> {
        &self.index
    }

    pub fn is_precomputed(&self) -> bool {
        self.precomputed.is_some()
    }

    /// The configured node stored at `slot`.
    ///
    /// Slots are assigned in declaration order, so this is a direct lookup.
    ///
    /// # Panics
    ///
    /// Panics if `slot` was not produced by this resolver's index.
    pub fn node(&self, slot: Slot) -> &StateNode<S, T> {
        &self.config.states()[slot.index()]
    }

    /// Pick the transition to run for `trigger` fired from `from`.
    ///
    /// Guards run in resolution order; candidates tried before the winner have
    /// had their guards evaluated too.
    ///
    /// # Errors
    ///
    /// [`HfsmError::Guard`] when a guard fails. Resolution stops there.
    pub fn resolve<'t>(
        &self,
        from: Slot,
        trigger: &'t T,
    ) -> Result<Option<ResolvedTransition<'t, T>>> {
        match &self.precomputed {
            Some(flat) => self.resolve_flat(flat, from, trigger),
            None => self.resolve_walk(from, trigger),
        }
    }

    fn resolve_walk<'t>(
        &self,
        from: Slot,
        trigger: &'t T,
    ) -> Result<Option<ResolvedTransition<'t, T>>> {
        let mut branch = Branch::new();
        self.index.branch_into(from, &mut branch);

        for &level in &branch {
            let Some(candidates) = self.table.candidates(level, trigger) else {
                continue;
            };
            for candidate in candidates {
                if passes(&candidate.guard, trigger)? {
                    return Ok(Some(ResolvedTransition {
                        source: from,
                        origin: Origin::State(level),
                        target: candidate.target,
                        trigger,
                        plan: ChainPlan::between(&self.index, level, candidate.target),
                    }));
                }
            }
        }

        for candidate in self.table.any_state() {
            if candidate.trigger == *trigger && passes(&candidate.guard, trigger)? {
                return Ok(Some(ResolvedTransition {
                    source: from,
                    origin: Origin::AnyState,
                    target: candidate.target,
                    trigger,
                    plan: ChainPlan::between(&self.index, from, candidate.target),
                }));
            }
        }

        Ok(None)
    }

    fn resolve_flat<'t>(
        &self,
        flat: &PrecomputedTable<T>,
        from: Slot,
        trigger: &'t T,
    ) -> Result<Option<ResolvedTransition<'t, T>>> {
        for entry in flat.entries(from) {
            if entry.trigger == *trigger && passes(&entry.guard, trigger)? {
                return Ok(Some(ResolvedTransition {
                    source: from,
                    origin: entry.origin,
                    target: entry.target,
                    trigger,
                    plan: entry.plan,
                }));
            }
        }
        Ok(None)
    }

    /// Whether any transition for `trigger` is declared on the branch of
    /// `state` or on the any-state. Guards are not evaluated.
    pub fn has_transition_for(&self, state: &S, trigger: &T) -> bool {
        let Some(slot) = self.index.slot_of(state) else {
            return false;
        };
        self.index
            .branch(slot)
            .iter()
            .any(|level| self.table.candidates(*level, trigger).is_some())
            || self.table.any_state().iter().any(|c| c.trigger == *trigger)
    }

    /// Every trigger declared on the branch of `slot` or on the any-state,
    /// without duplicates. Nearer levels come first; order within one level
    /// is unspecified.
    pub fn declared_triggers(&self, slot: Slot) -> Vec<&T> {
        let mut seen = HashSet::new();
        let mut triggers = Vec::new();
        for &level in &self.index.branch(slot) {
            for (trigger, _) in self.table.declared(level) {
                if seen.insert(trigger) {
                    triggers.push(trigger);
                }
            }
        }
        for candidate in self.table.any_state() {
            if seen.insert(&candidate.trigger) {
                triggers.push(&candidate.trigger);
            }
        }
        triggers
    }

    /// Plan between two optional endpoints, used for forced transitions and
    /// the initial enter chain.
    pub fn plan_between(&self, from: Option<Slot>, to: Option<Slot>) -> ChainPlan {
        ChainPlan::between_optional(&self.index, from, to)
    }

    /// First callback chain in `plan` that holds an async subscriber.
    pub(crate) fn first_async(&self, plan: &ChainPlan) -> Option<(Slot, Phase)> {
        let exits = plan.exits().iter().map(|slot| (*slot, Phase::Exit));
        let enters = plan.enters().iter().map(|slot| (*slot, Phase::Enter));
        exits
            .chain(enters)
            .find(|(slot, phase)| self.node(*slot).subscribers(*phase).has_async())
    }
}

fn passes<T: TriggerId>(guard: &Guard, trigger: &T) -> Result<bool> {
    guard.check().map_err(|source| HfsmError::Guard {
        trigger: render(trigger),
        source,
    })
}
