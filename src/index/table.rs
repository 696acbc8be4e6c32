//! Per-(state, trigger) transition lists extracted from a configuration.

use super::hierarchy::{HierarchyIndex, Slot};
use crate::core::{Configuration, Guard, GuardedTransition, StateId, TriggerId};
use crate::error::{render, HfsmError, Result};
use std::collections::HashMap;

/// A guarded target resolved to its slot.
#[derive(Clone, Debug)]
pub struct Candidate {
    pub guard: Guard,
    pub target: Slot,
}

/// Any-state candidate, which also carries its trigger.
#[derive(Clone, Debug)]
pub struct AnyCandidate<T> {
    pub trigger: T,
    pub guard: Guard,
    pub target: Slot,
}

/// Transition lists keyed by slot, then trigger.
///
/// Candidates keep declaration order; the outer `Vec` is indexed by slot so the
/// first-level lookup is a plain array access.
#[derive(Clone, Debug)]
pub struct TransitionTable<T> {
    by_slot: Vec<HashMap<T, Vec<Candidate>>>,
    any_state: Option<Vec<AnyCandidate<T>>>,
}

impl<T: TriggerId> TransitionTable<T> {
    /// Extract the table from `config`, resolving every target through `index`.
    ///
    /// # Errors
    ///
    /// [`HfsmError::UnknownTarget`] when a transition names a state missing
    /// from the configuration.
    pub fn build<S: StateId>(config: &Configuration<S, T>, index: &HierarchyIndex<S>) -> Result<Self> {
        let mut by_slot = Vec::with_capacity(config.states().len());
        for node in config.states() {
            let mut triggers: HashMap<T, Vec<Candidate>> = HashMap::new();
            for transition in node.transitions() {
                let target = resolve_target(index, node.state(), transition)?;
                triggers
                    .entry(transition.trigger.clone())
                    .or_default()
                    .push(Candidate {
                        guard: transition.guard.clone(),
                        target,
                    });
            }
            by_slot.push(triggers);
        }

        let any_state = match config.any_state() {
            Some(any) => {
                let mut candidates = Vec::with_capacity(any.transitions().len());
                for transition in any.transitions() {
                    candidates.push(AnyCandidate {
                        trigger: transition.trigger.clone(),
                        guard: transition.guard.clone(),
                        target: resolve_any_target(index, transition)?,
                    });
                }
                Some(candidates)
            }
            None => None,
        };

        Ok(Self { by_slot, any_state })
    }

    /// Candidates declared on `slot` for `trigger`, in declaration order.
    pub fn candidates(&self, slot: Slot, trigger: &T) -> Option<&[Candidate]> {
        self.by_slot
            .get(slot.index())
            .and_then(|triggers| triggers.get(trigger))
            .map(Vec::as_slice)
    }

    /// Every `(trigger, candidates)` pair declared on `slot`.
    pub fn declared(&self, slot: Slot) -> impl Iterator<Item = (&T, &[Candidate])> {
        self.by_slot
            .get(slot.index())
            .into_iter()
            .flat_map(|triggers| triggers.iter().map(|(t, c)| (t, c.as_slice())))
    }

    pub fn has_any_state(&self) -> bool {
        self.any_state.is_some()
    }

    /// Any-state candidates in declaration order (empty without an any-state).
    pub fn any_state(&self) -> &[AnyCandidate<T>] {
        self.any_state.as_deref().unwrap_or(&[])
    }
}

fn resolve_target<S: StateId, T: TriggerId>(
    index: &HierarchyIndex<S>,
    from: &S,
    transition: &GuardedTransition<S, T>,
) -> Result<Slot> {
    index
        .slot_of(&transition.target)
        .ok_or_else(|| HfsmError::UnknownTarget {
            from: render(from),
            trigger: render(&transition.trigger),
            target: render(&transition.target),
        })
}

fn resolve_any_target<S: StateId, T: TriggerId>(
    index: &HierarchyIndex<S>,
    transition: &GuardedTransition<S, T>,
) -> Result<Slot> {
    index
        .slot_of(&transition.target)
        .ok_or_else(|| HfsmError::UnknownTarget {
            from: "<any state>".to_string(),
            trigger: render(&transition.trigger),
            target: render(&transition.target),
        })
}
