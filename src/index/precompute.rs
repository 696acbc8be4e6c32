//! Eager flattening of every reachable transition per state.
//!
//! For each state the table holds one list: transitions declared on the state
//! itself, then on its parent, and so on to the root, followed by the
//! any-state transitions. Within a level, candidates for the same trigger keep
//! declaration order. Every entry carries its [`ChainPlan`], so firing is a
//! linear scan with no hierarchy walk and no LCA computation.

use super::hierarchy::{HierarchyIndex, Slot};
use super::plan::ChainPlan;
use super::resolver::Origin;
use super::table::TransitionTable;
use crate::core::{Guard, StateId, TriggerId};

/// One flattened transition.
#[derive(Clone, Debug)]
pub struct FlatEntry<T> {
    pub trigger: T,
    pub guard: Guard,
    pub origin: Origin,
    pub target: Slot,
    pub plan: ChainPlan,
}

#[derive(Clone, Debug)]
pub struct PrecomputedTable<T> {
    by_slot: Vec<Vec<FlatEntry<T>>>,
}

impl<T: TriggerId> PrecomputedTable<T> {
    pub fn build<S: StateId>(index: &HierarchyIndex<S>, table: &TransitionTable<T>) -> Self {
        let by_slot = index
            .slots()
            .map(|slot| flatten(index, table, slot))
            .collect();
        Self { by_slot }
    }

    /// Flattened entries of `slot`, in resolution order.
    pub fn entries(&self, slot: Slot) -> &[FlatEntry<T>] {
        self.by_slot
            .get(slot.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total number of flattened entries across all states.
    pub fn len(&self) -> usize {
        self.by_slot.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn flatten<S: StateId, T: TriggerId>(
    index: &HierarchyIndex<S>,
    table: &TransitionTable<T>,
    slot: Slot,
) -> Vec<FlatEntry<T>> {
    let mut entries = Vec::new();

    for &level in &index.branch(slot) {
        for (trigger, candidates) in table.declared(level) {
            for candidate in candidates {
                entries.push(FlatEntry {
                    trigger: trigger.clone(),
                    guard: candidate.guard.clone(),
                    origin: Origin::State(level),
                    target: candidate.target,
                    plan: ChainPlan::between(index, level, candidate.target),
                });
            }
        }
    }

    for candidate in table.any_state() {
        entries.push(FlatEntry {
            trigger: candidate.trigger.clone(),
            guard: candidate.guard.clone(),
            origin: Origin::AnyState,
            target: candidate.target,
            plan: ChainPlan::between(index, slot, candidate.target),
        });
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AnyState, Configuration, GuardedTransition, StateNode};

    #[test]
    fn entries_run_leaf_to_root_then_any_state() {
        let config: Configuration<&str, &str> = Configuration::new(
            vec![
                StateNode::new("Root").with_transition(GuardedTransition::new("Hit", "Root")),
                StateNode::new("Mid")
                    .with_parent("Root")
                    .with_transition(GuardedTransition::new("Hit", "Leaf")),
                StateNode::new("Leaf")
                    .with_parent("Mid")
                    .with_transition(GuardedTransition::new("Hit", "Mid")),
            ],
            Some(AnyState::new(vec![GuardedTransition::new("Hit", "Leaf")])),
            None,
        );
        let index =
            HierarchyIndex::build(config.states().iter().map(|n| (n.state(), n.parent()))).unwrap();
        let table = TransitionTable::build(&config, &index).unwrap();
        let flat = PrecomputedTable::build(&index, &table);

        let leaf = index.slot_of(&"Leaf").unwrap();
        let origins: Vec<_> = flat.entries(leaf).iter().map(|e| e.origin).collect();
        assert_eq!(
            origins,
            vec![
                Origin::State(leaf),
                Origin::State(index.slot_of(&"Mid").unwrap()),
                Origin::State(index.slot_of(&"Root").unwrap()),
                Origin::AnyState,
            ]
        );

        let root_entry = &flat.entries(leaf)[2];
        assert_eq!(root_entry.plan, ChainPlan::self_transition(root_entry.target));

        // Root sees its own transition plus the any-state one.
        assert_eq!(flat.entries(index.slot_of(&"Root").unwrap()).len(), 2);
        assert_eq!(flat.len(), 4 + 3 + 2);
    }
}
