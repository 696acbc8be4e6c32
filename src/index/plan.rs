//! Least-common-ancestor handler chains.
//!
//! A [`ChainPlan`] lists which states to exit and which to enter for one
//! transition, as slots in invocation order. States shared by both branches
//! stay active and appear in neither list.

use super::hierarchy::{Branch, HierarchyIndex, Slot};
use crate::core::StateId;

/// Exit and enter sequences for one transition.
///
/// Both sequences run leaf to ancestor: exits from the source upward, enters
/// from the target upward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ChainPlan {
    exits: Branch,
    enters: Branch,
}

impl ChainPlan {
    /// Plan for a transition whose target is its own source: exactly that
    /// state's exit then enter.
    pub fn self_transition(slot: Slot) -> Self {
        let mut plan = ChainPlan::default();
        plan.exits.push(slot);
        plan.enters.push(slot);
        plan
    }

    /// Plan between two states of `index`.
    ///
    /// Equal endpoints use [`ChainPlan::self_transition`]. Otherwise both
    /// branches are compared from the root end; every state strictly below
    /// the deepest shared ancestor takes part. Branches from disjoint trees
    /// share nothing, so all of both participate.
    pub fn between<S: StateId>(index: &HierarchyIndex<S>, from: Slot, to: Slot) -> Self {
        if from == to {
            return Self::self_transition(from);
        }

        let mut exits = Branch::new();
        let mut enters = Branch::new();
        index.branch_into(from, &mut exits);
        index.branch_into(to, &mut enters);

        let shared = common_suffix(&exits, &enters);
        exits.truncate(exits.len() - shared);
        enters.truncate(enters.len() - shared);

        ChainPlan { exits, enters }
    }

    /// Plan where either endpoint may be missing from the index.
    ///
    /// A missing source contributes no exits and a missing target no enters.
    pub fn between_optional<S: StateId>(
        index: &HierarchyIndex<S>,
        from: Option<Slot>,
        to: Option<Slot>,
    ) -> Self {
        match (from, to) {
            (Some(from), Some(to)) => Self::between(index, from, to),
            (Some(from), None) => ChainPlan {
                exits: index.branch(from),
                enters: Branch::new(),
            },
            (None, Some(to)) => ChainPlan {
                exits: Branch::new(),
                enters: index.branch(to),
            },
            (None, None) => ChainPlan::default(),
        }
    }

    /// Slots to exit, source first.
    pub fn exits(&self) -> &[Slot] {
        self.exits.as_slice()
    }

    /// Slots to enter, target first.
    pub fn enters(&self) -> &[Slot] {
        self.enters.as_slice()
    }
}

/// Number of trailing (root-side) slots the two branches share.
fn common_suffix(left: &Branch, right: &Branch) -> usize {
    left.as_slice()
        .iter()
        .rev()
        .zip(right.as_slice().iter().rev())
        .take_while(|(l, r)| l == r)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOREST: &[(&str, Option<&str>)] = &[
        ("Root", None),
        ("A1", Some("Root")),
        ("A2", Some("A1")),
        ("A3", Some("A2")),
        ("B1", Some("Root")),
        ("B2", Some("B1")),
        ("Idle", Some("A3")),
        ("MoveToA3", Some("A3")),
        ("MoveToA2", Some("A2")),
        ("Attack", Some("B2")),
        ("Island", None),
    ];

    fn index() -> HierarchyIndex<&'static str> {
        HierarchyIndex::build(FOREST.iter().map(|(s, p)| (s, p.as_ref()))).unwrap()
    }

    fn plan(
        index: &HierarchyIndex<&'static str>,
        from: &'static str,
        to: &'static str,
    ) -> (Vec<&'static str>, Vec<&'static str>) {
        let plan = ChainPlan::between(
            index,
            index.slot_of(&from).unwrap(),
            index.slot_of(&to).unwrap(),
        );
        let names = |slots: &[Slot]| -> Vec<&'static str> {
            slots.iter().map(|s| *index.state_at(*s)).collect()
        };
        (names(plan.exits()), names(plan.enters()))
    }

    #[test]
    fn siblings_leave_parent_untouched() {
        let index = index();
        let (exits, enters) = plan(&index, "Idle", "MoveToA3");
        assert_eq!(exits, vec!["Idle"]);
        assert_eq!(enters, vec!["MoveToA3"]);
    }

    #[test]
    fn cousins_cross_up_to_shared_ancestor() {
        let index = index();
        let (exits, enters) = plan(&index, "Attack", "Idle");
        assert_eq!(exits, vec!["Attack", "B2", "B1"]);
        assert_eq!(enters, vec!["Idle", "A3", "A2", "A1"]);
    }

    #[test]
    fn moving_to_ancestor_exits_only_below_it() {
        let index = index();
        let (exits, enters) = plan(&index, "Idle", "A2");
        assert_eq!(exits, vec!["Idle", "A3"]);
        assert!(enters.is_empty());
    }

    #[test]
    fn moving_to_descendant_enters_only_below_source() {
        let index = index();
        let (exits, enters) = plan(&index, "A2", "Idle");
        assert!(exits.is_empty());
        assert_eq!(enters, vec!["Idle", "A3"]);
    }

    #[test]
    fn enters_mirror_exits_from_the_target_upward() {
        let index = HierarchyIndex::build(
            [("Root", None), ("A", Some("Root")), ("Leaf", Some("A")), ("Other", None)]
                .iter()
                .map(|(s, p)| (s, p.as_ref())),
        )
        .unwrap();
        let (exits, enters) = plan(&index, "Other", "Leaf");
        assert_eq!(exits, vec!["Other"]);
        assert_eq!(enters, vec!["Leaf", "A", "Root"]);

        let (exits, enters) = plan(&index, "Leaf", "Other");
        assert_eq!(exits, vec!["Leaf", "A", "Root"]);
        assert_eq!(enters, vec!["Other"]);
    }

    #[test]
    fn disjoint_trees_use_whole_branches() {
        let index = index();
        let (exits, enters) = plan(&index, "MoveToA2", "Island");
        assert_eq!(exits, vec!["MoveToA2", "A2", "A1", "Root"]);
        assert_eq!(enters, vec!["Island"]);
    }

    #[test]
    fn self_transition_is_own_exit_then_enter() {
        let index = index();
        let (exits, enters) = plan(&index, "A3", "A3");
        assert_eq!(exits, vec!["A3"]);
        assert_eq!(enters, vec!["A3"]);
    }

    #[test]
    fn optional_endpoints() {
        let index = index();
        let idle = index.slot_of(&"Idle");

        let to_missing = ChainPlan::between_optional(&index, idle, None);
        assert_eq!(to_missing.exits().len(), 5);
        assert!(to_missing.enters().is_empty());

        let from_missing = ChainPlan::between_optional(&index, None, idle);
        assert!(from_missing.exits().is_empty());
        let first = from_missing.enters().first().map(|s| *index.state_at(*s));
        assert_eq!(first, Some("Idle"));
        let last = from_missing.enters().last().map(|s| *index.state_at(*s));
        assert_eq!(last, Some("Root"));

        assert_eq!(ChainPlan::between_optional(&index, None, None), ChainPlan::default());
    }
}
