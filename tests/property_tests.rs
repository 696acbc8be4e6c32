//! Property-based tests for resolution and handler chains.
//!
//! These tests use proptest to generate random state forests, transitions
//! and trigger sequences, and check that the engine behaves the same way
//! regardless of resolution mode or repetition.

use hfsm::builder::{AnyStateBuilder, ConfigurationBuilder, StateBuilder};
use hfsm::index::{ChainPlan, HierarchyIndex};
use hfsm::{Configuration, MachineOptions, StateMachine};
use proptest::prelude::*;
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug, PartialEq)]
enum Event {
    Exit(u32),
    Enter(u32),
    Moved(u32, u32),
}

type Log = Arc<Mutex<Vec<Event>>>;

/// A random forest with fixed-outcome guards.
#[derive(Clone, Debug)]
struct Chart {
    parents: Vec<Option<u32>>,
    transitions: Vec<(u32, u8, u32, bool)>,
    any_state: Vec<(u8, u32, bool)>,
}

impl Chart {
    fn len(&self) -> u32 {
        self.parents.len() as u32
    }
}

prop_compose! {
    fn arbitrary_chart()(n in 2usize..12)(
        parents in (0..n)
            .map(|i| {
                if i == 0 {
                    Just(None).boxed()
                } else {
                    proptest::option::of(0..i as u32).boxed()
                }
            })
            .collect::<Vec<_>>(),
        transitions in proptest::collection::vec(
            (0..n as u32, 0..4u8, 0..n as u32, proptest::bool::weighted(0.7)),
            0..30,
        ),
        any_state in proptest::collection::vec(
            (0..4u8, 0..n as u32, proptest::bool::weighted(0.7)),
            0..3,
        ),
    ) -> Chart {
        Chart { parents, transitions, any_state }
    }
}

fn configuration(chart: &Chart, log: &Log) -> Arc<Configuration<u32, u8>> {
    let mut builder = ConfigurationBuilder::new();
    for (id, parent) in chart.parents.iter().enumerate() {
        let id = id as u32;
        let enter = Arc::clone(log);
        let exit = Arc::clone(log);
        let mut state = StateBuilder::new(id)
            .on_enter(move || enter.lock().unwrap().push(Event::Enter(id)))
            .on_exit(move || exit.lock().unwrap().push(Event::Exit(id)));
        if let Some(parent) = parent {
            state = state.substate_of(*parent);
        }
        for &(_, trigger, target, open) in chart.transitions.iter().filter(|t| t.0 == id) {
            state = state.permit_if(trigger, target, move || open);
        }
        builder = builder.state(state).unwrap();
    }

    let mut any = AnyStateBuilder::new();
    for &(trigger, target, open) in &chart.any_state {
        any = any.permit_if(trigger, target, move || open);
    }

    let observed = Arc::clone(log);
    Arc::new(
        builder
            .any_state(any)
            .on_transition(move |from: &u32, to: &u32| {
                observed.lock().unwrap().push(Event::Moved(*from, *to))
            })
            .build(),
    )
}

/// Per-trigger outcomes, final state and full callback log of one run.
fn run(chart: &Chart, initial: u32, triggers: &[u8], precompute: bool) -> (Vec<bool>, u32, Vec<Event>) {
    let log = Log::default();
    let options = MachineOptions::new().with_precompute(precompute);
    let mut machine = StateMachine::with_options(initial, configuration(chart, &log), options).unwrap();

    let fired = triggers
        .iter()
        .map(|trigger| machine.try_fire(trigger).unwrap())
        .collect();
    let events = std::mem::take(&mut *log.lock().unwrap());
    (fired, *machine.current_state(), events)
}

fn index(chart: &Chart) -> HierarchyIndex<u32> {
    let ids: Vec<u32> = (0..chart.len()).collect();
    HierarchyIndex::build(ids.iter().zip(chart.parents.iter().map(Option::as_ref))).unwrap()
}

proptest! {
    #[test]
    fn precomputed_matches_runtime(
        chart in arbitrary_chart(),
        seed in any::<u32>(),
        triggers in proptest::collection::vec(0..4u8, 0..40),
    ) {
        let initial = seed % chart.len();
        let runtime = run(&chart, initial, &triggers, false);
        let precomputed = run(&chart, initial, &triggers, true);
        prop_assert_eq!(runtime, precomputed);
    }

    #[test]
    fn runs_are_deterministic(
        chart in arbitrary_chart(),
        seed in any::<u32>(),
        triggers in proptest::collection::vec(0..4u8, 0..40),
    ) {
        let initial = seed % chart.len();
        prop_assert_eq!(
            run(&chart, initial, &triggers, false),
            run(&chart, initial, &triggers, false)
        );
    }

    #[test]
    fn can_fire_agrees_with_try_fire(
        chart in arbitrary_chart(),
        seed in any::<u32>(),
        triggers in proptest::collection::vec(0..4u8, 0..20),
    ) {
        let log = Log::default();
        let mut machine = StateMachine::new(seed % chart.len(), configuration(&chart, &log)).unwrap();

        for trigger in &triggers {
            let before = log.lock().unwrap().len();
            let predicted = machine.can_fire(trigger).unwrap();
            prop_assert_eq!(log.lock().unwrap().len(), before);
            prop_assert_eq!(machine.try_fire(trigger).unwrap(), predicted);
        }
    }

    #[test]
    fn observer_fires_once_per_transition(
        chart in arbitrary_chart(),
        seed in any::<u32>(),
        triggers in proptest::collection::vec(0..4u8, 0..40),
    ) {
        let (fired, _, events) = run(&chart, seed % chart.len(), &triggers, false);
        let moves = events.iter().filter(|e| matches!(e, Event::Moved(..))).count();
        prop_assert_eq!(moves, fired.iter().filter(|f| **f).count());
    }

    #[test]
    fn plans_skip_the_shared_ancestors(
        chart in arbitrary_chart(),
        a in any::<u32>(),
        b in any::<u32>(),
    ) {
        let index = index(&chart);
        let from = index.slot_of(&(a % chart.len())).unwrap();
        let to = index.slot_of(&(b % chart.len())).unwrap();
        prop_assume!(from != to);

        let plan = ChainPlan::between(&index, from, to);
        let from_branch = index.branch(from);
        let to_branch = index.branch(to);

        // Exits are the leaf end of the source branch.
        prop_assert_eq!(plan.exits(), &from_branch.as_slice()[..plan.exits().len()]);

        // Enters are the leaf end of the target branch.
        prop_assert_eq!(plan.enters(), &to_branch.as_slice()[..plan.enters().len()]);

        // What remains on both sides is the same shared tail.
        let kept_from = &from_branch.as_slice()[plan.exits().len()..];
        let kept_to = &to_branch.as_slice()[plan.enters().len()..];
        prop_assert_eq!(kept_from, kept_to);
        for slot in plan.exits() {
            prop_assert!(!to_branch.as_slice().contains(slot));
        }
    }

    #[test]
    fn branch_length_is_depth(chart in arbitrary_chart()) {
        let index = index(&chart);
        for slot in index.slots() {
            let branch = index.branch(slot);
            prop_assert_eq!(branch.len(), index.depth(slot));
            let root = *branch.as_slice().last().unwrap();
            prop_assert!(index.parent_of(root).is_none());
        }
    }
}
