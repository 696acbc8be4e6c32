//! Derived lookup structures over a [`crate::core::Configuration`].
//!
//! - [`HierarchyIndex`]: compact slots, parent links and branch enumeration
//! - [`ChainPlan`]: least-common-ancestor exit/enter sequences
//! - [`TransitionTable`]: per-slot candidate lists
//! - [`Resolver`]: picks the transition to run, lazily or from a
//!   precomputed table

mod hierarchy;
mod plan;
mod precompute;
mod resolver;
mod table;

pub use hierarchy::{Branch, HierarchyIndex, Slot, BRANCH_CAPACITY, MAX_STATES};
pub use plan::ChainPlan;
pub use precompute::{FlatEntry, PrecomputedTable};
pub use resolver::{Origin, ResolvedTransition, Resolver};
pub use table::{AnyCandidate, Candidate, TransitionTable};
