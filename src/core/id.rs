//! Identifier traits for states and triggers.
//!
//! The engine treats identifiers as opaque values: it only compares, hashes,
//! clones and (for diagnostics) debug-prints them.

use std::fmt::Debug;
use std::hash::Hash;

/// Identifier of a state in the hierarchy.
///
/// Blanket-implemented for every type meeting the bounds, so plain enums work
/// without any extra code.
///
/// # Example
///
/// ```rust
/// use hfsm::core::StateId;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum Door {
///     Open,
///     Closed,
/// }
///
/// fn assert_state_id<S: StateId>(_: &S) {}
/// assert_state_id(&Door::Open);
/// assert_state_id(&"closed");
/// ```
pub trait StateId: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> StateId for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

/// Identifier of a trigger (event) that may cause a transition.
pub trait TriggerId: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> TriggerId for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}
