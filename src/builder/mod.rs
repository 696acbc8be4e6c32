//! Builder API for ergonomic configuration construction.
//!
//! This module provides fluent builders and macros for assembling a
//! [`crate::Configuration`]: one [`StateBuilder`] per state, an optional
//! [`AnyStateBuilder`], and a global observer, all collected by
//! [`ConfigurationBuilder`].

pub mod any_state;
pub mod configuration;
pub mod error;
pub mod macros;
pub mod state;

pub use any_state::AnyStateBuilder;
pub use configuration::ConfigurationBuilder;
pub use error::BuildError;
pub use state::StateBuilder;

use crate::core::{StateId, TriggerId};

/// Shorthand for `StateBuilder::new(state)`.
///
/// # Example
///
/// ```
/// use hfsm::builder::{state, ConfigurationBuilder};
///
/// let config = ConfigurationBuilder::<&str, &str>::new()
///     .state(state("Idle").permit("Go", "Busy"))?
///     .state(state("Busy"))?
///     .build();
/// assert_eq!(config.states().len(), 2);
/// # Ok::<(), hfsm::builder::BuildError>(())
/// ```
pub fn state<S: StateId, T: TriggerId>(state: S) -> StateBuilder<S, T> {
    StateBuilder::new(state)
}

/// Shorthand for `AnyStateBuilder::new()`.
pub fn any_state<S: StateId, T: TriggerId>() -> AnyStateBuilder<S, T> {
    AnyStateBuilder::new()
}
