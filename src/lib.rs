//! hfsm: a hierarchical finite-state-machine engine
//!
//! States form a forest: each state may name one parent. Triggers are
//! resolved against the current state first, then its ancestors, then an
//! optional any-state pseudostate. Every executed transition exits and enters
//! only the states below the least common ancestor of its endpoints.
//!
//! # Core Concepts
//!
//! - **Configuration**: immutable statechart description, shareable via `Arc`
//! - **Resolver**: index and transition table derived from a configuration,
//!   optionally precomputed per state
//! - **StateMachine**: one current-state cursor over a resolver
//!
//! # Example
//!
//! ```rust
//! use hfsm::builder::StateBuilder;
//! use hfsm::{Configuration, StateMachine};
//! use std::sync::{Arc, Mutex};
//!
//! let log = Arc::new(Mutex::new(Vec::new()));
//! let on_exit = Arc::clone(&log);
//! let on_enter = Arc::clone(&log);
//!
//! let config = Configuration::builder()
//!     .state(StateBuilder::new("Root"))?
//!     .state(StateBuilder::new("Patrol").substate_of("Root"))?
//!     .state(
//!         StateBuilder::new("Idle")
//!             .substate_of("Patrol")
//!             .permit("Spot", "Chase")
//!             .on_exit(move || on_exit.lock().unwrap().push("exit Idle")),
//!     )?
//!     .state(
//!         StateBuilder::new("Chase")
//!             .substate_of("Root")
//!             .on_enter(move || on_enter.lock().unwrap().push("enter Chase")),
//!     )?
//!     .build();
//!
//! let mut machine = StateMachine::new("Idle", Arc::new(config))?;
//! machine.fire(&"Spot")?;
//!
//! assert_eq!(machine.current_state(), &"Chase");
//! assert_eq!(*log.lock().unwrap(), vec!["exit Idle", "enter Chase"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod core;
pub mod error;
pub mod index;
pub mod machine;

// Re-export commonly used types
pub use crate::core::{
    AsyncStateHandler, Configuration, Guard, Phase, StateHandler, StateId, TriggerId,
};
pub use error::{BoxError, HfsmError, Result};
pub use index::Resolver;
pub use machine::{MachineOptions, StateMachine};
