//! Core statechart types.
//!
//! This module contains the data the engine operates on:
//! - Identifier traits for states and triggers
//! - Guard predicates and enter/exit callbacks
//! - The immutable `Configuration` describing the state forest
//!
//! Nothing here walks the hierarchy; that is the job of [`crate::index`].

mod config;
mod guard;
mod handler;
mod id;

pub use config::{AnyState, Configuration, GuardedTransition, StateNode};
pub use guard::Guard;
pub(crate) use handler::{async_handler_callbacks, handler_callbacks};
pub use handler::{
    AsyncStateHandler, Callback, HandlerFuture, Phase, StateHandler, Subscribers,
    TransitionObserver,
};
pub use id::{StateId, TriggerId};
