//! Runtime machines over a shared resolver.

mod options;
mod state_machine;

pub use options::MachineOptions;
pub use state_machine::StateMachine;
