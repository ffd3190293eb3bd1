//! Controller state machine
//!
//! Defines the lifecycle of one plan execution. The machine is explicit,
//! finite and deterministic; all guards that depend on the queue live in
//! the controller, which turns them into events.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::{ControllerState, FailureKind};
