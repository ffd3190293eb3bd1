//! Platform-agnostic core logic for the step plan execution controller
//!
//! This crate contains everything that decides *which* step goes to the
//! walking engine and *when*, independent of the engine itself:
//!
//! - Step model and plan validation
//! - Step queue with in-place plan revision and garbage collection
//! - Controller state machine
//! - Per-tick spooling protocol and the thread-safe controller facade
//! - Capability traits for execution back-ends and feedback channels
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod controller;
pub mod feedback;
pub mod queue;
pub mod state;
pub mod step;
pub mod traits;

pub use controller::{ControllerError, RequestId, StepController};
pub use feedback::{FeedbackSnapshot, Progress};
pub use queue::{QueueError, StepQueue, MAX_QUEUED_STEPS};
pub use state::{ControllerState, Event, FailureKind};
pub use step::{Foot, PlanError, Pose, Step, StepIndex, StepPlan};
