//! Step plan execution controller
//!
//! - [`machine`]: the unlocked state machine owning queue, counters and
//!   feedback
//! - [`spool`]: the per-tick admission and dispatch protocol
//! - [`facade`]: the lock-guarded entry points used by transports and the
//!   periodic driver

pub mod facade;
pub mod machine;
pub mod spool;

pub use facade::{StepController, TickReport};
pub use machine::{ExecutionCounters, ExecutionStateMachine};

use crate::queue::QueueError;
use crate::state::ControllerState;
use crate::step::PlanError;

/// Identifier of a tracked plan request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RequestId(pub u32);

/// Errors returned to callers of the controller entry points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerError {
    /// Submission not accepted in this state
    Rejected(ControllerState),
    /// Back-end cannot be replaced during active execution
    BackendBusy,
    /// Tracked request carried no steps
    EmptyPlan,
    /// Step indices are not strictly increasing
    InvalidPlan(PlanError),
    /// Plan does not fit into the queue
    Queue(QueueError),
}

impl ControllerError {
    /// Check if the request was dropped without touching controller state
    pub fn is_rejected_request(&self) -> bool {
        matches!(self, ControllerError::Rejected(_) | ControllerError::BackendBusy)
    }
}

impl From<PlanError> for ControllerError {
    fn from(e: PlanError) -> Self {
        ControllerError::InvalidPlan(e)
    }
}

impl From<QueueError> for ControllerError {
    fn from(e: QueueError) -> Self {
        ControllerError::Queue(e)
    }
}
