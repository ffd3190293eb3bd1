//! Execution feedback
//!
//! The snapshot is the single externally visible summary of progress. It is
//! `Copy`, so readers always receive a value taken under the controller lock.

use crate::queue::StepQueue;
use crate::state::ControllerState;
use crate::step::StepIndex;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Progress as reported by the walking engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Progress {
    /// Highest index the engine has completed
    pub last_performed: Option<StepIndex>,
    /// Index the engine is executing right now
    pub currently_executing: Option<StepIndex>,
    /// Lowest index the engine still allows to be revised
    pub first_changeable: Option<StepIndex>,
}

/// Snapshot of controller progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeedbackSnapshot {
    pub controller_state: ControllerState,
    pub last_performed: Option<StepIndex>,
    pub currently_executing: Option<StepIndex>,
    pub first_changeable: Option<StepIndex>,
    pub first_queued: Option<StepIndex>,
    pub last_queued: Option<StepIndex>,
    pub queue_size: usize,
}

impl FeedbackSnapshot {
    /// Snapshot of a freshly reset controller
    pub const fn new(controller_state: ControllerState) -> Self {
        Self {
            controller_state,
            last_performed: None,
            currently_executing: None,
            first_changeable: None,
            first_queued: None,
            last_queued: None,
            queue_size: 0,
        }
    }

    /// Copy the engine-originated fields from a progress report
    pub fn apply_progress(&mut self, progress: &Progress) {
        self.last_performed = progress.last_performed;
        self.currently_executing = progress.currently_executing;
        self.first_changeable = progress.first_changeable;
    }

    /// Refresh the queue-derived fields
    pub fn refresh_queue(&mut self, queue: &StepQueue) {
        self.first_queued = queue.first_index();
        self.last_queued = queue.last_index();
        self.queue_size = queue.len();
    }

    /// Engine-originated fields as a progress report
    pub fn progress(&self) -> Progress {
        Progress {
            last_performed: self.last_performed,
            currently_executing: self.currently_executing,
            first_changeable: self.first_changeable,
        }
    }
}

impl Default for FeedbackSnapshot {
    fn default() -> Self {
        Self::new(ControllerState::NotReady)
    }
}
