//! Execution state machine
//!
//! Owns the controller state, the step queue, the index counters and the
//! feedback snapshot. Nothing here locks; the facade serializes access.

use super::ControllerError;
use crate::feedback::{FeedbackSnapshot, Progress};
use crate::queue::StepQueue;
use crate::state::{ControllerState, Event};
use crate::step::{StepIndex, StepPlan};
use crate::traits::BackendReport;

/// Index counters driving the spool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ExecutionCounters {
    /// Index the engine wants in flight (`None` when nothing is owed)
    pub next_index_needed: Option<StepIndex>,
    /// Highest index dispatched successfully
    pub last_index_sent: Option<StepIndex>,
}

/// Controller state machine
#[derive(Debug, Clone)]
pub struct ExecutionStateMachine {
    pub(super) state: ControllerState,
    pub(super) queue: StepQueue,
    pub(super) counters: ExecutionCounters,
    pub(super) feedback: FeedbackSnapshot,
}

impl Default for ExecutionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionStateMachine {
    /// Create an uninitialized machine
    ///
    /// The machine starts in `NotReady`; call [`reset`](Self::reset) to
    /// make it accept plans.
    pub const fn new() -> Self {
        Self {
            state: ControllerState::NotReady,
            queue: StepQueue::new(),
            counters: ExecutionCounters {
                next_index_needed: None,
                last_index_sent: None,
            },
            feedback: FeedbackSnapshot::new(ControllerState::NotReady),
        }
    }

    /// Get current state
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Get a copy of the feedback snapshot
    pub fn feedback(&self) -> FeedbackSnapshot {
        self.feedback
    }

    /// Get the index counters
    pub fn counters(&self) -> ExecutionCounters {
        self.counters
    }

    /// Get the step queue
    pub fn queue(&self) -> &StepQueue {
        &self.queue
    }

    /// Apply an event, logging any state switch
    pub fn apply(&mut self, event: Event) -> ControllerState {
        let next = self.state.transition(event);
        if next != self.state {
            info!("Switching state from {:?} to {:?}", self.state, next);
            self.state = next;
            self.feedback.controller_state = next;
        }
        next
    }

    /// Clear queue, counters and feedback and enter `Ready`
    pub fn reset(&mut self) {
        self.queue.reset();
        self.counters = ExecutionCounters::default();
        self.feedback = FeedbackSnapshot::new(self.state);
        self.apply(Event::Reset);
    }

    /// Clear everything and leave service (`NotReady`)
    pub fn shutdown(&mut self) {
        self.reset();
        self.apply(Event::Shutdown);
    }

    /// Merge a nonempty plan into the queue
    ///
    /// A finished or failed execution is reset first. While active, a merge
    /// whose revision starts at or below `last_index_sent` rolls the counter
    /// back so the revised steps go out again: to just below the first
    /// changeable index, or below the revision start when the engine has not
    /// reported one. A revision that only extends past the sent range leaves
    /// the counter alone.
    ///
    /// The stop sentinel is a no-op here; callers handle it before merging.
    pub fn update_step_plan(&mut self, plan: &StepPlan<'_>) -> Result<bool, ControllerError> {
        if plan.is_stop() {
            return Ok(false);
        }

        if self.state.is_terminal() {
            self.reset();
        }

        if !self.state.accepts_plan() {
            warn!("Step plan rejected in state {:?}", self.state);
            return Err(ControllerError::Rejected(self.state));
        }

        let first_changeable = self.feedback.first_changeable;
        let replaced_from = self.queue.merge(plan, first_changeable).map_err(|e| {
            warn!("Step plan rejected: {:?}", e);
            ControllerError::from(e)
        })?;

        let Some(revision_start) = replaced_from else {
            return Ok(false);
        };

        if self.state == ControllerState::Active {
            self.roll_back_sent(revision_start, first_changeable);
        }

        self.refresh_queue_feedback();

        info!(
            "Updated step queue. Current queue has steps in range [{:?}; {:?}].",
            self.queue.first_index(),
            self.queue.last_index()
        );

        Ok(true)
    }

    fn roll_back_sent(&mut self, revision_start: StepIndex, first_changeable: Option<StepIndex>) {
        let last_sent = self.counters.last_index_sent;
        if last_sent < Some(revision_start) {
            return;
        }

        let rollback = first_changeable.unwrap_or(revision_start).checked_sub(1);
        if rollback < last_sent {
            debug!(
                "Rolling back last sent step from {:?} to {:?}",
                last_sent,
                rollback
            );
            self.counters.last_index_sent = rollback;
        }
    }

    /// Raise the index the engine wants in flight
    ///
    /// Lower values than the current one are ignored.
    pub fn set_next_index_needed(&mut self, index: StepIndex) {
        if Some(index) > self.counters.next_index_needed {
            self.counters.next_index_needed = Some(index);
        } else {
            trace!(
                "Ignoring next needed {} (already {:?})",
                index,
                self.counters.next_index_needed
            );
        }
    }

    /// Record a successful dispatch
    pub(super) fn set_last_index_sent(&mut self, index: StepIndex) {
        self.counters.last_index_sent = Some(index);
    }

    /// Store engine progress in the feedback snapshot
    pub fn report_progress(&mut self, progress: &Progress) {
        self.feedback.apply_progress(progress);
    }

    /// Walking engine performed the last step
    ///
    /// Returns whether the machine is now `Finished`.
    pub fn mark_finished(&mut self) -> bool {
        self.apply(Event::ExecutionFinished) == ControllerState::Finished
    }

    /// Fold a back-end status report into counters and feedback
    pub fn apply_backend_report(&mut self, report: &BackendReport) {
        self.report_progress(&report.progress);
        if let Some(needed) = report.next_needed {
            self.set_next_index_needed(needed);
        }
        if report.finished {
            self.mark_finished();
        }
    }

    /// Refresh the queue-derived feedback fields
    pub fn refresh_queue_feedback(&mut self) {
        self.feedback.refresh_queue(&self.queue);
    }
}
