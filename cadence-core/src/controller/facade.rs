//! Thread-safe controller facade
//!
//! One blocking mutex guards the state machine, the back-end, the feedback
//! sink and the open request. Every entry point holds it for the whole
//! critical section, so feedback read after a tick reflects everything the
//! tick did and nothing half-done is ever visible.
//!
//! The raw mutex is chosen by the integrator: `CriticalSectionRawMutex`
//! when the controller is shared between threads or interrupt contexts,
//! `NoopRawMutex` when it never leaves one.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use super::machine::ExecutionStateMachine;
use super::spool;
use super::{ControllerError, RequestId};
use crate::feedback::{FeedbackSnapshot, Progress};
use crate::state::ControllerState;
use crate::step::{Step, StepIndex, StepPlan};
use crate::traits::{Dispatcher, FeedbackSink, RequestOutcome};

/// Summary of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// State captured before anything in the tick ran
    pub state_at_start: ControllerState,
    /// State after the tick
    pub state: ControllerState,
    /// Steps dispatched during the tick
    pub dispatched: usize,
    /// Request closed by this tick
    pub resolved: Option<(RequestId, RequestOutcome)>,
}

struct Inner<D, S> {
    machine: ExecutionStateMachine,
    dispatcher: D,
    sink: S,
    open_request: Option<RequestId>,
    next_request: u32,
}

/// Outcome of an execution that has already ended
fn settled_outcome(state: ControllerState) -> Option<RequestOutcome> {
    match state {
        ControllerState::Finished => Some(RequestOutcome::Succeeded),
        ControllerState::Failed(_) => Some(RequestOutcome::Aborted),
        _ => None,
    }
}

impl<D: Dispatcher, S: FeedbackSink> Inner<D, S> {
    /// Close the open request with the ended execution's outcome, or
    /// `interrupted` when it was still running
    fn close_execution(&mut self, interrupted: RequestOutcome) {
        let outcome = settled_outcome(self.machine.state()).unwrap_or(interrupted);
        self.close_request(outcome);
    }

    fn stop(&mut self) {
        info!("Stop requested. Resetting step controller.");
        self.close_execution(RequestOutcome::Preempted);
        self.dispatcher.abort();
        self.machine.reset();
    }

    fn update_plan(&mut self, plan: &StepPlan<'_>) -> Result<bool, ControllerError> {
        // A finished or failed execution is reset by the merge; the engine starts over too
        if let Some(outcome) = settled_outcome(self.machine.state()) {
            self.close_request(outcome);
            self.dispatcher.abort();
        }

        let changed = self.machine.update_step_plan(plan)?;
        if changed {
            self.dispatcher.plan_updated(self.machine.queue().last_index());
        }
        Ok(changed)
    }

    fn close_request(&mut self, outcome: RequestOutcome) -> Option<(RequestId, RequestOutcome)> {
        let id = self.open_request.take()?;
        debug!("Request {} closed: {:?}", id.0, outcome);
        self.sink.resolve(id, outcome);
        Some((id, outcome))
    }
}

/// Step plan execution controller
pub struct StepController<M: RawMutex, D, S> {
    inner: Mutex<M, RefCell<Inner<D, S>>>,
}

impl<M: RawMutex, D: Dispatcher, S: FeedbackSink> StepController<M, D, S> {
    /// Create a controller in `Ready` state
    pub fn new(dispatcher: D, sink: S) -> Self {
        let mut machine = ExecutionStateMachine::new();
        machine.reset();
        info!("Step controller ready with back-end '{}'", dispatcher.name());

        Self {
            inner: Mutex::new(RefCell::new(Inner {
                machine,
                dispatcher,
                sink,
                open_request: None,
                next_request: 0,
            })),
        }
    }

    fn with_inner<R>(&self, f: impl FnOnce(&mut Inner<D, S>) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Submit a plan without tracking its outcome
    ///
    /// An empty plan stops execution like [`stop`](Self::stop). A plan that
    /// replaces a finished or failed execution closes the open request with
    /// that execution's outcome. Returns whether the queue changed.
    pub fn submit_plan(&self, steps: &[Step]) -> Result<bool, ControllerError> {
        let plan = StepPlan::new(steps)?;

        self.with_inner(|inner| {
            if plan.is_stop() {
                inner.stop();
                return Ok(false);
            }
            inner.update_plan(&plan)
        })
    }

    /// Submit a plan and open a request that will be resolved exactly once
    ///
    /// A previously open request is preempted. An empty plan cancels the
    /// current execution and opens nothing.
    pub fn submit_request(&self, steps: &[Step]) -> Result<RequestId, ControllerError> {
        let plan = StepPlan::new(steps)?;

        self.with_inner(|inner| {
            if plan.is_stop() {
                inner.stop();
                return Err(ControllerError::EmptyPlan);
            }

            inner.update_plan(&plan)?;

            inner.close_request(RequestOutcome::Preempted);
            let id = RequestId(inner.next_request);
            inner.next_request = inner.next_request.wrapping_add(1);
            inner.open_request = Some(id);
            debug!("Request {} accepted", id.0);
            Ok(id)
        })
    }

    /// Stop execution and preempt the open request
    ///
    /// Same as [`stop`](Self::stop).
    pub fn cancel(&self) {
        self.stop();
    }

    /// Reset to `Ready` regardless of current state
    ///
    /// Steps already handed to the back-end are not recalled; spooling simply
    /// stops. An open request is preempted, unless its execution already
    /// ended, in which case it gets that outcome.
    pub fn stop(&self) {
        self.with_inner(|inner| inner.stop());
    }

    /// Take the controller out of service
    ///
    /// Submissions are rejected until [`stop`](Self::stop) brings it back.
    pub fn shutdown(&self) {
        self.with_inner(|inner| {
            inner.close_execution(RequestOutcome::Aborted);
            inner.dispatcher.abort();
            inner.machine.shutdown();
        });
    }

    /// Run one control cycle
    ///
    /// Order: back-end status, admission, spooling, feedback publication,
    /// then request resolution based on the state seen at the start of the
    /// tick, so the final progress message always precedes the result.
    pub fn tick(&self, now_ms: u64) -> TickReport {
        self.with_inner(|inner| {
            let state_at_start = inner.machine.state();

            if let Some(report) = inner.dispatcher.poll(now_ms) {
                inner.machine.apply_backend_report(&report);
            }

            spool::admit(&mut inner.machine);
            let dispatched = spool::spool(&mut inner.machine, &mut inner.dispatcher);

            let feedback = inner.machine.feedback();
            if feedback.controller_state.publishes_feedback() {
                inner.sink.publish(&feedback);
                if let Some(id) = inner.open_request {
                    inner.sink.publish_request(id, &feedback);
                }
            }

            let resolved =
                settled_outcome(state_at_start).and_then(|outcome| inner.close_request(outcome));

            TickReport {
                state_at_start,
                state: inner.machine.state(),
                dispatched,
                resolved,
            }
        })
    }

    /// Store progress reported by the walking engine
    pub fn report_progress(&self, progress: Progress) {
        self.with_inner(|inner| inner.machine.report_progress(&progress));
    }

    /// Raise the index the walking engine wants in flight
    pub fn set_next_index_needed(&self, index: StepIndex) {
        self.with_inner(|inner| inner.machine.set_next_index_needed(index));
    }

    /// Walking engine performed the last step
    ///
    /// The next tick resolves the open request as succeeded.
    pub fn mark_finished(&self) -> bool {
        self.with_inner(|inner| inner.machine.mark_finished())
    }

    /// Swap the execution back-end
    ///
    /// Refused during active execution; the rejected back-end is handed back
    /// in `Err`. On success the previous back-end is returned.
    pub fn replace_dispatcher(&self, dispatcher: D) -> Result<D, D> {
        self.with_inner(|inner| {
            let state = inner.machine.state();
            if !state.allows_backend_swap() {
                error!(
                    "Cannot replace back-end with '{}' during active execution!",
                    dispatcher.name()
                );
                return Err(dispatcher);
            }

            info!("Loaded back-end '{}'", dispatcher.name());
            Ok(core::mem::replace(&mut inner.dispatcher, dispatcher))
        })
    }

    /// Get current state
    pub fn state(&self) -> ControllerState {
        self.with_inner(|inner| inner.machine.state())
    }

    /// Get a copy of the feedback snapshot
    pub fn feedback(&self) -> FeedbackSnapshot {
        self.with_inner(|inner| inner.machine.feedback())
    }

    /// Index the walking engine wants in flight
    pub fn next_index_needed(&self) -> Option<StepIndex> {
        self.with_inner(|inner| inner.machine.counters().next_index_needed)
    }

    /// Highest index dispatched so far
    pub fn last_index_sent(&self) -> Option<StepIndex> {
        self.with_inner(|inner| inner.machine.counters().last_index_sent)
    }

    /// Currently open tracked request
    pub fn open_request(&self) -> Option<RequestId> {
        self.with_inner(|inner| inner.open_request)
    }

    /// Check if a step is still queued
    pub fn is_queued(&self, index: StepIndex) -> bool {
        self.with_inner(|inner| inner.machine.queue().get(index).is_some())
    }

    /// Run a closure against the back-end
    ///
    /// The closure runs under the controller lock and must not call back
    /// into the controller.
    pub fn with_dispatcher<R>(&self, f: impl FnOnce(&mut D) -> R) -> R {
        self.with_inner(|inner| f(&mut inner.dispatcher))
    }

    /// Run a closure against the feedback sink
    ///
    /// Same locking rules as [`with_dispatcher`](Self::with_dispatcher).
    pub fn with_sink<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        self.with_inner(|inner| f(&mut inner.sink))
    }
}
