//! Step dispatch trait
//!
//! This trait abstracts over walking engine back-ends (simulation, dry run,
//! a real robot bridge).

use crate::feedback::Progress;
use crate::step::{Step, StepIndex};

/// Errors a back-end can report for a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchError {
    /// Back-end cannot accept more steps right now
    Busy,
    /// Step is outside what the engine can execute
    Rejected,
    /// Link to the engine is down
    Disconnected,
}

/// Status pushed by a back-end at the start of a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BackendReport {
    /// Engine progress
    pub progress: Progress,
    /// Index the engine wants in flight next, if it changed
    pub next_needed: Option<StepIndex>,
    /// Last step of the plan has been performed
    pub finished: bool,
}

/// Trait for walking engine back-ends
///
/// `dispatch` is called synchronously from within a tick while the
/// controller lock is held. It must return promptly and must not call back
/// into the controller.
pub trait Dispatcher {
    /// Hand one step to the engine
    fn dispatch(&mut self, step: &Step) -> Result<(), DispatchError>;

    /// Short name used in logs and for selection by configuration
    fn name(&self) -> &str;

    /// Report engine status
    ///
    /// Called once per tick before admission and spooling.
    fn poll(&mut self, _now_ms: u64) -> Option<BackendReport> {
        None
    }

    /// The queue changed; `last_queued` is its highest index
    ///
    /// Lets an engine avoid asking for steps that were never planned.
    fn plan_updated(&mut self, _last_queued: Option<StepIndex>) {}

    /// Drop any steps the engine has buffered and forget its progress
    ///
    /// Called whenever the controller resets.
    fn abort(&mut self) {}
}

impl<T: Dispatcher + ?Sized> Dispatcher for &mut T {
    fn dispatch(&mut self, step: &Step) -> Result<(), DispatchError> {
        (**self).dispatch(step)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn poll(&mut self, now_ms: u64) -> Option<BackendReport> {
        (**self).poll(now_ms)
    }

    fn plan_updated(&mut self, last_queued: Option<StepIndex>) {
        (**self).plan_updated(last_queued)
    }

    fn abort(&mut self) {
        (**self).abort()
    }
}
