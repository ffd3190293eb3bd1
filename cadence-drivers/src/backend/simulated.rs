//! Simulated walking engine
//!
//! Executes steps one after the other, each for its `duration_ms`, without
//! any kinematics. Progress is derived from the poll timestamps, so the
//! simulation runs at whatever pace the tick driver sets.

use heapless::Deque;

use cadence_core::config::BackendConfig;
use cadence_core::traits::{BackendReport, DispatchError, Dispatcher};
use cadence_core::{Progress, Step, StepIndex};

/// Hard upper bound on buffered steps
pub const MAX_BUFFERED_STEPS: usize = 16;

/// Step being executed and when it started
#[derive(Debug, Clone, Copy)]
struct Executing {
    step: Step,
    started_ms: u64,
}

/// Timed walking engine without kinematics
#[derive(Debug, Clone)]
pub struct SimulatedWalker {
    lookahead: StepIndex,
    buffer_steps: usize,
    buffer: Deque<Step, MAX_BUFFERED_STEPS>,
    executing: Option<Executing>,
    last_performed: Option<StepIndex>,
    last_queued: Option<StepIndex>,
}

impl SimulatedWalker {
    /// Create an idle walker
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            lookahead: config.lookahead as StepIndex,
            buffer_steps: (config.buffer_steps as usize).clamp(1, MAX_BUFFERED_STEPS),
            buffer: Deque::new(),
            executing: None,
            last_performed: None,
            last_queued: None,
        }
    }

    /// Index of the step in execution
    pub fn currently_executing(&self) -> Option<StepIndex> {
        self.executing.map(|e| e.step.index)
    }

    /// Highest index performed so far
    pub fn last_performed(&self) -> Option<StepIndex> {
        self.last_performed
    }

    /// Number of dispatched steps not yet started
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    fn advance(&mut self, now_ms: u64) {
        if let Some(current) = self.executing {
            let elapsed = now_ms.saturating_sub(current.started_ms);
            if elapsed < current.step.duration_ms as u64 {
                return;
            }
            trace!("Performed step {}", current.step.index);
            self.last_performed = Some(current.step.index);
            self.executing = None;
        }

        if let Some(step) = self.buffer.pop_front() {
            trace!("Executing step {}", step.index);
            self.executing = Some(Executing {
                step,
                started_ms: now_ms,
            });
        }
    }

    /// First index not yet performed
    fn frontier(&self) -> StepIndex {
        match (self.currently_executing(), self.last_performed) {
            (Some(i), _) => i,
            (None, Some(p)) => p + 1,
            (None, None) => 0,
        }
    }

    fn is_finished(&self) -> bool {
        self.executing.is_none()
            && self.buffer.is_empty()
            && self.last_queued.is_some()
            && self.last_performed == self.last_queued
    }
}

impl Dispatcher for SimulatedWalker {
    fn dispatch(&mut self, step: &Step) -> Result<(), DispatchError> {
        if step.index < self.frontier() {
            warn!("Step {} is already performed or in execution", step.index);
            return Err(DispatchError::Rejected);
        }

        // Revised steps replace whatever was buffered from their index on
        while self.buffer.back().is_some_and(|s| s.index >= step.index) {
            self.buffer.pop_back();
        }

        if self.buffer.len() >= self.buffer_steps {
            return Err(DispatchError::Busy);
        }

        self.buffer.push_back(*step).map_err(|_| DispatchError::Busy)
    }

    fn name(&self) -> &str {
        "simulated"
    }

    fn poll(&mut self, now_ms: u64) -> Option<BackendReport> {
        self.advance(now_ms);

        let executing = self.currently_executing();
        let first_changeable = executing.or(self.last_performed).map(|i| i + 1);

        // Never ask for a step that was not planned
        let next_needed = self
            .last_queued
            .map(|last| self.frontier().saturating_add(self.lookahead).min(last));

        Some(BackendReport {
            progress: Progress {
                last_performed: self.last_performed,
                currently_executing: executing,
                first_changeable,
            },
            next_needed,
            finished: self.is_finished(),
        })
    }

    fn plan_updated(&mut self, last_queued: Option<StepIndex>) {
        self.last_queued = last_queued;
    }

    fn abort(&mut self) {
        debug!("Simulated walker dropping {} buffered steps", self.buffer.len());
        self.buffer.clear();
        self.executing = None;
        self.last_performed = None;
        self.last_queued = None;
    }
}
