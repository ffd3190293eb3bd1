//! Dry-run back-end
//!
//! Accepts every step and records its index. Nothing is executed; progress
//! has to be reported through the controller by whoever drives the test.
//!
//! The log covers the current execution only. It is a rolling window: once
//! full, the oldest entries are overwritten, so a long plan never makes the
//! recorder refuse a step.

use heapless::HistoryBuffer;

use cadence_core::config::BackendConfig;
use cadence_core::traits::{DispatchError, Dispatcher};
use cadence_core::{Step, StepIndex};

/// Number of most recent dispatches kept in the log
pub const RECORD_CAPACITY: usize = 256;

/// Back-end that records dispatched step indices
#[derive(Debug, Clone, Default)]
pub struct RecordingDispatcher {
    sent: HistoryBuffer<StepIndex, RECORD_CAPACITY>,
    fail_at: Option<StepIndex>,
    aborts: u32,
}

impl RecordingDispatcher {
    /// Create a recorder that accepts everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a recorder from back-end configuration
    pub fn from_config(config: &BackendConfig) -> Self {
        Self {
            fail_at: config.fail_at,
            ..Self::default()
        }
    }

    /// Fail the dispatch of `index` (fault injection)
    pub fn fail_at(&mut self, index: Option<StepIndex>) {
        self.fail_at = index;
    }

    /// Dispatched indices of the current execution, oldest first
    pub fn sent(&self) -> impl Iterator<Item = &StepIndex> {
        self.sent.oldest_ordered()
    }

    /// Most recently dispatched index
    pub fn last_sent(&self) -> Option<StepIndex> {
        self.sent.recent().copied()
    }

    /// How often the controller reset this back-end
    pub fn aborts(&self) -> u32 {
        self.aborts
    }

    /// Forget recorded dispatches
    pub fn clear(&mut self) {
        self.sent.clear();
    }
}

impl Dispatcher for RecordingDispatcher {
    fn dispatch(&mut self, step: &Step) -> Result<(), DispatchError> {
        if self.fail_at == Some(step.index) {
            warn!("Injected failure at step {}", step.index);
            return Err(DispatchError::Rejected);
        }

        self.sent.write(step.index);
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }

    fn abort(&mut self) {
        self.aborts = self.aborts.saturating_add(1);
        self.sent.clear();
    }
}
