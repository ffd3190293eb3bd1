//! Feedback channel trait

use crate::controller::RequestId;
use crate::feedback::FeedbackSnapshot;

/// How a tracked request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestOutcome {
    /// Plan executed to the end
    Succeeded,
    /// Execution failed
    Aborted,
    /// Replaced by a newer request or cancelled
    Preempted,
}

/// Outbound channel for progress and request results
pub trait FeedbackSink {
    /// Broadcast a snapshot to every listener
    fn publish(&mut self, feedback: &FeedbackSnapshot);

    /// Mirror a snapshot to the caller of an open request
    fn publish_request(&mut self, _request: RequestId, _feedback: &FeedbackSnapshot) {}

    /// Close an open request
    fn resolve(&mut self, request: RequestId, outcome: RequestOutcome);
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl FeedbackSink for NullSink {
    fn publish(&mut self, _feedback: &FeedbackSnapshot) {}

    fn resolve(&mut self, _request: RequestId, _outcome: RequestOutcome) {}
}
