//! Feedback delivered through embassy-sync primitives
//!
//! Snapshots go into signals: a listener that falls behind only ever sees
//! the latest one. Request results go into a channel so each tracked
//! request's single terminal result reaches the caller.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use cadence_core::traits::{FeedbackSink, RequestOutcome};
use cadence_core::{FeedbackSnapshot, RequestId};

/// Feedback sink backed by signals and a result channel
pub struct SignalSink<'a, M: RawMutex, const N: usize> {
    feedback: &'a Signal<M, FeedbackSnapshot>,
    request_feedback: &'a Signal<M, (RequestId, FeedbackSnapshot)>,
    results: &'a Channel<M, (RequestId, RequestOutcome), N>,
}

impl<'a, M: RawMutex, const N: usize> SignalSink<'a, M, N> {
    pub fn new(
        feedback: &'a Signal<M, FeedbackSnapshot>,
        request_feedback: &'a Signal<M, (RequestId, FeedbackSnapshot)>,
        results: &'a Channel<M, (RequestId, RequestOutcome), N>,
    ) -> Self {
        Self {
            feedback,
            request_feedback,
            results,
        }
    }
}

impl<M: RawMutex, const N: usize> FeedbackSink for SignalSink<'_, M, N> {
    fn publish(&mut self, feedback: &FeedbackSnapshot) {
        self.feedback.signal(*feedback);
    }

    fn publish_request(&mut self, request: RequestId, feedback: &FeedbackSnapshot) {
        self.request_feedback.signal((request, *feedback));
    }

    fn resolve(&mut self, request: RequestId, outcome: RequestOutcome) {
        if self.results.try_send((request, outcome)).is_err() {
            error!("Result channel full, dropping result of request {}", request.0);
        }
    }
}
