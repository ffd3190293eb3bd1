//! Capability traits
//!
//! These traits define the interface between the controller and the
//! collaborators it does not implement itself: the walking engine that
//! executes steps and the channel that carries feedback to the caller.

pub mod dispatcher;
pub mod sink;

pub use dispatcher::{BackendReport, DispatchError, Dispatcher};
pub use sink::{FeedbackSink, NullSink, RequestOutcome};
