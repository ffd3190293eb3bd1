//! Async runtime for the step plan execution controller
//!
//! Wires a [`StepController`](cadence_core::StepController) to the outside
//! world with embassy primitives:
//!
//! - Periodic tick driver on an `embassy_time::Ticker`
//! - Request channel for plan submission, cancellation and back-end reloads
//! - Feedback sink publishing into signals
//! - TOML configuration loading
//!
//! No executor is assumed; the loops are plain futures.

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod request;
pub mod sink;
pub mod tick;

pub use config::{parse_config, ConfigError, RuntimeConfig};
pub use request::{
    drain_requests, handle_request, request_loop, Controller, Handled, PlanBuffer, Request,
    RequestError,
};
pub use sink::SignalSink;
pub use tick::{run, tick_loop, tick_period};
