//! Walking engine back-ends
//!
//! This crate provides concrete implementations of the `Dispatcher` trait
//! defined in cadence-core:
//!
//! - Simulated walker (timed execution without kinematics)
//! - Recording dry-run back-end with fault injection
//! - By-name registry used by configuration and runtime reloads

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod backend;

pub use backend::{Backend, RecordingDispatcher, RegistryError, SimulatedWalker};
