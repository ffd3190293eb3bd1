//! Back-end registry
//!
//! Back-ends are selected by name from configuration or at runtime. The
//! registry is a closed enum so the controller stays monomorphic and no
//! dynamic loading is needed.

pub mod recording;
pub mod simulated;

pub use recording::RecordingDispatcher;
pub use simulated::SimulatedWalker;

use cadence_core::config::BackendConfig;
use cadence_core::traits::{BackendReport, DispatchError, Dispatcher};
use cadence_core::{Step, StepIndex};

/// Registry lookup errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// No back-end with this name is compiled in
    UnknownBackend,
}

/// Any bundled back-end
#[derive(Debug, Clone)]
pub enum Backend {
    Simulated(SimulatedWalker),
    Recording(RecordingDispatcher),
}

impl Backend {
    /// Names accepted by [`from_name`](Self::from_name)
    pub const NAMES: [&'static str; 2] = ["simulated", "recording"];

    /// Instantiate a back-end by name
    pub fn from_name(name: &str, config: &BackendConfig) -> Result<Self, RegistryError> {
        match name {
            "simulated" => Ok(Backend::Simulated(SimulatedWalker::new(config))),
            "recording" => Ok(Backend::Recording(RecordingDispatcher::from_config(config))),
            _ => {
                error!("Unknown back-end '{}'", name);
                Err(RegistryError::UnknownBackend)
            }
        }
    }

    fn inner(&self) -> &dyn Dispatcher {
        match self {
            Backend::Simulated(b) => b,
            Backend::Recording(b) => b,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Dispatcher {
        match self {
            Backend::Simulated(b) => b,
            Backend::Recording(b) => b,
        }
    }
}

impl Dispatcher for Backend {
    fn dispatch(&mut self, step: &Step) -> Result<(), DispatchError> {
        self.inner_mut().dispatch(step)
    }

    fn name(&self) -> &str {
        self.inner().name()
    }

    fn poll(&mut self, now_ms: u64) -> Option<BackendReport> {
        self.inner_mut().poll(now_ms)
    }

    fn plan_updated(&mut self, last_queued: Option<StepIndex>) {
        self.inner_mut().plan_updated(last_queued)
    }

    fn abort(&mut self) {
        self.inner_mut().abort()
    }
}
