//! Inbound requests
//!
//! Plan submissions, cancellation and back-end reloads arrive over a
//! channel from whatever transport the integration uses and are applied to
//! the controller one at a time.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use heapless::{String, Vec};

use cadence_core::config::{BackendConfig, MAX_NAME_LEN};
use cadence_core::traits::FeedbackSink;
use cadence_core::{ControllerError, RequestId, Step, StepController, MAX_QUEUED_STEPS};
use cadence_drivers::{Backend, RegistryError};

/// Owned step plan carried by a request
pub type PlanBuffer = Vec<Step, MAX_QUEUED_STEPS>;

/// Controller driven by the runtime
pub type Controller<M, S> = StepController<M, Backend, S>;

/// Requests accepted by the runtime
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Request {
    /// Fire-and-forget plan; empty stops execution
    Execute(PlanBuffer),
    /// Plan whose outcome is reported through the feedback sink
    ExecuteTracked(PlanBuffer),
    /// Stop and preempt the tracked plan
    Cancel,
    /// Swap the back-end by registry name
    LoadBackend(String<MAX_NAME_LEN>),
}

/// What a handled request produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Handled {
    /// Plan merged; whether the queue changed
    Plan(bool),
    /// Tracked plan accepted under this id
    Tracked(RequestId),
    Cancelled,
    BackendLoaded,
}

/// Request handling errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestError {
    Controller(ControllerError),
    Registry(RegistryError),
}

impl From<ControllerError> for RequestError {
    fn from(e: ControllerError) -> Self {
        RequestError::Controller(e)
    }
}

impl From<RegistryError> for RequestError {
    fn from(e: RegistryError) -> Self {
        RequestError::Registry(e)
    }
}

/// Apply one request to the controller
pub fn handle_request<M: RawMutex, S: FeedbackSink>(
    controller: &Controller<M, S>,
    backend_config: &BackendConfig,
    request: Request,
) -> Result<Handled, RequestError> {
    match request {
        Request::Execute(plan) => Ok(Handled::Plan(controller.submit_plan(&plan)?)),
        Request::ExecuteTracked(plan) => Ok(Handled::Tracked(controller.submit_request(&plan)?)),
        Request::Cancel => {
            controller.cancel();
            Ok(Handled::Cancelled)
        }
        Request::LoadBackend(name) => {
            let backend = Backend::from_name(&name, backend_config)?;
            controller
                .replace_dispatcher(backend)
                .map_err(|_| ControllerError::BackendBusy)?;
            Ok(Handled::BackendLoaded)
        }
    }
}

fn apply<M: RawMutex, S: FeedbackSink>(
    controller: &Controller<M, S>,
    backend_config: &BackendConfig,
    request: Request,
) {
    if let Err(e) = handle_request(controller, backend_config, request) {
        warn!("Request failed: {:?}", e);
    }
}

/// Apply every request already waiting, without blocking
///
/// Returns how many requests were taken from the channel.
pub fn drain_requests<M: RawMutex, S: FeedbackSink, CM: RawMutex, const N: usize>(
    controller: &Controller<M, S>,
    requests: &Channel<CM, Request, N>,
    backend_config: &BackendConfig,
) -> usize {
    let mut count = 0;
    while let Ok(request) = requests.try_receive() {
        apply(controller, backend_config, request);
        count += 1;
    }
    count
}

/// Apply requests as they arrive, forever
pub async fn request_loop<M: RawMutex, S: FeedbackSink, CM: RawMutex, const N: usize>(
    controller: &Controller<M, S>,
    requests: &Channel<CM, Request, N>,
    backend_config: &BackendConfig,
) {
    info!("Request loop started");

    loop {
        let request = requests.receive().await;
        apply(controller, backend_config, request);
    }
}
