//! Periodic tick driver

use embassy_futures::join::join;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Instant, Ticker};

use cadence_core::config::MAX_RATE_HZ;
use cadence_core::traits::{Dispatcher, FeedbackSink};
use cadence_core::StepController;

use crate::config::RuntimeConfig;
use crate::request::{request_loop, Controller, Request};

/// Tick period for a rate, clamped to `1..=MAX_RATE_HZ`
pub fn tick_period(rate_hz: u16) -> Duration {
    Duration::from_hz(rate_hz.clamp(1, MAX_RATE_HZ) as u64)
}

/// Tick the controller at a fixed rate, forever
///
/// Timestamps passed to `tick` are milliseconds since the loop started.
pub async fn tick_loop<M: RawMutex, D: Dispatcher, S: FeedbackSink>(
    controller: &StepController<M, D, S>,
    rate_hz: u16,
) {
    let period = tick_period(rate_hz);
    info!("Tick loop started, period {} ms", period.as_millis());

    let mut ticker = Ticker::every(period);
    let start = Instant::now();

    loop {
        ticker.next().await;

        let now_ms = start.elapsed().as_millis();
        let report = controller.tick(now_ms);

        if report.state != report.state_at_start {
            debug!(
                "Tick at {} ms: {:?} -> {:?}",
                now_ms, report.state_at_start, report.state
            );
        }
    }
}

/// Run the controller: request handling, plus ticking when `auto_spin` is set
///
/// Without `auto_spin` the integrator calls `tick` itself.
pub async fn run<M: RawMutex, S: FeedbackSink, CM: RawMutex, const N: usize>(
    controller: &Controller<M, S>,
    requests: &Channel<CM, Request, N>,
    config: &RuntimeConfig,
) {
    if config.controller.auto_spin {
        join(
            tick_loop(controller, config.controller.rate_hz),
            request_loop(controller, requests, &config.backend),
        )
        .await;
    } else {
        info!("Auto spin disabled, ticks are driven externally");
        request_loop(controller, requests, &config.backend).await;
    }
}
