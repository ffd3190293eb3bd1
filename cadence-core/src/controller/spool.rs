//! Per-tick spooling protocol
//!
//! Admission decides whether a queued plan may start; the spool then sends
//! steps to the back-end until it has everything it asked for. Every failure
//! is terminal for the current execution and is reported through state, never
//! through a return value to the tick driver.

use super::machine::ExecutionStateMachine;
use crate::state::{ControllerState, Event, FailureKind};
use crate::traits::Dispatcher;

/// Admission check for a freshly queued plan
///
/// Only acts in `Ready` with a nonempty queue: a plan starting at index 0
/// becomes `Active`, anything else fails as malformed.
pub fn admit(machine: &mut ExecutionStateMachine) {
    if machine.state != ControllerState::Ready || machine.queue.is_empty() {
        return;
    }

    match machine.queue.first_index() {
        Some(0) => {
            machine.apply(Event::Admit);
        }
        first => {
            error!(
                "Step plan doesn't start with initial step 0 (first queued {:?}). Execution aborted!",
                first
            );
            machine.apply(Event::Fault(FailureKind::MalformedPlan));
        }
    }
}

/// Send every step the back-end still needs, then drop performed steps
///
/// Returns the number of steps dispatched during this call.
pub fn spool<D: Dispatcher + ?Sized>(
    machine: &mut ExecutionStateMachine,
    dispatcher: &mut D,
) -> usize {
    if machine.state != ControllerState::Active {
        return 0;
    }

    let mut sent = 0;

    while machine.counters.last_index_sent < machine.counters.next_index_needed {
        if machine.queue.is_empty() {
            error!(
                "Step {:?} required but queue is empty. Execution aborted!",
                machine.counters.next_index_needed
            );
            machine.apply(Event::Fault(FailureKind::QueueUnderrun));
            return sent;
        }

        let candidate = machine.counters.last_index_sent.map_or(0, |i| i + 1);

        let Some(step) = machine.queue.get(candidate).copied() else {
            error!("Missing step {} in queue. Execution aborted!", candidate);
            machine.apply(Event::Fault(FailureKind::MissingStep));
            return sent;
        };

        if let Err(e) = dispatcher.dispatch(&step) {
            error!(
                "Back-end '{}' refused step {}: {:?}. Execution aborted!",
                dispatcher.name(),
                candidate,
                e
            );
            machine.apply(Event::Fault(FailureKind::DispatchFailure));
            return sent;
        }

        machine.set_last_index_sent(candidate);
        sent += 1;
        trace!("Sent step {}", candidate);
    }

    // Garbage collection: drop steps the engine has already performed
    if let Some(performed) = machine.feedback.last_performed {
        machine.queue.remove_range(0, performed);
    }
    machine.refresh_queue_feedback();

    sent
}
