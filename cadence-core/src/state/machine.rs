//! State machine definition

use super::events::Event;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Controller states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ControllerState {
    /// Not initialized; every submission is rejected
    NotReady,
    /// Idle, accepting a new plan
    Ready,
    /// Spooling steps to the walking engine
    Active,
    /// Reserved for cancellation with resume; never entered
    Paused,
    /// Last step performed
    Finished,
    /// Execution aborted; needs a new plan or stop to recover
    Failed(FailureKind),
}

/// Reasons an execution fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FailureKind {
    /// Queued plan does not start at index 0
    MalformedPlan,
    /// A step is needed but the queue is empty
    QueueUnderrun,
    /// The next step to send is missing from the queue
    MissingStep,
    /// The walking engine refused a step
    DispatchFailure,
}

impl ControllerState {
    /// Check if a new plan may be merged in this state
    pub fn accepts_plan(&self) -> bool {
        matches!(self, ControllerState::Ready | ControllerState::Active)
    }

    /// Check if this state ends an execution
    pub fn is_terminal(&self) -> bool {
        matches!(self, ControllerState::Finished | ControllerState::Failed(_))
    }

    /// Check if this is a failure state
    pub fn is_failed(&self) -> bool {
        matches!(self, ControllerState::Failed(_))
    }

    /// Check if the execution back-end may be swapped in this state
    pub fn allows_backend_swap(&self) -> bool {
        !matches!(self, ControllerState::Active)
    }

    /// Check if feedback is published while in this state
    ///
    /// Nothing is executing when idle or out of service.
    pub fn publishes_feedback(&self) -> bool {
        !matches!(self, ControllerState::Ready | ControllerState::NotReady)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: Event) -> Self {
        use ControllerState::*;
        use Event::*;

        match (self, event) {
            (_, Reset) => Ready,
            (_, Shutdown) => NotReady,

            (Ready, Admit) => Active,
            (Ready, Fault(kind)) => Failed(kind),

            (Active, Fault(kind)) => Failed(kind),
            (Active, ExecutionFinished) => Finished,

            // Default: stay in current state
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_from_any_state() {
        let states = [
            ControllerState::NotReady,
            ControllerState::Ready,
            ControllerState::Active,
            ControllerState::Paused,
            ControllerState::Finished,
            ControllerState::Failed(FailureKind::QueueUnderrun),
        ];

        for state in states {
            assert_eq!(state.transition(Event::Reset), ControllerState::Ready);
        }
    }

    #[test]
    fn test_admission() {
        let active = ControllerState::Ready.transition(Event::Admit);
        assert_eq!(active, ControllerState::Active);

        // Already active: no-op
        assert_eq!(active.transition(Event::Admit), ControllerState::Active);
    }

    #[test]
    fn test_malformed_plan_from_ready() {
        let next = ControllerState::Ready.transition(Event::Fault(FailureKind::MalformedPlan));
        assert_eq!(next, ControllerState::Failed(FailureKind::MalformedPlan));
    }

    #[test]
    fn test_fault_while_active() {
        let next = ControllerState::Active.transition(Event::Fault(FailureKind::DispatchFailure));
        assert!(next.is_failed());
        assert!(next.is_terminal());
    }

    #[test]
    fn test_finish_only_from_active() {
        assert_eq!(
            ControllerState::Active.transition(Event::ExecutionFinished),
            ControllerState::Finished
        );
        assert_eq!(
            ControllerState::Ready.transition(Event::ExecutionFinished),
            ControllerState::Ready
        );
    }

    #[test]
    fn test_failed_is_sticky() {
        let failed = ControllerState::Failed(FailureKind::MissingStep);
        assert_eq!(failed.transition(Event::Admit), failed);
        assert_eq!(failed.transition(Event::ExecutionFinished), failed);
        assert_eq!(failed.transition(Event::Fault(FailureKind::DispatchFailure)), failed);
    }

    #[test]
    fn test_paused_is_never_entered() {
        let states = [
            ControllerState::NotReady,
            ControllerState::Ready,
            ControllerState::Active,
            ControllerState::Finished,
        ];
        let events = [
            Event::Admit,
            Event::ExecutionFinished,
            Event::Fault(FailureKind::QueueUnderrun),
        ];

        for state in states {
            for event in events {
                assert_ne!(state.transition(event), ControllerState::Paused);
            }
        }
    }

    #[test]
    fn test_not_ready_ignores_execution_events() {
        let state = ControllerState::NotReady;
        assert_eq!(state.transition(Event::Admit), ControllerState::NotReady);
        assert!(!state.accepts_plan());
    }

    #[test]
    fn test_backend_swap_guard() {
        assert!(ControllerState::Ready.allows_backend_swap());
        assert!(ControllerState::Finished.allows_backend_swap());
        assert!(!ControllerState::Active.allows_backend_swap());
    }

    #[test]
    fn test_idle_states_publish_nothing() {
        assert!(!ControllerState::Ready.publishes_feedback());
        assert!(!ControllerState::NotReady.publishes_feedback());
        assert!(ControllerState::Active.publishes_feedback());
        assert!(ControllerState::Finished.publishes_feedback());
        assert!(ControllerState::Failed(FailureKind::QueueUnderrun).publishes_feedback());
    }

    #[test]
    fn test_shutdown() {
        assert_eq!(
            ControllerState::Active.transition(Event::Shutdown),
            ControllerState::NotReady
        );
    }
}
