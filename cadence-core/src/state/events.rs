//! Events that trigger state transitions

use super::machine::FailureKind;

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Clear queue, counters and feedback
    Reset,
    /// Queued plan starts at index 0; begin spooling
    Admit,
    /// Current execution cannot continue
    Fault(FailureKind),
    /// Walking engine reports the last step performed
    ExecutionFinished,
    /// Controller taken out of service
    Shutdown,
}

impl Event {
    /// Check if this event is raised by the controller itself during a tick
    pub fn is_tick_event(&self) -> bool {
        matches!(self, Event::Admit | Event::Fault(_))
    }

    /// Check if this event indicates a failure
    pub fn is_fault(&self) -> bool {
        matches!(self, Event::Fault(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_events() {
        assert!(Event::Admit.is_tick_event());
        assert!(Event::Fault(FailureKind::MissingStep).is_tick_event());
        assert!(!Event::Reset.is_tick_event());
        assert!(!Event::ExecutionFinished.is_tick_event());
    }

    #[test]
    fn test_fault_events() {
        assert!(Event::Fault(FailureKind::DispatchFailure).is_fault());
        assert!(!Event::Shutdown.is_fault());
    }
}
