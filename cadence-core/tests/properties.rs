//! Property tests for dispatch ordering and plan revision

use cadence_core::traits::{DispatchError, Dispatcher, NullSink};
use cadence_core::{
    ControllerState, Foot, Pose, Progress, Step, StepController, StepIndex, StepPlan, StepQueue,
};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use proptest::prelude::*;

#[derive(Default)]
struct Recorder {
    sent: Vec<StepIndex>,
}

impl Dispatcher for Recorder {
    fn dispatch(&mut self, step: &Step) -> Result<(), DispatchError> {
        self.sent.push(step.index);
        Ok(())
    }

    fn name(&self) -> &str {
        "recorder"
    }
}

fn step(index: StepIndex, x_mm: i32) -> Step {
    Step::new(
        index,
        if index % 2 == 0 { Foot::Left } else { Foot::Right },
        Pose {
            x_mm,
            ..Default::default()
        },
    )
}

/// Drive the controller like an engine that wants `lookahead` steps in
/// flight and performs one step per tick.
fn run_to_quiescence(
    ctrl: &StepController<NoopRawMutex, Recorder, NullSink>,
    last: StepIndex,
    lookahead: StepIndex,
) {
    let mut performed: Option<StepIndex> = None;

    for now_ms in 0..(4 * last as u64 + 16) {
        let target = performed.map_or(0, |p| p + 1).saturating_add(lookahead).min(last);
        ctrl.set_next_index_needed(target);
        ctrl.tick(now_ms);

        if ctrl.state() != ControllerState::Active {
            return;
        }

        if let Some(sent) = ctrl.last_index_sent() {
            let next = performed.map_or(0, |p| p + 1);
            if next <= sent {
                performed = Some(next);
                ctrl.report_progress(Progress {
                    last_performed: performed,
                    currently_executing: None,
                    first_changeable: Some(next + 1),
                });
            }
        }
    }
}

proptest! {
    #[test]
    fn dispatch_is_ascending_and_unique(
        len in 1u32..100,
        lookahead in 0u32..6,
    ) {
        let steps: Vec<Step> = (0..len).map(|i| step(i, 0)).collect();
        let ctrl = StepController::<NoopRawMutex, _, _>::new(Recorder::default(), NullSink);
        ctrl.submit_plan(&steps).unwrap();

        run_to_quiescence(&ctrl, len - 1, lookahead);

        let sent = ctrl.with_dispatcher(|d| d.sent.clone());
        let expected: Vec<StepIndex> = (0..len).collect();
        prop_assert_eq!(sent, expected);
        prop_assert_eq!(ctrl.state(), ControllerState::Active);
    }

    #[test]
    fn gaps_fail_instead_of_skipping(
        len in 3u32..60,
        hole in 1u32..59,
    ) {
        prop_assume!(hole < len - 1);
        let steps: Vec<Step> = (0..len).filter(|&i| i != hole).map(|i| step(i, 0)).collect();
        let ctrl = StepController::<NoopRawMutex, _, _>::new(Recorder::default(), NullSink);
        ctrl.submit_plan(&steps).unwrap();

        run_to_quiescence(&ctrl, len - 1, 2);

        let sent = ctrl.with_dispatcher(|d| d.sent.clone());
        let expected: Vec<StepIndex> = (0..hole).collect();
        prop_assert_eq!(sent, expected);
        prop_assert!(ctrl.state().is_failed());
    }

    #[test]
    fn merge_preserves_committed_prefix(
        original_len in 1u32..60,
        first_changeable in 0u32..70,
        revision_start in 0u32..70,
        revision_len in 0u32..40,
    ) {
        let original: Vec<Step> = (0..original_len).map(|i| step(i, 0)).collect();
        let revision: Vec<Step> = (revision_start..revision_start + revision_len)
            .map(|i| step(i, 1))
            .collect();

        let mut queue = StepQueue::new();
        queue.merge(&StepPlan::new(&original).unwrap(), None).unwrap();
        queue
            .merge(&StepPlan::new(&revision).unwrap(), Some(first_changeable))
            .unwrap();

        let indices: Vec<StepIndex> = queue.iter().map(|s| s.index).collect();
        prop_assert!(indices.windows(2).all(|w| w[0] < w[1]));

        // Committed steps are never touched
        for i in 0..original_len.min(first_changeable) {
            prop_assert_eq!(queue.get(i).map(|s| s.pose.x_mm), Some(0));
        }

        // Accepted revision steps all land, and nothing stale survives past them
        let accepted: Vec<&Step> = revision.iter().filter(|s| s.index >= first_changeable).collect();
        if let Some(first) = accepted.first() {
            for s in &accepted {
                prop_assert_eq!(queue.get(s.index), Some(*s));
            }
            prop_assert_eq!(queue.last_index(), accepted.last().map(|s| s.index));
            prop_assert!(queue.iter().filter(|s| s.index >= first.index).all(|s| s.pose.x_mm == 1));
        } else {
            prop_assert_eq!(queue.len(), original_len as usize);
        }
    }

    #[test]
    fn stop_always_clears(len in 0u32..40, needed in 0u32..40) {
        let steps: Vec<Step> = (0..len).map(|i| step(i, 0)).collect();
        let ctrl = StepController::<NoopRawMutex, _, _>::new(Recorder::default(), NullSink);
        let _ = ctrl.submit_plan(&steps);
        ctrl.set_next_index_needed(needed);
        ctrl.tick(0);

        ctrl.stop();
        prop_assert_eq!(ctrl.state(), ControllerState::Ready);
        prop_assert_eq!(ctrl.feedback().queue_size, 0);
        prop_assert_eq!(ctrl.next_index_needed(), None);
    }
}
