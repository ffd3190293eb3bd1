//! Step queue
//!
//! Ordered, index-addressed buffer of steps that are pending or in flight.
//! Entries are kept sorted by index, so bounds are O(1) and lookups are a
//! binary search.

use heapless::Vec;

use crate::step::{Step, StepIndex, StepPlan};

/// Maximum number of steps held at once
pub const MAX_QUEUED_STEPS: usize = 128;

/// Queue operation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QueueError {
    /// The merged queue would exceed [`MAX_QUEUED_STEPS`]
    CapacityExceeded { required: usize },
}

/// Index-ordered step buffer
#[derive(Debug, Clone, Default)]
pub struct StepQueue {
    steps: Vec<Step, MAX_QUEUED_STEPS>,
}

impl StepQueue {
    /// Create an empty queue
    pub const fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Clear all entries
    pub fn reset(&mut self) {
        self.steps.clear();
    }

    /// Merge a plan revision into the queue
    ///
    /// Entries below `first_changeable` are committed and never touched.
    /// The plan's steps at or above `first_changeable` form the revision:
    /// queued entries below the revision's first index are kept, and
    /// everything from that index onward is replaced by the revision, which
    /// both overwrites revised indices and trims a stale tail.
    ///
    /// Returns the revision's first index when the queue content changed,
    /// `None` when it did not. On error the queue is left untouched.
    pub fn merge(
        &mut self,
        plan: &StepPlan<'_>,
        first_changeable: Option<StepIndex>,
    ) -> Result<Option<StepIndex>, QueueError> {
        let revision = plan.from_index(first_changeable.unwrap_or(0));
        let Some(revision_start) = revision.first().map(|s| s.index) else {
            return Ok(None);
        };

        let keep = self.steps.partition_point(|s| s.index < revision_start);
        let required = keep + revision.len();
        if required > MAX_QUEUED_STEPS {
            return Err(QueueError::CapacityExceeded { required });
        }

        if self.steps[keep..] == *revision {
            return Ok(None);
        }

        self.steps.truncate(keep);
        // Capacity was checked above
        let _ = self.steps.extend_from_slice(revision);
        Ok(Some(revision_start))
    }

    /// Look up a step by index
    ///
    /// `None` is a normal outcome when the index has not been queued yet.
    pub fn get(&self, index: StepIndex) -> Option<&Step> {
        self.steps
            .binary_search_by_key(&index, |s| s.index)
            .ok()
            .map(|pos| &self.steps[pos])
    }

    /// Remove all entries in `[from, to]`
    ///
    /// Indices outside the current bounds are ignored.
    pub fn remove_range(&mut self, from: StepIndex, to: StepIndex) {
        if from > to {
            return;
        }
        self.steps.retain(|s| s.index < from || s.index > to);
    }

    /// Lowest queued index
    pub fn first_index(&self) -> Option<StepIndex> {
        self.steps.first().map(|s| s.index)
    }

    /// Highest queued index
    pub fn last_index(&self) -> Option<StepIndex> {
        self.steps.last().map(|s| s.index)
    }

    /// Number of queued steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Iterate over queued steps in index order
    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::{Foot, Pose};

    fn step(index: StepIndex) -> Step {
        Step::new(index, Foot::Left, Pose::default())
    }

    fn tagged(index: StepIndex, x_mm: i32) -> Step {
        Step::new(
            index,
            Foot::Left,
            Pose {
                x_mm,
                ..Default::default()
            },
        )
    }

    fn range(from: StepIndex, to: StepIndex) -> heapless::Vec<Step, MAX_QUEUED_STEPS> {
        (from..=to).map(step).collect()
    }

    fn indices(queue: &StepQueue) -> heapless::Vec<StepIndex, MAX_QUEUED_STEPS> {
        queue.iter().map(|s| s.index).collect()
    }

    #[test]
    fn test_empty_queue() {
        let queue = StepQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.first_index(), None);
        assert_eq!(queue.last_index(), None);
        assert!(queue.get(0).is_none());
    }

    #[test]
    fn test_merge_into_empty() {
        let mut queue = StepQueue::new();
        let steps = range(0, 4);
        let changed = queue.merge(&StepPlan::new(&steps).unwrap(), None).unwrap();

        assert_eq!(changed, Some(0));
        assert_eq!(queue.len(), 5);
        assert_eq!(queue.first_index(), Some(0));
        assert_eq!(queue.last_index(), Some(4));
        assert_eq!(queue.get(2), Some(&step(2)));
    }

    #[test]
    fn test_merge_empty_plan_is_noop() {
        let mut queue = StepQueue::new();
        let steps = range(0, 2);
        queue.merge(&StepPlan::new(&steps).unwrap(), None).unwrap();

        assert_eq!(queue.merge(&StepPlan::stop(), None), Ok(None));
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_merge_identical_plan_reports_unchanged() {
        let mut queue = StepQueue::new();
        let steps = range(0, 3);
        let plan = StepPlan::new(&steps).unwrap();
        assert_eq!(queue.merge(&plan, None), Ok(Some(0)));
        assert_eq!(queue.merge(&plan, None), Ok(None));
    }

    #[test]
    fn test_merge_keeps_committed_steps() {
        let mut queue = StepQueue::new();
        let original: heapless::Vec<Step, 8> = (0..=5).map(|i| tagged(i, 0)).collect();
        queue.merge(&StepPlan::new(&original).unwrap(), None).unwrap();

        // Revision rewrites everything, but only 3.. is changeable
        let revised: heapless::Vec<Step, 8> = (0..=7).map(|i| tagged(i, 50)).collect();
        let changed = queue
            .merge(&StepPlan::new(&revised).unwrap(), Some(3))
            .unwrap();

        assert_eq!(changed, Some(3));
        assert_eq!(queue.get(2).unwrap().pose.x_mm, 0);
        assert_eq!(queue.get(3).unwrap().pose.x_mm, 50);
        assert_eq!(queue.last_index(), Some(7));
        assert_eq!(queue.len(), 8);
    }

    #[test]
    fn test_merge_appends_beyond_last() {
        let mut queue = StepQueue::new();
        let first = range(0, 3);
        queue.merge(&StepPlan::new(&first).unwrap(), None).unwrap();

        let extension = range(4, 6);
        assert_eq!(
            queue.merge(&StepPlan::new(&extension).unwrap(), Some(2)),
            Ok(Some(4))
        );
        assert_eq!(indices(&queue).as_slice(), &[0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_merge_shorter_revision_trims_tail() {
        let mut queue = StepQueue::new();
        let original = range(0, 10);
        queue.merge(&StepPlan::new(&original).unwrap(), None).unwrap();

        let revised = range(3, 5);
        assert_eq!(
            queue.merge(&StepPlan::new(&revised).unwrap(), Some(3)),
            Ok(Some(3))
        );
        assert_eq!(indices(&queue).as_slice(), &[0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_merge_below_changeable_is_noop() {
        let mut queue = StepQueue::new();
        let original = range(0, 5);
        queue.merge(&StepPlan::new(&original).unwrap(), None).unwrap();

        let late = range(0, 2);
        assert_eq!(queue.merge(&StepPlan::new(&late).unwrap(), Some(4)), Ok(None));
        assert_eq!(queue.len(), 6);
    }

    #[test]
    fn test_merge_capacity_exceeded_leaves_queue() {
        let mut queue = StepQueue::new();
        let original = range(0, 3);
        queue.merge(&StepPlan::new(&original).unwrap(), None).unwrap();

        let mut huge: heapless::Vec<Step, { MAX_QUEUED_STEPS + 4 }> = heapless::Vec::new();
        for i in 0..(MAX_QUEUED_STEPS as StepIndex + 4) {
            let _ = huge.push(step(i));
        }

        assert_eq!(
            queue.merge(&StepPlan::new(&huge).unwrap(), None),
            Err(QueueError::CapacityExceeded {
                required: MAX_QUEUED_STEPS + 4
            })
        );
        assert_eq!(indices(&queue).as_slice(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_remove_range() {
        let mut queue = StepQueue::new();
        let steps = range(0, 9);
        queue.merge(&StepPlan::new(&steps).unwrap(), None).unwrap();

        queue.remove_range(0, 4);
        assert_eq!(queue.first_index(), Some(5));
        assert_eq!(queue.len(), 5);
        assert!(queue.get(4).is_none());

        // Out of bounds is ignored
        queue.remove_range(0, 2);
        queue.remove_range(20, 30);
        assert_eq!(queue.len(), 5);
    }

    #[test]
    fn test_gap_lookup() {
        let mut queue = StepQueue::new();
        let steps = [step(0), step(1), step(3)];
        queue.merge(&StepPlan::new(&steps).unwrap(), None).unwrap();

        assert!(queue.get(2).is_none());
        assert!(queue.get(3).is_some());
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_reset() {
        let mut queue = StepQueue::new();
        let steps = range(0, 3);
        queue.merge(&StepPlan::new(&steps).unwrap(), None).unwrap();

        queue.reset();
        assert!(queue.is_empty());
        assert_eq!(queue.first_index(), None);
    }
}
