//! Step plan validation

use super::{Step, StepIndex};

/// Reasons a submitted step sequence is not a valid plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlanError {
    /// Step indices are not strictly increasing at this index
    NotAscending { index: StepIndex },
}

/// An ordered, validated view over a sequence of steps
///
/// Indices are strictly increasing. The empty plan is valid and means
/// "stop".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPlan<'a> {
    steps: &'a [Step],
}

impl<'a> StepPlan<'a> {
    /// Validate a step sequence
    pub fn new(steps: &'a [Step]) -> Result<Self, PlanError> {
        for pair in steps.windows(2) {
            if pair[1].index <= pair[0].index {
                return Err(PlanError::NotAscending {
                    index: pair[1].index,
                });
            }
        }
        Ok(Self { steps })
    }

    /// The stop sentinel
    pub const fn stop() -> Self {
        Self { steps: &[] }
    }

    /// Check if this is the stop sentinel
    pub fn is_stop(&self) -> bool {
        self.steps.is_empty()
    }

    /// Get the steps in index order
    pub fn steps(&self) -> &'a [Step] {
        self.steps
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the plan holds no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Lowest index in the plan
    pub fn first_index(&self) -> Option<StepIndex> {
        self.steps.first().map(|s| s.index)
    }

    /// Highest index in the plan
    pub fn last_index(&self) -> Option<StepIndex> {
        self.steps.last().map(|s| s.index)
    }

    /// Steps at or above `lower`
    pub fn from_index(&self, lower: StepIndex) -> &'a [Step] {
        let start = self.steps.partition_point(|s| s.index < lower);
        &self.steps[start..]
    }
}
