//! Step model
//!
//! A step is the atomic unit of locomotion handed to the walking engine.
//! The controller only ever looks at the index; everything else is carried
//! through untouched.

pub mod plan;

pub use plan::{PlanError, StepPlan};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Zero-based position of a step within its plan
pub type StepIndex = u32;

/// Which foot performs the step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Foot {
    #[default]
    Left,
    Right,
}

impl Foot {
    /// Get the other foot
    pub fn opposite(self) -> Self {
        match self {
            Foot::Left => Foot::Right,
            Foot::Right => Foot::Left,
        }
    }
}

/// Target foot pose in the plan frame
///
/// Fixed point: positions in millimetres, yaw in milliradians.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pose {
    pub x_mm: i32,
    pub y_mm: i32,
    pub z_mm: i32,
    pub yaw_mrad: i32,
}

/// A single indexed step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Step {
    /// Position within the plan
    pub index: StepIndex,
    /// Swing foot
    pub foot: Foot,
    /// Target pose of the swing foot
    pub pose: Pose,
    /// Apex height of the swing trajectory (mm)
    pub swing_height_mm: u16,
    /// Nominal execution time (ms)
    pub duration_ms: u32,
}

impl Step {
    /// Default swing apex height (mm)
    pub const DEFAULT_SWING_HEIGHT_MM: u16 = 100;

    /// Default step duration (ms)
    pub const DEFAULT_DURATION_MS: u32 = 800;

    /// Create a step with default swing parameters
    pub const fn new(index: StepIndex, foot: Foot, pose: Pose) -> Self {
        Self {
            index,
            foot,
            pose,
            swing_height_mm: Self::DEFAULT_SWING_HEIGHT_MM,
            duration_ms: Self::DEFAULT_DURATION_MS,
        }
    }
}
