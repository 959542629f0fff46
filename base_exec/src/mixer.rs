//! # Command Mixer
//!
//! Converts the four axis efforts into one effort per thruster. The vehicle has four vectored
//! horizontal thrusters and two vertical thrusters mounted in opposite directions.
//!
//! Each thruster effort is the dot product of a row of the mixing matrix with the effort vector,
//! clamped to `[-1, 1]`. No renormalisation is done, so a saturated channel loses the part of
//! the demand above the limit and axes are not prioritised against each other.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::msg::{ThrusterCmd, NUM_THRUSTERS};
use util::maths::clamp;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of effort axes
pub const NUM_AXES: usize = 4;

/// Mixing matrix, one row per thruster, columns are `[forward, strafe, yaw, vertical]`.
pub const MIX_MATRIX: [[f64; NUM_AXES]; NUM_THRUSTERS] = [
    [1.0, 1.0, 1.0, 0.0],
    [1.0, -1.0, -1.0, 0.0],
    [1.0, -1.0, 1.0, 0.0],
    [1.0, 1.0, -1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
    [0.0, 0.0, 0.0, -1.0],
];

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Normalised effort demanded on each axis, each in `[-1, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EffortVector {
    pub forward: f64,
    pub strafe: f64,
    pub yaw: f64,
    pub vertical: f64,
}

/// Allocates axis efforts to thrusters.
#[derive(Debug, Clone)]
pub struct Mixer {
    matrix: [[f64; NUM_AXES]; NUM_THRUSTERS],
}

/// Status report of one mixing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MixerReport {
    /// True for each channel whose raw value was outside `[-1, 1]` or not finite.
    pub saturated: [bool; NUM_THRUSTERS],
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl EffortVector {
    fn as_array(&self) -> [f64; NUM_AXES] {
        [self.forward, self.strafe, self.yaw, self.vertical]
    }
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new(MIX_MATRIX)
    }
}

impl Mixer {
    pub fn new(matrix: [[f64; NUM_AXES]; NUM_THRUSTERS]) -> Self {
        Self { matrix }
    }

    pub fn mix(&self, efforts: &EffortVector) -> (ThrusterCmd, MixerReport) {
        let axes = efforts.as_array();
        let mut cmd = ThrusterCmd::default();
        let mut report = MixerReport::default();

        for (i, row) in self.matrix.iter().enumerate() {
            // Axes a thruster does not respond to are skipped, so a NaN on one axis only
            // affects the thrusters it drives
            let raw: f64 = row
                .iter()
                .zip(axes.iter())
                .filter(|(m, _)| **m != 0.0)
                .map(|(m, e)| m * e)
                .sum();

            if raw.is_nan() {
                cmd.effort[i] = 0.0;
                report.saturated[i] = true;
                continue;
            }

            report.saturated[i] = raw.abs() > 1.0;
            cmd.effort[i] = clamp(raw, -1.0, 1.0);
        }

        (cmd, report)
    }
}

impl MixerReport {
    pub fn any_saturated(&self) -> bool {
        self.saturated.iter().any(|s| *s)
    }
}
