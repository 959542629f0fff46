//! # Operator input samples

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// One sample from the operator's input device (gamepad).
///
/// The role of each axis and button is given by its index, see `InputMap` in the base executable.
/// Axes are between -1 and +1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSample {
    pub axes: Vec<f64>,
    pub buttons: Vec<bool>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl InputSample {
    /// Value of the axis at `index`, or 0 (neutral) if the sample has no such axis.
    pub fn axis(&self, index: usize) -> f64 {
        self.axes.get(index).copied().unwrap_or(0.0)
    }

    /// State of the button at `index`, or `false` (released) if the sample has no such button.
    pub fn button(&self, index: usize) -> bool {
        self.buttons.get(index).copied().unwrap_or(false)
    }
}
