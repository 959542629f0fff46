//! # Actuator commands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of thrusters on the vehicle.
pub const NUM_THRUSTERS: usize = 6;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Effort demanded of each thruster.
///
/// The index order matches the thruster layout of the vehicle and must not be changed: indices 0
/// to 3 are the horizontal thrusters, 4 and 5 the vertical thrusters. Each effort is between -1
/// and +1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThrusterCmd {
    pub effort: [f64; NUM_THRUSTERS],
}

/// Camera tilt demand, between -1 (fully down) and +1 (fully up).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraTiltCmd {
    pub tilt: f64,
}

/// Lights brightness demand, between 0 (off) and 1 (full brightness).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LightsCmd {
    pub brightness: f64,
}
