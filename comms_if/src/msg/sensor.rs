//! # Sensor samples

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::Quaternion;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A reading from the depth (barometer) sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthSample {
    /// Vertical position, increasing towards the surface.
    ///
    /// Units: meters
    pub depth_m: f64,
}

/// A reading from the orientation sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientationSample {
    /// Orientation of the vehicle body in the world frame.
    pub orientation: Quaternion,
}
