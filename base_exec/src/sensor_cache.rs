//! # Sensor Cache
//!
//! Latest sensed depth and yaw. Only the sensor callbacks write here, everything else reads the
//! cached values. If a sensor stops publishing the last value is kept indefinitely.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::msg::{DepthSample, OrientationSample, Quaternion};
use log::warn;
use nalgebra::UnitQuaternion;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorCache {
    /// Vertical position of the vehicle, increasing towards the surface.
    ///
    /// Units: meters
    pub depth_m: f64,

    /// Units: radians
    pub yaw_rad: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SensorCache {
    pub fn update_depth(&mut self, sample: &DepthSample) {
        self.depth_m = sample.depth_m;
    }

    /// Extract yaw from the orientation and cache it.
    ///
    /// Returns `false` if the quaternion cannot be normalised, in which case the previous yaw is
    /// kept.
    pub fn update_orientation(&mut self, sample: &OrientationSample) -> bool {
        match yaw_from_quaternion(&sample.orientation) {
            Some(yaw) => {
                self.yaw_rad = yaw;
                true
            }
            None => {
                warn!(
                    "Ignoring orientation sample with degenerate quaternion {:?}",
                    sample.orientation
                );
                false
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Yaw angle of an orientation, from a roll-pitch-yaw decomposition.
///
/// Returns `None` for a zero or non-finite quaternion.
pub fn yaw_from_quaternion(q: &Quaternion) -> Option<f64> {
    let q = nalgebra::Quaternion::new(q.w, q.x, q.y, q.z);
    let norm = q.norm();

    if !norm.is_finite() || norm < std::f64::EPSILON {
        return None;
    }

    let (_roll, _pitch, yaw) = UnitQuaternion::from_quaternion(q).euler_angles();

    Some(yaw)
}
