//! # Odometry telemetry

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::{Quaternion, Vec3};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Covariance used for both pose and twist.
///
/// Dimension order is `(x, y, z, roll, pitch, yaw)`. Roll and pitch are assumed to be fixed, which
/// is expressed as maximal variance on their diagonal entries.
pub const ODOM_COVARIANCE: [[f64; 6]; 6] = [
    [1e-5, 1e-5, 1e-5, 0.0, 0.0, 1e-5],
    [1e-5, 1e-5, 1e-5, 0.0, 0.0, 1e-5],
    [1e-5, 1e-5, 1e-5, 0.0, 0.0, 1e-5],
    [0.0, 0.0, 0.0, f64::MAX, 0.0, 0.0],
    [0.0, 0.0, 0.0, 0.0, f64::MAX, 0.0],
    [1e-5, 1e-5, 1e-5, 0.0, 0.0, 1e-5],
];

/// Frame the odometry is expressed in.
pub const ODOM_FRAME_ID: &str = "odom";

/// Frame of the vehicle body.
pub const BASE_FRAME_ID: &str = "base_link";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Estimated pose and velocity of the vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Odometry {
    /// Time of the estimate.
    ///
    /// Units: seconds
    pub stamp_s: f64,

    pub frame_id: String,

    pub child_frame_id: String,

    pub pose: PoseWithCovariance,

    pub twist: TwistWithCovariance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseWithCovariance {
    /// Units: meters
    pub position: Vec3,

    pub orientation: Quaternion,

    pub covariance: [[f64; 6]; 6],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwistWithCovariance {
    /// Units: meters/second
    pub linear: Vec3,

    /// Units: radians/second
    pub angular: Vec3,

    pub covariance: [[f64; 6]; 6],
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for Odometry {
    fn default() -> Self {
        Self {
            stamp_s: 0.0,
            frame_id: String::from(ODOM_FRAME_ID),
            child_frame_id: String::from(BASE_FRAME_ID),
            pose: PoseWithCovariance {
                position: Vec3::default(),
                orientation: Quaternion::default(),
                covariance: ODOM_COVARIANCE,
            },
            twist: TwistWithCovariance {
                linear: Vec3::default(),
                angular: Vec3::default(),
                covariance: ODOM_COVARIANCE,
            },
        }
    }
}
