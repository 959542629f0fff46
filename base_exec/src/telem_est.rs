//! # Telemetry Estimator
//!
//! Produces the odometry estimate published every tick.
//!
//! Planar velocity comes from a quasi-static drag balance: the thrust demanded on an axis is
//! assumed to be exactly cancelled by drag, so
//!
//! ```text
//! thrust = effort * max_thrust
//! v      = sign(thrust) * sqrt(2 * |thrust| / (sigma * area * drag_coef))
//! ```
//!
//! There is no acceleration term and nothing is integrated. Planar position and orientation are
//! not estimated and tether drag is not modelled. Depth comes straight from the sensor cache.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::msg::Odometry;
use util::maths::signed_sqrt;

use crate::{mixer::EffortVector, params::DragParams, sensor_cache::SensorCache};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TelemEst {
    params: DragParams,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TelemEst {
    pub fn new(params: &DragParams) -> Self {
        Self {
            params: params.clone(),
        }
    }

    /// Steady state speed reached under the given planar effort.
    ///
    /// Units: meters/second
    pub fn velocity_ms(&self, effort: f64) -> f64 {
        let thrust_n = effort * self.params.max_thrust_xy_n;

        signed_sqrt(
            2.0 * thrust_n
                / (self.params.sigma * self.params.rov_area_m2 * self.params.rov_drag_coef),
        )
    }

    /// Build the odometry message for the current efforts and sensor values.
    ///
    /// Velocity `x` is lateral (strafe) and velocity `y` is forward.
    pub fn estimate(&self, efforts: &EffortVector, sensors: &SensorCache, stamp_s: f64) -> Odometry {
        let mut odom = Odometry::default();

        odom.stamp_s = stamp_s;
        odom.pose.position.z = sensors.depth_m;
        odom.twist.linear.x = self.velocity_ms(efforts.strafe);
        odom.twist.linear.y = self.velocity_ms(efforts.forward);

        odom
    }
}
