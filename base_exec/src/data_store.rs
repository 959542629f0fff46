//! # Data Store
//!
//! All state shared between the sensor, input and controller callbacks and the tick. A single
//! `DataStore` is owned by [`crate::base_ctrl::BaseCtrl`] behind one mutex.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::warn;
use util::maths::clamp;

use crate::{
    mixer::EffortVector,
    mode::{EffortAxis, EffortSource, OperatingMode},
    sensor_cache::SensorCache,
};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Global data store of the base controller.
#[derive(Debug, Clone, Default)]
pub struct DataStore {
    /// Current operating mode
    pub mode: OperatingMode,

    pub setpoints: ControlSetpoints,

    /// Efforts fed to the mixer on the next tick
    pub efforts: EffortVector,

    pub latches: TrimLatches,

    pub sensors: SensorCache,

    pub actuators: ActuatorState,

    // Monitoring counters
    /// Number of ticks already executed
    pub num_ticks: u64,
}

/// Targets of the closed-loop controllers.
///
/// A setpoint is only meaningful while its controller is enabled. It is left untouched, not
/// reset, when the controller is disabled.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlSetpoints {
    /// Units: radians
    pub yaw_rad: f64,

    /// Same vertical convention as the sensed depth, increasing towards the surface.
    ///
    /// Units: meters
    pub depth_m: f64,
}

/// Edge detection state of each trim control.
///
/// A latch is set while its control is held, so that a sustained press only fires once.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrimLatches {
    pub yaw: bool,
    pub depth: bool,
    pub tilt: bool,
    pub lights: bool,

    /// Depth hold and surface buttons, which retarget an active depth hold once per press
    pub depth_target: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActuatorState {
    /// Camera tilt, -1 (down) to +1 (up)
    pub camera_tilt: f64,

    /// Lights brightness, 0 (off) to 1 (full)
    pub lights_brightness: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DataStore {
    /// Apply an effort update from the given producer.
    ///
    /// The update only goes through if the current mode routes this axis to the producer,
    /// otherwise it is dropped and `false` is returned. Accepted values are limited to `[-1, 1]`
    /// and a NaN is stored as zero.
    pub fn apply_effort(&mut self, axis: EffortAxis, source: EffortSource, value: f64) -> bool {
        if !self.mode.authorises(axis, source) {
            return false;
        }

        let value = if value.is_nan() {
            warn!("NaN {:?} effort from {:?} replaced by zero", axis, source);
            0.0
        } else {
            clamp(value, -1.0, 1.0)
        };

        match axis {
            EffortAxis::Forward => self.efforts.forward = value,
            EffortAxis::Strafe => self.efforts.strafe = value,
            EffortAxis::Yaw => self.efforts.yaw = value,
            EffortAxis::Vertical => self.efforts.vertical = value,
        }

        true
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_apply_effort() {
        let mut ds = DataStore::default();

        // Nothing is accepted while disarmed
        assert!(!ds.apply_effort(EffortAxis::Forward, EffortSource::Operator, 0.5));
        assert_eq!(ds.efforts, EffortVector::default());

        ds.mode = OperatingMode::Manual;
        assert!(ds.apply_effort(EffortAxis::Forward, EffortSource::Operator, 0.5));
        assert!(ds.apply_effort(EffortAxis::Yaw, EffortSource::Operator, 2.0));
        assert!(!ds.apply_effort(EffortAxis::Yaw, EffortSource::YawCtrl, 0.1));
        assert!(!ds.apply_effort(EffortAxis::Vertical, EffortSource::DepthCtrl, 0.1));
        assert!(ds.apply_effort(EffortAxis::Vertical, EffortSource::Operator, std::f64::NAN));

        assert_eq!(
            ds.efforts,
            EffortVector { forward: 0.5, strafe: 0.0, yaw: 1.0, vertical: 0.0 }
        );
    }
}
