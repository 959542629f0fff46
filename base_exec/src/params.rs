//! # Base Parameters
//!
//! Parameters of the base controller, loaded from `base.toml`. Every field has a default matching
//! the vehicle's tuned values, so a parameter file only needs to contain the values it changes.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;
use std::time::Duration;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the base controller.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BaseParams {

    /// Frequency at which the scheduler calls the tick.
    ///
    /// Units: hertz
    pub tick_frequency_hz: f64,

    // ---- DEAD BANDS ----

    /// Operator input axes with a magnitude below this value are treated as zero.
    pub input_dead_band: f64,

    /// Closed-loop controller efforts with a magnitude below this value are treated as zero.
    pub effort_dead_band: f64,

    // ---- TRIM ----

    /// Change in yaw setpoint for one press of the yaw trim.
    ///
    /// Units: radians
    pub yaw_trim_step_rad: f64,

    /// Change in depth setpoint for one press of the depth trim.
    ///
    /// Units: meters
    pub depth_trim_step_m: f64,

    /// Change in camera tilt for one press of tilt up or down. Tilt ranges from -1 to +1.
    pub tilt_trim_step: f64,

    /// Change in lights brightness for one press of bright or dim. Brightness ranges from 0 to 1.
    pub lights_trim_step: f64,

    /// Depth setpoint used by the surface shortcut.
    ///
    /// Units: meters
    pub surface_depth_m: f64,

    /// Role of each axis and button in an input sample.
    pub input_map: InputMap,

    /// Constants of the velocity estimate drag model.
    pub drag: DragParams,
}

/// Index of each axis and button role in an input sample.
///
/// Defaults match an Xbox style gamepad.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputMap {
    /// Left stick left/right, +1 is left
    pub axis_yaw: usize,
    /// Left stick up/down, +1 is forward
    pub axis_forward: usize,
    /// Right stick left/right, +1 is left
    pub axis_strafe: usize,
    /// Right stick up/down, +1 is ascend
    pub axis_vertical: usize,
    /// D-pad left/right, acts as two buttons, +1 is left
    pub axis_yaw_trim: usize,
    /// D-pad up/down, acts as two buttons, +1 is up and raises the depth setpoint
    pub axis_vertical_trim: usize,

    pub btn_disarm: usize,
    pub btn_arm: usize,
    pub btn_manual: usize,
    pub btn_stabilize: usize,
    pub btn_depth_hold: usize,
    pub btn_surface: usize,
    pub btn_tilt_up: usize,
    pub btn_tilt_down: usize,
    pub btn_lights_bright: usize,
    pub btn_lights_dim: usize,
}

/// Drag model constants.
///
/// The model balances thrust against drag, `drag = 1/2 * sigma * area * v^2 * drag_coef`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DragParams {
    /// Density of seawater divided by gravitational acceleration.
    ///
    /// Units: kg/m^3 / m/s^2
    pub sigma: f64,

    /// Cross-sectional area facing the direction of motion, taken as the same for forward and
    /// lateral motion.
    ///
    /// Units: meters^2
    pub rov_area_m2: f64,

    /// Drag coefficient of the vehicle body.
    pub rov_drag_coef: f64,

    /// Forward and lateral bollard thrust at full effort.
    ///
    /// Units: newtons
    pub max_thrust_xy_n: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Problems found when validating parameters.
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("{0} must be strictly positive, found {1}")]
    NotPositive(&'static str, f64),

    #[error("{0} must not be negative, found {1}")]
    Negative(&'static str, f64),

    #[error("A tick frequency of {0} Hz does not give a usable tick period")]
    InvalidTickPeriod(f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl BaseParams {
    /// Check the parameters are usable by the controller.
    pub fn validate(&self) -> Result<(), ParamsError> {
        let positive = [
            ("tick_frequency_hz", self.tick_frequency_hz),
            ("drag.sigma", self.drag.sigma),
            ("drag.rov_area_m2", self.drag.rov_area_m2),
            ("drag.rov_drag_coef", self.drag.rov_drag_coef),
        ];
        let non_negative = [
            ("input_dead_band", self.input_dead_band),
            ("effort_dead_band", self.effort_dead_band),
            ("yaw_trim_step_rad", self.yaw_trim_step_rad),
            ("depth_trim_step_m", self.depth_trim_step_m),
            ("tilt_trim_step", self.tilt_trim_step),
            ("lights_trim_step", self.lights_trim_step),
            ("drag.max_thrust_xy_n", self.drag.max_thrust_xy_n),
        ];

        for (name, val) in positive.iter() {
            // Written so that NaN is rejected too
            if !(*val > 0.0) {
                return Err(ParamsError::NotPositive(name, *val));
            }
        }
        for (name, val) in non_negative.iter() {
            if !(*val >= 0.0) {
                return Err(ParamsError::Negative(name, *val));
            }
        }

        self.tick_period()?;

        Ok(())
    }

    /// Period between two ticks as a duration.
    ///
    /// Fails if the period is zero or too long to be represented.
    pub fn tick_period(&self) -> Result<Duration, ParamsError> {
        match Duration::try_from_secs_f64(self.tick_period_s()) {
            Ok(d) if d > Duration::ZERO => Ok(d),
            _ => Err(ParamsError::InvalidTickPeriod(self.tick_frequency_hz)),
        }
    }

    /// Period between two ticks.
    ///
    /// Units: seconds
    pub fn tick_period_s(&self) -> f64 {
        1.0 / self.tick_frequency_hz
    }
}

impl Default for BaseParams {
    fn default() -> Self {
        Self {
            tick_frequency_hz: 100.0,
            input_dead_band: 0.05,
            effort_dead_band: 0.01,
            yaw_trim_step_rad: std::f64::consts::PI / 36.0,
            depth_trim_step_m: 0.1,
            tilt_trim_step: 0.2,
            lights_trim_step: 0.2,
            surface_depth_m: 0.0,
            input_map: InputMap::default(),
            drag: DragParams::default(),
        }
    }
}

impl Default for InputMap {
    fn default() -> Self {
        Self {
            axis_yaw: 0,
            axis_forward: 1,
            axis_strafe: 3,
            axis_vertical: 4,
            axis_yaw_trim: 6,
            axis_vertical_trim: 7,

            btn_manual: 0,        // A
            btn_surface: 1,       // B
            btn_stabilize: 2,     // X
            btn_depth_hold: 3,    // Y
            btn_tilt_down: 4,     // Left bumper
            btn_tilt_up: 5,       // Right bumper
            btn_disarm: 6,        // View
            btn_arm: 7,           // Menu
            btn_lights_bright: 9, // Left stick
            btn_lights_dim: 10,   // Right stick
        }
    }
}

impl Default for DragParams {
    fn default() -> Self {
        Self {
            sigma: 105.6,
            rov_area_m2: 0.0859,
            rov_drag_coef: 0.9,
            max_thrust_xy_n: 14.0,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let params: BaseParams = util::params::parse(
            "tick_frequency_hz = 50.0\n\
             [input_map]\n\
             btn_arm = 8\n\
             [drag]\n\
             max_thrust_xy_n = 20.0\n"
        ).unwrap();

        assert_eq!(params.tick_frequency_hz, 50.0);
        assert_eq!(params.tick_period_s(), 0.02);
        assert_eq!(params.input_map.btn_arm, 8);
        assert_eq!(params.input_map.btn_disarm, 6);
        assert_eq!(params.drag.max_thrust_xy_n, 20.0);
        assert_eq!(params.drag.sigma, 105.6);
        assert_eq!(params.input_dead_band, 0.05);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let mut params = BaseParams::default();
        assert!(params.validate().is_ok());

        params.tick_frequency_hz = 0.0;
        assert!(matches!(
            params.validate(),
            Err(ParamsError::NotPositive("tick_frequency_hz", _))
        ));

        params.tick_frequency_hz = 100.0;
        params.input_dead_band = -0.1;
        assert!(matches!(
            params.validate(),
            Err(ParamsError::Negative("input_dead_band", _))
        ));

        params.input_dead_band = 0.05;
        params.drag.rov_area_m2 = std::f64::NAN;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_tick_period_bounds() {
        let mut params = BaseParams::default();
        assert_eq!(params.tick_period().unwrap(), Duration::from_millis(10));

        // Positive but the period overflows a duration
        params.tick_frequency_hz = 1e-300;
        assert!(matches!(
            params.validate(),
            Err(ParamsError::InvalidTickPeriod(_))
        ));

        // Period rounds down to nothing
        params.tick_frequency_hz = 1e300;
        assert!(matches!(
            params.validate(),
            Err(ParamsError::InvalidTickPeriod(_))
        ));

        params.tick_frequency_hz = std::f64::INFINITY;
        assert!(params.validate().is_err());
    }
}
