//! # Input Mapper
//!
//! Turns operator input samples into mode changes, trims and open-loop efforts.
//!
//! Each sample is processed in a fixed order:
//!
//! 1. Disarm, which wins over everything else in the sample, then arm.
//! 2. While disarmed nothing further is processed.
//! 3. Mode selection, by priority manual, stabilize, depth hold, surface. A held depth hold or
//!    surface button only retargets an active depth hold once.
//! 4. Yaw trim, in stabilize and depth hold.
//! 5. Depth trim, in depth hold.
//! 6. Camera tilt trim.
//! 7. Lights trim.
//! 8. Thruster axes, each routed according to the mode.
//!
//! Trims are edge triggered: holding a trim control produces a single step, the control must be
//! released before it fires again.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::msg::{CameraTiltCmd, InputSample, LightsCmd, OutboundMsg};
use log::debug;
use util::maths::{clamp, dead_band};

use crate::{
    data_store::DataStore,
    mode::{EffortAxis, EffortSource, OperatingMode},
    params::{BaseParams, InputMap},
    sink::Outbox,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct InputMapper {
    map: InputMap,
    input_dead_band: f64,
    yaw_trim_step_rad: f64,
    depth_trim_step_m: f64,
    tilt_trim_step: f64,
    lights_trim_step: f64,
    surface_depth_m: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl InputMapper {
    pub fn new(params: &BaseParams) -> Self {
        Self {
            map: params.input_map.clone(),
            input_dead_band: params.input_dead_band,
            yaw_trim_step_rad: params.yaw_trim_step_rad,
            depth_trim_step_m: params.depth_trim_step_m,
            tilt_trim_step: params.tilt_trim_step,
            lights_trim_step: params.lights_trim_step,
            surface_depth_m: params.surface_depth_m,
        }
    }

    /// Process one input sample.
    pub fn process(&self, ds: &mut DataStore, sample: &InputSample, outbox: &mut Outbox) {
        let map = &self.map;

        // ---- ARMING ----

        if sample.button(map.btn_disarm) {
            ds.set_mode(OperatingMode::Disarmed, None, outbox);
            return;
        }

        if sample.button(map.btn_arm) && ds.mode == OperatingMode::Disarmed {
            ds.set_mode(OperatingMode::Manual, None, outbox);
        }

        if ds.mode == OperatingMode::Disarmed {
            return;
        }

        // ---- MODE SELECTION ----

        // Entering depth hold follows the buttons, retargeting an active hold needs a new press
        let depth_hold = sample.button(map.btn_depth_hold);
        let surface = sample.button(map.btn_surface);
        let new_target = rising_edge(&mut ds.latches.depth_target, depth_hold || surface);
        let may_target = new_target || ds.mode != OperatingMode::DepthHold;

        if sample.button(map.btn_manual) {
            ds.set_mode(OperatingMode::Manual, None, outbox);
        } else if sample.button(map.btn_stabilize) {
            ds.set_mode(OperatingMode::Stabilize, None, outbox);
        } else if depth_hold {
            if may_target {
                let depth_m = ds.sensors.depth_m;
                ds.set_mode(OperatingMode::DepthHold, Some(depth_m), outbox);
            }
        } else if surface && may_target {
            ds.set_mode(OperatingMode::DepthHold, Some(self.surface_depth_m), outbox);
        }

        // ---- TRIMS ----

        self.trim_yaw(ds, sample, outbox);
        self.trim_depth(ds, sample, outbox);
        self.trim_tilt(ds, sample, outbox);
        self.trim_lights(ds, sample, outbox);

        // ---- EFFORTS ----

        let axes = [
            (EffortAxis::Forward, map.axis_forward),
            (EffortAxis::Strafe, map.axis_strafe),
            (EffortAxis::Yaw, map.axis_yaw),
            (EffortAxis::Vertical, map.axis_vertical),
        ];

        for (axis, index) in axes.iter() {
            let value = dead_band(sample.axis(*index), self.input_dead_band);
            ds.apply_effort(*axis, EffortSource::Operator, value);
        }
    }

    fn trim_yaw(&self, ds: &mut DataStore, sample: &InputSample, outbox: &mut Outbox) {
        let trim = dead_band(sample.axis(self.map.axis_yaw_trim), self.input_dead_band);

        if rising_edge(&mut ds.latches.yaw, trim != 0.0) && ds.mode.yaw_ctrl_active() {
            ds.setpoints.yaw_rad += self.yaw_trim_step_rad.copysign(trim);
            outbox.push(OutboundMsg::YawSetpoint(ds.setpoints.yaw_rad));
            debug!("Yaw setpoint trimmed to {:.3} rad", ds.setpoints.yaw_rad);
        }
    }

    fn trim_depth(&self, ds: &mut DataStore, sample: &InputSample, outbox: &mut Outbox) {
        let trim = dead_band(sample.axis(self.map.axis_vertical_trim), self.input_dead_band);

        if rising_edge(&mut ds.latches.depth, trim != 0.0) && ds.mode.depth_ctrl_active() {
            ds.setpoints.depth_m += self.depth_trim_step_m.copysign(trim);
            outbox.push(OutboundMsg::DepthSetpoint(ds.setpoints.depth_m));
            debug!("Depth setpoint trimmed to {:.2} m", ds.setpoints.depth_m);
        }
    }

    fn trim_tilt(&self, ds: &mut DataStore, sample: &InputSample, outbox: &mut Outbox) {
        let up = sample.button(self.map.btn_tilt_up);
        let down = sample.button(self.map.btn_tilt_down);

        if rising_edge(&mut ds.latches.tilt, up || down) {
            let step = if up { self.tilt_trim_step } else { -self.tilt_trim_step };

            ds.actuators.camera_tilt = clamp(ds.actuators.camera_tilt + step, -1.0, 1.0);
            outbox.push(OutboundMsg::CameraTilt(CameraTiltCmd {
                tilt: ds.actuators.camera_tilt,
            }));
            debug!("Camera tilt set to {:.1}", ds.actuators.camera_tilt);
        }
    }

    fn trim_lights(&self, ds: &mut DataStore, sample: &InputSample, outbox: &mut Outbox) {
        let bright = sample.button(self.map.btn_lights_bright);
        let dim = sample.button(self.map.btn_lights_dim);

        if rising_edge(&mut ds.latches.lights, bright || dim) {
            let step = if bright { self.lights_trim_step } else { -self.lights_trim_step };

            ds.actuators.lights_brightness =
                clamp(ds.actuators.lights_brightness + step, 0.0, 1.0);
            outbox.push(OutboundMsg::Lights(LightsCmd {
                brightness: ds.actuators.lights_brightness,
            }));
            debug!("Lights set to {:.1}", ds.actuators.lights_brightness);
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Update a trim latch, returning true if the control fires on this sample.
///
/// The control fires when it becomes active while the latch is clear. The latch then stays set
/// until the control is released.
pub fn rising_edge(latch: &mut bool, active: bool) -> bool {
    if active {
        let fire = !*latch;
        *latch = true;
        fire
    } else {
        *latch = false;
        false
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mixer::EffortVector;
    use std::f64::consts::PI;

    /// Build a sample from the active axes and pressed buttons, using the default map layout.
    fn sample(axes: &[(usize, f64)], buttons: &[usize]) -> InputSample {
        let mut s = InputSample {
            axes: vec![0.0; 8],
            buttons: vec![false; 11],
        };
        for (i, v) in axes.iter() {
            s.axes[*i] = *v;
        }
        for b in buttons.iter() {
            s.buttons[*b] = true;
        }
        s
    }

    fn armed(mode: OperatingMode) -> DataStore {
        let mut ds = DataStore::default();
        ds.set_mode(mode, None, &mut Outbox::default());
        ds
    }

    #[test]
    fn test_rising_edge() {
        let mut latch = false;
        let fired: Vec<bool> = [true, true, true, false, true, false, false]
            .iter()
            .map(|a| rising_edge(&mut latch, *a))
            .collect();

        assert_eq!(fired, vec![true, false, false, false, true, false, false]);
    }

    #[test]
    fn test_arming() {
        let mapper = InputMapper::new(&BaseParams::default());
        let mut ds = DataStore::default();
        let mut outbox = Outbox::default();

        // Input ignored while disarmed
        mapper.process(&mut ds, &sample(&[(1, 0.8)], &[2]), &mut outbox);
        assert_eq!(ds.mode, OperatingMode::Disarmed);
        assert_eq!(ds.efforts, EffortVector::default());

        // Arm and drive in the same sample
        mapper.process(&mut ds, &sample(&[(1, 0.8)], &[7]), &mut outbox);
        assert_eq!(ds.mode, OperatingMode::Manual);
        assert_eq!(ds.efforts.forward, 0.8);

        // Disarm wins over arm
        mapper.process(&mut ds, &sample(&[(1, 0.8)], &[6, 7]), &mut outbox);
        assert_eq!(ds.mode, OperatingMode::Disarmed);
        assert_eq!(ds.efforts, EffortVector::default());
    }

    #[test]
    fn test_mode_priority() {
        let mapper = InputMapper::new(&BaseParams::default());
        let mut outbox = Outbox::default();

        let mut ds = armed(OperatingMode::Stabilize);
        mapper.process(&mut ds, &sample(&[], &[0, 2]), &mut outbox);
        assert_eq!(ds.mode, OperatingMode::Manual);

        mapper.process(&mut ds, &sample(&[], &[1, 2, 3]), &mut outbox);
        assert_eq!(ds.mode, OperatingMode::Stabilize);

        ds.sensors.depth_m = 7.5;
        mapper.process(&mut ds, &sample(&[], &[1, 3]), &mut outbox);
        assert_eq!(ds.mode, OperatingMode::DepthHold);
        assert_eq!(ds.setpoints.depth_m, 7.5);

        mapper.process(&mut ds, &sample(&[], &[]), &mut outbox);
        mapper.process(&mut ds, &sample(&[], &[1]), &mut outbox);
        assert_eq!(ds.mode, OperatingMode::DepthHold);
        assert_eq!(ds.setpoints.depth_m, 0.0);
    }

    #[test]
    fn test_yaw_trim() {
        let params = BaseParams::default();
        let mapper = InputMapper::new(&params);
        let mut ds = armed(OperatingMode::Stabilize);
        let mut outbox = Outbox::default();

        // Held for several samples, one step only
        for _ in 0..5 {
            mapper.process(&mut ds, &sample(&[(6, 1.0)], &[]), &mut outbox);
        }
        assert!((ds.setpoints.yaw_rad - PI / 36.0).abs() < 1e-12);
        assert_eq!(outbox.len(), 1);

        // Release then press the other way
        mapper.process(&mut ds, &sample(&[], &[]), &mut outbox);
        mapper.process(&mut ds, &sample(&[(6, -1.0)], &[]), &mut outbox);
        assert!(ds.setpoints.yaw_rad.abs() < 1e-12);

        // Ignored in manual
        let mut ds = armed(OperatingMode::Manual);
        mapper.process(&mut ds, &sample(&[(6, 1.0)], &[]), &mut outbox);
        assert_eq!(ds.setpoints.yaw_rad, 0.0);
    }

    #[test]
    fn test_depth_trim() {
        let mapper = InputMapper::new(&BaseParams::default());
        let mut outbox = Outbox::default();

        let mut ds = armed(OperatingMode::Stabilize);
        mapper.process(&mut ds, &sample(&[(7, -1.0)], &[]), &mut outbox);
        assert_eq!(ds.setpoints.depth_m, 0.0);

        let mut ds = DataStore::default();
        ds.set_mode(OperatingMode::DepthHold, Some(2.0), &mut outbox);

        mapper.process(&mut ds, &sample(&[(7, -1.0)], &[]), &mut outbox);
        mapper.process(&mut ds, &sample(&[(7, -1.0)], &[]), &mut outbox);
        assert!((ds.setpoints.depth_m - 1.9).abs() < 1e-12);

        // Inside the dead band counts as released
        mapper.process(&mut ds, &sample(&[(7, 0.02)], &[]), &mut outbox);
        mapper.process(&mut ds, &sample(&[(7, 1.0)], &[]), &mut outbox);
        assert!((ds.setpoints.depth_m - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_held_depth_hold_with_depth_trim() {
        let mapper = InputMapper::new(&BaseParams::default());
        let mut ds = armed(OperatingMode::Manual);
        let mut outbox = Outbox::default();
        ds.sensors.depth_m = 2.0;

        for _ in 0..5 {
            mapper.process(&mut ds, &sample(&[(7, 1.0)], &[3]), &mut outbox);
        }

        let setpoints: Vec<f64> = outbox
            .iter()
            .filter_map(|m| match m {
                OutboundMsg::DepthSetpoint(d) => Some(*d),
                _ => None,
            })
            .collect();
        assert_eq!(setpoints.len(), 2);
        assert_eq!(setpoints[0], 2.0);
        assert!((setpoints[1] - 2.1).abs() < 1e-12);
        assert!((ds.setpoints.depth_m - 2.1).abs() < 1e-12);

        // A new press captures the current depth again, the trim still held does not fire
        ds.sensors.depth_m = 2.4;
        mapper.process(&mut ds, &sample(&[(7, 1.0)], &[]), &mut outbox);
        mapper.process(&mut ds, &sample(&[(7, 1.0)], &[3]), &mut outbox);
        assert_eq!(ds.mode, OperatingMode::DepthHold);
        assert_eq!(ds.setpoints.depth_m, 2.4);
    }

    #[test]
    fn test_held_surface_retargets_once() {
        let mapper = InputMapper::new(&BaseParams::default());
        let mut ds = DataStore::default();
        let mut outbox = Outbox::default();
        ds.set_mode(OperatingMode::DepthHold, Some(3.0), &mut outbox);

        mapper.process(&mut ds, &sample(&[], &[1]), &mut outbox);
        assert_eq!(ds.setpoints.depth_m, 0.0);

        // Trim while surface is still held
        mapper.process(&mut ds, &sample(&[(7, -1.0)], &[1]), &mut outbox);
        mapper.process(&mut ds, &sample(&[(7, -1.0)], &[1]), &mut outbox);
        assert!((ds.setpoints.depth_m + 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_tilt_and_lights() {
        let mapper = InputMapper::new(&BaseParams::default());
        let mut ds = armed(OperatingMode::Manual);
        let mut outbox = Outbox::default();

        // Tilt up is pressed and released until it saturates
        for _ in 0..8 {
            mapper.process(&mut ds, &sample(&[], &[5]), &mut outbox);
            mapper.process(&mut ds, &sample(&[], &[]), &mut outbox);
        }
        assert_eq!(ds.actuators.camera_tilt, 1.0);

        // Both pressed, up wins
        let mut ds = armed(OperatingMode::Manual);
        mapper.process(&mut ds, &sample(&[], &[4, 5]), &mut outbox);
        assert!((ds.actuators.camera_tilt - 0.2).abs() < 1e-12);

        // Lights never go below zero
        mapper.process(&mut ds, &sample(&[], &[10]), &mut outbox);
        assert_eq!(ds.actuators.lights_brightness, 0.0);
        mapper.process(&mut ds, &sample(&[], &[]), &mut outbox);
        mapper.process(&mut ds, &sample(&[], &[9]), &mut outbox);
        mapper.process(&mut ds, &sample(&[], &[9]), &mut outbox);
        assert!((ds.actuators.lights_brightness - 0.2).abs() < 1e-12);

        // Each firing publishes the new value
        let tilts = outbox
            .iter()
            .filter(|m| matches!(m, OutboundMsg::CameraTilt(_)))
            .count();
        assert_eq!(tilts, 9);
    }

    #[test]
    fn test_axis_routing() {
        let mapper = InputMapper::new(&BaseParams::default());
        let mut outbox = Outbox::default();
        let all_axes = sample(&[(0, 0.3), (1, 0.8), (3, -0.04), (4, 0.5)], &[]);

        let mut ds = armed(OperatingMode::Manual);
        mapper.process(&mut ds, &all_axes, &mut outbox);
        assert_eq!(
            ds.efforts,
            EffortVector { forward: 0.8, strafe: 0.0, yaw: 0.3, vertical: 0.5 }
        );

        let mut ds = armed(OperatingMode::Stabilize);
        mapper.process(&mut ds, &all_axes, &mut outbox);
        assert_eq!(
            ds.efforts,
            EffortVector { forward: 0.8, strafe: 0.0, yaw: 0.0, vertical: 0.5 }
        );

        let mut ds = armed(OperatingMode::DepthHold);
        mapper.process(&mut ds, &all_axes, &mut outbox);
        assert_eq!(
            ds.efforts,
            EffortVector { forward: 0.8, strafe: 0.0, yaw: 0.0, vertical: 0.0 }
        );
    }

    #[test]
    fn test_short_sample_is_neutral() {
        let mapper = InputMapper::new(&BaseParams::default());
        let mut ds = armed(OperatingMode::Manual);
        ds.efforts.forward = 0.6;

        let empty = InputSample { axes: vec![], buttons: vec![] };
        mapper.process(&mut ds, &empty, &mut Outbox::default());

        assert_eq!(ds.mode, OperatingMode::Manual);
        assert_eq!(ds.efforts, EffortVector::default());
    }
}
