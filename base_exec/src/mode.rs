//! # Mode State Machine
//!
//! The vehicle is always in exactly one [`OperatingMode`]. The mode decides which producer drives
//! each effort axis and which closed-loop controllers are enabled.
//!
//! | Mode        | Forward/Strafe | Yaw        | Vertical   | Controllers  |
//! |-------------|----------------|------------|------------|--------------|
//! | `Disarmed`  | -              | -          | -          | none         |
//! | `Manual`    | operator       | operator   | operator   | none         |
//! | `Stabilize` | operator       | yaw ctrl   | operator   | yaw          |
//! | `DepthHold` | operator       | yaw ctrl   | depth ctrl | yaw, depth   |
//!
//! Controller enable and disable messages are emitted on transitions only, so a controller sees
//! exactly one enable per activation.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::msg::OutboundMsg;
use log::{info, trace};

use crate::{data_store::DataStore, mixer::EffortVector, sink::Outbox};

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum OperatingMode {
    /// Thrusters off, operator input other than arm is ignored
    Disarmed,

    /// Open-loop control of all axes
    Manual,

    /// Heading held by the yaw controller
    Stabilize,

    /// Heading and depth held by the yaw and depth controllers
    DepthHold,
}

/// An axis of the effort vector.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EffortAxis {
    Forward,
    Strafe,
    Yaw,
    Vertical,
}

/// Producers of effort updates.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EffortSource {
    Operator,
    YawCtrl,
    DepthCtrl,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for OperatingMode {
    fn default() -> Self {
        OperatingMode::Disarmed
    }
}

impl OperatingMode {
    /// The producer driving `axis` in this mode, `None` if the axis is not driven at all.
    pub fn effort_source(self, axis: EffortAxis) -> Option<EffortSource> {
        use EffortAxis::*;
        use OperatingMode::*;

        match (self, axis) {
            (Disarmed, _) => None,
            (_, Forward) | (_, Strafe) => Some(EffortSource::Operator),
            (Manual, Yaw) => Some(EffortSource::Operator),
            (Stabilize, Yaw) | (DepthHold, Yaw) => Some(EffortSource::YawCtrl),
            (Manual, Vertical) | (Stabilize, Vertical) => Some(EffortSource::Operator),
            (DepthHold, Vertical) => Some(EffortSource::DepthCtrl),
        }
    }

    /// True if `source` may update `axis` in this mode.
    pub fn authorises(self, axis: EffortAxis, source: EffortSource) -> bool {
        self.effort_source(axis) == Some(source)
    }

    pub fn yaw_ctrl_active(self) -> bool {
        matches!(self, OperatingMode::Stabilize | OperatingMode::DepthHold)
    }

    pub fn depth_ctrl_active(self) -> bool {
        self == OperatingMode::DepthHold
    }
}

impl DataStore {
    /// Change the operating mode.
    ///
    /// `depth_setpoint_m` is only used when the target is `DepthHold`, where it defaults to 0.
    /// Messages resulting from the transition are pushed into `outbox`.
    ///
    /// Requesting the current mode again does nothing, except for:
    /// - `DepthHold`, which retargets the depth controller without touching the yaw controller or
    ///   the trim latches,
    /// - `Disarmed`, which zeros the efforts again.
    pub fn set_mode(
        &mut self,
        target: OperatingMode,
        depth_setpoint_m: Option<f64>,
        outbox: &mut Outbox,
    ) {
        let prev = self.mode;

        if prev == target {
            match target {
                OperatingMode::DepthHold => {
                    self.set_depth_target(depth_setpoint_m, outbox);
                    info!(
                        "Depth hold target changed to {:.2} m",
                        self.setpoints.depth_m
                    );
                }
                OperatingMode::Disarmed => self.efforts = EffortVector::default(),
                _ => trace!("Already in {:?}", target),
            }
            return;
        }

        self.mode = target;

        // ---- DEPTH CONTROLLER ----

        if target.depth_ctrl_active() {
            outbox.push(OutboundMsg::DepthCtrlEnable(true));
            self.set_depth_target(depth_setpoint_m, outbox);
            self.latches.depth = false;
        } else if prev.depth_ctrl_active() {
            outbox.push(OutboundMsg::DepthCtrlEnable(false));
        }

        // ---- YAW CONTROLLER ----

        if target.yaw_ctrl_active() {
            if !prev.yaw_ctrl_active() {
                outbox.push(OutboundMsg::YawCtrlEnable(true));
            }

            // Hold the heading the vehicle has at the moment of entry
            self.setpoints.yaw_rad = self.sensors.yaw_rad;
            outbox.push(OutboundMsg::YawSetpoint(self.setpoints.yaw_rad));
            self.latches.yaw = false;
        } else if prev.yaw_ctrl_active() {
            outbox.push(OutboundMsg::YawCtrlEnable(false));
        }

        // ---- EFFORTS ----

        if target == OperatingMode::Disarmed {
            self.efforts = EffortVector::default();
        }

        match target {
            OperatingMode::Stabilize => info!(
                "Mode {:?} -> {:?}, holding yaw {:.3} rad",
                prev, target, self.setpoints.yaw_rad
            ),
            OperatingMode::DepthHold => info!(
                "Mode {:?} -> {:?}, holding yaw {:.3} rad and depth {:.2} m",
                prev, target, self.setpoints.yaw_rad, self.setpoints.depth_m
            ),
            _ => info!("Mode {:?} -> {:?}", prev, target),
        }
    }

    fn set_depth_target(&mut self, depth_setpoint_m: Option<f64>, outbox: &mut Outbox) {
        self.setpoints.depth_m = depth_setpoint_m.unwrap_or(0.0);
        outbox.push(OutboundMsg::DepthSetpoint(self.setpoints.depth_m));
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use OperatingMode::*;

    fn msgs(outbox: &Outbox) -> Vec<OutboundMsg> {
        outbox.iter().cloned().collect()
    }

    #[test]
    fn test_routing_table() {
        assert_eq!(Disarmed.effort_source(EffortAxis::Forward), None);
        assert!(Manual.authorises(EffortAxis::Yaw, EffortSource::Operator));
        assert!(!Manual.authorises(EffortAxis::Yaw, EffortSource::YawCtrl));
        assert!(Stabilize.authorises(EffortAxis::Yaw, EffortSource::YawCtrl));
        assert!(Stabilize.authorises(EffortAxis::Vertical, EffortSource::Operator));
        assert!(!Stabilize.authorises(EffortAxis::Vertical, EffortSource::DepthCtrl));
        assert!(DepthHold.authorises(EffortAxis::Vertical, EffortSource::DepthCtrl));
        assert!(DepthHold.authorises(EffortAxis::Strafe, EffortSource::Operator));
        assert!(!DepthHold.authorises(EffortAxis::Forward, EffortSource::YawCtrl));
    }

    #[test]
    fn test_enter_and_leave_depth_hold() {
        let mut ds = DataStore::default();
        ds.sensors.yaw_rad = 0.8;
        ds.latches.yaw = true;
        ds.latches.depth = true;

        let mut outbox = Outbox::default();
        ds.set_mode(Manual, None, &mut outbox);
        assert!(outbox.is_empty());

        ds.set_mode(DepthHold, Some(2.5), &mut outbox);
        assert_eq!(
            msgs(&outbox),
            vec![
                OutboundMsg::DepthCtrlEnable(true),
                OutboundMsg::DepthSetpoint(2.5),
                OutboundMsg::YawCtrlEnable(true),
                OutboundMsg::YawSetpoint(0.8),
            ]
        );
        assert_eq!(ds.setpoints.yaw_rad, 0.8);
        assert_eq!(ds.setpoints.depth_m, 2.5);
        assert!(!ds.latches.yaw);
        assert!(!ds.latches.depth);

        let mut outbox = Outbox::default();
        ds.set_mode(Manual, None, &mut outbox);
        assert_eq!(
            msgs(&outbox),
            vec![
                OutboundMsg::DepthCtrlEnable(false),
                OutboundMsg::YawCtrlEnable(false),
            ]
        );

        // Setpoints are stale but kept
        assert_eq!(ds.setpoints.depth_m, 2.5);
    }

    #[test]
    fn test_stabilize_to_depth_hold_keeps_yaw_enabled() {
        let mut ds = DataStore::default();
        let mut outbox = Outbox::default();

        ds.sensors.yaw_rad = 0.1;
        ds.set_mode(Stabilize, None, &mut outbox);

        let mut outbox = Outbox::default();
        ds.sensors.yaw_rad = 0.2;
        ds.set_mode(DepthHold, None, &mut outbox);

        assert_eq!(
            msgs(&outbox),
            vec![
                OutboundMsg::DepthCtrlEnable(true),
                OutboundMsg::DepthSetpoint(0.0),
                OutboundMsg::YawSetpoint(0.2),
            ]
        );

        let mut outbox = Outbox::default();
        ds.set_mode(Stabilize, None, &mut outbox);
        assert_eq!(
            msgs(&outbox),
            vec![OutboundMsg::DepthCtrlEnable(false), OutboundMsg::YawSetpoint(0.2)]
        );
    }

    #[test]
    fn test_repeat_requests() {
        let mut ds = DataStore::default();
        let mut outbox = Outbox::default();

        ds.sensors.yaw_rad = 1.0;
        ds.set_mode(DepthHold, Some(1.0), &mut outbox);

        let mut outbox = Outbox::default();
        ds.sensors.yaw_rad = 2.0;
        ds.latches.depth = true;
        ds.set_mode(DepthHold, Some(3.0), &mut outbox);

        assert_eq!(msgs(&outbox), vec![OutboundMsg::DepthSetpoint(3.0)]);
        assert_eq!(ds.setpoints.yaw_rad, 1.0);

        // A held depth trim stays latched
        assert!(ds.latches.depth);

        let mut outbox = Outbox::default();
        ds.set_mode(Stabilize, None, &mut outbox);
        let mut outbox = Outbox::default();
        ds.set_mode(Stabilize, None, &mut outbox);
        assert!(outbox.is_empty());
    }

    #[test]
    fn test_disarm_zeros_efforts() {
        for mode in [Manual, Stabilize, DepthHold].iter() {
            let mut ds = DataStore::default();
            let mut outbox = Outbox::default();

            ds.set_mode(*mode, None, &mut outbox);
            ds.efforts = EffortVector { forward: 0.3, strafe: -0.2, yaw: 0.9, vertical: 1.0 };

            ds.set_mode(Disarmed, None, &mut outbox);

            assert_eq!(ds.mode, Disarmed);
            assert_eq!(ds.efforts, EffortVector::default());
        }

        // Disarming while disarmed still zeros
        let mut ds = DataStore::default();
        ds.efforts.forward = 0.5;
        let mut outbox = Outbox::default();
        ds.set_mode(Disarmed, None, &mut outbox);
        assert_eq!(ds.efforts, EffortVector::default());
        assert!(outbox.is_empty());
    }
}
