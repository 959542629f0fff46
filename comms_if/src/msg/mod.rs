//! # Message definitions
//!
//! Messages are split by direction. [`InboundMsg`] covers everything the base controller consumes
//! (sensor samples, operator input, controller feedback), [`OutboundMsg`] everything it produces
//! (thruster and actuator commands, controller enables, state and setpoint scalars, odometry).
//!
//! All messages are serialised as JSON on the wire.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod actuator;
mod ctrl;
mod geometry;
mod input;
mod odom;
mod sensor;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use actuator::*;
pub use ctrl::*;
pub use geometry::*;
pub use input::*;
pub use odom::*;
pub use sensor::*;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A message consumed by the base controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InboundMsg {
    /// New reading from the depth sensor
    Depth(DepthSample),

    /// New reading from the orientation sensor (IMU)
    Orientation(OrientationSample),

    /// New sample from the operator's input device
    Input(InputSample),

    /// Output of the yaw closed-loop controller
    YawCtrlEffort(CtrlEffort),

    /// Output of the depth closed-loop controller
    DepthCtrlEffort(CtrlEffort),
}

/// A message produced by the base controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OutboundMsg {
    Thruster(ThrusterCmd),
    CameraTilt(CameraTiltCmd),
    Lights(LightsCmd),

    /// Enable (`true`) or disable (`false`) the yaw controller
    YawCtrlEnable(bool),

    /// Enable (`true`) or disable (`false`) the depth controller
    DepthCtrlEnable(bool),

    /// Sensed yaw.
    ///
    /// Units: radians
    YawState(f64),

    /// Target yaw of the yaw controller.
    ///
    /// Units: radians
    YawSetpoint(f64),

    /// Sensed depth.
    ///
    /// Units: meters
    DepthState(f64),

    /// Target depth of the depth controller.
    ///
    /// Units: meters
    DepthSetpoint(f64),

    Odom(Odometry),
}

/// Topics outbound messages are published on.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Topic {
    Thruster,
    CameraTilt,
    Lights,
    YawPidEnable,
    YawState,
    YawSetpoint,
    DepthPidEnable,
    DepthState,
    DepthSetpoint,
    Odom,
}

/// Errors which can occur while parsing a message.
#[derive(Debug, Error)]
pub enum MsgParseError {
    #[error("Message contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl InboundMsg {
    /// Parse an inbound message from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self, MsgParseError> {
        serde_json::from_str(json_str).map_err(MsgParseError::InvalidJson)
    }
}

impl OutboundMsg {
    /// The topic this message is published on.
    pub fn topic(&self) -> Topic {
        match self {
            OutboundMsg::Thruster(_) => Topic::Thruster,
            OutboundMsg::CameraTilt(_) => Topic::CameraTilt,
            OutboundMsg::Lights(_) => Topic::Lights,
            OutboundMsg::YawCtrlEnable(_) => Topic::YawPidEnable,
            OutboundMsg::DepthCtrlEnable(_) => Topic::DepthPidEnable,
            OutboundMsg::YawState(_) => Topic::YawState,
            OutboundMsg::YawSetpoint(_) => Topic::YawSetpoint,
            OutboundMsg::DepthState(_) => Topic::DepthState,
            OutboundMsg::DepthSetpoint(_) => Topic::DepthSetpoint,
            OutboundMsg::Odom(_) => Topic::Odom,
        }
    }

    /// Serialise the message into a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Topic {
    /// Name of the topic as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Thruster => "thruster",
            Topic::CameraTilt => "camera_tilt",
            Topic::Lights => "lights",
            Topic::YawPidEnable => "yaw_pid_enable",
            Topic::YawState => "yaw_state",
            Topic::YawSetpoint => "yaw_setpoint",
            Topic::DepthPidEnable => "depth_pid_enable",
            Topic::DepthState => "depth_state",
            Topic::DepthSetpoint => "depth_setpoint",
            Topic::Odom => "odom",
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_inbound_from_json() {
        let msg = InboundMsg::from_json(r#"{"Depth": {"depth_m": 2.5}}"#).unwrap();
        assert_eq!(msg, InboundMsg::Depth(DepthSample { depth_m: 2.5 }));

        let msg = InboundMsg::from_json(
            r#"{"Input": {"axes": [0.0, 0.8], "buttons": [false, true]}}"#
        ).unwrap();
        match msg {
            InboundMsg::Input(s) => {
                assert_eq!(s.axis(1), 0.8);
                assert!(s.button(1));
            },
            m => panic!("Expected an input sample, got {:?}", m)
        }

        assert!(InboundMsg::from_json(r#"{"Sonar": {}}"#).is_err());
        assert!(InboundMsg::from_json("not json").is_err());
    }

    #[test]
    fn test_outbound_topics() {
        assert_eq!(OutboundMsg::YawCtrlEnable(true).topic().as_str(), "yaw_pid_enable");
        assert_eq!(OutboundMsg::DepthSetpoint(1.0).topic().as_str(), "depth_setpoint");
        assert_eq!(
            OutboundMsg::Thruster(ThrusterCmd::default()).topic(),
            Topic::Thruster
        );
    }
}
