//! # Base library.
//!
//! Supervisory control core of the vehicle. Exposed as a library so that the executable, the
//! benchmarks and other crates in the workspace can use it.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Base controller - owns the shared state and handles every inbound message and the tick
pub mod base_ctrl;

/// Data store - state shared between the callbacks and the tick
pub mod data_store;

/// Input mapper - converts operator input into mode changes, trims and efforts
pub mod input_mapper;

/// Command mixer - allocates axis efforts to the six thrusters
pub mod mixer;

/// Mode state machine - operating modes and the routing of efforts in each mode
pub mod mode;

/// Parameters of the base controller
pub mod params;

/// Sensor cache - latest depth and yaw
pub mod sensor_cache;

/// Message sinks - where outbound messages are published
pub mod sink;

/// Telemetry estimator - odometry from the drag model
pub mod telem_est;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use base_ctrl::BaseCtrl;
pub use mode::OperatingMode;
pub use params::BaseParams;
pub use sink::{MsgRecorder, MsgSink};
