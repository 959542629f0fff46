//! # Base Controller
//!
//! Owner of the [`DataStore`] and entry point of every inbound message. Callbacks may be invoked
//! from any thread, all of them serialise on a single mutex so the tick never sees a half applied
//! update.
//!
//! Messages produced while handling a callback are published before the lock is released, which
//! keeps the outbound stream in the same order as the state changes that caused it.
//!
//! Timing is not handled here: a scheduler calls [`BaseCtrl::tick`] at the configured rate and
//! passes in the timestamp to use.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::{Mutex, MutexGuard};

use comms_if::msg::{
    CameraTiltCmd, CtrlEffort, DepthSample, InboundMsg, InputSample, LightsCmd,
    OrientationSample, OutboundMsg,
};
use log::{trace, warn};
use util::maths::dead_band;

use crate::{
    data_store::DataStore,
    input_mapper::InputMapper,
    mixer::{Mixer, MixerReport},
    mode::{EffortAxis, EffortSource, OperatingMode},
    params::BaseParams,
    sink::{MsgSink, Outbox},
    telem_est::TelemEst,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct BaseCtrl<S: MsgSink> {
    ds: Mutex<DataStore>,

    input_mapper: InputMapper,
    mixer: Mixer,
    telem_est: TelemEst,

    effort_dead_band: f64,

    sink: S,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<S: MsgSink> BaseCtrl<S> {
    /// Create a new controller, starting disarmed.
    pub fn new(params: &BaseParams, sink: S) -> Self {
        Self {
            ds: Mutex::new(DataStore::default()),
            input_mapper: InputMapper::new(params),
            mixer: Mixer::default(),
            telem_est: TelemEst::new(&params.drag),
            effort_dead_band: params.effort_dead_band,
            sink,
        }
    }

    /// Dispatch an inbound message to its callback.
    pub fn handle(&self, msg: &InboundMsg) {
        match msg {
            InboundMsg::Depth(s) => self.on_depth(s),
            InboundMsg::Orientation(s) => self.on_orientation(s),
            InboundMsg::Input(s) => self.on_input(s),
            InboundMsg::YawCtrlEffort(e) => self.on_yaw_ctrl_effort(e),
            InboundMsg::DepthCtrlEffort(e) => self.on_depth_ctrl_effort(e),
        }
    }

    pub fn on_depth(&self, sample: &DepthSample) {
        self.lock().sensors.update_depth(sample);
    }

    pub fn on_orientation(&self, sample: &OrientationSample) {
        self.lock().sensors.update_orientation(sample);
    }

    pub fn on_input(&self, sample: &InputSample) {
        let mut ds = self.lock();
        let mut outbox = Outbox::default();

        self.input_mapper.process(&mut ds, sample, &mut outbox);

        outbox.drain_into(&self.sink);
    }

    /// Yaw controller output, only used in `Stabilize` and `DepthHold`.
    pub fn on_yaw_ctrl_effort(&self, effort: &CtrlEffort) {
        self.apply_ctrl_effort(EffortAxis::Yaw, EffortSource::YawCtrl, effort);
    }

    /// Depth controller output, only used in `DepthHold`.
    pub fn on_depth_ctrl_effort(&self, effort: &CtrlEffort) {
        self.apply_ctrl_effort(EffortAxis::Vertical, EffortSource::DepthCtrl, effort);
    }

    /// Request a mode change from outside the input device, for instance when the exec shuts
    /// down.
    pub fn set_mode(&self, target: OperatingMode, depth_setpoint_m: Option<f64>) {
        let mut ds = self.lock();
        let mut outbox = Outbox::default();

        ds.set_mode(target, depth_setpoint_m, &mut outbox);

        outbox.drain_into(&self.sink);
    }

    /// Publish the periodic output.
    ///
    /// Every tick publishes the thruster command, camera tilt, lights and odometry. The yaw state
    /// and setpoint are published while the yaw controller is enabled, the depth state and
    /// setpoint while the depth controller is enabled.
    pub fn tick(&self, stamp_s: f64) -> MixerReport {
        let mut ds = self.lock();
        let mut outbox = Outbox::default();

        ds.num_ticks += 1;

        if ds.mode.yaw_ctrl_active() {
            outbox.push(OutboundMsg::YawState(ds.sensors.yaw_rad));
            outbox.push(OutboundMsg::YawSetpoint(ds.setpoints.yaw_rad));
        }
        if ds.mode.depth_ctrl_active() {
            outbox.push(OutboundMsg::DepthState(ds.sensors.depth_m));
            outbox.push(OutboundMsg::DepthSetpoint(ds.setpoints.depth_m));
        }

        let (thruster_cmd, report) = self.mixer.mix(&ds.efforts);

        if report.any_saturated() {
            trace!("Thruster saturation: {:?}", report.saturated);
        }
        trace!("Tick {}: {:?} -> {:?}", ds.num_ticks, ds.efforts, thruster_cmd.effort);

        outbox.push(OutboundMsg::Thruster(thruster_cmd));
        outbox.push(OutboundMsg::CameraTilt(CameraTiltCmd {
            tilt: ds.actuators.camera_tilt,
        }));
        outbox.push(OutboundMsg::Lights(LightsCmd {
            brightness: ds.actuators.lights_brightness,
        }));
        outbox.push(OutboundMsg::Odom(
            self.telem_est.estimate(&ds.efforts, &ds.sensors, stamp_s),
        ));

        outbox.drain_into(&self.sink);

        report
    }

    pub fn mode(&self) -> OperatingMode {
        self.lock().mode
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> DataStore {
        self.lock().clone()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn apply_ctrl_effort(&self, axis: EffortAxis, source: EffortSource, effort: &CtrlEffort) {
        let value = dead_band(effort.value, self.effort_dead_band);

        if !self.lock().apply_effort(axis, source, value) {
            trace!("{:?} effort ignored outside its mode", source);
        }
    }

    /// Lock the data store.
    ///
    /// A panic in another callback leaves the store consistent field by field, so a poisoned
    /// lock is recovered rather than stopping the controller.
    fn lock(&self) -> MutexGuard<DataStore> {
        self.ds.lock().unwrap_or_else(|e| {
            warn!("Data store lock was poisoned, recovering");
            e.into_inner()
        })
    }
}
