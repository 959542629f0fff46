//! Main base-side executable entry point.
//!
//! # Architecture
//!
//! The executable hosts the [`BaseCtrl`] and schedules it:
//!
//!     - Initialise session, logging and parameters
//!     - Start the outbound consumer, which publishes every message the controller produces
//!     - Select the inbound source:
//!         - Script: messages are replayed from a script at their scripted time
//!         - Remote (`net` feature): messages are received over the network on their own thread
//!     - Main loop at the tick frequency:
//!         - Deliver pending script messages
//!         - Tick the controller
//!         - Sleep until the end of the cycle
//!
//! When a script ends the vehicle is disarmed and the executable stops.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::{
    mpsc::{sync_channel, Receiver},
    Arc,
};
use std::thread;
use std::time::Instant;
use structopt::StructOpt;

// Internal
use base_lib::{params::ParamsError, BaseCtrl, BaseParams, OperatingMode};
use comms_if::msg::OutboundMsg;
use util::{
    logger::{logger_init, parse_level},
    script_interpreter::{PendingMsgs, ScriptInterpreter},
    session::{self, Session},
};

#[cfg(feature = "net")]
use comms_if::net::{MsgPublisher, MsgSubscriber, NetError, NetParams};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of outbound messages which can wait for the consumer before new ones are dropped.
const OUTBOUND_QUEUE_LEN: usize = 1024;

/// Maximum time the network receiver waits for a message.
#[cfg(feature = "net")]
const RECV_TIMEOUT_MS: i32 = 100;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "base_exec", about = "Supervisory controller of the vehicle base")]
struct Opts {
    /// Replay inbound messages from this script instead of receiving them from the network
    #[structopt(short, long, parse(from_os_str))]
    script: Option<PathBuf>,

    /// Minimum level of the messages to log (info, debug or trace)
    #[structopt(short, long, default_value = "info")]
    log_level: String,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
enum BaseExecError {
    #[cfg(not(feature = "net"))]
    #[error("No script provided and the exec was built without the net feature")]
    NoMsgSource,

    #[error("Invalid base parameters: {0}")]
    InvalidParams(ParamsError),
}

/// Various sources for the messages incoming to the exec.
enum MsgSource {
    Script(ScriptInterpreter),

    /// Messages are handled by the receiver thread
    #[cfg(feature = "net")]
    Remote(thread::JoinHandle<()>),
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    let session = Session::new("base_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    let log_level = parse_level(&opts.log_level).wrap_err("Invalid log level")?;
    logger_init(log_level, &session).wrap_err("Failed to initialise logging")?;

    info!("Orca Base Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI options: {:?}", opts);

    // ---- LOAD PARAMETERS ----

    let params: BaseParams = util::params::load("base.toml")
        .wrap_err("Could not load base params")?;
    params
        .validate()
        .map_err(BaseExecError::InvalidParams)?;

    info!("Base parameters loaded, ticking at {} Hz", params.tick_frequency_hz);

    // ---- OUTBOUND ----

    let (out_tx, out_rx) = sync_channel::<OutboundMsg>(OUTBOUND_QUEUE_LEN);

    #[cfg(feature = "net")]
    let zmq_ctx = comms_if::net::zmq::Context::new();
    #[cfg(feature = "net")]
    let net_params: NetParams = util::params::load("net.toml")
        .wrap_err("Could not load net params")?;

    #[cfg(feature = "net")]
    let consumer = {
        let publisher = MsgPublisher::new(&zmq_ctx, &net_params)
            .wrap_err("Failed to initialise the MsgPublisher")?;
        info!("MsgPublisher bound to {}", net_params.output_endpoint);
        thread::spawn(move || publish_outbound(out_rx, publisher))
    };
    #[cfg(not(feature = "net"))]
    let consumer = thread::spawn(move || log_outbound(out_rx));

    let ctrl = Arc::new(BaseCtrl::new(&params, out_tx));

    info!("BaseCtrl initialised, vehicle is {:?}", ctrl.mode());

    // ---- INBOUND ----

    let mut msg_source = match opts.script {
        Some(ref path) => {
            info!("Loading script from {:?}", path);

            let si = ScriptInterpreter::new(path).wrap_err("Failed to load script")?;

            info!(
                "Loaded script lasts {:.02} s and contains {} messages\n",
                si.get_duration(),
                si.get_num_msgs()
            );

            MsgSource::Script(si)
        }
        #[cfg(feature = "net")]
        None => {
            info!("No script provided, receiving messages from the network\n");

            let subscriber = MsgSubscriber::new(&zmq_ctx, &net_params, RECV_TIMEOUT_MS)
                .wrap_err("Failed to initialise the MsgSubscriber")?;
            info!("MsgSubscriber connected to {}", net_params.sample_endpoint);

            let ctrl = ctrl.clone();
            MsgSource::Remote(thread::spawn(move || receive_inbound(subscriber, ctrl)))
        }
        #[cfg(not(feature = "net"))]
        None => return Err(BaseExecError::NoMsgSource.into()),
    };

    // ---- MAIN LOOP ----

    info!("Beginning main loop\n");

    let cycle_period = params
        .tick_period()
        .map_err(BaseExecError::InvalidParams)?;
    let mut num_consec_cycle_overruns: u64 = 0;
    let mut num_saturated_ticks: u64 = 0;

    loop {
        let cycle_start_instant = Instant::now();
        let now_s = session::get_elapsed_seconds();

        // ---- MESSAGE PROCESSING ----

        match msg_source {
            MsgSource::Script(ref mut si) => match si.get_pending_msgs(now_s) {
                PendingMsgs::None => (),
                PendingMsgs::Some(msgs) => {
                    for msg in msgs.iter() {
                        ctrl.handle(msg);
                    }
                }
                PendingMsgs::EndOfScript => {
                    info!("End of message script reached, disarming");
                    ctrl.set_mode(OperatingMode::Disarmed, None);

                    // Make sure the zero thrust command goes out
                    ctrl.tick(now_s);
                    break;
                }
            },
            #[cfg(feature = "net")]
            MsgSource::Remote(ref handle) => {
                if handle.is_finished() {
                    warn!("Network receiver stopped, disarming");
                    ctrl.set_mode(OperatingMode::Disarmed, None);
                    ctrl.tick(now_s);
                    break;
                }
            }
        }

        // ---- TICK ----

        if ctrl.tick(now_s).any_saturated() {
            num_saturated_ticks += 1;
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                num_consec_cycle_overruns += 1;
                warn!(
                    "Cycle overran by {:.06} s ({} consecutive)",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64(),
                    num_consec_cycle_overruns
                );
            }
        }
    }

    // ---- SHUTDOWN ----

    let ds = ctrl.snapshot();
    info!(
        "{} ticks executed, thrusters saturated on {}",
        ds.num_ticks, num_saturated_ticks
    );

    // Dropping the controller closes the outbound channel, which stops the consumer
    drop(ctrl);
    if consumer.join().is_err() {
        warn!("Outbound consumer panicked");
    }

    info!("End of execution");

    Ok(())
}

/// Publish outbound messages on the network until the channel closes.
#[cfg(feature = "net")]
fn publish_outbound(out_rx: Receiver<OutboundMsg>, publisher: MsgPublisher) {
    for msg in out_rx.iter() {
        if let Err(e) = publisher.send(&msg) {
            warn!("Could not publish {} message: {}", msg.topic(), e);
        }
    }
}

/// Log outbound messages until the channel closes.
#[cfg(not(feature = "net"))]
fn log_outbound(out_rx: Receiver<OutboundMsg>) {
    for msg in out_rx.iter() {
        match msg.to_json() {
            Ok(json) => log::trace!("{} {}", msg.topic(), json),
            Err(e) => warn!("Could not serialise {} message: {}", msg.topic(), e),
        }
    }
}

/// Receive inbound messages from the network and hand them to the controller.
///
/// Only returns if the socket fails.
#[cfg(feature = "net")]
fn receive_inbound<S: base_lib::MsgSink>(subscriber: MsgSubscriber, ctrl: Arc<BaseCtrl<S>>) {
    loop {
        match subscriber.recv() {
            Ok(Some(msg)) => ctrl.handle(&msg),
            Ok(None) => (),
            Err(NetError::ParseError(e)) => warn!("Could not parse received message: {}", e),
            Err(NetError::NonUtf8Msg) => warn!("Received a message which was not valid UTF-8"),
            Err(e) => {
                log::error!("Network receive failed: {}", e);
                return;
            }
        }
    }
}
