//! # Network Module
//!
//! This module provides the network transport for base messages over ZMQ.
//!
//! - Inbound messages arrive on a `SUB` socket as JSON encoded [`InboundMsg`]s, see
//!   [`MsgSubscriber`].
//! - Outbound messages are published on a `PUB` socket as `"<topic> <json>"` strings, so that
//!   consumers can subscribe to individual topics by prefix, see [`MsgPublisher`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;
use zmq::{Context, Socket, SocketType};

use crate::msg::{InboundMsg, MsgParseError, OutboundMsg};

// Export zmq
pub use zmq;

// ------------------------------------------------------------------------------------------------
// MACROS
// ------------------------------------------------------------------------------------------------

macro_rules! set_sockopts {
    ($socket:expr, $(($opt:ident, $val:expr)),+) => {
        $(
            $socket.$opt($val)
                .map_err(|e| NetError::SocketOptionError(stringify!($opt).into(), e))?;
        )+
    };
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Network parameters, loaded from `net.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct NetParams {
    /// Endpoint the sample subscriber connects to, for instance `"tcp://localhost:5020"`
    pub sample_endpoint: String,

    /// Endpoint the output publisher binds to, for instance `"tcp://*:5021"`
    pub output_endpoint: String,
}

/// Options set on a socket before it is connected or bound.
///
/// Most options here correspond to those found in the
/// [`zmq_setsockopt`](http://api.zeromq.org/4-2:zmq-setsockopt) documentation.
pub struct SocketOptions {
    /// Indicates if the socket should bind itself to the endpoint rather than connect.
    pub bind: bool,

    /// `ZMQ_LINGER`: Set linger period for socket shutdown
    pub linger: i32,

    /// `ZMQ_RECONNECT_IVL`: Set reconnection interval
    pub reconnect_ivl: i32,

    /// `ZMQ_RCVTIMEO`: Maximum time before a recv operation returns with `EAGAIN`
    pub recv_timeout: i32,

    /// `ZMQ_SNDTIMEO`: Maximum time before a send operation returns with `EAGAIN`
    pub send_timeout: i32,

    /// `ZMQ_SNDHWM`: High water mark for outbound messages
    pub send_hwm: i32,
}

/// Publishes outbound messages.
pub struct MsgPublisher {
    socket: Socket,
}

/// Receives inbound messages.
pub struct MsgSubscriber {
    socket: Socket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum NetError {
    #[error("Error creating the socket: {0}")]
    CreateSocketError(zmq::Error),

    #[error("Could not connect the socket to {0}: {1}")]
    CouldNotConnect(String, zmq::Error),

    #[error("Could not set the {0} socket option: {1}")]
    SocketOptionError(String, zmq::Error),

    #[error("Could not send the message: {0}")]
    SendError(zmq::Error),

    #[error("Could not recieve a message: {0}")]
    RecvError(zmq::Error),

    #[error("Could not serialize the message: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not parse the recieved message: {0}")]
    ParseError(MsgParseError),

    #[error("Recieved a message which was not valid UTF-8")]
    NonUtf8Msg,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SocketOptions {
    /// Set these options on the given socket.
    pub fn set(&self, socket: &Socket) -> Result<(), NetError> {
        set_sockopts!(
            socket,
            (set_linger, self.linger),
            (set_reconnect_ivl, self.reconnect_ivl),
            (set_rcvtimeo, self.recv_timeout),
            (set_sndtimeo, self.send_timeout),
            (set_sndhwm, self.send_hwm)
        );

        Ok(())
    }
}

impl Default for SocketOptions {
    fn default() -> Self {
        // Defaults for sockopts taken from http://api.zeromq.org/4-2:zmq-setsockopt
        Self {
            bind: false,
            linger: 30_000,
            reconnect_ivl: 100,
            recv_timeout: -1,
            send_timeout: -1,
            send_hwm: 1000,
        }
    }
}

impl MsgPublisher {
    /// Create a new publisher bound to the output endpoint.
    ///
    /// Sends never block, if no subscriber keeps up messages are dropped by ZMQ.
    pub fn new(ctx: &Context, params: &NetParams) -> Result<Self, NetError> {
        let socket_options = SocketOptions {
            bind: true,
            linger: 1,
            send_timeout: 0,
            ..Default::default()
        };

        let socket = open_socket(ctx, zmq::PUB, &socket_options, &params.output_endpoint)?;

        Ok(Self { socket })
    }

    /// Publish a message on its topic.
    pub fn send(&self, msg: &OutboundMsg) -> Result<(), NetError> {
        let json = msg.to_json().map_err(NetError::SerializationError)?;

        self.socket
            .send(&format!("{} {}", msg.topic(), json), 0)
            .map_err(NetError::SendError)
    }
}

impl MsgSubscriber {
    /// Create a new subscriber connected to the sample endpoint.
    ///
    /// `recv_timeout_ms` bounds how long [`MsgSubscriber::recv`] waits for a message.
    pub fn new(ctx: &Context, params: &NetParams, recv_timeout_ms: i32) -> Result<Self, NetError> {
        let socket_options = SocketOptions {
            linger: 1,
            recv_timeout: recv_timeout_ms,
            ..Default::default()
        };

        let socket = open_socket(ctx, zmq::SUB, &socket_options, &params.sample_endpoint)?;
        socket
            .set_subscribe(b"")
            .map_err(|e| NetError::SocketOptionError("set_subscribe".into(), e))?;

        Ok(Self { socket })
    }

    /// Recieve a single message.
    ///
    /// Returns `Ok(None)` if no message arrived within the recieve timeout.
    pub fn recv(&self) -> Result<Option<InboundMsg>, NetError> {
        let msg_str = match self.socket.recv_string(0) {
            Ok(Ok(s)) => s,
            Ok(Err(_)) => return Err(NetError::NonUtf8Msg),
            Err(zmq::Error::EAGAIN) => return Ok(None),
            Err(e) => return Err(NetError::RecvError(e)),
        };

        InboundMsg::from_json(&msg_str)
            .map(Some)
            .map_err(NetError::ParseError)
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Create a socket, apply the options and connect or bind it to the endpoint.
fn open_socket(
    ctx: &Context,
    socket_type: SocketType,
    socket_options: &SocketOptions,
    endpoint: &str,
) -> Result<Socket, NetError> {
    let socket = ctx.socket(socket_type).map_err(NetError::CreateSocketError)?;

    socket_options.set(&socket)?;

    match socket_options.bind {
        false => socket.connect(endpoint),
        true => socket.bind(endpoint),
    }
    .map_err(|e| NetError::CouldNotConnect(endpoint.into(), e))?;

    Ok(socket)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
