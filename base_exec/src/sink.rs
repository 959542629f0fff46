//! # Message sinks
//!
//! Outbound messages leave the controller through a [`MsgSink`]. Sinks must never block, the
//! controller publishes while it holds its state lock.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::{
    mpsc::{SyncSender, TrySendError},
    Mutex,
};

use comms_if::msg::OutboundMsg;
use log::warn;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Destination of outbound messages.
pub trait MsgSink: Send + Sync {
    /// Publish a single message. Must not block.
    fn publish(&self, msg: OutboundMsg);
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Messages collected while the controller state is being updated.
///
/// Collected messages are published in push order by [`Outbox::drain_into`].
#[derive(Debug, Default)]
pub struct Outbox {
    msgs: Vec<OutboundMsg>,
}

/// Sink which stores every published message, used to inspect the controller's output.
#[derive(Debug, Default)]
pub struct MsgRecorder {
    msgs: Mutex<Vec<OutboundMsg>>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Outbox {
    pub fn push(&mut self, msg: OutboundMsg) {
        self.msgs.push(msg);
    }

    pub fn len(&self) -> usize {
        self.msgs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.msgs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OutboundMsg> {
        self.msgs.iter()
    }

    /// Publish every collected message into the sink, leaving the outbox empty.
    pub fn drain_into<S: MsgSink + ?Sized>(&mut self, sink: &S) {
        for msg in self.msgs.drain(..) {
            sink.publish(msg);
        }
    }
}

impl MsgRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return all messages recorded so far.
    pub fn take(&self) -> Vec<OutboundMsg> {
        let mut msgs = self.msgs.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *msgs)
    }

    /// Number of messages recorded and not yet taken.
    pub fn len(&self) -> usize {
        self.msgs.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MsgSink for MsgRecorder {
    fn publish(&self, msg: OutboundMsg) {
        self.msgs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(msg);
    }
}

/// Bounded channel to a consumer thread. If the consumer falls behind messages are dropped.
impl MsgSink for SyncSender<OutboundMsg> {
    fn publish(&self, msg: OutboundMsg) {
        match self.try_send(msg) {
            Ok(()) => (),
            Err(TrySendError::Full(m)) => {
                warn!("Outbound queue full, dropping {} message", m.topic())
            }
            Err(TrySendError::Disconnected(m)) => {
                warn!("Outbound consumer disconnected, dropping {} message", m.topic())
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::mpsc::sync_channel;

    #[test]
    fn test_outbox_order() {
        let mut outbox = Outbox::default();
        outbox.push(OutboundMsg::YawCtrlEnable(true));
        outbox.push(OutboundMsg::YawSetpoint(0.3));
        assert_eq!(outbox.len(), 2);

        let rec = MsgRecorder::new();
        outbox.drain_into(&rec);

        assert!(outbox.is_empty());
        assert_eq!(
            rec.take(),
            vec![OutboundMsg::YawCtrlEnable(true), OutboundMsg::YawSetpoint(0.3)]
        );
        assert!(rec.is_empty());
    }

    #[test]
    fn test_channel_sink_drops_when_full() {
        let (tx, rx) = sync_channel::<OutboundMsg>(1);

        tx.publish(OutboundMsg::DepthState(1.0));
        tx.publish(OutboundMsg::DepthState(2.0));

        assert_eq!(rx.try_recv().unwrap(), OutboundMsg::DepthState(1.0));
        assert!(rx.try_recv().is_err());

        drop(rx);
        tx.publish(OutboundMsg::DepthState(3.0));
    }
}
