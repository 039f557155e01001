use crate::error::{EncodeResult, ProtocolError};
use crate::message::Channel;
use crate::paging::FieldWidth;
use crate::writer::Packet;
use bytes::{BufMut, BytesMut};
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc;
use tracing::debug;

/// Where finished packets go. Submission is fire-and-forget; delivery and
/// reliability belong to the transport layer.
pub trait TransportSink: Send + Sync {
    fn submit(&self, packet: Packet);
}

/// Forwards packets to a writer task over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Packet>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<Packet>) -> Self {
        Self { tx }
    }

    /// A sink and the receiver its packets arrive on.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Packet>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl TransportSink for ChannelSink {
    fn submit(&self, packet: Packet) {
        if let Err(err) = self.tx.send(packet) {
            // The connection owner notices the closed writer on its own.
            debug!(kind = %err.0.kind, "Dropping packet for closed connection");
        }
    }
}

/// Keeps every submitted packet in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    packets: Mutex<Vec<Packet>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything recorded so far.
    pub fn take(&self) -> Vec<Packet> {
        std::mem::take(&mut *self.packets.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.packets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TransportSink for RecordingSink {
    fn submit(&self, packet: Packet) {
        self.packets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(packet);
    }
}

/// Largest body a frame's length field can describe.
pub const MAX_BODY_LEN: usize = u16::MAX as usize;

/// Wire frame for a packet.
///
/// Reliable: `[u16 len][u8 opcode][body]`.
/// Unreliable: `[u16 len][u16 sequence][u8 opcode][body]`.
/// `len` counts body bytes only.
pub fn frame(packet: &Packet, sequence: u16) -> EncodeResult<BytesMut> {
    let len = packet.payload.len();
    if len > MAX_BODY_LEN {
        return Err(ProtocolError::FieldOverflow {
            value: len,
            width: FieldWidth::U16,
        });
    }
    let mut buf = BytesMut::with_capacity(len + 5);
    buf.put_u16(len as u16);
    if packet.channel == Channel::Unreliable {
        buf.put_u16(sequence);
    }
    buf.put_u8(packet.opcode);
    buf.put_slice(&packet.payload);
    Ok(buf)
}
