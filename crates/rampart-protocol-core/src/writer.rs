use crate::error::{EncodeResult, ProtocolError};
use crate::message::{Channel, MessageKind};
use bytes::{BufMut, Bytes, BytesMut};
use tracing::warn;

/// Longest string a one-byte length prefix can describe.
pub const MAX_PASCAL_LEN: usize = u8::MAX as usize;

/// Result of a string write that may have been cut short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Clipped {
    /// Bytes of the source string that made it onto the wire.
    pub written: usize,
    /// Bytes that were cut off.
    pub dropped: usize,
}

impl Clipped {
    pub fn is_truncated(&self) -> bool {
        self.dropped > 0
    }
}

/// A finished packet body, ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub opcode: u8,
    pub channel: Channel,
    pub kind: MessageKind,
    pub payload: Bytes,
}

/// Growable packet body with a movable cursor.
///
/// Writes at the cursor overwrite existing bytes in place and extend the
/// buffer only by what runs past its end, which is what backpatching
/// relies on. Positions never count the outer frame header.
#[derive(Debug)]
pub struct PacketWriter {
    opcode: u8,
    channel: Channel,
    kind: MessageKind,
    buf: BytesMut,
    pos: usize,
}

impl PacketWriter {
    pub fn new(opcode: u8, channel: Channel, kind: MessageKind) -> Self {
        Self {
            opcode,
            channel,
            kind,
            buf: BytesMut::with_capacity(64),
            pos: 0,
        }
    }

    pub fn opcode(&self) -> u8 {
        self.opcode
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Move the cursor. Moving past the end of the buffer is an error.
    pub fn set_position(&mut self, position: usize) -> EncodeResult<()> {
        if position > self.buf.len() {
            return Err(ProtocolError::PositionOutOfBounds {
                position,
                len: self.buf.len(),
            });
        }
        self.pos = position;
        Ok(())
    }

    pub fn seek_end(&mut self) {
        self.pos = self.buf.len();
    }

    /// Drop everything from `len` onwards. Only bounded blocks use this, to
    /// take back an entry that did not fit.
    pub fn truncate(&mut self, len: usize) {
        self.buf.truncate(len);
        self.pos = self.pos.min(self.buf.len());
    }

    fn put(&mut self, bytes: &[u8]) {
        if self.pos == self.buf.len() {
            self.buf.put_slice(bytes);
        } else {
            let overlap = (self.buf.len() - self.pos).min(bytes.len());
            self.buf[self.pos..self.pos + overlap].copy_from_slice(&bytes[..overlap]);
            self.buf.put_slice(&bytes[overlap..]);
        }
        self.pos += bytes.len();
    }

    pub fn write_u8(&mut self, v: u8) {
        self.put(&[v]);
    }

    pub fn write_i8(&mut self, v: i8) {
        self.put(&v.to_be_bytes());
    }

    pub fn write_bool(&mut self, v: bool) {
        self.write_u8(v as u8);
    }

    pub fn write_u16(&mut self, v: u16) {
        self.put(&v.to_be_bytes());
    }

    /// `v` limited to `0..=max`. Out of range values are logged, never
    /// wrapped.
    pub fn clamp_field(&self, field: &'static str, v: impl Into<i64>, max: u16) -> u16 {
        let v = v.into();
        let clamped = v.clamp(0, max as i64);
        if clamped != v {
            warn!(kind = %self.kind, field, value = v, "Field out of range, clamped to {}", clamped);
        }
        clamped as u16
    }

    /// One byte, clamped to `0..=0xFF`.
    pub fn write_u8_clamped(&mut self, field: &'static str, v: impl Into<i64>) {
        let v = self.clamp_field(field, v, u8::MAX as u16);
        self.write_u8(v as u8);
    }

    /// Two bytes, clamped to `0..=0xFFFF`.
    pub fn write_u16_clamped(&mut self, field: &'static str, v: impl Into<i64>) {
        let v = self.clamp_field(field, v, u16::MAX);
        self.write_u16(v);
    }

    pub fn write_u32(&mut self, v: u32) {
        self.put(&v.to_be_bytes());
    }

    pub fn write_u64(&mut self, v: u64) {
        self.put(&v.to_be_bytes());
    }

    pub fn write_u16_le(&mut self, v: u16) {
        self.put(&v.to_le_bytes());
    }

    pub fn write_u32_le(&mut self, v: u32) {
        self.put(&v.to_le_bytes());
    }

    pub fn write_u64_le(&mut self, v: u64) {
        self.put(&v.to_le_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.put(bytes);
    }

    /// Write `count` copies of `value`.
    pub fn fill(&mut self, value: u8, count: usize) {
        if self.pos == self.buf.len() {
            self.buf.put_bytes(value, count);
            self.pos += count;
        } else {
            for _ in 0..count {
                self.write_u8(value);
            }
        }
    }

    /// One-byte length prefix followed by at most 255 bytes of text.
    pub fn write_pascal_string(&mut self, s: &str) -> Clipped {
        let cut = clip(s, MAX_PASCAL_LEN);
        self.write_u8(cut.len() as u8);
        self.put(cut.as_bytes());
        self.report(s, cut)
    }

    /// Exactly `width` bytes: the text truncated or zero padded.
    pub fn write_fixed_string(&mut self, s: &str, width: usize) -> Clipped {
        let cut = clip(s, width);
        self.put(cut.as_bytes());
        self.fill(0, width - cut.len());
        self.report(s, cut)
    }

    /// At most `max` bytes of text followed by a zero terminator.
    pub fn write_terminated_string(&mut self, s: &str, max: usize) -> Clipped {
        let cut = clip(s, max);
        self.put(cut.as_bytes());
        self.write_u8(0);
        self.report(s, cut)
    }

    fn report(&self, original: &str, cut: &str) -> Clipped {
        let clipped = Clipped {
            written: cut.len(),
            dropped: original.len() - cut.len(),
        };
        if clipped.is_truncated() {
            warn!(
                kind = %self.kind,
                "String of {} bytes truncated to {} bytes",
                original.len(),
                cut.len()
            );
        }
        clipped
    }

    /// Consume the writer. The buffer belongs to the transport from here on.
    pub fn finish(self) -> Packet {
        Packet {
            opcode: self.opcode,
            channel: self.channel,
            kind: self.kind,
            payload: self.buf.freeze(),
        }
    }
}

/// Longest prefix of `s` that fits in `max` bytes without splitting a
/// character.
fn clip(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
