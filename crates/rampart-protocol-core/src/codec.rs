use bytes::Buf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("Not enough data: needed {needed}, {available} available")]
    NotEnoughData { needed: usize, available: usize },
    #[error("Invalid UTF-8 in string field")]
    InvalidUtf8,
    #[error("Missing string terminator")]
    MissingTerminator,
}

pub type CodecResult<T> = Result<T, CodecError>;

/// Reads back what a [`PacketWriter`](crate::PacketWriter) produced, field by
/// field. Used to verify layouts and by embedders' tests.
#[derive(Debug, Clone)]
pub struct PacketReader<'a> {
    buf: &'a [u8],
}

impl<'a> PacketReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn need(&self, n: usize) -> CodecResult<()> {
        if self.buf.remaining() < n {
            return Err(CodecError::NotEnoughData {
                needed: n,
                available: self.buf.remaining(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> CodecResult<u8> {
        self.need(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn read_i8(&mut self) -> CodecResult<i8> {
        self.need(1)?;
        Ok(self.buf.get_i8())
    }

    pub fn read_bool(&mut self) -> CodecResult<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u16(&mut self) -> CodecResult<u16> {
        self.need(2)?;
        Ok(self.buf.get_u16())
    }

    pub fn read_u32(&mut self) -> CodecResult<u32> {
        self.need(4)?;
        Ok(self.buf.get_u32())
    }

    pub fn read_u64(&mut self) -> CodecResult<u64> {
        self.need(8)?;
        Ok(self.buf.get_u64())
    }

    pub fn read_u16_le(&mut self) -> CodecResult<u16> {
        self.need(2)?;
        Ok(self.buf.get_u16_le())
    }

    pub fn read_u32_le(&mut self) -> CodecResult<u32> {
        self.need(4)?;
        Ok(self.buf.get_u32_le())
    }

    pub fn read_u64_le(&mut self) -> CodecResult<u64> {
        self.need(8)?;
        Ok(self.buf.get_u64_le())
    }

    pub fn read_bytes(&mut self, n: usize) -> CodecResult<&'a [u8]> {
        self.need(n)?;
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    pub fn skip(&mut self, n: usize) -> CodecResult<()> {
        self.read_bytes(n).map(|_| ())
    }

    /// One-byte length prefix followed by that many bytes.
    pub fn read_pascal_string(&mut self) -> CodecResult<String> {
        let len = self.read_u8()? as usize;
        let bytes = self.read_bytes(len)?;
        decode(bytes)
    }

    /// Fixed-width field; trailing zero padding is stripped.
    pub fn read_fixed_string(&mut self, width: usize) -> CodecResult<String> {
        let bytes = self.read_bytes(width)?;
        let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
        decode(&bytes[..end])
    }

    pub fn read_terminated_string(&mut self) -> CodecResult<String> {
        let end = self
            .buf
            .iter()
            .position(|b| *b == 0)
            .ok_or(CodecError::MissingTerminator)?;
        let bytes = self.read_bytes(end)?;
        self.skip(1)?;
        decode(bytes)
    }
}

fn decode(bytes: &[u8]) -> CodecResult<String> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| CodecError::InvalidUtf8)
}
