use crate::error::{EncodeResult, ProtocolError};
use crate::message::{Channel, MessageKind, ProtocolVersion};
use std::collections::HashMap;

/// Per-version opcode assignments.
///
/// Each (kind, channel) pair holds a list of `since` entries; the entry with
/// the greatest `since` not newer than the requested version wins. A `None`
/// entry retires the mapping from that version on.
#[derive(Debug, Clone, Default)]
pub struct OpcodeTable {
    entries: HashMap<(MessageKind, Channel), Vec<(ProtocolVersion, Option<u8>)>>,
}

impl OpcodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `opcode` to `kind` on `channel` from version `since` onwards.
    pub fn map(
        &mut self,
        since: ProtocolVersion,
        kind: MessageKind,
        channel: Channel,
        opcode: u8,
    ) -> &mut Self {
        self.set(since, kind, channel, Some(opcode))
    }

    /// Remove `kind` from `channel` from version `since` onwards.
    pub fn retire(&mut self, since: ProtocolVersion, kind: MessageKind, channel: Channel) -> &mut Self {
        self.set(since, kind, channel, None)
    }

    fn set(
        &mut self,
        since: ProtocolVersion,
        kind: MessageKind,
        channel: Channel,
        opcode: Option<u8>,
    ) -> &mut Self {
        let list = self.entries.entry((kind, channel)).or_default();
        match list.binary_search_by_key(&since, |(v, _)| *v) {
            Ok(i) => list[i].1 = opcode,
            Err(i) => list.insert(i, (since, opcode)),
        }
        self
    }

    pub fn resolve(
        &self,
        version: ProtocolVersion,
        kind: MessageKind,
        channel: Channel,
    ) -> EncodeResult<u8> {
        self.entries
            .get(&(kind, channel))
            .and_then(|list| {
                list.iter()
                    .rev()
                    .find(|(since, _)| *since <= version)
                    .and_then(|(_, opcode)| *opcode)
            })
            .ok_or(ProtocolError::MissingOpcode {
                version,
                kind,
                channel,
            })
    }
}
