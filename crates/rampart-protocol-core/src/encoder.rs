use crate::error::EncodeResult;
use crate::lineage::{EncodeContext, Limits, Lineage};
use crate::message::{ProtocolVersion, Request};
use crate::opcode::OpcodeTable;
use crate::source::{DetailLookup, GameStateSource, NameResolver, NoDetails, PlainNames};
use crate::state::SessionState;
use crate::transport::TransportSink;
use rampart_types::SkillEntry;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};

/// The collaborators one connection encodes against.
#[derive(Clone)]
pub struct ConnectionBinding {
    pub source: Arc<dyn GameStateSource>,
    pub sink: Arc<dyn TransportSink>,
    pub names: Arc<dyn NameResolver>,
    pub details: Arc<dyn DetailLookup>,
}

impl ConnectionBinding {
    pub fn new(source: Arc<dyn GameStateSource>, sink: Arc<dyn TransportSink>) -> Self {
        Self {
            source,
            sink,
            names: Arc::new(PlainNames),
            details: Arc::new(NoDetails),
        }
    }

    pub fn with_names(mut self, names: Arc<dyn NameResolver>) -> Self {
        self.names = names;
        self
    }

    pub fn with_details(mut self, details: Arc<dyn DetailLookup>) -> Self {
        self.details = details;
        self
    }
}

/// Per-connection encoder for one negotiated version.
///
/// Sends on one encoder are serialized: the session lock is held from the
/// first cache read until the last packet is submitted.
pub struct Encoder {
    version: ProtocolVersion,
    lineage: Arc<Lineage>,
    opcodes: Arc<OpcodeTable>,
    limits: Limits,
    binding: ConnectionBinding,
    state: Mutex<SessionState>,
}

impl Encoder {
    pub(crate) fn new(
        version: ProtocolVersion,
        lineage: Arc<Lineage>,
        opcodes: Arc<OpcodeTable>,
        limits: Limits,
        binding: ConnectionBinding,
    ) -> Self {
        Self {
            version,
            lineage,
            opcodes,
            limits,
            binding,
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Encode `request` and submit the resulting packets in order.
    /// Returns the number of packets submitted; zero is a valid no-op.
    pub fn send(&self, request: &Request) -> EncodeResult<usize> {
        let mut state = self.lock();
        let emission = {
            let mut ctx = EncodeContext::new(
                self.version,
                &self.lineage,
                &self.opcodes,
                self.limits,
                self.binding.source.as_ref(),
                self.binding.names.as_ref(),
                &mut state,
            );
            ctx.encode(request)?
        };

        let count = emission.packets.len();
        for writer in emission.packets {
            let packet = writer.finish();
            trace!(
                version = %self.version,
                kind = %packet.kind,
                opcode = packet.opcode,
                len = packet.payload.len(),
                "Submitting packet"
            );
            self.binding.sink.submit(packet);
        }

        let mut fresh = Vec::new();
        for detail in emission.details {
            if state.known_details.insert(detail) {
                fresh.push(detail);
            }
        }
        drop(state);

        debug!(
            version = %self.version,
            kind = %request.kind(),
            packets = count,
            details = fresh.len(),
            "Sent"
        );
        for detail in fresh {
            self.binding.details.request_detail(detail);
        }
        Ok(count)
    }

    /// Allow position updates over the unreliable channel.
    pub fn set_udp_confirmed(&self, confirmed: bool) {
        self.lock().udp_confirmed = confirmed;
    }

    /// The skill behind a client skill index, from the last full skill
    /// list sent.
    pub fn skill_at(&self, index: usize) -> Option<SkillEntry> {
        self.lock().skills.get(index).cloned()
    }

    /// Forget everything sent on this connection.
    pub fn close(&self) {
        self.lock().reset();
        debug!(version = %self.version, "Session closed");
    }
}
