//! One scripted session per negotiated version.

use crate::world::WorldFixture;
use rampart_protocol_core::{
    frame, Channel, DetailLookup, DetailRef, Encoder, Packet, ProtocolVersion, Request,
};
use std::fmt::Write as _;
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

/// Details the encoder asked for, answered once the current request is done.
#[derive(Debug, Default)]
pub struct PendingDetails {
    queue: Mutex<Vec<DetailRef>>,
}

impl PendingDetails {
    pub fn drain(&self) -> Vec<DetailRef> {
        std::mem::take(&mut *self.queue.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl DetailLookup for PendingDetails {
    fn request_detail(&self, detail: DetailRef) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(detail);
    }
}

/// The requests a freshly logged in client receives, in order.
pub fn login_sequence(world: &WorldFixture) -> Vec<Request> {
    let mut requests = Vec::new();
    let Some(player) = world.player.as_ref() else {
        return requests;
    };
    requests.push(Request::CharacterOverview {
        realm: player.realm,
    });
    requests.push(Request::PlayerCreate {
        object_id: player.object_id,
    });
    for other in &world.others {
        requests.push(Request::PlayerCreate {
            object_id: other.object_id,
        });
    }
    requests.push(Request::PlayerPosition {
        object_id: player.object_id,
    });
    requests.push(Request::StatusUpdate);
    requests.push(Request::UpdatePlayerSkills);
    requests.push(Request::UpdateIcons { changed: None });
    requests.push(Request::InventoryUpdate {
        slots: world.item_slots(),
    });
    for keep in &world.keeps {
        requests.push(Request::KeepInfo { keep_id: keep.id });
        requests.push(Request::KeepComponentInfo { keep_id: keep.id });
    }
    requests.push(Request::PlayerTitles);
    // Nothing changed since the first icon update, so this one is silent.
    requests.push(Request::UpdateIcons { changed: None });
    requests
}

/// Send `requests` through `encoder`, answering detail lookups with delve
/// text as they come up. Returns the number of packets produced.
pub fn drive(
    encoder: &Encoder,
    world: &WorldFixture,
    pending: &PendingDetails,
    requests: &[Request],
) -> anyhow::Result<usize> {
    let mut packets = 0;
    for request in requests {
        packets += encoder.send(request)?;
        for detail in pending.drain() {
            packets += encoder.send(&Request::DelveInfo {
                detail,
                text: world.describe(detail),
            })?;
        }
    }
    Ok(packets)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WireStats {
    pub frames: usize,
    pub bytes: usize,
}

/// Frame every packet of one session until its sink is dropped.
pub async fn write_frames(
    version: ProtocolVersion,
    mut rx: mpsc::UnboundedReceiver<Packet>,
) -> WireStats {
    let mut stats = WireStats::default();
    let mut sequence: u16 = 0;
    while let Some(packet) = rx.recv().await {
        let seq = match packet.channel {
            Channel::Reliable => 0,
            Channel::Unreliable => {
                sequence = sequence.wrapping_add(1);
                sequence
            }
        };
        let bytes = match frame(&packet, seq) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(%version, kind = %packet.kind, "Unframeable packet: {}", e);
                continue;
            }
        };
        debug!(
            "[{}] {} 0x{:02X} {:?} len={}",
            version,
            packet.kind,
            packet.opcode,
            packet.channel,
            packet.payload.len()
        );
        trace!("[{}] {}", version, hex(&bytes));
        stats.frames += 1;
        stats.bytes += bytes.len();
    }
    info!(
        "[{}] Writer done: {} frames, {} bytes",
        version, stats.frames, stats.bytes
    );
    stats
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{:02x}", b);
    }
    out
}
