//! Client 1.71. Player creation learns the zone skin and status updates
//! carry absolute pool values.

use crate::records::viewer_and_target;
use crate::v168;
use rampart_protocol_core::{Dialect, EncodeContext, EncodeResult, Emission, MessageKind, ProtocolVersion, Request};

pub const VERSION: ProtocolVersion = ProtocolVersion(171);
pub const PARENT: ProtocolVersion = v168::VERSION;

pub fn dialect() -> Dialect {
    Dialect::derive(VERSION, PARENT)
        .handle(MessageKind::PlayerCreate, player_create)
        .handle(MessageKind::StatusUpdate, status_update)
}

/// 1.68 layout followed by `[u8 zone skin]`.
fn player_create(ctx: &mut EncodeContext<'_>, req: &Request) -> EncodeResult<Emission> {
    let Request::PlayerCreate { object_id } = req else {
        return Err(req.mismatch(MessageKind::PlayerCreate));
    };
    let mut emission = ctx.inherited(req)?;
    let skin = viewer_and_target(ctx, *object_id).map(|(_, t)| t.zone.skin);
    if let (Some(w), Some(skin)) = (emission.last_packet_mut(), skin) {
        w.write_u8(skin);
    }
    Ok(emission)
}

/// 1.68 layout followed by current and max of health, mana, endurance and
/// concentration as `u16` pairs.
fn status_update(ctx: &mut EncodeContext<'_>, req: &Request) -> EncodeResult<Emission> {
    let mut emission = ctx.inherited(req)?;
    let Some(player) = ctx.source().active_player() else {
        return Ok(emission);
    };
    if let Some(w) = emission.last_packet_mut() {
        for pool in [player.health, player.mana, player.endurance, player.concentration] {
            w.write_u16_clamped("pool current", pool.current);
            w.write_u16_clamped("pool max", pool.max);
        }
    }
    Ok(emission)
}
