//! Client 1.74. Player creation switches to absolute coordinates and keep
//! info reports whether the keep is under attack.

use crate::records::{player_flags, viewer_and_target, write_face, write_names};
use crate::v173;
use rampart_protocol_core::{
    Channel, Dialect, EncodeContext, EncodeResult, Emission, MessageKind, ProtocolVersion, Request,
};

pub const VERSION: ProtocolVersion = ProtocolVersion(174);
pub const PARENT: ProtocolVersion = v173::VERSION;

pub fn dialect() -> Dialect {
    Dialect::derive(VERSION, PARENT)
        .handle(MessageKind::PlayerCreate, player_create)
        .handle(MessageKind::KeepInfo, keep_info)
}

/// `[u16 session][u16 object][u16 model][u16 region][u32 x][u32 y][u16 z]
/// [u16 heading][u8 realm][u8 level][u8 flags][7 face][pascal name]
/// [pascal guild][pascal last name][u8 zone skin]`
fn player_create(ctx: &mut EncodeContext<'_>, req: &Request) -> EncodeResult<Emission> {
    let Request::PlayerCreate { object_id } = req else {
        return Err(req.mismatch(MessageKind::PlayerCreate));
    };
    let Some((viewer, target)) = viewer_and_target(ctx, *object_id) else {
        return Ok(Emission::none());
    };
    let mut w = ctx.writer(MessageKind::PlayerCreate, Channel::Reliable)?;
    w.write_u16(target.session_id);
    w.write_u16(target.object_id);
    w.write_u16(target.model);
    w.write_u16(target.position.region);
    w.write_u32(target.position.x);
    w.write_u32(target.position.y);
    w.write_u16(target.position.z);
    w.write_u16(target.position.heading);
    w.write_u8(target.realm.id());
    w.write_u8(target.level);
    w.write_u8(player_flags(&target));
    write_face(&mut w, &target.face);
    write_names(ctx, &mut w, &viewer, &target);
    w.write_u8(target.zone.skin);
    Ok(Emission::single(w))
}

/// 1.68 layout followed by `[u8 under attack]`.
fn keep_info(ctx: &mut EncodeContext<'_>, req: &Request) -> EncodeResult<Emission> {
    let Request::KeepInfo { keep_id } = req else {
        return Err(req.mismatch(MessageKind::KeepInfo));
    };
    let mut emission = ctx.inherited(req)?;
    let Some(keep) = ctx.source().keep(*keep_id) else {
        return Ok(emission);
    };
    if let Some(w) = emission.last_packet_mut() {
        w.write_bool(keep.under_attack);
    }
    Ok(emission)
}
