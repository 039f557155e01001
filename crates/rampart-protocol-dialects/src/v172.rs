//! Client 1.72. The character overview is rebuilt with equipment and
//! absolute coordinates, position updates carry mana and endurance, and
//! player creation moves to a new opcode (see `opcodes`).

use crate::records::{character_slots, viewer_and_target, write_character_core, CHARACTER_CORE_LEN};
use crate::v171;
use rampart_protocol_core::{
    Channel, Dialect, EncodeContext, EncodeResult, Emission, MessageKind, PacketWriter, ProtocolVersion, Request,
};
use rampart_types::CharacterSummary;

pub const VERSION: ProtocolVersion = ProtocolVersion(172);
pub const PARENT: ProtocolVersion = v171::VERSION;

/// Equipment models and absolute coordinates after the character core.
pub const CHARACTER_RECORD_LEN: usize = CHARACTER_CORE_LEN + 5 * 2 + 4 + 4;

pub fn dialect() -> Dialect {
    Dialect::derive(VERSION, PARENT)
        .handle(MessageKind::CharacterOverview, character_overview)
        .handle(MessageKind::PlayerPosition, player_position)
}

/// `[character core][u16 helmet][u16 gloves][u16 boots][u16 chest]
/// [u16 cloak][u32 x][u32 y]`
fn character_record(w: &mut PacketWriter, c: &CharacterSummary) {
    write_character_core(w, c);
    let eq = &c.equipment;
    for model in [eq.helmet, eq.gloves, eq.boots, eq.chest, eq.cloak] {
        w.write_u16(model);
    }
    w.write_u32(c.x);
    w.write_u32(c.y);
}

/// `[24 account]` then ten character records.
fn character_overview(ctx: &mut EncodeContext<'_>, req: &Request) -> EncodeResult<Emission> {
    let Request::CharacterOverview { realm } = req else {
        return Err(req.mismatch(MessageKind::CharacterOverview));
    };
    let characters = ctx.source().characters(*realm);
    let mut w = ctx.writer(MessageKind::CharacterOverview, Channel::Reliable)?;
    w.write_fixed_string(&ctx.source().account_name(), 24);
    for slot in character_slots(&characters) {
        match slot {
            Some(c) => character_record(&mut w, c),
            None => w.fill(0, CHARACTER_RECORD_LEN),
        }
    }
    Ok(Emission::single(w))
}

/// 1.68 layout followed by `[u8 mana %][u8 endurance %]`.
fn player_position(ctx: &mut EncodeContext<'_>, req: &Request) -> EncodeResult<Emission> {
    let Request::PlayerPosition { object_id } = req else {
        return Err(req.mismatch(MessageKind::PlayerPosition));
    };
    let mut emission = ctx.inherited(req)?;
    let Some((_, target)) = viewer_and_target(ctx, *object_id) else {
        return Ok(emission);
    };
    if let Some(w) = emission.last_packet_mut() {
        w.write_u8(target.mana.percent());
        w.write_u8(target.endurance.percent());
    }
    Ok(emission)
}
