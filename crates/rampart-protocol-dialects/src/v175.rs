//! Client 1.75. The icon bar record is rebuilt around the spell index and
//! immunity flags, and keep components report their status and skin.

use crate::records::encode_icons;
use crate::v174;
use rampart_protocol_core::{
    Channel, Dialect, EncodeContext, EncodeResult, Emission, MessageKind, PacketWriter, ProtocolVersion, Request,
};
use rampart_types::Effect;

pub const VERSION: ProtocolVersion = ProtocolVersion(175);
pub const PARENT: ProtocolVersion = v174::VERSION;

/// A blanked slot reads as a record with every field zero and an empty
/// name.
pub const ICON_PLACEHOLDER_WIDTH: usize = 10;

const ICON_IMMUNE: u8 = 0x01;
const ICON_NEGATIVE: u8 = 0x02;

pub fn dialect() -> Dialect {
    Dialect::derive(VERSION, PARENT)
        .handle(MessageKind::UpdateIcons, update_icons)
        .handle(MessageKind::KeepComponentInfo, keep_component_info)
}

/// Record: `[u8 slot][u8 flags][u16 icon][u16 seconds][u16 id]
/// [u16 spell index][pascal name]`. The spell index is `0xFFFF` for effects
/// not backed by a spell.
fn icon_record(w: &mut PacketWriter, slot: u8, effect: &Effect) {
    let mut flags = 0;
    if effect.disabled {
        flags |= ICON_IMMUNE;
    }
    if effect.negative {
        flags |= ICON_NEGATIVE;
    }
    w.write_u8(slot);
    w.write_u8(flags);
    w.write_u16(effect.icon);
    w.write_u16_clamped("remaining", effect.remaining_secs());
    w.write_u16(effect.display_id());
    w.write_u16(effect.spell_id.unwrap_or(u16::MAX));
    w.write_pascal_string(&effect.name);
}

fn update_icons(ctx: &mut EncodeContext<'_>, req: &Request) -> EncodeResult<Emission> {
    encode_icons(ctx, req, ICON_PLACEHOLDER_WIDTH, icon_record)
}

/// One packet per component: `[u16 keep][u16 index][u16 object][u8 skin]
/// [i8 x][i8 y][u8 heading][u8 height][u8 health][u8 status]`.
/// Status bit 0 is "in combat", bit 1 "raised".
fn keep_component_info(ctx: &mut EncodeContext<'_>, req: &Request) -> EncodeResult<Emission> {
    let Request::KeepComponentInfo { keep_id } = req else {
        return Err(req.mismatch(MessageKind::KeepComponentInfo));
    };
    let mut emission = Emission::none();
    for component in ctx.source().keep_components(*keep_id) {
        let mut status = 0;
        if component.in_combat {
            status |= 0x01;
        }
        if component.raised {
            status |= 0x02;
        }
        let mut w = ctx.writer(MessageKind::KeepComponentInfo, Channel::Reliable)?;
        w.write_u16(component.keep_id);
        w.write_u16(component.index);
        w.write_u16(component.object_id);
        w.write_u8(component.skin);
        w.write_i8(component.x);
        w.write_i8(component.y);
        w.write_u8(component.heading);
        w.write_u8(component.height);
        w.write_u8(component.health);
        w.write_u8(status);
        emission.push(w);
    }
    Ok(emission)
}
