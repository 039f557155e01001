//! Client 1.76. Inventory colours widen to 16 bits with a guild emblem and
//! the titles window opens on the current title.

use crate::records::{encode_inventory, write_titles, ItemLayout};
use crate::v175;
use rampart_protocol_core::{
    Backpatch, Channel, Dialect, EncodeContext, EncodeResult, Emission, FieldWidth, MessageKind,
    ProtocolVersion, Request,
};

pub const VERSION: ProtocolVersion = ProtocolVersion(176);
pub const PARENT: ProtocolVersion = v175::VERSION;

pub fn dialect() -> Dialect {
    Dialect::derive(VERSION, PARENT)
        .handle(MessageKind::InventoryUpdate, inventory_update)
        .handle(MessageKind::PlayerTitles, player_titles)
}

fn inventory_update(ctx: &mut EncodeContext<'_>, req: &Request) -> EncodeResult<Emission> {
    encode_inventory(
        ctx,
        req,
        ItemLayout {
            extension: true,
            wide_color: true,
        },
    )
}

/// `[u16 current title][u8 count][titles block]`
fn player_titles(ctx: &mut EncodeContext<'_>, req: &Request) -> EncodeResult<Emission> {
    if !matches!(req, Request::PlayerTitles) {
        return Err(req.mismatch(MessageKind::PlayerTitles));
    }
    let Some(player) = ctx.source().active_player() else {
        return Ok(Emission::none());
    };
    let titles = ctx.source().titles();
    let mut w = ctx.writer(MessageKind::PlayerTitles, Channel::Reliable)?;
    w.write_u16(player.current_title);
    let count = Backpatch::reserve(&mut w, FieldWidth::U8);
    let block = write_titles(&mut w, &titles)?;
    count.patch(&mut w, block.entries)?;
    Ok(Emission::single(w))
}
