//! Client 1.73. Inventory records gain an extension byte.

use crate::records::{encode_inventory, ItemLayout};
use crate::v172;
use rampart_protocol_core::{Dialect, EncodeContext, EncodeResult, Emission, MessageKind, ProtocolVersion, Request};

pub const VERSION: ProtocolVersion = ProtocolVersion(173);
pub const PARENT: ProtocolVersion = v172::VERSION;

pub fn dialect() -> Dialect {
    Dialect::derive(VERSION, PARENT).handle(MessageKind::InventoryUpdate, inventory_update)
}

fn inventory_update(ctx: &mut EncodeContext<'_>, req: &Request) -> EncodeResult<Emission> {
    encode_inventory(
        ctx,
        req,
        ItemLayout {
            extension: true,
            wide_color: false,
        },
    )
}
