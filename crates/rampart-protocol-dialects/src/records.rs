//! Field groups shared by several dialects.

use rampart_protocol_core::{
    write_icon_diff, Backpatch, BlockSummary, Bound, BoundedBlock, Channel, EncodeContext,
    EncodeResult, Emission, FieldWidth, IconLayout, MessageKind, PacketWriter, Request,
    MAX_BODY_LEN,
};
use rampart_types::{CharacterSummary, Effect, FaceAttributes, InventoryItem, Player, Title};
use tracing::warn;

/// Character slots per realm on the select screen.
pub const CHARACTER_SLOTS: usize = 10;

/// The viewing player and the player an object id refers to. The active
/// player may refer to itself.
pub fn viewer_and_target(ctx: &EncodeContext<'_>, object_id: u16) -> Option<(Player, Player)> {
    let viewer = ctx.source().active_player()?;
    let target = if viewer.object_id == object_id {
        viewer.clone()
    } else {
        ctx.source().visible_player(object_id)?
    };
    Some((viewer, target))
}

pub fn player_flags(player: &Player) -> u8 {
    let mut flags = 0;
    if !player.alive {
        flags |= 0x01;
    }
    if player.stealthed {
        flags |= 0x02;
    }
    if player.sitting {
        flags |= 0x04;
    }
    flags
}

pub fn write_face(w: &mut PacketWriter, face: &FaceAttributes) {
    w.write_u8(face.eye_size);
    w.write_u8(face.lip_size);
    w.write_u8(face.eye_color);
    w.write_u8(face.hair_color);
    w.write_u8(face.face_type);
    w.write_u8(face.hair_style);
    w.write_u8(face.mood);
}

/// Name, guild and last name as the viewer sees them.
pub fn write_names(ctx: &EncodeContext<'_>, w: &mut PacketWriter, viewer: &Player, target: &Player) {
    let names = ctx.names();
    w.write_pascal_string(&names.player_name(viewer, target));
    w.write_pascal_string(&names.guild_name(viewer, target));
    w.write_pascal_string(&names.last_name(viewer, target));
}

/// Listing slots for one realm, indexed by slot number.
pub fn character_slots(characters: &[CharacterSummary]) -> [Option<&CharacterSummary>; CHARACTER_SLOTS] {
    let mut slots = [None; CHARACTER_SLOTS];
    for character in characters {
        match slots.get_mut(character.slot as usize) {
            Some(slot) => *slot = Some(character),
            None => warn!(
                name = %character.name,
                slot = character.slot,
                "Character outside the listing, skipped"
            ),
        }
    }
    slots
}

/// Width of the character fields every overview record starts with.
pub const CHARACTER_CORE_LEN: usize = 48 + 24 + 24 + 24 + 1 + 1 + 1 + 1 + 2;

/// `[48 name][24 zone][24 class][24 race][u8 level][u8 class][u8 realm]
/// [u8 race | gender << 4][u16 region]`
pub fn write_character_core(w: &mut PacketWriter, c: &CharacterSummary) {
    w.write_fixed_string(&c.name, 48);
    w.write_fixed_string(&c.zone_name, 24);
    w.write_fixed_string(&c.class_name, 24);
    w.write_fixed_string(&c.race_name, 24);
    w.write_u8(c.level);
    w.write_u8(c.class_id);
    w.write_u8(c.realm.id());
    let race = w.clamp_field("race", c.race, 0x0F) as u8;
    let gender = w.clamp_field("gender", c.gender, 0x0F) as u8;
    w.write_u8(race | (gender << 4));
    w.write_u16(c.region);
}

/// How an inventory record is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemLayout {
    /// Extension byte after the effect.
    pub extension: bool,
    /// 16-bit colour followed by a 16-bit emblem instead of an 8-bit colour.
    pub wide_color: bool,
}

impl ItemLayout {
    /// Bytes after the slot index, name excluded.
    pub fn fixed_len(self) -> usize {
        let color = if self.wide_color { 4 } else { 1 };
        let extension = if self.extension { 1 } else { 0 };
        12 + 2 + color + 1 + extension + 2
    }
}

/// `[u8 slot][u8 level][u8 dps/af][u8 spd/abs][u8 hand][u8 damage type]
/// [u8 object type][u16 weight][u8 condition][u8 durability][u8 quality]
/// [u8 bonus][u16 model][colour][u8 effect]([u8 extension])[u16 count]
/// [pascal name]`. An empty slot is the slot index followed by zeros.
pub fn write_item(w: &mut PacketWriter, slot: u8, item: Option<&InventoryItem>, layout: ItemLayout) {
    w.write_u8(slot);
    let Some(item) = item else {
        w.fill(0, layout.fixed_len());
        w.write_u8(0);
        return;
    };
    w.write_u8(item.level);
    w.write_u8(item.dps_af);
    w.write_u8(item.spd_abs);
    w.write_u8(item.hand);
    w.write_u8(item.damage_type);
    w.write_u8(item.object_type);
    w.write_u16(item.weight);
    w.write_u8(item.condition);
    w.write_u8(item.durability);
    w.write_u8(item.quality);
    w.write_u8(item.bonus);
    w.write_u16(item.model);
    if layout.wide_color {
        w.write_u16(item.color);
        w.write_u16(item.emblem);
    } else {
        w.write_u8_clamped("colour", item.color);
    }
    w.write_u8(item.effect);
    if layout.extension {
        w.write_u8(item.extension);
    }
    w.write_u16(item.count);
    w.write_pascal_string(&item.name);
}

/// `[u8 count][u8 window 0][records]`. Only slots the client can address
/// are sent, and only as many records as fit in one frame.
pub fn encode_inventory(
    ctx: &mut EncodeContext<'_>,
    req: &Request,
    layout: ItemLayout,
) -> EncodeResult<Emission> {
    let Request::InventoryUpdate { slots } = req else {
        return Err(req.mismatch(MessageKind::InventoryUpdate));
    };
    if slots.is_empty() {
        return Ok(Emission::none());
    }
    let mut w = ctx.writer(MessageKind::InventoryUpdate, Channel::Reliable)?;
    let mut block =
        BoundedBlock::begin(&mut w, FieldWidth::U8, Bound::Count).within_packet(MAX_BODY_LEN);
    w.write_u8(0);
    for &slot in slots {
        let Ok(index) = u8::try_from(slot) else {
            warn!(slot, "Inventory slot out of range, skipped");
            continue;
        };
        let item = ctx.source().inventory_item(slot);
        block.push(&mut w, |w| write_item(w, index, item.as_ref(), layout));
    }
    block.finish(&mut w)?;
    Ok(Emission::single(w))
}

/// `[u8 length][entries]`, each entry `[u16 id][pascal text]`. Entries
/// that would overflow the length byte are dropped.
pub fn write_titles(w: &mut PacketWriter, titles: &[Title]) -> EncodeResult<BlockSummary> {
    let mut block = BoundedBlock::begin(w, FieldWidth::U8, Bound::Length);
    for title in titles {
        block.push(w, |w| {
            w.write_u16(title.id);
            w.write_pascal_string(&title.text);
        });
    }
    block.finish(w)
}

/// Shared body of the icon bar encoders: `[u8 0][u8 count][records]`.
/// Nothing is sent when the diff finds no changes.
pub fn encode_icons(
    ctx: &mut EncodeContext<'_>,
    req: &Request,
    placeholder_width: usize,
    write_record: fn(&mut PacketWriter, u8, &Effect),
) -> EncodeResult<Emission> {
    let Request::UpdateIcons { changed } = req else {
        return Err(req.mismatch(MessageKind::UpdateIcons));
    };
    if ctx.source().active_player().is_none() {
        return Ok(Emission::none());
    }
    let effects = ctx.source().effects();
    let max_slots = ctx.limits().max_icons;
    let mut w = ctx.writer(MessageKind::UpdateIcons, Channel::Reliable)?;
    w.write_u8(0);
    let count = Backpatch::reserve(&mut w, FieldWidth::U8);

    let state = ctx.state();
    let outcome = write_icon_diff(
        &mut w,
        &mut state.icons,
        &state.known_details,
        &effects,
        changed.as_deref(),
        IconLayout {
            write_record,
            placeholder_width,
            max_slots,
        },
    );
    if outcome.is_empty() {
        return Ok(Emission::none());
    }
    count.patch(&mut w, outcome.total())?;
    let mut emission = Emission::single(w);
    emission.details = outcome.details;
    Ok(emission)
}
