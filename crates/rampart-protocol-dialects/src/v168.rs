//! Client 1.68, the root of the lineage. Implements every message.
//!
//! Coordinates are zone-relative 16-bit values. Unless stated otherwise
//! integers are big-endian.

use crate::records::{
    character_slots, encode_icons, encode_inventory, player_flags, viewer_and_target, write_character_core,
    write_face, write_names, write_titles, ItemLayout, CHARACTER_CORE_LEN,
};
use rampart_protocol_core::{
    paginate, Backpatch, Channel, Dialect, EncodeContext, EncodeResult, Emission, FieldWidth, Limits,
    MessageKind, PacketWriter, PageHeader, PageLimits, ProtocolVersion, Request,
};
use rampart_types::{Effect, SkillEntry};

pub const VERSION: ProtocolVersion = ProtocolVersion(168);

/// Zero bytes after the slot index of a blanked icon record.
pub const ICON_PLACEHOLDER_WIDTH: usize = 7;

pub fn limits() -> Limits {
    Limits {
        skill_page_budget: 2000,
        max_skill_entries: 255,
        max_icons: 255,
        delve_max_len: 2048,
    }
}

pub fn dialect() -> Dialect {
    Dialect::root(VERSION)
        .limits(limits())
        .handle(MessageKind::CharacterOverview, character_overview)
        .handle(MessageKind::PlayerCreate, player_create)
        .handle(MessageKind::PlayerPosition, player_position)
        .handle(MessageKind::StatusUpdate, status_update)
        .handle(MessageKind::UpdateIcons, update_icons)
        .handle(MessageKind::UpdatePlayerSkills, update_player_skills)
        .handle(MessageKind::InventoryUpdate, inventory_update)
        .handle(MessageKind::KeepInfo, keep_info)
        .handle(MessageKind::KeepComponentInfo, keep_component_info)
        .handle(MessageKind::PlayerTitles, player_titles)
        .handle(MessageKind::DelveInfo, delve_info)
}

/// `[24 account]` then ten slots of `[character core]`, zero filled when
/// the slot is empty.
fn character_overview(ctx: &mut EncodeContext<'_>, req: &Request) -> EncodeResult<Emission> {
    let Request::CharacterOverview { realm } = req else {
        return Err(req.mismatch(MessageKind::CharacterOverview));
    };
    let characters = ctx.source().characters(*realm);
    let mut w = ctx.writer(MessageKind::CharacterOverview, Channel::Reliable)?;
    w.write_fixed_string(&ctx.source().account_name(), 24);
    for slot in character_slots(&characters) {
        match slot {
            Some(c) => write_character_core(&mut w, c),
            None => w.fill(0, CHARACTER_CORE_LEN),
        }
    }
    Ok(Emission::single(w))
}

/// `[u16 session][u16 object][u16 model][u16 zone][u16 x][u16 y][u16 z]
/// [u16 heading][u8 realm][u8 level][u8 flags][7 face][pascal name]
/// [pascal guild][pascal last name]`
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
    w.write_u16(target.zone.id);
    w.write_u16_clamped("zone x", target.zone_x());
    w.write_u16_clamped("zone y", target.zone_y());
    w.write_u16(target.position.z);
    w.write_u16(target.position.heading);
    w.write_u8(target.realm.id());
    w.write_u8(target.level);
    w.write_u8(player_flags(&target));
    write_face(&mut w, &target.face);
    write_names(ctx, &mut w, &viewer, &target);
    Ok(Emission::single(w))
}

/// `[u16 session][u16 speed][u16 z][u16 x][u16 y][u16 zone][u16 heading]
/// [u8 flags][u8 health %]`. Sent unreliably once UDP is confirmed.
fn player_position(ctx: &mut EncodeContext<'_>, req: &Request) -> EncodeResult<Emission> {
    let Request::PlayerPosition { object_id } = req else {
        return Err(req.mismatch(MessageKind::PlayerPosition));
    };
    let Some((_, target)) = viewer_and_target(ctx, *object_id) else {
        return Ok(Emission::none());
    };
    let channel = ctx.channel_for(MessageKind::PlayerPosition);
    let mut w = ctx.writer(MessageKind::PlayerPosition, channel)?;
    w.write_u16(target.session_id);
    w.write_u16(target.speed);
    w.write_u16(target.position.z);
    w.write_u16_clamped("zone x", target.zone_x());
    w.write_u16_clamped("zone y", target.zone_y());
    w.write_u16(target.zone.id);
    w.write_u16(target.position.heading);
    w.write_u8(player_flags(&target));
    w.write_u8(target.health.percent());
    Ok(Emission::single(w))
}

/// `[u8 health %][u8 mana %][u8 endurance %][u8 concentration %][u8 sitting]`
fn status_update(ctx: &mut EncodeContext<'_>, req: &Request) -> EncodeResult<Emission> {
    if !matches!(req, Request::StatusUpdate) {
        return Err(req.mismatch(MessageKind::StatusUpdate));
    }
    let Some(player) = ctx.source().active_player() else {
        return Ok(Emission::none());
    };
    let mut w = ctx.writer(MessageKind::StatusUpdate, Channel::Reliable)?;
    w.write_u8(player.health.percent());
    w.write_u8(player.mana.percent());
    w.write_u8(player.endurance.percent());
    w.write_u8(player.concentration.percent());
    w.write_bool(player.sitting);
    Ok(Emission::single(w))
}

/// Record: `[u8 slot][u16 icon][u16 seconds][u16 id][pascal name]`.
fn icon_record(w: &mut PacketWriter, slot: u8, effect: &Effect) {
    w.write_u8(slot);
    w.write_u16(effect.icon);
    w.write_u16_clamped("remaining", effect.remaining_secs());
    w.write_u16(effect.display_id());
    w.write_pascal_string(&effect.name);
}

fn update_icons(ctx: &mut EncodeContext<'_>, req: &Request) -> EncodeResult<Emission> {
    encode_icons(ctx, req, ICON_PLACEHOLDER_WIDTH, icon_record)
}

/// Paged. Header `[u8 count][u8 0x01][u8 first index][u8 more]`, entries
/// `[u8 level][u8 kind][u16 icon][u8 line][pascal name]`.
fn update_player_skills(ctx: &mut EncodeContext<'_>, req: &Request) -> EncodeResult<Emission> {
    if !matches!(req, Request::UpdatePlayerSkills) {
        return Err(req.mismatch(MessageKind::UpdatePlayerSkills));
    }
    let Some(skills) = ctx.source().skills() else {
        return Ok(Emission::none());
    };
    let entries = ctx.state().skills.rebuild(&skills);
    let limits = PageLimits {
        budget: ctx.limits().skill_page_budget,
        max_entries: ctx.limits().max_skill_entries,
    };
    let pages = paginate(
        &entries[..],
        limits,
        |_| {
            let mut w = ctx.writer(MessageKind::UpdatePlayerSkills, Channel::Reliable)?;
            w.fill(0, 4);
            Ok(w)
        },
        |w, _, entry: &SkillEntry| {
            w.write_u8(entry.level);
            w.write_u8(entry.kind.id());
            w.write_u16(entry.icon);
            w.write_u8(entry.line);
            w.write_pascal_string(&entry.name);
        },
        |w, header: PageHeader| {
            Backpatch::at(0, FieldWidth::U8).patch(w, header.count)?;
            Backpatch::at(1, FieldWidth::U8).patch(w, 0x01)?;
            Backpatch::at(2, FieldWidth::U8).patch(w, header.first_index)?;
            Backpatch::at(3, FieldWidth::U8).patch(w, header.more as usize)
        },
    )?;
    Ok(Emission {
        packets: pages,
        details: Vec::new(),
    })
}

fn inventory_update(ctx: &mut EncodeContext<'_>, req: &Request) -> EncodeResult<Emission> {
    encode_inventory(
        ctx,
        req,
        ItemLayout {
            extension: false,
            wide_color: false,
        },
    )
}

/// `[u16 keep][u32 x][u32 y][u16 heading][u8 realm][u8 level][pascal name]
/// [pascal claimed by]`
fn keep_info(ctx: &mut EncodeContext<'_>, req: &Request) -> EncodeResult<Emission> {
    let Request::KeepInfo { keep_id } = req else {
        return Err(req.mismatch(MessageKind::KeepInfo));
    };
    let Some(keep) = ctx.source().keep(*keep_id) else {
        return Ok(Emission::none());
    };
    let mut w = ctx.writer(MessageKind::KeepInfo, Channel::Reliable)?;
    w.write_u16(keep.id);
    w.write_u32(keep.x);
    w.write_u32(keep.y);
    w.write_u16(keep.heading);
    w.write_u8(keep.realm.id());
    w.write_u8(keep.level);
    w.write_pascal_string(&keep.name);
    w.write_pascal_string(keep.claimed_by.as_deref().unwrap_or(""));
    Ok(Emission::single(w))
}

/// One packet per component: `[u16 keep][u16 index][u16 object][i8 x][i8 y]
/// [u8 heading][u8 height][u8 health]`.
fn keep_component_info(ctx: &mut EncodeContext<'_>, req: &Request) -> EncodeResult<Emission> {
    let Request::KeepComponentInfo { keep_id } = req else {
        return Err(req.mismatch(MessageKind::KeepComponentInfo));
    };
    let mut emission = Emission::none();
    for component in ctx.source().keep_components(*keep_id) {
        let mut w = ctx.writer(MessageKind::KeepComponentInfo, Channel::Reliable)?;
        w.write_u16(component.keep_id);
        w.write_u16(component.index);
        w.write_u16(component.object_id);
        w.write_i8(component.x);
        w.write_i8(component.y);
        w.write_u8(component.heading);
        w.write_u8(component.height);
        w.write_u8(component.health);
        emission.push(w);
    }
    Ok(emission)
}

/// `[u8 count][titles block]`
fn player_titles(ctx: &mut EncodeContext<'_>, req: &Request) -> EncodeResult<Emission> {
    if !matches!(req, Request::PlayerTitles) {
        return Err(req.mismatch(MessageKind::PlayerTitles));
    }
    if ctx.source().active_player().is_none() {
        return Ok(Emission::none());
    }
    let titles = ctx.source().titles();
    let mut w = ctx.writer(MessageKind::PlayerTitles, Channel::Reliable)?;
    let count = Backpatch::reserve(&mut w, FieldWidth::U8);
    let block = write_titles(&mut w, &titles)?;
    count.patch(&mut w, block.entries)?;
    Ok(Emission::single(w))
}

/// `[u8 detail kind][u16 id][text, zero terminated]`
fn delve_info(ctx: &mut EncodeContext<'_>, req: &Request) -> EncodeResult<Emission> {
    let Request::DelveInfo { detail, text } = req else {
        return Err(req.mismatch(MessageKind::DelveInfo));
    };
    let max = ctx.limits().delve_max_len;
    let mut w = ctx.writer(MessageKind::DelveInfo, Channel::Reliable)?;
    w.write_u8(detail.kind.id());
    w.write_u16(detail.id);
    w.write_terminated_string(text, max);
    Ok(Emission::single(w))
}
