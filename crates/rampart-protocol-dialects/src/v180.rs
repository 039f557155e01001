//! Client 1.80. The skill window gets numbered pages and wider entries,
//! with a smaller page budget.

use crate::v176;
use rampart_protocol_core::{
    paginate, Backpatch, Channel, Dialect, EncodeContext, EncodeResult, Emission, FieldWidth, Limits,
    MessageKind, PageHeader, PageLimits, ProtocolVersion, Request,
};
use rampart_types::SkillEntry;

pub const VERSION: ProtocolVersion = ProtocolVersion(180);
pub const PARENT: ProtocolVersion = v176::VERSION;

pub fn limits() -> Limits {
    Limits {
        skill_page_budget: 1400,
        ..crate::v168::limits()
    }
}

pub fn dialect() -> Dialect {
    Dialect::derive(VERSION, PARENT)
        .limits(limits())
        .handle(MessageKind::UpdatePlayerSkills, update_player_skills)
}

/// Header `[u8 count][u8 0x01][u8 first index][u8 more][u8 page]`,
/// entries `[u8 level][u8 kind][u16 id][u16 icon][u8 line][u8 0]
/// [pascal name]`.
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
            w.fill(0, 5);
            Ok(w)
        },
        |w, _, entry: &SkillEntry| {
            w.write_u8(entry.level);
            w.write_u8(entry.kind.id());
            w.write_u16(entry.id);
            w.write_u16(entry.icon);
            w.write_u8(entry.line);
            w.write_u8(0);
            w.write_pascal_string(&entry.name);
        },
        |w, header: PageHeader| {
            Backpatch::at(0, FieldWidth::U8).patch(w, header.count)?;
            Backpatch::at(1, FieldWidth::U8).patch(w, 0x01)?;
            Backpatch::at(2, FieldWidth::U8).patch(w, header.first_index)?;
            Backpatch::at(3, FieldWidth::U8).patch(w, header.more as usize)?;
            Backpatch::at(4, FieldWidth::U8).patch(w, header.page)
        },
    )?;
    Ok(Emission {
        packets: pages,
        details: Vec::new(),
    })
}
