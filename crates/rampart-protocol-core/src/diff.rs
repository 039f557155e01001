//! Incremental effect icon updates.
//!
//! The client keeps a slot per visible effect. After the first full send
//! only slots whose content changed are rewritten, and slots that vanished
//! because the list shrank are blanked with placeholder records.

use crate::message::DetailRef;
use crate::state::IconDiff;
use crate::writer::PacketWriter;
use rampart_types::Effect;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use tracing::{trace, warn};

/// How a dialect lays out one icon record.
pub struct IconLayout<F> {
    /// Writes a live record, slot index included.
    pub write_record: F,
    /// Zero bytes following the slot index of a blanked slot.
    pub placeholder_width: usize,
    /// Highest number of slots the record index can address.
    pub max_slots: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IconDiffOutcome {
    pub records: usize,
    pub placeholders: usize,
    /// Spell details referenced by emitted records that the client has not
    /// been sent yet.
    pub details: Vec<DetailRef>,
}

impl IconDiffOutcome {
    pub fn total(&self) -> usize {
        self.records + self.placeholders
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Content of a slot that the client would render differently if it
/// changed. Timers count down on the client and are left out.
fn fingerprint(slot: usize, effect: &Effect) -> u64 {
    let mut hasher = DefaultHasher::new();
    slot.hash(&mut hasher);
    effect.internal_id.hash(&mut hasher);
    effect.icon.hash(&mut hasher);
    effect.spell_id.hash(&mut hasher);
    effect.name.hash(&mut hasher);
    effect.disabled.hash(&mut hasher);
    effect.negative.hash(&mut hasher);
    hasher.finish()
}

/// Append icon records for `effects` to `w` and update `icons`.
///
/// Only effects with a non-zero icon occupy a slot. With a `changed`
/// filter exactly the listed effects are written. Without one, every live
/// slot is written when there is no baseline or the slot count moved, and
/// otherwise only slots whose fingerprint differs. Slots past the new
/// count are blanked. The cache is updated even when nothing is written.
pub fn write_icon_diff<F>(
    w: &mut PacketWriter,
    icons: &mut IconDiff,
    known: &HashSet<DetailRef>,
    effects: &[Effect],
    changed: Option<&[u16]>,
    mut layout: IconLayout<F>,
) -> IconDiffOutcome
where
    F: FnMut(&mut PacketWriter, u8, &Effect),
{
    let mut live: Vec<&Effect> = effects.iter().filter(|e| e.icon != 0).collect();
    if live.len() > layout.max_slots {
        warn!(
            "{} visible effects exceed {} icon slots, dropping {}",
            live.len(),
            layout.max_slots,
            live.len() - layout.max_slots
        );
        live.truncate(layout.max_slots);
    }

    let fingerprints: Vec<u64> = live
        .iter()
        .enumerate()
        .map(|(slot, effect)| fingerprint(slot, effect))
        .collect();
    let previous = icons.baseline().map(<[u64]>::to_vec);
    let previous_count = previous.as_ref().map_or(0, Vec::len);
    let refresh_all = previous.as_ref().map_or(true, |p| p.len() != live.len());

    let mut outcome = IconDiffOutcome::default();
    let mut seen = HashSet::new();
    for (slot, effect) in live.iter().enumerate() {
        let emit = match changed {
            Some(ids) => ids.contains(&effect.internal_id),
            None => {
                refresh_all
                    || previous
                        .as_ref()
                        .map_or(true, |p| p.get(slot) != Some(&fingerprints[slot]))
            }
        };
        if !emit {
            continue;
        }
        (layout.write_record)(w, slot as u8, *effect);
        outcome.records += 1;
        if let Some(spell_id) = effect.spell_id {
            let detail = DetailRef::spell(spell_id);
            if !known.contains(&detail) && seen.insert(detail) {
                outcome.details.push(detail);
            }
        }
    }

    for slot in live.len()..previous_count {
        w.write_u8(slot as u8);
        w.fill(0, layout.placeholder_width);
        outcome.placeholders += 1;
    }

    trace!(
        live = live.len(),
        previous = previous_count,
        records = outcome.records,
        placeholders = outcome.placeholders,
        "Icon diff"
    );
    icons.track(fingerprints);
    outcome
}
