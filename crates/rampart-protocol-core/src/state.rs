use crate::message::DetailRef;
use rampart_types::{SkillEntry, SkillKind, SkillSet};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

/// What the client was last told about the effect icon bar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IconDiff {
    /// Nothing sent yet on this connection.
    #[default]
    NoBaseline,
    /// One fingerprint per slot, in slot order.
    Tracking { fingerprints: Vec<u64> },
}

impl IconDiff {
    pub fn baseline(&self) -> Option<&[u64]> {
        match self {
            IconDiff::NoBaseline => None,
            IconDiff::Tracking { fingerprints } => Some(fingerprints),
        }
    }

    /// Number of slots the client currently displays.
    pub fn last_count(&self) -> usize {
        self.baseline().map_or(0, <[u64]>::len)
    }

    pub fn track(&mut self, fingerprints: Vec<u64>) {
        *self = IconDiff::Tracking { fingerprints };
    }

    pub fn reset(&mut self) {
        *self = IconDiff::NoBaseline;
    }
}

/// The flattened skill list last sent, so client skill indices can be
/// mapped back to skills.
#[derive(Debug, Clone, Default)]
pub struct SkillListCache {
    entries: Option<Arc<[SkillEntry]>>,
}

impl SkillListCache {
    /// Flatten `skills` and remember the result.
    pub fn rebuild(&mut self, skills: &SkillSet) -> Arc<[SkillEntry]> {
        let entries: Arc<[SkillEntry]> = flatten_skills(skills).into();
        self.entries = Some(Arc::clone(&entries));
        entries
    }

    pub fn get(&self, index: usize) -> Option<&SkillEntry> {
        self.entries.as_ref().and_then(|e| e.get(index))
    }

    pub fn entries(&self) -> Option<Arc<[SkillEntry]>> {
        self.entries.clone()
    }

    pub fn clear(&mut self) {
        self.entries = None;
    }
}

/// Client index order: specializations, abilities, styles, then every
/// spell line's spells. A spell's `line` is its line's position in the
/// set, clamped to 255 with a warning.
pub fn flatten_skills(skills: &SkillSet) -> Vec<SkillEntry> {
    let mut out = Vec::new();
    for spec in &skills.specializations {
        out.push(SkillEntry {
            kind: SkillKind::Specialization,
            id: spec.id,
            name: spec.name.clone(),
            level: spec.level,
            icon: spec.icon,
            line: 0,
        });
    }
    for ability in &skills.abilities {
        out.push(SkillEntry {
            kind: SkillKind::Ability,
            id: ability.id,
            name: ability.name.clone(),
            level: ability.level,
            icon: ability.icon,
            line: 0,
        });
    }
    for style in &skills.styles {
        out.push(SkillEntry {
            kind: SkillKind::Style,
            id: style.id,
            name: style.name.clone(),
            level: style.level,
            icon: style.icon,
            line: 0,
        });
    }
    for (index, line) in skills.spell_lines.iter().enumerate() {
        let line_index = match u8::try_from(index) {
            Ok(line_index) => line_index,
            Err(_) => {
                warn!(line = line.id, index, "Spell line index out of range, clamped to 255");
                u8::MAX
            }
        };
        for spell in &line.spells {
            out.push(SkillEntry {
                kind: SkillKind::Spell,
                id: spell.id,
                name: spell.name.clone(),
                level: spell.level,
                icon: spell.icon,
                line: line_index,
            });
        }
    }
    out
}

/// Everything one connection's encoder remembers between sends.
#[derive(Debug, Default)]
pub struct SessionState {
    pub icons: IconDiff,
    pub skills: SkillListCache,
    /// Details the client has already been sent.
    pub known_details: HashSet<DetailRef>,
    /// Unreliable sends are allowed once the client confirmed UDP.
    pub udp_confirmed: bool,
}

impl SessionState {
    pub fn reset(&mut self) {
        *self = SessionState::default();
    }
}
