use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Realm enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Realm {
    #[default]
    None = 0,
    Albion = 1,
    Midgard = 2,
    Hibernia = 3,
}

impl Realm {
    pub fn id(self) -> u8 {
        self as u8
    }
}

/// A world position: region plus absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub region: u16,
    pub x: u32,
    pub y: u32,
    pub z: u16,
    /// 0..4096 for a full turn.
    pub heading: u16,
}

/// The zone a position falls into. Older clients address objects relative
/// to the zone origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Zone {
    pub id: u16,
    pub skin: u8,
    pub x_offset: u32,
    pub y_offset: u32,
}

/// A current/max resource pair (health, mana, endurance, concentration).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pool {
    pub current: u32,
    pub max: u32,
}

impl Pool {
    pub fn new(current: u32, max: u32) -> Self {
        Self { current, max }
    }

    /// Percentage filled, clamped to 0..=100. An empty pool reads 0.
    pub fn percent(&self) -> u8 {
        if self.max == 0 {
            return 0;
        }
        let pct = (self.current as u64 * 100) / self.max as u64;
        pct.min(100) as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FaceAttributes {
    pub eye_size: u8,
    pub lip_size: u8,
    pub eye_color: u8,
    pub hair_color: u8,
    pub face_type: u8,
    pub hair_style: u8,
    pub mood: u8,
}

/// Snapshot of a player as seen by the encoding layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Player {
    pub internal_id: Uuid,
    pub session_id: u16,
    pub object_id: u16,
    pub name: String,
    pub last_name: String,
    pub guild_name: String,
    pub realm: Realm,
    pub level: u8,
    pub model: u16,
    pub race: u8,
    pub class_id: u8,
    pub position: Position,
    pub zone: Zone,
    pub face: FaceAttributes,
    pub health: Pool,
    pub mana: Pool,
    pub endurance: Pool,
    pub concentration: Pool,
    pub speed: u16,
    pub sitting: bool,
    pub alive: bool,
    pub stealthed: bool,
    pub current_title: u16,
}

impl Player {
    /// X coordinate relative to the zone origin. Negative when the position
    /// lies before the origin.
    pub fn zone_x(&self) -> i64 {
        self.position.x as i64 - self.zone.x_offset as i64
    }

    /// Y coordinate relative to the zone origin.
    pub fn zone_y(&self) -> i64 {
        self.position.y as i64 - self.zone.y_offset as i64
    }
}

/// An active effect on the player (spell buff, ability, etc.).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Effect {
    pub internal_id: u16,
    /// Icon id; effects with icon 0 are invisible to the client.
    pub icon: u16,
    pub remaining_ms: u32,
    pub name: String,
    /// Present when the effect is backed by a spell.
    pub spell_id: Option<u16>,
    pub disabled: bool,
    pub negative: bool,
}

impl Effect {
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_ms / 1000
    }

    /// Id shown to the client: the spell id for spell effects, otherwise
    /// the effect's own id.
    pub fn display_id(&self) -> u16 {
        self.spell_id.unwrap_or(self.internal_id)
    }
}

/// An item stack in an inventory slot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryItem {
    pub slot: u16,
    pub name: String,
    pub level: u8,
    pub dps_af: u8,
    pub spd_abs: u8,
    pub hand: u8,
    pub object_type: u8,
    pub damage_type: u8,
    pub weight: u16,
    pub count: u16,
    /// Condition percentage.
    pub condition: u8,
    /// Durability percentage.
    pub durability: u8,
    pub quality: u8,
    pub bonus: u8,
    pub model: u16,
    pub color: u16,
    pub effect: u8,
    pub extension: u8,
    pub emblem: u16,
}

/// A keep (or standalone tower) on the frontier map.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Keep {
    pub id: u16,
    pub name: String,
    pub realm: Realm,
    pub level: u8,
    pub x: u32,
    pub y: u32,
    pub heading: u16,
    pub under_attack: bool,
    pub claimed_by: Option<String>,
}

/// A wall, gate or tower piece of a keep.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeepComponent {
    pub keep_id: u16,
    pub index: u16,
    pub object_id: u16,
    pub skin: u8,
    pub x: i8,
    pub y: i8,
    pub heading: u8,
    pub height: u8,
    /// Health percentage.
    pub health: u8,
    pub in_combat: bool,
    pub raised: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Title {
    pub id: u16,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Specialization {
    pub id: u16,
    pub name: String,
    pub level: u8,
    pub icon: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Ability {
    pub id: u16,
    pub name: String,
    pub level: u8,
    pub icon: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    pub id: u16,
    pub name: String,
    pub level: u8,
    pub icon: u16,
    /// Specialization the style is trained under.
    pub spec_id: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Spell {
    pub id: u16,
    pub name: String,
    pub level: u8,
    pub icon: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellLine {
    pub id: u16,
    pub name: String,
    pub level: u8,
    pub spells: Vec<Spell>,
}

/// Everything that shows up in the client's skill window.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillSet {
    pub specializations: Vec<Specialization>,
    pub abilities: Vec<Ability>,
    pub styles: Vec<Style>,
    pub spell_lines: Vec<SpellLine>,
}

/// Skill page of a flattened skill entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SkillKind {
    Specialization = 0,
    Ability = 1,
    Style = 2,
    Spell = 3,
}

impl SkillKind {
    pub fn id(self) -> u8 {
        self as u8
    }
}

/// One row of the flattened skill list, in client index order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillEntry {
    pub kind: SkillKind,
    pub id: u16,
    pub name: String,
    pub level: u8,
    pub icon: u16,
    /// Spell line index for spells, otherwise 0.
    pub line: u8,
}

/// Equipment models shown on the character select screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Equipment {
    pub helmet: u16,
    pub gloves: u16,
    pub boots: u16,
    pub chest: u16,
    pub cloak: u16,
}

/// A character on the account, as listed on the character select screen.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterSummary {
    /// Slot within the realm (0..10).
    pub slot: u8,
    pub name: String,
    pub level: u8,
    pub class_id: u8,
    pub class_name: String,
    pub race: u8,
    pub race_name: String,
    pub gender: u8,
    pub realm: Realm,
    pub region: u16,
    pub zone_name: String,
    pub x: u32,
    pub y: u32,
    pub equipment: Equipment,
}
