//! A static world read from TOML, standing in for live game state.

use rampart_protocol_core::{DetailRef, GameStateSource};
use rampart_types::{
    CharacterSummary, Effect, InventoryItem, Keep, KeepComponent, Player, Realm, SkillSet, Title,
};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DelveText {
    pub id: u16,
    pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorldFixture {
    pub account: String,
    pub player: Option<Player>,
    pub others: Vec<Player>,
    pub effects: Vec<Effect>,
    pub items: Vec<InventoryItem>,
    pub keeps: Vec<Keep>,
    pub components: Vec<KeepComponent>,
    pub titles: Vec<Title>,
    pub skills: Option<SkillSet>,
    pub characters: Vec<CharacterSummary>,
    pub delve: Vec<DelveText>,
}

impl WorldFixture {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let world: WorldFixture = toml::from_str(&contents)?;
            tracing::info!(
                players = world.others.len() + world.player.is_some() as usize,
                effects = world.effects.len(),
                items = world.items.len(),
                keeps = world.keeps.len(),
                "World loaded from {}",
                path.display()
            );
            Ok(world)
        } else {
            tracing::info!("No world file found at {}, using an empty world", path.display());
            Ok(Self::default())
        }
    }

    /// Occupied inventory slots, in slot order.
    pub fn item_slots(&self) -> Vec<u16> {
        let mut slots: Vec<u16> = self.items.iter().map(|item| item.slot).collect();
        slots.sort_unstable();
        slots.dedup();
        slots
    }

    /// Delve text for a detail the client asked about.
    pub fn describe(&self, detail: DetailRef) -> String {
        if let Some(entry) = self.delve.iter().find(|d| d.id == detail.id) {
            return entry.text.clone();
        }
        match self.effects.iter().find(|e| e.spell_id == Some(detail.id)) {
            Some(effect) => format!("{} ({}s remaining)", effect.name, effect.remaining_secs()),
            None => format!("No information on {}", detail.id),
        }
    }
}

impl GameStateSource for WorldFixture {
    fn active_player(&self) -> Option<Player> {
        self.player.clone()
    }

    fn visible_player(&self, object_id: u16) -> Option<Player> {
        self.others.iter().find(|p| p.object_id == object_id).cloned()
    }

    fn effects(&self) -> Vec<Effect> {
        self.effects.clone()
    }

    fn inventory_item(&self, slot: u16) -> Option<InventoryItem> {
        self.items.iter().find(|item| item.slot == slot).cloned()
    }

    fn keep(&self, keep_id: u16) -> Option<Keep> {
        self.keeps.iter().find(|k| k.id == keep_id).cloned()
    }

    fn keep_components(&self, keep_id: u16) -> Vec<KeepComponent> {
        self.components
            .iter()
            .filter(|c| c.keep_id == keep_id)
            .cloned()
            .collect()
    }

    fn titles(&self) -> Vec<Title> {
        self.titles.clone()
    }

    fn skills(&self) -> Option<SkillSet> {
        self.skills.clone()
    }

    fn characters(&self, realm: Realm) -> Vec<CharacterSummary> {
        self.characters
            .iter()
            .filter(|c| c.realm == realm)
            .cloned()
            .collect()
    }

    fn account_name(&self) -> String {
        self.account.clone()
    }
}
