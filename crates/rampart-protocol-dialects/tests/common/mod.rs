#![allow(dead_code)]

use rampart_protocol_core::{
    ConnectionBinding, DetailLookup, DetailRef, Encoder, GameStateSource, Packet, ProtocolVersion,
    RecordingSink,
};
use rampart_protocol_dialects::standard_registry;
use rampart_types::*;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Mutable in-memory world for one connection.
#[derive(Default)]
pub struct TestWorld {
    pub player: Mutex<Option<Player>>,
    pub others: Mutex<Vec<Player>>,
    pub effects: Mutex<Vec<Effect>>,
    pub items: Mutex<Vec<InventoryItem>>,
    pub keeps: Mutex<Vec<Keep>>,
    pub components: Mutex<Vec<KeepComponent>>,
    pub titles: Mutex<Vec<Title>>,
    pub skills: Mutex<Option<SkillSet>>,
    pub characters: Mutex<Vec<CharacterSummary>>,
}

impl GameStateSource for TestWorld {
    fn active_player(&self) -> Option<Player> {
        self.player.lock().unwrap().clone()
    }

    fn visible_player(&self, object_id: u16) -> Option<Player> {
        self.others
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.object_id == object_id)
            .cloned()
    }

    fn effects(&self) -> Vec<Effect> {
        self.effects.lock().unwrap().clone()
    }

    fn inventory_item(&self, slot: u16) -> Option<InventoryItem> {
        self.items
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.slot == slot)
            .cloned()
    }

    fn keep(&self, keep_id: u16) -> Option<Keep> {
        self.keeps
            .lock()
            .unwrap()
            .iter()
            .find(|k| k.id == keep_id)
            .cloned()
    }

    fn keep_components(&self, keep_id: u16) -> Vec<KeepComponent> {
        self.components
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.keep_id == keep_id)
            .cloned()
            .collect()
    }

    fn titles(&self) -> Vec<Title> {
        self.titles.lock().unwrap().clone()
    }

    fn skills(&self) -> Option<SkillSet> {
        self.skills.lock().unwrap().clone()
    }

    fn characters(&self, realm: Realm) -> Vec<CharacterSummary> {
        self.characters
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.realm == realm)
            .cloned()
            .collect()
    }

    fn account_name(&self) -> String {
        "tester".into()
    }
}

#[derive(Default)]
pub struct Lookups(pub Mutex<Vec<DetailRef>>);

impl DetailLookup for Lookups {
    fn request_detail(&self, detail: DetailRef) {
        self.0.lock().unwrap().push(detail);
    }
}

pub fn player(object_id: u16) -> Player {
    Player {
        internal_id: Uuid::new_v4(),
        session_id: object_id + 1000,
        object_id,
        name: format!("Player{object_id}"),
        last_name: "Smith".into(),
        guild_name: "Guild".into(),
        realm: Realm::Albion,
        level: 50,
        model: 34,
        position: Position {
            region: 1,
            x: 560_000,
            y: 510_000,
            z: 2_900,
            heading: 2048,
        },
        zone: Zone {
            id: 20,
            skin: 7,
            x_offset: 532_480,
            y_offset: 491_520,
        },
        health: Pool::new(800, 1000),
        mana: Pool::new(50, 200),
        endurance: Pool::new(100, 100),
        concentration: Pool::new(10, 40),
        alive: true,
        current_title: 3,
        ..Player::default()
    }
}

pub fn effect(id: u16) -> Effect {
    Effect {
        internal_id: id,
        icon: 100 + id,
        remaining_ms: 60_000,
        name: format!("Buff {id}"),
        spell_id: Some(5000 + id),
        ..Effect::default()
    }
}

pub struct Session {
    pub world: Arc<TestWorld>,
    pub sink: Arc<RecordingSink>,
    pub lookups: Arc<Lookups>,
    pub encoder: Encoder,
}

impl Session {
    pub fn take(&self) -> Vec<Packet> {
        self.sink.take()
    }
}

/// A negotiated session on the standard registry with an active player.
pub fn session(version: u16) -> Session {
    let world = Arc::new(TestWorld::default());
    *world.player.lock().unwrap() = Some(player(1));
    let sink = Arc::new(RecordingSink::new());
    let lookups = Arc::new(Lookups::default());
    let binding = ConnectionBinding::new(world.clone(), sink.clone()).with_details(lookups.clone());
    let encoder = standard_registry()
        .unwrap()
        .negotiate(ProtocolVersion(version), binding)
        .unwrap();
    Session {
        world,
        sink,
        lookups,
        encoder,
    }
}
