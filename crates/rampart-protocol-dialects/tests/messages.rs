mod common;

use common::{player, session, TestWorld};
use rampart_protocol_core::{
    Channel, ConnectionBinding, DetailRef, LimitOverrides, PacketReader, ProtocolError, ProtocolVersion,
    RecordingSink, Request, MAX_BODY_LEN,
};
use rampart_protocol_dialects::{opcodes, standard_registry};
use rampart_types::*;
use std::sync::Arc;

#[test]
fn test_unsupported_version() {
    let registry = standard_registry().unwrap();
    let binding = ConnectionBinding::new(Arc::new(TestWorld::default()), Arc::new(RecordingSink::new()));
    let err = registry
        .negotiate(ProtocolVersion(169), binding.clone())
        .err()
        .unwrap();
    assert_eq!(err, ProtocolError::UnsupportedVersion(ProtocolVersion(169)));

    let restricted = registry.restrict(&[ProtocolVersion(175)]).unwrap();
    assert!(restricted.negotiate(ProtocolVersion(168), binding.clone()).is_err());
    assert!(restricted.negotiate(ProtocolVersion(175), binding).is_ok());
}

#[test]
fn test_player_create_across_versions() {
    let sizes = [(168, 0x7C, 46), (171, 0x7C, 47), (172, 0x4B, 47), (174, 0x4B, 51), (180, 0x4B, 51)];
    for (version, opcode, len) in sizes {
        let s = session(version);
        s.encoder.send(&Request::PlayerCreate { object_id: 1 }).unwrap();
        let packet = s.take().remove(0);
        assert_eq!(packet.opcode, opcode, "opcode at {version}");
        assert_eq!(packet.payload.len(), len, "length at {version}");
    }

    let s = session(171);
    s.encoder.send(&Request::PlayerCreate { object_id: 1 }).unwrap();
    let packet = s.take().remove(0);
    assert_eq!(*packet.payload.last().unwrap(), 7);

    // 1.74 switches to absolute coordinates.
    let s = session(174);
    s.encoder.send(&Request::PlayerCreate { object_id: 1 }).unwrap();
    let packet = s.take().remove(0);
    let mut r = PacketReader::new(&packet.payload);
    r.skip(6).unwrap();
    assert_eq!(r.read_u16().unwrap(), 1);
    assert_eq!(r.read_u32().unwrap(), 560_000);
    assert_eq!(r.read_u32().unwrap(), 510_000);
}

#[test]
fn test_player_create_other_player() {
    let s = session(168);
    s.world.others.lock().unwrap().push(player(42));
    s.encoder.send(&Request::PlayerCreate { object_id: 42 }).unwrap();
    let packet = s.take().remove(0);
    let mut r = PacketReader::new(&packet.payload);
    assert_eq!(r.read_u16().unwrap(), 1042);
    assert_eq!(r.read_u16().unwrap(), 42);
    r.skip(12 + 3 + 7).unwrap();
    assert_eq!(r.read_pascal_string().unwrap(), "Player42");

    // Unknown objects are skipped.
    assert_eq!(s.encoder.send(&Request::PlayerCreate { object_id: 9 }).unwrap(), 0);
}

#[test]
fn test_position_channel_and_extension() {
    let s = session(172);
    s.encoder.send(&Request::PlayerPosition { object_id: 1 }).unwrap();
    let packet = s.take().remove(0);
    assert_eq!(packet.channel, Channel::Reliable);
    assert_eq!(packet.payload.len(), 18);
    assert_eq!(&packet.payload[16..], &[25, 100]);

    s.encoder.set_udp_confirmed(true);
    s.encoder.send(&Request::PlayerPosition { object_id: 1 }).unwrap();
    assert_eq!(s.take()[0].channel, Channel::Unreliable);

    let s = session(168);
    s.encoder.send(&Request::PlayerPosition { object_id: 1 }).unwrap();
    assert_eq!(s.take()[0].payload.len(), 16);
}

#[test]
fn test_status_update() {
    let s = session(168);
    s.encoder.send(&Request::StatusUpdate).unwrap();
    assert_eq!(&s.take()[0].payload[..], &[80, 25, 100, 25, 0]);

    let s = session(171);
    s.encoder.send(&Request::StatusUpdate).unwrap();
    let packet = s.take().remove(0);
    assert_eq!(packet.payload.len(), 5 + 16);
    let mut r = PacketReader::new(&packet.payload[5..]);
    assert_eq!(r.read_u16().unwrap(), 800);
    assert_eq!(r.read_u16().unwrap(), 1000);

    s.world.player.lock().unwrap().as_mut().unwrap().health = Pool::new(70_000, 100_000);
    s.encoder.send(&Request::StatusUpdate).unwrap();
    let packet = s.take().remove(0);
    assert_eq!(&packet.payload[5..9], &[0xFF, 0xFF, 0xFF, 0xFF]);
}

#[test]
fn test_position_clamped_to_zone() {
    let s = session(168);
    {
        let mut player = s.world.player.lock().unwrap();
        let player = player.as_mut().unwrap();
        player.position.x = 500_000;
        player.position.y = 600_000;
    }
    s.encoder.send(&Request::PlayerPosition { object_id: 1 }).unwrap();
    let packet = s.take().remove(0);
    // x lies before the zone origin, y past the 16-bit range
    assert_eq!(&packet.payload[6..10], &[0, 0, 0xFF, 0xFF]);
}

#[test]
fn test_absent_player_sends_nothing() {
    let s = session(180);
    *s.world.player.lock().unwrap() = None;
    for request in [
        Request::StatusUpdate,
        Request::UpdateIcons { changed: None },
        Request::PlayerTitles,
        Request::PlayerCreate { object_id: 1 },
        Request::PlayerPosition { object_id: 1 },
    ] {
        assert_eq!(s.encoder.send(&request).unwrap(), 0, "{}", request.kind());
    }
    assert!(s.sink.is_empty());
}

fn sword() -> InventoryItem {
    InventoryItem {
        slot: 10,
        name: "Sword".into(),
        level: 50,
        color: 0x0102,
        emblem: 0x0A0B,
        extension: 4,
        count: 1,
        ..InventoryItem::default()
    }
}

#[test]
fn test_inventory_records() {
    for (version, len) in [(168, 27), (173, 28), (176, 31)] {
        let s = session(version);
        s.world.items.lock().unwrap().push(sword());
        s.encoder.send(&Request::InventoryUpdate { slots: vec![10] }).unwrap();
        let packet = s.take().remove(0);
        assert_eq!(packet.opcode, opcodes::INVENTORY_UPDATE);
        assert_eq!(packet.payload.len(), len, "length at {version}");
        assert_eq!(packet.payload[0], 1);
    }

    let s = session(176);
    s.world.items.lock().unwrap().push(sword());
    s.encoder.send(&Request::InventoryUpdate { slots: vec![10] }).unwrap();
    let packet = s.take().remove(0);
    let mut r = PacketReader::new(&packet.payload[2..]);
    assert_eq!(r.read_u8().unwrap(), 10);
    r.skip(14).unwrap();
    assert_eq!(r.read_u16().unwrap(), 0x0102);
    assert_eq!(r.read_u16().unwrap(), 0x0A0B);
    r.skip(1).unwrap();
    assert_eq!(r.read_u8().unwrap(), 4);
}

#[test]
fn test_inventory_narrow_colour_clamps() {
    let s = session(173);
    s.world.items.lock().unwrap().push(sword());
    s.encoder.send(&Request::InventoryUpdate { slots: vec![10] }).unwrap();
    let packet = s.take().remove(0);
    // count, window, slot, 14 fixed bytes, then the one-byte colour
    assert_eq!(packet.payload[17], 0xFF);
}

#[test]
fn test_inventory_fits_one_frame() {
    let s = session(168);
    {
        let mut items = s.world.items.lock().unwrap();
        for slot in 0..255u16 {
            items.push(InventoryItem {
                slot,
                name: "x".repeat(255),
                ..InventoryItem::default()
            });
        }
    }
    s.encoder
        .send(&Request::InventoryUpdate {
            slots: (0..255).collect(),
        })
        .unwrap();
    let packet = s.take().remove(0);
    // 275 bytes per record
    assert_eq!(packet.payload[0], 238);
    assert_eq!(packet.payload.len(), 2 + 238 * 275);
    assert!(packet.payload.len() <= MAX_BODY_LEN);
}

#[test]
fn test_inventory_empty_slot_and_empty_request() {
    let s = session(168);
    s.encoder.send(&Request::InventoryUpdate { slots: vec![11] }).unwrap();
    let packet = s.take().remove(0);
    assert_eq!(packet.payload.len(), 2 + 20);
    assert!(packet.payload[3..].iter().all(|b| *b == 0));

    assert_eq!(s.encoder.send(&Request::InventoryUpdate { slots: vec![] }).unwrap(), 0);
}

fn keep() -> Keep {
    Keep {
        id: 50,
        name: "Caer Benowyc".into(),
        realm: Realm::Albion,
        level: 5,
        under_attack: true,
        ..Keep::default()
    }
}

#[test]
fn test_keep_info() {
    let s = session(168);
    s.world.keeps.lock().unwrap().push(keep());
    s.encoder.send(&Request::KeepInfo { keep_id: 50 }).unwrap();
    let base = s.take().remove(0).payload.len();
    assert_eq!(base, 14 + 1 + 12 + 1);

    let s = session(174);
    s.world.keeps.lock().unwrap().push(keep());
    s.encoder.send(&Request::KeepInfo { keep_id: 50 }).unwrap();
    let packet = s.take().remove(0);
    assert_eq!(packet.payload.len(), base + 1);
    assert_eq!(*packet.payload.last().unwrap(), 1);

    assert_eq!(s.encoder.send(&Request::KeepInfo { keep_id: 1 }).unwrap(), 0);
}

#[test]
fn test_keep_components() {
    let components = vec![
        KeepComponent {
            keep_id: 50,
            index: 0,
            skin: 3,
            in_combat: true,
            ..KeepComponent::default()
        },
        KeepComponent {
            keep_id: 50,
            index: 1,
            raised: true,
            ..KeepComponent::default()
        },
    ];
    for (version, len) in [(174, 11), (175, 13)] {
        let s = session(version);
        *s.world.components.lock().unwrap() = components.clone();
        assert_eq!(s.encoder.send(&Request::KeepComponentInfo { keep_id: 50 }).unwrap(), 2);
        let packets = s.take();
        assert!(packets.iter().all(|p| p.payload.len() == len));
        if version == 175 {
            assert_eq!(packets[0].payload[6], 3);
            assert_eq!(packets[0].payload[12], 0x01);
            assert_eq!(packets[1].payload[12], 0x02);
        }
    }
}

fn titles(n: u16) -> Vec<Title> {
    (0..n)
        .map(|i| Title {
            id: i,
            text: format!("Title number {i:08}"),
        })
        .collect()
}

#[test]
fn test_titles_truncated_at_block_limit() {
    let s = session(168);
    *s.world.titles.lock().unwrap() = titles(20);
    s.encoder.send(&Request::PlayerTitles).unwrap();
    let packet = s.take().remove(0);
    // Entries are 24 bytes; ten fit under the 255 byte length.
    assert_eq!(packet.payload[0], 10);
    assert_eq!(packet.payload[1], 240);
    assert_eq!(packet.payload.len(), 242);

    let mut r = PacketReader::new(&packet.payload[2..]);
    for i in 0..10 {
        assert_eq!(r.read_u16().unwrap(), i);
        assert_eq!(r.read_pascal_string().unwrap(), format!("Title number {i:08}"));
    }
    assert!(r.is_empty());
}

#[test]
fn test_titles_176_current_title() {
    let s = session(176);
    *s.world.titles.lock().unwrap() = titles(2);
    s.encoder.send(&Request::PlayerTitles).unwrap();
    let packet = s.take().remove(0);
    let mut r = PacketReader::new(&packet.payload);
    assert_eq!(r.read_u16().unwrap(), 3);
    assert_eq!(r.read_u8().unwrap(), 2);
    assert_eq!(r.read_u8().unwrap(), 48);
}

#[test]
fn test_character_overview() {
    let characters = vec![CharacterSummary {
        slot: 1,
        name: "Bran".into(),
        realm: Realm::Albion,
        equipment: Equipment {
            helmet: 62,
            ..Equipment::default()
        },
        ..CharacterSummary::default()
    }];
    for (version, len) in [(168, 24 + 10 * 126), (172, 24 + 10 * 144)] {
        let s = session(version);
        *s.world.characters.lock().unwrap() = characters.clone();
        s.encoder
            .send(&Request::CharacterOverview { realm: Realm::Albion })
            .unwrap();
        let packet = s.take().remove(0);
        assert_eq!(packet.payload.len(), len, "length at {version}");
        let mut r = PacketReader::new(&packet.payload);
        assert_eq!(r.read_fixed_string(24).unwrap(), "tester");
        // Slot 0 is empty, slot 1 holds the character.
        let record = (len - 24) / 10;
        assert!(r.read_bytes(record).unwrap().iter().all(|b| *b == 0));
        assert_eq!(r.read_fixed_string(48).unwrap(), "Bran");
    }
}

#[test]
fn test_delve_info_limits() {
    let s = session(168);
    let request = Request::DelveInfo {
        detail: DetailRef::spell(5001),
        text: "x".repeat(3000),
    };
    s.encoder.send(&request).unwrap();
    let packet = s.take().remove(0);
    assert_eq!(packet.payload.len(), 3 + 2048 + 1);
    assert_eq!(packet.payload[0], 24);

    let registry = standard_registry()
        .unwrap()
        .with_limits(LimitOverrides {
            delve_max_len: Some(16),
            ..LimitOverrides::default()
        })
        .unwrap();
    let sink = Arc::new(RecordingSink::new());
    let encoder = registry
        .negotiate(
            ProtocolVersion(180),
            ConnectionBinding::new(Arc::new(TestWorld::default()), sink.clone()),
        )
        .unwrap();
    encoder.send(&request).unwrap();
    assert_eq!(sink.take()[0].payload.len(), 3 + 16 + 1);
}
