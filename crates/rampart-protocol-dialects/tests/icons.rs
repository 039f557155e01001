mod common;

use common::{effect, session};
use rampart_protocol_core::{DetailRef, PacketReader, Request};

fn update() -> Request {
    Request::UpdateIcons { changed: None }
}

struct Record {
    slot: u8,
    icon: u16,
    spell_index: u16,
    name: String,
}

fn read_175(payload: &[u8]) -> (u8, Vec<Record>) {
    let mut r = PacketReader::new(payload);
    assert_eq!(r.read_u8().unwrap(), 0);
    let count = r.read_u8().unwrap();
    let mut records = Vec::new();
    for _ in 0..count {
        let slot = r.read_u8().unwrap();
        let _flags = r.read_u8().unwrap();
        let icon = r.read_u16().unwrap();
        let _secs = r.read_u16().unwrap();
        let _id = r.read_u16().unwrap();
        let spell_index = r.read_u16().unwrap();
        let name = r.read_pascal_string().unwrap();
        records.push(Record {
            slot,
            icon,
            spell_index,
            name,
        });
    }
    assert!(r.is_empty());
    (count, records)
}

#[test]
fn test_icons_175_shrink_then_idempotent() {
    let s = session(175);
    *s.world.effects.lock().unwrap() = (1..=9).map(effect).collect();

    assert_eq!(s.encoder.send(&update()).unwrap(), 1);
    let packets = s.take();
    assert_eq!(packets[0].opcode, 0x75);
    let (count, records) = read_175(&packets[0].payload);
    assert_eq!(count, 9);
    assert_eq!(records[8].slot, 8);
    assert_eq!(records[8].icon, 109);
    assert_eq!(records[8].spell_index, 5009);
    assert_eq!(records[8].name, "Buff 9");

    s.world.effects.lock().unwrap().truncate(5);
    assert_eq!(s.encoder.send(&update()).unwrap(), 1);
    let packets = s.take();
    // 5 live records of 17 bytes, 4 placeholders of 11.
    assert_eq!(packets[0].payload.len(), 2 + 5 * 17 + 4 * 11);
    let (count, records) = read_175(&packets[0].payload);
    assert_eq!(count, 9);
    let live: Vec<u8> = records.iter().filter(|r| r.icon != 0).map(|r| r.slot).collect();
    let blank: Vec<u8> = records.iter().filter(|r| r.icon == 0).map(|r| r.slot).collect();
    assert_eq!(live, vec![0, 1, 2, 3, 4]);
    assert_eq!(blank, vec![5, 6, 7, 8]);
    assert!(records[5..].iter().all(|r| r.name.is_empty() && r.spell_index == 0));

    // Nothing changed since: no packet.
    assert_eq!(s.encoder.send(&update()).unwrap(), 0);
    assert!(s.take().is_empty());
}

#[test]
fn test_icons_168_layout() {
    let s = session(168);
    *s.world.effects.lock().unwrap() = (1..=3).map(effect).collect();
    s.encoder.send(&update()).unwrap();
    let packets = s.take();
    assert_eq!(packets[0].payload.len(), 2 + 3 * 14);

    s.world.effects.lock().unwrap().clear();
    s.encoder.send(&update()).unwrap();
    let packets = s.take();
    // Only placeholders: slot + 7 zero bytes each.
    assert_eq!(packets[0].payload.len(), 2 + 3 * 8);
    assert_eq!(packets[0].payload[1], 3);
}

#[test]
fn test_icons_changed_filter() {
    let s = session(175);
    *s.world.effects.lock().unwrap() = (1..=4).map(effect).collect();
    s.encoder.send(&update()).unwrap();
    s.take();

    s.encoder
        .send(&Request::UpdateIcons {
            changed: Some(vec![3]),
        })
        .unwrap();
    let (count, records) = read_175(&s.take()[0].payload);
    assert_eq!(count, 1);
    assert_eq!(records[0].slot, 2);
    assert_eq!(records[0].icon, 103);
}

#[test]
fn test_icon_details_requested_once() {
    let s = session(175);
    *s.world.effects.lock().unwrap() = (1..=3).map(effect).collect();
    s.encoder.send(&update()).unwrap();
    assert_eq!(
        *s.lookups.0.lock().unwrap(),
        vec![
            DetailRef::spell(5001),
            DetailRef::spell(5002),
            DetailRef::spell(5003)
        ]
    );

    // A new effect only asks for its own detail.
    s.world.effects.lock().unwrap().push(effect(4));
    s.encoder.send(&update()).unwrap();
    assert_eq!(s.lookups.0.lock().unwrap().len(), 4);
    assert_eq!(s.lookups.0.lock().unwrap()[3], DetailRef::spell(5004));
}

#[test]
fn test_invisible_effects_take_no_slot() {
    let s = session(175);
    let mut effects: Vec<_> = (1..=3).map(effect).collect();
    effects[1].icon = 0;
    *s.world.effects.lock().unwrap() = effects;
    s.encoder.send(&update()).unwrap();
    let (count, records) = read_175(&s.take()[0].payload);
    assert_eq!(count, 2);
    assert_eq!(records[1].icon, 103);
    assert_eq!(records[1].slot, 1);
}

#[test]
fn test_close_forgets_baseline() {
    let s = session(175);
    *s.world.effects.lock().unwrap() = (1..=2).map(effect).collect();
    s.encoder.send(&update()).unwrap();
    s.encoder.close();
    assert_eq!(s.encoder.send(&update()).unwrap(), 1);
}
