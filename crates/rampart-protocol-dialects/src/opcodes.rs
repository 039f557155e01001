use crate::{v168, v172};
use rampart_protocol_core::{Channel, MessageKind, OpcodeTable};

pub const CHARACTER_OVERVIEW: u8 = 0xFD;
pub const PLAYER_CREATE: u8 = 0x7C;
pub const PLAYER_CREATE_172: u8 = 0x4B;
pub const PLAYER_POSITION: u8 = 0xA9;
pub const STATUS_UPDATE: u8 = 0xAD;
pub const UPDATE_ICONS: u8 = 0x75;
pub const UPDATE_PLAYER_SKILLS: u8 = 0x16;
pub const INVENTORY_UPDATE: u8 = 0x02;
pub const KEEP_INFO: u8 = 0x69;
pub const KEEP_COMPONENT_INFO: u8 = 0x6C;
pub const PLAYER_TITLES: u8 = 0x80;
pub const DELVE_INFO: u8 = 0xC4;

/// Opcode assignments for every version of the standard lineage.
pub fn standard_opcodes() -> OpcodeTable {
    use MessageKind::*;

    let root = v168::VERSION;
    let mut table = OpcodeTable::new();
    table
        .map(root, CharacterOverview, Channel::Reliable, CHARACTER_OVERVIEW)
        .map(root, PlayerCreate, Channel::Reliable, PLAYER_CREATE)
        .map(v172::VERSION, PlayerCreate, Channel::Reliable, PLAYER_CREATE_172)
        .map(root, PlayerPosition, Channel::Reliable, PLAYER_POSITION)
        .map(root, PlayerPosition, Channel::Unreliable, PLAYER_POSITION)
        .map(root, StatusUpdate, Channel::Reliable, STATUS_UPDATE)
        .map(root, UpdateIcons, Channel::Reliable, UPDATE_ICONS)
        .map(root, UpdatePlayerSkills, Channel::Reliable, UPDATE_PLAYER_SKILLS)
        .map(root, InventoryUpdate, Channel::Reliable, INVENTORY_UPDATE)
        .map(root, KeepInfo, Channel::Reliable, KEEP_INFO)
        .map(root, KeepComponentInfo, Channel::Reliable, KEEP_COMPONENT_INFO)
        .map(root, PlayerTitles, Channel::Reliable, PLAYER_TITLES)
        .map(root, DelveInfo, Channel::Reliable, DELVE_INFO);
    table
}
