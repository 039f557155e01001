use rampart_types::Realm;
use std::fmt;

/// Client protocol revision. `175` is client build 1.75.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProtocolVersion(pub u16);

impl ProtocolVersion {
    pub const fn new(number: u16) -> Self {
        Self(number)
    }

    pub fn number(self) -> u16 {
        self.0
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Which transport a packet travels on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Ordered, reliable stream.
    Reliable,
    /// Best-effort datagrams.
    Unreliable,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Reliable => f.write_str("reliable"),
            Channel::Unreliable => f.write_str("unreliable"),
        }
    }
}

/// Logical outbound message. Every dialect in a lineage must be able to
/// reach exactly one implementation of each kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MessageKind {
    CharacterOverview,
    PlayerCreate,
    PlayerPosition,
    StatusUpdate,
    UpdateIcons,
    UpdatePlayerSkills,
    InventoryUpdate,
    KeepInfo,
    KeepComponentInfo,
    PlayerTitles,
    DelveInfo,
}

impl MessageKind {
    pub const ALL: [MessageKind; 11] = [
        MessageKind::CharacterOverview,
        MessageKind::PlayerCreate,
        MessageKind::PlayerPosition,
        MessageKind::StatusUpdate,
        MessageKind::UpdateIcons,
        MessageKind::UpdatePlayerSkills,
        MessageKind::InventoryUpdate,
        MessageKind::KeepInfo,
        MessageKind::KeepComponentInfo,
        MessageKind::PlayerTitles,
        MessageKind::DelveInfo,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MessageKind::CharacterOverview => "character-overview",
            MessageKind::PlayerCreate => "player-create",
            MessageKind::PlayerPosition => "player-position",
            MessageKind::StatusUpdate => "status-update",
            MessageKind::UpdateIcons => "update-icons",
            MessageKind::UpdatePlayerSkills => "update-player-skills",
            MessageKind::InventoryUpdate => "inventory-update",
            MessageKind::KeepInfo => "keep-info",
            MessageKind::KeepComponentInfo => "keep-component-info",
            MessageKind::PlayerTitles => "player-titles",
            MessageKind::DelveInfo => "delve-info",
        }
    }

    /// Channels this kind may be emitted on. Position updates prefer the
    /// unreliable channel and fall back to the stream before UDP is confirmed.
    pub fn channels(self) -> &'static [Channel] {
        match self {
            MessageKind::PlayerPosition => &[Channel::Unreliable, Channel::Reliable],
            _ => &[Channel::Reliable],
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a supplementary description refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DetailKind {
    Spell = 24,
}

impl DetailKind {
    pub fn id(self) -> u8 {
        self as u8
    }
}

/// Reference to a delve/tooltip description the client may not know yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DetailRef {
    pub kind: DetailKind,
    pub id: u16,
}

impl DetailRef {
    pub fn spell(id: u16) -> Self {
        Self {
            kind: DetailKind::Spell,
            id,
        }
    }
}

/// Version-independent "send X" request issued by the game-rule layer.
/// Requests name what to send; entity data is read from the game state
/// source while encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Character select listing for one realm.
    CharacterOverview { realm: Realm },
    /// Introduce another (or our own) player to the client.
    PlayerCreate { object_id: u16 },
    PlayerPosition { object_id: u16 },
    /// Health/mana/endurance/concentration of the active player.
    StatusUpdate,
    /// Effect icon bar. `changed` lists effect ids that must be resent;
    /// `None` lets the diff decide.
    UpdateIcons { changed: Option<Vec<u16>> },
    /// Full skill window resend.
    UpdatePlayerSkills,
    InventoryUpdate { slots: Vec<u16> },
    KeepInfo { keep_id: u16 },
    KeepComponentInfo { keep_id: u16 },
    PlayerTitles,
    DelveInfo { detail: DetailRef, text: String },
}

impl Request {
    pub fn kind(&self) -> MessageKind {
        match self {
            Request::CharacterOverview { .. } => MessageKind::CharacterOverview,
            Request::PlayerCreate { .. } => MessageKind::PlayerCreate,
            Request::PlayerPosition { .. } => MessageKind::PlayerPosition,
            Request::StatusUpdate => MessageKind::StatusUpdate,
            Request::UpdateIcons { .. } => MessageKind::UpdateIcons,
            Request::UpdatePlayerSkills => MessageKind::UpdatePlayerSkills,
            Request::InventoryUpdate { .. } => MessageKind::InventoryUpdate,
            Request::KeepInfo { .. } => MessageKind::KeepInfo,
            Request::KeepComponentInfo { .. } => MessageKind::KeepComponentInfo,
            Request::PlayerTitles => MessageKind::PlayerTitles,
            Request::DelveInfo { .. } => MessageKind::DelveInfo,
        }
    }

    /// Error for a handler that was handed a request of another kind.
    pub fn mismatch(&self, expected: MessageKind) -> crate::ProtocolError {
        crate::ProtocolError::RequestMismatch {
            kind: expected,
            found: self.kind(),
        }
    }
}
