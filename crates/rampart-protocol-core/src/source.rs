use crate::message::DetailRef;
use rampart_types::{
    CharacterSummary, Effect, InventoryItem, Keep, KeepComponent, Player, Realm, SkillSet, Title,
};

/// Read-only view of the game state for one connection.
///
/// Returned values are snapshots; absent entities yield `None` or an empty
/// list and the corresponding message is skipped.
pub trait GameStateSource: Send + Sync {
    /// The player this connection controls, if it has entered the world.
    fn active_player(&self) -> Option<Player>;

    /// Another player as the active player sees it. `None` when the object
    /// is unknown or not visible.
    fn visible_player(&self, object_id: u16) -> Option<Player>;

    /// Effects on the active player in display order.
    fn effects(&self) -> Vec<Effect>;

    fn inventory_item(&self, slot: u16) -> Option<InventoryItem>;

    fn keep(&self, keep_id: u16) -> Option<Keep>;

    fn keep_components(&self, keep_id: u16) -> Vec<KeepComponent>;

    fn titles(&self) -> Vec<Title>;

    fn skills(&self) -> Option<SkillSet>;

    /// Characters on the account for the character select screen.
    fn characters(&self, realm: Realm) -> Vec<CharacterSummary>;

    fn account_name(&self) -> String;
}

/// Names as a particular viewer should see them.
pub trait NameResolver: Send + Sync {
    fn player_name(&self, viewer: &Player, target: &Player) -> String;
    fn guild_name(&self, viewer: &Player, target: &Player) -> String;
    fn last_name(&self, viewer: &Player, target: &Player) -> String;
}

/// Shows every name as stored.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainNames;

impl NameResolver for PlainNames {
    fn player_name(&self, _viewer: &Player, target: &Player) -> String {
        target.name.clone()
    }

    fn guild_name(&self, _viewer: &Player, target: &Player) -> String {
        target.guild_name.clone()
    }

    fn last_name(&self, _viewer: &Player, target: &Player) -> String {
        target.last_name.clone()
    }
}

/// Receives follow-up description requests for details the client has
/// not seen yet. The implementation usually answers with a
/// `Request::DelveInfo` on the same encoder.
pub trait DetailLookup: Send + Sync {
    fn request_detail(&self, detail: DetailRef);
}

/// Discards every lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDetails;

impl DetailLookup for NoDetails {
    fn request_detail(&self, _detail: DetailRef) {}
}
