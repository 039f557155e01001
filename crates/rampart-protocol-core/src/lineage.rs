//! Versioned encoder lineage.
//!
//! Each protocol version is a [`Dialect`] that derives from exactly one
//! older dialect and overrides only the messages whose layout changed.
//! Everything else resolves to the nearest older dialect that provides
//! it. Resolution is computed once when the [`Lineage`] is built.

use crate::error::{EncodeResult, LineageError, ProtocolError};
use crate::message::{Channel, DetailRef, MessageKind, ProtocolVersion, Request};
use crate::opcode::OpcodeTable;
use crate::source::{GameStateSource, NameResolver};
use crate::state::SessionState;
use crate::writer::PacketWriter;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::trace;

/// Encoder for one message kind at one version.
pub type EncodeFn = fn(&mut EncodeContext<'_>, &Request) -> EncodeResult<Emission>;

/// Per-version numeric limits that shape layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// A skill page is closed once its body reaches this many bytes.
    pub skill_page_budget: usize,
    /// Size of the client's skill index space.
    pub max_skill_entries: usize,
    /// Icon slots the effect bar can address.
    pub max_icons: usize,
    /// Longest description text.
    pub delve_max_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            skill_page_budget: 2000,
            max_skill_entries: 255,
            max_icons: 255,
            delve_max_len: 2048,
        }
    }
}

/// What a handler produced: zero or more packets in send order, plus
/// details the client should be told about afterwards.
#[derive(Debug, Default)]
pub struct Emission {
    pub packets: Vec<PacketWriter>,
    pub details: Vec<DetailRef>,
}

impl Emission {
    /// Nothing to send.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn single(writer: PacketWriter) -> Self {
        Self {
            packets: vec![writer],
            details: Vec::new(),
        }
    }

    pub fn push(&mut self, writer: PacketWriter) {
        self.packets.push(writer);
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// The packet an override appends trailing fields to.
    pub fn last_packet_mut(&mut self) -> Option<&mut PacketWriter> {
        self.packets.last_mut()
    }
}

/// One version's declared overrides.
#[derive(Clone)]
pub struct Dialect {
    version: ProtocolVersion,
    parent: Option<ProtocolVersion>,
    handlers: HashMap<MessageKind, EncodeFn>,
    limits: Option<Limits>,
}

impl Dialect {
    /// The oldest dialect of a lineage.
    pub fn root(version: ProtocolVersion) -> Self {
        Self {
            version,
            parent: None,
            handlers: HashMap::new(),
            limits: None,
        }
    }

    pub fn derive(version: ProtocolVersion, parent: ProtocolVersion) -> Self {
        Self {
            parent: Some(parent),
            ..Self::root(version)
        }
    }

    pub fn handle(mut self, kind: MessageKind, handler: EncodeFn) -> Self {
        self.handlers.insert(kind, handler);
        self
    }

    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    pub fn parent(&self) -> Option<ProtocolVersion> {
        self.parent
    }

    pub fn overrides(&self, kind: MessageKind) -> bool {
        self.handlers.contains_key(&kind)
    }
}

impl fmt::Debug for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.handlers.keys().copied().collect();
        kinds.sort();
        f.debug_struct("Dialect")
            .field("version", &self.version)
            .field("parent", &self.parent)
            .field("overrides", &kinds)
            .field("limits", &self.limits)
            .finish()
    }
}

/// A resolved handler and the version that defined it.
#[derive(Clone, Copy)]
pub struct Binding {
    pub defined_at: ProtocolVersion,
    pub handler: EncodeFn,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("defined_at", &self.defined_at)
            .finish_non_exhaustive()
    }
}

/// A validated single chain of dialects with every lookup precomputed.
#[derive(Debug)]
pub struct Lineage {
    parents: BTreeMap<ProtocolVersion, Option<ProtocolVersion>>,
    bindings: HashMap<(ProtocolVersion, MessageKind), Binding>,
    limits: HashMap<ProtocolVersion, Limits>,
}

impl Lineage {
    pub fn build(dialects: impl IntoIterator<Item = Dialect>) -> Result<Self, LineageError> {
        let mut by_version = BTreeMap::new();
        for dialect in dialects {
            let version = dialect.version;
            if by_version.insert(version, dialect).is_some() {
                return Err(LineageError::Duplicate(version));
            }
        }

        let mut root = None;
        let mut children: HashMap<ProtocolVersion, ProtocolVersion> = HashMap::new();
        for dialect in by_version.values() {
            match dialect.parent {
                None => {
                    if let Some(existing) = root {
                        return Err(LineageError::MultipleRoots(existing, dialect.version));
                    }
                    root = Some(dialect.version);
                }
                Some(parent) => {
                    if !by_version.contains_key(&parent) {
                        return Err(LineageError::UnknownParent {
                            version: dialect.version,
                            parent,
                        });
                    }
                    if parent >= dialect.version {
                        return Err(LineageError::ParentNotOlder {
                            version: dialect.version,
                            parent,
                        });
                    }
                    if let Some(first) = children.insert(parent, dialect.version) {
                        return Err(LineageError::Branch {
                            parent,
                            first,
                            second: dialect.version,
                        });
                    }
                }
            }
        }
        if root.is_none() {
            return Err(LineageError::NoRoot);
        }

        // Parents are strictly older, so ascending order visits every
        // parent before its child.
        let mut bindings: HashMap<(ProtocolVersion, MessageKind), Binding> = HashMap::new();
        let mut limits: HashMap<ProtocolVersion, Limits> = HashMap::new();
        for (version, dialect) in &by_version {
            for kind in MessageKind::ALL {
                let binding = match dialect.handlers.get(&kind) {
                    Some(handler) => Some(Binding {
                        defined_at: *version,
                        handler: *handler,
                    }),
                    None => dialect
                        .parent
                        .and_then(|p| bindings.get(&(p, kind)).copied()),
                };
                if let Some(binding) = binding {
                    bindings.insert((*version, kind), binding);
                }
            }
            let inherited = dialect.parent.and_then(|p| limits.get(&p).copied());
            limits.insert(
                *version,
                dialect.limits.or(inherited).unwrap_or_default(),
            );
        }

        Ok(Self {
            parents: by_version
                .iter()
                .map(|(v, d)| (*v, d.parent))
                .collect(),
            bindings,
            limits,
        })
    }

    /// Versions in ascending order.
    pub fn versions(&self) -> impl Iterator<Item = ProtocolVersion> + '_ {
        self.parents.keys().copied()
    }

    pub fn contains(&self, version: ProtocolVersion) -> bool {
        self.parents.contains_key(&version)
    }

    pub fn parent_of(&self, version: ProtocolVersion) -> Option<ProtocolVersion> {
        self.parents.get(&version).copied().flatten()
    }

    pub fn resolve(&self, version: ProtocolVersion, kind: MessageKind) -> EncodeResult<Binding> {
        self.bindings
            .get(&(version, kind))
            .copied()
            .ok_or(ProtocolError::Unimplemented { version, kind })
    }

    pub fn limits(&self, version: ProtocolVersion) -> Option<Limits> {
        self.limits.get(&version).copied()
    }
}

/// Everything a handler may touch while encoding one request.
pub struct EncodeContext<'a> {
    version: ProtocolVersion,
    lineage: &'a Lineage,
    opcodes: &'a OpcodeTable,
    limits: Limits,
    source: &'a dyn GameStateSource,
    names: &'a dyn NameResolver,
    state: &'a mut SessionState,
    /// Version whose handler is currently running.
    frame: Option<ProtocolVersion>,
}

impl<'a> EncodeContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        version: ProtocolVersion,
        lineage: &'a Lineage,
        opcodes: &'a OpcodeTable,
        limits: Limits,
        source: &'a dyn GameStateSource,
        names: &'a dyn NameResolver,
        state: &'a mut SessionState,
    ) -> Self {
        Self {
            version,
            lineage,
            opcodes,
            limits,
            source,
            names,
            state,
            frame: None,
        }
    }

    /// The negotiated version, not the version of the running handler.
    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn source(&self) -> &'a dyn GameStateSource {
        self.source
    }

    pub fn names(&self) -> &'a dyn NameResolver {
        self.names
    }

    pub fn state(&mut self) -> &mut SessionState {
        &mut *self.state
    }

    /// Open a packet for `kind` on `channel` with the negotiated opcode.
    pub fn writer(&self, kind: MessageKind, channel: Channel) -> EncodeResult<PacketWriter> {
        let opcode = self.opcodes.resolve(self.version, kind, channel)?;
        Ok(PacketWriter::new(opcode, channel, kind))
    }

    /// First declared channel for `kind` that the connection may use.
    pub fn channel_for(&self, kind: MessageKind) -> Channel {
        kind.channels()
            .iter()
            .copied()
            .find(|c| *c == Channel::Reliable || self.state.udp_confirmed)
            .unwrap_or(Channel::Reliable)
    }

    /// Encode `request` with the negotiated version's handler.
    pub fn encode(&mut self, request: &Request) -> EncodeResult<Emission> {
        let binding = self.lineage.resolve(self.version, request.kind())?;
        self.run(binding, request)
    }

    /// Run the implementation the running handler overrides.
    pub fn inherited(&mut self, request: &Request) -> EncodeResult<Emission> {
        let kind = request.kind();
        let no_impl = ProtocolError::NoInheritedImpl {
            version: self.frame.unwrap_or(self.version),
            kind,
        };
        let parent = self
            .frame
            .and_then(|v| self.lineage.parent_of(v))
            .ok_or_else(|| no_impl.clone())?;
        let binding = self.lineage.resolve(parent, kind).map_err(|_| no_impl)?;
        self.run(binding, request)
    }

    fn run(&mut self, binding: Binding, request: &Request) -> EncodeResult<Emission> {
        trace!(
            version = %self.version,
            defined_at = %binding.defined_at,
            kind = %request.kind(),
            "Encoding"
        );
        let outer = self.frame.replace(binding.defined_at);
        let result = (binding.handler)(self, request);
        self.frame = outer;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::PlainNames;
    use rampart_types::*;

    struct Empty;

    impl GameStateSource for Empty {
        fn active_player(&self) -> Option<Player> {
            None
        }
        fn visible_player(&self, _: u16) -> Option<Player> {
            None
        }
        fn effects(&self) -> Vec<Effect> {
            Vec::new()
        }
        fn inventory_item(&self, _: u16) -> Option<InventoryItem> {
            None
        }
        fn keep(&self, _: u16) -> Option<Keep> {
            None
        }
        fn keep_components(&self, _: u16) -> Vec<KeepComponent> {
            Vec::new()
        }
        fn titles(&self) -> Vec<Title> {
            Vec::new()
        }
        fn skills(&self) -> Option<SkillSet> {
            None
        }
        fn characters(&self, _: Realm) -> Vec<CharacterSummary> {
            Vec::new()
        }
        fn account_name(&self) -> String {
            String::new()
        }
    }

    fn v(n: u16) -> ProtocolVersion {
        ProtocolVersion(n)
    }

    fn tagged(ctx: &mut EncodeContext<'_>, tag: u8) -> EncodeResult<Emission> {
        let mut w = ctx.writer(MessageKind::StatusUpdate, Channel::Reliable)?;
        w.write_u8(tag);
        Ok(Emission::single(w))
    }

    fn status_100(ctx: &mut EncodeContext<'_>, _: &Request) -> EncodeResult<Emission> {
        tagged(ctx, 100)
    }

    fn status_175(ctx: &mut EncodeContext<'_>, req: &Request) -> EncodeResult<Emission> {
        let mut emission = ctx.inherited(req)?;
        if let Some(w) = emission.last_packet_mut() {
            w.write_u8(175);
        }
        Ok(emission)
    }

    fn status_183(ctx: &mut EncodeContext<'_>, req: &Request) -> EncodeResult<Emission> {
        let mut emission = ctx.inherited(req)?;
        if let Some(w) = emission.last_packet_mut() {
            w.write_u8(183);
        }
        Ok(emission)
    }

    fn chain() -> Lineage {
        let kind = MessageKind::StatusUpdate;
        Lineage::build([
            Dialect::root(v(100)).handle(kind, status_100),
            Dialect::derive(v(150), v(100)),
            Dialect::derive(v(175), v(150)).handle(kind, status_175),
            Dialect::derive(v(180), v(175)).limits(Limits {
                skill_page_budget: 1400,
                ..Limits::default()
            }),
            Dialect::derive(v(183), v(180)).handle(kind, status_183),
            Dialect::derive(v(186), v(183)),
        ])
        .unwrap()
    }

    fn encode_at(lineage: &Lineage, version: u16) -> Vec<u8> {
        let mut opcodes = OpcodeTable::new();
        opcodes.map(v(100), MessageKind::StatusUpdate, Channel::Reliable, 0xAD);
        let mut state = SessionState::default();
        let mut ctx = EncodeContext::new(
            v(version),
            lineage,
            &opcodes,
            Limits::default(),
            &Empty,
            &PlainNames,
            &mut state,
        );
        let emission = ctx.encode(&Request::StatusUpdate).unwrap();
        emission.packets[0].as_bytes().to_vec()
    }

    #[test]
    fn test_nearest_ancestor_resolution() {
        let lineage = chain();
        let defined = |n| {
            lineage
                .resolve(v(n), MessageKind::StatusUpdate)
                .unwrap()
                .defined_at
        };
        assert_eq!(defined(100), v(100));
        assert_eq!(defined(150), v(100));
        assert_eq!(defined(175), v(175));
        assert_eq!(defined(180), v(175));
        assert_eq!(defined(183), v(183));
        assert_eq!(defined(186), v(183));
    }

    #[test]
    fn test_inherited_chains_through_ancestors() {
        let lineage = chain();
        assert_eq!(encode_at(&lineage, 150), vec![100]);
        assert_eq!(encode_at(&lineage, 180), vec![100, 175]);
        assert_eq!(encode_at(&lineage, 186), vec![100, 175, 183]);
    }

    #[test]
    fn test_limits_inherit() {
        let lineage = chain();
        assert_eq!(lineage.limits(v(175)), Some(Limits::default()));
        assert_eq!(lineage.limits(v(186)).map(|l| l.skill_page_budget), Some(1400));
        assert_eq!(lineage.limits(v(1)), None);
    }

    #[test]
    fn test_unimplemented_kind() {
        let lineage = chain();
        assert_eq!(
            lineage.resolve(v(186), MessageKind::KeepInfo).unwrap_err(),
            ProtocolError::Unimplemented {
                version: v(186),
                kind: MessageKind::KeepInfo
            }
        );
    }

    #[test]
    fn test_root_has_no_inherited() {
        fn calls_parent(ctx: &mut EncodeContext<'_>, req: &Request) -> EncodeResult<Emission> {
            ctx.inherited(req)
        }
        let lineage =
            Lineage::build([Dialect::root(v(100)).handle(MessageKind::PlayerTitles, calls_parent)])
                .unwrap();
        let opcodes = OpcodeTable::new();
        let mut state = SessionState::default();
        let mut ctx = EncodeContext::new(
            v(100),
            &lineage,
            &opcodes,
            Limits::default(),
            &Empty,
            &PlainNames,
            &mut state,
        );
        assert_eq!(
            ctx.encode(&Request::PlayerTitles).unwrap_err(),
            ProtocolError::NoInheritedImpl {
                version: v(100),
                kind: MessageKind::PlayerTitles
            }
        );
    }

    #[test]
    fn test_structural_errors() {
        assert_eq!(
            Lineage::build([Dialect::derive(v(2), v(1))]).unwrap_err(),
            LineageError::UnknownParent {
                version: v(2),
                parent: v(1)
            }
        );
        assert_eq!(
            Lineage::build([Dialect::root(v(1)), Dialect::root(v(2))]).unwrap_err(),
            LineageError::MultipleRoots(v(1), v(2))
        );
        assert_eq!(
            Lineage::build([Dialect::root(v(1)), Dialect::root(v(1))]).unwrap_err(),
            LineageError::Duplicate(v(1))
        );
        assert_eq!(
            Lineage::build([Dialect::root(v(5)), Dialect::derive(v(3), v(5))]).unwrap_err(),
            LineageError::ParentNotOlder {
                version: v(3),
                parent: v(5)
            }
        );
        assert_eq!(
            Lineage::build([
                Dialect::root(v(1)),
                Dialect::derive(v(2), v(1)),
                Dialect::derive(v(3), v(1)),
            ])
            .unwrap_err(),
            LineageError::Branch {
                parent: v(1),
                first: v(2),
                second: v(3)
            }
        );
        assert_eq!(
            Lineage::build(Vec::<Dialect>::new()).unwrap_err(),
            LineageError::NoRoot
        );
    }
}
