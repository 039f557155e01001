use crate::message::{Channel, MessageKind, ProtocolVersion};
use crate::paging::FieldWidth;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Unsupported protocol version {0}")]
    UnsupportedVersion(ProtocolVersion),
    #[error("No opcode for {kind} on the {channel} channel at version {version}")]
    MissingOpcode {
        version: ProtocolVersion,
        kind: MessageKind,
        channel: Channel,
    },
    #[error("No implementation of {kind} reachable from version {version}")]
    Unimplemented {
        version: ProtocolVersion,
        kind: MessageKind,
    },
    #[error("Version {version} has no predecessor implementing {kind}")]
    NoInheritedImpl {
        version: ProtocolVersion,
        kind: MessageKind,
    },
    #[error("Invalid lineage: {0}")]
    Lineage(#[from] LineageError),
    #[error("Value {value} does not fit in a {width:?} field")]
    FieldOverflow { value: usize, width: FieldWidth },
    #[error("Position {position} is past the end of the buffer ({len})")]
    PositionOutOfBounds { position: usize, len: usize },
    #[error("{kind} handler received a {found} request")]
    RequestMismatch {
        kind: MessageKind,
        found: MessageKind,
    },
    #[error("Invalid limit {name} = {value}")]
    InvalidLimit { name: &'static str, value: usize },
}

/// Structural problems found while assembling a lineage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineageError {
    #[error("no root dialect")]
    NoRoot,
    #[error("more than one root dialect ({0} and {1})")]
    MultipleRoots(ProtocolVersion, ProtocolVersion),
    #[error("version {0} declared twice")]
    Duplicate(ProtocolVersion),
    #[error("{version} derives from unknown version {parent}")]
    UnknownParent {
        version: ProtocolVersion,
        parent: ProtocolVersion,
    },
    #[error("{version} derives from {parent}, which is not older")]
    ParentNotOlder {
        version: ProtocolVersion,
        parent: ProtocolVersion,
    },
    #[error("{parent} has more than one successor ({first} and {second})")]
    Branch {
        parent: ProtocolVersion,
        first: ProtocolVersion,
        second: ProtocolVersion,
    },
}

pub type EncodeResult<T> = Result<T, ProtocolError>;
