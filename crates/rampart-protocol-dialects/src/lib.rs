//! The standard dialect lineage, from client 1.68 to 1.80.
//!
//! Each version module declares its `VERSION`, the `PARENT` it derives
//! from and the messages it overrides. Everything it does not override is
//! inherited.

pub mod opcodes;
pub mod records;
pub mod v168;
pub mod v171;
pub mod v172;
pub mod v173;
pub mod v174;
pub mod v175;
pub mod v176;
pub mod v180;

pub use opcodes::standard_opcodes;

use rampart_protocol_core::{Dialect, EncodeResult, Lineage, LineageError, VersionRegistry};

/// Every dialect of the standard lineage, oldest first.
pub const DIALECTS: &[fn() -> Dialect] = &[
    v168::dialect,
    v171::dialect,
    v172::dialect,
    v173::dialect,
    v174::dialect,
    v175::dialect,
    v176::dialect,
    v180::dialect,
];

pub fn standard_lineage() -> Result<Lineage, LineageError> {
    Lineage::build(DIALECTS.iter().map(|dialect| dialect()))
}

/// The standard lineage with its opcode table, validated.
pub fn standard_registry() -> EncodeResult<VersionRegistry> {
    VersionRegistry::new(standard_lineage()?, standard_opcodes())
}
