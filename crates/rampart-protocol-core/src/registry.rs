use crate::encoder::{ConnectionBinding, Encoder};
use crate::error::{EncodeResult, ProtocolError};
use crate::lineage::{Limits, Lineage};
use crate::message::{MessageKind, ProtocolVersion};
use crate::opcode::OpcodeTable;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

/// Configuration overrides applied on top of every version's limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LimitOverrides {
    pub skill_page_budget: Option<usize>,
    pub max_skill_entries: Option<usize>,
    pub delve_max_len: Option<usize>,
}

impl LimitOverrides {
    fn validate(&self) -> EncodeResult<()> {
        if let Some(budget) = self.skill_page_budget {
            if budget == 0 {
                return Err(ProtocolError::InvalidLimit {
                    name: "skill_page_budget",
                    value: budget,
                });
            }
        }
        if let Some(max) = self.max_skill_entries {
            if max == 0 || max > u8::MAX as usize {
                return Err(ProtocolError::InvalidLimit {
                    name: "max_skill_entries",
                    value: max,
                });
            }
        }
        if let Some(len) = self.delve_max_len {
            if len == 0 || len > u16::MAX as usize {
                return Err(ProtocolError::InvalidLimit {
                    name: "delve_max_len",
                    value: len,
                });
            }
        }
        Ok(())
    }

    fn apply(&self, limits: Limits) -> Limits {
        Limits {
            skill_page_budget: self.skill_page_budget.unwrap_or(limits.skill_page_budget),
            max_skill_entries: self.max_skill_entries.unwrap_or(limits.max_skill_entries),
            delve_max_len: self.delve_max_len.unwrap_or(limits.delve_max_len),
            ..limits
        }
    }
}

/// Maps negotiated versions to encoders. Built once at startup and shared
/// by every connection.
#[derive(Debug, Clone)]
pub struct VersionRegistry {
    lineage: Arc<Lineage>,
    opcodes: Arc<OpcodeTable>,
    limits: HashMap<ProtocolVersion, Limits>,
    enabled: BTreeSet<ProtocolVersion>,
}

impl VersionRegistry {
    /// Check that every version resolves every message kind and every
    /// opcode the kind can be sent with.
    pub fn new(lineage: Lineage, opcodes: OpcodeTable) -> EncodeResult<Self> {
        let mut limits = HashMap::new();
        for version in lineage.versions() {
            for kind in MessageKind::ALL {
                lineage.resolve(version, kind)?;
                for channel in kind.channels() {
                    opcodes.resolve(version, kind, *channel)?;
                }
            }
            limits.insert(version, lineage.limits(version).unwrap_or_default());
        }
        let enabled: BTreeSet<_> = lineage.versions().collect();
        info!(
            versions = %enabled.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", "),
            "Protocol registry ready"
        );
        Ok(Self {
            lineage: Arc::new(lineage),
            opcodes: Arc::new(opcodes),
            limits,
            enabled,
        })
    }

    /// Only negotiate the listed versions. Every listed version must be
    /// part of the lineage.
    pub fn restrict(mut self, versions: &[ProtocolVersion]) -> EncodeResult<Self> {
        if let Some(unknown) = versions.iter().find(|v| !self.lineage.contains(**v)) {
            return Err(ProtocolError::UnsupportedVersion(*unknown));
        }
        self.enabled = versions.iter().copied().collect();
        Ok(self)
    }

    pub fn with_limits(mut self, overrides: LimitOverrides) -> EncodeResult<Self> {
        overrides.validate()?;
        for limits in self.limits.values_mut() {
            *limits = overrides.apply(*limits);
        }
        Ok(self)
    }

    /// Versions that can be negotiated, oldest first.
    pub fn versions(&self) -> impl Iterator<Item = ProtocolVersion> + '_ {
        self.enabled.iter().copied()
    }

    pub fn supports(&self, version: ProtocolVersion) -> bool {
        self.enabled.contains(&version)
    }

    pub fn limits(&self, version: ProtocolVersion) -> Option<Limits> {
        self.limits.get(&version).copied()
    }

    pub fn lineage(&self) -> &Lineage {
        &self.lineage
    }

    /// Start encoding for a connection that announced `version`. There is
    /// no fallback to a neighbouring version.
    pub fn negotiate(
        &self,
        version: ProtocolVersion,
        binding: ConnectionBinding,
    ) -> EncodeResult<Encoder> {
        let limits = match self.limits.get(&version) {
            Some(limits) if self.supports(version) => *limits,
            _ => {
                debug!(%version, "Rejected protocol version");
                return Err(ProtocolError::UnsupportedVersion(version));
            }
        };
        debug!(%version, "Negotiated protocol version");
        Ok(Encoder::new(
            version,
            Arc::clone(&self.lineage),
            Arc::clone(&self.opcodes),
            limits,
            binding,
        ))
    }
}
