use rampart_protocol_core::{LimitOverrides, ProtocolVersion};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct WiretapConfig {
    /// Used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Versions to negotiate. Empty means every supported version.
    #[serde(default)]
    pub versions: Vec<u16>,
    #[serde(default = "default_world")]
    pub world: PathBuf,
    /// Treat the UDP channel as confirmed for every session.
    #[serde(default)]
    pub udp: bool,
    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitsConfig {
    pub skill_page_budget: Option<usize>,
    pub max_skill_entries: Option<usize>,
    pub delve_max_len: Option<usize>,
}

impl LimitsConfig {
    pub fn overrides(&self) -> LimitOverrides {
        LimitOverrides {
            skill_page_budget: self.skill_page_budget,
            max_skill_entries: self.max_skill_entries,
            delve_max_len: self.delve_max_len,
        }
    }
}

fn default_log_filter() -> String {
    "info".into()
}

fn default_world() -> PathBuf {
    PathBuf::from("config/world.toml")
}

impl Default for WiretapConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            versions: Vec::new(),
            world: default_world(),
            udp: false,
            limits: LimitsConfig::default(),
        }
    }
}

impl WiretapConfig {
    /// Read the config at `path`, falling back to defaults when the file
    /// does not exist. Logging is not up yet, so the caller reports which.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: WiretapConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn protocol_versions(&self) -> Vec<ProtocolVersion> {
        self.versions.iter().copied().map(ProtocolVersion).collect()
    }
}
