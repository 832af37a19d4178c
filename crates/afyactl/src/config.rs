//! CLI configuration: an optional TOML file with serde defaults.
//!
//! Missing file means defaults; a file that exists but fails to parse is
//! reported and ignored rather than aborting a triage run.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default config file path
pub const DEFAULT_CONFIG_PATH: &str = "/etc/afya/config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Rules file used when --rules is not given; built-in catalog when
    /// unset.
    #[serde(default)]
    pub rules_path: Option<PathBuf>,

    /// Override the executor's iteration cap (diagnostics only; the
    /// default of catalog size + 1 is correct for well-formed catalogs).
    #[serde(default)]
    pub iteration_cap: Option<usize>,
}

impl Config {
    /// Load from the explicit path, or the default path, or fall back to
    /// defaults when neither exists.
    pub fn load_or_default(explicit: Option<&Path>) -> Config {
        let path = explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        match fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(err) => {
                    warn!(path = %path.display(), %err, "ignoring unparseable config");
                    Config::default()
                }
            },
            Err(_) => Config::default(),
        }
    }
}
