use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "pydeps.toml";

/// Server configuration loaded from `pydeps.toml`.
///
/// The analysis core takes no configuration; this only drives `pydeps serve`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the HTTP API listens on.
    pub bind: String,
    /// Directory holding the registry file.
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_owned(),
            data_dir: PathBuf::from("data"),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `path`.
    ///
    /// Returns the defaults if the file does not exist or cannot be parsed.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(config) => config,
                Err(err) => {
                    warn!("failed to parse {}: {err}. Using defaults.", path.display());
                    Self::default()
                }
            },
            Err(err) => {
                warn!("failed to read {}: {err}. Using defaults.", path.display());
                Self::default()
            }
        }
    }

    /// Apply command-line overrides on top of the loaded values.
    pub fn with_overrides(mut self, bind: Option<String>, data_dir: Option<PathBuf>) -> Self {
        if let Some(bind) = bind {
            self.bind = bind;
        }
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        self
    }

    /// Location of the registry file inside `data_dir`.
    pub fn registry_path(&self) -> PathBuf {
        self.data_dir.join(crate::registry::REGISTRY_FILE)
    }
}
