use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::provider::spotify::API_BASE;

pub const DEFAULT_STATE_DIR: &str = ".plsync";
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";

/// Where the catalog access token comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CredentialSource {
    /// SPOTIFY_ACCESS_TOKEN from the environment or .env
    Env,
    /// Encrypted token saved by `plsync auth`
    Store,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_source: CredentialSource,
    pub redirect_uri: String,
    pub api_base: String,
    /// Visibility of playlists created by `build`
    pub public: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_source: CredentialSource::Store,
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            api_base: API_BASE.to_string(),
            public: true,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config TOML from {:?}", path))
    }

    /// Config from `<state_dir>/config.toml`, or defaults when the file is absent.
    pub fn load_or_default(state_dir: &Path) -> anyhow::Result<Self> {
        let path = Self::path(state_dir);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content =
            toml::to_string_pretty(&self).with_context(|| "Failed to serialize config to TOML")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        fs::write(path, content).with_context(|| format!("Failed to write config to {:?}", path))
    }

    pub fn path(state_dir: &Path) -> PathBuf {
        state_dir.join("config.toml")
    }
}
