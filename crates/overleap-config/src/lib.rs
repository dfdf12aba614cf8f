use overleap_engine::{DecorationStyle, Settings, SettingsError, TriggerPair};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid config value: {source}")]
    ConfigValueError {
        #[from]
        source: SettingsError,
    },
}

/// On-disk configuration, converted into the engine's immutable [`Settings`]
/// snapshot via [`Config::to_settings`]. Scope-merging (workspace, folder,
/// per-language overrides) is the host's job; this crate only handles the
/// file itself.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_trigger_pairs")]
    pub trigger_pairs: Vec<String>,
    #[serde(default)]
    pub decorate_all: bool,
    #[serde(default = "default_true")]
    pub decorate_nearest_only: bool,
    #[serde(default)]
    pub decoration_style: String,
}

fn default_trigger_pairs() -> Vec<String> {
    Settings::default_trigger_pairs()
        .into_iter()
        .map(|pair| pair.as_str().to_string())
        .collect()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trigger_pairs: default_trigger_pairs(),
            decorate_all: false,
            decorate_nearest_only: true,
            decoration_style: String::new(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/overleap");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Validate and freeze into the engine's per-cycle snapshot.
    pub fn to_settings(&self) -> Result<Settings, ConfigError> {
        let trigger_pairs = self
            .trigger_pairs
            .iter()
            .map(|pair| pair.parse::<TriggerPair>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Settings {
            trigger_pairs,
            decorate_all: self.decorate_all,
            decorate_nearest_only: self.decorate_nearest_only,
            decoration_style: DecorationStyle(self.decoration_style.clone()),
        })
    }
}
