pub mod error;

use std::path::{Path, PathBuf};

use leanback_model::RepeatPolicy;
use tracing::{debug, info};

use crate::models::PlaybackConfig;
use crate::util::parse_bool;
use error::ConfigLoadError;

/// Environment variable naming the TOML file to load.
pub const CONFIG_PATH_VAR: &str = "LEANBACK_CONFIG";

/// Layers defaults, an optional TOML file, and `LEANBACK_*` overrides.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    path: Option<PathBuf>,
    env_file: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Load a `.env` file before reading overrides.
    pub fn with_env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = Some(path.into());
        self
    }

    /// Parse a TOML document on top of the defaults, without env overrides.
    pub fn from_toml_str(raw: &str) -> Result<PlaybackConfig, ConfigLoadError> {
        toml::from_str(raw).map_err(|source| ConfigLoadError::Parse { source })
    }

    pub fn from_path(path: &Path) -> Result<PlaybackConfig, ConfigLoadError> {
        let raw = std::fs::read_to_string(path).map_err(|source| {
            ConfigLoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn load(&self) -> Result<PlaybackConfig, ConfigLoadError> {
        if let Some(env_file) = &self.env_file {
            dotenvy::from_path(env_file)?;
            info!(path = %env_file.display(), "loaded .env file");
        }

        let path = self
            .path
            .clone()
            .or_else(|| std::env::var_os(CONFIG_PATH_VAR).map(PathBuf::from));

        let mut config = match path {
            Some(path) => {
                debug!(path = %path.display(), "loading playback config");
                Self::from_path(&path)?
            }
            None => PlaybackConfig::default(),
        };

        apply_overrides(&mut config, |key| std::env::var(key).ok())?;
        Ok(config)
    }
}

/// Apply `LEANBACK_*` overrides from an arbitrary lookup.
pub fn apply_overrides(
    config: &mut PlaybackConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigLoadError> {
    let flag = |key: &'static str| -> Result<Option<bool>, ConfigLoadError> {
        match lookup(key) {
            None => Ok(None),
            Some(raw) => parse_bool(&raw)
                .map(Some)
                .ok_or(ConfigLoadError::InvalidValue { key, value: raw }),
        }
    };

    if let Some(value) = flag("LEANBACK_HLS_FORCED")? {
        config.loader.hls_forced = value;
    }
    if let Some(value) = flag("LEANBACK_DASH_LIVE_DISABLED")? {
        config.loader.dash_live_disabled = value;
    }
    if let Some(value) = flag("LEANBACK_LOOP_SHORTS")? {
        config.loader.loop_shorts = value;
    }
    if let Some(value) = flag("LEANBACK_HISTORY_ENABLED")? {
        config.state.history_enabled = value;
    }
    if let Some(raw) = lookup("LEANBACK_REPEAT_POLICY") {
        config.loader.repeat_policy = parse_repeat_policy(&raw).ok_or(
            ConfigLoadError::InvalidValue {
                key: "LEANBACK_REPEAT_POLICY",
                value: raw,
            },
        )?;
    }
    Ok(())
}

fn parse_repeat_policy(raw: &str) -> Option<RepeatPolicy> {
    let policy = match raw.trim().to_ascii_lowercase().as_str() {
        "all" => RepeatPolicy::All,
        "one" => RepeatPolicy::One,
        "close" => RepeatPolicy::Close,
        "pause" => RepeatPolicy::Pause,
        "list" => RepeatPolicy::List,
        "shuffle" => RepeatPolicy::Shuffle,
        "reverse_list" | "reverse" => RepeatPolicy::ReverseList,
        _ => return None,
    };
    Some(policy)
}
