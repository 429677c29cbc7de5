//! Configuration loading for ConvoDesk.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Error;
use crate::session::SessionOptions;

pub type Result<T> = std::result::Result<T, Error>;

/// Default automated-assistant reply.
pub const DEFAULT_REPLY_TEXT: &str = "I'm your AI assistant. I've processed your message and will help the customer with their inquiry.";

/// Get the ConvoDesk home directory (~/.convodesk).
pub fn get_home_dir() -> Result<PathBuf> {
    let home = directories::UserDirs::new()
        .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

    Ok(home.home_dir().join(".convodesk"))
}

/// Get the settings file path.
pub fn get_settings_path() -> Result<PathBuf> {
    Ok(get_home_dir()?.join("settings.json"))
}

/// Load settings from ~/.convodesk/settings.json
pub fn load_settings() -> Result<Settings> {
    let path = get_settings_path()?;

    if !path.exists() {
        return Err(Error::Config(format!(
            "Settings file not found at {}",
            path.display()
        )));
    }

    load_settings_from(&path)
}

/// Load settings from an explicit path.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)?;
    let settings: Settings = serde_json::from_str(&content)?;

    validate_settings(&settings)?;

    tracing::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

fn validate_settings(settings: &Settings) -> Result<()> {
    if settings.simulator.reply_text.trim().is_empty() {
        return Err(Error::Config(
            "simulator.reply_text must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Load settings or return default if not found.
pub fn load_settings_or_default() -> Settings {
    if !get_settings_path().is_ok_and(|path| path.exists()) {
        tracing::debug!("No settings file, using defaults");
        return Settings::default();
    }

    load_settings().unwrap_or_else(|e| {
        tracing::warn!("Failed to load settings: {}, using defaults", e);
        Settings::default()
    })
}

/// Automated-assistant simulator configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Simulator {
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,
    #[serde(default = "default_reply_text")]
    pub reply_text: String,
}

fn default_reply_delay_ms() -> u64 {
    1000
}

fn default_reply_text() -> String {
    DEFAULT_REPLY_TEXT.to_string()
}

impl Default for Simulator {
    fn default() -> Self {
        Self {
            reply_delay_ms: default_reply_delay_ms(),
            reply_text: default_reply_text(),
        }
    }
}

/// Operator session configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SessionConfig {
    /// Open the first conversation when the console starts.
    #[serde(default = "default_preselect_first")]
    pub preselect_first: bool,
}

fn default_preselect_first() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            preselect_first: default_preselect_first(),
        }
    }
}

/// Seed data configuration.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Seed {
    /// Seed file; the built-in demo data is used when unset.
    pub path: Option<PathBuf>,
}

/// ConvoDesk settings.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Settings {
    #[serde(default)]
    pub simulator: Simulator,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub seed: Seed,
}

impl Settings {
    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.simulator.reply_delay_ms)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            reply_delay: self.reply_delay(),
            preselect_first: self.session.preselect_first,
        }
    }
}
