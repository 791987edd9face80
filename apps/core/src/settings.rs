use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::hotkey::parse_accelerator;

pub const DEFAULT_HOTKEY: &str = "Ctrl+Space";

#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(String),
    Encode(String),
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(error) => write!(f, "io error: {error}"),
            Self::Parse(error) => write!(f, "settings parse error: {error}"),
            Self::Encode(error) => write!(f, "settings encode error: {error}"),
        }
    }
}

impl std::error::Error for SettingsError {}

impl From<std::io::Error> for SettingsError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub hotkey_show_app: String,
    pub show_indicator_icon: bool,
    pub theme: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hotkey_show_app: DEFAULT_HOTKEY.to_string(),
            show_indicator_icon: true,
            theme: "dark".to_string(),
        }
    }
}

pub fn validate(settings: &Settings) -> Result<(), String> {
    parse_accelerator(&settings.hotkey_show_app)?;
    if settings.theme.trim().is_empty() {
        return Err("theme is required".to_string());
    }
    Ok(())
}

/// Settings as read at process start. `first_run` is true iff the settings
/// file did not exist yet; the first save ends the first-run state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSettings {
    pub settings: Settings,
    pub first_run: bool,
}

pub fn load(path: &Path) -> Result<LoadedSettings, SettingsError> {
    if !path.exists() {
        return Ok(LoadedSettings {
            settings: Settings::default(),
            first_run: true,
        });
    }

    let raw = fs::read_to_string(path)?;
    let settings: Settings =
        toml::from_str(&raw).map_err(|error| SettingsError::Parse(error.to_string()))?;
    Ok(LoadedSettings {
        settings,
        first_run: false,
    })
}

// A broken settings file must never keep the launcher from coming up.
pub fn load_or_default(path: &Path) -> LoadedSettings {
    match load(path) {
        Ok(loaded) => loaded,
        Err(error) => {
            crate::logging::warn(&format!(
                "settings unreadable at {}: {error}; using defaults",
                path.display()
            ));
            LoadedSettings {
                settings: Settings::default(),
                first_run: false,
            }
        }
    }
}

pub fn save(settings: &Settings, path: &Path) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let encoded = toml::to_string_pretty(settings)
        .map_err(|error| SettingsError::Encode(error.to_string()))?;
    fs::write(path, encoded)?;
    Ok(())
}
