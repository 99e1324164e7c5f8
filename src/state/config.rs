//! Preference file management

use crate::speech::EngineKind;
use crate::{Result, SpeakrError};
use log::{debug, info, warn};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the preference file location
pub const CONFIG_ENV: &str = "SPEAKR_CONFIG";

/// Environment variable overriding the audio cache directory
pub const CACHE_DIR_ENV: &str = "SPEAKR_CACHE_DIR";

const CONFIG_FILE_NAME: &str = "speakr.json";
const CACHE_DIR_NAME: &str = crate::APP_NAME;

/// On-disk locations used by speakr
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    /// JSON preference file (~/.config/speakr.json)
    pub config_file: PathBuf,

    /// Directory holding cached audio (~/.cache/speakr)
    pub cache_dir: PathBuf,
}

impl Paths {
    /// Resolve paths from the environment and the platform's standard directories
    pub fn resolve() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));

        let config_file = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::config_dir()
                    .unwrap_or_else(|| home.join(".config"))
                    .join(CONFIG_FILE_NAME)
            });

        let cache_dir = std::env::var_os(CACHE_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::cache_dir()
                    .unwrap_or_else(|| home.join(".cache"))
                    .join(CACHE_DIR_NAME)
            });

        Self {
            config_file,
            cache_dir,
        }
    }

    /// Place both the preference file and the cache under `root`
    pub fn in_dir(root: &Path) -> Self {
        Self {
            config_file: root.join(CONFIG_FILE_NAME),
            cache_dir: root.join("cache"),
        }
    }
}

/// User preferences persisted as JSON
///
/// Missing keys take their default, unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Preferred engine name (`gtts`, `system`, `festival`, `espeak-ng`)
    pub engine: String,

    /// Voice identifier passed to the engine
    pub voice_id: String,

    /// Keep synthesized online audio on disk for reuse
    pub cache_enabled: bool,

    /// Speech rate (0-100), engine default when unset
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_percent"
    )]
    pub rate: Option<u8>,

    /// Speech volume (0-100), engine default when unset
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_percent"
    )]
    pub volume: Option<u8>,
}

/// Read a 0-100 value, treating anything else as unset
fn deserialize_percent<'de, D>(deserializer: D) -> std::result::Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let percent = value
        .as_ref()
        .and_then(serde_json::Value::as_u64)
        .filter(|&v| v <= 100)
        .map(|v| v as u8);

    if percent.is_none() {
        if let Some(value) = value.filter(|v| !v.is_null()) {
            warn!("Ignoring out of range preference value {}", value);
        }
    }
    Ok(percent)
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            engine: EngineKind::Google.name().to_string(),
            voice_id: "en".to_string(),
            cache_enabled: true,
            rate: None,
            volume: None,
        }
    }
}

/// Application configuration backed by the preference file
pub struct Config {
    prefs: Preferences,

    /// Preference file path
    path: PathBuf,
}

impl Config {
    /// Load configuration from `path`
    ///
    /// A missing, unreadable or malformed file yields the defaults.
    pub fn load_from(path: &Path) -> Self {
        debug!("Loading config from {:?}", path);

        let prefs = if path.exists() {
            match fs::read_to_string(path)
                .map_err(SpeakrError::from)
                .and_then(|raw| serde_json::from_str::<Preferences>(&raw).map_err(SpeakrError::from))
            {
                Ok(prefs) => prefs,
                Err(e) => {
                    warn!("Ignoring unreadable config {:?}: {}", path, e);
                    Preferences::default()
                }
            }
        } else {
            info!("Config file not found, using defaults");
            Preferences::default()
        };

        Self {
            prefs,
            path: path.to_path_buf(),
        }
    }

    /// Save configuration to disk, creating the parent directory
    pub fn save(&self) -> Result<()> {
        debug!("Saving config to {:?}", self.path);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    SpeakrError::Config(format!("Failed to create {:?}: {}", parent, e))
                })?;
            }
        }

        let json = serde_json::to_string_pretty(&self.prefs)?;
        fs::write(&self.path, json)
            .map_err(|e| SpeakrError::Config(format!("Failed to save config: {}", e)))
    }

    /// Expose the config file path for display
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    /// Preferred engine, if the stored name is recognized
    pub fn engine(&self) -> Option<EngineKind> {
        self.prefs.engine.parse().ok()
    }

    pub fn set_engine(&mut self, kind: EngineKind) {
        self.prefs.engine = kind.name().to_string();
    }

    pub fn voice_id(&self) -> &str {
        &self.prefs.voice_id
    }

    pub fn set_voice_id(&mut self, voice_id: &str) {
        self.prefs.voice_id = voice_id.to_string();
    }

    pub fn cache_enabled(&self) -> bool {
        self.prefs.cache_enabled
    }

    pub fn set_cache_enabled(&mut self, enabled: bool) {
        self.prefs.cache_enabled = enabled;
    }

    /// Speech rate (0-100)
    pub fn rate(&self) -> Option<u8> {
        self.prefs.rate.filter(|&r| r <= 100)
    }

    /// Speech volume (0-100)
    pub fn volume(&self) -> Option<u8> {
        self.prefs.volume.filter(|&v| v <= 100)
    }
}
