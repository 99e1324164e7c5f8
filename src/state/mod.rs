//! Application state
//!
//! `State` ties the preference file to the engine registry and implements
//! the user-facing actions: speak text or the clipboard, switch engines and
//! voices, manage the audio cache, and save audio.

pub mod config;

use crate::clipboard::get_from_clipboard;
use crate::speech::{AudioCache, CacheStats, EngineInfo, EngineKind, EngineRegistry, Voice};
use crate::{Result, SpeakrError};
use config::{Config, Paths};
use log::{info, warn};
use std::path::Path;

/// Main application state
pub struct State {
    /// Preferences loaded from the JSON file
    pub config: Config,

    paths: Paths,

    registry: EngineRegistry,
}

impl State {
    /// Load preferences and discover installed engines
    pub fn new(paths: Paths) -> Result<Self> {
        let config = Config::load_from(&paths.config_file);
        info!("Configuration loaded from {:?}", config.path());

        let registry = EngineRegistry::discover(&config, &paths)?;
        info!(
            "{} engines available, using {}",
            registry.engines().count(),
            registry.current().display_name
        );

        Ok(Self::with_registry(config, paths, registry))
    }

    /// Assemble state from parts
    pub fn with_registry(config: Config, paths: Paths, registry: EngineRegistry) -> Self {
        Self {
            config,
            paths,
            registry,
        }
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    pub fn engines(&self) -> Vec<&EngineInfo> {
        self.registry.engines().collect()
    }

    pub fn current_engine(&self) -> &EngineInfo {
        self.registry.current()
    }

    /// Voices of `kind`, or of the current engine
    pub fn voices(&self, kind: Option<EngineKind>) -> Result<&[Voice]> {
        let info = match kind {
            Some(kind) => self
                .registry
                .get(kind)
                .ok_or_else(|| SpeakrError::EngineUnavailable(kind.display_name().to_string()))?,
            None => self.registry.current(),
        };
        Ok(&info.voices)
    }

    /// Voice to use with the current engine
    ///
    /// The stored voice only applies to the engine it was chosen for; any
    /// other engine falls back to its own default.
    fn active_voice(&self) -> Option<&str> {
        if self.config.engine() == Some(self.registry.current().kind) {
            Some(self.config.voice_id())
        } else {
            None
        }
    }

    /// Speak text with the current engine and voice
    ///
    /// Returns false when there was nothing to speak.
    pub fn speak_text(&mut self, text: &str) -> Result<bool> {
        self.speak_with(text, None, None)
    }

    /// Speak text, optionally overriding engine and voice for this call only
    pub fn speak_with(
        &mut self,
        text: &str,
        engine: Option<EngineKind>,
        voice: Option<&str>,
    ) -> Result<bool> {
        if text.trim().is_empty() {
            info!("Nothing to speak");
            return Ok(false);
        }

        match engine {
            Some(kind) if kind != self.registry.current().kind => {
                self.registry.speak_with(kind, text, voice)?
            }
            _ => {
                let voice = voice
                    .map(str::to_string)
                    .or_else(|| self.active_voice().map(str::to_string));
                self.registry.speak(text, voice.as_deref())?
            }
        }

        Ok(true)
    }

    /// Speak whatever text is on the clipboard
    pub fn speak_clipboard(
        &mut self,
        engine: Option<EngineKind>,
        voice: Option<&str>,
    ) -> Result<bool> {
        let text = get_from_clipboard()?;
        if text.trim().is_empty() {
            info!("Clipboard is empty");
            return Ok(false);
        }
        self.speak_with(&text, engine, voice)
    }

    /// Phrase used to try out the current engine
    pub fn test_phrase(&self) -> String {
        format!(
            "Hello! This is a test of {}. If you can hear this, speech is working.",
            self.registry.current().display_name
        )
    }

    pub fn test_voice(&mut self) -> Result<()> {
        let phrase = self.test_phrase();
        self.speak_text(&phrase).map(|_| ())
    }

    /// Switch engines and persist the choice
    ///
    /// The voice is reset to the new engine's default.
    pub fn use_engine(&mut self, name: &str) -> Result<()> {
        let kind: EngineKind = name.parse()?;
        self.registry.set_engine(kind)?;

        let voice = self
            .registry
            .current()
            .default_voice()
            .unwrap_or("default")
            .to_string();
        self.config.set_engine(kind);
        self.config.set_voice_id(&voice);
        self.config.save()
    }

    /// Persist the voice for the current engine
    pub fn set_voice(&mut self, voice_id: &str) -> Result<()> {
        let voice_id = voice_id.trim();
        if voice_id.is_empty() {
            return Err(SpeakrError::Config("voice id cannot be empty".to_string()));
        }

        let current = self.registry.current();
        if !current.voices.is_empty() && !current.voices.iter().any(|v| v.id == voice_id) {
            warn!("Voice {} is not listed by {}", voice_id, current.display_name);
        }

        let kind = current.kind;
        self.config.set_engine(kind);
        self.config.set_voice_id(voice_id);
        self.config.save()
    }

    pub fn set_cache_enabled(&mut self, enabled: bool) -> Result<()> {
        self.registry.set_cache_enabled(enabled);
        self.config.set_cache_enabled(enabled);
        self.config.save()
    }

    fn cache(&self) -> Result<AudioCache> {
        AudioCache::open(&self.paths.cache_dir)
    }

    pub fn clear_cache(&self) -> Result<usize> {
        self.cache()?.clear()
    }

    pub fn cache_stats(&self) -> Result<CacheStats> {
        self.cache()?.stats()
    }

    /// Write speech audio to `path`; only the Google engine supports this
    pub fn save_audio(&mut self, text: &str, path: &Path) -> Result<()> {
        if text.trim().is_empty() {
            return Err(SpeakrError::Speech("No text to save".to_string()));
        }
        let voice = self.active_voice().map(str::to_string);
        self.registry.synthesize_to(text, voice.as_deref(), path)
    }
}
