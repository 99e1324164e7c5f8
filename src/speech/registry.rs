//! Engine discovery and dispatch
//!
//! Probes which engines are installed, keeps one of them selected, and
//! forwards speech requests to it.

use super::backends::{EspeakSynth, FestivalSynth, GoogleSynth, NativeSynth};
use super::{AudioCache, EngineInfo, EngineKind, SpeechSettings, Synth};
use crate::audio::Player;
use crate::state::config::{Config, Paths};
use crate::{Result, SpeakrError};
use log::{debug, info, warn};
use std::path::Path;

/// Installed engines and the one currently selected
pub struct EngineRegistry {
    engines: Vec<Box<dyn Synth>>,
    current: usize,
}

impl EngineRegistry {
    /// Probe every known engine and select the preferred one
    ///
    /// Engines are tried in a fixed order: system voice, Google, Festival,
    /// eSpeak NG. Google needs no local tool and is always registered.
    pub fn discover(config: &Config, paths: &Paths) -> Result<Self> {
        let settings = SpeechSettings {
            rate: config.rate(),
            volume: config.volume(),
        };

        let mut engines: Vec<Box<dyn Synth>> = Vec::new();

        for kind in EngineKind::ALL {
            info!("Trying {} backend...", kind.display_name());
            let result: Result<Box<dyn Synth>> = match kind {
                EngineKind::System => {
                    NativeSynth::new(settings).map(|s| Box::new(s) as Box<dyn Synth>)
                }
                EngineKind::Google => Ok(Box::new(Self::google(paths, config.cache_enabled()))),
                EngineKind::Festival => {
                    FestivalSynth::new().map(|s| Box::new(s) as Box<dyn Synth>)
                }
                EngineKind::EspeakNg => {
                    EspeakSynth::new(settings).map(|s| Box::new(s) as Box<dyn Synth>)
                }
            };

            match result {
                Ok(synth) => {
                    info!("✓ {} available", kind.display_name());
                    engines.push(synth);
                }
                Err(e) => info!("✗ {} unavailable: {}", kind.display_name(), e),
            }
        }

        Self::with_engines(engines, config.engine())
    }

    fn google(paths: &Paths, cache_enabled: bool) -> GoogleSynth {
        let cache = match AudioCache::open(&paths.cache_dir) {
            Ok(cache) => Some(cache),
            Err(e) => {
                warn!("Audio cache disabled, cannot open {:?}: {}", paths.cache_dir, e);
                None
            }
        };

        GoogleSynth::new(Player::detect(), cache, cache_enabled)
    }

    /// Build a registry from already constructed engines
    ///
    /// Selects `preferred` when present, otherwise Google, otherwise the
    /// first engine.
    pub fn with_engines(
        engines: Vec<Box<dyn Synth>>,
        preferred: Option<EngineKind>,
    ) -> Result<Self> {
        if engines.is_empty() {
            return Err(SpeakrError::NoEngines);
        }

        let position = |kind: EngineKind| engines.iter().position(|e| e.kind() == kind);
        let current = preferred
            .and_then(position)
            .or_else(|| position(EngineKind::Google))
            .unwrap_or(0);

        if let Some(kind) = preferred {
            if engines[current].kind() != kind {
                warn!(
                    "Preferred engine {} not available, using {}",
                    kind,
                    engines[current].kind()
                );
            }
        }

        debug!("Selected engine {}", engines[current].kind());
        Ok(Self { engines, current })
    }

    /// Descriptions of every available engine, in discovery order
    pub fn engines(&self) -> impl Iterator<Item = &EngineInfo> {
        self.engines.iter().map(|e| e.info())
    }

    pub fn get(&self, kind: EngineKind) -> Option<&EngineInfo> {
        self.engines().find(|info| info.kind == kind)
    }

    pub fn current(&self) -> &EngineInfo {
        self.engines[self.current].info()
    }

    /// Select `kind` for subsequent requests
    pub fn set_engine(&mut self, kind: EngineKind) -> Result<()> {
        let idx = self.index_of(kind)?;
        self.current = idx;
        info!("Engine changed to: {}", self.current().display_name);
        Ok(())
    }

    fn index_of(&self, kind: EngineKind) -> Result<usize> {
        self.engines
            .iter()
            .position(|e| e.kind() == kind)
            .ok_or_else(|| SpeakrError::EngineUnavailable(kind.display_name().to_string()))
    }

    /// Speak with the current engine
    pub fn speak(&mut self, text: &str, voice: Option<&str>) -> Result<()> {
        let idx = self.current;
        self.speak_at(idx, text, voice)
    }

    /// Speak with a specific engine without changing the selection
    pub fn speak_with(&mut self, kind: EngineKind, text: &str, voice: Option<&str>) -> Result<()> {
        let idx = self.index_of(kind)?;
        self.speak_at(idx, text, voice)
    }

    fn speak_at(&mut self, idx: usize, text: &str, voice: Option<&str>) -> Result<()> {
        if text.trim().is_empty() {
            debug!("Ignoring blank text");
            return Ok(());
        }

        let synth = &mut self.engines[idx];
        debug!(
            "Dispatching {} chars to {} (voice {:?})",
            text.chars().count(),
            synth.kind(),
            voice
        );
        synth.speak(text, voice)
    }

    /// Save audio from the current engine to `path`
    pub fn synthesize_to(&mut self, text: &str, voice: Option<&str>, path: &Path) -> Result<()> {
        self.engines[self.current].synthesize_to(text, voice, path)
    }

    /// Apply the cache setting to every engine that caches
    pub fn set_cache_enabled(&mut self, enabled: bool) {
        for engine in &mut self.engines {
            engine.set_cache_enabled(enabled);
        }
    }
}

impl Drop for EngineRegistry {
    fn drop(&mut self) {
        debug!("Shutting down speech engines");
        for engine in &mut self.engines {
            if let Err(e) = engine.stop() {
                debug!("Failed to stop {}: {}", engine.kind(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::Voice;

    struct Silent {
        info: EngineInfo,
    }

    impl Synth for Silent {
        fn info(&self) -> &EngineInfo {
            &self.info
        }

        fn speak(&mut self, _text: &str, _voice: Option<&str>) -> Result<()> {
            Ok(())
        }

        fn stop(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn silent(kind: EngineKind) -> Box<dyn Synth> {
        Box::new(Silent {
            info: EngineInfo::new(kind, vec![Voice::new("v", "Voice")]),
        })
    }

    #[test]
    fn test_empty_registry() {
        assert!(matches!(
            EngineRegistry::with_engines(Vec::new(), None),
            Err(SpeakrError::NoEngines)
        ));
    }

    #[test]
    fn test_prefers_google_when_no_preference() {
        let registry = EngineRegistry::with_engines(
            vec![silent(EngineKind::System), silent(EngineKind::Google)],
            None,
        )
        .unwrap();
        assert_eq!(registry.current().kind, EngineKind::Google);
    }

    #[test]
    fn test_falls_back_to_first_engine() {
        let registry = EngineRegistry::with_engines(
            vec![silent(EngineKind::Festival), silent(EngineKind::EspeakNg)],
            Some(EngineKind::System),
        )
        .unwrap();
        assert_eq!(registry.current().kind, EngineKind::Festival);
    }

    #[test]
    fn test_set_unavailable_engine() {
        let mut registry =
            EngineRegistry::with_engines(vec![silent(EngineKind::EspeakNg)], None).unwrap();
        assert!(matches!(
            registry.set_engine(EngineKind::Festival),
            Err(SpeakrError::EngineUnavailable(_))
        ));
        assert_eq!(registry.current().kind, EngineKind::EspeakNg);
    }

    #[test]
    fn test_save_requires_google() {
        let mut registry =
            EngineRegistry::with_engines(vec![silent(EngineKind::EspeakNg)], None).unwrap();
        let err = registry
            .synthesize_to("hi", None, Path::new("/tmp/never.mp3"))
            .unwrap_err();
        assert!(err.to_string().contains("Google TTS"));
    }
}
