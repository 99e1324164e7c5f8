//! Speech synthesizer abstraction
//!
//! Every installed engine is wrapped in a [`Synth`] so that the rest of the
//! program can forward text without knowing which engine is behind it.

use crate::{Result, SpeakrError};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// The engines speakr knows how to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    /// The operating system's own voice (Speech Dispatcher, AVFoundation, SAPI)
    System,
    /// Google Translate's online text-to-speech
    Google,
    /// The Festival speech synthesis system
    Festival,
    /// eSpeak NG
    EspeakNg,
}

impl EngineKind {
    /// All engines in discovery order
    pub const ALL: [EngineKind; 4] = [
        EngineKind::System,
        EngineKind::Google,
        EngineKind::Festival,
        EngineKind::EspeakNg,
    ];

    /// Stable name used in the preference file and on the command line
    pub fn name(&self) -> &'static str {
        match self {
            EngineKind::System => "system",
            EngineKind::Google => "gtts",
            EngineKind::Festival => "festival",
            EngineKind::EspeakNg => "espeak-ng",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            EngineKind::System => "System TTS (Fast)",
            EngineKind::Google => "Google TTS (High Quality)",
            EngineKind::Festival => "Festival TTS (Good Quality)",
            EngineKind::EspeakNg => "eSpeak NG (Enhanced)",
        }
    }

    pub fn quality(&self) -> Quality {
        match self {
            EngineKind::Google => Quality::High,
            EngineKind::Festival => Quality::Good,
            EngineKind::System | EngineKind::EspeakNg => Quality::Medium,
        }
    }

    /// Whether the engine needs network access
    pub fn online(&self) -> bool {
        matches!(self, EngineKind::Google)
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EngineKind {
    type Err = SpeakrError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "system" | "pyttsx3" | "native" => Ok(EngineKind::System),
            "gtts" | "google" => Ok(EngineKind::Google),
            "festival" => Ok(EngineKind::Festival),
            "espeak-ng" | "espeak" => Ok(EngineKind::EspeakNg),
            other => Err(SpeakrError::EngineUnavailable(format!(
                "unknown engine '{}' (expected one of: system, gtts, festival, espeak-ng)",
                other
            ))),
        }
    }
}

/// Rough voice quality, shown when listing engines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    High,
    Good,
    Medium,
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Quality::High => "high",
            Quality::Good => "good",
            Quality::Medium => "medium",
        })
    }
}

/// A voice offered by an engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    /// Identifier passed back to the engine
    pub id: String,
    /// Human readable name
    pub name: String,
}

impl Voice {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Description of an available engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineInfo {
    pub kind: EngineKind,
    pub display_name: String,
    pub quality: Quality,
    pub online: bool,
    /// Voices in preference order; the first one is the engine default
    pub voices: Vec<Voice>,
}

impl EngineInfo {
    pub fn new(kind: EngineKind, voices: Vec<Voice>) -> Self {
        Self {
            kind,
            display_name: kind.display_name().to_string(),
            quality: kind.quality(),
            online: kind.online(),
            voices,
        }
    }

    /// Default voice id, if the engine lists any voices
    pub fn default_voice(&self) -> Option<&str> {
        self.voices.first().map(|v| v.id.as_str())
    }
}

/// Rate and volume applied when engines are created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpeechSettings {
    /// Speech rate (0-100, where 50 is normal)
    pub rate: Option<u8>,
    /// Speech volume (0-100)
    pub volume: Option<u8>,
}

/// Speech synthesizer trait
///
/// All backends implement this uniform contract. `speak` blocks until the
/// audio has finished playing.
pub trait Synth: Send {
    /// Engine description (name, quality, voices)
    fn info(&self) -> &EngineInfo;

    fn kind(&self) -> EngineKind {
        self.info().kind
    }

    /// Speak text with the given voice, or the engine default when `None`
    ///
    /// Blank text is a no-op.
    fn speak(&mut self, text: &str, voice: Option<&str>) -> Result<()>;

    /// Stop any speech in progress
    fn stop(&mut self) -> Result<()>;

    /// Write synthesized audio to `path` instead of playing it
    fn synthesize_to(&mut self, _text: &str, _voice: Option<&str>, _path: &Path) -> Result<()> {
        Err(SpeakrError::Speech(format!(
            "Audio saving only available with {}",
            EngineKind::Google.display_name()
        )))
    }

    /// Enable or disable on-disk audio caching, for engines that cache
    fn set_cache_enabled(&mut self, _enabled: bool) {}
}
