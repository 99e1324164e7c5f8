//! Native Rust TTS backend using the tts crate
//!
//! This backend uses the `tts` crate which provides a unified interface to:
//! - Speech Dispatcher on Linux (via native bindings)
//! - AVFoundation on macOS/iOS (via native bindings)
//! - SAPI / WinRT on Windows

use crate::speech::{EngineInfo, EngineKind, SpeechSettings, Synth, Voice};
use crate::{Result, SpeakrError};
use log::{debug, error, warn};
use std::thread;
use std::time::Duration;
use tts::Tts as TtsCrate;

/// Volume used when none is configured, as a fraction of the platform range
const DEFAULT_VOLUME: f32 = 0.9;

const SPEAKING_POLL: Duration = Duration::from_millis(100);

/// The operating system's own voice
pub struct NativeSynth {
    /// The tts crate's TTS instance
    tts: TtsCrate,

    info: EngineInfo,

    /// Voices reported by the platform, in the same order as `info.voices`
    voices: Vec<tts::Voice>,

    /// Id of the voice currently selected
    current_voice: Option<String>,

    /// Whether the platform can report when an utterance ends
    can_wait: bool,
}

impl NativeSynth {
    /// Create a new native TTS synthesizer
    ///
    /// Fails when the platform backend cannot be initialized or reports no voices.
    pub fn new(settings: SpeechSettings) -> Result<Self> {
        debug!("Creating native TTS backend");

        let mut tts = TtsCrate::default()
            .map_err(|e| SpeakrError::EngineUnavailable(format!("Failed to initialize TTS: {}", e)))?;

        let features = tts.supported_features();

        let voices = if features.voice {
            tts.voices()
                .map_err(|e| SpeakrError::Speech(format!("Failed to get voices: {}", e)))?
        } else {
            Vec::new()
        };
        if features.voice && voices.is_empty() {
            return Err(SpeakrError::EngineUnavailable(
                "system TTS reports no voices".to_string(),
            ));
        }

        if features.rate {
            let rate = match settings.rate {
                Some(rate) => Self::convert_rate(
                    rate,
                    tts.min_rate(),
                    tts.normal_rate(),
                    tts.max_rate(),
                ),
                None => tts.normal_rate(),
            };
            tts.set_rate(rate)
                .map_err(|e| SpeakrError::Speech(format!("Failed to set rate: {}", e)))?;
        } else if settings.rate.is_some() {
            warn!("Rate control not supported on this platform");
        }

        if features.volume {
            let fraction = settings
                .volume
                .map_or(DEFAULT_VOLUME, |v| v.min(100) as f32 / 100.0);
            let volume = Self::convert_volume(fraction, tts.min_volume(), tts.max_volume());
            tts.set_volume(volume)
                .map_err(|e| SpeakrError::Speech(format!("Failed to set volume: {}", e)))?;
        }

        let info = EngineInfo::new(
            EngineKind::System,
            voices.iter().map(|v| Voice::new(v.id(), v.name())).collect(),
        );
        debug!("Native TTS backend created with {} voices", voices.len());

        Ok(Self {
            tts,
            info,
            voices,
            current_voice: None,
            can_wait: features.is_speaking,
        })
    }

    /// Convert rate (0-100, 50 normal) to the platform's rate range
    fn convert_rate(rate: u8, min: f32, normal: f32, max: f32) -> f32 {
        let rate = rate.min(100) as f32;
        if rate <= 50.0 {
            min + (normal - min) * rate / 50.0
        } else {
            normal + (max - normal) * (rate - 50.0) / 50.0
        }
    }

    /// Convert a volume fraction (0.0-1.0) to the platform's volume range
    fn convert_volume(fraction: f32, min: f32, max: f32) -> f32 {
        min + (max - min) * fraction
    }

    fn select_voice(&mut self, id: &str) -> Result<()> {
        if self.current_voice.as_deref() == Some(id) {
            return Ok(());
        }

        match self.voices.iter().find(|v| v.id() == id) {
            Some(voice) => {
                debug!("Selecting voice: {:?}", voice);
                self.tts
                    .set_voice(voice)
                    .map_err(|e| SpeakrError::Speech(format!("Failed to set voice: {}", e)))?;
                self.current_voice = Some(id.to_string());
            }
            None => warn!(
                "Voice {} not found (have {} voices), keeping current voice",
                id,
                self.voices.len()
            ),
        }

        Ok(())
    }

    fn wait_until_done(&self) -> Result<()> {
        if !self.can_wait {
            return Ok(());
        }

        loop {
            thread::sleep(SPEAKING_POLL);
            let speaking = self
                .tts
                .is_speaking()
                .map_err(|e| SpeakrError::Speech(format!("Failed to query speech state: {}", e)))?;
            if !speaking {
                return Ok(());
            }
        }
    }
}

impl Synth for NativeSynth {
    fn info(&self) -> &EngineInfo {
        &self.info
    }

    fn speak(&mut self, text: &str, voice: Option<&str>) -> Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }

        if let Some(id) = voice {
            self.select_voice(id)?;
        }

        debug!("Speaking: {}", text);
        self.tts.speak(text, true).map_err(|e| {
            error!("Failed to speak: {}", e);
            SpeakrError::Speech(format!("Speak failed: {}", e))
        })?;

        self.wait_until_done()
    }

    fn stop(&mut self) -> Result<()> {
        debug!("Canceling speech");
        self.tts.stop().map_err(|e| {
            error!("Failed to cancel speech: {}", e);
            SpeakrError::Speech(format!("Cancel failed: {}", e))
        })?;

        Ok(())
    }
}
