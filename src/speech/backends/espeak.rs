//! eSpeak NG backend
//!
//! Runs `espeak-ng` once per utterance and waits for it to finish. On WSL
//! with WSLg the PulseAudio server socket is detected so that espeak-ng can
//! reach the Windows audio stack.
//!
//! Dependencies:
//! - espeak-ng (install with: sudo apt install espeak-ng)

use crate::platform::{is_wsl, probe_command, run_with_timeout, ENGINE_TIMEOUT};
use crate::speech::{EngineInfo, EngineKind, SpeechSettings, Synth, Voice};
use crate::{Result, SpeakrError};
use log::{debug, info, warn};
use std::process::{Command, Stdio};

const DEFAULT_SPEED: u16 = 160;
const DEFAULT_AMPLITUDE: u8 = 100;
const PITCH: u8 = 50;
const WORD_GAP: u8 = 10;

/// eSpeak NG speech synthesizer
pub struct EspeakSynth {
    info: EngineInfo,

    /// Words per minute
    speed: u16,

    /// Amplitude (0-200)
    amplitude: u8,

    /// Path to espeak-ng
    espeak_path: String,
}

impl EspeakSynth {
    /// Point PULSE_SERVER at the WSLg socket when it exists
    fn setup_pulseaudio() {
        const WSLG_PULSE_PATH: &str = "/mnt/wslg/PulseServer";

        if std::env::var("PULSE_SERVER").is_ok() {
            debug!("PULSE_SERVER already set via environment");
            return;
        }

        if std::path::Path::new(WSLG_PULSE_PATH).exists() {
            info!("Auto-detected WSLG PulseAudio server at {}", WSLG_PULSE_PATH);
            std::env::set_var("PULSE_SERVER", WSLG_PULSE_PATH);
        } else {
            warn!("WSLG PulseAudio server not found at {}", WSLG_PULSE_PATH);
            warn!("Set PULSE_SERVER if espeak-ng produces no sound");
        }
    }

    /// Create a new eSpeak NG synthesizer
    ///
    /// Fails if espeak-ng is not installed.
    pub fn new(settings: SpeechSettings) -> Result<Self> {
        debug!("Creating eSpeak NG backend");

        if is_wsl() {
            Self::setup_pulseaudio();
        }

        let espeak_path = probe_command(&["espeak-ng", "/usr/bin/espeak-ng"], "--version")
            .ok_or_else(|| {
                SpeakrError::EngineUnavailable(
                    "espeak-ng not found. Install with: sudo apt install espeak-ng".to_string(),
                )
            })?;
        debug!("Found espeak-ng at: {}", espeak_path);

        Ok(Self::with_path(espeak_path, settings))
    }

    fn with_path(espeak_path: String, settings: SpeechSettings) -> Self {
        Self {
            info: EngineInfo::new(EngineKind::EspeakNg, Self::voices()),
            speed: settings.rate.map_or(DEFAULT_SPEED, Self::rate_to_espeak_speed),
            amplitude: settings
                .volume
                .map_or(DEFAULT_AMPLITUDE, Self::volume_to_espeak_amplitude),
            espeak_path,
        }
    }

    fn voices() -> Vec<Voice> {
        vec![
            Voice::new("en+f3", "Female Voice 3"),
            Voice::new("en+f4", "Female Voice 4"),
            Voice::new("en+m3", "Male Voice 3"),
            Voice::new("en+m4", "Male Voice 4"),
        ]
    }

    /// Convert rate (0-100) to espeak speed (80-450 wpm)
    fn rate_to_espeak_speed(rate: u8) -> u16 {
        80 + (rate.min(100) as u16 * 370 / 100)
    }

    /// Convert volume (0-100) to espeak amplitude (0-200)
    fn volume_to_espeak_amplitude(volume: u8) -> u8 {
        ((volume.min(100) as u16 * 200) / 100) as u8
    }

    fn build_command(&self, text: &str, voice: &str) -> Command {
        let mut cmd = Command::new(&self.espeak_path);
        cmd.arg("-v").arg(voice);
        cmd.arg("-s").arg(self.speed.to_string());
        cmd.arg("-a").arg(self.amplitude.to_string());
        cmd.arg("-p").arg(PITCH.to_string());
        cmd.arg("-g").arg(WORD_GAP.to_string());
        // Keep text starting with '-' from being read as an option
        cmd.arg("--").arg(text);
        cmd
    }
}

impl Synth for EspeakSynth {
    fn info(&self) -> &EngineInfo {
        &self.info
    }

    fn speak(&mut self, text: &str, voice: Option<&str>) -> Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }

        let voice = voice.or(self.info.default_voice()).unwrap_or("en");
        debug!("Speaking with espeak-ng voice {}: {}", voice, text);

        let mut cmd = self.build_command(text, voice);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let status = run_with_timeout(cmd, ENGINE_TIMEOUT)?;
        if !status.success() {
            return Err(SpeakrError::Speech(format!(
                "espeak-ng exited with {}",
                status
            )));
        }

        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        // Each utterance runs to completion inside speak()
        debug!("Nothing to stop for espeak-ng");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_conversion() {
        assert_eq!(EspeakSynth::rate_to_espeak_speed(0), 80); // Slowest
        assert_eq!(EspeakSynth::rate_to_espeak_speed(50), 265);
        assert_eq!(EspeakSynth::rate_to_espeak_speed(100), 450); // Fastest
        assert_eq!(EspeakSynth::rate_to_espeak_speed(250), 450);
    }

    #[test]
    fn test_volume_conversion() {
        assert_eq!(EspeakSynth::volume_to_espeak_amplitude(0), 0);
        assert_eq!(EspeakSynth::volume_to_espeak_amplitude(50), 100);
        assert_eq!(EspeakSynth::volume_to_espeak_amplitude(100), 200);
    }

    #[test]
    fn test_default_command() {
        let synth = EspeakSynth::with_path("espeak-ng".to_string(), SpeechSettings::default());
        let cmd = synth.build_command("-hello", "en+f3");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(
            args,
            ["-v", "en+f3", "-s", "160", "-a", "100", "-p", "50", "-g", "10", "--", "-hello"]
        );
    }

    #[test]
    fn test_settings_override_defaults() {
        let settings = SpeechSettings {
            rate: Some(0),
            volume: Some(100),
        };
        let synth = EspeakSynth::with_path("espeak-ng".to_string(), settings);
        assert_eq!(synth.speed, 80);
        assert_eq!(synth.amplitude, 200);
    }

    #[test]
    fn test_create_espeak_synth() {
        match EspeakSynth::new(SpeechSettings::default()) {
            Ok(synth) => println!("✓ eSpeak NG available: {}", synth.info().display_name),
            Err(e) => println!("⚠ eSpeak NG not available: {}", e),
        }
    }
}
