//! Audio playback through an external MP3 player

use crate::platform::probe_command;
use crate::{Result, SpeakrError};
use log::{debug, info};
use std::path::Path;
use std::process::{Command, Stdio};

/// Players able to decode MP3, in order of preference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerKind {
    Mpg123,
    Ffplay,
    Mpv,
}

impl PlayerKind {
    pub const ALL: [PlayerKind; 3] = [PlayerKind::Mpg123, PlayerKind::Ffplay, PlayerKind::Mpv];

    pub fn program(&self) -> &'static str {
        match self {
            PlayerKind::Mpg123 => "mpg123",
            PlayerKind::Ffplay => "ffplay",
            PlayerKind::Mpv => "mpv",
        }
    }

    fn version_arg(&self) -> &'static str {
        match self {
            PlayerKind::Ffplay => "-version",
            PlayerKind::Mpg123 | PlayerKind::Mpv => "--version",
        }
    }

    /// Arguments placed before the file name
    pub fn args(&self) -> &'static [&'static str] {
        match self {
            PlayerKind::Mpg123 => &["-q"],
            PlayerKind::Ffplay => &["-autoexit", "-nodisp", "-loglevel", "error"],
            PlayerKind::Mpv => &["--no-video", "--really-quiet"],
        }
    }

    /// Build the command that plays `path`
    pub fn command(&self, path: &Path) -> Command {
        let mut cmd = Command::new(self.program());
        cmd.args(self.args()).arg(path);
        cmd
    }
}

/// Plays audio files with whichever player is installed
#[derive(Debug, Clone)]
pub struct Player {
    kind: Option<PlayerKind>,
}

impl Player {
    /// Probe for an installed player
    pub fn detect() -> Self {
        for kind in PlayerKind::ALL {
            if probe_command(&[kind.program()], kind.version_arg()).is_some() {
                info!("Using {} for audio playback", kind.program());
                return Self { kind: Some(kind) };
            }
        }

        info!("No MP3 player found (tried mpg123, ffplay, mpv)");
        Self { kind: None }
    }

    /// A player that always uses `kind`, without probing
    pub fn with_kind(kind: Option<PlayerKind>) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> Option<PlayerKind> {
        self.kind
    }

    /// Play `path`, blocking until the player exits
    pub fn play(&self, path: &Path) -> Result<()> {
        let kind = self.kind.ok_or_else(|| {
            SpeakrError::Playback(
                "No audio player found. Install mpg123, ffmpeg (ffplay), or mpv".to_string(),
            )
        })?;

        debug!("Playing {:?} with {}", path, kind.program());
        let status = kind
            .command(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| {
                SpeakrError::Playback(format!("Failed to launch {}: {}", kind.program(), e))
            })?;

        if !status.success() {
            return Err(SpeakrError::Playback(format!(
                "{} exited with failure status: {}",
                kind.program(),
                status
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_arguments() {
        let cmd = PlayerKind::Ffplay.command(Path::new("/tmp/a.mp3"));
        assert_eq!(cmd.get_program(), "ffplay");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, ["-autoexit", "-nodisp", "-loglevel", "error", "/tmp/a.mp3"]);
    }

    #[test]
    fn test_play_without_player() {
        let player = Player::with_kind(None);
        let err = player.play(Path::new("/tmp/a.mp3")).unwrap_err();
        assert!(matches!(err, SpeakrError::Playback(_)));
    }

    #[test]
    fn test_detect_player() {
        match Player::detect().kind() {
            Some(kind) => println!("✓ Found player {}", kind.program()),
            None => println!("⚠ No MP3 player installed (may be expected in CI)"),
        }
    }
}
