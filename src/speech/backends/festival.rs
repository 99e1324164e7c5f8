//! Festival backend
//!
//! Festival reads the text from a temporary file via `festival --tts`.

use crate::platform::{probe_command, run_with_timeout, ENGINE_TIMEOUT};
use crate::speech::{EngineInfo, EngineKind, Synth, Voice};
use crate::{Result, SpeakrError};
use log::debug;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

pub struct FestivalSynth {
    info: EngineInfo,
    program: String,
}

impl FestivalSynth {
    pub fn new() -> Result<Self> {
        let program = probe_command(&["festival"], "--version").ok_or_else(|| {
            SpeakrError::EngineUnavailable(
                "festival not found. Install with: sudo apt install festival".to_string(),
            )
        })?;

        Ok(Self {
            info: EngineInfo::new(
                EngineKind::Festival,
                vec![Voice::new("default", "Default Festival Voice")],
            ),
            program,
        })
    }

    fn build_command(&self, text_file: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--tts").arg(text_file);
        cmd
    }
}

impl Synth for FestivalSynth {
    fn info(&self) -> &EngineInfo {
        &self.info
    }

    fn speak(&mut self, text: &str, _voice: Option<&str>) -> Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }

        let mut file = tempfile::Builder::new()
            .prefix("speakr-")
            .suffix(".txt")
            .tempfile()?;
        file.write_all(text.as_bytes())?;
        file.flush()?;
        debug!("Festival reading {} bytes from {:?}", text.len(), file.path());

        let mut cmd = self.build_command(file.path());
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let status = run_with_timeout(cmd, ENGINE_TIMEOUT)?;
        if !status.success() {
            return Err(SpeakrError::Speech(format!("festival exited with {}", status)));
        }

        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }
}
