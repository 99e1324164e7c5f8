//! Platform detection and external process helpers

use crate::{Result, SpeakrError};
use log::debug;
use std::fs;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// How long a `--version` style probe may take before the tool is considered missing
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// How long a single engine invocation may run
pub const ENGINE_TIMEOUT: Duration = Duration::from_secs(30);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Detect if running in WSL (Windows Subsystem for Linux)
///
/// Checks for WSL-specific indicators in /proc/version and environment variables.
pub fn is_wsl() -> bool {
    if let Ok(contents) = fs::read_to_string("/proc/version") {
        let lower = contents.to_lowercase();
        if lower.contains("microsoft") || lower.contains("wsl") {
            return true;
        }
    }

    std::env::var("WSL_DISTRO_NAME").is_ok()
}

/// Find the first program in `candidates` that answers `version_arg` successfully
///
/// Used to discover installed engines and audio players without relying on
/// a particular package layout.
pub fn probe_command(candidates: &[&str], version_arg: &str) -> Option<String> {
    for program in candidates {
        let mut cmd = Command::new(program);
        cmd.arg(version_arg)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        match run_with_timeout(cmd, PROBE_TIMEOUT) {
            Ok(status) if status.success() => {
                debug!("Probe found {}", program);
                return Some(program.to_string());
            }
            Ok(status) => debug!("Probe of {} exited with {}", program, status),
            Err(e) => debug!("Probe of {} failed: {}", program, e),
        }
    }

    None
}

/// Spawn `cmd` and wait for it, killing the child once `timeout` elapses
pub fn run_with_timeout(mut cmd: Command, timeout: Duration) -> Result<ExitStatus> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    let mut child = cmd.spawn()?;
    let deadline = Instant::now() + timeout;

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }

        if Instant::now() >= deadline {
            debug!("Killing {} after {:?}", program, timeout);
            let _ = child.kill();
            let _ = child.wait(); // Clean up zombie
            return Err(SpeakrError::Speech(format!(
                "{} timed out after {}s",
                program,
                timeout.as_secs()
            )));
        }

        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_wsl() {
        // Result depends on the host, only verify it doesn't panic
        let _ = is_wsl();
    }

    #[test]
    fn test_probe_missing_program() {
        assert_eq!(
            probe_command(&["speakr-definitely-not-installed"], "--version"),
            None
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_run_with_timeout_success() {
        let status = run_with_timeout(Command::new("true"), Duration::from_secs(5))
            .expect("true should run");
        assert!(status.success());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_with_timeout_kills_slow_child() {
        let mut cmd = Command::new("sleep");
        cmd.arg("5");
        let result = run_with_timeout(cmd, Duration::from_millis(100));
        assert!(matches!(result, Err(SpeakrError::Speech(_))));
    }
}
