//! Clipboard integration

use crate::{Result, SpeakrError};
use arboard::Clipboard;
use log::debug;

/// Get text from system clipboard
///
/// Reads once; the clipboard is never watched.
pub fn get_from_clipboard() -> Result<String> {
    debug!("Getting text from clipboard");

    let mut clipboard = Clipboard::new()
        .map_err(|e| SpeakrError::Clipboard(format!("Failed to open clipboard: {}", e)))?;

    clipboard
        .get_text()
        .map_err(|e| SpeakrError::Clipboard(format!("Failed to read clipboard: {}", e)))
}
