//! speakr - desktop text-to-speech
//!
//! Routes text to whichever speech engine is installed (the system voice,
//! Google Translate, Festival, or eSpeak NG) and plays the result.

pub mod audio;
pub mod clipboard;
pub mod error;
pub mod platform;
pub mod speech;
pub mod state;

pub use error::{Result, SpeakrError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "speakr";
