//! Speech synthesis system

pub mod backends;
pub mod cache;
pub mod registry;
pub mod synth;
pub mod text;

pub use cache::{AudioCache, CacheStats};
pub use registry::EngineRegistry;
pub use synth::{EngineInfo, EngineKind, Quality, SpeechSettings, Synth, Voice};
