//! Speech engine backends

// Operating system voice via the tts crate
pub mod native;

// Online Google Translate voices, played through an external player
pub mod google;

// Festival, reading text from a temporary file
pub mod festival;

// eSpeak NG subprocess
pub mod espeak;

pub use espeak::EspeakSynth;
pub use festival::FestivalSynth;
pub use google::GoogleSynth;
pub use native::NativeSynth;
