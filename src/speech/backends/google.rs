//! Google Translate text-to-speech backend
//!
//! Text is split into short chunks, each chunk is fetched as MP3 from the
//! `translate_tts` endpoint, and the chunks are concatenated into one file.
//! Results are kept in the [`AudioCache`] when caching is enabled.

use crate::audio::Player;
use crate::speech::text::split_chunks;
use crate::speech::{AudioCache, EngineInfo, EngineKind, Synth, Voice};
use crate::{Result, SpeakrError};
use log::{debug, info, warn};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use ureq::Agent;

/// Longest text accepted by the endpoint in one request
pub const MAX_CHUNK_CHARS: usize = 100;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Where synthesized audio lives until it has been played
enum AudioFile {
    Cached(PathBuf),
    Temporary(NamedTempFile),
}

impl AudioFile {
    fn path(&self) -> &Path {
        match self {
            AudioFile::Cached(path) => path,
            AudioFile::Temporary(file) => file.path(),
        }
    }
}

pub struct GoogleSynth {
    info: EngineInfo,
    agent: Agent,
    player: Player,
    cache: Option<AudioCache>,
    cache_enabled: bool,
    base_url: Option<String>,
}

impl GoogleSynth {
    /// Create the backend; `cache` is used only while caching is enabled
    pub fn new(player: Player, cache: Option<AudioCache>, cache_enabled: bool) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build();

        Self {
            info: EngineInfo::new(EngineKind::Google, Self::voices()),
            agent: Agent::new_with_config(config),
            player,
            cache,
            cache_enabled,
            base_url: None,
        }
    }

    /// Send requests to `base_url` instead of the regional Google domain
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    fn voices() -> Vec<Voice> {
        vec![
            Voice::new("en", "English (US)"),
            Voice::new("en-uk", "English (UK)"),
            Voice::new("en-au", "English (Australia)"),
            Voice::new("en-ca", "English (Canada)"),
        ]
    }

    /// Map a voice id to the language code and the regional Google domain
    ///
    /// Accents are selected by domain, not by language code.
    pub fn accent(voice: &str) -> (&str, &'static str) {
        match voice {
            "en" | "en-us" => ("en", "com"),
            "en-uk" | "en-gb" => ("en", "co.uk"),
            "en-au" => ("en", "com.au"),
            "en-ca" => ("en", "ca"),
            other => (other, "com"),
        }
    }

    fn endpoint(&self, tld: &str) -> String {
        match &self.base_url {
            Some(base) => format!("{}/translate_tts", base),
            None => format!("https://translate.google.{}/translate_tts", tld),
        }
    }

    fn fetch_chunk(
        &self,
        chunk: &str,
        idx: usize,
        total: usize,
        lang: &str,
        tld: &str,
    ) -> Result<Vec<u8>> {
        debug!("Fetching chunk {}/{} ({} chars)", idx + 1, total, chunk.chars().count());

        let mut response = self
            .agent
            .get(self.endpoint(tld))
            .query("ie", "UTF-8")
            .query("client", "tw-ob")
            .query("tl", lang)
            .query("q", chunk)
            .query("total", total.to_string())
            .query("idx", idx.to_string())
            .query("textlen", chunk.chars().count().to_string())
            .header("User-Agent", USER_AGENT)
            .header("Referer", format!("https://translate.google.{}/", tld))
            .call()?;

        let audio = response.body_mut().read_to_vec()?;
        if audio.is_empty() {
            return Err(SpeakrError::Network(format!(
                "empty audio for chunk {} of {}",
                idx + 1,
                total
            )));
        }

        Ok(audio)
    }

    /// Synthesize `text` to MP3 bytes
    pub fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>> {
        // Chunks without letters or digits have nothing to pronounce
        let chunks: Vec<String> = split_chunks(text, MAX_CHUNK_CHARS)
            .into_iter()
            .filter(|c| c.chars().any(char::is_alphanumeric))
            .collect();
        if chunks.is_empty() {
            return Err(SpeakrError::Speech("No text to synthesize".to_string()));
        }

        let (lang, tld) = Self::accent(voice);
        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            audio.extend(self.fetch_chunk(chunk, idx, chunks.len(), lang, tld)?);
        }

        info!(
            "Synthesized {} chunks ({} bytes) with Google TTS",
            chunks.len(),
            audio.len()
        );
        Ok(audio)
    }

    fn active_cache(&self) -> Option<&AudioCache> {
        self.cache.as_ref().filter(|_| self.cache_enabled)
    }

    fn audio_for(&self, text: &str, voice: &str) -> Result<AudioFile> {
        if let Some(cache) = self.active_cache() {
            if let Some(path) = cache.get(text, voice) {
                return Ok(AudioFile::Cached(path));
            }

            let audio = self.synthesize(text, voice)?;
            match cache.store(text, voice, &audio) {
                Ok(path) => return Ok(AudioFile::Cached(path)),
                Err(e) => warn!("Failed to cache audio: {}", e),
            }
            return Self::temporary(&audio);
        }

        let audio = self.synthesize(text, voice)?;
        Self::temporary(&audio)
    }

    fn temporary(audio: &[u8]) -> Result<AudioFile> {
        let mut file = tempfile::Builder::new()
            .prefix("speakr-")
            .suffix(".mp3")
            .tempfile()?;
        file.write_all(audio)?;
        file.flush()?;
        Ok(AudioFile::Temporary(file))
    }

    fn voice_or_default<'a>(&'a self, voice: Option<&'a str>) -> &'a str {
        voice.or(self.info.default_voice()).unwrap_or("en")
    }
}

impl Synth for GoogleSynth {
    fn info(&self) -> &EngineInfo {
        &self.info
    }

    fn speak(&mut self, text: &str, voice: Option<&str>) -> Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }

        let voice = self.voice_or_default(voice);
        let audio = self.audio_for(text, voice)?;
        // Temporary audio is deleted when `audio` drops
        self.player.play(audio.path())
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn synthesize_to(&mut self, text: &str, voice: Option<&str>, path: &Path) -> Result<()> {
        let voice = self.voice_or_default(voice);
        let audio = match self.active_cache().and_then(|c| c.get(text, voice)) {
            Some(cached) => fs::read(cached)?,
            None => self.synthesize(text, voice)?,
        };

        fs::write(path, audio)?;
        info!("Audio saved: {:?}", path);
        Ok(())
    }

    fn set_cache_enabled(&mut self, enabled: bool) {
        self.cache_enabled = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::CacheStats;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_accents() {
        assert_eq!(GoogleSynth::accent("en"), ("en", "com"));
        assert_eq!(GoogleSynth::accent("en-uk"), ("en", "co.uk"));
        assert_eq!(GoogleSynth::accent("en-au"), ("en", "com.au"));
        assert_eq!(GoogleSynth::accent("en-ca"), ("en", "ca"));
        assert_eq!(GoogleSynth::accent("fr"), ("fr", "com"));
    }

    #[test]
    fn test_endpoint() {
        let synth = GoogleSynth::new(Player::with_kind(None), None, false);
        assert_eq!(
            synth.endpoint("co.uk"),
            "https://translate.google.co.uk/translate_tts"
        );

        let local = synth.with_base_url("http://127.0.0.1:9/");
        assert_eq!(local.endpoint("co.uk"), "http://127.0.0.1:9/translate_tts");
    }

    #[test]
    fn test_punctuation_only_text_is_rejected() {
        // Unroutable base URL: any request would fail with a network error
        let synth = GoogleSynth::new(Player::with_kind(None), None, false)
            .with_base_url("http://127.0.0.1:9");
        let err = synth.synthesize("... !?", "en").unwrap_err();
        assert!(matches!(err, SpeakrError::Speech(_)));
    }

    #[test]
    fn test_cached_audio_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AudioCache::open(dir.path()).unwrap();
        cache.store("hello", "en", b"cached-mp3").unwrap();

        let synth = GoogleSynth::new(Player::with_kind(None), Some(cache), true);
        let audio = synth.audio_for("hello", "en").unwrap();
        assert!(matches!(audio, AudioFile::Cached(_)));
        assert_eq!(fs::read(audio.path()).unwrap(), b"cached-mp3");
    }

    #[test]
    fn test_save_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AudioCache::open(&dir.path().join("cache")).unwrap();
        cache.store("hello", "en-au", b"aussie").unwrap();

        let mut synth = GoogleSynth::new(Player::with_kind(None), Some(cache), true);
        let out = dir.path().join("out.mp3");
        synth.synthesize_to("hello", Some("en-au"), &out).unwrap();
        assert_eq!(fs::read(out).unwrap(), b"aussie");
    }

    #[test]
    fn test_blank_text_is_noop() {
        let mut synth = GoogleSynth::new(Player::with_kind(None), None, false);
        assert!(synth.speak("   ", None).is_ok());
    }

    const FIRST: &str = "The quick brown fox jumps over the lazy dog near the riverbank.";
    const SECOND: &str = "A second sentence follows so the text needs two separate requests.";

    fn two_chunk_text() -> String {
        format!("{} {}", FIRST, SECOND)
    }

    async fn mock_endpoint() -> MockServer {
        let server = MockServer::start().await;

        for (idx, chunk, body) in [(0, FIRST, "mp3-one|"), (1, SECOND, "mp3-two")] {
            Mock::given(method("GET"))
                .and(path("/translate_tts"))
                .and(query_param("ie", "UTF-8"))
                .and(query_param("client", "tw-ob"))
                .and(query_param("tl", "en"))
                .and(query_param("q", chunk))
                .and(query_param("total", "2"))
                .and(query_param("idx", idx.to_string()))
                .and(query_param("textlen", chunk.chars().count().to_string()))
                .respond_with(ResponseTemplate::new(200).set_body_bytes(body.as_bytes()))
                .expect(1)
                .mount(&server)
                .await;
        }

        server
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_chunks_are_fetched_and_concatenated() {
        let server = mock_endpoint().await;
        let synth = GoogleSynth::new(Player::with_kind(None), None, false)
            .with_base_url(server.uri());

        let audio = tokio::task::spawn_blocking(move || synth.synthesize(&two_chunk_text(), "en-uk"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(audio, b"mp3-one|mp3-two");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_cache_miss_stores_audio() {
        let server = mock_endpoint().await;
        let dir = tempfile::tempdir().unwrap();
        let cache = AudioCache::open(dir.path()).unwrap();
        let expected = cache.path_for(&two_chunk_text(), "en");
        let synth = GoogleSynth::new(Player::with_kind(None), Some(cache), true)
            .with_base_url(server.uri());

        let audio = tokio::task::spawn_blocking(move || {
            let audio = synth.audio_for(&two_chunk_text(), "en").unwrap();
            match audio {
                AudioFile::Cached(path) => path,
                AudioFile::Temporary(_) => panic!("audio was not cached"),
            }
        })
        .await
        .unwrap();

        assert_eq!(audio, expected);
        assert_eq!(
            audio.file_name().unwrap().to_str().unwrap(),
            format!("{}.mp3", AudioCache::key(&two_chunk_text(), "en"))
        );
        assert_eq!(fs::read(&audio).unwrap(), b"mp3-one|mp3-two");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_uncached_audio_is_removed_after_use() {
        let server = mock_endpoint().await;
        let dir = tempfile::tempdir().unwrap();
        let cache = AudioCache::open(dir.path()).unwrap();
        let synth = GoogleSynth::new(Player::with_kind(None), Some(cache.clone()), false)
            .with_base_url(server.uri());

        let played = tokio::task::spawn_blocking(move || {
            let audio = synth.audio_for(&two_chunk_text(), "en").unwrap();
            assert!(matches!(audio, AudioFile::Temporary(_)));
            let path = audio.path().to_path_buf();
            assert_eq!(fs::read(&path).unwrap(), b"mp3-one|mp3-two");
            path
        })
        .await
        .unwrap();

        assert!(!played.exists());
        assert_eq!(cache.stats().unwrap(), CacheStats::default());
    }
}
