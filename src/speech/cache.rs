//! On-disk cache of synthesized audio
//!
//! Files are named by the MD5 of `"{text}_{voice}"`, so repeating a phrase
//! with the same voice replays the stored MP3 instead of synthesizing again.

use crate::Result;
use log::{debug, info};
use md5::{Digest, Md5};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "mp3";

/// File count and total size of the cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub files: usize,
    pub bytes: u64,
}

/// MD5-keyed audio cache rooted at a directory
#[derive(Debug, Clone)]
pub struct AudioCache {
    dir: PathBuf,
}

impl AudioCache {
    /// Open the cache, creating its directory if needed
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        debug!("Audio cache at {:?}", dir);
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Cache key for a phrase spoken with a voice
    pub fn key(text: &str, voice: &str) -> String {
        let mut hasher = Md5::new();
        hasher.update(format!("{}_{}", text, voice).as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn path_for(&self, text: &str, voice: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", Self::key(text, voice), EXTENSION))
    }

    /// Path of the cached audio, if present
    pub fn get(&self, text: &str, voice: &str) -> Option<PathBuf> {
        let path = self.path_for(text, voice);
        if path.is_file() {
            debug!("Cache hit {:?}", path);
            Some(path)
        } else {
            None
        }
    }

    /// Store audio for a phrase and return its path
    ///
    /// Written to a temporary file first so a reader never sees a partial MP3.
    pub fn store(&self, text: &str, voice: &str, audio: &[u8]) -> Result<PathBuf> {
        let path = self.path_for(text, voice);
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(audio)?;
        tmp.persist(&path).map_err(|e| e.error)?;
        debug!("Cached {} bytes at {:?}", audio.len(), path);
        Ok(path)
    }

    fn entries(&self) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == EXTENSION) {
                paths.push(path);
            }
        }
        Ok(paths)
    }

    /// Remove every cached MP3, returning how many were deleted
    pub fn clear(&self) -> Result<usize> {
        let entries = self.entries()?;
        for path in &entries {
            fs::remove_file(path)?;
        }
        info!("Cleared {} cached files from {:?}", entries.len(), self.dir);
        Ok(entries.len())
    }

    pub fn stats(&self) -> Result<CacheStats> {
        let mut stats = CacheStats::default();
        for path in self.entries()? {
            stats.files += 1;
            stats.bytes += fs::metadata(&path)?.len();
        }
        Ok(stats)
    }
}
