//! Persisted local song cache
//!
//! A mirror of the catalog consulted when the remote service is
//! unreachable. The whole collection lives in one JSON document under the
//! data directory, the file-name analog of the single browser storage key
//! it replaces. The cache never owns truth: the reconciliation store does.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, warn};
use tunedex_common::error::{Error, Result};
use tunedex_common::model::{Song, SongPatch, UNASSIGNED_ID};

/// File name of the cached song collection inside the data directory
pub const CACHE_FILE_NAME: &str = "songs.json";

/// Handle to the on-disk song cache
#[derive(Debug, Clone)]
pub struct SongCache {
    path: PathBuf,
}

impl SongCache {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(CACHE_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cached collection. An absent or corrupt file yields an
    /// empty list; corruption is logged, never raised.
    pub fn read_all(&self) -> Vec<Song> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read song cache");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(songs) => songs,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring corrupt song cache");
                Vec::new()
            }
        }
    }

    pub fn find_by_id(&self, id: i64) -> Option<Song> {
        self.read_all().into_iter().find(|s| s.id == id)
    }

    /// Shallow-merge a patch into a cached record and persist the whole
    /// collection back. Unknown ids are a no-op: the cache never creates
    /// songs it did not already hold. Write failures are logged warnings.
    pub fn upsert_merge(&self, id: i64, patch: &SongPatch) {
        let mut songs = self.read_all();
        let Some(song) = songs.iter_mut().find(|s| s.id == id) else {
            debug!(id, "Song not in cache, skipping merge");
            return;
        };

        patch.apply_to(song);
        if let Err(e) = self.write_all(&songs) {
            warn!(id, path = %self.path.display(), error = %e, "Failed to persist song cache");
        }
    }

    /// Append a song, assigning a timestamp-derived id when it has none,
    /// and return the stored record.
    ///
    /// Unlike the other operations this one reports failure: offline
    /// registration fails as a whole only when this write fails too.
    pub fn append(&self, mut song: Song) -> Result<Song> {
        if song.id == UNASSIGNED_ID {
            song.id = Utc::now().timestamp_millis();
        }

        let mut songs = self.read_all();
        songs.push(song.clone());
        self.write_all(&songs)
            .map_err(|e| Error::Persistence(e.to_string()))?;

        debug!(id = song.id, path = %self.path.display(), "Appended song to cache");
        Ok(song)
    }

    fn write_all(&self, songs: &[Song]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(songs)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, raw)
    }
}
