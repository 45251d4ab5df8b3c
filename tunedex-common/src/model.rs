//! Song catalog data model
//!
//! The `Song` record is the sole entity in the catalog. Its JSON shape is
//! shared by the remote service, the local cache file, and the in-memory
//! store; fields this client does not model are carried through a flattened
//! map so nothing is stripped on round-trip.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Maximum length of the artist and composer credits, in characters
pub const MAX_CREDIT_CHARS: usize = 30;

/// Sentinel id for a song that has not been assigned an identity yet
pub const UNASSIGNED_ID: i64 = 0;

/// Publication state of a song
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SongStatus {
    /// Visible in the public catalog
    Public,
    /// Archived; the state every new song starts in
    #[default]
    Private,
}

impl SongStatus {
    pub fn toggled(self) -> Self {
        match self {
            SongStatus::Public => SongStatus::Private,
            SongStatus::Private => SongStatus::Public,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SongStatus::Public => "Public",
            SongStatus::Private => "Private",
        }
    }
}

impl fmt::Display for SongStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog song record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    /// Unique identity. Assigned by the catalog service on creation, or
    /// derived from the current timestamp when registered offline.
    /// Immutable once assigned.
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub composer: String,
    /// Playing time as `hh:mm`, hours `00`-`99`, minutes `00`-`59`
    pub duration: String,
    /// Like counter; only ever incremented
    pub likes: u32,
    pub status: SongStatus,
    /// Fields the service knows about but this client does not.
    /// Preserved through merges so partial updates never strip them.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Song {
    pub fn new(
        id: i64,
        title: impl Into<String>,
        artist: impl Into<String>,
        composer: impl Into<String>,
        duration: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            artist: artist.into(),
            composer: composer.into(),
            duration: duration.into(),
            likes: 0,
            status: SongStatus::Private,
            extra: Map::new(),
        }
    }
}

/// Registration payload for a new song: everything but the identity,
/// which the catalog service (or the offline fallback) assigns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongDraft {
    pub title: String,
    pub artist: String,
    pub composer: String,
    pub duration: String,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub status: SongStatus,
}

impl SongDraft {
    /// New draft with zero likes, starting Private
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        composer: impl Into<String>,
        duration: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            composer: composer.into(),
            duration: duration.into(),
            likes: 0,
            status: SongStatus::Private,
        }
    }

    /// Validate all fields. Runs before any side effect of registration.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::Validation("title must not be empty".into()));
        }
        if self.artist.trim().is_empty() {
            return Err(Error::Validation("artist must not be empty".into()));
        }
        if self.composer.trim().is_empty() {
            return Err(Error::Validation("composer must not be empty".into()));
        }
        if self.artist.chars().count() > MAX_CREDIT_CHARS {
            return Err(Error::Validation(format!(
                "artist must be at most {MAX_CREDIT_CHARS} characters"
            )));
        }
        if self.composer.chars().count() > MAX_CREDIT_CHARS {
            return Err(Error::Validation(format!(
                "composer must be at most {MAX_CREDIT_CHARS} characters"
            )));
        }
        if !is_valid_duration(&self.duration) {
            return Err(Error::Validation(format!(
                "duration must be hh:mm (00:00 to 99:59), got {:?}",
                self.duration
            )));
        }
        Ok(())
    }

    pub fn into_song(self, id: i64) -> Song {
        Song {
            id,
            title: self.title,
            artist: self.artist,
            composer: self.composer,
            duration: self.duration,
            likes: self.likes,
            status: self.status,
            extra: Map::new(),
        }
    }
}

/// Check the `hh:mm` playing-time format: hours `00`-`99`, minutes `00`-`59`.
pub fn is_valid_duration(duration: &str) -> bool {
    let b = duration.as_bytes();
    b.len() == 5
        && b[0].is_ascii_digit()
        && b[1].is_ascii_digit()
        && b[2] == b':'
        && b[3].is_ascii_digit()
        && b[3] <= b'5'
        && b[4].is_ascii_digit()
}

/// Partial update to a song. Only set fields are serialized, and applying a
/// patch overwrites exactly the set fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SongPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SongStatus>,
}

impl SongPatch {
    /// Full-record patch, used when confirming an optimistic change remotely
    pub fn from_song(song: &Song) -> Self {
        Self {
            title: Some(song.title.clone()),
            artist: Some(song.artist.clone()),
            composer: Some(song.composer.clone()),
            duration: Some(song.duration.clone()),
            likes: Some(song.likes),
            status: Some(song.status),
        }
    }

    /// Overwrite the set fields on `song`, leaving the rest (including
    /// unknown extra fields) untouched
    pub fn apply_to(&self, song: &mut Song) {
        if let Some(title) = &self.title {
            song.title = title.clone();
        }
        if let Some(artist) = &self.artist {
            song.artist = artist.clone();
        }
        if let Some(composer) = &self.composer {
            song.composer = composer.clone();
        }
        if let Some(duration) = &self.duration {
            song.duration = duration.clone();
        }
        if let Some(likes) = self.likes {
            song.likes = likes;
        }
        if let Some(status) = self.status {
            song.status = status;
        }
    }
}
