//! HTTP client for the remote song catalog service
//!
//! Wraps the four catalog endpoints. No retries: callers decide whether a
//! failure falls back to the local cache.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};
use tunedex_common::error::{Error, Result};
use tunedex_common::model::{Song, SongDraft, SongPatch};

const USER_AGENT: &str = concat!("tunedex/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Catalog service API client
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the full catalog
    pub async fn list_songs(&self) -> Result<Vec<Song>> {
        let url = format!("{}/songs", self.base_url);
        debug!(url = %url, "Fetching song list");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Network(format!("GET /songs returned {status}")));
        }

        let songs: Vec<Song> = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        debug!(count = songs.len(), "Fetched song list");
        Ok(songs)
    }

    /// Fetch a single song by id
    pub async fn get_song(&self, id: i64) -> Result<Song> {
        let value = self.get_song_raw(id).await?;
        serde_json::from_value(value).map_err(|e| Error::Parse(e.to_string()))
    }

    /// Register a new song. The service assigns the id and returns the
    /// complete record.
    pub async fn create_song(&self, draft: &SongDraft) -> Result<Song> {
        let url = format!("{}/songs", self.base_url);
        debug!(url = %url, title = %draft.title, "Registering song");

        let response = self
            .http
            .post(&url)
            .json(draft)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Network(format!("POST /songs returned {status}")));
        }

        let song: Song = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        debug!(id = song.id, "Song registered with catalog service");
        Ok(song)
    }

    /// Update a song. The catalog PUT endpoint replaces the whole record, so
    /// a patch sent alone would erase every field it does not name: fetch
    /// the current record first and overlay the patch onto it. When that
    /// read fails the patch goes out alone as best-effort.
    pub async fn update_song(&self, id: i64, patch: &SongPatch) -> Result<Song> {
        let patch_fields = match serde_json::to_value(patch) {
            Ok(Value::Object(fields)) => fields,
            Ok(_) | Err(_) => return Err(Error::Parse("patch did not serialize to an object".into())),
        };

        let body = match self.get_song_raw(id).await {
            Ok(Value::Object(mut current)) => {
                current.extend(patch_fields);
                Value::Object(current)
            }
            Ok(other) => {
                warn!(id, "Unexpected shape for current record, sending patch alone: {other}");
                Value::Object(patch_fields)
            }
            Err(e) => {
                warn!(id, error = %e, "Could not fetch current record, sending patch alone");
                Value::Object(patch_fields)
            }
        };

        let url = format!("{}/songs/{}", self.base_url, id);
        debug!(url = %url, "Updating song");

        let response = self
            .http
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Network(format!("PUT /songs/{id} returned {status}")));
        }

        response.json().await.map_err(|e| Error::Parse(e.to_string()))
    }

    /// Fetch a song as a raw JSON object, keeping fields this client does
    /// not model so merges never strip them
    async fn get_song_raw(&self, id: i64) -> Result<Value> {
        let url = format!("{}/songs/{}", self.base_url, id);
        debug!(url = %url, "Fetching song");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::NotFound(id));
        }
        if !status.is_success() {
            return Err(Error::Network(format!("GET /songs/{id} returned {status}")));
        }

        response.json().await.map_err(|e| Error::Parse(e.to_string()))
    }
}
