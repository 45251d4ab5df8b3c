//! Reconciliation store: canonical in-memory song state
//!
//! The store owns the single source of truth for songs and decides, for
//! every read and write, which source to consult (memory, local cache,
//! remote catalog) and in what order. Mutations are optimistic: canonical
//! state changes first, the cache is shadowed, and the remote confirmation
//! runs as a background task whose failure never rolls the change back.

use std::sync::Arc;

use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use tunedex_common::error::{Error, Result};
use tunedex_common::model::{Song, SongDraft, SongPatch, SongStatus, UNASSIGNED_ID};

use crate::cache::SongCache;
use crate::query;
use crate::remote::CatalogClient;

/// Lifecycle of the most recent remote operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Idle,
    Loading,
    Succeeded,
    Failed,
}

#[derive(Debug)]
struct StoreState {
    songs: Vec<Song>,
    search_term: String,
    error: Option<String>,
}

/// Cloneable handle to the canonical state. All clones share one state;
/// nothing else in the process holds song truth.
#[derive(Clone)]
pub struct Store {
    state: Arc<RwLock<StoreState>>,
    status: Arc<watch::Sender<FetchStatus>>,
    pending: Arc<Mutex<Vec<JoinHandle<()>>>>,
    client: CatalogClient,
    cache: SongCache,
}

impl Store {
    pub fn new(client: CatalogClient, cache: SongCache) -> Self {
        let (status, _) = watch::channel(FetchStatus::Idle);
        Self {
            state: Arc::new(RwLock::new(StoreState {
                songs: Vec::new(),
                search_term: String::new(),
                error: None,
            })),
            status: Arc::new(status),
            pending: Arc::new(Mutex::new(Vec::new())),
            client,
            cache,
        }
    }

    // ========================================
    // Read surface
    // ========================================

    pub async fn songs(&self) -> Vec<Song> {
        self.state.read().await.songs.clone()
    }

    /// Canonical songs filtered by the current search term
    pub async fn filtered_songs(&self) -> Vec<Song> {
        let state = self.state.read().await;
        query::filter_songs(&state.songs, &state.search_term)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn search_term(&self) -> String {
        self.state.read().await.search_term.clone()
    }

    pub fn status(&self) -> FetchStatus {
        *self.status.borrow()
    }

    /// Message of the most recent remote failure, if any
    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    pub async fn set_search_term(&self, term: impl Into<String>) {
        self.state.write().await.search_term = term.into();
    }

    // ========================================
    // Reconciliation operations
    // ========================================

    /// Load the catalog. On success the remote list replaces canonical
    /// state wholesale, even when empty: an empty catalog is valid data,
    /// not a miss. On failure canonical state is left untouched and the
    /// local cache is replayed through `add_if_absent`.
    pub async fn fetch_all(&self) -> FetchStatus {
        self.transition(FetchStatus::Loading);

        match self.client.list_songs().await {
            Ok(songs) => {
                let count = songs.len();
                {
                    let mut state = self.state.write().await;
                    state.songs = songs;
                    state.error = None;
                }
                self.transition(FetchStatus::Succeeded);
                info!(count, "Loaded songs from catalog service");
                FetchStatus::Succeeded
            }
            Err(e) => {
                warn!(error = %e, "Catalog fetch failed, falling back to local cache");
                self.state.write().await.error = Some(e.to_string());
                self.transition(FetchStatus::Failed);

                let mut recovered = 0;
                for song in self.cache.read_all() {
                    if self.add_if_absent(song).await {
                        recovered += 1;
                    }
                }
                if recovered > 0 {
                    info!(recovered, "Recovered songs from local cache");
                }
                FetchStatus::Failed
            }
        }
    }

    /// Insert a song unless its id is already present. Idempotent, so
    /// cache replay after a failed fetch cannot duplicate records.
    pub async fn add_if_absent(&self, song: Song) -> bool {
        let mut state = self.state.write().await;
        if state.songs.iter().any(|s| s.id == song.id) {
            return false;
        }
        state.songs.push(song);
        true
    }

    /// Look up one song, trying sources in priority order: canonical state,
    /// then (after any in-flight fetch settles) the local cache, then a
    /// remote single fetch. A song absent from all three is `NotFound`;
    /// a remote lookup that itself fails is `Fetch`, a distinct outcome.
    pub async fn fetch_one(&self, id: i64) -> Result<Song> {
        // An idle, empty store has never seen data: populate it first, the
        // same way the list view would. The lookup chain below runs
        // whether or not this succeeds.
        if self.status() == FetchStatus::Idle && self.state.read().await.songs.is_empty() {
            self.fetch_all().await;
        }

        if let Some(song) = self.find(id).await {
            return Ok(song);
        }

        // A fetch in flight may be about to deliver this song; wait for it
        // to settle instead of falling through to stale sources.
        let mut rx = self.status.subscribe();
        while *rx.borrow_and_update() == FetchStatus::Loading {
            if rx.changed().await.is_err() {
                break;
            }
        }
        if let Some(song) = self.find(id).await {
            return Ok(song);
        }

        if let Some(song) = self.cache.find_by_id(id) {
            debug!(id, "Song served from local cache");
            return Ok(song);
        }

        match self.client.get_song(id).await {
            Ok(song) => Ok(song),
            Err(Error::NotFound(id)) => Err(Error::NotFound(id)),
            Err(e) => Err(Error::Fetch(e.to_string())),
        }
    }

    /// Add one like. The counter increments in canonical state before this
    /// returns; the cache is shadowed and the remote write is scheduled as
    /// a confirmation task. A failed confirmation keeps the new value.
    pub async fn like(&self, id: i64) -> Result<u32> {
        let updated = {
            let mut state = self.state.write().await;
            let song = state
                .songs
                .iter_mut()
                .find(|s| s.id == id)
                .ok_or(Error::NotFound(id))?;
            song.likes += 1;
            song.clone()
        };

        let likes = updated.likes;
        self.cache.upsert_merge(
            id,
            &SongPatch {
                likes: Some(likes),
                ..Default::default()
            },
        );
        self.spawn_confirmation(updated).await;

        Ok(likes)
    }

    /// Set a song's publication status, optimistically.
    ///
    /// Publishing (Private -> Public) requires explicit user confirmation;
    /// that gate belongs to the caller and must be satisfied before this is
    /// invoked. Archiving needs none. The asymmetry is intentional.
    pub async fn set_status(&self, id: i64, status: SongStatus) -> Result<SongStatus> {
        let updated = {
            let mut state = self.state.write().await;
            let song = state
                .songs
                .iter_mut()
                .find(|s| s.id == id)
                .ok_or(Error::NotFound(id))?;
            song.status = status;
            song.clone()
        };

        self.cache.upsert_merge(
            id,
            &SongPatch {
                status: Some(status),
                ..Default::default()
            },
        );
        self.spawn_confirmation(updated).await;

        Ok(status)
    }

    /// Register a new song. Validation fails fast with no state change.
    /// When the catalog is unreachable the song is kept anyway: the cache
    /// assigns a timestamp id and the record joins canonical state, so the
    /// operation only fails when local persistence fails too.
    pub async fn create(&self, draft: SongDraft) -> Result<Song> {
        draft.validate()?;

        self.transition(FetchStatus::Loading);
        match self.client.create_song(&draft).await {
            Ok(song) => {
                self.add_if_absent(song.clone()).await;
                self.state.write().await.error = None;
                self.transition(FetchStatus::Succeeded);
                info!(id = song.id, title = %song.title, "Registered song with catalog service");
                Ok(song)
            }
            Err(e) => {
                warn!(error = %e, "Catalog create failed, saving song locally");
                self.state.write().await.error = Some(e.to_string());
                self.transition(FetchStatus::Failed);

                let song = self.cache.append(draft.into_song(UNASSIGNED_ID))?;
                self.add_if_absent(song.clone()).await;
                info!(id = song.id, title = %song.title, "Saved song to local cache");
                Ok(song)
            }
        }
    }

    /// Wait for every scheduled remote confirmation to finish. Presentation
    /// code calls this before shutdown so fire-and-forget writes get their
    /// chance to reach the catalog.
    pub async fn settle(&self) {
        loop {
            let handles: Vec<JoinHandle<()>> = {
                let mut pending = self.pending.lock().await;
                pending.drain(..).collect()
            };
            if handles.is_empty() {
                break;
            }
            for handle in handles {
                if let Err(e) = handle.await {
                    warn!(error = %e, "Confirmation task failed to run");
                }
            }
        }
    }

    // ========================================
    // Internals
    // ========================================

    async fn find(&self, id: i64) -> Option<Song> {
        self.state
            .read()
            .await
            .songs
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    fn transition(&self, status: FetchStatus) {
        self.status.send_replace(status);
    }

    /// Schedule the remote write for an already-applied optimistic change.
    /// The status turns Loading here, synchronously, so readers observe an
    /// operation in flight before the task gets its first poll.
    async fn spawn_confirmation(&self, song: Song) {
        self.transition(FetchStatus::Loading);
        let store = self.clone();
        let handle = tokio::spawn(async move {
            store.confirm(song).await;
        });

        let mut pending = self.pending.lock().await;
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    /// Push a full record to the catalog and fold the response back in.
    /// Failure keeps the optimistic value: the cache already shadows it.
    async fn confirm(&self, song: Song) {
        let id = song.id;
        let patch = SongPatch::from_song(&song);

        match self.client.update_song(id, &patch).await {
            Ok(confirmed) => {
                {
                    let mut state = self.state.write().await;
                    if let Some(slot) = state.songs.iter_mut().find(|s| s.id == id) {
                        *slot = confirmed;
                    }
                    state.error = None;
                }
                self.transition(FetchStatus::Succeeded);
                debug!(id, "Catalog service confirmed update");
            }
            Err(e) => {
                warn!(id, error = %e, "Catalog update failed, keeping local value");
                self.state.write().await.error = Some(e.to_string());
                self.transition(FetchStatus::Failed);
            }
        }
    }
}
