//! In-process mock of the remote catalog service, driven over real HTTP.
//!
//! Mimics the json-server style backend: GET /songs, GET /songs/:id,
//! POST /songs (assigns ids), PUT /songs/:id (payload-replacing, id kept).
//! Every request is recorded so tests can assert on what actually went
//! over the wire.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

/// One observed request: method, path, and body for POST/PUT
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Clone)]
pub struct MockCatalog {
    pub songs: Arc<Mutex<Vec<Value>>>,
    pub requests: Arc<Mutex<Vec<Recorded>>>,
    next_id: Arc<Mutex<i64>>,
    fail_all: Arc<Mutex<bool>>,
    fail_get_one: Arc<Mutex<bool>>,
    list_delay: Arc<Mutex<Option<Duration>>>,
}

impl MockCatalog {
    fn new(initial: Vec<Value>) -> Self {
        Self {
            songs: Arc::new(Mutex::new(initial)),
            requests: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(Mutex::new(100)),
            fail_all: Arc::new(Mutex::new(false)),
            fail_get_one: Arc::new(Mutex::new(false)),
            list_delay: Arc::new(Mutex::new(None)),
        }
    }

    /// All recorded requests with the given method
    pub fn recorded(&self, method: &str) -> Vec<Recorded> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method)
            .cloned()
            .collect()
    }

    /// Make every endpoint return 500
    pub fn set_failing(&self, failing: bool) {
        *self.fail_all.lock().unwrap() = failing;
    }

    /// Make only GET /songs/:id return 500
    pub fn set_fail_get_one(&self, failing: bool) {
        *self.fail_get_one.lock().unwrap() = failing;
    }

    /// Delay GET /songs responses, for tests racing an in-flight fetch
    pub fn set_list_delay(&self, delay: Duration) {
        *self.list_delay.lock().unwrap() = Some(delay);
    }

    fn record(&self, method: &str, path: String, body: Option<Value>) {
        self.requests.lock().unwrap().push(Recorded {
            method: method.to_string(),
            path,
            body,
        });
    }

    fn failing(&self) -> bool {
        *self.fail_all.lock().unwrap()
    }

    fn find(&self, id: i64) -> Option<Value> {
        self.songs
            .lock()
            .unwrap()
            .iter()
            .find(|s| s["id"] == json!(id))
            .cloned()
    }

    fn allocate_id(&self) -> i64 {
        let mut next = self.next_id.lock().unwrap();
        let id = *next;
        *next += 1;
        id
    }
}

/// A full song record in the service's JSON shape
pub fn song_json(id: i64, title: &str, likes: u64, status: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "artist": "The Beatles",
        "composer": "Lennon/McCartney",
        "duration": "03:45",
        "likes": likes,
        "status": status,
    })
}

/// Bind the mock service on an ephemeral port and return its state handle
/// plus a base URL for a `CatalogClient`
pub async fn spawn_catalog(initial: Vec<Value>) -> (MockCatalog, String) {
    let catalog = MockCatalog::new(initial);
    let app = Router::new()
        .route("/songs", get(list_songs).post(create_song))
        .route("/songs/:id", get(get_song).put(put_song))
        .with_state(catalog.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock catalog");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (catalog, format!("http://{addr}"))
}

async fn list_songs(State(catalog): State<MockCatalog>) -> Response {
    let delay = *catalog.list_delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    catalog.record("GET", "/songs".to_string(), None);
    if catalog.failing() {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    Json(catalog.songs.lock().unwrap().clone()).into_response()
}

async fn get_song(State(catalog): State<MockCatalog>, Path(id): Path<i64>) -> Response {
    catalog.record("GET", format!("/songs/{id}"), None);
    if catalog.failing() || *catalog.fail_get_one.lock().unwrap() {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    match catalog.find(id) {
        Some(song) => Json(song).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn create_song(State(catalog): State<MockCatalog>, Json(mut body): Json<Value>) -> Response {
    catalog.record("POST", "/songs".to_string(), Some(body.clone()));
    if catalog.failing() {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let id = catalog.allocate_id();
    body.as_object_mut()
        .expect("song payload must be an object")
        .insert("id".into(), json!(id));
    catalog.songs.lock().unwrap().push(body.clone());
    Json(body).into_response()
}

async fn put_song(
    State(catalog): State<MockCatalog>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    catalog.record("PUT", format!("/songs/{id}"), Some(body.clone()));
    if catalog.failing() {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    // Payload-replacing, like the real backend: the body becomes the
    // record wholesale, only the id is kept.
    let mut stored = body;
    stored
        .as_object_mut()
        .expect("song payload must be an object")
        .insert("id".into(), json!(id));

    let mut songs = catalog.songs.lock().unwrap();
    match songs.iter_mut().find(|s| s["id"] == json!(id)) {
        Some(slot) => {
            *slot = stored.clone();
            Json(stored).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
