//! Loopback resource server for integration tests.
//!
//! Stores JSON resources in memory and serves them the way the client
//! expects: `GET /resources/{id}`, `GET`/`PUT` on arbitrary sub-paths,
//! and `POST /resources` answering with a `content-location` header.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use masklink_client::Connection;
use masklink_core::pointer;

type Store = Arc<Mutex<HashMap<String, Value>>>;

#[derive(Clone)]
struct AppState {
    store: Store,
    next_id: Arc<AtomicU64>,
}

pub struct Harness {
    pub base: String,
    pub conn: Connection,
    store: Store,
}

impl Harness {
    pub fn insert(&self, id: &str, value: Value) {
        self.store.lock().unwrap().insert(id.to_string(), value);
    }

    pub fn fetch(&self, id: &str) -> Option<Value> {
        self.store.lock().unwrap().get(id).cloned()
    }

    pub fn url(&self, id: &str) -> String {
        format!("{}/resources/{}", self.base, id)
    }
}

pub async fn spawn() -> Harness {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .try_init();

    let store: Store = Arc::default();
    let state = AppState {
        store: store.clone(),
        next_id: Arc::new(AtomicU64::new(1)),
    };
    let app = Router::new()
        .route("/resources", post(create_resource))
        .route("/resources/{id}", get(read_resource))
        .route("/resources/{id}/{*path}", get(read_subpath).put(write_subpath))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let base = format!("http://{}", addr);
    let conn = Connection::new(&base, "test-token").unwrap();
    Harness { base, conn, store }
}

async fn read_resource(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.store.lock().unwrap().get(&id) {
        Some(value) => Json(value.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn read_subpath(
    State(state): State<AppState>,
    Path((id, path)): Path<(String, String)>,
) -> Response {
    let store = state.store.lock().unwrap();
    let Some(doc) = store.get(&id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match pointer::resolve(doc, &format!("/{}", path)) {
        Some(value) => Json(value.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn write_subpath(
    State(state): State<AppState>,
    Path((id, path)): Path<(String, String)>,
    body: Bytes,
) -> Response {
    let Ok(value) = serde_json::from_slice::<Value>(&body) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let mut store = state.store.lock().unwrap();
    let doc = store.entry(id).or_insert_with(|| json!({}));
    set_creating(doc, &format!("/{}", path), value);
    StatusCode::OK.into_response()
}

async fn create_resource(State(state): State<AppState>, body: Bytes) -> Response {
    let Ok(value) = serde_json::from_slice::<Value>(&body) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let id = format!("r{}", state.next_id.fetch_add(1, Ordering::SeqCst));
    state.store.lock().unwrap().insert(id.clone(), value);
    (
        StatusCode::CREATED,
        [(header::CONTENT_LOCATION, format!("/resources/{}", id))],
    )
        .into_response()
}

/// Like `pointer::set_at` but creates intermediate objects, the way a
/// resource server materializes `_meta/nonce` on first write.
fn set_creating(doc: &mut Value, ptr: &str, value: Value) {
    let tokens = pointer::split(ptr);
    let Some((last, parents)) = tokens.split_last() else {
        *doc = value;
        return;
    };
    let mut current = doc;
    for token in parents {
        if !current.is_object() {
            *current = json!({});
        }
        current = current
            .as_object_mut()
            .unwrap()
            .entry(token.clone())
            .or_insert_with(|| json!({}));
    }
    if !current.is_object() {
        *current = json!({});
    }
    current.as_object_mut().unwrap().insert(last.clone(), value);
}
