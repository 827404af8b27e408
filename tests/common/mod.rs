//! Shared fixtures for the HTTP integration suites.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use movie_store::{build_router, InMemoryStore, Movie, MovieStore, ServerConfig, ServerState};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const FIRST_ID: &str = "665462a0dd89506b96ae14b7";
pub const SECOND_ID: &str = "665462a0dd89506b96ae14b8";

/// The two fixture records, ids included.
pub fn test_data() -> Vec<Movie> {
    serde_json::from_value(serde_json::json!([
        {
            "_id": FIRST_ID,
            "title": "movie1",
            "release_date": "2007-10-15",
            "description": "movie1",
            "image_url": "image1"
        },
        {
            "_id": SECOND_ID,
            "title": "movie2",
            "release_date": "2001-05-11",
            "description": "movie2",
            "image_url": "image2"
        }
    ]))
    .expect("fixture records")
}

/// Router over a fresh in-memory store.
pub fn empty_app() -> (Router, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let state = ServerState::with_store(ServerConfig::default(), store.clone());
    (build_router(Arc::new(state)), store)
}

/// Router over an in-memory store seeded with [`test_data`].
pub async fn seeded_app() -> (Router, Arc<InMemoryStore>) {
    let (app, store) = empty_app();
    store.seed(test_data()).await.expect("seed fixtures");
    (app, store)
}

/// Router over any store, e.g. a redb file.
pub fn app_with(store: Arc<dyn MovieStore>) -> Router {
    build_router(Arc::new(ServerState::with_store(
        ServerConfig::default(),
        store,
    )))
}

/// Send one request and decode the body as JSON (`Value::Null` when empty).
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).expect("request"))
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, json)
}

/// Send a raw (possibly malformed) JSON body.
pub async fn send_raw(app: &Router, method: &str, uri: &str, raw: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(raw.to_string()))
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
