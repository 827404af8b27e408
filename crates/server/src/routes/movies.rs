//! Movie resource handlers.
//!
//! Each handler does at most one store call and turns the outcome into a
//! status code through [`ServerError`].

use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use store::{Movie, MovieId, MovieUpdate, NewMovie};

/// JSON body extractor whose rejections flow through [`ServerError`].
///
/// A request without a JSON content type or with an empty body reads as
/// `{}`, so missing fields surface as validation errors instead.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = has_json_content_type(req.headers());
        let bytes = Bytes::from_request(req, state).await?;

        if !is_json || bytes.is_empty() {
            let value = serde_json::from_value(serde_json::Value::Object(Default::default()))
                .map_err(|e| ServerError::BadRequest(e.to_string()))?;
            return Ok(ApiJson(value));
        }

        let Json(value) = Json::<T>::from_bytes(&bytes)?;
        Ok(ApiJson(value))
    }
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Path extractor whose rejections flow through [`ServerError`].
#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(ServerError))]
pub struct ApiPath<T>(pub T);

/// Body of a successful create
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: String,
}

/// Create a movie. The store assigns the id and enforces title uniqueness.
pub async fn create_movie(
    State(state): State<Arc<ServerState>>,
    ApiJson(movie): ApiJson<NewMovie>,
) -> ServerResult<impl IntoResponse> {
    let movie = state.store.insert(movie).await?;
    tracing::info!(movie_id = %movie.id, title = %movie.title, "movie created");

    Ok((
        StatusCode::CREATED,
        Json(StatusResponse {
            status: "true".to_string(),
        }),
    ))
}

/// List every movie in the store's natural order.
pub async fn list_movies(State(state): State<Arc<ServerState>>) -> ServerResult<Json<Vec<Movie>>> {
    let movies = state.store.find_all().await?;
    tracing::debug!(count = movies.len(), "listed movies");
    Ok(Json(movies))
}

/// Fetch one movie.
///
/// A malformed id is rejected here, before the store is consulted.
pub async fn get_movie(
    State(state): State<Arc<ServerState>>,
    ApiPath(id): ApiPath<String>,
) -> ServerResult<Json<Movie>> {
    if !MovieId::is_valid(&id) {
        return Err(ServerError::InvalidId);
    }
    let id = MovieId::parse(&id)?;

    state
        .store
        .find_by_id(&id)
        .await?
        .map(Json)
        .ok_or(ServerError::MovieNotFound)
}

/// Delete a movie and echo the removed record.
pub async fn delete_movie(
    State(state): State<Arc<ServerState>>,
    ApiPath(id): ApiPath<String>,
) -> ServerResult<Json<Movie>> {
    let movie = state
        .store
        .find_and_delete(&id)
        .await?
        .ok_or(ServerError::MovieNotFound)?;
    tracing::info!(movie_id = %movie.id, "movie deleted");
    Ok(Json(movie))
}

/// Apply a partial update and return the post-update record.
pub async fn update_movie(
    State(state): State<Arc<ServerState>>,
    ApiPath(id): ApiPath<String>,
    ApiJson(update): ApiJson<MovieUpdate>,
) -> ServerResult<Json<Movie>> {
    let movie = state
        .store
        .find_and_update(&id, update)
        .await?
        .ok_or(ServerError::MovieNotFound)?;
    tracing::info!(movie_id = %movie.id, "movie updated");
    Ok(Json(movie))
}
