use axum::extract::rejection::{BytesRejection, JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use store::StoreError;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid movie ID")]
    InvalidId,

    #[error("Movie not found")]
    MovieNotFound,

    #[error("A movie with this title already exists.")]
    DuplicateTitle,

    #[error("{0} is required")]
    Validation(&'static str),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Store error: {0}")]
    Store(StoreError),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Not found")]
    NotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,
}

/// Body of every failure response.
///
/// `status` is only present on create/update rejections, where it carries the
/// `"false"` flag that mirrors the `"true"` of a successful create.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub error: String,
}

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::InvalidId | ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::MovieNotFound | ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::DuplicateTitle => StatusCode::CONFLICT,
            ServerError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ServerError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ServerError::InvalidId => "INVALID_ID",
            ServerError::MovieNotFound => "MOVIE_NOT_FOUND",
            ServerError::DuplicateTitle => "DUPLICATE_TITLE",
            ServerError::Validation(_) => "VALIDATION_ERROR",
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::Store(_) => "STORE_ERROR",
            ServerError::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ServerError::NotFound => "NOT_FOUND",
            ServerError::MethodNotAllowed => "METHOD_NOT_ALLOWED",
        }
    }

    fn body(&self) -> ErrorResponse {
        match self {
            ServerError::DuplicateTitle | ServerError::Validation(_) => ErrorResponse {
                status: Some("false".to_string()),
                error: self.to_string(),
            },
            ServerError::BadRequest(message) => ErrorResponse {
                status: None,
                error: message.clone(),
            },
            // Causes of 500s stay in the logs.
            ServerError::Store(_) => ErrorResponse {
                status: None,
                error: "Internal Server Error".to_string(),
            },
            _ => ErrorResponse {
                status: None,
                error: self.to_string(),
            },
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        } else {
            tracing::debug!(code = self.error_code(), error = %self, "request rejected");
        }

        (status, Json(self.body())).into_response()
    }
}

impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidId(_) => ServerError::InvalidId,
            StoreError::DuplicateTitle(_) => ServerError::DuplicateTitle,
            StoreError::Validation { field } => ServerError::Validation(field),
            other => ServerError::Store(other),
        }
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ServerError::PayloadTooLarge;
        }
        ServerError::BadRequest(rejection.body_text())
    }
}

impl From<BytesRejection> for ServerError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ServerError::PayloadTooLarge;
        }
        ServerError::BadRequest(rejection.body_text())
    }
}

// Path segments are only ever movie ids, so an undecodable one is a bad id.
impl From<PathRejection> for ServerError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(_) => ServerError::InvalidId,
            other => ServerError::BadRequest(other.body_text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_one_consistent_policy() {
        let cases = [
            (StoreError::InvalidId("x".into()), StatusCode::BAD_REQUEST),
            (StoreError::DuplicateTitle("Movie".into()), StatusCode::CONFLICT),
            (
                StoreError::Validation { field: "title" },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                StoreError::Backend("connection reset".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                StoreError::Decode("bad bytes".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (store_err, expected) in cases {
            assert_eq!(ServerError::from(store_err).status_code(), expected);
        }
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let body = ServerError::from(StoreError::Backend("socket /tmp/x".into())).body();
        assert_eq!(body.error, "Internal Server Error");
        assert!(body.status.is_none());
    }

    #[test]
    fn duplicate_title_carries_status_flag() {
        let body = ServerError::DuplicateTitle.body();
        assert_eq!(body.status.as_deref(), Some("false"));
        assert_eq!(body.error, "A movie with this title already exists.");
    }

    #[test]
    fn validation_names_the_field() {
        assert_eq!(
            ServerError::Validation("image_url").to_string(),
            "image_url is required"
        );
    }
}
