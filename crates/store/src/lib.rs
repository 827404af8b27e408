//! # Movie Store DB
//!
//! Backend-agnostic persistence for movie records. Every backend implements
//! the [`MovieStore`] trait, which mirrors the handful of operations a
//! document database offers for a single collection:
//!
//! - insert one (the store assigns the identifier and enforces title uniqueness)
//! - find all, in the backend's natural order
//! - find by id
//! - find-and-delete / find-and-update by a raw identifier string
//!
//! ## Backends
//!
//! - [`InMemoryStore`]: insertion-ordered, ephemeral; the default and the one
//!   tests use for isolation.
//! - [`RedbStore`]: persistent embedded storage (feature `backend-redb`, on by
//!   default).
//! - [`MongoStore`]: MongoDB collection with a unique index on `title`
//!   (feature `backend-mongo`).
//!
//! [`BackendConfig`] selects one at runtime.
//!
//! ## Example
//!
//! ```
//! use store::{BackendConfig, MovieStore, NewMovie};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = BackendConfig::in_memory().build().await.unwrap();
//! let movie = store
//!     .insert(NewMovie::new("movie1", "2007-10-15", "movie1", "image1"))
//!     .await
//!     .unwrap();
//! assert_eq!(store.find_all().await.unwrap(), vec![movie]);
//! # }
//! ```

mod backend;
mod model;

pub use backend::{BackendConfig, InMemoryStore};
#[cfg(feature = "backend-mongo")]
pub use backend::MongoStore;
#[cfg(feature = "backend-redb")]
pub use backend::RedbStore;
pub use model::{Movie, MovieId, MovieUpdate, NewMovie, ValidatedUpdate};

use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by a store backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Invalid movie id: {0}")]
    InvalidId(String),
    #[error("A movie titled {0:?} already exists")]
    DuplicateTitle(String),
    #[error("{field} is required")]
    Validation { field: &'static str },
    #[error("Backend error: {0}")]
    Backend(String),
    #[error("Serialization encode error: {0}")]
    Encode(String),
    #[error("Serialization decode error: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_data() || e.is_syntax() || e.is_eof() {
            StoreError::Decode(e.to_string())
        } else {
            StoreError::Encode(e.to_string())
        }
    }
}

/// The document-store contract the HTTP layer is written against.
///
/// `Ok(None)` means "no such record" and is never an error. The
/// `find_and_*` operations take the identifier exactly as the caller supplied
/// it and answer [`StoreError::InvalidId`] when it is malformed.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait MovieStore: Send + Sync {
    /// Persist a new movie and return it with its assigned id.
    async fn insert(&self, movie: NewMovie) -> Result<Movie, StoreError>;

    /// Every movie, in the backend's natural order.
    async fn find_all(&self) -> Result<Vec<Movie>, StoreError>;

    async fn find_by_id(&self, id: &MovieId) -> Result<Option<Movie>, StoreError>;

    /// Remove a movie and return what was removed.
    async fn find_and_delete(&self, id: &str) -> Result<Option<Movie>, StoreError>;

    /// Apply `update` and return the post-update record.
    async fn find_and_update(
        &self,
        id: &str,
        update: MovieUpdate,
    ) -> Result<Option<Movie>, StoreError>;

    /// Drop every record.
    async fn clear(&self) -> Result<(), StoreError>;

    /// Round-trip to the backend to prove it is reachable.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
