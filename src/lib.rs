//! Workspace umbrella crate for the movie store.
//!
//! Re-exports the document-store layer and, with the `server` feature, the
//! HTTP service built on top of it, so callers can depend on one crate.
//!
//! ```
//! use movie_store::{BackendConfig, MovieId, NewMovie};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = BackendConfig::in_memory().build().await.unwrap();
//! let movie = store
//!     .insert(NewMovie::new("movie1", "2007-10-15", "movie1", "image1"))
//!     .await
//!     .unwrap();
//! assert!(MovieId::is_valid(&movie.id.to_hex()));
//! # }
//! ```

pub use store::{
    BackendConfig, InMemoryStore, Movie, MovieId, MovieStore, MovieUpdate, NewMovie, StoreError,
    ValidatedUpdate,
};

#[cfg(feature = "embedded")]
pub use store::RedbStore;

#[cfg(feature = "mongo")]
pub use store::MongoStore;

#[cfg(feature = "server")]
pub use server::{
    build_router, config::LogFormat, config::StoreBackend, config::StoreSettings, serve,
    start_server, ServerConfig, ServerError, ServerResult, ServerState,
};
