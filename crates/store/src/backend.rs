use crate::{Movie, MovieId, MovieStore, MovieUpdate, NewMovie, StoreError};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Configuration for selecting and building a backend.
///
/// # Example
/// ```
/// use store::BackendConfig;
///
/// // In-memory (for testing)
/// let config = BackendConfig::in_memory();
///
/// // Redb (embedded, persistent)
/// let config = BackendConfig::redb("/data/movies.redb");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum BackendConfig {
    /// Process-local storage that vanishes with the process.
    #[default]
    InMemory,
    /// Redb file at `path`. Requires the `backend-redb` feature.
    Redb { path: String },
    /// MongoDB collection. Requires the `backend-mongo` feature.
    Mongo {
        uri: String,
        database: String,
        collection: String,
    },
}

impl BackendConfig {
    pub fn in_memory() -> Self {
        BackendConfig::InMemory
    }

    pub fn redb<P: Into<String>>(path: P) -> Self {
        BackendConfig::Redb { path: path.into() }
    }

    pub fn mongo(
        uri: impl Into<String>,
        database: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        BackendConfig::Mongo {
            uri: uri.into(),
            database: database.into(),
            collection: collection.into(),
        }
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            BackendConfig::InMemory => "memory",
            BackendConfig::Redb { .. } => "redb",
            BackendConfig::Mongo { .. } => "mongo",
        }
    }

    /// Build the configured backend.
    ///
    /// Fails with [`StoreError::Backend`] when the backend cannot be opened or
    /// was compiled out.
    pub async fn build(&self) -> Result<Arc<dyn MovieStore>, StoreError> {
        match self {
            BackendConfig::InMemory => Ok(Arc::new(InMemoryStore::new())),
            BackendConfig::Redb { path } => {
                #[cfg(feature = "backend-redb")]
                {
                    Ok(Arc::new(RedbStore::open(path).await?))
                }
                #[cfg(not(feature = "backend-redb"))]
                {
                    let _ = path;
                    Err(StoreError::backend("redb backend disabled at compile time"))
                }
            }
            BackendConfig::Mongo {
                uri,
                database,
                collection,
            } => {
                #[cfg(feature = "backend-mongo")]
                {
                    Ok(Arc::new(
                        MongoStore::connect(uri, database, collection).await?,
                    ))
                }
                #[cfg(not(feature = "backend-mongo"))]
                {
                    let _ = (uri, database, collection);
                    Err(StoreError::backend("mongo backend disabled at compile time"))
                }
            }
        }
    }
}

/// In-memory store backed by an insertion-ordered `Vec`.
///
/// Every operation holds the lock for its whole check-then-write sequence, so
/// two racing inserts with the same title resolve to exactly one winner.
#[derive(Default)]
pub struct InMemoryStore {
    movies: RwLock<Vec<Movie>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load records verbatim, keeping their ids. Used to seed fixtures.
    pub async fn seed(&self, records: Vec<Movie>) -> Result<(), StoreError> {
        let mut guard = self.movies.write().await;
        for record in records {
            if guard.iter().any(|m| m.id == record.id) {
                return Err(StoreError::backend(format!("duplicate id {}", record.id)));
            }
            if guard.iter().any(|m| m.title == record.title) {
                return Err(StoreError::DuplicateTitle(record.title));
            }
            guard.push(record);
        }
        Ok(())
    }
}

#[async_trait]
impl MovieStore for InMemoryStore {
    async fn insert(&self, movie: NewMovie) -> Result<Movie, StoreError> {
        let movie = movie.into_movie(MovieId::new())?;
        let mut guard = self.movies.write().await;
        if guard.iter().any(|m| m.title == movie.title) {
            return Err(StoreError::DuplicateTitle(movie.title));
        }
        guard.push(movie.clone());
        Ok(movie)
    }

    async fn find_all(&self) -> Result<Vec<Movie>, StoreError> {
        Ok(self.movies.read().await.clone())
    }

    async fn find_by_id(&self, id: &MovieId) -> Result<Option<Movie>, StoreError> {
        let guard = self.movies.read().await;
        Ok(guard.iter().find(|m| m.id == *id).cloned())
    }

    async fn find_and_delete(&self, id: &str) -> Result<Option<Movie>, StoreError> {
        let id = MovieId::parse(id)?;
        let mut guard = self.movies.write().await;
        Ok(guard
            .iter()
            .position(|m| m.id == id)
            .map(|pos| guard.remove(pos)))
    }

    async fn find_and_update(
        &self,
        id: &str,
        update: MovieUpdate,
    ) -> Result<Option<Movie>, StoreError> {
        let id = MovieId::parse(id)?;
        let update = update.validate()?;
        let mut guard = self.movies.write().await;

        let Some(pos) = guard.iter().position(|m| m.id == id) else {
            return Ok(None);
        };
        if let Some(title) = &update.title {
            if guard.iter().any(|m| m.id != id && &m.title == title) {
                return Err(StoreError::DuplicateTitle(title.clone()));
            }
        }

        let movie = &mut guard[pos];
        update.apply_to(movie);
        Ok(Some(movie.clone()))
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.movies.write().await.clear();
        Ok(())
    }
}

#[cfg(feature = "backend-redb")]
pub mod redb;

#[cfg(feature = "backend-redb")]
pub use self::redb::RedbStore;

#[cfg(feature = "backend-mongo")]
pub mod mongo;

#[cfg(feature = "backend-mongo")]
pub use self::mongo::MongoStore;
