//! Redb (Rust embedded database) backend for movie storage.
//!
//! Movies live in one table keyed by the hex id; a second table maps each
//! title to the id that owns it and is what enforces title uniqueness. Both
//! tables are touched inside a single write transaction, so the uniqueness
//! check and the write commit or fail together.
//!
//! Redb transactions are blocking, so every operation runs on
//! `tokio::task::spawn_blocking`.
//!
//! # Configuration Example
//! ```yaml
//! store:
//!   backend: "redb"
//!   redb_path: "/data/movies.redb"
//! ```

use crate::{Movie, MovieId, MovieStore, MovieUpdate, NewMovie, StoreError};
use async_trait::async_trait;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use std::path::Path;
use std::sync::Arc;

/// id hex -> JSON-encoded movie
const MOVIES: TableDefinition<&str, &[u8]> = TableDefinition::new("movies");
/// title -> id hex
const TITLES: TableDefinition<&str, &str> = TableDefinition::new("movie_titles");

/// Persistent store backed by a redb file.
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create the database at `path` and make sure both tables exist.
    ///
    /// ```no_run
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// use store::RedbStore;
    ///
    /// let store = RedbStore::open("/tmp/movies.redb").await.unwrap();
    /// # }
    /// ```
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let db = tokio::task::spawn_blocking(move || -> Result<Database, StoreError> {
            let db = Database::create(&path).map_err(StoreError::backend)?;
            let write_txn = db.begin_write().map_err(StoreError::backend)?;
            {
                // Opening a table inside a write transaction creates it.
                write_txn.open_table(MOVIES).map_err(StoreError::backend)?;
                write_txn.open_table(TITLES).map_err(StoreError::backend)?;
            }
            write_txn.commit().map_err(StoreError::backend)?;
            tracing::info!(path = %path.display(), "opened redb movie store");
            Ok(db)
        })
        .await
        .map_err(StoreError::backend)??;

        Ok(Self { db: Arc::new(db) })
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Database) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || op(&db))
            .await
            .map_err(StoreError::backend)?
    }

    /// Run `op` in a write transaction, committing only when it succeeds.
    async fn write<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(&WriteTransaction) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        self.blocking(move |db| {
            let write_txn = db.begin_write().map_err(StoreError::backend)?;
            let out = op(&write_txn)?;
            write_txn.commit().map_err(StoreError::backend)?;
            Ok(out)
        })
        .await
    }
}

fn decode(bytes: &[u8]) -> Result<Movie, StoreError> {
    Ok(serde_json::from_slice(bytes)?)
}

fn load(txn: &WriteTransaction, key: &str) -> Result<Option<Movie>, StoreError> {
    let table = txn.open_table(MOVIES).map_err(StoreError::backend)?;
    let bytes = table
        .get(key)
        .map_err(StoreError::backend)?
        .map(|guard| guard.value().to_vec());
    bytes.as_deref().map(decode).transpose()
}

fn title_owner(txn: &WriteTransaction, title: &str) -> Result<Option<String>, StoreError> {
    let titles = txn.open_table(TITLES).map_err(StoreError::backend)?;
    let owner = titles
        .get(title)
        .map_err(StoreError::backend)?
        .map(|guard| guard.value().to_string());
    Ok(owner)
}

fn persist(txn: &WriteTransaction, movie: &Movie) -> Result<(), StoreError> {
    let key = movie.id.to_hex();
    let bytes = serde_json::to_vec(movie)?;
    let mut movies = txn.open_table(MOVIES).map_err(StoreError::backend)?;
    movies
        .insert(key.as_str(), bytes.as_slice())
        .map_err(StoreError::backend)?;
    let mut titles = txn.open_table(TITLES).map_err(StoreError::backend)?;
    titles
        .insert(movie.title.as_str(), key.as_str())
        .map_err(StoreError::backend)?;
    Ok(())
}

#[async_trait]
impl MovieStore for RedbStore {
    async fn insert(&self, movie: NewMovie) -> Result<Movie, StoreError> {
        let movie = movie.into_movie(MovieId::new())?;
        self.write(move |txn| {
            if title_owner(txn, &movie.title)?.is_some() {
                return Err(StoreError::DuplicateTitle(movie.title));
            }
            persist(txn, &movie)?;
            Ok(movie)
        })
        .await
    }

    async fn find_all(&self) -> Result<Vec<Movie>, StoreError> {
        self.blocking(|db| {
            let read_txn = db.begin_read().map_err(StoreError::backend)?;
            let table = read_txn.open_table(MOVIES).map_err(StoreError::backend)?;
            let mut movies = Vec::new();
            for item in table.iter().map_err(StoreError::backend)? {
                let (_, value) = item.map_err(StoreError::backend)?;
                movies.push(decode(value.value())?);
            }
            Ok(movies)
        })
        .await
    }

    async fn find_by_id(&self, id: &MovieId) -> Result<Option<Movie>, StoreError> {
        let key = id.to_hex();
        self.blocking(move |db| {
            let read_txn = db.begin_read().map_err(StoreError::backend)?;
            let table = read_txn.open_table(MOVIES).map_err(StoreError::backend)?;
            let bytes = table
                .get(key.as_str())
                .map_err(StoreError::backend)?
                .map(|guard| guard.value().to_vec());
            bytes.as_deref().map(decode).transpose()
        })
        .await
    }

    async fn find_and_delete(&self, id: &str) -> Result<Option<Movie>, StoreError> {
        let key = MovieId::parse(id)?.to_hex();
        self.write(move |txn| {
            let Some(movie) = load(txn, &key)? else {
                return Ok(None);
            };
            txn.open_table(MOVIES)
                .map_err(StoreError::backend)?
                .remove(key.as_str())
                .map_err(StoreError::backend)?;
            txn.open_table(TITLES)
                .map_err(StoreError::backend)?
                .remove(movie.title.as_str())
                .map_err(StoreError::backend)?;
            Ok(Some(movie))
        })
        .await
    }

    async fn find_and_update(
        &self,
        id: &str,
        update: MovieUpdate,
    ) -> Result<Option<Movie>, StoreError> {
        let key = MovieId::parse(id)?.to_hex();
        let update = update.validate()?;
        self.write(move |txn| {
            let Some(mut movie) = load(txn, &key)? else {
                return Ok(None);
            };
            let old_title = movie.title.clone();
            update.apply_to(&mut movie);

            if movie.title != old_title {
                if title_owner(txn, &movie.title)?.is_some_and(|owner| owner != key) {
                    return Err(StoreError::DuplicateTitle(movie.title));
                }
                txn.open_table(TITLES)
                    .map_err(StoreError::backend)?
                    .remove(old_title.as_str())
                    .map_err(StoreError::backend)?;
            }
            persist(txn, &movie)?;
            Ok(Some(movie))
        })
        .await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.write(|txn| {
            txn.delete_table(MOVIES).map_err(StoreError::backend)?;
            txn.delete_table(TITLES).map_err(StoreError::backend)?;
            txn.open_table(MOVIES).map_err(StoreError::backend)?;
            txn.open_table(TITLES).map_err(StoreError::backend)?;
            Ok(())
        })
        .await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.blocking(|db| {
            db.begin_read().map_err(StoreError::backend)?;
            Ok(())
        })
        .await
    }
}
