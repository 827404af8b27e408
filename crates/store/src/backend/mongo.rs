//! MongoDB backend.
//!
//! Movies are stored as documents in a single collection with a unique index
//! on `title`, so uniqueness is decided by the server: a losing insert or
//! update comes back as duplicate-key error 11000.

use crate::{Movie, MovieId, MovieStore, MovieUpdate, NewMovie, StoreError, ValidatedUpdate};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Document};
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use mongodb::options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};

const DUPLICATE_KEY: i32 = 11000;

/// BSON shape of a movie: `_id` is a native ObjectId, no version key.
#[derive(Debug, Serialize, Deserialize)]
struct MovieDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: String,
    release_date: String,
    description: String,
    image_url: String,
}

impl From<Movie> for MovieDocument {
    fn from(movie: Movie) -> Self {
        Self {
            id: movie.id.object_id(),
            title: movie.title,
            release_date: movie.release_date,
            description: movie.description,
            image_url: movie.image_url,
        }
    }
}

impl From<MovieDocument> for Movie {
    fn from(doc: MovieDocument) -> Self {
        Self {
            id: MovieId::from(doc.id),
            title: doc.title,
            release_date: doc.release_date,
            description: doc.description,
            image_url: doc.image_url,
        }
    }
}

/// Store backed by a MongoDB collection.
pub struct MongoStore {
    database: Database,
    movies: Collection<MovieDocument>,
}

impl MongoStore {
    /// Connect, select `database.collection` and ensure the unique title index.
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(StoreError::backend)?;
        let database = client.database(database);
        let movies = database.collection::<MovieDocument>(collection);

        let unique_title = IndexModel::builder()
            .keys(doc! { "title": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        movies
            .create_index(unique_title, None)
            .await
            .map_err(StoreError::backend)?;

        tracing::info!(
            database = %database.name(),
            collection = %movies.name(),
            "connected to mongo movie store"
        );
        Ok(Self { database, movies })
    }
}

fn is_duplicate_key(err: &MongoError) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}

/// `$set` body holding only the supplied fields.
fn set_document(update: &ValidatedUpdate) -> Document {
    let mut set = Document::new();
    let fields = [
        ("title", &update.title),
        ("release_date", &update.release_date),
        ("description", &update.description),
        ("image_url", &update.image_url),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            set.insert(key, value.as_str());
        }
    }
    set
}

fn id_filter(id: &MovieId) -> Document {
    doc! { "_id": id.object_id() }
}

#[async_trait]
impl MovieStore for MongoStore {
    async fn insert(&self, movie: NewMovie) -> Result<Movie, StoreError> {
        let movie = movie.into_movie(MovieId::new())?;
        match self
            .movies
            .insert_one(MovieDocument::from(movie.clone()), None)
            .await
        {
            Ok(_) => Ok(movie),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::DuplicateTitle(movie.title)),
            Err(e) => Err(StoreError::backend(e)),
        }
    }

    async fn find_all(&self) -> Result<Vec<Movie>, StoreError> {
        let cursor = self
            .movies
            .find(None, None)
            .await
            .map_err(StoreError::backend)?;
        let docs: Vec<MovieDocument> = cursor.try_collect().await.map_err(StoreError::backend)?;
        Ok(docs.into_iter().map(Movie::from).collect())
    }

    async fn find_by_id(&self, id: &MovieId) -> Result<Option<Movie>, StoreError> {
        let found = self
            .movies
            .find_one(id_filter(id), None)
            .await
            .map_err(StoreError::backend)?;
        Ok(found.map(Movie::from))
    }

    async fn find_and_delete(&self, id: &str) -> Result<Option<Movie>, StoreError> {
        let id = MovieId::parse(id)?;
        let removed = self
            .movies
            .find_one_and_delete(id_filter(&id), None)
            .await
            .map_err(StoreError::backend)?;
        Ok(removed.map(Movie::from))
    }

    async fn find_and_update(
        &self,
        id: &str,
        update: MovieUpdate,
    ) -> Result<Option<Movie>, StoreError> {
        let id = MovieId::parse(id)?;
        let update = update.validate()?;

        let set = set_document(&update);

        // An empty `$set` is rejected by the server; an empty update is a read.
        if set.is_empty() {
            return self.find_by_id(&id).await;
        }

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        match self
            .movies
            .find_one_and_update(id_filter(&id), doc! { "$set": set }, options)
            .await
        {
            Ok(updated) => Ok(updated.map(Movie::from)),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::DuplicateTitle(
                update.title.unwrap_or_default(),
            )),
            Err(e) => Err(StoreError::backend(e)),
        }
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.movies
            .delete_many(doc! {}, None)
            .await
            .map_err(StoreError::backend)?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.database
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(StoreError::backend)?;
        Ok(())
    }
}
