//! Movie records and the payloads used to create and update them.

use crate::StoreError;
use bson::oid::ObjectId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Store-assigned identifier of a movie.
///
/// Wraps a 12-byte ObjectId and always travels as its 24-character
/// lowercase hex form, both in JSON bodies and as a storage key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MovieId(ObjectId);

impl MovieId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    /// Parse a 24-character hex identifier.
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        if !Self::is_valid(raw) {
            return Err(StoreError::InvalidId(raw.to_string()));
        }
        ObjectId::parse_str(raw)
            .map(Self)
            .map_err(|_| StoreError::InvalidId(raw.to_string()))
    }

    /// Syntactic check only: says nothing about whether a record exists.
    pub fn is_valid(raw: &str) -> bool {
        raw.len() == 24 && raw.bytes().all(|b| b.is_ascii_hexdigit())
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }

    pub fn object_id(&self) -> ObjectId {
        self.0
    }
}

impl Default for MovieId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ObjectId> for MovieId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl FromStr for MovieId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

impl Serialize for MovieId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_hex())
    }
}

impl<'de> Deserialize<'de> for MovieId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        MovieId::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// A persisted movie.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    #[serde(rename = "_id")]
    pub id: MovieId,
    pub title: String,
    pub release_date: String,
    pub description: String,
    pub image_url: String,
}

/// Create payload. Fields stay optional so the store, not the caller, decides
/// which required field is missing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMovie {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl NewMovie {
    pub fn new(
        title: impl Into<String>,
        release_date: impl Into<String>,
        description: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            release_date: Some(release_date.into()),
            description: Some(description.into()),
            image_url: Some(image_url.into()),
        }
    }

    /// Check the required fields and build the record under `id`.
    pub fn into_movie(self, id: MovieId) -> Result<Movie, StoreError> {
        Ok(Movie {
            id,
            title: required("title", self.title)?,
            release_date: required("release_date", self.release_date)?,
            description: required("description", self.description)?,
            image_url: required("image_url", self.image_url)?,
        })
    }
}

/// Partial update.
///
/// Each field distinguishes "absent" (`None`, left untouched) from an explicit
/// `null` (`Some(None)`, which a required field rejects).
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct MovieUpdate {
    #[serde(default, deserialize_with = "nullable")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub release_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub image_url: Option<Option<String>>,
}

impl MovieUpdate {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(Some(title.into()));
        self
    }

    pub fn release_date(mut self, release_date: impl Into<String>) -> Self {
        self.release_date = Some(Some(release_date.into()));
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    pub fn image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(Some(image_url.into()));
        self
    }

    /// Validate the supplied fields and flatten them into concrete values.
    pub fn validate(self) -> Result<ValidatedUpdate, StoreError> {
        Ok(ValidatedUpdate {
            title: self.title.map(|v| required("title", v)).transpose()?,
            release_date: self
                .release_date
                .map(|v| required("release_date", v))
                .transpose()?,
            description: self
                .description
                .map(|v| required("description", v))
                .transpose()?,
            image_url: self
                .image_url
                .map(|v| required("image_url", v))
                .transpose()?,
        })
    }
}

/// An update whose supplied fields already passed the required-field rule.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidatedUpdate {
    pub title: Option<String>,
    pub release_date: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl ValidatedUpdate {
    pub fn apply_to(&self, movie: &mut Movie) {
        if let Some(title) = &self.title {
            movie.title.clone_from(title);
        }
        if let Some(release_date) = &self.release_date {
            movie.release_date.clone_from(release_date);
        }
        if let Some(description) = &self.description {
            movie.description.clone_from(description);
        }
        if let Some(image_url) = &self.image_url {
            movie.image_url.clone_from(image_url);
        }
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String, StoreError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(StoreError::Validation { field }),
    }
}

fn nullable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn movie_id_validity() {
        assert!(MovieId::is_valid("665462a0dd89506b96ae14b8"));
        assert!(MovieId::is_valid("665462A0DD89506B96AE14B8"));
        assert!(!MovieId::is_valid("665462a0dd89506b96ae14b"));
        assert!(!MovieId::is_valid("665462a0dd89506b96ae14bz"));
        assert!(!MovieId::is_valid("not-an-id"));
        assert!(!MovieId::is_valid(""));
    }

    #[test]
    fn movie_serializes_with_hex_id() {
        let id = MovieId::parse("665462a0dd89506b96ae14b7").unwrap();
        let movie = NewMovie::new("movie1", "2007-10-15", "movie1", "image1")
            .into_movie(id)
            .unwrap();

        assert_eq!(
            serde_json::to_value(&movie).unwrap(),
            json!({
                "_id": "665462a0dd89506b96ae14b7",
                "title": "movie1",
                "release_date": "2007-10-15",
                "description": "movie1",
                "image_url": "image1",
            })
        );
    }

    #[test]
    fn new_movie_reports_first_missing_field() {
        let draft = NewMovie {
            title: Some("t".into()),
            release_date: None,
            description: None,
            image_url: Some("i".into()),
        };
        let err = draft.into_movie(MovieId::new()).unwrap_err();
        assert!(matches!(err, StoreError::Validation { field: "release_date" }));
    }

    #[test]
    fn empty_string_counts_as_missing() {
        let draft = NewMovie::new("", "2020-02-02", "d", "i");
        let err = draft.into_movie(MovieId::new()).unwrap_err();
        assert!(matches!(err, StoreError::Validation { field: "title" }));
    }

    #[test]
    fn update_distinguishes_null_from_absent() {
        let update: MovieUpdate =
            serde_json::from_value(json!({ "title": null, "_id": "ignored" })).unwrap();
        assert_eq!(update.title, Some(None));
        assert_eq!(update.description, None);
        assert!(matches!(
            update.validate(),
            Err(StoreError::Validation { field: "title" })
        ));
    }

    #[test]
    fn validated_update_only_touches_supplied_fields() {
        let mut movie = NewMovie::new("a", "2001-01-01", "b", "c")
            .into_movie(MovieId::new())
            .unwrap();
        let original_id = movie.id;

        MovieUpdate::default()
            .title("Updated Movie")
            .validate()
            .unwrap()
            .apply_to(&mut movie);

        assert_eq!(movie.id, original_id);
        assert_eq!(movie.title, "Updated Movie");
        assert_eq!(movie.release_date, "2001-01-01");
        assert_eq!(movie.description, "b");
    }
}
