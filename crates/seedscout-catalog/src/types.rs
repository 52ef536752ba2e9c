//! Catalog records and the wire shapes they are parsed from.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::errors::{CatalogError, Result};

/// A newly released album.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    /// Catalog album id.
    pub id: u64,
    /// Album title.
    pub title: String,
    /// Primary artist name.
    pub artist: String,
    /// Release date.
    pub release_date: NaiveDate,
}

impl Album {
    /// Whether the album was released strictly after `cutoff`.
    ///
    /// The release date counts as midnight of that day.
    pub fn released_after(&self, cutoff: NaiveDateTime) -> bool {
        self.release_date.and_time(chrono::NaiveTime::MIN) > cutoff
    }
}

// ── Wire shapes ─────────────────────────────────────────────────────────────

/// Any response body; only the `error` member is read.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

impl From<ApiError> for CatalogError {
    fn from(e: ApiError) -> Self {
        CatalogError::Api {
            code: e.code,
            message: e.message,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArtistRef {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReleaseEntry {
    pub id: u64,
    pub title: String,
    pub artist: ArtistRef,
    pub release_date: String,
}

impl ReleaseEntry {
    pub(crate) fn into_album(self) -> Result<Album> {
        let release_date = NaiveDate::parse_from_str(&self.release_date, "%Y-%m-%d")
            .map_err(|_| CatalogError::InvalidDate(self.release_date.clone()))?;
        Ok(Album {
            id: self.id,
            title: self.title,
            artist: self.artist.name,
            release_date,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AlbumDetail {
    #[serde(default)]
    pub tracks: Option<Page<TrackEntry>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrackEntry {
    pub id: u64,
    pub title: String,
    pub artist: ArtistRef,
    #[serde(default)]
    pub preview: Option<String>,
}
