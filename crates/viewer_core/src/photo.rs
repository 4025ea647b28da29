//! Photo records and the session's photo sequence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A single photo as supplied by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: String,
    /// URL or path the host's image loader resolves
    pub source_locator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taken_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geolocation: Option<GeoLocation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_name: Option<String>,
}

impl Photo {
    pub fn new(id: &str, source_locator: &str) -> Self {
        Self {
            id: id.to_string(),
            source_locator: source_locator.to_string(),
            caption: None,
            taken_at: None,
            geolocation: None,
        }
    }

    pub fn with_caption(mut self, caption: &str) -> Self {
        self.caption = Some(caption.to_string());
        self
    }

    pub fn with_taken_at(mut self, taken_at: DateTime<Utc>) -> Self {
        self.taken_at = Some(taken_at);
        self
    }

    pub fn with_geolocation(mut self, latitude: f64, longitude: f64) -> Self {
        self.geolocation = Some(GeoLocation {
            latitude,
            longitude,
            place_name: None,
        });
        self
    }
}

/// Ordered photo list, immutable for the lifetime of a viewer session.
///
/// Cloning is cheap; the host and the viewer share the same records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoSequence {
    photos: Arc<[Photo]>,
}

impl PhotoSequence {
    pub fn new(photos: Vec<Photo>) -> Self {
        Self { photos: photos.into() }
    }

    /// Parse a JSON array of photos
    pub fn from_json(json: &str) -> Result<Self, crate::ViewerError> {
        let photos: Vec<Photo> = serde_json::from_str(json)?;
        Ok(Self::new(photos))
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Photo> {
        self.photos.get(index)
    }

    /// Linear lookup by photo id
    pub fn position(&self, photo_id: &str) -> Option<usize> {
        self.photos.iter().position(|p| p.id == photo_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Photo> {
        self.photos.iter()
    }
}

impl From<Vec<Photo>> for PhotoSequence {
    fn from(photos: Vec<Photo>) -> Self {
        Self::new(photos)
    }
}
