//! Per-photo loading / error / retry tracking

use crate::ViewerError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Logical load status of one photo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadState {
    #[default]
    Loading,
    Loaded,
    Failed { retry_count: u32 },
}

/// Identity of one load attempt.
///
/// The host tags its image element with this key and echoes it back with the
/// load outcome. Outcomes carrying an outdated key are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoadKey {
    pub photo_id: String,
    pub retry_count: u32,
}

#[derive(Debug, Clone, Copy, Default)]
struct LoadEntry {
    state: LoadState,
    retry_count: u32,
}

/// Load state for every photo seen this session
#[derive(Debug, Clone, Default)]
pub struct ImageLoadState {
    entries: HashMap<String, LoadEntry>,
}

impl ImageLoadState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start over for a photo that just became current
    pub fn reset(&mut self, photo_id: &str) {
        self.entries.insert(photo_id.to_string(), LoadEntry::default());
    }

    pub fn state(&self, photo_id: &str) -> LoadState {
        self.entries.get(photo_id).map(|e| e.state).unwrap_or_default()
    }

    /// Key of the attempt currently in flight (or last finished) for a photo
    pub fn key(&self, photo_id: &str) -> LoadKey {
        LoadKey {
            photo_id: photo_id.to_string(),
            retry_count: self.entries.get(photo_id).map_or(0, |e| e.retry_count),
        }
    }

    /// Record a successful load. Returns false if the signal was ignored.
    pub fn mark_loaded(&mut self, key: &LoadKey) -> bool {
        self.transition(key, LoadState::Loaded)
    }

    /// Record a failed load. Returns false if the signal was ignored.
    pub fn mark_failed(&mut self, key: &LoadKey) -> bool {
        let failed = LoadState::Failed {
            retry_count: key.retry_count,
        };
        self.transition(key, failed)
    }

    /// User-requested retry of a failed photo; returns the key of the new attempt
    pub fn retry(&mut self, photo_id: &str) -> Option<LoadKey> {
        let entry = self.entries.get_mut(photo_id)?;
        let LoadState::Failed { retry_count } = entry.state else {
            tracing::debug!("Retry ignored for {}: {:?}", photo_id, entry.state);
            return None;
        };

        entry.retry_count = retry_count + 1;
        entry.state = LoadState::Loading;
        tracing::info!("Retrying {} (attempt {})", photo_id, entry.retry_count);

        Some(LoadKey {
            photo_id: photo_id.to_string(),
            retry_count: entry.retry_count,
        })
    }

    /// Error describing a failed photo, for the host's inline error affordance
    pub fn error(&self, photo_id: &str) -> Option<ViewerError> {
        match self.state(photo_id) {
            LoadState::Failed { retry_count } => Some(ViewerError::ImageLoad {
                photo_id: photo_id.to_string(),
                retry_count,
            }),
            _ => None,
        }
    }

    fn transition(&mut self, key: &LoadKey, next: LoadState) -> bool {
        let entry = self.entries.entry(key.photo_id.clone()).or_default();

        if key.retry_count != entry.retry_count {
            tracing::debug!(
                "Stale load signal for {} (attempt {}, current {})",
                key.photo_id,
                key.retry_count,
                entry.retry_count
            );
            return false;
        }

        // Only an in-flight load can finish; settled states never regress
        if entry.state != LoadState::Loading {
            tracing::debug!("Load signal for {} ignored in {:?}", key.photo_id, entry.state);
            return false;
        }

        if let LoadState::Failed { retry_count } = next {
            tracing::warn!("Image failed to load: {} (attempt {})", key.photo_id, retry_count);
        }
        entry.state = next;
        true
    }
}
