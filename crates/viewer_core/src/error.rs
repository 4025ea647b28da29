//! Viewer error types

use thiserror::Error;

/// Main viewer error type
#[derive(Error, Debug)]
pub enum ViewerError {
    // ===== Recoverable (reported to the host, session continues) =====
    #[error("Photo not found in sequence: {0}")]
    UnknownPhoto(String),

    #[error("Image failed to load: {photo_id} (attempt {retry_count})")]
    ImageLoad { photo_id: String, retry_count: u32 },

    #[error("Viewer is not open")]
    NotOpen,

    // ===== Refused (the viewer never enters an invalid state) =====
    #[error("Cannot open viewer on an empty photo sequence")]
    EmptySequence,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid photo data: {0}")]
    PhotoData(#[from] serde_json::Error),
}

impl ViewerError {
    /// Is this error recoverable within an open session?
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ViewerError::UnknownPhoto(_) | ViewerError::ImageLoad { .. } | ViewerError::NotOpen
        )
    }

    /// Get a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            ViewerError::ImageLoad { .. } => "Couldn't load this photo. Tap to retry.".to_string(),
            ViewerError::EmptySequence => "There are no photos to show.".to_string(),
            ViewerError::UnknownPhoto(_) => "That photo is no longer available.".to_string(),
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable() {
        assert!(ViewerError::UnknownPhoto("x".into()).is_recoverable());
        assert!(ViewerError::ImageLoad { photo_id: "x".into(), retry_count: 0 }.is_recoverable());
        assert!(!ViewerError::EmptySequence.is_recoverable());
        assert!(!ViewerError::Config("bad".into()).is_recoverable());
    }

    #[test]
    fn test_user_message() {
        let err = ViewerError::ImageLoad { photo_id: "c".into(), retry_count: 1 };
        assert!(err.user_message().contains("retry"));
        assert_eq!(
            ViewerError::Config("min_scale".into()).user_message(),
            "Configuration error: min_scale"
        );
    }
}
