//! Position within the photo sequence

use crate::load_state::ImageLoadState;
use crate::photo::{Photo, PhotoSequence};
use crate::transform::TransformEngine;
use serde::{Deserialize, Serialize};

/// Direction of a navigation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Next,
    Previous,
}

/// Tracks the current photo and wraps around at both ends.
///
/// Every index change resets the transform and the new photo's load state
/// before the photo is reported as current.
#[derive(Debug, Clone)]
pub struct NavigationSequencer {
    photos: PhotoSequence,
    current_index: usize,
}

impl NavigationSequencer {
    /// Start at the first photo. `photos` must not be empty.
    pub fn new(photos: PhotoSequence) -> Self {
        Self {
            photos,
            current_index: 0,
        }
    }

    pub fn photos(&self) -> &PhotoSequence {
        &self.photos
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_photo(&self) -> Option<&Photo> {
        self.photos.get(self.current_index)
    }

    /// More than one photo, so next/previous do something
    pub fn can_navigate(&self) -> bool {
        self.photos.len() > 1
    }

    /// Index for `photo_id`, falling back to 0 when it is not in the sequence
    pub fn resolve(&self, photo_id: &str) -> usize {
        self.photos.position(photo_id).unwrap_or_else(|| {
            tracing::warn!("Photo {} not in sequence, starting at index 0", photo_id);
            0
        })
    }

    /// Position on `photo_id` at open time and reset per-photo state
    pub fn jump_to(
        &mut self,
        photo_id: &str,
        transform: &mut TransformEngine,
        loads: &mut ImageLoadState,
    ) -> usize {
        self.start(Some(photo_id), transform, loads)
    }

    /// Open-time positioning: the requested photo, or the first one
    pub fn start(
        &mut self,
        initial_photo_id: Option<&str>,
        transform: &mut TransformEngine,
        loads: &mut ImageLoadState,
    ) -> usize {
        let index = initial_photo_id.map_or(0, |id| self.resolve(id));
        self.enter(index, transform, loads);
        index
    }

    pub fn next(&mut self, transform: &mut TransformEngine, loads: &mut ImageLoadState) -> bool {
        self.step(Direction::Next, transform, loads)
    }

    pub fn previous(&mut self, transform: &mut TransformEngine, loads: &mut ImageLoadState) -> bool {
        self.step(Direction::Previous, transform, loads)
    }

    /// Move one photo with wraparound. No-op for sequences of one or zero.
    pub fn step(
        &mut self,
        direction: Direction,
        transform: &mut TransformEngine,
        loads: &mut ImageLoadState,
    ) -> bool {
        if !self.can_navigate() {
            return false;
        }

        let len = self.photos.len();
        let index = match direction {
            Direction::Next => (self.current_index + 1) % len,
            Direction::Previous => (self.current_index + len - 1) % len,
        };
        self.go_to(index, transform, loads)
    }

    pub fn first(&mut self, transform: &mut TransformEngine, loads: &mut ImageLoadState) -> bool {
        self.go_to(0, transform, loads)
    }

    pub fn last(&mut self, transform: &mut TransformEngine, loads: &mut ImageLoadState) -> bool {
        let last = self.photos.len().saturating_sub(1);
        self.go_to(last, transform, loads)
    }

    /// Change index if different; returns whether it changed
    fn go_to(
        &mut self,
        index: usize,
        transform: &mut TransformEngine,
        loads: &mut ImageLoadState,
    ) -> bool {
        if index == self.current_index || index >= self.photos.len() {
            return false;
        }
        self.enter(index, transform, loads);
        true
    }

    fn enter(&mut self, index: usize, transform: &mut TransformEngine, loads: &mut ImageLoadState) {
        transform.snap_to_identity();
        if let Some(photo) = self.photos.get(index) {
            loads.reset(&photo.id);
        }
        self.current_index = index;
        tracing::debug!("Current photo index {} of {}", index, self.photos.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnimationConfig, TransformConfig};
    use crate::load_state::LoadState;
    use crate::transform::TransformState;

    fn sequence(ids: &[&str]) -> PhotoSequence {
        PhotoSequence::new(
            ids.iter()
                .map(|id| Photo::new(id, &format!("https://cdn.example/{}.jpg", id)))
                .collect(),
        )
    }

    fn parts() -> (TransformEngine, ImageLoadState) {
        (
            TransformEngine::new(&TransformConfig::default(), &AnimationConfig::default()),
            ImageLoadState::new(),
        )
    }

    #[test]
    fn test_wraparound() {
        let (mut t, mut l) = parts();
        let mut nav = NavigationSequencer::new(sequence(&["a", "b", "c", "d"]));

        assert!(nav.previous(&mut t, &mut l));
        assert_eq!(nav.current_index(), 3);

        assert!(nav.next(&mut t, &mut l));
        assert_eq!(nav.current_index(), 0);
    }

    #[test]
    fn test_single_photo_is_noop() {
        let (mut t, mut l) = parts();
        let mut nav = NavigationSequencer::new(sequence(&["only"]));
        t.set_zoom(2.0);

        assert!(!nav.can_navigate());
        assert!(!nav.next(&mut t, &mut l));
        assert!(!nav.previous(&mut t, &mut l));
        assert_eq!(nav.current_index(), 0);
        // No index change, so the zoom survives
        assert_eq!(t.scale(), 2.0);
    }

    #[test]
    fn test_navigation_resets_transform_and_load_state() {
        let (mut t, mut l) = parts();
        let mut nav = NavigationSequencer::new(sequence(&["a", "b", "c"]));

        l.reset("b");
        l.mark_loaded(&l.key("b"));

        t.set_zoom(3.0);
        t.rotate_90();
        t.apply_pan_delta(120.0, -40.0);

        nav.next(&mut t, &mut l);
        assert_eq!(nav.current_photo().map(|p| p.id.as_str()), Some("b"));
        assert_eq!(t.state(), TransformState::IDENTITY);
        assert_eq!(t.displayed(), TransformState::IDENTITY);
        assert_eq!(l.state("b"), LoadState::Loading);
    }

    #[test]
    fn test_previous_resets_transform_and_load_state() {
        let (mut t, mut l) = parts();
        let mut nav = NavigationSequencer::new(sequence(&["a", "b", "c"]));

        l.reset("c");
        l.mark_failed(&l.key("c"));
        l.retry("c");

        t.set_zoom(2.5);
        t.rotate_90();
        t.apply_pan_delta(-90.0, 60.0);
        assert!(!t.state().is_identity());

        // Wraps from the first photo to the last
        assert!(nav.previous(&mut t, &mut l));
        assert_eq!(nav.current_photo().map(|p| p.id.as_str()), Some("c"));
        assert_eq!(t.state(), TransformState::IDENTITY);
        assert_eq!(t.displayed(), TransformState::IDENTITY);
        assert_eq!(l.state("c"), LoadState::Loading);
        assert_eq!(l.key("c").retry_count, 0);
    }

    #[test]
    fn test_jump_to() {
        let (mut t, mut l) = parts();
        let mut nav = NavigationSequencer::new(sequence(&["a", "b", "c"]));

        t.set_zoom(2.0);
        assert_eq!(nav.jump_to("c", &mut t, &mut l), 2);
        assert!(t.state().is_identity());

        assert_eq!(nav.jump_to("missing", &mut t, &mut l), 0);
        assert_eq!(nav.current_index(), 0);
    }

    #[test]
    fn test_first_last() {
        let (mut t, mut l) = parts();
        let mut nav = NavigationSequencer::new(sequence(&["a", "b", "c"]));

        assert!(!nav.first(&mut t, &mut l));
        assert!(nav.last(&mut t, &mut l));
        assert_eq!(nav.current_index(), 2);
        assert!(!nav.last(&mut t, &mut l));
        assert!(nav.first(&mut t, &mut l));
        assert_eq!(nav.current_index(), 0);
    }

    #[test]
    fn test_full_cycle_returns_home() {
        let (mut t, mut l) = parts();
        let mut nav = NavigationSequencer::new(sequence(&["a", "b", "c", "d", "e"]));
        for _ in 0..5 {
            nav.step(Direction::Next, &mut t, &mut l);
        }
        assert_eq!(nav.current_index(), 0);
        for _ in 0..7 {
            nav.step(Direction::Previous, &mut t, &mut l);
        }
        assert_eq!(nav.current_index(), 3);
    }
}
