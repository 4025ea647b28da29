//! Bounded zoom / rotation / pan state for the current photo

use crate::animation::Animator;
use crate::config::{AnimationConfig, TransformConfig};
use serde::{Deserialize, Serialize};

const SCALE_EPSILON: f32 = 1e-4;

/// View transform applied by the renderer to the current photo
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    pub scale: f32,
    /// One of 0, 90, 180, 270
    pub rotation_degrees: u16,
    pub pan_x: f32,
    pub pan_y: f32,
}

impl TransformState {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        rotation_degrees: 0,
        pan_x: 0.0,
        pan_y: 0.0,
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Transform size based on rotation
    pub fn rotated_size(&self, width: u32, height: u32) -> (u32, u32) {
        match self.rotation_degrees {
            90 | 270 => (height, width),
            _ => (width, height),
        }
    }
}

impl Default for TransformState {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Scale range and pan allowance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformBounds {
    pub min_scale: f32,
    pub max_scale: f32,
    pub pan_factor: f32,
}

impl TransformBounds {
    pub fn from_config(config: &TransformConfig) -> Self {
        Self {
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            pan_factor: config.pan_factor,
        }
    }

    /// Pan range per axis; zero until zoomed past 1.0
    pub fn max_pan(&self, scale: f32) -> f32 {
        ((scale - 1.0) * self.pan_factor).max(0.0)
    }

    pub fn clamp_scale(&self, scale: f32) -> f32 {
        if scale.is_nan() {
            return 1.0;
        }
        // An inverted range must not panic
        scale.max(self.min_scale).min(self.max_scale)
    }

    /// Bring a transform inside the bounds: scale first, then pan for that scale
    pub fn clamp(&self, state: TransformState) -> TransformState {
        let scale = self.clamp_scale(state.scale);
        let max_pan = self.max_pan(scale);
        TransformState {
            scale,
            rotation_degrees: state.rotation_degrees % 360,
            pan_x: clamp_pan(state.pan_x, max_pan),
            pan_y: clamp_pan(state.pan_y, max_pan),
        }
    }

    pub fn contains(&self, state: &TransformState) -> bool {
        let max_pan = self.max_pan(state.scale);
        state.scale >= self.min_scale
            && state.scale <= self.max_scale
            && state.pan_x.abs() <= max_pan
            && state.pan_y.abs() <= max_pan
            && state.rotation_degrees % 90 == 0
            && state.rotation_degrees < 360
    }
}

fn clamp_pan(value: f32, max_pan: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(-max_pan, max_pan)
}

/// Owns the logical transform and its animated, displayed counterpart.
///
/// Every write clamps, so both values satisfy the bounds at all times.
#[derive(Debug, Clone)]
pub struct TransformEngine {
    bounds: TransformBounds,
    zoom_step: f32,
    double_tap_scale: f32,
    state: TransformState,
    animator: Animator,
}

impl TransformEngine {
    pub fn new(transform: &TransformConfig, animation: &AnimationConfig) -> Self {
        Self {
            bounds: TransformBounds::from_config(transform),
            zoom_step: transform.zoom_step,
            double_tap_scale: transform.double_tap_scale,
            state: TransformState::IDENTITY,
            animator: Animator::new(animation),
        }
    }

    /// Logical transform; commands operate on this value
    pub fn state(&self) -> TransformState {
        self.state
    }

    /// Transform the renderer should draw at the current animation clock
    pub fn displayed(&self) -> TransformState {
        self.bounds.clamp(self.animator.sample(self.state))
    }

    pub fn bounds(&self) -> TransformBounds {
        self.bounds
    }

    pub fn scale(&self) -> f32 {
        self.state.scale
    }

    /// Zoomed past 1.0: drags pan instead of swiping
    pub fn is_zoomed(&self) -> bool {
        self.state.scale > 1.0 + SCALE_EPSILON
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_active()
    }

    /// Add `delta` to the scale
    pub fn zoom_by(&mut self, delta: f32) {
        self.set_zoom(self.state.scale + delta);
    }

    pub fn zoom_in(&mut self) {
        self.zoom_by(self.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_by(-self.zoom_step);
    }

    /// Set an absolute scale; pan is re-clamped in the same write
    pub fn set_zoom(&mut self, scale: f32) {
        self.commit(TransformState { scale, ..self.state });
    }

    /// Rotate clockwise by a quarter turn
    pub fn rotate_90(&mut self) {
        let rotation_degrees = (self.state.rotation_degrees + 90) % 360;
        self.commit(TransformState {
            rotation_degrees,
            ..self.state
        });
    }

    /// Animate back to the identity transform
    pub fn reset_transform(&mut self) {
        self.commit(TransformState::IDENTITY);
    }

    /// Jump to the identity transform with no animation
    pub fn snap_to_identity(&mut self) {
        self.animator.cancel();
        self.state = TransformState::IDENTITY;
    }

    /// Zoom to the double-tap target from 1.0, otherwise reset
    pub fn double_tap_toggle(&mut self) {
        if (self.state.scale - 1.0).abs() < SCALE_EPSILON {
            self.set_zoom(self.double_tap_scale);
        } else {
            self.reset_transform();
        }
    }

    /// Move the zoomed image. Ignored (returns false) unless zoomed in.
    ///
    /// Applied immediately, cancelling any running animation.
    pub fn apply_pan_delta(&mut self, dx: f32, dy: f32) -> bool {
        if !self.is_zoomed() {
            return false;
        }
        self.animator.cancel();
        self.state = self.bounds.clamp(TransformState {
            pan_x: self.state.pan_x + dx,
            pan_y: self.state.pan_y + dy,
            ..self.state
        });
        true
    }

    /// Advance the animation clock
    pub fn tick(&mut self, now_ms: u64) -> bool {
        self.animator.tick(now_ms)
    }

    /// Stop any running animation so new input acts on a settled transform
    pub fn interrupt(&mut self) {
        self.animator.cancel();
    }

    fn commit(&mut self, next: TransformState) {
        let from = self.displayed();
        self.state = self.bounds.clamp(next);
        self.animator.start(from, self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> TransformEngine {
        TransformEngine::new(&TransformConfig::default(), &AnimationConfig::default())
    }

    fn still_engine() -> TransformEngine {
        TransformEngine::new(
            &TransformConfig::default(),
            &AnimationConfig { enabled: false, duration_ms: 0 },
        )
    }

    #[test]
    fn test_zoom_clamps_to_range() {
        let mut t = engine();
        for _ in 0..10 {
            t.zoom_in();
        }
        assert_eq!(t.scale(), 3.0);

        for _ in 0..10 {
            t.zoom_out();
        }
        assert_eq!(t.scale(), 0.25);

        // Floor holds on further zoom-out
        t.zoom_out();
        assert_eq!(t.scale(), 0.25);

        t.set_zoom(f32::NAN);
        assert_eq!(t.scale(), 1.0);
    }

    #[test]
    fn test_zoom_out_reclamps_pan() {
        let mut t = engine();
        t.set_zoom(3.0);
        t.apply_pan_delta(1000.0, -1000.0);
        assert_eq!(t.state().pan_x, 400.0);
        assert_eq!(t.state().pan_y, -400.0);

        t.zoom_out();
        assert_eq!(t.scale(), 2.5);
        assert_eq!(t.state().pan_x, 300.0);
        assert_eq!(t.state().pan_y, -300.0);

        t.set_zoom(0.5);
        assert_eq!(t.state().pan_x, 0.0);
        assert_eq!(t.state().pan_y, 0.0);
    }

    #[test]
    fn test_pan_ignored_when_not_zoomed() {
        let mut t = engine();
        assert!(!t.apply_pan_delta(30.0, 0.0));
        assert_eq!(t.state(), TransformState::IDENTITY);

        t.set_zoom(0.5);
        assert!(!t.apply_pan_delta(30.0, 0.0));
        assert_eq!(t.state().pan_x, 0.0);
    }

    #[test]
    fn test_rotate_steps() {
        let mut t = engine();
        let seen: Vec<u16> = (0..5)
            .map(|_| {
                t.rotate_90();
                t.state().rotation_degrees
            })
            .collect();
        assert_eq!(seen, vec![90, 180, 270, 0, 90]);
    }

    #[test]
    fn test_double_tap_round_trip() {
        let mut t = engine();
        t.double_tap_toggle();
        assert_eq!(t.scale(), 2.0);
        t.double_tap_toggle();
        assert_eq!(t.state(), TransformState::IDENTITY);
    }

    #[test]
    fn test_double_tap_from_zoomed_out_resets() {
        let mut t = engine();
        t.zoom_out();
        t.rotate_90();
        t.double_tap_toggle();
        assert_eq!(t.state(), TransformState::IDENTITY);
    }

    #[test]
    fn test_reset_animates_then_settles() {
        let mut t = engine();
        t.tick(0);
        t.set_zoom(3.0);
        t.tick(1000);
        t.apply_pan_delta(150.0, 80.0);

        t.reset_transform();
        assert!(t.state().is_identity());
        assert!(t.is_animating());
        assert_eq!(t.displayed().scale, 3.0);

        t.tick(1100);
        let mid = t.displayed();
        assert!(mid.scale > 1.0 && mid.scale < 3.0);
        assert!(t.bounds().contains(&mid));

        t.tick(1200);
        assert!(!t.is_animating());
        assert!(t.displayed().is_identity());
    }

    #[test]
    fn test_pan_interrupts_animation() {
        let mut t = engine();
        t.double_tap_toggle();
        assert!(t.is_animating());

        assert!(t.apply_pan_delta(10.0, 0.0));
        assert!(!t.is_animating());
        assert_eq!(t.displayed(), t.state());
    }

    #[test]
    fn test_snap_to_identity() {
        let mut t = engine();
        t.set_zoom(2.5);
        t.rotate_90();
        t.snap_to_identity();
        assert!(!t.is_animating());
        assert!(t.displayed().is_identity());
    }

    #[test]
    fn test_displayed_stays_in_bounds_while_zooming_out() {
        // Pan at the edge while scale shrinks is the worst case for interpolation
        let mut t = engine();
        t.tick(0);
        t.set_zoom(3.0);
        t.tick(500);
        t.apply_pan_delta(400.0, 400.0);
        t.set_zoom(0.25);

        let bounds = t.bounds();
        for now in (500..=700).step_by(5) {
            t.tick(now);
            assert!(bounds.contains(&t.displayed()), "out of bounds at {}ms", now);
        }
    }

    #[test]
    fn test_random_operations_hold_bounds() {
        let mut t = still_engine();
        let bounds = t.bounds();
        let mut state: u64 = 0x5eed;

        for _ in 0..2000 {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let roll = (state >> 33) % 6;
            let amount = ((state >> 16) % 800) as f32 - 400.0;
            match roll {
                0 => t.zoom_in(),
                1 => t.zoom_out(),
                2 => t.set_zoom(amount / 100.0),
                3 => {
                    t.apply_pan_delta(amount, -amount / 2.0);
                }
                4 => t.rotate_90(),
                _ => t.double_tap_toggle(),
            }
            assert!(bounds.contains(&t.state()), "{:?}", t.state());
            assert!(bounds.contains(&t.displayed()), "{:?}", t.displayed());
        }
    }

    #[test]
    fn test_inverted_scale_range_does_not_panic() {
        let config = TransformConfig {
            min_scale: 2.0,
            max_scale: 1.5,
            ..TransformConfig::default()
        };
        let mut t = TransformEngine::new(&config, &AnimationConfig::default());
        t.zoom_in();
        t.zoom_out();
        assert_eq!(t.scale(), 1.5);
        assert_eq!(TransformBounds::from_config(&config).clamp_scale(0.1), 1.5);
    }

    #[test]
    fn test_rotated_size() {
        let mut state = TransformState::IDENTITY;
        assert_eq!(state.rotated_size(100, 200), (100, 200));
        state.rotation_degrees = 90;
        assert_eq!(state.rotated_size(100, 200), (200, 100));
    }
}
