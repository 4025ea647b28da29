//! Interruptible tween scheduler for the displayed transform

use crate::config::AnimationConfig;
use crate::transform::TransformState;

/// A running tween between two transforms
#[derive(Debug, Clone, Copy, PartialEq)]
struct Tween {
    from: TransformState,
    to: TransformState,
    start_ms: u64,
}

/// Drives the displayed transform toward the logical one.
///
/// The clock only moves forward and is advanced by the host through `tick`.
#[derive(Debug, Clone)]
pub struct Animator {
    enabled: bool,
    duration_ms: u64,
    clock_ms: u64,
    active: Option<Tween>,
}

impl Animator {
    pub fn new(config: &AnimationConfig) -> Self {
        Self {
            enabled: config.enabled,
            duration_ms: config.duration_ms,
            clock_ms: 0,
            active: None,
        }
    }

    /// Advance the clock. Returns true while a tween is still running.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        self.clock_ms = self.clock_ms.max(now_ms);
        if self.progress() >= 1.0 {
            self.active = None;
        }
        self.active.is_some()
    }

    pub fn now(&self) -> u64 {
        self.clock_ms
    }

    /// Start a tween at the current clock, replacing any running one
    pub fn start(&mut self, from: TransformState, to: TransformState) {
        if !self.enabled || self.duration_ms == 0 || from == to {
            self.active = None;
            return;
        }
        self.active = Some(Tween {
            from,
            to,
            start_ms: self.clock_ms,
        });
    }

    pub fn cancel(&mut self) {
        if self.active.take().is_some() {
            tracing::trace!("Transform animation cancelled at {}ms", self.clock_ms);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Linear progress of the running tween, 1.0 when idle
    pub fn progress(&self) -> f32 {
        match self.active {
            Some(tween) => {
                let elapsed = self.clock_ms.saturating_sub(tween.start_ms) as f32;
                (elapsed / self.duration_ms as f32).min(1.0)
            }
            None => 1.0,
        }
    }

    /// Interpolated transform, or `settled` when no tween is running.
    ///
    /// The result is not clamped; callers apply their own bounds.
    pub fn sample(&self, settled: TransformState) -> TransformState {
        let Some(tween) = self.active else {
            return settled;
        };
        let t = ease_out(self.progress());
        TransformState {
            scale: lerp(tween.from.scale, tween.to.scale, t),
            // Rotation is discrete and never interpolated
            rotation_degrees: tween.to.rotation_degrees,
            pan_x: lerp(tween.from.pan_x, tween.to.pan_x, t),
            pan_y: lerp(tween.from.pan_y, tween.to.pan_y, t),
        }
    }
}

/// Ease-out cubic function
fn ease_out(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zoomed(scale: f32) -> TransformState {
        TransformState {
            scale,
            ..TransformState::IDENTITY
        }
    }

    #[test]
    fn test_tween_runs_to_completion() {
        let mut anim = Animator::new(&AnimationConfig { enabled: true, duration_ms: 200 });
        anim.start(TransformState::IDENTITY, zoomed(2.0));
        assert!(anim.is_active());

        assert!(anim.tick(100));
        let mid = anim.sample(zoomed(2.0));
        assert!(mid.scale > 1.0 && mid.scale < 2.0);
        // Ease-out is past the halfway point at half time
        assert!(mid.scale > 1.5);

        assert!(!anim.tick(200));
        assert_eq!(anim.sample(zoomed(2.0)), zoomed(2.0));
    }

    #[test]
    fn test_clock_never_goes_backwards() {
        let mut anim = Animator::new(&AnimationConfig::default());
        anim.tick(500);
        anim.tick(100);
        assert_eq!(anim.now(), 500);
    }

    #[test]
    fn test_retarget_starts_from_given_value() {
        let mut anim = Animator::new(&AnimationConfig { enabled: true, duration_ms: 100 });
        anim.start(TransformState::IDENTITY, zoomed(3.0));
        anim.tick(50);
        let current = anim.sample(zoomed(3.0));

        anim.start(current, TransformState::IDENTITY);
        assert_eq!(anim.sample(TransformState::IDENTITY), current);
        anim.tick(150);
        assert!(!anim.is_active());
    }

    #[test]
    fn test_disabled_or_noop_tweens_do_not_start() {
        let mut anim = Animator::new(&AnimationConfig { enabled: false, duration_ms: 200 });
        anim.start(TransformState::IDENTITY, zoomed(2.0));
        assert!(!anim.is_active());

        let mut anim = Animator::new(&AnimationConfig::default());
        anim.start(zoomed(2.0), zoomed(2.0));
        assert!(!anim.is_active());
    }

    #[test]
    fn test_cancel() {
        let mut anim = Animator::new(&AnimationConfig::default());
        anim.start(TransformState::IDENTITY, zoomed(2.0));
        anim.cancel();
        assert!(!anim.is_active());
        assert_eq!(anim.progress(), 1.0);
    }
}
