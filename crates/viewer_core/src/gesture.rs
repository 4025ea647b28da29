//! Classification of pointer interactions into pans, swipes and taps
//!
//! Mouse, pen and touch input all arrive as the same [`PointerEvent`] shape.
//! Continuous decisions (pan) are made on every move; discrete decisions
//! (swipe, vertical swipe, tap) only when the interaction ends.

use crate::command::ViewerCommand;
use crate::config::GestureConfig;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Phase of a pointer interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// Input device the event originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
    Pen,
}

/// Normalized pointer/touch event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub x: f32,
    pub y: f32,
    pub timestamp_ms: u64,
    #[serde(default = "default_pointer_count")]
    pub pointer_count: u8,
    #[serde(default)]
    pub kind: PointerKind,
}

fn default_pointer_count() -> u8 {
    1
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, x: f32, y: f32, timestamp_ms: u64, kind: PointerKind) -> Self {
        Self {
            phase,
            x,
            y,
            timestamp_ms,
            pointer_count: 1,
            kind,
        }
    }

    pub fn touch(phase: PointerPhase, x: f32, y: f32, timestamp_ms: u64) -> Self {
        Self::new(phase, x, y, timestamp_ms, PointerKind::Touch)
    }

    pub fn mouse(phase: PointerPhase, x: f32, y: f32, timestamp_ms: u64) -> Self {
        Self::new(phase, x, y, timestamp_ms, PointerKind::Mouse)
    }

    pub fn with_pointer_count(mut self, pointer_count: u8) -> Self {
        self.pointer_count = pointer_count;
        self
    }
}

/// Outcome of interpreting an event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureAction {
    /// Move the zoomed image by this delta, right now
    Pan { dx: f32, dy: f32 },
    /// A discrete decision
    Command(ViewerCommand),
}

/// Transient record of the interaction in progress
#[derive(Debug, Clone)]
pub struct GestureState {
    start_point: (f32, f32),
    start_ms: u64,
    last_point: (f32, f32),
    current_delta: (f32, f32),
    velocity: (f32, f32),
    pointer_count: u8,
    kind: PointerKind,
    panned: bool,
    /// (timestamp, x, y) of recent motion, newest last
    samples: VecDeque<(u64, f32, f32)>,
}

impl GestureState {
    fn begin(event: &PointerEvent) -> Self {
        let mut samples = VecDeque::with_capacity(16);
        samples.push_back((event.timestamp_ms, event.x, event.y));
        Self {
            start_point: (event.x, event.y),
            start_ms: event.timestamp_ms,
            last_point: (event.x, event.y),
            current_delta: (0.0, 0.0),
            velocity: (0.0, 0.0),
            pointer_count: event.pointer_count.max(1),
            kind: event.kind,
            panned: false,
            samples,
        }
    }

    pub fn start_point(&self) -> (f32, f32) {
        self.start_point
    }

    /// Offset from the start point
    pub fn current_delta(&self) -> (f32, f32) {
        self.current_delta
    }

    /// Px/s over the recent motion window
    pub fn velocity(&self) -> (f32, f32) {
        self.velocity
    }

    /// Highest number of simultaneous pointers seen
    pub fn pointer_count(&self) -> u8 {
        self.pointer_count
    }

    fn is_multi_pointer(&self) -> bool {
        self.pointer_count > 1
    }

    fn travel(&self) -> f32 {
        self.current_delta.0.hypot(self.current_delta.1)
    }

    /// Record a new position; returns the delta since the previous one
    fn track(&mut self, event: &PointerEvent, window_ms: u64) -> (f32, f32) {
        let step = (event.x - self.last_point.0, event.y - self.last_point.1);
        self.last_point = (event.x, event.y);
        self.current_delta = (event.x - self.start_point.0, event.y - self.start_point.1);
        self.pointer_count = self.pointer_count.max(event.pointer_count);

        self.samples.push_back((event.timestamp_ms, event.x, event.y));
        let cutoff = event.timestamp_ms.saturating_sub(window_ms);
        while self.samples.len() > 1 && self.samples.front().map_or(false, |s| s.0 < cutoff) {
            self.samples.pop_front();
        }
        self.velocity = self.sample_velocity();

        step
    }

    fn sample_velocity(&self) -> (f32, f32) {
        let (Some(first), Some(last)) = (self.samples.front(), self.samples.back()) else {
            return (0.0, 0.0);
        };
        let dt = last.0.saturating_sub(first.0) as f32 / 1000.0;
        if dt <= 0.0 {
            return (0.0, 0.0);
        }
        ((last.1 - first.1) / dt, (last.2 - first.2) / dt)
    }
}

/// A completed tap waiting to see whether a second one follows
#[derive(Debug, Clone, Copy)]
struct PendingTap {
    x: f32,
    y: f32,
    at_ms: u64,
}

/// Turns pointer events into pan deltas and discrete commands
#[derive(Debug, Clone)]
pub struct GestureInterpreter {
    config: GestureConfig,
    active: Option<GestureState>,
    pending_tap: Option<PendingTap>,
}

impl GestureInterpreter {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            active: None,
            pending_tap: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn gesture_state(&self) -> Option<&GestureState> {
        self.active.as_ref()
    }

    /// Horizontal drag offset of a live swipe candidate, 0 otherwise
    pub fn swipe_offset(&self) -> f32 {
        match &self.active {
            Some(g) if !g.panned && !g.is_multi_pointer() => g.current_delta.0,
            _ => 0.0,
        }
    }

    /// Interpret one event. `zoomed` is whether the transform scale is above 1.
    pub fn handle(&mut self, event: &PointerEvent, zoomed: bool) -> Vec<GestureAction> {
        let mut actions = Vec::new();

        match event.phase {
            PointerPhase::Start => {
                actions.extend(self.poll(event.timestamp_ms));

                // An extra finger joining an interaction already underway
                let joining = event.pointer_count > 1 && self.active.is_some();
                if joining {
                    if let Some(g) = &mut self.active {
                        g.pointer_count = g.pointer_count.max(event.pointer_count);
                    }
                } else {
                    self.active = Some(GestureState::begin(event));
                }
            }
            PointerPhase::Move => {
                let window = self.config.velocity_window_ms;
                if let Some(g) = &mut self.active {
                    let (dx, dy) = g.track(event, window);
                    if zoomed && !g.is_multi_pointer() && (dx != 0.0 || dy != 0.0) {
                        g.panned = true;
                        actions.push(GestureAction::Pan { dx, dy });
                    }
                }
            }
            PointerPhase::End => {
                if let Some(mut g) = self.active.take() {
                    let (dx, dy) = g.track(event, self.config.velocity_window_ms);
                    if zoomed && !g.is_multi_pointer() && (dx != 0.0 || dy != 0.0) {
                        g.panned = true;
                        actions.push(GestureAction::Pan { dx, dy });
                    }
                    actions.extend(self.resolve(&g, event, zoomed));
                }
            }
            PointerPhase::Cancel => {
                if self.active.take().is_some() {
                    tracing::debug!("Gesture cancelled");
                }
            }
        }

        actions
    }

    /// Fire a pending single tap once the double-tap window has passed
    pub fn poll(&mut self, now_ms: u64) -> Option<GestureAction> {
        let tap = self.pending_tap?;
        if now_ms.saturating_sub(tap.at_ms) > self.config.double_tap_window_ms {
            self.pending_tap = None;
            tracing::debug!("Single tap at ({}, {})", tap.x, tap.y);
            return Some(GestureAction::Command(ViewerCommand::ToggleOverlay));
        }
        None
    }

    /// Drop the interaction in progress and any pending tap
    pub fn reset(&mut self) {
        self.active = None;
        self.pending_tap = None;
    }

    /// Discrete decision at the end of an interaction
    fn resolve(&mut self, g: &GestureState, end: &PointerEvent, zoomed: bool) -> Option<GestureAction> {
        if g.is_multi_pointer() {
            tracing::debug!("Multi-pointer interaction ignored");
            return None;
        }

        if g.travel() <= self.config.tap_slop {
            return self.resolve_tap(g, end);
        }

        if g.panned || zoomed {
            return None;
        }

        let (dx, dy) = g.current_delta;
        let (vx, _) = g.velocity;

        // Larger axis wins
        if dy.abs() > dx.abs() {
            if g.kind != PointerKind::Touch || dy.abs() <= self.config.vertical_swipe_distance {
                return None;
            }
            let cmd = if dy < 0.0 {
                ViewerCommand::ShowInfoPanel
            } else {
                ViewerCommand::HideInfoPanel
            };
            tracing::debug!("Vertical swipe dy={} -> {:?}", dy, cmd);
            return Some(GestureAction::Command(cmd));
        }

        if dx.abs() > self.config.swipe_distance || vx.abs() > self.config.swipe_velocity {
            let toward = if dx != 0.0 { dx } else { vx };
            let cmd = if toward > 0.0 {
                ViewerCommand::Previous
            } else {
                ViewerCommand::Next
            };
            tracing::debug!("Swipe dx={} vx={} -> {:?}", dx, vx, cmd);
            return Some(GestureAction::Command(cmd));
        }

        tracing::debug!("Drag dx={} vx={} below swipe threshold", dx, vx);
        None
    }

    fn resolve_tap(&mut self, g: &GestureState, end: &PointerEvent) -> Option<GestureAction> {
        if let Some(first) = self.pending_tap.take() {
            let gap = g.start_ms.saturating_sub(first.at_ms);
            let distance = (end.x - first.x).hypot(end.y - first.y);
            if gap <= self.config.double_tap_window_ms && distance <= self.config.double_tap_slop {
                tracing::debug!("Double tap at ({}, {})", end.x, end.y);
                return Some(GestureAction::Command(ViewerCommand::DoubleTapZoom));
            }

            // Too late or too far: the first tap stands alone, this one waits
            self.pending_tap = Some(PendingTap {
                x: end.x,
                y: end.y,
                at_ms: end.timestamp_ms,
            });
            return Some(GestureAction::Command(ViewerCommand::ToggleOverlay));
        }

        self.pending_tap = Some(PendingTap {
            x: end.x,
            y: end.y,
            at_ms: end.timestamp_ms,
        });
        None
    }
}
