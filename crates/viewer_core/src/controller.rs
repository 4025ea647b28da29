//! Viewer session lifecycle and the host-facing read model

use crate::command::{KeyBindings, KeyEvent, ViewerCommand};
use crate::config::ViewerConfig;
use crate::gesture::{GestureAction, GestureInterpreter, PointerEvent, PointerPhase};
use crate::load_state::{ImageLoadState, LoadKey, LoadState};
use crate::navigation::{Direction, NavigationSequencer};
use crate::photo::{Photo, PhotoSequence};
use crate::transform::{TransformEngine, TransformState};
use crate::ViewerError;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

/// Host-side pointer/keyboard listener registration
pub trait InputListeners {
    fn attach(&mut self);
    fn detach(&mut self);
}

/// Shared handle to the host's listener registration
pub type SharedListeners = Rc<RefCell<dyn InputListeners>>;

/// Keeps input listeners attached for as long as it lives.
///
/// Owned by the open session, so listeners are released on `close()` and
/// also when the controller is dropped while open.
pub struct ListenerGuard {
    listeners: Option<SharedListeners>,
}

impl ListenerGuard {
    fn acquire(listeners: Option<SharedListeners>) -> Self {
        if let Some(l) = &listeners {
            l.borrow_mut().attach();
            tracing::debug!("Input listeners attached");
        }
        Self { listeners }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(l) = self.listeners.take() {
            l.borrow_mut().detach();
            tracing::debug!("Input listeners detached");
        }
    }
}

/// Lifecycle state of the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Open { index: usize },
}

/// Everything that exists only while the viewer is open
struct ViewerSession {
    sequencer: NavigationSequencer,
    transform: TransformEngine,
    loads: ImageLoadState,
    gestures: GestureInterpreter,
    show_info_panel: bool,
    show_overlay: bool,
    _listeners: ListenerGuard,
}

impl ViewerSession {
    fn current_photo_id(&self) -> Option<&str> {
        self.sequencer.current_photo().map(|p| p.id.as_str())
    }

    fn contains(&self, photo_id: &str) -> bool {
        self.sequencer.photos().position(photo_id).is_some()
    }
}

/// Serializable view of the controller for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewerSnapshot {
    pub is_open: bool,
    pub current_index: Option<usize>,
    pub photo_count: usize,
    pub current_photo_id: Option<String>,
    pub transform: Option<TransformState>,
    pub displayed_transform: Option<TransformState>,
    pub load_state: Option<LoadState>,
    pub load_key: Option<LoadKey>,
    pub show_info_panel: bool,
    pub show_overlay: bool,
    pub swipe_offset: f32,
    pub can_navigate: bool,
    pub animating: bool,
}

/// The only object the host talks to.
///
/// Single-threaded by construction: it is neither `Send` nor `Sync`.
pub struct ViewerController {
    config: ViewerConfig,
    bindings: KeyBindings,
    listeners: Option<SharedListeners>,
    on_close: Option<Box<dyn FnMut()>>,
    session: Option<ViewerSession>,
}

impl ViewerController {
    /// Build a controller for a host-supplied configuration.
    ///
    /// Configurations that fail `validate()` are refused.
    pub fn new(config: ViewerConfig) -> Result<Self, ViewerError> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    fn from_validated(config: ViewerConfig) -> Self {
        let bindings = KeyBindings::new(&config.keybindings);
        Self {
            config,
            bindings,
            listeners: None,
            on_close: None,
            session: None,
        }
    }

    /// Listeners to attach while open
    pub fn with_input_listeners(mut self, listeners: SharedListeners) -> Self {
        self.listeners = Some(listeners);
        self
    }

    /// Called after an explicit close so the host can unmount the viewer
    pub fn on_close(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_close = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    // ========================================
    // Lifecycle
    // ========================================

    /// Open on `photos`, positioned at `initial_photo_id` when it is present.
    ///
    /// Refuses an empty sequence and stays closed. Opening while already open
    /// replaces the previous session.
    pub fn open(
        &mut self,
        photos: PhotoSequence,
        initial_photo_id: Option<&str>,
    ) -> Result<usize, ViewerError> {
        if photos.is_empty() {
            tracing::warn!("Refusing to open viewer on an empty photo sequence");
            return Err(ViewerError::EmptySequence);
        }

        // Release the old session's listeners before acquiring new ones
        self.session = None;

        let mut transform = TransformEngine::new(&self.config.transform, &self.config.animation);
        let mut loads = ImageLoadState::new();
        let mut sequencer = NavigationSequencer::new(photos);
        let index = sequencer.start(initial_photo_id, &mut transform, &mut loads);

        tracing::info!(
            "Viewer opened at index {} of {}",
            index,
            sequencer.len()
        );

        self.session = Some(ViewerSession {
            sequencer,
            transform,
            loads,
            gestures: GestureInterpreter::new(self.config.gesture.clone()),
            show_info_panel: false,
            show_overlay: false,
            _listeners: ListenerGuard::acquire(self.listeners.clone()),
        });

        Ok(index)
    }

    /// Close the viewer. Returns false if it was not open.
    pub fn close(&mut self) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        // Dropping the session releases listeners and in-flight gesture state
        drop(session);
        tracing::info!("Viewer closed");

        if let Some(callback) = &mut self.on_close {
            callback();
        }
        true
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn state(&self) -> SessionState {
        match &self.session {
            Some(s) => SessionState::Open {
                index: s.sequencer.current_index(),
            },
            None => SessionState::Closed,
        }
    }

    // ========================================
    // Commands
    // ========================================

    /// Execute a command. Returns false when closed (commands are rejected).
    pub fn execute(&mut self, cmd: ViewerCommand) -> bool {
        if cmd == ViewerCommand::Close {
            return self.close();
        }

        let Some(s) = self.session.as_mut() else {
            tracing::debug!("Command {} rejected: viewer is closed", cmd.id());
            return false;
        };

        if cmd.is_navigation() {
            // Gesture state belongs to the photo being left
            s.gestures.reset();
        }

        match cmd {
            ViewerCommand::Next => {
                s.sequencer.next(&mut s.transform, &mut s.loads);
            }
            ViewerCommand::Previous => {
                s.sequencer.previous(&mut s.transform, &mut s.loads);
            }
            ViewerCommand::First => {
                s.sequencer.first(&mut s.transform, &mut s.loads);
            }
            ViewerCommand::Last => {
                s.sequencer.last(&mut s.transform, &mut s.loads);
            }
            ViewerCommand::ZoomIn => s.transform.zoom_in(),
            ViewerCommand::ZoomOut => s.transform.zoom_out(),
            ViewerCommand::ResetTransform => s.transform.reset_transform(),
            ViewerCommand::Rotate => s.transform.rotate_90(),
            ViewerCommand::DoubleTapZoom => s.transform.double_tap_toggle(),
            ViewerCommand::ToggleInfoPanel => s.show_info_panel = !s.show_info_panel,
            ViewerCommand::ShowInfoPanel => s.show_info_panel = true,
            ViewerCommand::HideInfoPanel => s.show_info_panel = false,
            ViewerCommand::ToggleOverlay => s.show_overlay = !s.show_overlay,
            ViewerCommand::RetryLoad => {
                if let Some(id) = s.current_photo_id().map(str::to_string) {
                    s.loads.retry(&id);
                }
            }
            ViewerCommand::Close => {}
        }

        tracing::debug!("Executed {}", cmd.id());
        true
    }

    pub fn navigate(&mut self, direction: Direction) -> bool {
        match direction {
            Direction::Next => self.execute(ViewerCommand::Next),
            Direction::Previous => self.execute(ViewerCommand::Previous),
        }
    }

    // ========================================
    // Input
    // ========================================

    /// Handle a key press; returns the command it triggered
    pub fn handle_key(&mut self, event: &KeyEvent) -> Option<ViewerCommand> {
        if !self.is_open() {
            return None;
        }
        let cmd = self.bindings.resolve(event)?;
        self.execute(cmd).then_some(cmd)
    }

    /// Handle a pointer event; returns the discrete commands it triggered.
    ///
    /// Pan deltas are applied before this returns.
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> Vec<ViewerCommand> {
        let Some(s) = self.session.as_mut() else {
            return Vec::new();
        };

        s.transform.tick(event.timestamp_ms);
        if event.phase == PointerPhase::Start {
            // New input takes precedence over any running animation
            s.transform.interrupt();
        }

        let actions = s.gestures.handle(event, s.transform.is_zoomed());

        let mut executed = Vec::new();
        for action in actions {
            match action {
                GestureAction::Pan { dx, dy } => {
                    if let Some(s) = self.session.as_mut() {
                        s.transform.apply_pan_delta(dx, dy);
                    }
                }
                GestureAction::Command(cmd) => {
                    if self.execute(cmd) {
                        executed.push(cmd);
                    }
                }
            }
        }
        executed
    }

    /// Mouse wheel: negative delta zooms in, positive zooms out
    pub fn handle_wheel(&mut self, delta_y: f32, timestamp_ms: u64) -> Option<ViewerCommand> {
        let s = self.session.as_mut()?;
        s.transform.tick(timestamp_ms);

        let cmd = if delta_y < 0.0 {
            ViewerCommand::ZoomIn
        } else if delta_y > 0.0 {
            ViewerCommand::ZoomOut
        } else {
            return None;
        };
        self.execute(cmd).then_some(cmd)
    }

    /// Advance the animation clock and fire a pending single tap if its
    /// double-tap window has passed. Returns true while an animation runs.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        let Some(s) = self.session.as_mut() else {
            return false;
        };

        let animating = s.transform.tick(now_ms);
        if let Some(GestureAction::Command(cmd)) = s.gestures.poll(now_ms) {
            self.execute(cmd);
        }
        animating
    }

    // ========================================
    // Image loading
    // ========================================

    /// Host reports a successful load for `key`
    pub fn image_loaded(&mut self, key: &LoadKey) -> bool {
        match self.signal_target(key) {
            Some(s) => s.loads.mark_loaded(key),
            None => false,
        }
    }

    /// Host reports a failed load for `key`; never affects navigation
    pub fn image_failed(&mut self, key: &LoadKey) -> bool {
        match self.signal_target(key) {
            Some(s) => s.loads.mark_failed(key),
            None => false,
        }
    }

    /// Open session that owns the photo named by `key`
    fn signal_target(&mut self, key: &LoadKey) -> Option<&mut ViewerSession> {
        let s = self.session.as_mut()?;
        if !s.contains(&key.photo_id) {
            tracing::debug!("Load signal for unknown photo {} ignored", key.photo_id);
            return None;
        }
        Some(s)
    }

    /// User-requested retry of a failed photo. `Ok(None)` when the photo is
    /// not in the failed state.
    pub fn retry(&mut self, photo_id: &str) -> Result<Option<LoadKey>, ViewerError> {
        let s = self.session.as_mut().ok_or(ViewerError::NotOpen)?;
        if !s.contains(photo_id) {
            return Err(ViewerError::UnknownPhoto(photo_id.to_string()));
        }
        Ok(s.loads.retry(photo_id))
    }

    // ========================================
    // Read model
    // ========================================

    pub fn current_index(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.sequencer.current_index())
    }

    pub fn current_photo(&self) -> Option<&Photo> {
        self.session.as_ref()?.sequencer.current_photo()
    }

    pub fn photo_count(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.sequencer.len())
    }

    pub fn can_navigate(&self) -> bool {
        self.session.as_ref().map_or(false, |s| s.sequencer.can_navigate())
    }

    /// Logical transform of the current photo
    pub fn transform(&self) -> Option<TransformState> {
        self.session.as_ref().map(|s| s.transform.state())
    }

    /// Animated transform to draw this frame
    pub fn displayed_transform(&self) -> Option<TransformState> {
        self.session.as_ref().map(|s| s.transform.displayed())
    }

    pub fn is_animating(&self) -> bool {
        self.session.as_ref().map_or(false, |s| s.transform.is_animating())
    }

    /// Load state of a photo in the open sequence
    pub fn load_state(&self, photo_id: &str) -> Option<LoadState> {
        let s = self.session.as_ref().filter(|s| s.contains(photo_id))?;
        Some(s.loads.state(photo_id))
    }

    pub fn load_key(&self, photo_id: &str) -> Option<LoadKey> {
        let s = self.session.as_ref().filter(|s| s.contains(photo_id))?;
        Some(s.loads.key(photo_id))
    }

    /// Key the host should tag the current image element with
    pub fn current_load_key(&self) -> Option<LoadKey> {
        let s = self.session.as_ref()?;
        s.current_photo_id().map(|id| s.loads.key(id))
    }

    /// Inline error for a failed photo
    pub fn load_error(&self, photo_id: &str) -> Option<ViewerError> {
        self.session.as_ref()?.loads.error(photo_id)
    }

    pub fn show_info_panel(&self) -> bool {
        self.session.as_ref().map_or(false, |s| s.show_info_panel)
    }

    pub fn show_overlay(&self) -> bool {
        self.session.as_ref().map_or(false, |s| s.show_overlay)
    }

    /// Horizontal offset of an in-progress swipe, for drag feedback
    pub fn swipe_offset(&self) -> f32 {
        self.session.as_ref().map_or(0.0, |s| s.gestures.swipe_offset())
    }

    pub fn snapshot(&self) -> ViewerSnapshot {
        let current_photo_id = self.current_photo().map(|p| p.id.clone());
        let load_state = current_photo_id.as_deref().and_then(|id| self.load_state(id));

        ViewerSnapshot {
            is_open: self.is_open(),
            current_index: self.current_index(),
            photo_count: self.photo_count(),
            current_photo_id,
            transform: self.transform(),
            displayed_transform: self.displayed_transform(),
            load_state,
            load_key: self.current_load_key(),
            show_info_panel: self.show_info_panel(),
            show_overlay: self.show_overlay(),
            swipe_offset: self.swipe_offset(),
            can_navigate: self.can_navigate(),
            animating: self.is_animating(),
        }
    }
}

impl Default for ViewerController {
    fn default() -> Self {
        Self::from_validated(ViewerConfig::default())
    }
}
