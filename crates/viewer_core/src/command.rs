//! Viewer commands and key binding resolution

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Discrete action the controller can execute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewerCommand {
    Next,
    Previous,
    First,
    Last,
    ZoomIn,
    ZoomOut,
    ResetTransform,
    Rotate,
    DoubleTapZoom,
    ToggleInfoPanel,
    ShowInfoPanel,
    HideInfoPanel,
    ToggleOverlay,
    RetryLoad,
    Close,
}

impl ViewerCommand {
    // Navigation commands
    pub const NAV_NEXT: &'static str = "nav.next";
    pub const NAV_PREV: &'static str = "nav.prev";
    pub const NAV_FIRST: &'static str = "nav.first";
    pub const NAV_LAST: &'static str = "nav.last";

    // View commands
    pub const VIEW_ZOOM_IN: &'static str = "view.zoom_in";
    pub const VIEW_ZOOM_OUT: &'static str = "view.zoom_out";
    pub const VIEW_RESET: &'static str = "view.reset";
    pub const VIEW_ROTATE: &'static str = "view.rotate";
    pub const VIEW_DOUBLE_TAP_ZOOM: &'static str = "view.double_tap_zoom";
    pub const VIEW_TOGGLE_INFO: &'static str = "view.toggle_info";
    pub const VIEW_SHOW_INFO: &'static str = "view.show_info";
    pub const VIEW_HIDE_INFO: &'static str = "view.hide_info";
    pub const VIEW_TOGGLE_OVERLAY: &'static str = "view.toggle_overlay";

    // Session commands
    pub const VIEWER_RETRY: &'static str = "viewer.retry";
    pub const VIEWER_CLOSE: &'static str = "viewer.close";

    pub fn id(&self) -> &'static str {
        match self {
            ViewerCommand::Next => Self::NAV_NEXT,
            ViewerCommand::Previous => Self::NAV_PREV,
            ViewerCommand::First => Self::NAV_FIRST,
            ViewerCommand::Last => Self::NAV_LAST,
            ViewerCommand::ZoomIn => Self::VIEW_ZOOM_IN,
            ViewerCommand::ZoomOut => Self::VIEW_ZOOM_OUT,
            ViewerCommand::ResetTransform => Self::VIEW_RESET,
            ViewerCommand::Rotate => Self::VIEW_ROTATE,
            ViewerCommand::DoubleTapZoom => Self::VIEW_DOUBLE_TAP_ZOOM,
            ViewerCommand::ToggleInfoPanel => Self::VIEW_TOGGLE_INFO,
            ViewerCommand::ShowInfoPanel => Self::VIEW_SHOW_INFO,
            ViewerCommand::HideInfoPanel => Self::VIEW_HIDE_INFO,
            ViewerCommand::ToggleOverlay => Self::VIEW_TOGGLE_OVERLAY,
            ViewerCommand::RetryLoad => Self::VIEWER_RETRY,
            ViewerCommand::Close => Self::VIEWER_CLOSE,
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        let cmd = match id {
            Self::NAV_NEXT => ViewerCommand::Next,
            Self::NAV_PREV => ViewerCommand::Previous,
            Self::NAV_FIRST => ViewerCommand::First,
            Self::NAV_LAST => ViewerCommand::Last,
            Self::VIEW_ZOOM_IN => ViewerCommand::ZoomIn,
            Self::VIEW_ZOOM_OUT => ViewerCommand::ZoomOut,
            Self::VIEW_RESET => ViewerCommand::ResetTransform,
            Self::VIEW_ROTATE => ViewerCommand::Rotate,
            Self::VIEW_DOUBLE_TAP_ZOOM => ViewerCommand::DoubleTapZoom,
            Self::VIEW_TOGGLE_INFO => ViewerCommand::ToggleInfoPanel,
            Self::VIEW_SHOW_INFO => ViewerCommand::ShowInfoPanel,
            Self::VIEW_HIDE_INFO => ViewerCommand::HideInfoPanel,
            Self::VIEW_TOGGLE_OVERLAY => ViewerCommand::ToggleOverlay,
            Self::VIEWER_RETRY => ViewerCommand::RetryLoad,
            Self::VIEWER_CLOSE => ViewerCommand::Close,
            _ => return None,
        };
        Some(cmd)
    }

    /// Commands that move through the photo sequence
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            ViewerCommand::Next | ViewerCommand::Previous | ViewerCommand::First | ViewerCommand::Last
        )
    }
}

/// Keyboard event as delivered by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Key name, e.g. "ArrowRight", "Escape", "+", "r"
    pub key: String,
}

impl KeyEvent {
    pub fn new(key: &str) -> Self {
        Self { key: key.to_string() }
    }
}

/// Resolves key names to commands
#[derive(Debug, Clone, Default)]
pub struct KeyBindings {
    /// Lowercased key name -> command
    bindings: HashMap<String, ViewerCommand>,
}

impl KeyBindings {
    /// Build from a command id -> keys table
    pub fn new(table: &HashMap<String, Vec<String>>) -> Self {
        // Invert the table: command -> keys becomes key -> command
        let mut bindings = HashMap::new();

        for (id, keys) in table {
            let Some(cmd) = ViewerCommand::from_id(id) else {
                tracing::warn!("Ignoring keybinding for unknown command: {}", id);
                continue;
            };
            for key in keys {
                bindings.insert(normalize_key(key), cmd);
            }
        }

        Self { bindings }
    }

    /// Resolve a key event to a command
    pub fn resolve(&self, event: &KeyEvent) -> Option<ViewerCommand> {
        let cmd = self.bindings.get(&normalize_key(&event.key)).copied();
        tracing::debug!("Key pressed: {} -> {:?}", event.key, cmd);
        cmd
    }
}

/// Map host-specific spellings onto one canonical lowercase name
fn normalize_key(key: &str) -> String {
    match key {
        "Left" => "arrowleft".to_string(),
        "Right" => "arrowright".to_string(),
        "Esc" => "escape".to_string(),
        "Plus" => "+".to_string(),
        "Minus" => "-".to_string(),
        other => other.to_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ViewerConfig;

    #[test]
    fn test_id_round_trip() {
        let all = [
            ViewerCommand::Next,
            ViewerCommand::Previous,
            ViewerCommand::First,
            ViewerCommand::Last,
            ViewerCommand::ZoomIn,
            ViewerCommand::ZoomOut,
            ViewerCommand::ResetTransform,
            ViewerCommand::Rotate,
            ViewerCommand::DoubleTapZoom,
            ViewerCommand::ToggleInfoPanel,
            ViewerCommand::ShowInfoPanel,
            ViewerCommand::HideInfoPanel,
            ViewerCommand::ToggleOverlay,
            ViewerCommand::RetryLoad,
            ViewerCommand::Close,
        ];
        for cmd in all {
            assert_eq!(ViewerCommand::from_id(cmd.id()), Some(cmd));
        }
        assert_eq!(ViewerCommand::from_id("nav.sideways"), None);
    }

    #[test]
    fn test_default_bindings() {
        let kb = KeyBindings::new(&ViewerConfig::default().keybindings);

        assert_eq!(kb.resolve(&KeyEvent::new("ArrowLeft")), Some(ViewerCommand::Previous));
        assert_eq!(kb.resolve(&KeyEvent::new("ArrowRight")), Some(ViewerCommand::Next));
        assert_eq!(kb.resolve(&KeyEvent::new("Escape")), Some(ViewerCommand::Close));
        assert_eq!(kb.resolve(&KeyEvent::new("+")), Some(ViewerCommand::ZoomIn));
        assert_eq!(kb.resolve(&KeyEvent::new("=")), Some(ViewerCommand::ZoomIn));
        assert_eq!(kb.resolve(&KeyEvent::new("-")), Some(ViewerCommand::ZoomOut));
        assert_eq!(kb.resolve(&KeyEvent::new("0")), Some(ViewerCommand::ResetTransform));
        assert_eq!(kb.resolve(&KeyEvent::new("r")), Some(ViewerCommand::Rotate));
        assert_eq!(kb.resolve(&KeyEvent::new("i")), Some(ViewerCommand::ToggleInfoPanel));
        assert_eq!(kb.resolve(&KeyEvent::new("x")), None);
    }

    #[test]
    fn test_key_aliases() {
        let kb = KeyBindings::new(&ViewerConfig::default().keybindings);
        assert_eq!(kb.resolve(&KeyEvent::new("Right")), Some(ViewerCommand::Next));
        assert_eq!(kb.resolve(&KeyEvent::new("Esc")), Some(ViewerCommand::Close));
        assert_eq!(kb.resolve(&KeyEvent::new("R")), Some(ViewerCommand::Rotate));
    }

    #[test]
    fn test_unknown_command_ids_are_skipped() {
        let mut table = HashMap::new();
        table.insert("view.explode".to_string(), vec!["x".to_string()]);
        table.insert("nav.next".to_string(), vec!["n".to_string()]);

        let kb = KeyBindings::new(&table);
        assert_eq!(kb.resolve(&KeyEvent::new("x")), None);
        assert_eq!(kb.resolve(&KeyEvent::new("n")), Some(ViewerCommand::Next));
    }
}
