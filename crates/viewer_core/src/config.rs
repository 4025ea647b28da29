//! Viewer configuration

use crate::command::ViewerCommand;
use crate::ViewerError;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Main viewer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub gesture: GestureConfig,
    pub transform: TransformConfig,
    pub animation: AnimationConfig,
    /// Command id -> key names
    pub keybindings: HashMap<String, Vec<String>>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            gesture: GestureConfig::default(),
            transform: TransformConfig::default(),
            animation: AnimationConfig::default(),
            keybindings: default_keybindings(),
        }
    }
}

/// Thresholds used to classify pointer interactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Horizontal offset (px) past which a release navigates
    pub swipe_distance: f32,
    /// Horizontal release velocity (px/s) past which a release navigates
    pub swipe_velocity: f32,
    /// Vertical offset (px) for the info-panel swipe
    pub vertical_swipe_distance: f32,
    /// Maximum travel (px) for an interaction to still count as a tap
    pub tap_slop: f32,
    /// Maximum gap between two taps of a double tap
    pub double_tap_window_ms: u64,
    /// Maximum distance (px) between two taps of a double tap
    pub double_tap_slop: f32,
    /// Motion samples older than this are ignored for release velocity
    pub velocity_window_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            swipe_distance: 50.0,
            swipe_velocity: 300.0,
            vertical_swipe_distance: 50.0,
            tap_slop: 10.0,
            double_tap_window_ms: 300,
            double_tap_slop: 30.0,
            velocity_window_ms: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    pub min_scale: f32,
    pub max_scale: f32,
    /// Scale change per zoom in/out command
    pub zoom_step: f32,
    /// Scale reached by a double tap from the identity transform
    pub double_tap_scale: f32,
    /// Pan range gained per unit of scale above 1.0 (px)
    pub pan_factor: f32,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.25,
            max_scale: 3.0,
            zoom_step: 0.5,
            double_tap_scale: 2.0,
            pan_factor: 200.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub enabled: bool,
    pub duration_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration_ms: 200,
        }
    }
}

impl ViewerConfig {
    /// Load configuration from the default location
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("Using default configuration");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        tracing::info!("Configuration loaded from {:?}", path);
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to an explicit file
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::info!("Configuration saved to {:?}", path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("com", "Wayfarer", "PhotoViewer")
            .map(|dirs| dirs.config_dir().join("viewer.toml"))
            .unwrap_or_else(|| PathBuf::from("./viewer.toml"))
    }

    /// Reject values the engine cannot honor
    pub fn validate(&self) -> Result<(), ViewerError> {
        let t = &self.transform;
        if !(t.min_scale > 0.0 && t.min_scale <= 1.0 && t.max_scale >= 1.0) {
            return Err(ViewerError::Config(format!(
                "scale range [{}, {}] must be positive and contain 1.0",
                t.min_scale, t.max_scale
            )));
        }
        if !(t.double_tap_scale > 1.0 && t.double_tap_scale <= t.max_scale) {
            return Err(ViewerError::Config(format!(
                "double_tap_scale {} must lie in (1.0, {}]",
                t.double_tap_scale, t.max_scale
            )));
        }
        if t.zoom_step <= 0.0 || t.pan_factor < 0.0 {
            return Err(ViewerError::Config(
                "zoom_step must be positive and pan_factor non-negative".to_string(),
            ));
        }

        let g = &self.gesture;
        if g.swipe_distance < 0.0
            || g.swipe_velocity < 0.0
            || g.vertical_swipe_distance < 0.0
            || g.tap_slop < 0.0
            || g.double_tap_slop < 0.0
        {
            return Err(ViewerError::Config("gesture thresholds must be non-negative".to_string()));
        }

        for id in self.keybindings.keys() {
            if ViewerCommand::from_id(id).is_none() {
                return Err(ViewerError::Config(format!("unknown command in keybindings: {}", id)));
            }
        }

        Ok(())
    }
}

fn default_keybindings() -> HashMap<String, Vec<String>> {
    let mut kb = HashMap::new();

    // Navigation
    kb.insert("nav.next".into(), vec!["ArrowRight".into()]);
    kb.insert("nav.prev".into(), vec!["ArrowLeft".into()]);
    kb.insert("nav.first".into(), vec!["Home".into()]);
    kb.insert("nav.last".into(), vec!["End".into()]);

    // View
    kb.insert("view.zoom_in".into(), vec!["+".into(), "=".into()]);
    kb.insert("view.zoom_out".into(), vec!["-".into()]);
    kb.insert("view.reset".into(), vec!["0".into()]);
    kb.insert("view.rotate".into(), vec!["r".into()]);
    kb.insert("view.toggle_info".into(), vec!["i".into()]);

    // Session
    kb.insert("viewer.close".into(), vec!["Escape".into()]);

    kb
}
