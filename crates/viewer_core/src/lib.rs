//! Photo Viewer Core Logic
//!
//! This crate contains:
//! - Viewer session lifecycle and read model
//! - Command system and keybindings
//! - Configuration
//! - Error types
//! - Navigation over the photo sequence
//! - Zoom / pan / rotation transform with animation
//! - Pointer gesture interpretation
//! - Per-photo load state

pub mod animation;
pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod gesture;
pub mod load_state;
pub mod navigation;
pub mod photo;
pub mod transform;

pub use animation::Animator;
pub use command::{KeyBindings, KeyEvent, ViewerCommand};
pub use config::{AnimationConfig, GestureConfig, TransformConfig, ViewerConfig};
pub use controller::{
    InputListeners, ListenerGuard, SessionState, SharedListeners, ViewerController,
    ViewerSnapshot,
};
pub use error::ViewerError;
pub use gesture::{
    GestureAction, GestureInterpreter, GestureState, PointerEvent, PointerKind, PointerPhase,
};
pub use load_state::{ImageLoadState, LoadKey, LoadState};
pub use navigation::{Direction, NavigationSequencer};
pub use photo::{GeoLocation, Photo, PhotoSequence};
pub use transform::{TransformBounds, TransformEngine, TransformState};
