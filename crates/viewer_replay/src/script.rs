//! Scripted viewer sessions

use anyhow::Context;
use serde::Deserialize;
use std::io::Write;
use std::path::Path;
use viewer_core::{
    KeyEvent, Photo, PhotoSequence, PointerEvent, PointerKind, PointerPhase, ViewerCommand,
    ViewerController,
};

/// A session to replay: the photos to open on and the input to feed
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    pub photos: Vec<Photo>,
    #[serde(default)]
    pub initial_photo_id: Option<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One host-side event
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    Key {
        key: String,
        #[serde(default)]
        at_ms: u64,
    },
    Pointer {
        phase: PointerPhase,
        x: f32,
        y: f32,
        at_ms: u64,
        #[serde(default = "one")]
        pointer_count: u8,
        #[serde(default)]
        kind: PointerKind,
    },
    Wheel {
        delta_y: f32,
        at_ms: u64,
    },
    Tick {
        at_ms: u64,
    },
    /// Load outcome for `photo_id`, or the current photo
    Loaded {
        #[serde(default)]
        photo_id: Option<String>,
    },
    Failed {
        #[serde(default)]
        photo_id: Option<String>,
    },
    Retry,
    Close,
}

fn one() -> u8 {
    1
}

impl Script {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        let script = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse script {}", path.display()))?;
        Ok(script)
    }
}

/// Open `viewer` on the script's photos and apply each step, writing one
/// snapshot JSON line per step (plus one for the initial state).
pub fn replay(
    script: &Script,
    viewer: &mut ViewerController,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let photos = PhotoSequence::new(script.photos.clone());
    viewer.open(photos, script.initial_photo_id.as_deref())?;
    write_snapshot(viewer, out)?;

    for (n, step) in script.steps.iter().enumerate() {
        tracing::debug!("Step {}: {:?}", n, step);
        apply(viewer, step);
        write_snapshot(viewer, out)?;
    }

    tracing::info!("Replayed {} steps", script.steps.len());
    Ok(())
}

fn apply(viewer: &mut ViewerController, step: &Step) {
    match step {
        Step::Key { key, at_ms } => {
            viewer.tick(*at_ms);
            viewer.handle_key(&KeyEvent::new(key));
        }
        Step::Pointer {
            phase,
            x,
            y,
            at_ms,
            pointer_count,
            kind,
        } => {
            let event =
                PointerEvent::new(*phase, *x, *y, *at_ms, *kind).with_pointer_count(*pointer_count);
            viewer.handle_pointer(&event);
        }
        Step::Wheel { delta_y, at_ms } => {
            viewer.handle_wheel(*delta_y, *at_ms);
        }
        Step::Tick { at_ms } => {
            viewer.tick(*at_ms);
        }
        Step::Loaded { photo_id } => {
            if let Some(key) = load_key(viewer, photo_id.as_deref()) {
                viewer.image_loaded(&key);
            }
        }
        Step::Failed { photo_id } => {
            if let Some(key) = load_key(viewer, photo_id.as_deref()) {
                viewer.image_failed(&key);
            }
        }
        Step::Retry => {
            viewer.execute(ViewerCommand::RetryLoad);
        }
        Step::Close => {
            viewer.execute(ViewerCommand::Close);
        }
    }
}

fn load_key(viewer: &ViewerController, photo_id: Option<&str>) -> Option<viewer_core::LoadKey> {
    match photo_id {
        Some(id) => viewer.load_key(id),
        None => viewer.current_load_key(),
    }
}

fn write_snapshot(viewer: &ViewerController, out: &mut impl Write) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *out, &viewer.snapshot())?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn run(script: &str) -> Vec<Value> {
        let script: Script = serde_json::from_str(script).unwrap();
        let mut viewer = ViewerController::default();
        let mut out = Vec::new();
        replay(&script, &mut viewer, &mut out).unwrap();

        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    const PHOTOS: &str = r#"[
        {"id": "A", "source_locator": "a.jpg"},
        {"id": "B", "source_locator": "b.jpg", "caption": "Harbour at dusk"},
        {"id": "C", "source_locator": "c.jpg"}
    ]"#;

    #[test]
    fn test_keyboard_session() {
        let script = format!(
            r#"{{"photos": {}, "initial_photo_id": "B", "steps": [
                {{"step": "key", "key": "ArrowRight"}},
                {{"step": "key", "key": "ArrowRight"}},
                {{"step": "key", "key": "Escape"}},
                {{"step": "key", "key": "ArrowRight"}}
            ]}}"#,
            PHOTOS
        );
        let lines = run(&script);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0]["current_photo_id"], "B");
        assert_eq!(lines[1]["current_photo_id"], "C");
        assert_eq!(lines[2]["current_index"], 0);
        assert_eq!(lines[3]["is_open"], false);
        assert_eq!(lines[4]["is_open"], false);
    }

    #[test]
    fn test_swipe_and_load_failure() {
        let script = format!(
            r#"{{"photos": {}, "steps": [
                {{"step": "pointer", "phase": "start", "x": 300, "y": 200, "at_ms": 0, "kind": "touch"}},
                {{"step": "pointer", "phase": "move", "x": 220, "y": 205, "at_ms": 100, "kind": "touch"}},
                {{"step": "pointer", "phase": "end", "x": 220, "y": 205, "at_ms": 600, "kind": "touch"}},
                {{"step": "failed"}},
                {{"step": "retry"}},
                {{"step": "loaded", "photo_id": "B"}}
            ]}}"#,
            PHOTOS
        );
        let lines = run(&script);
        assert_eq!(lines[2]["swipe_offset"], -80.0);
        assert_eq!(lines[3]["current_photo_id"], "B");
        assert_eq!(lines[4]["load_state"]["status"], "failed");
        assert_eq!(lines[4]["load_state"]["retry_count"], 0);
        assert_eq!(lines[5]["load_key"]["retry_count"], 1);
        assert_eq!(lines[6]["load_state"]["status"], "loaded");
    }

    #[test]
    fn test_wheel_and_tick() {
        let script = format!(
            r#"{{"photos": {}, "steps": [
                {{"step": "wheel", "delta_y": -120, "at_ms": 0}},
                {{"step": "tick", "at_ms": 100}},
                {{"step": "tick", "at_ms": 500}}
            ]}}"#,
            PHOTOS
        );
        let lines = run(&script);
        assert_eq!(lines[1]["transform"]["scale"], 1.5);
        assert_eq!(lines[2]["animating"], true);
        assert_eq!(lines[3]["animating"], false);
        assert_eq!(lines[3]["displayed_transform"]["scale"], 1.5);
    }

    #[test]
    fn test_empty_photos_rejected() {
        let script: Script = serde_json::from_str(r#"{"photos": []}"#).unwrap();
        let mut viewer = ViewerController::default();
        let mut out = Vec::new();
        assert!(replay(&script, &mut viewer, &mut out).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn test_load_script_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, format!(r#"{{"photos": {}}}"#, PHOTOS)).unwrap();

        let script = Script::load(&path).unwrap();
        assert_eq!(script.photos.len(), 3);
        assert!(script.steps.is_empty());

        std::fs::write(&path, "not json").unwrap();
        assert!(Script::load(&path).is_err());
    }
}
