//! Photo Viewer replay tool
//!
//! Feeds a scripted session (JSON) through the viewer engine and prints the
//! viewer snapshot after every step, one JSON object per line.

mod script;

use anyhow::Result;
use std::io::Write;
use std::path::PathBuf;
use viewer_core::{ViewerConfig, ViewerController};

const HELP: &str = "\
viewer_replay - replay a scripted photo viewer session

USAGE:
  viewer_replay [OPTIONS] <SCRIPT>

OPTIONS:
  --config <PATH>     Viewer configuration (TOML), defaults to the user config
  --log-level <LEVEL> Log filter when RUST_LOG is unset [default: info]
  --no-file-log       Log to stderr only
  -h, --help          Print help
";

struct Args {
    script: PathBuf,
    config: Option<PathBuf>,
    log_level: Option<String>,
    file_logging: bool,
}

fn parse_args() -> Result<Option<Args>> {
    let mut args = pico_args::Arguments::from_env();

    if args.contains(["-h", "--help"]) {
        print!("{}", HELP);
        return Ok(None);
    }

    let config = args.opt_value_from_str("--config")?;
    let log_level = args.opt_value_from_str("--log-level")?;
    let file_logging = !args.contains("--no-file-log");
    let script = args.free_from_str()?;

    let rest = args.finish();
    if !rest.is_empty() {
        anyhow::bail!("Unexpected arguments: {:?}", rest);
    }

    Ok(Some(Args {
        script,
        config,
        log_level,
        file_logging,
    }))
}

fn main() -> Result<()> {
    let Some(args) = parse_args()? else {
        return Ok(());
    };

    // Initialize logging and panic hook first
    let mut log_config = viewer_log::LogConfig {
        file_logging: args.file_logging,
        ..Default::default()
    };
    if let Some(level) = args.log_level {
        log_config.level = level;
    }
    let _log_guard = viewer_log::init(&log_config)?;

    tracing::info!("viewer_replay starting...");

    let config = match &args.config {
        Some(path) => ViewerConfig::load_from(path)?,
        None => ViewerConfig::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            ViewerConfig::default()
        }),
    };

    let script = script::Script::load(&args.script)?;
    let mut viewer = ViewerController::new(config)?.on_close(|| tracing::info!("Viewer unmounted"));

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    script::replay(&script, &mut viewer, &mut out)?;
    out.flush()?;

    Ok(())
}
