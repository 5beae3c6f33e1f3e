//! hotkey-edge: tick-driven hotkey host
//!
//! Loads the mod settings, builds a listener for every configured
//! hotkey and its inverse variant, then replays recorded input through
//! the frame loop:
//! - One tick per `HOTKEY_EDGE_TICK_MS` (default 16ms)
//! - Press/hold/release callbacks run on the tick after their edge
//! - Stops when the replay runs out or on SIGTERM/SIGINT

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use hotkey_edge::config::{Config, RuntimeOptions, Settings};
use hotkey_edge::frame::FrameLoop;
use hotkey_edge::input::ScriptedInput;
use hotkey_edge::lifecycle::ShutdownSignal;
use hotkey_edge::logging;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let options = RuntimeOptions::from_env()?;

    let settings = Settings::load(&options.settings_path).with_context(|| {
        format!("failed to load settings from {}", options.settings_path.display())
    })?;

    // Logging verbosity comes from the settings file itself, and must be
    // in place before the rest of the config is resolved and logged
    logging::init(settings.logging_level(&options.mod_name));
    let config = Config::from_settings(&settings, &options.mod_name);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        mod_name = %config.mod_name,
        level = %config.logging_level,
        "hotkey-edge starting"
    );

    if config.inverse_invalid {
        warn!(
            "the hotkey for inverting operations found in the settings file is invalid, reverting to default: Shift"
        );
    }

    let replay_path = options
        .replay_path
        .as_deref()
        .context("HOTKEY_EDGE_REPLAY must point to a replay file")?;
    let input = ScriptedInput::load(replay_path)?;

    let mut frames = FrameLoop::new(input);
    for listener in config.listeners() {
        info!(hotkey = listener.name(), binding = %listener.binding(), "hotkey registered");
        frames.add_listener(listener);
    }
    if frames.listeners().is_empty() {
        warn!("no hotkeys configured, replay will produce no events");
    }

    let shutdown = ShutdownSignal::new();

    tokio::select! {
        reason = frames.run(options.tick, None) => {
            info!(?reason, "replay finished");
        }

        result = shutdown.wait() => {
            match result {
                Ok(()) => info!("shutdown signal received"),
                Err(e) => error!(?e, "failed to register signal handlers"),
            }
        }
    }

    info!(ticks = frames.ticks(), "hotkey-edge stopped");

    Ok(())
}
