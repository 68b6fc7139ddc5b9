//! Engine binary for the Reverie simulation.
//!
//! This is the main entry point that wires together the tick scheduler,
//! the four stock subsystems, the sigil registry, the event bus, and the
//! reflective loop. It loads configuration, opens the append-only tick
//! log, and runs the simulation loop until a termination condition is
//! met.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `reverie-config.yaml`
//! 3. Build the engine with the stock subsystems
//! 4. Seed the starter sigils
//! 5. Open the tick log
//! 6. Install the Ctrl-C stop handler
//! 7. Run the simulation loop
//! 8. Log the result

mod error;
mod tick_log;

use std::path::Path;

use reverie_core::config::EngineConfig;
use reverie_core::reflect::LoggingInvoker;
use reverie_core::runner::{self, StopHandle};
use reverie_core::scheduler::Engine;
use reverie_sigils::SigilPriority;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::tick_log::TickLogWriter;

/// Application entry point for the Reverie engine.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation itself
/// fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("reverie-engine starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        tick_interval_ms = config.world.tick_interval_ms,
        max_ticks = config.world.max_ticks,
        "configuration loaded"
    );

    let tick_log_path = config.logging.tick_log_path.clone();

    // 3. Build the engine with the stock subsystems.
    let mut engine = Engine::with_default_subsystems(config);
    info!("engine assembled: pulse, schema, memory, visual");

    // 4. Seed the starter sigils. The persistent one anchors the
    //    reflective loop's execution path from the first tick.
    engine
        .registry_mut()
        .register_with("core.presence", 1.0, 0.0, 40.0, SigilPriority::Persistent, 0);
    engine.registry_mut().register("warmup.focus", 0);
    info!(sigils = engine.registry().len(), "starter sigils registered");

    // 5. Open the tick log.
    let mut tick_log =
        TickLogWriter::open(Path::new(&tick_log_path)).map_err(EngineError::from)?;
    info!(path = %tick_log_path, "tick log opened");

    // 6. Install the Ctrl-C stop handler.
    let stop = StopHandle::new();
    {
        let stop = stop.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, stopping after current tick");
                stop.request_stop();
            }
        });
    }

    // 7. Run the simulation.
    let mut invoker = LoggingInvoker;
    let result = runner::run_simulation(&mut engine, &mut invoker, &stop, &mut tick_log)
        .await
        .map_err(EngineError::from)?;

    // 8. Log the result.
    runner::log_simulation_end(&result);
    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        events_retained = engine.bus().history_len(),
        "reverie-engine shutdown complete"
    );

    Ok(())
}

/// Load the engine configuration from `reverie-config.yaml`.
///
/// Looks for the config file relative to the current working directory;
/// missing file means defaults.
fn load_config() -> Result<EngineConfig, EngineError> {
    let config_path = Path::new("reverie-config.yaml");
    if config_path.exists() {
        let config = EngineConfig::from_file(config_path)?;
        Ok(config)
    } else {
        info!("config file not found, using defaults");
        Ok(EngineConfig::default())
    }
}
