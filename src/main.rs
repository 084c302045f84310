//! hygrograph: live humidity/temperature telemetry with rolling regressions.
//!
//! Run with:  `RUST_LOG=info hygrograph`

use anyhow::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // RUST_LOG controls verbosity (default: info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("hygrograph v{} starting", env!("CARGO_PKG_VERSION"));

    let config = hygro_config::load(hygro_config::default_path()).unwrap_or_else(|e| {
        tracing::warn!("{e}; using defaults");
        hygro_config::MonitorConfig::default()
    });
    tracing::info!("Link: {} @ {} baud", config.link.port, config.link.baud_rate);

    hygro_monitor::run(config)?;
    Ok(())
}
