use anyhow::Result;
use ecocycle_classifier::{config, init_tracing, server};
use std::path::Path;
use tracing::info;

/// Execute the start command
///
/// Configuration is loaded and validated before anything else; a missing API key
/// stops the process here, before the listener is bound.
pub async fn execute(config_path: &Path) -> Result<()> {
    let cfg = config::load_config(config_path)?;

    init_tracing(&cfg.server.log_level, &cfg.server.log_format);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path.display(),
        "Starting EcoCycle classifier"
    );

    // Blocks until shutdown
    server::start_server(cfg).await?;

    Ok(())
}
