//! Change relay entry point
//!
//! Run with:
//! ```bash
//! cargo run -p crew-relay
//! ```
//!
//! Configuration is loaded from environment variables.

use crew_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "Relay failed");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        env = ?config.app.env,
        channel = %config.relay.notify_channel,
        full_delete_payloads = config.social.full_delete_payloads,
        "Configuration loaded"
    );

    crew_relay::run(config).await?;
    Ok(())
}
