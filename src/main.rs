//! Rate-limited forwarding gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                   GATEWAY                    │
//!                      │                                              │
//!   Client Request     │  ┌──────────┐   ┌──────────┐   ┌──────────┐  │
//!   ───────────────────┼─▶│  origin  │──▶│ handler  │──▶│  token   │  │
//!                      │  │  policy  │   │ (parse)  │   │  bucket  │  │
//!                      │  └──────────┘   └──────────┘   └────┬─────┘  │
//!                      │                                     │        │
//!                      │                                     ▼        │
//!   Client Response    │  ┌──────────┐   ┌──────────┐   ┌──────────┐  │
//!   ◀──────────────────┼──│ response │◀──│ upstream │◀──│ validate │  │
//!                      │  │ mapping  │   │  client  │   │ payload  │  │
//!                      │  └──────────┘   └────┬─────┘   └──────────┘  │
//!                      └──────────────────────┼───────────────────────┘
//!                                             ▼
//!                                      Upstream REST API
//! ```

use std::path::PathBuf;

use clap::Parser;

use todo_gateway::config::load_config;
use todo_gateway::lifecycle::launch;
use todo_gateway::observability::logging;

#[derive(Parser)]
#[command(name = "todo-gateway")]
#[command(about = "Rate-limited forwarding gateway for a remote todo API", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability.log_level);

    tracing::info!("todo-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        rate_limit_enabled = config.rate_limit.enabled,
        capacity = config.rate_limit.capacity,
        refill_interval_ms = config.rate_limit.refill_interval_ms,
        "Configuration loaded"
    );
    tracing::debug!(
        credential_header = %config.upstream.credential_header,
        credential_env = %config.upstream.api_key_env,
        "Upstream credential resolved"
    );

    launch(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
