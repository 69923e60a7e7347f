//! `Taskboard` demo server.
//!
//! An axum HTTP server speaking the todo JSON API the client expects, over
//! an in-memory list. Writes are fabricated unless `--persist-writes` is
//! given.
//!
//! # Usage
//!
//! ```bash
//! # Run on default address 0.0.0.0:9000
//! cargo run --bin taskboard-server
//!
//! # Keep writes and bind locally
//! cargo run --bin taskboard-server -- --bind 127.0.0.1:8080 --persist-writes
//! ```

use std::sync::Arc;

use clap::Parser;
use taskboard_server::config::{ServerCliArgs, ServerConfig};
use taskboard_server::server::{self, ServerState};
use taskboard_server::store::TodoStore;

#[tokio::main]
async fn main() {
    let cli = ServerCliArgs::parse();

    let config = match ServerConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(
        addr = %config.bind_addr,
        persist_writes = config.persist_writes,
        seed_demo = config.seed_demo,
        "starting taskboard server"
    );

    let store = if config.seed_demo {
        TodoStore::with_demo_tasks(config.persist_writes)
    } else {
        TodoStore::new(Vec::new(), config.persist_writes)
    };
    let state = Arc::new(ServerState::new(store));

    match server::start_server_with_state(&config.bind_addr, state).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "todo server listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "todo server task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start todo server");
            std::process::exit(1);
        }
    }
}
