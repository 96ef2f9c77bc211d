// Copyright 2025 Timesample Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Timesample server binary: loads the snapshot, serves the HTTP API, and
//! flushes the snapshot on shutdown.

mod api;
mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use timesample_query::SampleQuery;
use timesample_storage::{MemoryCounterStore, SampleStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api::AppState;
use crate::config::ServerConfig;

#[derive(Debug, Parser)]
#[command(name = "timesample-server", about = "Time-bucketed sample counter service")]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, env = "TIMESAMPLE_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overrides the config file.
    #[arg(long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = ServerConfig::load(cli.config.as_deref())?;
    if let Some(listen) = cli.listen {
        config.listen = listen;
    }
    std::fs::create_dir_all(&config.data_dir)?;

    let snapshot_path = config.snapshot_path();
    let backend = Arc::new(MemoryCounterStore::load(&snapshot_path)?);
    let store = SampleStore::new(Arc::clone(&backend), config.sample.clone());
    let state = AppState {
        query: Arc::new(SampleQuery::new(store)),
        backend: Arc::clone(&backend),
        started_at: Instant::now(),
    };

    let app = api::router(state);
    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    info!(addr = %config.listen, "timesample server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    backend.flush(&snapshot_path)?;
    info!(path = %snapshot_path.display(), "snapshot flushed on shutdown");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
