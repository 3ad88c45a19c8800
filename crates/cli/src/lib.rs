//! Terminal front end for the radar telemetry session.
//!
//! Wires configuration into a [`ConnectionSession`], subscribes to its
//! snapshot stream, and reports state changes on the log. Rendering
//! proper (radar drawing, player cards) lives elsewhere; this binary is
//! the headless consumer used for operating and debugging the stream.

pub mod cli;
pub mod logging;

use anyhow::Context;
use cli::Cli;
use radar_core::{MapCatalog, SessionState, SettingsStore};
use radar_runtime::{ConnectionSession, HttpAssetLoader, SessionConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Default settings location: `<config dir>/webradar/settings.json`.
pub fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("webradar")
        .join("settings.json")
}

/// Runs one session to its terminal state.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings_path = cli.settings.clone().unwrap_or_else(default_settings_path);
    let store = SettingsStore::load(&settings_path)
        .with_context(|| format!("loading settings from {}", settings_path.display()))?;

    let config = SessionConfig {
        host: cli.host,
        port: cli.port,
        path: cli.path,
        connect_timeout: Duration::from_millis(cli.timeout_ms),
    };

    let loader = Arc::new(HttpAssetLoader::new(&cli.assets_url));
    let mut session = ConnectionSession::new(
        config,
        MapCatalog::default(),
        loader,
        store.settings().clone(),
    );

    let mut snapshots = session.subscribe();
    let reporter = tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow_and_update().clone();
            report(&snapshot);
        }
    });

    let result = session.run().await;

    // Dropping the session drops the snapshot sender, ending the reporter.
    drop(session);
    let _ = reporter.await;

    result.map_err(Into::into)
}

fn report(state: &SessionState) {
    match &state.map {
        Some(map) if map.is_valid() => {
            info!(
                target = "webradar",
                map = %map,
                players = state.players.len(),
                bomb = state.bomb.is_some(),
                latency_ms = state.latency_ms,
                "frame"
            );
        }
        _ => info!(target = "webradar", "{}", state.status_line()),
    }
}
