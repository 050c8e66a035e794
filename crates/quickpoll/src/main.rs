//! # quickpoll
//!
//! `QuickPoll` server binary: loads settings, opens the database, and starts
//! the HTTP/WebSocket server.

#![deny(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use quickpoll_server::config::ServerConfig;
use quickpoll_server::server::QuickPollServer;
use quickpoll_settings::QuickPollSettings;
use quickpoll_store::ConnectionConfig;

/// `QuickPoll` server.
#[derive(Parser, Debug)]
#[command(name = "quickpoll", about = "Real-time polling server", version)]
struct Cli {
    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, 0 for auto-assign (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the `SQLite` database (overrides settings).
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Settings file (default `~/.quickpoll/settings.json`).
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    /// Settings from file and environment, with CLI flags applied last.
    fn resolve_settings(&self) -> Result<QuickPollSettings> {
        let path = self
            .config
            .clone()
            .unwrap_or_else(quickpoll_settings::settings_path);
        let mut settings = quickpoll_settings::load_settings_from_path(&path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?;

        if let Some(host) = &self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(db_path) = &self.db_path {
            settings.database.path = db_path.to_string_lossy().into_owned();
        }
        Ok(settings)
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let settings = args.resolve_settings()?;

    if settings.logging.json {
        quickpoll_core::logging::init_subscriber_json(&settings.logging.level);
    } else {
        quickpoll_core::logging::init_subscriber(&settings.logging.level);
    }

    let db_path = PathBuf::from(&settings.database.path);
    ensure_parent_dir(&db_path)?;
    let pool = quickpoll_store::new_file(
        &db_path.to_string_lossy(),
        &ConnectionConfig {
            pool_size: settings.database.pool_size,
            busy_timeout_ms: settings.database.busy_timeout_ms,
        },
    )
    .context("Failed to open database")?;
    {
        let conn = pool.get().context("Failed to get DB connection")?;
        let version =
            quickpoll_store::run_migrations(&conn).context("Failed to run migrations")?;
        tracing::info!(path = %db_path.display(), schema_version = version, "database ready");
    }

    let metrics = quickpoll_server::metrics::install_recorder()
        .context("Failed to install metrics recorder")?;

    let config = ServerConfig::from(&settings.server);
    let shutdown_timeout = config.shutdown_timeout();
    let server = QuickPollServer::new(config, pool, Some(metrics));

    let (addr, handle) = server.listen().await.context("Failed to bind server")?;
    tracing::info!("QuickPoll listening on http://{addr}");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutting down...");
    let drained = server
        .shutdown()
        .graceful_shutdown(vec![handle], Some(shutdown_timeout))
        .await;
    if !drained {
        tracing::warn!(
            connections = server.registry().connection_count(),
            "exiting with sessions still open"
        );
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_leave_settings_alone() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::parse_from([
            "quickpoll",
            "--config",
            dir.path().join("missing.json").to_str().unwrap(),
        ]);
        let settings = cli.resolve_settings().unwrap();
        assert_eq!(settings.server.port, QuickPollSettings::default().server.port);
        assert_eq!(settings.database.path, QuickPollSettings::default().database.path);
    }

    #[test]
    fn cli_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"server": {"host": "10.0.0.1", "port": 9000}, "database": {"path": "from-file.db"}}"#,
        )
        .unwrap();

        let cli = Cli::parse_from([
            "quickpoll",
            "--config",
            path.to_str().unwrap(),
            "--port",
            "9100",
            "--db-path",
            "/tmp/cli.db",
        ]);
        let settings = cli.resolve_settings().unwrap();
        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.database.path, "/tmp/cli.db");
    }

    #[test]
    fn invalid_settings_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        let cli = Cli::parse_from(["quickpoll", "--config", path.to_str().unwrap()]);
        assert!(cli.resolve_settings().is_err());
    }

    #[test]
    fn ensure_parent_dir_creates_nested_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("a").join("b").join("poll.db");
        ensure_parent_dir(&db).unwrap();
        assert!(dir.path().join("a").join("b").is_dir());
        ensure_parent_dir(Path::new("bare.db")).unwrap();
    }

    #[tokio::test]
    async fn server_graceful_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("quickpoll.db");
        let pool = quickpoll_store::new_file(&db_path.to_string_lossy(), &ConnectionConfig::default())
            .unwrap();
        {
            let conn = pool.get().unwrap();
            let _ = quickpoll_store::run_migrations(&conn).unwrap();
        }
        let server = QuickPollServer::new(ServerConfig::default(), pool, None);
        let (_, handle) = server.listen().await.unwrap();

        server.shutdown().shutdown();
        tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .expect("shutdown timed out")
            .expect("join error");
    }
}
