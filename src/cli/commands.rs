//! CLI command implementations
//!
//! Startup order for `serve`:
//! 1. Configuration load (file, then `DB_URI`)
//! 2. Store open
//! 3. Optional schema migration
//! 4. HTTP listener

use std::path::Path;
use std::sync::Arc;

use tokio::runtime::Runtime;

use crate::config::{ServiceConfig, StoreBackend};
use crate::http_server::HttpServer;
use crate::observability::{log_event, Event, ObservationScope};
use crate::store::{MemoryStore, PgStore, SpatialStore, MIGRATION_NAME};

use super::args::Command;
use super::errors::{CliError, CliResult};

/// Main CLI entry point; the only function `main.rs` calls
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve {
            config,
            port,
            migrate,
        } => serve(&config, port, migrate),
        Command::Migrate { config } => migrate(&config),
    }
}

/// Load config, open the store and serve HTTP until the listener stops
pub fn serve(config_path: &Path, port: Option<u16>, run_migration: bool) -> CliResult<()> {
    log_event(Event::Startup, &[("version", env!("CARGO_PKG_VERSION"))]);

    let mut config = load_config(config_path)?;
    if let Some(port) = port {
        config.http.port = port;
    }

    runtime()?.block_on(async {
        let store = open_store(&config).await?;
        if run_migration {
            apply_migration(store.as_ref()).await?;
        }

        HttpServer::new(&config, store)
            .start()
            .await
            .map_err(|e| CliError::serve_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Apply the schema migration and exit
pub fn migrate(config_path: &Path) -> CliResult<()> {
    log_event(Event::Startup, &[("version", env!("CARGO_PKG_VERSION"))]);
    let config = load_config(config_path)?;

    runtime()?.block_on(async {
        let store = open_store(&config).await?;
        apply_migration(store.as_ref()).await
    })
}

fn load_config(path: &Path) -> CliResult<ServiceConfig> {
    let config = ServiceConfig::load(path)?;
    let path = path.display().to_string();
    let port = config.http.port.to_string();
    log_event(
        Event::ConfigLoaded,
        &[
            ("backend", config.store.backend.as_str()),
            ("path", &path),
            ("port", &port),
        ],
    );
    Ok(config)
}

fn runtime() -> CliResult<Runtime> {
    Runtime::new()
        .map_err(|e| CliError::serve_failed(format!("Failed to create tokio runtime: {}", e)))
}

/// Open the configured backend
pub async fn open_store(config: &ServiceConfig) -> CliResult<Arc<dyn SpatialStore>> {
    match config.store.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreBackend::Postgres => {
            let url = config
                .store
                .database_url
                .as_deref()
                .ok_or_else(|| CliError::config_error("store.database_url is not set"))?;
            let store = PgStore::connect(url, config.store.max_connections).await?;
            Ok(Arc::new(store))
        }
    }
}

pub async fn apply_migration(store: &dyn SpatialStore) -> CliResult<()> {
    let scope = ObservationScope::with_fields(
        "MIGRATION",
        &[("backend", store.backend_name()), ("migration", MIGRATION_NAME)],
    );

    match store.migrate().await {
        Ok(()) => {
            scope.complete();
            log_event(Event::SchemaMigrated, &[("migration", MIGRATION_NAME)]);
            Ok(())
        }
        Err(e) => {
            scope.fail(&e.to_string());
            Err(CliError::migration_failed(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_open_memory_store_and_migrate() {
        let config = ServiceConfig::in_memory();
        let store = open_store(&config).await.unwrap();
        assert_eq!(store.backend_name(), "memory");
        apply_migration(store.as_ref()).await.unwrap();
    }

    #[test]
    fn test_load_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"store": {"backend": "memory"}, "http": {"port": 8181}}"#)
            .unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.http.port, 8181);
    }

    #[test]
    fn test_migrate_memory_backend() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"store": {"backend": "memory"}}"#).unwrap();
        migrate(file.path()).unwrap();
    }
}
