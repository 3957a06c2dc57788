//! CLI argument definitions using clap
//!
//! Commands:
//! - geofeature serve --config <path> [--port <port>] [--migrate]
//! - geofeature migrate --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Spatial feature service: points and polygons as GeoJSON over PostGIS
#[derive(Parser, Debug)]
#[command(name = "geofeature")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./geofeature.json")]
        config: PathBuf,

        /// Override `http.port`
        #[arg(long)]
        port: Option<u16>,

        /// Apply the schema migration before serving
        #[arg(long)]
        migrate: bool,
    },

    /// Create the feature tables and spatial indexes, then exit
    Migrate {
        /// Path to configuration file
        #[arg(long, default_value = "./geofeature.json")]
        config: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from([
            "geofeature",
            "serve",
            "--config",
            "/etc/geo.json",
            "--port",
            "9000",
            "--migrate",
        ])
        .unwrap();
        match cli.command {
            Command::Serve {
                config,
                port,
                migrate,
            } => {
                assert_eq!(config, PathBuf::from("/etc/geo.json"));
                assert_eq!(port, Some(9000));
                assert!(migrate);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_migrate_default_config() {
        let cli = Cli::try_parse_from(["geofeature", "migrate"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Migrate { config } if config == PathBuf::from("./geofeature.json")
        ));
    }
}
