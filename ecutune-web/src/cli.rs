//! Command-line interface for the ecutune-web binary
//!
//! Listener and admin options are global, so `ECUTUNE_BIND`, `ECUTUNE_PORT`
//! and `ECUTUNE_ADMIN_TOKEN` apply whether or not `serve` is spelled out.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ecutune_common::config::CliOverrides;

/// Command-line arguments for ecutune-web
#[derive(Parser, Debug)]
#[command(name = "ecutune-web")]
#[command(about = "Vehicle selector and lead capture service for ECU remapping")]
#[command(version)]
pub struct Args {
    /// TOML config file (defaults to the platform config dir)
    #[arg(short, long, env = "ECUTUNE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Root folder holding the database
    #[arg(short, long, env = "ECUTUNE_ROOT_FOLDER", global = true)]
    pub root_folder: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "ECUTUNE_BIND", global = true)]
    pub bind: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "ECUTUNE_PORT", global = true)]
    pub port: Option<u16>,

    /// Bearer token for the admin API (unset disables it)
    #[arg(long, env = "ECUTUNE_ADMIN_TOKEN", global = true, hide_env_values = true)]
    pub admin_token: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Import a vehicle catalog from a TOML file
    Import {
        /// Catalog file with [[vehicle]] tables
        catalog: PathBuf,
    },
}

impl Args {
    /// Command to run; no subcommand means `serve`
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }

    /// Values that outrank the TOML file and compiled defaults
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            root_folder: self.root_folder.clone(),
            bind_address: self.bind.clone(),
            port: self.port,
            admin_token: self.admin_token.clone(),
        }
    }
}
