//! CLI command definitions.

use clap::{Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve {
        /// Configuration file, layered over ./tollgate.yaml
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Listen address, overriding server.bind
        #[arg(short, long)]
        bind: Option<String>,

        /// Log output format
        #[arg(long, value_enum, default_value_t = LogFormat::Text)]
        log_format: LogFormat,
    },

    /// Load and validate configuration, then print a redacted summary
    CheckConfig {
        /// Configuration file, layered over ./tollgate.yaml
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}
