use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vidstore_core::config::Backend;

#[derive(Parser)]
#[command(name = "vidstore")]
#[command(author, version, about = "Video metadata store with a shareable player page")]
pub struct Cli {
    /// Path to config file (defaults to ./vidstore.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Storage backend (json, sqlite, mongodb)
        #[arg(short, long)]
        backend: Option<Backend>,
    },

    /// Print every stored record as JSON
    List,

    /// Print one record as JSON
    Get {
        /// Record id
        id: String,
    },

    /// Validate the resolved configuration
    Validate,

    /// Display version information
    Version,
}
