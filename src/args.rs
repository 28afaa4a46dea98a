//! Command-line arguments.

use clap::Parser;
use log::LevelFilter;

#[derive(Debug, Parser)]
#[command(name = "reel_booker", about = "Cinema seat reservation telnet server")]
pub struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0")]
    pub bind: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 50000)]
    pub port: u16,

    /// Maximum number of concurrently active sessions.
    #[arg(long, default_value_t = 256)]
    pub max_connections: usize,

    /// Path to the catalog configuration JSON file.
    #[arg(long, default_value = "config.json")]
    pub config: String,

    /// Default log level, overridden by the RUST_LOG environment variable.
    #[arg(long, default_value = "info")]
    pub log_level: LevelFilter,

    /// Number of Tokio worker threads. Defaults to the Tokio runtime's own default (the core count).
    #[arg(long)]
    pub worker_threads: Option<usize>,

    /// Daemonize the process (double-fork, detach from the controlling terminal).
    #[arg(long, default_value_t = false)]
    pub daemonize: bool,
}
