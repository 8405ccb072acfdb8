use crate::commands;
use crate::common::config::CONFIG_ENV;
use clap::Parser;

/// Manage neurons on a federation from the command line.
#[derive(Parser)]
#[clap(name = "federation-cli", version)]
pub struct Cli {
    /// Configuration file to use instead of the per-user default.
    #[clap(long, global = true, env = CONFIG_ENV)]
    pub config: Option<String>,

    /// Log at debug level regardless of the configured level.
    #[clap(short, long, global = true)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: commands::Command,
}
