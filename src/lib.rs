//! Command-line client for the neuron federation API.
//!
//! The binary parses a [`cli::Cli`], and [`run`] loads the configuration,
//! sets up logging and hands the subcommand to [`commands::dispatch`].

pub mod cli;
pub mod commands;
pub mod common;
pub mod error;
pub mod logging;
pub mod types;
pub mod utils;

use tracing::debug;

use crate::cli::Cli;
use crate::commands::{Command, Context};
use crate::common::config::Config;
use crate::error::CliResult;
use crate::utils::style::Palette;

pub fn run(cli: Cli) -> CliResult<()> {
    let config_path = Config::resolve_path(cli.config.as_deref())?;

    // A reset must work even when the file on disk is unreadable.
    let config = match &cli.command {
        Command::Configure(opts) if opts.reset => Config::default(),
        _ => Config::load_from_file(&config_path)?,
    };

    let level = if cli.verbose {
        "debug".to_string()
    } else {
        config.log_level.to_ascii_lowercase()
    };
    logging::init(&level);
    debug!(path = %config_path.display(), url = %config.federation_url, "configuration loaded");

    let ctx = Context {
        config_path,
        config,
        palette: Palette::detect(),
    };
    commands::dispatch(cli.command, ctx)
}
