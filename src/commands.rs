use std::path::PathBuf;

use clap::Subcommand;

use crate::common::client::FederationClient;
use crate::common::config::Config;
use crate::error::CliResult;
use crate::utils::style::Palette;

pub mod configure;
pub mod deploy;
pub mod health;
pub mod neuron;
pub mod status;

#[derive(Subcommand)]
pub enum Command {
    /// Set or show the federation connection settings
    Configure(configure::ConfigureOpts),
    /// Create, clone or retire a single neuron
    Neuron(neuron::NeuronOpts),
    /// Register every neuron listed in a JSON or YAML file
    Deploy(deploy::DeployOpts),
    /// Show the federation dashboard
    Status(status::StatusOpts),
    /// Show neuron health, optionally re-checking it
    Health(health::HealthOpts),
}

/// What every command gets handed: the loaded configuration and where it lives.
pub struct Context {
    pub config_path: PathBuf,
    pub config: Config,
    pub palette: Palette,
}

impl Context {
    pub fn client(&self) -> CliResult<FederationClient> {
        FederationClient::new(&self.config)
    }
}

pub fn dispatch(command: Command, ctx: Context) -> CliResult<()> {
    match command {
        Command::Configure(o) => configure::exec(o, ctx),
        Command::Neuron(o) => neuron::exec(o, ctx),
        Command::Deploy(o) => deploy::exec(o, ctx),
        Command::Status(o) => status::exec(o, ctx),
        Command::Health(o) => health::exec(o, ctx),
    }
}
