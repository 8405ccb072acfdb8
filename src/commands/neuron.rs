use std::str::FromStr;

use clap::Parser;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;
use serde_json::Value;
use tracing::{info, warn};

use crate::commands::Context;
use crate::common::client::FederationClient;
use crate::common::federation;
use crate::error::{CliError, CliResult};
use crate::types::neuron::{NeuronDefinition, NeuronDescriptor};
use crate::utils::format::{self, field};
use crate::utils::runtime::runtime;
use crate::utils::style::Palette;
use crate::utils::table::key_values;

/// What to do with a single neuron.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Register a new neuron built from its niche template.
    Create,
    /// Register a copy of an existing neuron.
    Clone,
    /// Shut a neuron down and remove it from the federation.
    Retire,
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Create => write!(f, "create"),
            Action::Clone => write!(f, "clone"),
            Action::Retire => write!(f, "retire"),
        }
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Action::Create),
            "clone" => Ok(Action::Clone),
            "retire" => Ok(Action::Retire),
            _ => Err(String::from(
                "Invalid action provided (expected create, clone or retire)",
            )),
        }
    }
}

#[derive(Debug, Parser)]
pub struct NeuronOpts {
    /// The action to perform: create, clone or retire.
    #[clap(short, long)]
    pub action: Action,
    /// Neuron ID: optional for create, the source for clone, the target for retire.
    #[clap(long)]
    pub id: Option<String>,
    /// Display name (required for create).
    #[clap(short, long)]
    pub name: Option<String>,
    /// Niche the neuron serves, which selects its template (required for create).
    #[clap(long)]
    pub niche: Option<String>,
    /// Comma-separated features, replacing the niche template's list.
    #[clap(long, value_delimiter = ',')]
    pub features: Vec<String>,
    /// ID for the copy made by clone. Defaults to `<id>-clone`.
    #[clap(long)]
    pub new_id: Option<String>,
    /// Retire without asking the neuron to shut down first.
    #[clap(long)]
    pub force: bool,
    /// Do not ask for confirmation before retiring.
    #[clap(short, long)]
    pub yes: bool,
}

impl NeuronOpts {
    /// Checks the flags each action needs before anything touches the network.
    pub fn validate(&self) -> CliResult<()> {
        let missing = |flag: &str| {
            CliError::invalid_args(format!("--action={} requires --{}", self.action, flag))
        };
        let present = |value: &Option<String>| value.as_deref().map_or(false, |v| !v.trim().is_empty());

        match self.action {
            Action::Create => {
                if !present(&self.name) {
                    return Err(missing("name"));
                }
                if !present(&self.niche) {
                    return Err(missing("niche"));
                }
            }
            Action::Clone | Action::Retire => {
                if !present(&self.id) {
                    return Err(missing("id"));
                }
            }
        }
        Ok(())
    }

    fn definition(&self) -> NeuronDefinition {
        let mut definition = NeuronDefinition::new(
            self.name.clone().unwrap_or_default(),
            self.niche.clone().unwrap_or_default(),
        );
        definition.neuron_id = self.id.clone();
        let features: Vec<String> = self
            .features
            .iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();
        if !features.is_empty() {
            definition.features = Some(features);
        }
        definition
    }

    fn target(&self) -> &str {
        self.id.as_deref().unwrap_or_default().trim()
    }
}

pub fn exec(opts: NeuronOpts, ctx: Context) -> CliResult<()> {
    opts.validate()?;
    if opts.action == Action::Retire && !opts.yes {
        confirm_retire(opts.target())?;
    }

    let client = ctx.client()?;
    let runtime = runtime()?;

    match opts.action {
        Action::Create => {
            let descriptor = opts.definition().resolve();
            info!(neuron = %descriptor.neuron_id, niche = %descriptor.niche, "registering neuron");
            let registered = runtime.block_on(federation::register_neuron(&client, &descriptor))?;
            print!("{}", render_registered("Neuron created", &descriptor, &registered, &ctx.palette));
        }
        Action::Clone => {
            let (copy, registered) = runtime.block_on(clone_neuron(&client, &opts))?;
            print!("{}", render_registered("Neuron cloned", &copy, &registered, &ctx.palette));
        }
        Action::Retire => {
            runtime.block_on(retire_neuron(&client, opts.target(), opts.force))?;
            println!(
                "{}",
                ctx.palette.success(&format!("Neuron {} retired", opts.target()))
            );
        }
    }
    Ok(())
}

fn confirm_retire(neuron_id: &str) -> CliResult<()> {
    if !console::user_attended() {
        return Err(CliError::invalid_args(
            "retiring needs --yes when the terminal is not interactive",
        ));
    }
    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Retire neuron {}? It will be shut down and removed", neuron_id))
        .default(false)
        .interact()?;
    if confirmed {
        Ok(())
    } else {
        Err(CliError::Cancelled)
    }
}

async fn clone_neuron(
    client: &FederationClient,
    opts: &NeuronOpts,
) -> CliResult<(NeuronDescriptor, Value)> {
    let source = federation::get_neuron(client, opts.target()).await?;
    let source = NeuronDescriptor::from_payload(unwrap_neuron(source))?;

    let copy = source.clone_as(opts.new_id.clone(), opts.name.clone());
    info!(source = %source.neuron_id, neuron = %copy.neuron_id, "registering clone");
    let registered = federation::register_neuron(client, &copy).await?;
    Ok((copy, registered))
}

/// Shuts the neuron down, then removes it. A failed shutdown does not stop
/// the removal; `force` skips the shutdown entirely.
async fn retire_neuron(client: &FederationClient, neuron_id: &str, force: bool) -> CliResult<()> {
    if !force {
        match federation::shutdown_neuron(client, neuron_id).await {
            Ok(_) => info!(neuron = %neuron_id, "neuron shut down"),
            Err(err) => warn!(neuron = %neuron_id, error = %err, "shutdown failed, removing anyway"),
        }
    }
    federation::delete_neuron(client, neuron_id).await?;
    info!(neuron = %neuron_id, "neuron removed");
    Ok(())
}

/// Single-neuron responses sometimes nest the neuron under `neuron`.
fn unwrap_neuron(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.get("neuron").map_or(false, Value::is_object) => {
            map.remove("neuron").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn render_registered(
    title: &str,
    descriptor: &NeuronDescriptor,
    registered: &Value,
    palette: &Palette,
) -> String {
    let neuron = match registered.get("neuron") {
        Some(inner) if inner.is_object() => inner,
        _ => registered,
    };
    let id = field(neuron, &["neuronId", "neuron_id", "id"])
        .map(|v| format::scalar(Some(v)))
        .unwrap_or_else(|| descriptor.neuron_id.clone());
    let status = field(neuron, &["status"])
        .map(|v| format::scalar(Some(v)))
        .unwrap_or_else(|| descriptor.status.clone());

    let mut pairs = vec![
        ("Neuron ID".to_string(), id),
        ("Name".to_string(), descriptor.name.clone()),
        ("Niche".to_string(), descriptor.niche.clone()),
        ("Features".to_string(), descriptor.features.join(", ")),
        (
            "Endpoints".to_string(),
            descriptor
                .api_endpoints
                .iter()
                .map(|e| format!("{} {}", e.method, e.path))
                .collect::<Vec<_>>()
                .join(", "),
        ),
        ("Status".to_string(), palette.status(&status)),
    ];
    if let Some(key) = field(registered, &["apiKey", "token"]).and_then(Value::as_str) {
        pairs.push(("API key".to_string(), key.to_string()));
    }

    format!("{}\n{}", palette.success(title), key_values(&pairs))
}
