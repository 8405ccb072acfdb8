use clap::Parser;
use serde_json::Value;
use tracing::info;

use crate::commands::Context;
use crate::common::client::FederationClient;
use crate::common::federation;
use crate::error::CliResult;
use crate::utils::runtime::runtime;
use crate::utils::style::{Palette, StatusClass};
use crate::utils::table::{key_values, PlainTable, TableRenderer};
use crate::utils::view::{self, NeuronView};

const HEALTH_HEADERS: &[&str] = &["Neuron ID", "Name", "Status", "Health", "Last check"];

#[derive(Debug, Parser)]
pub struct HealthOpts {
    /// Re-run the federation's health checks and suggest fixes for unhealthy neurons.
    #[clap(long)]
    pub fix: bool,
}

pub fn exec(opts: HealthOpts, ctx: Context) -> CliResult<()> {
    let client = ctx.client()?;
    let overview = runtime()?.block_on(fetch(&client, opts.fix))?;

    print!("{}", render(&overview, &ctx.palette));
    if opts.fix {
        print!("{}", render_remedies(&view::neurons(&overview), &ctx.palette));
    }
    Ok(())
}

async fn fetch(client: &FederationClient, recheck: bool) -> CliResult<Value> {
    if recheck {
        let check = federation::health_check(client).await?;
        info!(result = %check, "health check triggered");
    }
    federation::health_overview(client).await
}

fn render(overview: &Value, palette: &Palette) -> String {
    let neurons = view::neurons(overview);
    let mut out = format!(
        "{}\n{}\n",
        palette.heading("Federation Health"),
        key_values(&view::summary(overview))
    );

    let rows: Vec<Vec<String>> = neurons
        .iter()
        .map(|n| {
            vec![
                n.id.clone(),
                n.name.clone(),
                palette.status(&n.status),
                n.health_cell(palette),
                n.last_check.clone(),
            ]
        })
        .collect();
    if !rows.is_empty() {
        out.push_str(&PlainTable::default().render(HEALTH_HEADERS, &rows));
    }
    out
}

/// The command that addresses a neuron in the given condition, if any.
pub fn remedy(neuron: &NeuronView) -> Option<String> {
    match neuron.condition() {
        StatusClass::Bad => Some(format!(
            "federation-cli neuron --action clone --id {id} && federation-cli neuron --action retire --id {id} --yes",
            id = neuron.id
        )),
        StatusClass::Warning => Some(format!("federation-cli status --neuron {}", neuron.id)),
        StatusClass::Good | StatusClass::Unknown => None,
    }
}

fn render_remedies(neurons: &[NeuronView], palette: &Palette) -> String {
    let mut needing: Vec<(&NeuronView, String)> = neurons
        .iter()
        .filter_map(|n| remedy(n).map(|fix| (n, fix)))
        .collect();
    if needing.is_empty() {
        return format!("\n{}\n", palette.success("All neurons are healthy"));
    }

    // Worst first.
    needing.sort_by_key(|(n, _)| n.condition() != StatusClass::Bad);

    let mut out = format!("\n{}\n", palette.heading("Suggested fixes"));
    for (neuron, fix) in needing {
        let label = match neuron.condition() {
            StatusClass::Bad => palette.failure(&format!("{} needs replacing", neuron.id)),
            _ => palette.paint(StatusClass::Warning, &format!("▲ {} needs watching", neuron.id)),
        };
        out.push_str(&format!("{}\n  {}\n", label, fix));
    }
    out
}
