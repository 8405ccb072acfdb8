use std::path::PathBuf;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use crate::commands::Context;
use crate::common::federation;
use crate::error::{CliError, CliResult};
use crate::types::bulk::{BulkFile, BulkReport};
use crate::types::neuron::NeuronDescriptor;
use crate::utils::batch::deploy_in_batches;
use crate::utils::runtime::runtime;
use crate::utils::style::Palette;
use crate::utils::table::{PlainTable, TableRenderer};

const PLAN_HEADERS: &[&str] = &["Batch", "Neuron ID", "Name", "Niche", "Features"];
const FAILURE_HEADERS: &[&str] = &["Neuron ID", "Name", "Error"];

#[derive(Debug, Parser)]
pub struct DeployOpts {
    /// A JSON or YAML file with a `neurons` list.
    pub config_file: String,
    /// How many registrations run at once. Overrides `concurrent` in the file.
    #[clap(short, long)]
    pub concurrent: Option<usize>,
    /// Validate the file and print the batch plan without registering anything.
    #[clap(long)]
    pub dry_run: bool,
}

pub fn exec(opts: DeployOpts, ctx: Context) -> CliResult<()> {
    let path = PathBuf::from(shellexpand::tilde(&opts.config_file).to_string());
    let file = BulkFile::load(&path)?;
    let width = file.width(opts.concurrent)?;
    let descriptors = file.descriptors();
    debug!(
        file = %path.display(),
        neurons = descriptors.len(),
        width,
        "loaded bulk deployment"
    );

    if opts.dry_run {
        print!("{}", render_plan(&descriptors, width, &ctx.palette));
        return Ok(());
    }

    let client = ctx.client()?;
    let progress = progress_bar(descriptors.len());
    let report = runtime()?.block_on(deploy_in_batches(descriptors, width, &progress, |descriptor| {
        let client = client.clone();
        async move { federation::register_neuron(&client, &descriptor).await }
    }));

    print!("{}", render_report(&report, &ctx.palette));
    match report.failed() {
        0 => Ok(()),
        failed => Err(CliError::PartialDeploy {
            failed,
            total: report.results.len(),
        }),
    }
}

fn progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}") {
        progress.set_style(style.progress_chars("=> "));
    }
    progress
}

fn render_plan(descriptors: &[NeuronDescriptor], width: usize, palette: &Palette) -> String {
    let rows: Vec<Vec<String>> = descriptors
        .iter()
        .enumerate()
        .map(|(i, d)| {
            vec![
                (i / width.max(1) + 1).to_string(),
                d.neuron_id.clone(),
                d.name.clone(),
                d.niche.clone(),
                d.features.join(", "),
            ]
        })
        .collect();
    let batches = descriptors.len().div_ceil(width.max(1));

    format!(
        "{}\n{}\n{}",
        palette.heading(&format!(
            "Dry run: {} neurons in {} batches of up to {}",
            descriptors.len(),
            batches,
            width
        )),
        PlainTable::default().render(PLAN_HEADERS, &rows),
        palette.muted("Nothing was sent to the federation.\n"),
    )
}

fn render_report(report: &BulkReport, palette: &Palette) -> String {
    let mut out = format!(
        "{}\n",
        palette.heading(&format!(
            "Deployed {} neurons in {} batches",
            report.results.len(),
            report.batch_sizes.len()
        ))
    );
    out.push_str(&format!(
        "{}\n",
        palette.success(&format!("{} succeeded", report.succeeded()))
    ));

    if report.failed() > 0 {
        out.push_str(&format!(
            "{}\n\n",
            palette.failure(&format!("{} failed", report.failed()))
        ));
        let rows: Vec<Vec<String>> = report
            .failures()
            .map(|f| {
                vec![
                    f.config.neuron_id.clone(),
                    f.config.name.clone(),
                    f.error.clone().unwrap_or_default(),
                ]
            })
            .collect();
        out.push_str(&PlainTable::default().render(FAILURE_HEADERS, &rows));
    }
    out
}
