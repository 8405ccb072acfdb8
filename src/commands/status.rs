use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::Parser;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::commands::Context;
use crate::common::client::FederationClient;
use crate::common::federation;
use crate::error::{CliError, CliResult};
use crate::utils::format;
use crate::utils::runtime::runtime;
use crate::utils::style::Palette;
use crate::utils::table::{key_values, PlainTable, TableRenderer};
use crate::utils::view::{self, NEURON_HEADERS};

/// The type of output that should be given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// Summary and aligned tables.
    Table,
    /// Outputs the response as JSON.
    Json,
    /// Outputs the neuron list as CSV.
    Csv,
}

impl core::fmt::Display for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Output::Table => write!(f, "table"),
            Output::Json => write!(f, "json"),
            Output::Csv => write!(f, "csv"),
        }
    }
}

impl FromStr for Output {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "table" => Ok(Output::Table),
            "json" => Ok(Output::Json),
            "csv" => Ok(Output::Csv),
            _ => Err(String::from("Invalid output option provided")),
        }
    }
}

#[derive(Debug, Parser)]
pub struct StatusOpts {
    /// Also fetch the analytics overview.
    #[clap(short, long)]
    pub detailed: bool,
    /// Write the fetched data to a file: `.csv` for the neuron rows, JSON otherwise.
    #[clap(short, long)]
    pub export: Option<String>,
    /// Determines how results are shown: table, JSON (json) or CSV (csv).
    #[clap(short, long, default_value("table"))]
    pub output: Output,
    /// Show one neuron's status instead of the whole federation.
    #[clap(long)]
    pub neuron: Option<String>,
}

/// Everything `status` fetched in one invocation.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub dashboard: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics: Option<Value>,
}

pub fn exec(opts: StatusOpts, ctx: Context) -> CliResult<()> {
    if opts.neuron.is_some() && opts.detailed {
        return Err(CliError::invalid_args(
            "--detailed applies to the whole federation and cannot be combined with --neuron",
        ));
    }
    let client = ctx.client()?;
    let runtime = runtime()?;

    if let Some(neuron_id) = &opts.neuron {
        let status = runtime.block_on(federation::neuron_status(&client, neuron_id))?;
        let mut row = status.clone();
        if let Some(map) = row.as_object_mut() {
            map.entry("neuronId")
                .or_insert_with(|| Value::String(neuron_id.clone()));
        }
        let rows = Value::Array(vec![row]);
        if let Some(export) = &opts.export {
            runtime.block_on(export_to(export, &status, &rows))?;
        }
        match opts.output {
            Output::Table => print!("{}", render_neuron(neuron_id, &status, &ctx.palette)),
            Output::Json => println!("{}", serde_json::to_string_pretty(&status)?),
            Output::Csv => write_csv(std::io::stdout(), &rows)?,
        }
        return Ok(());
    }

    let snapshot = runtime.block_on(fetch(&client, opts.detailed))?;
    if let Some(export) = &opts.export {
        runtime.block_on(export_to(export, &snapshot, &snapshot.dashboard))?;
    }

    match opts.output {
        Output::Table => print!("{}", render(&snapshot, &ctx.palette)),
        Output::Json => println!("{}", serde_json::to_string_pretty(&snapshot)?),
        Output::Csv => write_csv(std::io::stdout(), &snapshot.dashboard)?,
    }
    Ok(())
}

async fn fetch(client: &FederationClient, detailed: bool) -> CliResult<Snapshot> {
    let dashboard = federation::dashboard(client).await?;
    let analytics = if detailed {
        Some(federation::analytics_overview(client).await?)
    } else {
        None
    };
    Ok(Snapshot {
        dashboard,
        analytics,
    })
}

async fn export_to<T: Serialize>(export: &str, fetched: &T, rows: &Value) -> CliResult<()> {
    let path = PathBuf::from(shellexpand::tilde(export).to_string());
    export_data(fetched, rows, &path).await?;
    info!(path = %path.display(), "status exported");
    Ok(())
}

/// Writes `rows` as CSV when `path` ends in `.csv`, otherwise `fetched` as pretty JSON.
async fn export_data<T: Serialize>(fetched: &T, rows: &Value, path: &Path) -> CliResult<()> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        let file = std::fs::File::create(path)?;
        write_csv(file, rows)?;
    } else {
        let content = serde_json::to_string_pretty(fetched)?;
        tokio::fs::write(path, content).await?;
    }
    Ok(())
}

fn write_csv<W: Write>(out: W, payload: &Value) -> CliResult<()> {
    let mut writer = csv::WriterBuilder::new().from_writer(out);
    writer.write_record(NEURON_HEADERS)?;
    for neuron in view::neurons(payload) {
        writer.write_record(&neuron.csv_row())?;
    }
    writer.flush()?;
    Ok(())
}

fn render(snapshot: &Snapshot, palette: &Palette) -> String {
    let neurons = view::neurons(&snapshot.dashboard);
    let rows: Vec<Vec<String>> = neurons.iter().map(|n| n.row(palette)).collect();

    let mut out = format!(
        "{}\n{}\n",
        palette.heading("Federation Status"),
        key_values(&view::summary(&snapshot.dashboard))
    );
    if rows.is_empty() {
        out.push_str(&palette.muted("No neurons registered.\n"));
    } else {
        out.push_str(&PlainTable::default().render(NEURON_HEADERS, &rows));
    }

    if let Some(analytics) = &snapshot.analytics {
        out.push_str(&format!("\n{}\n", palette.heading("Analytics")));
        out.push_str(&key_values(&view::scalar_pairs(analytics)));
        if let Some(map) = analytics.as_object() {
            for (key, section) in map.iter().filter(|(_, v)| v.is_object()) {
                out.push_str(&format!(
                    "\n{}\n{}",
                    palette.heading(&format::label(key)),
                    key_values(&view::scalar_pairs(section))
                ));
            }
        }
    }
    out
}

fn render_neuron(neuron_id: &str, status: &Value, palette: &Palette) -> String {
    let neuron = view::NeuronView::from_value(status);
    let mut pairs = vec![
        ("Neuron ID".to_string(), neuron_id.to_string()),
        ("Status".to_string(), palette.status(&neuron.status)),
        ("Health".to_string(), neuron.health_cell(palette)),
        ("Uptime".to_string(), neuron.uptime_cell()),
        ("Last check".to_string(), neuron.last_check.clone()),
    ];
    let shown = ["neuronId", "neuron_id", "id", "status", "healthScore", "uptime"];
    if let Some(map) = status.as_object() {
        pairs.extend(
            map.iter()
                .filter(|(key, value)| !shown.contains(&key.as_str()) && !value.is_object())
                .map(|(key, value)| (format::label(key), format::scalar(Some(value)))),
        );
    }
    key_values(&pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dashboard() -> Value {
        json!({
            "stats": {"totalNeurons": 2, "healthyNeurons": 1},
            "neurons": [
                {"neuronId": "n-1", "name": "Budget Buddy", "type": "finance", "status": "active", "healthScore": 96, "uptime": 90000},
                {"neuronId": "n-2", "name": "Trip Planner", "type": "travel", "status": "offline", "healthScore": 10, "uptime": 30}
            ]
        })
    }

    #[test]
    fn output_parses_from_flag_values() {
        assert_eq!("table".parse::<Output>(), Ok(Output::Table));
        assert_eq!("csv".parse::<Output>(), Ok(Output::Csv));
        assert!("pp".parse::<Output>().is_err());
        assert_eq!(Output::Json.to_string(), "json");
    }

    #[test]
    fn table_render_has_summary_and_rows() {
        let snapshot = Snapshot {
            dashboard: dashboard(),
            analytics: None,
        };
        let text = render(&snapshot, &Palette::plain());
        assert!(text.starts_with("Federation Status\n"));
        assert!(text.contains("Total Neurons:"));
        assert!(text.contains("● active"));
        assert!(text.contains("✖ offline"));
        assert!(text.contains("1d 1h"));
        assert!(!text.contains("Analytics"));
    }

    #[test]
    fn detailed_render_includes_analytics_sections() {
        let snapshot = Snapshot {
            dashboard: json!({"neurons": []}),
            analytics: Some(json!({"pageViews": 1200, "conversions": {"total": 31}})),
        };
        let text = render(&snapshot, &Palette::plain());
        assert!(text.contains("No neurons registered."));
        assert!(text.contains("Analytics\nPage Views: 1200"));
        assert!(text.contains("Conversions\nTotal: 31"));
    }

    #[test]
    fn csv_has_header_and_raw_values() {
        let mut buffer = Vec::new();
        write_csv(&mut buffer, &dashboard()).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Neuron ID,Name,Niche,Status,Health,Uptime");
        assert_eq!(lines[1], "n-1,Budget Buddy,finance,active,96,90000");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn export_writes_json_or_csv_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = Snapshot {
            dashboard: dashboard(),
            analytics: Some(json!({"pageViews": 5})),
        };
        let rt = runtime().unwrap();

        let json_path = dir.path().join("status.json");
        rt.block_on(export_data(&snapshot, &snapshot.dashboard, &json_path))
            .unwrap();
        let exported: Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(exported["analytics"]["pageViews"], json!(5));
        assert_eq!(exported["dashboard"]["neurons"][1]["neuronId"], json!("n-2"));

        let csv_path = dir.path().join("status.CSV");
        rt.block_on(export_data(&snapshot, &snapshot.dashboard, &csv_path))
            .unwrap();
        let csv = std::fs::read_to_string(&csv_path).unwrap();
        assert!(csv.starts_with("Neuron ID,Name"));
        assert!(csv.contains("n-2,Trip Planner,travel,offline,10,30"));
    }

    #[test]
    fn single_neuron_lists_extra_fields() {
        let text = render_neuron(
            "n-1",
            &json!({"status": "degraded", "healthScore": 61, "region": "eu-west"}),
            &Palette::plain(),
        );
        assert!(text.contains("▲ degraded"));
        assert!(text.contains("Region:"));
        assert!(text.contains("eu-west"));
        assert!(!text.contains("Health Score"));
    }
}
