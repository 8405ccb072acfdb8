use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CliError, CliResult};
use crate::types::neuron::{NeuronDefinition, NeuronDescriptor};

/// Number of registrations issued concurrently when neither the file nor the
/// command line says otherwise.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// The formats a bulk deployment file may be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkFormat {
    Json,
    Yaml,
}

impl BulkFormat {
    /// Picks the parser from the file extension.
    pub fn from_path(path: &Path) -> CliResult<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("json") => Ok(BulkFormat::Json),
            Some("yaml") | Some("yml") => Ok(BulkFormat::Yaml),
            _ => Err(CliError::UnsupportedFormat(format!(
                "{} (expected .json, .yaml or .yml)",
                path.display()
            ))),
        }
    }
}

/// A bulk deployment file: the neurons to register and, optionally, how many
/// to register at once.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkFile {
    pub neurons: Vec<NeuronDefinition>,
    #[serde(default)]
    pub concurrent: Option<usize>,
}

impl BulkFile {
    /// Reads and validates a bulk file. The extension is checked before the
    /// file is even opened.
    pub fn load(path: &Path) -> CliResult<Self> {
        let format = BulkFormat::from_path(path)?;
        let contents = std::fs::read_to_string(path)?;
        let file = Self::parse(&contents, format)?;
        file.validate()?;
        Ok(file)
    }

    pub fn parse(contents: &str, format: BulkFormat) -> CliResult<Self> {
        let file = match format {
            BulkFormat::Json => serde_json::from_str(contents)?,
            BulkFormat::Yaml => serde_yaml::from_str(contents)?,
        };
        Ok(file)
    }

    fn validate(&self) -> CliResult<()> {
        if self.neurons.is_empty() {
            return Err(CliError::invalid_args(
                "bulk file does not list any neurons",
            ));
        }
        if let Some(position) = self
            .neurons
            .iter()
            .position(|n| n.name.trim().is_empty() || n.niche.trim().is_empty())
        {
            return Err(CliError::invalid_args(format!(
                "neuron #{} needs both a name and a niche",
                position + 1
            )));
        }
        Ok(())
    }

    /// The batch width: the command line wins over the file, the file over the default.
    pub fn width(&self, cli_override: Option<usize>) -> CliResult<usize> {
        match cli_override.or(self.concurrent) {
            Some(0) => Err(CliError::invalid_args("concurrency must be at least 1")),
            Some(width) => Ok(width),
            None => Ok(DEFAULT_CONCURRENCY),
        }
    }

    pub fn descriptors(self) -> Vec<NeuronDescriptor> {
        self.neurons
            .into_iter()
            .map(NeuronDefinition::resolve)
            .collect()
    }
}

/// The outcome of registering one descriptor.
#[derive(Debug, Clone, Serialize)]
pub struct DeployOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neuron: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub config: NeuronDescriptor,
}

impl DeployOutcome {
    pub fn succeeded(config: NeuronDescriptor, neuron: Value) -> Self {
        Self {
            success: true,
            neuron: Some(neuron),
            error: None,
            config,
        }
    }

    pub fn failed(config: NeuronDescriptor, error: &CliError) -> Self {
        Self {
            success: false,
            neuron: None,
            error: Some(error.to_string()),
            config,
        }
    }
}

/// Everything a bulk deployment produced, in input order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkReport {
    pub results: Vec<DeployOutcome>,
    pub batch_sizes: Vec<usize>,
}

impl BulkReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &DeployOutcome> {
        self.results.iter().filter(|r| !r.success)
    }
}
