use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::common::templates;
use crate::error::CliResult;
use crate::utils::format;

/// Status given to freshly registered neurons.
pub const DEFAULT_STATUS: &str = "active";

/// Health score given to freshly registered neurons.
pub const DEFAULT_HEALTH_SCORE: u8 = 100;

/// An HTTP endpoint exposed by a neuron.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEndpoint {
    pub path: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_method() -> String {
    String::from("GET")
}

impl ApiEndpoint {
    pub fn new(method: &str, path: &str, description: &str) -> Self {
        Self {
            path: path.to_string(),
            method: method.to_string(),
            description: Some(description.to_string()),
        }
    }
}

/// A neuron as registered with, and reported by, the federation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeuronDescriptor {
    pub neuron_id: String,
    pub name: String,
    #[serde(rename = "type", alias = "niche")]
    pub niche: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub api_endpoints: Vec<ApiEndpoint>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default = "default_health_score", deserialize_with = "lenient_score")]
    pub health_score: u8,
    #[serde(default, deserialize_with = "lenient_uptime")]
    pub uptime: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

fn default_status() -> String {
    String::from(DEFAULT_STATUS)
}

fn default_health_score() -> u8 {
    DEFAULT_HEALTH_SCORE
}

/// Scores arrive as integers, floats or strings like `"87.5%"`; clamped to 0..=100.
fn lenient_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(DEFAULT_HEALTH_SCORE);
    }
    format::as_number(&value)
        .filter(|score| score.is_finite())
        .map(|score| score.round().clamp(0.0, 100.0) as u8)
        .ok_or_else(|| D::Error::custom(format!("invalid health score {}", value)))
}

fn lenient_uptime<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(0);
    }
    format::as_number(&value)
        .filter(|seconds| seconds.is_finite())
        .map(|seconds| seconds.max(0.0) as u64)
        .ok_or_else(|| D::Error::custom(format!("invalid uptime {}", value)))
}

/// Moves the first non-null of `aliases` to `key` and drops the rest.
fn canonical_key(map: &mut Map<String, Value>, key: &str, aliases: &[&str]) {
    let found = aliases
        .iter()
        .filter_map(|alias| map.remove(*alias))
        .find(|value| !value.is_null());
    if map.get(key).map_or(true, Value::is_null) {
        if let Some(value) = found {
            map.insert(key.to_string(), value);
        }
    }
}

impl NeuronDescriptor {
    /// Reads a neuron as the federation reports it, whichever of
    /// `neuronId`/`neuron_id`/`id` and `healthScore`/`health_score` it uses.
    pub fn from_payload(mut payload: Value) -> CliResult<Self> {
        if let Some(map) = payload.as_object_mut() {
            canonical_key(map, "neuronId", &["neuron_id", "id"]);
            canonical_key(map, "healthScore", &["health_score"]);
        }
        Ok(serde_json::from_value(payload)?)
    }

    /// Derives a registrable copy of this neuron under a new identity.
    ///
    /// Runtime state (status, health, uptime, API key) is reset; features,
    /// endpoints and metadata are carried over.
    pub fn clone_as(&self, neuron_id: Option<String>, name: Option<String>) -> Self {
        let neuron_id = neuron_id.unwrap_or_else(|| format!("{}-clone", self.neuron_id));
        let name = name.unwrap_or_else(|| format!("{} (clone)", self.name));
        let mut metadata = self.metadata.clone();
        metadata.insert(
            "clonedFrom".to_string(),
            Value::String(self.neuron_id.clone()),
        );

        Self {
            neuron_id,
            name,
            niche: self.niche.clone(),
            features: self.features.clone(),
            api_endpoints: self.api_endpoints.clone(),
            status: default_status(),
            health_score: DEFAULT_HEALTH_SCORE,
            uptime: 0,
            api_key: None,
            metadata,
        }
    }
}

/// The user-supplied form of a neuron, from flags or a bulk deployment file.
///
/// Only `name` and `niche` are required; everything else is filled from the
/// niche template when the definition is resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeuronDefinition {
    #[serde(default, alias = "id")]
    pub neuron_id: Option<String>,
    pub name: String,
    #[serde(alias = "type")]
    pub niche: String,
    #[serde(default)]
    pub features: Option<Vec<String>>,
    #[serde(default)]
    pub api_endpoints: Option<Vec<ApiEndpoint>>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

impl NeuronDefinition {
    pub fn new(name: impl Into<String>, niche: impl Into<String>) -> Self {
        Self {
            neuron_id: None,
            name: name.into(),
            niche: niche.into(),
            features: None,
            api_endpoints: None,
            api_key: None,
            metadata: None,
        }
    }

    /// Fills every missing field from the template registered for the niche.
    pub fn resolve(self) -> NeuronDescriptor {
        let template = templates::for_niche(&self.niche);
        let niche = self.niche.trim().to_string();

        let neuron_id = self
            .neuron_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("neuron-{}-{}", slug(&niche), slug(&self.name)));
        let features = self
            .features
            .unwrap_or_else(|| template.features.iter().map(|f| f.to_string()).collect());
        let api_endpoints = self.api_endpoints.unwrap_or_else(|| template.endpoints());

        let mut metadata = self.metadata.unwrap_or_default();
        metadata
            .entry("niche")
            .or_insert_with(|| Value::String(niche.clone()));
        metadata
            .entry("template")
            .or_insert_with(|| Value::String(template.niche.to_string()));

        NeuronDescriptor {
            neuron_id,
            name: self.name,
            niche,
            features,
            api_endpoints,
            status: default_status(),
            health_score: DEFAULT_HEALTH_SCORE,
            uptime: 0,
            api_key: self.api_key,
            metadata,
        }
    }
}

/// Lowercases and collapses anything that is not alphanumeric into single dashes.
pub fn slug(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.trim().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}
