//! Read-only views over the JSON the federation returns.
//!
//! Dashboard and health payloads are not versioned, so every accessor here
//! tolerates missing keys and both camelCase and snake_case spellings.

use serde_json::Value;

use crate::utils::format::{self, field, number};
use crate::utils::style::{Palette, StatusClass};

const ID_KEYS: &[&str] = &["neuronId", "neuron_id", "id"];
const NAME_KEYS: &[&str] = &["name", "displayName"];
const NICHE_KEYS: &[&str] = &["type", "niche", "category"];
const STATUS_KEYS: &[&str] = &["status", "state"];
const HEALTH_KEYS: &[&str] = &["healthScore", "health_score", "health"];
const UPTIME_KEYS: &[&str] = &["uptime", "uptimeSeconds"];
const LAST_CHECK_KEYS: &[&str] = &["lastCheck", "lastCheckIn", "lastHeartbeat", "last_heartbeat"];
const SUMMARY_KEYS: &[&str] = &["stats", "summary", "overview", "overall"];

pub const NEURON_HEADERS: &[&str] = &["Neuron ID", "Name", "Niche", "Status", "Health", "Uptime"];

/// The fields of one neuron entry that the CLI displays.
#[derive(Debug, Clone, PartialEq)]
pub struct NeuronView {
    pub id: String,
    pub name: String,
    pub niche: String,
    pub status: String,
    pub health: Option<f64>,
    pub uptime: Option<u64>,
    pub last_check: String,
}

impl NeuronView {
    pub fn from_value(value: &Value) -> Self {
        Self {
            id: format::scalar(field(value, ID_KEYS)),
            name: format::scalar(field(value, NAME_KEYS)),
            niche: format::scalar(field(value, NICHE_KEYS)),
            status: format::scalar(field(value, STATUS_KEYS)),
            health: number(value, HEALTH_KEYS),
            uptime: number(value, UPTIME_KEYS).filter(|u| *u >= 0.0).map(|u| u as u64),
            last_check: format::scalar(field(value, LAST_CHECK_KEYS)),
        }
    }

    /// The worse of what the status string and the health score say.
    pub fn condition(&self) -> StatusClass {
        let by_status = StatusClass::of(&self.status);
        let by_score = self.health.map(StatusClass::of_score);
        match (by_status, by_score) {
            (StatusClass::Bad, _) | (_, Some(StatusClass::Bad)) => StatusClass::Bad,
            (StatusClass::Warning, _) | (_, Some(StatusClass::Warning)) => StatusClass::Warning,
            (StatusClass::Good, _) | (_, Some(StatusClass::Good)) => StatusClass::Good,
            _ => StatusClass::Unknown,
        }
    }

    pub fn health_cell(&self, palette: &Palette) -> String {
        match self.health {
            Some(score) => palette.score(score),
            None => format::MISSING.to_string(),
        }
    }

    pub fn uptime_cell(&self) -> String {
        self.uptime
            .map(format::uptime)
            .unwrap_or_else(|| format::MISSING.to_string())
    }

    /// A table row matching [`NEURON_HEADERS`].
    pub fn row(&self, palette: &Palette) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.niche.clone(),
            palette.status(&self.status),
            self.health_cell(palette),
            self.uptime_cell(),
        ]
    }

    /// The same columns as [`NeuronView::row`], unstyled and with raw numbers.
    pub fn csv_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.niche.clone(),
            self.status.clone(),
            self.health.map(|h| h.to_string()).unwrap_or_default(),
            self.uptime.map(|u| u.to_string()).unwrap_or_default(),
        ]
    }
}

/// The neuron entries of a payload: its `neurons` array, or the payload
/// itself when it is an array.
pub fn neurons(payload: &Value) -> Vec<NeuronView> {
    let list = match payload {
        Value::Array(items) => items.as_slice(),
        other => other
            .get("neurons")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]),
    };
    list.iter().map(NeuronView::from_value).collect()
}

/// Labelled scalar counters from the payload's summary block.
///
/// Falls back to the payload's own top-level scalars, and finally to counts
/// derived from the neuron list.
pub fn summary(payload: &Value) -> Vec<(String, String)> {
    let block = SUMMARY_KEYS
        .iter()
        .filter_map(|key| payload.get(*key))
        .find(|v| v.is_object())
        .unwrap_or(payload);

    let pairs = scalar_pairs(block);
    if !pairs.is_empty() {
        return pairs;
    }

    let neurons = neurons(payload);
    let active = neurons
        .iter()
        .filter(|n| StatusClass::of(&n.status) == StatusClass::Good)
        .count();
    let scores: Vec<f64> = neurons.iter().filter_map(|n| n.health).collect();
    let average = if scores.is_empty() {
        format::MISSING.to_string()
    } else {
        format!("{:.1}", scores.iter().sum::<f64>() / scores.len() as f64)
    };
    vec![
        ("Total Neurons".to_string(), neurons.len().to_string()),
        ("Active Neurons".to_string(), active.to_string()),
        ("Average Health".to_string(), average),
    ]
}

/// Every non-container entry of an object, labelled for display.
pub fn scalar_pairs(value: &Value) -> Vec<(String, String)> {
    match value.as_object() {
        Some(map) => map
            .iter()
            .filter(|(_, v)| !v.is_object() && !is_object_array(v))
            .map(|(k, v)| (format::label(k), format::scalar(Some(v))))
            .collect(),
        None => Vec::new(),
    }
}

fn is_object_array(value: &Value) -> bool {
    value
        .as_array()
        .map(|items| items.iter().any(Value::is_object))
        .unwrap_or(false)
}
