use serde_json::Value;

use crate::common::client::FederationClient;
use crate::error::CliResult;
use crate::types::neuron::NeuronDescriptor;

const REGISTER: &[&str] = &["api", "neuron", "register"];
const DASHBOARD: &[&str] = &["api", "federation", "dashboard"];
const HEALTH_OVERVIEW: &[&str] = &["api", "federation", "health", "overview"];
const HEALTH_CHECK: &[&str] = &["api", "federation", "health", "check"];
const ANALYTICS_OVERVIEW: &[&str] = &["api", "analytics", "overview"];

/// `/api/federation/neurons/:id` followed by any extra segments.
fn neuron_path<'a>(neuron_id: &'a str, rest: &[&'a str]) -> Vec<&'a str> {
    let mut path = vec!["api", "federation", "neurons", neuron_id];
    path.extend_from_slice(rest);
    path
}

pub async fn register_neuron(client: &FederationClient, neuron: &NeuronDescriptor) -> CliResult<Value> {
    client.post(REGISTER, neuron).await
}

pub async fn get_neuron(client: &FederationClient, neuron_id: &str) -> CliResult<Value> {
    client.get(&neuron_path(neuron_id, &[])).await
}

pub async fn neuron_status(client: &FederationClient, neuron_id: &str) -> CliResult<Value> {
    client.get(&neuron_path(neuron_id, &["status"])).await
}

pub async fn shutdown_neuron(client: &FederationClient, neuron_id: &str) -> CliResult<Value> {
    client.post_empty(&neuron_path(neuron_id, &["shutdown"])).await
}

pub async fn delete_neuron(client: &FederationClient, neuron_id: &str) -> CliResult<Value> {
    client.delete(&neuron_path(neuron_id, &[])).await
}

pub async fn dashboard(client: &FederationClient) -> CliResult<Value> {
    client.get(DASHBOARD).await
}

pub async fn health_overview(client: &FederationClient) -> CliResult<Value> {
    client.get(HEALTH_OVERVIEW).await
}

/// Asks the federation to re-run its health checks now.
pub async fn health_check(client: &FederationClient) -> CliResult<Value> {
    client.get(HEALTH_CHECK).await
}

pub async fn analytics_overview(client: &FederationClient) -> CliResult<Value> {
    client.get(ANALYTICS_OVERVIEW).await
}
