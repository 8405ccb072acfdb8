use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::common::config::Config;
use crate::error::{CliError, CliResult};

/// Header carrying the version of this client on every request.
pub const CLIENT_VERSION_HEADER: &str = "x-client-version";

/// HTTP access to the federation API.
///
/// Every request carries the JSON content headers, the bearer token (when one
/// is configured) and the client version, and is bounded by the configured
/// timeout. Nothing is retried.
#[derive(Debug, Clone)]
pub struct FederationClient {
    http: reqwest::Client,
    base_url: Url,
}

impl FederationClient {
    pub fn new(config: &Config) -> CliResult<Self> {
        let base_url = config.parsed_url()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static(CLIENT_VERSION_HEADER),
            HeaderValue::from_static(env!("CARGO_PKG_VERSION")),
        );
        if let Some(key) = config.api_key.as_deref().filter(|key| !key.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|e| CliError::request(format!("API key is not a valid header value: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| CliError::request(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, base_url })
    }

    /// Appends percent-encoded path segments to the base URL, keeping any base path.
    pub fn url(&self, segments: &[&str]) -> CliResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                CliError::request(format!("{} cannot be used as a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn get(&self, segments: &[&str]) -> CliResult<Value> {
        self.send(Method::GET, segments, None).await
    }

    pub async fn delete(&self, segments: &[&str]) -> CliResult<Value> {
        self.send(Method::DELETE, segments, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, segments: &[&str], body: &B) -> CliResult<Value> {
        let body = serde_json::to_value(body)?;
        self.send(Method::POST, segments, Some(body)).await
    }

    /// POST without a request body.
    pub async fn post_empty(&self, segments: &[&str]) -> CliResult<Value> {
        self.send(Method::POST, segments, None).await
    }

    async fn send(&self, method: Method, segments: &[&str], body: Option<Value>) -> CliResult<Value> {
        let url = self.url(segments)?;
        debug!(%method, %url, "sending request");

        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(status = status.as_u16(), bytes = text.len(), "received response");

        interpret(status, &text)
    }
}

/// Turns a status and raw body into the response payload or an HTTP error.
pub(crate) fn interpret(status: StatusCode, body: &str) -> CliResult<Value> {
    let trimmed = body.trim();
    let parsed = if trimmed.is_empty() {
        Ok(Value::Null)
    } else {
        serde_json::from_str::<Value>(trimmed)
    };

    if !status.is_success() {
        let message = parsed
            .as_ref()
            .ok()
            .and_then(error_message)
            .unwrap_or_else(|| match trimmed {
                "" => status.canonical_reason().unwrap_or("request failed").to_string(),
                raw => raw.to_string(),
            });
        return Err(CliError::http(status.as_u16(), message));
    }

    let value = parsed?;
    if value.get("success") == Some(&Value::Bool(false)) {
        let message = error_message(&value).unwrap_or_else(|| "request was not successful".to_string());
        return Err(CliError::http(status.as_u16(), message));
    }
    Ok(unwrap_envelope(value))
}

/// Strips the `{ "success": true, "data": ... }` envelope, if there is one.
fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map)
            if map.contains_key("data") && (map.contains_key("success") || map.len() == 1) =>
        {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn error_message(value: &Value) -> Option<String> {
    match value.get("error") {
        Some(Value::String(message)) => return Some(message.clone()),
        Some(Value::Object(inner)) => {
            if let Some(Value::String(message)) = inner.get("message") {
                return Some(message.clone());
            }
        }
        _ => {}
    }
    value
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(url: &str) -> FederationClient {
        FederationClient::new(&Config {
            federation_url: url.to_string(),
            ..Config::default()
        })
        .unwrap()
    }

    #[test]
    fn url_keeps_base_path_and_encodes_segments() {
        let client = client("https://federation.example.com/v2/");
        let url = client
            .url(&["api", "federation", "neurons", "a b/c"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://federation.example.com/v2/api/federation/neurons/a%20b%2Fc"
        );

        let client = self::client("http://localhost:5000");
        assert_eq!(
            client.url(&["api", "federation", "dashboard"]).unwrap().as_str(),
            "http://localhost:5000/api/federation/dashboard"
        );
    }

    #[test]
    fn invalid_api_key_is_a_request_error() {
        let err = FederationClient::new(&Config {
            api_key: Some("line\nbreak".to_string()),
            ..Config::default()
        })
        .unwrap_err();
        assert!(matches!(err, CliError::Request(_)), "got {:?}", err);
    }

    #[test]
    fn envelope_is_unwrapped() {
        let value = interpret(StatusCode::OK, r#"{"success": true, "data": {"neurons": []}}"#).unwrap();
        assert_eq!(value, json!({"neurons": []}));

        let bare = interpret(StatusCode::OK, r#"{"neuronId": "n-1", "data": 3}"#).unwrap();
        assert_eq!(bare["neuronId"], json!("n-1"));

        assert_eq!(interpret(StatusCode::NO_CONTENT, "").unwrap(), Value::Null);
    }

    #[test]
    fn failed_envelope_is_an_http_error() {
        let err = interpret(StatusCode::OK, r#"{"success": false, "error": "duplicate neuron"}"#)
            .unwrap_err();
        match err {
            CliError::Http { status, message } => {
                assert_eq!(status, 200);
                assert_eq!(message, "duplicate neuron");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn non_success_status_uses_best_message() {
        let err = interpret(StatusCode::NOT_FOUND, r#"{"message": "no such neuron"}"#).unwrap_err();
        assert_eq!(err.to_string(), "HTTP error 404: no such neuron");

        let err = interpret(
            StatusCode::BAD_REQUEST,
            r#"{"error": {"message": "name is required"}}"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "HTTP error 400: name is required");

        let err = interpret(StatusCode::BAD_GATEWAY, "upstream down").unwrap_err();
        assert_eq!(err.to_string(), "HTTP error 502: upstream down");

        let err = interpret(StatusCode::SERVICE_UNAVAILABLE, "").unwrap_err();
        assert_eq!(err.to_string(), "HTTP error 503: Service Unavailable");
    }

    #[test]
    fn malformed_success_body_is_a_json_error() {
        let err = interpret(StatusCode::OK, "<html>").unwrap_err();
        assert!(matches!(err, CliError::Json(_)), "got {:?}", err);
    }
}
