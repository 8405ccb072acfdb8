//! Error handling for the federation CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// The federation answered with a non-2xx status (or a failed envelope)
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    /// No response was received from the federation
    #[error("Network error: {0}")]
    Network(String),

    /// The request could not be built
    #[error("Request error: {0}")]
    Request(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid command arguments
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// Bulk file with an extension we cannot parse
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Some neurons of a bulk deployment were not registered
    #[error("{failed} of {total} neurons failed to deploy")]
    PartialDeploy { failed: usize, total: usize },

    /// User declined a confirmation prompt
    #[error("Operation cancelled by user")]
    Cancelled,
}

impl CliError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid arguments error
    pub fn invalid_args(msg: impl Into<String>) -> Self {
        Self::InvalidArgs(msg.into())
    }

    /// Create a request construction error
    pub fn request(msg: impl Into<String>) -> Self {
        Self::Request(msg.into())
    }

    pub fn http(status: u16, msg: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: msg.into(),
        }
    }
}

impl From<reqwest::Error> for CliError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            return Self::Request(err.to_string());
        }
        match err.status() {
            Some(status) => Self::http(status.as_u16(), err.to_string()),
            None if err.is_timeout() => Self::Network(format!("request timed out: {}", err)),
            None if err.is_connect() => Self::Network(format!("could not connect: {}", err)),
            None => Self::Network(err.to_string()),
        }
    }
}

impl From<dialoguer::Error> for CliError {
    fn from(err: dialoguer::Error) -> Self {
        match err {
            dialoguer::Error::IO(io) => Self::Io(io),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_renders_status_and_message() {
        let err = CliError::http(404, "neuron not found");
        assert_eq!(err.to_string(), "HTTP error 404: neuron not found");
    }

    #[test]
    fn builder_failure_maps_to_request_error() {
        let err = reqwest::Client::new()
            .get("not a url")
            .build()
            .map_err(CliError::from)
            .unwrap_err();
        assert!(matches!(err, CliError::Request(_)), "got {:?}", err);
    }
}
