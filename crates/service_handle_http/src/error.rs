use std::path::PathBuf;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpServiceError {
    #[error("failed to read manifest {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse manifest {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("manifest declares no services")]
    NoServices,

    #[error("unknown service '{name}'; available: {}", .available.join(", "))]
    UnknownService { name: String, available: Vec<String> },

    #[error("manifest declares several services; choose one of: {}", .available.join(", "))]
    AmbiguousService { available: Vec<String> },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    error: Option<ErrorPayloadFields>,
}

#[derive(Debug, Deserialize)]
struct ErrorPayloadFields {
    message: Option<String>,
}

/// Human-readable failure for a non-2xx response: the body's
/// `error.message` when present, else the raw body, else the status reason.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    let explicit = serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .and_then(|payload| payload.error)
        .and_then(|fields| fields.message)
        .filter(|message| !message.is_empty());
    if let Some(message) = explicit {
        return message;
    }

    if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    }
}
