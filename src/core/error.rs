//! Typed error handling for the playground
//!
//! Lookups never fail (they fall back to empty results), so the errors here
//! only cover the request cycle and the loading of schema documents.
//!
//! # Error Categories
//!
//! - [`PlaygroundError::InvalidVariables`]: the variables editor does not hold a JSON object
//! - [`PlaygroundError::Transport`]: the HTTP request itself failed
//! - [`PlaygroundError::InvalidResponse`]: the endpoint answered with something other than JSON
//! - [`PlaygroundError::MissingSchema`]: an introspection answer without `data.__schema`
//! - [`PlaygroundError::InvalidSchema`]: a schema document that does not decode
//! - [`PlaygroundError::DemoEndpoint`]: execution against a `demo://` endpoint
//! - [`PlaygroundError::UnknownDemoSchema`]: a registry key that does not exist
//!
//! The session state only keeps the `Display` text of these errors, so the
//! messages are written for end users.

use thiserror::Error;

/// The main error type of the playground
#[derive(Debug, Error)]
pub enum PlaygroundError {
    /// The variables text is not valid JSON, or not a JSON object
    #[error("Invalid variables: {message}")]
    InvalidVariables { message: String },

    /// The request could not be sent or no response was received
    #[error("Request to '{endpoint}' failed: {message}")]
    Transport { endpoint: String, message: String },

    /// The response body could not be decoded as JSON
    #[error("Response from '{endpoint}' is not valid JSON: {message}")]
    InvalidResponse { endpoint: String, message: String },

    /// The introspection response has no `data.__schema` member
    #[error("Introspection response did not contain a schema{}", format_graphql_errors(.errors))]
    MissingSchema { errors: Vec<String> },

    /// A schema document could not be decoded
    #[error("Invalid schema document: {message}")]
    InvalidSchema { message: String },

    /// Demo schemas are static and cannot be queried over the network
    #[error("'{endpoint}' is a demo schema endpoint and cannot execute requests")]
    DemoEndpoint { endpoint: String },

    /// No demo schema is registered under this key
    #[error("Unknown demo schema: {key}")]
    UnknownDemoSchema { key: String },
}

fn format_graphql_errors(errors: &[String]) -> String {
    if errors.is_empty() {
        String::new()
    } else {
        format!(": {}", errors.join("; "))
    }
}

impl PlaygroundError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            PlaygroundError::InvalidVariables { .. } => "INVALID_VARIABLES",
            PlaygroundError::Transport { .. } => "TRANSPORT_ERROR",
            PlaygroundError::InvalidResponse { .. } => "INVALID_RESPONSE",
            PlaygroundError::MissingSchema { .. } => "MISSING_SCHEMA",
            PlaygroundError::InvalidSchema { .. } => "INVALID_SCHEMA",
            PlaygroundError::DemoEndpoint { .. } => "DEMO_ENDPOINT",
            PlaygroundError::UnknownDemoSchema { .. } => "UNKNOWN_DEMO_SCHEMA",
        }
    }

    /// Whether the error happened before anything was sent over the network
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            PlaygroundError::InvalidVariables { .. }
                | PlaygroundError::DemoEndpoint { .. }
                | PlaygroundError::UnknownDemoSchema { .. }
        )
    }
}

impl From<reqwest::Error> for PlaygroundError {
    fn from(err: reqwest::Error) -> Self {
        let endpoint = err
            .url()
            .map(|url| url.to_string())
            .unwrap_or_default();

        if err.is_decode() {
            PlaygroundError::InvalidResponse {
                endpoint,
                message: err.to_string(),
            }
        } else {
            PlaygroundError::Transport {
                endpoint,
                message: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_schema_lists_graphql_errors() {
        let err = PlaygroundError::MissingSchema {
            errors: vec!["introspection disabled".to_string(), "forbidden".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Introspection response did not contain a schema: introspection disabled; forbidden"
        );
    }

    #[test]
    fn test_missing_schema_without_errors() {
        let err = PlaygroundError::MissingSchema { errors: vec![] };
        assert_eq!(
            err.to_string(),
            "Introspection response did not contain a schema"
        );
    }

    #[test]
    fn test_local_errors() {
        assert!(
            PlaygroundError::DemoEndpoint {
                endpoint: "demo://blog".to_string()
            }
            .is_local()
        );
        assert!(
            !PlaygroundError::Transport {
                endpoint: "http://localhost".to_string(),
                message: "refused".to_string()
            }
            .is_local()
        );
    }
}
