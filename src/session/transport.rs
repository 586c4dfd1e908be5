//! HTTP boundary of the session
//!
//! Requests are a single JSON POST of `{query, variables}`. The response body
//! is decoded as JSON whatever the status code, since GraphQL servers report
//! request errors inside 4xx bodies.

use crate::core::error::PlaygroundError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;

/// Body of a GraphQL request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQLRequest {
    pub query: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
}

impl GraphQLRequest {
    /// Request without variables
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: None,
        }
    }

    pub fn with_variables(mut self, variables: Value) -> Self {
        self.variables = Some(variables);
        self
    }
}

/// Decode the variables editor text
///
/// Blank text stands for no variables (`{}`); anything else must be a JSON object.
pub fn decode_variables(text: &str) -> Result<Value, PlaygroundError> {
    if text.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    let value: Value =
        serde_json::from_str(text).map_err(|e| PlaygroundError::InvalidVariables {
            message: e.to_string(),
        })?;

    if !value.is_object() {
        return Err(PlaygroundError::InvalidVariables {
            message: "variables must be a JSON object".to_string(),
        });
    }

    Ok(value)
}

/// Sends GraphQL requests to an endpoint
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `request` as JSON to `endpoint` and decode the JSON response body
    async fn post_json(
        &self,
        endpoint: &str,
        request: &GraphQLRequest,
    ) -> Result<Value, PlaygroundError>;
}

/// [`Transport`] backed by `reqwest`
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport whose requests fail after `timeout`
    pub fn with_timeout(timeout: Duration) -> Result<Self, PlaygroundError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(
        &self,
        endpoint: &str,
        request: &GraphQLRequest,
    ) -> Result<Value, PlaygroundError> {
        let response = self
            .client
            .post(endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| PlaygroundError::Transport {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(endpoint = %endpoint, status = %status, "GraphQL endpoint returned an error status");
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| PlaygroundError::InvalidResponse {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })
    }
}
