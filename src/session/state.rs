//! Snapshot of everything one playground session holds

use crate::config::PlaygroundConfig;
use crate::core::operation::{Operation, OperationStructure};
use crate::core::registry::SchemaRegistry;
use crate::core::schema::SchemaDocument;
use serde_json::Value;
use std::sync::Arc;

/// Session state
///
/// Snapshots are immutable; the session replaces them wholesale on every
/// change. `query` and `structure` are regenerated from one another: the
/// builder renders `query` after structural edits, the parser rebuilds
/// `structure` after text edits.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// URL requests are posted to (`demo://<key>` while a demo schema is loaded)
    pub endpoint: String,

    /// Query editor text
    pub query: String,

    /// Variables editor text (JSON)
    pub variables: String,

    /// Decoded body of the last successful execution
    pub results: Option<Value>,

    pub schema: Option<Arc<SchemaDocument>>,

    /// Whether a request is in flight
    pub loading: bool,

    /// Message of the last failed request
    pub error: Option<String>,

    pub structure: OperationStructure,

    /// Key of the loaded demo schema, if any
    pub current_schema_key: Option<String>,

    pub available_schemas: Arc<SchemaRegistry>,
}

impl SessionState {
    /// Initial state: the configured endpoint and sample query, a single
    /// empty `MyQuery` operation, no schema
    pub fn initial(config: &PlaygroundConfig, registry: Arc<SchemaRegistry>) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            query: config.query.clone(),
            variables: config.variables.clone(),
            results: None,
            schema: None,
            loading: false,
            error: None,
            structure: OperationStructure::default(),
            current_schema_key: None,
            available_schemas: registry,
        }
    }

    /// The operation of the active tab
    pub fn current_operation(&self) -> Option<&Operation> {
        self.structure.active_operation()
    }

    /// Borrow the loaded schema, if any
    pub fn schema(&self) -> Option<&SchemaDocument> {
        self.schema.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let config = PlaygroundConfig::default();
        let state = SessionState::initial(&config, Arc::new(SchemaRegistry::new()));

        assert_eq!(state.endpoint, "https://countries.trevorblades.com/");
        assert!(state.query.starts_with("query GetCountries($first: Int)"));
        assert_eq!(state.structure.operations.len(), 1);
        assert_eq!(state.current_operation().unwrap().name, "MyQuery");
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert!(state.results.is_none());
        assert!(state.schema().is_none());
    }
}
