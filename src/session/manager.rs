//! Playground session: the state container and its entry points
//!
//! Structural edits (fields, operations) go through the pure methods of
//! [`OperationStructure`] and then regenerate the query text with the
//! builder; text edits go through the parser. Both land in the store as a
//! single snapshot replacement.
//!
//! # Requests
//!
//! `execute_query` and `introspect_schema` set `loading` and clear `error`
//! before sending, then store either the decoded body or the error message.
//! Each request takes a generation number of its own kind; when a newer
//! request of the same kind has been started in the meantime, the older
//! one's outcome is dropped. `loading` stays set while any request is in
//! flight.

use super::introspection::{INTROSPECTION_QUERY, extract_schema};
use super::state::SessionState;
use super::transport::{GraphQLRequest, HttpTransport, Transport, decode_variables};
use crate::config::PlaygroundConfig;
use crate::core::builder::build_query;
use crate::core::error::PlaygroundError;
use crate::core::lookup;
use crate::core::operation::{Operation, OperationStructure, OperationType, TreeArgument};
use crate::core::parser::parse_query;
use crate::core::registry::SchemaRegistry;
use crate::core::schema::{SchemaArgument, SchemaDocument, SchemaField};
use crate::core::store::{Store, Unsubscribe};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// A playground session
///
/// Cheap to clone; clones share the same state and listeners.
///
/// # Example
///
/// ```rust,ignore
/// let session = PlaygroundSession::new(PlaygroundConfig::default())?;
/// session.load_demo_schema("blog")?;
/// session.add_field_to_query(&[], "users", &[]);
/// session.add_field_to_query(&["users".to_string()], "name", &[]);
///
/// assert_eq!(session.snapshot().query, "query MyQuery {\n  users {\n    name\n  }\n}");
/// ```
#[derive(Clone)]
pub struct PlaygroundSession {
    store: Store<SessionState>,
    transport: Arc<dyn Transport>,
    requests: Arc<RequestTracker>,
}

/// Kind of outbound request; each kind is fenced on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestKind {
    Query,
    Introspection,
}

#[derive(Default)]
struct RequestTracker {
    query_generation: AtomicU64,
    schema_generation: AtomicU64,
    in_flight: AtomicUsize,
}

impl RequestTracker {
    fn generation(&self, kind: RequestKind) -> &AtomicU64 {
        match kind {
            RequestKind::Query => &self.query_generation,
            RequestKind::Introspection => &self.schema_generation,
        }
    }
}

impl PlaygroundSession {
    /// Session over HTTP, with the bundled demo schemas
    ///
    /// Preloads `config.demo_schema` when set.
    pub fn new(config: PlaygroundConfig) -> Result<Self, PlaygroundError> {
        let transport: Arc<dyn Transport> = match config.request_timeout_secs {
            Some(secs) => Arc::new(HttpTransport::with_timeout(Duration::from_secs(secs))?),
            None => Arc::new(HttpTransport::new()),
        };
        Self::with_transport(config, transport)
    }

    /// Session with the bundled demo schemas and a custom transport
    pub fn with_transport(
        config: PlaygroundConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, PlaygroundError> {
        let registry = Arc::new(SchemaRegistry::with_demo_schemas()?);
        let session = Self::from_state(SessionState::initial(&config, registry), transport);

        if let Some(key) = &config.demo_schema {
            session.load_demo_schema(key)?;
        }

        Ok(session)
    }

    /// Session starting from an explicit state
    pub fn from_state(initial: SessionState, transport: Arc<dyn Transport>) -> Self {
        Self {
            store: Store::new(initial),
            transport,
            requests: Arc::new(RequestTracker::default()),
        }
    }

    // =========================================================================
    // Store access
    // =========================================================================

    /// Current state
    pub fn snapshot(&self) -> Arc<SessionState> {
        self.store.get()
    }

    /// Listen to every state change; called at once with the current state
    pub fn subscribe<F>(&self, listener: F) -> Unsubscribe<SessionState>
    where
        F: Fn(&SessionState) + Send + Sync + 'static,
    {
        self.store.subscribe(listener)
    }

    /// Replace the whole state
    pub fn set(&self, state: SessionState) {
        self.store.set(state);
    }

    /// Derive the next state from the current one
    pub fn update<F>(&self, transform: F) -> Arc<SessionState>
    where
        F: FnOnce(&SessionState) -> SessionState,
    {
        self.store.update(transform)
    }

    pub fn available_schemas(&self) -> Arc<SchemaRegistry> {
        self.snapshot().available_schemas.clone()
    }

    // =========================================================================
    // Schema lookups
    // =========================================================================

    /// Whether `type_name` declares `field_name` (always true without a schema)
    pub fn is_valid_field(&self, type_name: &str, field_name: &str) -> bool {
        tracing::debug!(type_name, field_name, "Validating field");
        lookup::field_exists(self.snapshot().schema(), type_name, field_name)
    }

    /// Whether `type_name.field_name` accepts `arg_name` (always true without a schema)
    pub fn is_valid_argument(&self, type_name: &str, field_name: &str, arg_name: &str) -> bool {
        tracing::debug!(type_name, field_name, arg_name, "Validating argument");
        lookup::argument_exists(self.snapshot().schema(), type_name, field_name, arg_name)
    }

    pub fn fields_for_type(&self, type_name: &str) -> Vec<SchemaField> {
        lookup::fields_of_type(self.snapshot().schema(), type_name).to_vec()
    }

    pub fn args_for_field(&self, type_name: &str, field_name: &str) -> Vec<SchemaArgument> {
        lookup::args_of_field(self.snapshot().schema(), type_name, field_name).to_vec()
    }

    pub fn root_query_fields(&self) -> Vec<SchemaField> {
        lookup::root_query_fields(self.snapshot().schema()).to_vec()
    }

    pub fn field_return_type(&self, type_name: &str, field_name: &str) -> Option<String> {
        lookup::return_type_name(self.snapshot().schema(), type_name, field_name)
            .map(str::to_string)
    }

    /// Fields selectable below `field_path`, walking from the root query type
    pub fn available_fields_for_path<S: AsRef<str>>(&self, field_path: &[S]) -> Vec<SchemaField> {
        lookup::fields_along_path(self.snapshot().schema(), field_path).to_vec()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    pub fn current_operation(&self) -> Option<Operation> {
        self.snapshot().current_operation().cloned()
    }

    /// Append an operation named after its type and make it active
    pub fn add_operation(&self, op_type: OperationType) {
        tracing::debug!(op_type = %op_type, "Adding operation");
        self.edit_structure(|structure| structure.add_operation(op_type));
    }

    /// Remove an operation; the last one is replaced by an empty `MyQuery`
    pub fn remove_operation(&self, index: usize) {
        tracing::debug!(index, "Removing operation");
        self.edit_structure(|structure| structure.remove_operation(index));
    }

    /// Switch the active tab
    ///
    /// An out-of-range index is ignored. The query text is left as is since
    /// it already renders every operation.
    pub fn set_active_operation(&self, index: usize) {
        self.store.update(|state| match state.structure.set_active_operation(index) {
            Some(structure) => {
                tracing::debug!(index, "Setting active operation");
                SessionState {
                    structure,
                    ..state.clone()
                }
            }
            None => {
                tracing::warn!(
                    index,
                    operations = state.structure.operations.len(),
                    "Ignoring out-of-range active operation"
                );
                state.clone()
            }
        });
    }

    /// Replace the whole structure and regenerate the query text
    pub fn update_query_structure(&self, structure: OperationStructure) {
        tracing::debug!(operations = structure.operations.len(), "Updating query structure");
        self.edit_structure(move |_| structure);
    }

    /// Replace the active operation and regenerate the query text
    pub fn update_current_operation(&self, operation: Operation) {
        tracing::debug!(name = %operation.name, "Updating current operation");
        self.edit_structure(move |structure| structure.update_active_operation(operation));
    }

    /// Select `field_name` under `field_path` in the active operation
    pub fn add_field_to_query(&self, field_path: &[String], field_name: &str, args: &[TreeArgument]) {
        tracing::debug!(?field_path, field_name, args = args.len(), "Adding field to query");
        self.edit_structure(|structure| structure.add_field(field_path, field_name, args));
    }

    /// Deselect `field_name` under `field_path` in the active operation
    pub fn remove_field_from_query(&self, field_path: &[String], field_name: &str) {
        tracing::debug!(?field_path, field_name, "Removing field from query");
        self.edit_structure(|structure| structure.remove_field(field_path, field_name));
    }

    fn edit_structure<F>(&self, edit: F)
    where
        F: FnOnce(&OperationStructure) -> OperationStructure,
    {
        let state = self.store.update(|state| {
            let structure = edit(&state.structure);
            let query = build_query(&structure);
            SessionState {
                query,
                structure,
                ..state.clone()
            }
        });
        tracing::trace!(query = %state.query, "Rebuilt query from structure");
    }

    // =========================================================================
    // Editors
    // =========================================================================

    /// Replace the query text and re-parse the structure from it
    pub fn update_query(&self, text: impl Into<String>) {
        let query = text.into();
        tracing::debug!(length = query.len(), "Updating query text");
        self.store.update(move |state| {
            let structure = parse_query(&query);
            SessionState {
                query,
                structure,
                ..state.clone()
            }
        });
    }

    pub fn update_variables(&self, text: impl Into<String>) {
        let variables = text.into();
        tracing::debug!(length = variables.len(), "Updating variables text");
        self.store.update(move |state| SessionState {
            variables,
            ..state.clone()
        });
    }

    /// Point the session at a new endpoint
    ///
    /// The demo schema key is forgotten; the loaded schema stays until the
    /// next introspection.
    pub fn set_endpoint(&self, endpoint: impl Into<String>) {
        let endpoint = endpoint.into();
        tracing::debug!(endpoint = %endpoint, "Setting endpoint");
        self.store.update(move |state| SessionState {
            endpoint,
            current_schema_key: None,
            ..state.clone()
        });
    }

    /// Load a bundled demo schema and point the endpoint at `demo://<key>`
    pub fn load_demo_schema(&self, key: &str) -> Result<(), PlaygroundError> {
        let registry = self.available_schemas();
        let Some(demo) = registry.get(key) else {
            tracing::warn!(key, "Unknown demo schema");
            return Err(PlaygroundError::UnknownDemoSchema {
                key: key.to_string(),
            });
        };

        tracing::debug!(key, name = %demo.name, "Loading demo schema");
        let schema = Arc::new(demo.schema.clone());
        self.store.update(|state| SessionState {
            schema: Some(schema),
            current_schema_key: Some(key.to_string()),
            endpoint: SchemaRegistry::demo_endpoint(key),
            ..state.clone()
        });
        Ok(())
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// Post the query text and variables to the endpoint and store the response
    pub async fn execute_query(&self) {
        let (generation, state) = self.begin_request(RequestKind::Query);
        tracing::info!(endpoint = %state.endpoint, "Executing GraphQL query");

        match self.send_query(&state).await {
            Ok(results) => {
                self.finish_request(RequestKind::Query, generation, |state| SessionState {
                    results: Some(results),
                    ..state.clone()
                });
            }
            Err(err) => {
                self.fail_request(RequestKind::Query, generation, "Query execution failed", err)
            }
        }
    }

    /// Introspect the endpoint and store the returned schema
    pub async fn introspect_schema(&self) {
        let (generation, state) = self.begin_request(RequestKind::Introspection);
        tracing::info!(endpoint = %state.endpoint, "Starting schema introspection");

        match self.send_introspection(&state).await {
            Ok(schema) => {
                tracing::info!(types = schema.types.len(), "Schema introspection succeeded");
                let schema = Arc::new(schema);
                self.finish_request(RequestKind::Introspection, generation, |state| {
                    SessionState {
                        schema: Some(schema),
                        ..state.clone()
                    }
                });
            }
            Err(err) => self.fail_request(
                RequestKind::Introspection,
                generation,
                "Schema introspection failed",
                err,
            ),
        }
    }

    async fn send_query(&self, state: &SessionState) -> Result<Value, PlaygroundError> {
        let variables = decode_variables(&state.variables)?;
        ensure_live_endpoint(&state.endpoint)?;

        let request = GraphQLRequest::new(state.query.clone()).with_variables(variables);
        self.transport.post_json(&state.endpoint, &request).await
    }

    async fn send_introspection(&self, state: &SessionState) -> Result<SchemaDocument, PlaygroundError> {
        ensure_live_endpoint(&state.endpoint)?;

        let request = GraphQLRequest::new(INTROSPECTION_QUERY);
        let response = self.transport.post_json(&state.endpoint, &request).await?;
        extract_schema(response)
    }

    /// Mark a request as started and return its generation with the state it sees
    fn begin_request(&self, kind: RequestKind) -> (u64, Arc<SessionState>) {
        let generation = self.requests.generation(kind).fetch_add(1, Ordering::SeqCst) + 1;
        let state = self.store.update(|state| {
            self.requests.in_flight.fetch_add(1, Ordering::SeqCst);
            SessionState {
                loading: true,
                error: None,
                ..state.clone()
            }
        });
        (generation, state)
    }

    /// Commit a request outcome unless a newer request of the same kind has
    /// started since; `loading` clears with the last request in flight
    fn finish_request<F>(&self, kind: RequestKind, generation: u64, commit: F)
    where
        F: FnOnce(&SessionState) -> SessionState,
    {
        self.store.update(|state| {
            let pending = self.requests.in_flight.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
            let next = if self.requests.generation(kind).load(Ordering::SeqCst) == generation {
                commit(state)
            } else {
                tracing::debug!(?kind, generation, "Dropping outcome of superseded request");
                state.clone()
            };
            SessionState {
                loading: pending > 0,
                ..next
            }
        });
    }

    fn fail_request(&self, kind: RequestKind, generation: u64, context: &str, err: PlaygroundError) {
        tracing::warn!(code = err.error_code(), error = %err, "{}", context);
        let message = err.to_string();
        self.finish_request(kind, generation, |state| SessionState {
            error: Some(message),
            ..state.clone()
        });
    }
}

fn ensure_live_endpoint(endpoint: &str) -> Result<(), PlaygroundError> {
    if SchemaRegistry::is_demo_endpoint(endpoint) {
        return Err(PlaygroundError::DemoEndpoint {
            endpoint: endpoint.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Transport answering every request with a fixed body and recording requests
    struct CannedTransport {
        response: Value,
        requests: Mutex<Vec<(String, GraphQLRequest)>>,
    }

    impl CannedTransport {
        fn new(response: Value) -> Arc<Self> {
            Arc::new(Self {
                response,
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Transport for CannedTransport {
        async fn post_json(
            &self,
            endpoint: &str,
            request: &GraphQLRequest,
        ) -> Result<Value, PlaygroundError> {
            self.requests
                .lock()
                .unwrap()
                .push((endpoint.to_string(), request.clone()));
            Ok(self.response.clone())
        }
    }

    fn session_with(transport: Arc<dyn Transport>) -> PlaygroundSession {
        PlaygroundSession::with_transport(PlaygroundConfig::default(), transport).unwrap()
    }

    fn path(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_structural_edits_rebuild_query() {
        let session = session_with(CannedTransport::new(json!({})));
        session.add_field_to_query(&[], "users", &[]);
        session.add_field_to_query(&path(&["users"]), "name", &[]);

        assert_eq!(
            session.snapshot().query,
            "query MyQuery {\n  users {\n    name\n  }\n}"
        );

        session.remove_field_from_query(&path(&["users"]), "name");
        assert_eq!(session.snapshot().query, "query MyQuery {\n  users\n}");
    }

    #[test]
    fn test_update_query_reparses_structure() {
        let session = session_with(CannedTransport::new(json!({})));
        session.update_query("mutation Save { save(id: 1) { ok } }");

        let state = session.snapshot();
        assert_eq!(state.query, "mutation Save { save(id: 1) { ok } }");
        let operation = state.current_operation().unwrap();
        assert_eq!(operation.op_type, OperationType::Mutation);
        assert_eq!(operation.fields[0].fields[0].name, "ok");
    }

    #[test]
    fn test_update_query_with_garbage_keeps_text() {
        let session = session_with(CannedTransport::new(json!({})));
        session.update_query("query {");

        let state = session.snapshot();
        assert_eq!(state.query, "query {");
        assert_eq!(state.current_operation().unwrap().name, "ParseError");
    }

    #[test]
    fn test_set_active_operation_ignores_out_of_range() {
        let session = session_with(CannedTransport::new(json!({})));
        session.add_operation(OperationType::Mutation);
        session.set_active_operation(0);
        assert_eq!(session.snapshot().structure.active_operation_index, 0);

        session.set_active_operation(9);
        assert_eq!(session.snapshot().structure.active_operation_index, 0);
    }

    #[test]
    fn test_load_demo_schema() {
        let session = session_with(CannedTransport::new(json!({})));
        session.load_demo_schema("ecommerce").unwrap();

        let state = session.snapshot();
        assert_eq!(state.endpoint, "demo://ecommerce");
        assert_eq!(state.current_schema_key.as_deref(), Some("ecommerce"));
        assert_eq!(session.field_return_type("Query", "products").as_deref(), Some("Product"));
        assert!(session.is_valid_argument("Query", "products", "inStock"));
        assert!(!session.is_valid_field("Product", "weight"));
    }

    #[test]
    fn test_unknown_demo_schema_leaves_state() {
        let session = session_with(CannedTransport::new(json!({})));
        let err = session.load_demo_schema("nope").unwrap_err();

        assert_eq!(err.error_code(), "UNKNOWN_DEMO_SCHEMA");
        assert!(session.snapshot().schema.is_none());
        assert_eq!(session.snapshot().endpoint, "https://countries.trevorblades.com/");
    }

    #[tokio::test]
    async fn test_execute_posts_query_and_variables() {
        let transport = CannedTransport::new(json!({ "data": { "countries": [] } }));
        let session = session_with(transport.clone());

        session.execute_query().await;

        let state = session.snapshot();
        assert_eq!(state.results, Some(json!({ "data": { "countries": [] } })));
        assert!(!state.loading);
        assert!(state.error.is_none());

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "https://countries.trevorblades.com/");
        assert_eq!(requests[0].1.variables, Some(json!({ "first": 5 })));
    }

    #[tokio::test]
    async fn test_execute_against_demo_endpoint_fails_locally() {
        let transport = CannedTransport::new(json!({}));
        let session = session_with(transport.clone());
        session.load_demo_schema("blog").unwrap();

        session.execute_query().await;

        let state = session.snapshot();
        assert!(state.error.as_deref().unwrap().contains("demo://blog"));
        assert!(!state.loading);
        assert!(transport.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_introspection_sends_query_only() {
        let transport = CannedTransport::new(json!({
            "data": { "__schema": { "types": [], "queryType": { "name": "Query" } } }
        }));
        let session = session_with(transport.clone());

        session.introspect_schema().await;

        assert!(session.snapshot().schema.is_some());
        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests[0].1.query, INTROSPECTION_QUERY);
        assert!(requests[0].1.variables.is_none());
    }
}
