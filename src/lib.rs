//! # GQL Playground
//!
//! Client-side state for a GraphQL playground: the query being edited, its
//! variables, the loaded schema and the results of the last request.
//!
//! ## Features
//!
//! - **Query Builder**: Render a structured operation tree as GraphQL text
//! - **Query Parser**: Rebuild the operation tree from edited text
//! - **Schema Helpers**: Field/argument lookups and validation, permissive until a schema loads
//! - **Demo Schemas**: Bundled blog, e-commerce and GitHub-style schemas
//! - **Observable State**: Subscribe to every state change of a session
//! - **Execution & Introspection**: JSON POST to the configured endpoint
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use playground::prelude::*;
//!
//! let session = PlaygroundSession::new(PlaygroundConfig::default())?;
//! session.load_demo_schema("blog")?;
//!
//! // Pick fields from the schema
//! for field in session.available_fields_for_path(&["user"]) {
//!     println!("{}", field.name);
//! }
//!
//! session.add_field_to_query(&[], "user", &[TreeArgument::new("id", "\"42\"", "ID")]);
//! session.add_field_to_query(&["user".to_string()], "name", &[]);
//!
//! // query MyQuery {
//! //   user(id: "42") {
//! //     name
//! //   }
//! // }
//! println!("{}", session.snapshot().query);
//! ```

pub mod config;
pub mod core;
pub mod session;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Operation tree ===
    pub use crate::core::{
        Operation, OperationStructure, OperationType, TreeArgument, TreeField, VariableDef,
        build_query, parse_query, try_parse_query,
    };

    // === Schema ===
    pub use crate::core::lookup;
    pub use crate::core::{
        DemoSchema, NamedType, SchemaArgument, SchemaDocument, SchemaField, SchemaRegistry,
        TypeKind, TypeRef,
    };

    // === Errors ===
    pub use crate::core::{PlaygroundError, QueryParseError};

    // === State ===
    pub use crate::core::{Store, Unsubscribe};
    pub use crate::session::{
        GraphQLRequest, HttpTransport, PlaygroundSession, SessionState, Transport,
    };

    // === Config ===
    pub use crate::config::PlaygroundConfig;

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use serde_json::Value;
}
