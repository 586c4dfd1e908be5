//! Core module containing the schema model, the operation tree and the
//! conversions between query text and structure

pub mod builder;
pub mod error;
pub mod lookup;
pub mod operation;
pub mod parser;
pub mod registry;
pub mod schema;
pub mod store;

pub use builder::build_query;
pub use error::PlaygroundError;
pub use operation::{
    Operation, OperationStructure, OperationType, TreeArgument, TreeField, VariableDef,
};
pub use parser::{QueryParseError, parse_query, try_parse_query};
pub use registry::{DemoSchema, SchemaRegistry};
pub use schema::{NamedType, SchemaArgument, SchemaDocument, SchemaField, TypeKind, TypeRef};
pub use store::{Store, Unsubscribe};
