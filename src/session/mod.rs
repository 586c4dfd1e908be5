//! Session layer: the state container and its HTTP boundary

pub mod introspection;
pub mod manager;
pub mod state;
pub mod transport;

pub use introspection::{INTROSPECTION_QUERY, extract_schema};
pub use manager::PlaygroundSession;
pub use state::SessionState;
pub use transport::{GraphQLRequest, HttpTransport, Transport, decode_variables};
