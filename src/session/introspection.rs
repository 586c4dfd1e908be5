//! Schema introspection request and response handling

use crate::core::error::PlaygroundError;
use crate::core::schema::SchemaDocument;
use serde_json::Value;

/// Introspection query sent to live endpoints
///
/// Requests exactly the members [`SchemaDocument`] models.
pub const INTROSPECTION_QUERY: &str = r#"query IntrospectionQuery {
  __schema {
    types {
      name
      kind
      description
      fields {
        name
        type {
          name
          kind
          ofType {
            name
            kind
          }
        }
        args {
          name
          type {
            name
            kind
            ofType {
              name
              kind
            }
          }
        }
      }
    }
    queryType {
      name
    }
    mutationType {
      name
    }
  }
}"#;

/// Extract `data.__schema` from an introspection response
pub fn extract_schema(mut response: Value) -> Result<SchemaDocument, PlaygroundError> {
    let schema = response
        .get_mut("data")
        .and_then(|data| data.get_mut("__schema"))
        .map(Value::take)
        .filter(|schema| !schema.is_null());

    let Some(schema) = schema else {
        return Err(PlaygroundError::MissingSchema {
            errors: graphql_error_messages(&response),
        });
    };

    serde_json::from_value(schema).map_err(|e| PlaygroundError::InvalidSchema {
        message: e.to_string(),
    })
}

/// `message` of every entry in a response's `errors` array
pub fn graphql_error_messages(response: &Value) -> Vec<String> {
    response
        .get("errors")
        .and_then(Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e.get("message").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
