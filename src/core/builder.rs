//! Serialization of an [`OperationStructure`] into GraphQL query text
//!
//! Names and values are emitted verbatim, with no escaping or validation.

use super::operation::{Operation, OperationStructure, TreeField};
use std::fmt::Write;

/// Text produced for a structure without operations
pub const EMPTY_QUERY: &str = "query { }";

const INDENT: &str = "  ";

/// Render every operation of `structure`, separated by a blank line
///
/// ```
/// use playground::core::builder::build_query;
/// use playground::core::operation::OperationStructure;
///
/// let structure = OperationStructure::default().add_field(&[], "users", &[]);
/// assert_eq!(build_query(&structure), "query MyQuery {\n  users\n}");
/// ```
pub fn build_query(structure: &OperationStructure) -> String {
    if structure.operations.is_empty() {
        return EMPTY_QUERY.to_string();
    }

    structure
        .operations
        .iter()
        .map(build_operation)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render a single operation
pub fn build_operation(operation: &Operation) -> String {
    let mut query = String::from(operation.op_type.keyword());

    if !operation.name.is_empty() {
        query.push(' ');
        query.push_str(&operation.name);
    }

    if !operation.variables.is_empty() {
        let variables = operation
            .variables
            .iter()
            .map(|v| match &v.default_value {
                Some(default) => format!("${}: {} = {}", v.name, v.var_type, default),
                None => format!("${}: {}", v.name, v.var_type),
            })
            .collect::<Vec<_>>()
            .join(", ");
        let _ = write!(query, "({})", variables);
    }

    query.push_str(" {\n");
    write_fields(&mut query, &operation.fields, 1);
    query.push('}');
    query
}

fn write_fields(out: &mut String, fields: &[TreeField], depth: usize) {
    let indent = INDENT.repeat(depth);

    for field in fields {
        out.push_str(&indent);
        out.push_str(&field.name);

        if !field.args.is_empty() {
            let args = field
                .args
                .iter()
                .map(|a| format!("{}: {}", a.name, a.value))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = write!(out, "({})", args);
        }

        if !field.fields.is_empty() {
            out.push_str(" {\n");
            write_fields(out, &field.fields, depth + 1);
            out.push_str(&indent);
            out.push('}');
        }

        out.push('\n');
    }
}
