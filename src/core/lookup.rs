//! Read-only lookups over an optionally loaded schema
//!
//! The playground must stay usable before any schema is loaded, so every
//! helper takes an `Option<&SchemaDocument>`:
//!
//! - listing helpers return an empty slice when the schema is absent or the
//!   type/field is unknown
//! - validation helpers return `true` when no schema is loaded (permissive
//!   mode) and `false` on a lookup miss once one is

use super::schema::{SchemaArgument, SchemaDocument, SchemaField, TypeKind};

/// Fields declared on `type_name`
pub fn fields_of_type<'a>(schema: Option<&'a SchemaDocument>, type_name: &str) -> &'a [SchemaField] {
    schema
        .and_then(|s| s.find_type(type_name))
        .map(|t| t.fields())
        .unwrap_or_default()
}

/// Arguments declared on `type_name.field_name`
pub fn args_of_field<'a>(
    schema: Option<&'a SchemaDocument>,
    type_name: &str,
    field_name: &str,
) -> &'a [SchemaArgument] {
    schema
        .and_then(|s| s.find_field(type_name, field_name))
        .map(|f| f.args.as_slice())
        .unwrap_or_default()
}

/// Whether `type_name` declares `field_name`
///
/// Always `true` when no schema is loaded.
pub fn field_exists(schema: Option<&SchemaDocument>, type_name: &str, field_name: &str) -> bool {
    let Some(schema) = schema else {
        return true;
    };

    schema.find_field(type_name, field_name).is_some()
}

/// Whether `type_name.field_name` accepts `arg_name`
///
/// Always `true` when no schema is loaded.
pub fn argument_exists(
    schema: Option<&SchemaDocument>,
    type_name: &str,
    field_name: &str,
    arg_name: &str,
) -> bool {
    let Some(schema) = schema else {
        return true;
    };

    schema
        .find_field(type_name, field_name)
        .is_some_and(|f| f.args.iter().any(|a| a.name == arg_name))
}

/// Name of the type returned by `type_name.field_name`
///
/// Unwraps at most one `LIST` layer and then at most one `NON_NULL` layer,
/// in that order. `[User!]!` and `[[User]]` are not resolved.
pub fn return_type_name<'a>(
    schema: Option<&'a SchemaDocument>,
    type_name: &str,
    field_name: &str,
) -> Option<&'a str> {
    let field = schema?.find_field(type_name, field_name)?;

    field
        .type_ref
        .unwrap_once(TypeKind::List)
        .unwrap_once(TypeKind::NonNull)
        .name
        .as_deref()
}

/// Fields selectable at the end of `field_path`, starting from the root query type
///
/// An empty path yields the root query fields. Any segment that does not
/// resolve to a named type yields an empty slice.
pub fn fields_along_path<'a, S: AsRef<str>>(
    schema: Option<&'a SchemaDocument>,
    field_path: &[S],
) -> &'a [SchemaField] {
    let Some(document) = schema else {
        return &[];
    };

    let mut current = document.query_type_name();
    for segment in field_path {
        match return_type_name(schema, current, segment.as_ref()) {
            Some(next) => current = next,
            None => return &[],
        }
    }

    fields_of_type(schema, current)
}

/// Fields of the root query type
pub fn root_query_fields(schema: Option<&SchemaDocument>) -> &[SchemaField] {
    match schema {
        Some(document) => fields_of_type(schema, document.query_type_name()),
        None => &[],
    }
}
