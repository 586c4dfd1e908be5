//! Introspection-shaped schema documents
//!
//! Only the members the playground reads are modelled (`name`, `kind`,
//! `description`, `fields`, `args`, `ofType`). Anything else a server returns
//! (interfaces, enum values, directives) is dropped while decoding.

use serde::{Deserialize, Serialize};

/// Kind of a named type or of a type reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
    /// Any kind this crate does not know about
    #[serde(other)]
    Other,
}

/// Reference to a type, possibly wrapped in `LIST` / `NON_NULL` modifiers
///
/// Real introspection results leave `name` empty on wrapper kinds, while the
/// bundled demo schemas repeat the inner name on the wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRef {
    #[serde(default)]
    pub name: Option<String>,

    pub kind: TypeKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub of_type: Option<Box<TypeRef>>,
}

impl TypeRef {
    /// Reference to a named leaf or object type
    pub fn named(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: Some(name.into()),
            kind,
            of_type: None,
        }
    }

    /// Wrap `inner` in a modifier (`LIST` or `NON_NULL`)
    pub fn wrap(kind: TypeKind, inner: TypeRef) -> Self {
        Self {
            name: inner.name.clone(),
            kind,
            of_type: Some(Box::new(inner)),
        }
    }

    /// Unwrap a single modifier layer of the given kind
    ///
    /// Returns `self` when the reference is not of that kind or has no inner type.
    pub fn unwrap_once(&self, kind: TypeKind) -> &TypeRef {
        match &self.of_type {
            Some(inner) if self.kind == kind => inner,
            _ => self,
        }
    }
}

/// Argument declared on a schema field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaArgument {
    pub name: String,

    #[serde(rename = "type")]
    pub type_ref: TypeRef,
}

/// Field declared on an object or input object type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,

    #[serde(rename = "type")]
    pub type_ref: TypeRef,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub args: Vec<SchemaArgument>,
}

/// A type declared by the schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedType {
    pub name: String,

    pub kind: TypeKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Present only for `OBJECT` / `INPUT_OBJECT` kinds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<SchemaField>>,
}

impl NamedType {
    /// Fields of this type, empty for leaf kinds
    pub fn fields(&self) -> &[SchemaField] {
        self.fields.as_deref().unwrap_or_default()
    }

    /// Find a field by name
    pub fn field(&self, field_name: &str) -> Option<&SchemaField> {
        self.fields().iter().find(|f| f.name == field_name)
    }
}

/// `{ name }` reference to a root operation type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootTypeName {
    pub name: String,
}

/// A whole schema as returned by `__schema` introspection
///
/// Immutable once loaded: sessions replace the document wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDocument {
    pub types: Vec<NamedType>,

    #[serde(default)]
    pub query_type: Option<RootTypeName>,

    #[serde(default)]
    pub mutation_type: Option<RootTypeName>,
}

/// Root query type name used when the document does not declare one
pub const DEFAULT_QUERY_TYPE: &str = "Query";

impl SchemaDocument {
    /// Find a type by name
    ///
    /// The first declaration wins when a document repeats a type name.
    pub fn find_type(&self, type_name: &str) -> Option<&NamedType> {
        self.types.iter().find(|t| t.name == type_name)
    }

    /// Find a field on a type
    pub fn find_field(&self, type_name: &str, field_name: &str) -> Option<&SchemaField> {
        self.find_type(type_name)?.field(field_name)
    }

    /// Name of the root query type
    pub fn query_type_name(&self) -> &str {
        self.query_type
            .as_ref()
            .map(|root| root.name.as_str())
            .unwrap_or(DEFAULT_QUERY_TYPE)
    }

    /// Name of the root mutation type, if the schema has one
    pub fn mutation_type_name(&self) -> Option<&str> {
        self.mutation_type.as_ref().map(|root| root.name.as_str())
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_introspection_shape() {
        let doc: SchemaDocument = serde_json::from_value(json!({
            "types": [
                {
                    "name": "Query",
                    "kind": "OBJECT",
                    "description": null,
                    "fields": [{
                        "name": "tags",
                        "type": {
                            "name": null,
                            "kind": "NON_NULL",
                            "ofType": { "name": "Tag", "kind": "OBJECT" }
                        },
                        "args": null
                    }]
                },
                { "name": "String", "kind": "SCALAR", "fields": null },
                { "name": "Node", "kind": "INTERFACE", "interfaces": [] }
            ],
            "queryType": { "name": "Query" },
            "mutationType": null
        }))
        .unwrap();

        assert_eq!(doc.types.len(), 3);
        assert_eq!(doc.mutation_type_name(), None);
        let field = doc.find_field("Query", "tags").unwrap();
        assert!(field.args.is_empty());
        assert_eq!(field.type_ref.kind, TypeKind::NonNull);
        assert_eq!(field.type_ref.name, None);
        assert!(doc.find_type("String").unwrap().fields().is_empty());
    }

    #[test]
    fn test_unknown_kind_decodes_as_other() {
        let type_ref: TypeRef =
            serde_json::from_value(json!({ "name": "X", "kind": "SOMETHING_NEW" })).unwrap();
        assert_eq!(type_ref.kind, TypeKind::Other);
    }

    #[test]
    fn test_query_type_defaults_to_query() {
        let doc = SchemaDocument {
            types: vec![],
            query_type: None,
            mutation_type: None,
        };
        assert_eq!(doc.query_type_name(), "Query");
    }

    #[test]
    fn test_unwrap_once() {
        let list = TypeRef::wrap(TypeKind::List, TypeRef::named("User", TypeKind::Object));
        assert_eq!(list.unwrap_once(TypeKind::List).kind, TypeKind::Object);
        assert_eq!(list.unwrap_once(TypeKind::NonNull).kind, TypeKind::List);
    }
}
