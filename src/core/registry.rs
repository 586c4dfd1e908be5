//! Catalog of named demo schemas
//!
//! Demo schemas let the playground offer field completion without a live
//! endpoint. The bundled payloads live next to this module as JSON files.

use super::error::PlaygroundError;
use super::schema::SchemaDocument;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Scheme of the sentinel endpoints assigned when a demo schema is loaded
pub const DEMO_SCHEME: &str = "demo://";

const BUNDLED: [(&str, &str); 3] = [
    ("blog", include_str!("demo/blog.json")),
    ("ecommerce", include_str!("demo/ecommerce.json")),
    ("github", include_str!("demo/github.json")),
];

/// A named, described schema document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoSchema {
    /// Display name (e.g., "Blog & Social Media")
    pub name: String,

    /// One line summary of what the schema models
    pub description: String,

    pub schema: SchemaDocument,
}

/// Ordered mapping of demo keys to schemas
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: IndexMap<String, DemoSchema>,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the bundled `blog`, `ecommerce` and `github` schemas
    pub fn with_demo_schemas() -> Result<Self, PlaygroundError> {
        let mut registry = Self::new();
        for (key, payload) in BUNDLED {
            let demo: DemoSchema =
                serde_json::from_str(payload).map_err(|e| PlaygroundError::InvalidSchema {
                    message: format!("demo schema '{}': {}", key, e),
                })?;
            registry.register(key, demo);
        }
        Ok(registry)
    }

    /// Add or replace a schema under `key`
    pub fn register(&mut self, key: impl Into<String>, schema: DemoSchema) {
        self.schemas.insert(key.into(), schema);
    }

    pub fn get(&self, key: &str) -> Option<&DemoSchema> {
        self.schemas.get(key)
    }

    /// Keys in registration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DemoSchema)> {
        self.schemas.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Sentinel endpoint for a demo key (e.g., `demo://blog`)
    pub fn demo_endpoint(key: &str) -> String {
        format!("{}{}", DEMO_SCHEME, key)
    }

    /// Whether `endpoint` is a demo sentinel rather than a fetchable URL
    pub fn is_demo_endpoint(endpoint: &str) -> bool {
        endpoint.starts_with(DEMO_SCHEME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::lookup;

    #[test]
    fn test_bundled_schemas_decode() {
        let registry = SchemaRegistry::with_demo_schemas().unwrap();
        assert_eq!(
            registry.keys().collect::<Vec<_>>(),
            vec!["blog", "ecommerce", "github"]
        );
        assert_eq!(registry.get("blog").unwrap().name, "Blog & Social Media");
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_blog_users_resolve_to_user() {
        let registry = SchemaRegistry::with_demo_schemas().unwrap();
        let blog = &registry.get("blog").unwrap().schema;
        assert_eq!(
            lookup::return_type_name(Some(blog), "Query", "users"),
            Some("User")
        );
        let profile_fields: Vec<&str> =
            lookup::fields_along_path(Some(blog), &["user", "profile", "socialLinks"])
                .iter()
                .map(|f| f.name.as_str())
                .collect();
        assert_eq!(profile_fields, vec!["twitter", "github", "linkedin"]);
    }

    #[test]
    fn test_every_demo_has_a_query_root() {
        let registry = SchemaRegistry::with_demo_schemas().unwrap();
        for (key, demo) in registry.iter() {
            assert!(
                !lookup::root_query_fields(Some(&demo.schema)).is_empty(),
                "demo schema {} has no root query fields",
                key
            );
        }
    }

    #[test]
    fn test_demo_endpoint() {
        assert_eq!(SchemaRegistry::demo_endpoint("github"), "demo://github");
        assert!(SchemaRegistry::is_demo_endpoint("demo://github"));
        assert!(!SchemaRegistry::is_demo_endpoint("https://api.github.com/graphql"));
    }
}
