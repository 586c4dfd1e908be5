//! Structured representation of the operations in the query editor
//!
//! An [`OperationStructure`] holds one [`Operation`] per editor tab. Every
//! edit is pure: it borrows the current structure and returns a new one,
//! which keeps snapshots held by subscribers untouched.
//!
//! # Invariants
//!
//! - `operations` is never empty
//! - `active_operation_index < operations.len()`
//! - siblings in a field tree never share a name

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operation keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    #[default]
    Query,
    Mutation,
    Subscription,
}

impl OperationType {
    /// Keyword as written in query text
    pub fn keyword(&self) -> &'static str {
        match self {
            OperationType::Query => "query",
            OperationType::Mutation => "mutation",
            OperationType::Subscription => "subscription",
        }
    }

    /// Name given to new operations of this type (e.g., "MyMutation")
    pub fn default_name(&self) -> String {
        let keyword = self.keyword();
        let mut chars = keyword.chars();
        match chars.next() {
            Some(first) => format!("My{}{}", first.to_ascii_uppercase(), chars.as_str()),
            None => "My".to_string(),
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for OperationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "query" => Ok(OperationType::Query),
            "mutation" => Ok(OperationType::Mutation),
            "subscription" => Ok(OperationType::Subscription),
            other => Err(format!("Unknown operation type: {}", other)),
        }
    }
}

/// Variable declared by an operation (`$first: Int = 10`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDef {
    pub name: String,

    /// Raw type literal (e.g., "Int!", "[ID!]")
    #[serde(rename = "type")]
    pub var_type: String,

    /// Raw default value literal, if any
    #[serde(default)]
    pub default_value: Option<String>,
}

impl VariableDef {
    pub fn new(name: impl Into<String>, var_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            var_type: var_type.into(),
            default_value: None,
        }
    }
}

/// Argument passed to a selected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeArgument {
    pub name: String,

    /// Raw literal exactly as it appears in the query (e.g., `10`, `"abc"`, `$first`)
    pub value: String,

    #[serde(rename = "type")]
    pub arg_type: String,
}

impl TreeArgument {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        arg_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            arg_type: arg_type.into(),
        }
    }
}

/// A selected field; an empty `fields` list means a leaf selection
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TreeField {
    pub name: String,

    #[serde(default)]
    pub args: Vec<TreeArgument>,

    #[serde(default)]
    pub fields: Vec<TreeField>,
}

impl TreeField {
    /// Leaf field without arguments
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Depth of the subtree rooted here (a leaf has depth 1)
    pub fn depth(&self) -> usize {
        1 + self.fields.iter().map(TreeField::depth).max().unwrap_or(0)
    }
}

/// One query, mutation or subscription definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "type")]
    pub op_type: OperationType,

    pub name: String,

    #[serde(default)]
    pub variables: Vec<VariableDef>,

    #[serde(default)]
    pub fields: Vec<TreeField>,
}

impl Operation {
    /// Empty operation with the given name
    pub fn new(op_type: OperationType, name: impl Into<String>) -> Self {
        Self {
            op_type,
            name: name.into(),
            variables: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Empty operation named after its type (e.g., "MyQuery")
    pub fn named_after(op_type: OperationType) -> Self {
        Self::new(op_type, op_type.default_name())
    }
}

impl Default for Operation {
    fn default() -> Self {
        Self::named_after(OperationType::Query)
    }
}

/// All operations of the editor plus the active tab
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStructure {
    pub operations: Vec<Operation>,
    pub active_operation_index: usize,
}

impl Default for OperationStructure {
    fn default() -> Self {
        Self::single(Operation::default())
    }
}

impl OperationStructure {
    /// Structure holding exactly one, active, operation
    pub fn single(operation: Operation) -> Self {
        Self {
            operations: vec![operation],
            active_operation_index: 0,
        }
    }

    /// The operation of the active tab
    pub fn active_operation(&self) -> Option<&Operation> {
        self.operations.get(self.active_operation_index)
    }

    /// Append a new operation named after its type and make it active
    pub fn add_operation(&self, op_type: OperationType) -> Self {
        let mut operations = self.operations.clone();
        operations.push(Operation::named_after(op_type));
        let active_operation_index = operations.len() - 1;

        Self {
            operations,
            active_operation_index,
        }
    }

    /// Remove the operation at `index`
    ///
    /// Removing the last remaining operation leaves a fresh `MyQuery` in its
    /// place. The active index is clamped to the new bounds. An index past
    /// the end removes nothing.
    pub fn remove_operation(&self, index: usize) -> Self {
        let mut operations: Vec<Operation> = self
            .operations
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, op)| op.clone())
            .collect();

        if operations.is_empty() {
            operations.push(Operation::default());
        }

        let active_operation_index = self.active_operation_index.min(operations.len() - 1);

        Self {
            operations,
            active_operation_index,
        }
    }

    /// Make the operation at `index` active
    ///
    /// Returns `None` when `index` is out of range.
    pub fn set_active_operation(&self, index: usize) -> Option<Self> {
        if index >= self.operations.len() {
            return None;
        }

        Some(Self {
            operations: self.operations.clone(),
            active_operation_index: index,
        })
    }

    /// Replace the active operation
    pub fn update_active_operation(&self, operation: Operation) -> Self {
        let mut next = self.clone();
        if let Some(slot) = next.operations.get_mut(self.active_operation_index) {
            *slot = operation;
        }
        next
    }

    /// Select `field_name` under `field_path` in the active operation
    ///
    /// Missing path segments are created as bare fields. Adding a field whose
    /// name already exists at that position changes nothing, so repeated
    /// calls are idempotent.
    pub fn add_field(&self, field_path: &[String], field_name: &str, args: &[TreeArgument]) -> Self {
        let mut next = self.clone();
        let Some(operation) = next.operations.get_mut(self.active_operation_index) else {
            return next;
        };

        let mut siblings = &mut operation.fields;
        for segment in field_path {
            let position = match siblings.iter().position(|f| &f.name == segment) {
                Some(position) => position,
                None => {
                    siblings.push(TreeField::leaf(segment.as_str()));
                    siblings.len() - 1
                }
            };
            siblings = &mut siblings[position].fields;
        }

        if !siblings.iter().any(|f| f.name == field_name) {
            siblings.push(TreeField {
                name: field_name.to_string(),
                args: args.to_vec(),
                fields: Vec::new(),
            });
        }

        next
    }

    /// Deselect every child named `field_name` under `field_path` in the active operation
    ///
    /// A path that does not resolve leaves the structure unchanged.
    pub fn remove_field(&self, field_path: &[String], field_name: &str) -> Self {
        let mut next = self.clone();
        let Some(operation) = next.operations.get_mut(self.active_operation_index) else {
            return next;
        };

        let mut siblings = &mut operation.fields;
        for segment in field_path {
            match siblings.iter_mut().find(|f| &f.name == segment) {
                Some(field) => siblings = &mut field.fields,
                None => return self.clone(),
            }
        }

        siblings.retain(|f| f.name != field_name);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_names() {
        assert_eq!(OperationType::Query.default_name(), "MyQuery");
        assert_eq!(OperationType::Mutation.default_name(), "MyMutation");
        assert_eq!(OperationType::Subscription.default_name(), "MySubscription");
    }

    #[test]
    fn test_operation_type_from_str() {
        assert_eq!("mutation".parse::<OperationType>(), Ok(OperationType::Mutation));
        assert!("fragment".parse::<OperationType>().is_err());
        assert_eq!(OperationType::Subscription.to_string(), "subscription");
    }

    #[test]
    fn test_add_operation_activates_it() {
        let structure = OperationStructure::default().add_operation(OperationType::Mutation);
        assert_eq!(structure.operations.len(), 2);
        assert_eq!(structure.operations[1].name, "MyMutation");
        assert_eq!(structure.active_operation_index, 1);
    }

    #[test]
    fn test_remove_only_operation_reinserts_default() {
        let structure = OperationStructure::single(Operation::new(OperationType::Mutation, "Save"))
            .remove_operation(0);
        assert_eq!(structure, OperationStructure::default());
    }

    #[test]
    fn test_remove_operation_clamps_active_index() {
        let structure = OperationStructure::default()
            .add_operation(OperationType::Mutation)
            .add_operation(OperationType::Subscription);
        assert_eq!(structure.active_operation_index, 2);

        let structure = structure.remove_operation(2);
        assert_eq!(structure.operations.len(), 2);
        assert_eq!(structure.active_operation_index, 1);

        let structure = structure.remove_operation(0);
        assert_eq!(structure.operations.len(), 1);
        assert_eq!(structure.active_operation_index, 0);
        assert_eq!(structure.operations[0].op_type, OperationType::Mutation);
    }

    #[test]
    fn test_remove_operation_out_of_range_keeps_operations() {
        let structure = OperationStructure::default().remove_operation(5);
        assert_eq!(structure, OperationStructure::default());
    }

    #[test]
    fn test_set_active_operation_bounds() {
        let structure = OperationStructure::default().add_operation(OperationType::Query);
        assert_eq!(
            structure.set_active_operation(0).unwrap().active_operation_index,
            0
        );
        assert!(structure.set_active_operation(2).is_none());
    }

    #[test]
    fn test_add_field_creates_intermediate_nodes() {
        let structure =
            OperationStructure::default().add_field(&path(&["user", "profile"]), "bio", &[]);
        let fields = &structure.operations[0].fields;
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "user");
        assert_eq!(fields[0].fields[0].name, "profile");
        assert_eq!(fields[0].fields[0].fields[0].name, "bio");
        assert_eq!(fields[0].depth(), 3);
    }

    #[test]
    fn test_add_field_is_idempotent() {
        let args = vec![TreeArgument::new("id", "\"1\"", "ID")];
        let once = OperationStructure::default().add_field(&path(&["user"]), "name", &args);
        let twice = once.add_field(&path(&["user"]), "name", &args);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_add_field_keeps_original_untouched() {
        let original = OperationStructure::default();
        let _ = original.add_field(&[], "users", &[]);
        assert!(original.operations[0].fields.is_empty());
    }

    #[test]
    fn test_add_field_targets_active_operation() {
        let structure = OperationStructure::default()
            .add_operation(OperationType::Mutation)
            .add_field(&[], "createPost", &[]);
        assert!(structure.operations[0].fields.is_empty());
        assert_eq!(structure.operations[1].fields[0].name, "createPost");
    }

    #[test]
    fn test_remove_field() {
        let structure = OperationStructure::default()
            .add_field(&path(&["user"]), "name", &[])
            .add_field(&path(&["user"]), "email", &[]);

        let removed = structure.remove_field(&path(&["user"]), "name");
        let user = &removed.operations[0].fields[0];
        assert_eq!(user.fields.len(), 1);
        assert_eq!(user.fields[0].name, "email");

        let root_removed = structure.remove_field(&[], "user");
        assert!(root_removed.operations[0].fields.is_empty());
    }

    #[test]
    fn test_remove_field_unresolved_path_is_noop() {
        let structure = OperationStructure::default().add_field(&path(&["user"]), "name", &[]);
        assert_eq!(
            structure.remove_field(&path(&["post", "author"]), "name"),
            structure
        );
    }

    #[test]
    fn test_update_active_operation() {
        let structure = OperationStructure::default()
            .add_operation(OperationType::Mutation)
            .update_active_operation(Operation::new(OperationType::Mutation, "Renamed"));
        assert_eq!(structure.operations[0].name, "MyQuery");
        assert_eq!(structure.operations[1].name, "Renamed");
    }
}
