//! Round-trip tests between the query builder and the query parser

use playground::prelude::*;

fn path(segments: &[&str]) -> Vec<String> {
    segments.iter().map(|s| s.to_string()).collect()
}

fn string_arg(name: &str, value: &str) -> TreeArgument {
    TreeArgument::new(name, value, "String")
}

#[test]
fn test_flat_query_round_trips() {
    let mut operation = Operation::new(OperationType::Query, "ListUsers");
    operation.variables.push(VariableDef::new("first", "Int"));
    operation.variables.push(VariableDef::new("filter", "UserFilter!"));
    operation.fields = vec![
        TreeField {
            name: "users".to_string(),
            args: vec![string_arg("first", "$first"), string_arg("filter", "$filter")],
            fields: vec![],
        },
        TreeField::leaf("viewer"),
    ];
    let structure = OperationStructure::single(operation);

    assert_eq!(parse_query(&build_query(&structure)), structure);
}

#[test]
fn test_every_operation_type_round_trips() {
    for op_type in [
        OperationType::Query,
        OperationType::Mutation,
        OperationType::Subscription,
    ] {
        let structure = OperationStructure::single(Operation::named_after(op_type))
            .add_field(&[], "ping", &[string_arg("message", "\"hi, there\"")]);
        assert_eq!(parse_query(&build_query(&structure)), structure);
    }
}

#[test]
fn test_nested_query_round_trips() {
    let structure = OperationStructure::default()
        .add_field(&[], "user", &[string_arg("id", "\"1\"")])
        .add_field(&path(&["user"]), "name", &[])
        .add_field(&path(&["user", "posts"]), "title", &[string_arg("format", "UPPER")])
        .add_field(&path(&["user", "posts"]), "comments", &[string_arg("first", "3")])
        .add_field(&path(&["user", "posts", "comments"]), "content", &[]);

    assert_eq!(parse_query(&build_query(&structure)), structure);
}

#[test]
fn test_complex_literals_round_trip() {
    let structure = OperationStructure::default().add_field(
        &[],
        "products",
        &[
            string_arg("priceRange", "{min: 10, max: 20.5}"),
            string_arg("tags", "[\"a\", \"b\"]"),
            string_arg("inStock", "true"),
        ],
    );

    assert_eq!(parse_query(&build_query(&structure)), structure);
}

#[test]
fn test_parse_then_build_normalizes_formatting() {
    let text = "query   Compact($first:Int){countries(first:$first){code name}}";
    let rebuilt = build_query(&parse_query(text));

    assert_eq!(
        rebuilt,
        "query Compact($first: Int) {\n  countries(first: $first) {\n    code\n    name\n  }\n}"
    );
    assert_eq!(build_query(&parse_query(&rebuilt)), rebuilt);
}

#[test]
fn test_only_active_single_operation_survives_parsing() {
    let structure = OperationStructure::default()
        .add_field(&[], "users", &[])
        .add_operation(OperationType::Mutation)
        .add_field(&[], "createUser", &[]);

    let parsed = parse_query(&build_query(&structure));
    assert_eq!(parsed.operations.len(), 1);
    assert_eq!(parsed.active_operation_index, 0);
    assert_eq!(parsed.operations[0], structure.operations[0]);
}

#[test]
fn test_unparseable_text_yields_parse_error_operation() {
    let parsed = parse_query("query Broken { users(first: ) { id } }");

    assert_eq!(parsed.operations.len(), 1);
    assert_eq!(parsed.operations[0].name, "ParseError");
    assert_eq!(parsed.operations[0].op_type, OperationType::Query);
    assert!(parsed.operations[0].fields.is_empty());
    assert!(parsed.operations[0].variables.is_empty());
    assert!(try_parse_query("query Broken { users(first: ) { id } }").is_err());
}
