//! Playground walkthrough
//!
//! Builds a query against the bundled blog schema, then (with `--live`)
//! introspects and queries the public countries endpoint.
//!
//! ```text
//! cargo run --example playground
//! cargo run --example playground -- --live
//! cargo run --example playground -- --config playground.yaml --live
//! ```

use anyhow::Result;
use playground::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let live = args.iter().any(|a| a == "--live");
    let config = match args.iter().position(|a| a == "--config") {
        Some(i) => {
            let path = args
                .get(i + 1)
                .ok_or_else(|| anyhow::anyhow!("--config expects a path"))?;
            PlaygroundConfig::from_yaml_file(path)?
        }
        None => PlaygroundConfig::default(),
    };

    config.init_tracing();
    let live_endpoint = config.endpoint.clone();
    let session = PlaygroundSession::new(config)?;

    let watcher = session.subscribe(|state: &SessionState| {
        tracing::debug!(
            loading = state.loading,
            operations = state.structure.operations.len(),
            "State changed"
        );
    });

    println!("Demo schemas:");
    for (key, demo) in session.available_schemas().iter() {
        println!("  {:<10} {} - {}", key, demo.name, demo.description);
    }

    session.load_demo_schema("blog")?;
    println!("\nRoot fields of the blog schema:");
    for field in session.root_query_fields() {
        println!("  {}", field.name);
    }

    let user = vec!["user".to_string()];
    session.add_field_to_query(&[], "user", &[TreeArgument::new("id", "\"1\"", "ID")]);
    for name in ["id", "name", "email"] {
        session.add_field_to_query(&user, name, &[]);
    }
    session.add_field_to_query(&["user".to_string(), "profile".to_string()], "bio", &[]);
    session.add_operation(OperationType::Mutation);

    println!("\nBuilt query:\n{}", session.snapshot().query);

    if live {
        session.set_endpoint(live_endpoint);

        session.introspect_schema().await;
        let state = session.snapshot();
        match (&state.schema, &state.error) {
            (_, Some(error)) => println!("\nIntrospection failed: {}", error),
            (Some(schema), None) => println!("\nIntrospected {} types", schema.types.len()),
            (None, None) => println!("\nIntrospection returned no schema"),
        }

        session.update_query(PlaygroundConfig::default().query);
        session.execute_query().await;
        let state = session.snapshot();
        match (&state.results, &state.error) {
            (_, Some(error)) => println!("\nExecution failed: {}", error),
            (Some(results), None) => println!("\nResults:\n{}", serde_json::to_string_pretty(results)?),
            (None, None) => println!("\nNo results"),
        }
    }

    watcher.unsubscribe();
    Ok(())
}
