//! # hkbase CLI
//!
//! Command-line utilities for inspecting and maintaining hkbase
//! repositories.

use anyhow::{Context, Result};
use hkbase_client::{EntityFilter, HkBase, HkBaseConfig, ImportOptions};
use hkbase_model::ContentType;
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    let config = server_config();
    tracing::debug!(url = %config.base_url, "connecting to hkbase");
    let base = HkBase::new(config).context("Failed to create hkbase client")?;

    match args[1].as_str() {
        "repos" => {
            for name in base.list_repositories().await? {
                println!("{name}");
            }
        }
        "create" => {
            let name = required_arg(&args, 2, "create <name>")?;
            base.create_repository(name).await?;
            println!("created {name}");
        }
        "delete" => {
            let name = required_arg(&args, 2, "delete <name>")?;
            base.delete_repository(name).await?;
            println!("deleted {name}");
        }
        "recreate" => {
            let name = required_arg(&args, 2, "recreate <name>")?;
            base.delete_create_repository(name).await?;
            println!("recreated {name}");
        }
        "entities" => {
            let name = required_arg(&args, 2, "entities <repository>")?;
            let repository = base.connect_repository(name).await?;
            for entity in repository.get_entities(EntityFilter::all()).await? {
                println!("{}", serde_json::to_string(&entity)?);
            }
        }
        "query" => {
            let name = required_arg(&args, 2, "query <repository> <hyql>")?;
            let query = required_arg(&args, 3, "query <repository> <hyql>")?;
            let repository = base.connect_repository(name).await?;
            for entity in repository.hyql(query).await? {
                println!("{}", serde_json::to_string(&entity)?);
            }
        }
        "import" => {
            let name = required_arg(&args, 2, "import <repository> <file> [type]")?;
            let path = required_arg(&args, 3, "import <repository> <file> [type]")?;
            let datatype: ContentType = args
                .get(4)
                .map_or(Ok(ContentType::Turtle), |t| t.parse())
                .context("Failed to parse content type")?;

            let repository = base.connect_repository(name).await?;
            let options = ImportOptions {
                as_hk: datatype == ContentType::Json,
                ..ImportOptions::default()
            };
            repository
                .import_data(PathBuf::from(path), datatype, &options)
                .await?;
            println!("imported {path} into {name}");
        }
        "help" | "--help" | "-h" => {
            print_help();
        }
        cmd => {
            eprintln!("Unknown command: {cmd}");
            print_help();
            std::process::exit(1);
        }
    }

    Ok(())
}

fn server_config() -> HkBaseConfig {
    let mut config = HkBaseConfig::default();
    if let Ok(url) = env::var("HKBASE_URL") {
        config.base_url = url;
    }
    config
}

fn required_arg<'a>(args: &'a [String], index: usize, usage: &str) -> Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .with_context(|| format!("Usage: hkbase {usage}"))
}

fn print_help() {
    println!(
        r#"hkbase CLI

USAGE:
    hkbase <COMMAND> [OPTIONS]

COMMANDS:
    repos                              List repositories
    create <name>                      Create a repository
    delete <name>                      Delete a repository
    recreate <name>                    Delete (if needed) and recreate a repository
    entities <repository>              Print all entities of a repository as JSON lines
    query <repository> <hyql>          Run a HyQL query and print matching entities
    import <repository> <file> [type]  Import a file (default type: turtle; json imports
                                       the content as hkbase entities)
    help                               Show this help message

ENVIRONMENT:
    HKBASE_URL         Server URL (default: http://localhost:3000)
    HKBASE_AUTH_TOKEN  Bearer token sent with every request

EXAMPLES:
    hkbase repos
    hkbase create books
    hkbase query books "select * where {{ ?n isA node }}"
    hkbase import books ontology.ttl turtle
"#
    );
}
