use std::io::Read;

use anyhow::Context;
use canopy_sdk::RequestFacade;
use canopy_server::{CanopyServer, ServerConfig};
use colored::Colorize;
use serde_json::{json, Value};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(&cli)?;
    match cli.command {
        Command::Serve(args) => cmd_serve(config, args),
        Command::Create(args) => cmd_create(&config, args, &cli.format),
        Command::Ancestor(args) => cmd_ancestor(&config, args, &cli.format),
    }
}

fn resolve_config(cli: &Cli) -> anyhow::Result<ServerConfig> {
    resolve_config_with(cli, |key| std::env::var(key).ok())
}

/// Defaults, then the config file, then the environment, then flags.
fn resolve_config_with(cli: &Cli, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<ServerConfig> {
    let config = match &cli.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    let mut config = config.apply_env_with(lookup)?;
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    tracing::debug!(db = %config.db_path.display(), bind = %config.bind_addr, "resolved configuration");
    Ok(config)
}

fn cmd_serve(mut config: ServerConfig, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    // Opening the database happens before the runtime starts so that a bad
    // database path stops the process right away.
    let server = CanopyServer::open(config)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn cmd_create(config: &ServerConfig, args: CreateArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let text = read_tree_arg(&args.tree)?;
    let tree: Value = serde_json::from_str(&text).context("tree is not valid JSON")?;
    let facade = RequestFacade::open(&config.db_path)?;
    let created = facade.create_tree_response(&tree)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&created)?),
        OutputFormat::Text => {
            println!("{} Stored tree", "✓".green().bold());
            println!("  id: {}", created.id.to_string().yellow());
        }
    }
    Ok(())
}

fn cmd_ancestor(config: &ServerConfig, args: AncestorArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let query = json!({
        "id": args.id,
        "node_a": parse_value(&args.node_a),
        "node_b": parse_value(&args.node_b),
    });
    let facade = RequestFacade::open(&config.db_path)?;
    let found = facade.find_ancestor_response(&query)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&found)?),
        OutputFormat::Text => println!(
            "Lowest common ancestor in tree {}: {}",
            args.id.to_string().yellow(),
            found.node.to_string().bold()
        ),
    }
    Ok(())
}

fn read_tree_arg(arg: &str) -> anyhow::Result<String> {
    if arg == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("cannot read tree from stdin")?;
        Ok(text)
    } else if let Some(path) = arg.strip_prefix('@') {
        std::fs::read_to_string(path).with_context(|| format!("cannot read tree from {path}"))
    } else {
        Ok(arg.to_string())
    }
}

/// JSON if it parses, otherwise the raw text as a JSON string.
fn parse_value(arg: &str) -> Value {
    serde_json::from_str(arg).unwrap_or_else(|_| Value::String(arg.to_string()))
}
