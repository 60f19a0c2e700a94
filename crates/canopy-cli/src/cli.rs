use std::net::SocketAddr;
use std::path::PathBuf;

use canopy_types::TreeId;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "canopy",
    about = "Canopy — binary tree storage with lowest common ancestor queries",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Tree database file (overrides the config file and CANOPY_DB)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Store a tree and print its id
    Create(CreateArgs),
    /// Find the lowest common ancestor of two values in a stored tree
    Ancestor(AncestorArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on (overrides the config file and CANOPY_PORT)
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

#[derive(Args)]
pub struct CreateArgs {
    /// Tree as JSON, `@FILE` to read it from a file, or `-` for stdin
    pub tree: String,
}

#[derive(Args)]
pub struct AncestorArgs {
    pub id: TreeId,
    /// First value, as JSON (bare words are taken as strings)
    pub node_a: String,
    /// Second value, as JSON (bare words are taken as strings)
    pub node_b: String,
}
