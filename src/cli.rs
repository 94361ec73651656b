use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "linkcache")]
#[command(about = "Resolve URLs into typed, cached resources", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to $LINKCACHE_CONFIG or config/linkcache.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve one URL and print the requested fields as JSON
    Resolve(ResolveArgs),
    /// Run the HTTP API
    Serve(ServeArgs),
    /// Remove expired entries from the fjall cache
    Prune,
}

#[derive(clap::Args, Debug)]
pub struct ResolveArgs {
    pub url: String,

    /// Field to include; repeatable (defaults to meta and images)
    #[arg(long = "field", short = 'f')]
    pub fields: Vec<String>,

    /// Recompute every requested field, ignoring cached values
    #[arg(long)]
    pub refresh: bool,
}

#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Address to bind, overriding server.bind_addr
    #[arg(long)]
    pub address: Option<SocketAddr>,
}
