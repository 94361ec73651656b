mod cli;

use std::collections::BTreeMap;

use clap::Parser;
use cli::{Cli, Commands, ResolveArgs};
use linkcache::cache::FjallCache;
use linkcache::config::{CacheBackend, Config};
use linkcache::resource::Resolver;
use tracing_subscriber::EnvFilter;

type AnyError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), AnyError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = match cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Resolve(args) => resolve(config, args).await?,
        Commands::Serve(args) => linkcache::api::run(config, args.address).await?,
        Commands::Prune => prune(&config)?,
    }

    Ok(())
}

async fn resolve(config: Config, args: ResolveArgs) -> Result<(), AnyError> {
    let resolver = Resolver::from_config(&config)?;
    let mut resource = resolver.instance(&args.url).await?;

    let fields = if args.fields.is_empty() {
        vec!["meta".to_string(), "images".to_string()]
    } else {
        args.fields
    };

    let mut values = BTreeMap::new();
    for field in &fields {
        if let Some(value) = resource.get_with(field, args.refresh).await? {
            values.insert(field.clone(), value);
        }
    }

    let output = serde_json::json!({
        "url": resource.url(),
        "kind": resource.kind(),
        "cache_key": resource.cache_key(),
        "mime_type": resource.mime_type(),
        "expires_at": resource.identity().expires_at,
        "supported_fields": resource.supported_fields(),
        "fields": values,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

fn prune(config: &Config) -> Result<(), AnyError> {
    if config.cache.backend != CacheBackend::Fjall {
        println!("cache backend is {:?}, nothing to prune", config.cache.backend);
        return Ok(());
    }

    let store = FjallCache::open(&config.cache.path)?;
    let stats = store.prune_expired()?;
    println!("scanned {} entries, pruned {}", stats.scanned, stats.pruned);

    for (namespace, count) in store.stats()?.per_namespace {
        println!("  {namespace}: {count}");
    }

    Ok(())
}
