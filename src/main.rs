mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use vidstore_core::config::{Backend, Config};

/// Load the config file, then apply environment overrides.
fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = Config::load(path)?;
    config.apply_env()?;
    Ok(config)
}

async fn serve(
    config_path: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
    backend: Option<Backend>,
) -> Result<()> {
    let mut config = load_config(config_path)?;

    // CLI flags win over file and environment.
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(backend) = backend {
        config.storage.backend = backend;
    }

    tracing::info!("Starting vidstore {}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Server will listen on {}:{} using the {} backend",
        config.server.host,
        config.server.port,
        config.storage.backend
    );

    let store = vidstore_db::open_store(&config.storage)
        .await
        .context("failed to open record store")?;

    vidstore_server::start(config, store).await?;
    Ok(())
}

async fn list_records(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let store = vidstore_db::open_store(&config.storage).await?;

    let mut records = store.list().await?;
    records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    store.close().await?;

    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

async fn get_record(config_path: Option<&Path>, id: &str) -> Result<()> {
    let config = load_config(config_path)?;
    let store = vidstore_db::open_store(&config.storage).await?;

    let record = store.get_by_str(id).await?;
    store.close().await?;

    match record {
        Some(record) => {
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        None => anyhow::bail!("video {id} not found"),
    }
}

fn validate_config(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;

    println!("✓ Configuration is valid");
    println!("  Server: {}:{}", config.server.host, config.server.port);
    match &config.server.static_dir {
        Some(dir) => println!("  Static dir: {}", dir.display()),
        None => println!("  Static dir: (built-in player)"),
    }
    println!("  Listing enabled: {}", config.server.enable_listing);
    println!("  Backend: {}", config.storage.backend);
    match config.storage.backend {
        Backend::Json => println!("  Data file: {}", config.storage.data_file.display()),
        Backend::Sqlite => println!(
            "  SQLite: {} (table {})",
            config.storage.sqlite_path.display(),
            config.storage.collection
        ),
        Backend::Mongodb => println!(
            "  MongoDB: database {:?}, collection {}",
            config.storage.database, config.storage.collection
        ),
    }
    println!("  Storage timeout: {}s", config.storage.timeout().as_secs());

    let warnings = config.validate();
    for warning in &warnings {
        println!("  ⚠ {warning}");
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "vidstore=trace,vidstore_core=trace,vidstore_db=trace,vidstore_server=trace,tower_http=debug"
                .to_string()
        } else {
            "vidstore=debug,vidstore_db=debug,vidstore_server=debug,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Serve {
            host,
            port,
            backend,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(serve(config_path, host, port, backend))
        }
        Commands::List => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(list_records(config_path))
        }
        Commands::Get { id } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(get_record(config_path, &id))
        }
        Commands::Validate => validate_config(config_path),
        Commands::Version => {
            println!("vidstore {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
