//! Orgtrawl main entry point
//!
//! Command-line interface for the orgtrawl inventory crawler.

use anyhow::{bail, Context};
use clap::Parser;
use orgtrawl::config::{load_config_with_hash, Config, StorageChoice};
use orgtrawl::crawler::{run_crawler, CrawlOptions};
use orgtrawl::enumerator::InventoryClient;
use orgtrawl::progress::{LogProgresser, Progresser};
use orgtrawl::storage::{MemoryStorage, SqliteStorage, Storage};
use orgtrawl::template::render_str;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

/// Starter configuration written by --init-config
const CONFIG_TEMPLATE: &str = r#"[crawler]
max-concurrent-enumerations = 8
max-retries = 3
retry-base-delay-ms = 250

[provider]
api-base-url = "{api_base_url}"
directory-credentials-path = "{credentials_path}"
admin-email = "{admin_email}"
organization-id = "{organization_id}"

[output]
storage = "sqlite"
database-path = "./inventory.db"
"#;

/// Orgtrawl: a cloud organization inventory crawler
///
/// Walks an organization's resource hierarchy, writes every discovered
/// resource into storage, and reports a summary. The exit status is
/// non-zero when any subtree failed to enumerate.
#[derive(Parser, Debug)]
#[command(name = "orgtrawl")]
#[command(version)]
#[command(about = "Cloud organization inventory crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG", required_unless_present = "init_config")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Crawl into in-memory storage and discard it; nothing is persisted
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show stored inventory counts from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,

    /// Write a starter configuration file to the given path and exit
    #[arg(long, value_name = "PATH")]
    init_config: Option<PathBuf>,

    /// Organization id used when generating a starter configuration
    #[arg(long, value_name = "ID", default_value = "000000000000")]
    organization_id: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    if let Some(path) = &cli.init_config {
        return handle_init_config(path, &cli.organization_id);
    }

    let config_path = cli.config.as_deref().expect("clap enforces CONFIG");
    tracing::info!("Loading configuration from: {}", config_path.display());
    let (config, config_hash) = load_config_with_hash(config_path)
        .with_context(|| format!("failed to load configuration from {}", config_path.display()))?;
    tracing::info!("Configuration loaded (hash: {})", config_hash);

    if cli.stats {
        handle_stats(&config, &config_hash)
    } else {
        handle_crawl(config, config_hash, cli.dry_run).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("orgtrawl=info,warn"),
            1 => EnvFilter::new("orgtrawl=debug,info"),
            2 => EnvFilter::new("orgtrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles --init-config: writes a starter configuration file
fn handle_init_config(path: &Path, organization_id: &str) -> anyhow::Result<()> {
    let values: HashMap<String, String> = [
        ("api_base_url", "https://inventory.example.com"),
        ("credentials_path", "/etc/orgtrawl/directory.json"),
        ("admin_email", "admin@example.com"),
        ("organization_id", organization_id),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let content = render_str(CONFIG_TEMPLATE, &values)?;
    std::fs::write(path, content)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote starter configuration to {}", path.display());
    println!("Edit the [provider] section before crawling.");
    Ok(())
}

/// Handles --stats: prints stored inventory counts per kind
fn handle_stats(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    if config.output.storage != StorageChoice::Sqlite {
        bail!("--stats requires storage = \"sqlite\"");
    }

    let mut storage = SqliteStorage::open(Path::new(&config.output.database_path), config_hash)?;

    println!("Database: {}\n", config.output.database_path);
    let kinds = storage.kinds()?;
    if kinds.is_empty() {
        println!("No stored inventory.");
    } else {
        for kind in &kinds {
            println!("  {:20} {}", kind.to_string(), storage.count(Some(*kind))?);
        }
        println!("\nTotal: {} resources, {} kinds", storage.count(None)?, kinds.len());
    }

    // Read-only use of the session
    storage.rollback()?;
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_hash: String, dry_run: bool) -> anyhow::Result<()> {
    let storage: Arc<Mutex<dyn Storage>> = if dry_run || config.output.storage == StorageChoice::Memory
    {
        if dry_run {
            tracing::info!("Dry run: crawling into in-memory storage");
        }
        Arc::new(Mutex::new(MemoryStorage::new()))
    } else {
        Arc::new(Mutex::new(SqliteStorage::open(
            Path::new(&config.output.database_path),
            &config_hash,
        )?))
    };

    let progresser = Arc::new(LogProgresser::new());
    let client = InventoryClient::new(&config.provider.api_base_url)?;
    let options = CrawlOptions::from(&config.crawler);

    // Ctrl-C cancels the run; already-written state is rolled back below
    let cancel = options.cancel.clone();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling crawl");
            interrupt.cancel();
        }
    });

    let result = run_crawler(
        Arc::clone(&storage),
        progresser.clone(),
        client,
        Path::new(&config.provider.directory_credentials_path),
        &config.provider.admin_email,
        &config.provider.organization_id,
        options,
    )
    .await;

    match result {
        Ok(()) => {
            let summary = progresser.summary();
            let cancelled = cancel.is_cancelled();
            {
                let mut storage = storage.lock().unwrap();
                if dry_run || cancelled {
                    storage.rollback()?;
                } else {
                    storage.commit()?;
                }
            }

            if cancelled {
                println!("Crawl cancelled; nothing persisted.");
                std::process::exit(130);
            }

            println!(
                "Crawl complete: {} objects, {} warnings, {} errors",
                summary.objects, summary.warnings, summary.errors
            );
            if summary.errors > 0 {
                tracing::error!("{} subtree(s) failed to enumerate", summary.errors);
                std::process::exit(1);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            let mut storage = storage.lock().unwrap();
            let _ = storage.rollback();
            Err(e.into())
        }
    }
}
