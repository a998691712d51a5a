//! SCI Viewer - browse Standard Cleaning Instructions
//!
//! Reads a tenant's SCI documents from Firestore and shows them in an
//! interactive terminal UI or as plain command output.

use anyhow::{Context, Result};
use clap::Parser;
use sciviewer::catalog::{SciCatalog, SciSource};
use sciviewer::cli::{
    handle_config, list, print_documents_text, print_json, print_sites_text, show, sites, Cli,
    Commands, OutputFormat,
};
use sciviewer::config::AppConfig;
use sciviewer::store::FirestoreStore;
use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let stored = AppConfig::load_or_default(cli.config.as_deref())?;
    let mut config = stored.clone();
    if let Some(ref key) = cli.api_key {
        config.store.api_key = Some(key.clone());
    }

    // Setup logging
    init_logging(&cli, &config)?;

    if let Commands::Config(args) = cli.command() {
        return handle_config(
            &config,
            &stored,
            cli.config.as_deref(),
            args.show,
            args.path,
            args.init,
        );
    }

    let store = FirestoreStore::new(config.firestore());
    let catalog = SciCatalog::new(Arc::new(store), &config.tenant_id)
        .with_context(|| format!("Invalid tenant id: {}", config.tenant_id))?;
    info!("Reading SCIs from {}", catalog.collection());

    let source: Arc<dyn SciSource> = Arc::new(catalog);
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    // Execute command
    match cli.command() {
        Commands::Tui(args) => {
            let mode = args.mode.unwrap_or(config.default_mode);
            sciviewer::tui::run(source, runtime.handle().clone(), mode)?;
        }

        Commands::Sites => {
            let sites = runtime.block_on(sites(source.as_ref()))?;
            match cli.format {
                OutputFormat::Json => print_json(&sites)?,
                OutputFormat::Text => print_sites_text(&sites),
            }
        }

        Commands::List(args) => {
            let documents =
                runtime.block_on(list(source.as_ref(), &args.site, args.search.as_deref()))?;
            match cli.format {
                OutputFormat::Json => print_json(&documents)?,
                OutputFormat::Text => print_documents_text(&documents),
            }
        }

        Commands::Show(args) => {
            let mode = args.mode.unwrap_or(config.default_mode);
            let view = runtime.block_on(show(source.as_ref(), &args.site, &args.doc_id, mode))?;
            match cli.format {
                OutputFormat::Json => print_json(&view)?,
                OutputFormat::Text => print!("{}", view),
            }
        }

        Commands::Config(_) => {}
    }

    Ok(())
}

/// Route logs to stderr, or to the log file while the TUI owns the terminal
fn init_logging(cli: &Cli, config: &AppConfig) -> Result<()> {
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    if !cli.is_tui() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
        return Ok(());
    }

    let Some(ref path) = config.log_file else {
        return Ok(());
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {:?}", parent))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {:?}", path))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(filter)
        .init();

    Ok(())
}
