mod cli;
mod config;
mod errors;
mod export;
mod lookup;
mod models;
mod recents;
mod render;
mod services;
mod storage;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::lookup::{is_valid_root, normalize_root, LookupOrchestrator, StatusKind, StatusSink};
use crate::recents::RecentRoots;
use crate::render::{TerminalRenderer, TerminalStatus, THEME_KEY};
use crate::services::CispService;
use crate::storage::Store;

/// Main entry point for the portal client.
///
/// Initializes tracing and configuration, builds the backend client and the
/// persisted store, and dispatches the requested command.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cisp_portal=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Cli::parse();

    // Load configuration
    let config = Config::from_env()?;

    let service = CispService::new(&config)?;
    let store = Store::new(config.state_dir.clone());

    match args.command {
        Commands::Lookup { root } => {
            let recents = RecentRoots::new(store);
            let mut status = TerminalStatus::new();
            status.set_status(StatusKind::Idle, "Awaiting lookup");
            let orchestrator =
                LookupOrchestrator::new(service, recents, status, TerminalRenderer::new());
            // Failures were already reported through the status sink.
            if orchestrator.lookup(&root).await.is_err() {
                std::process::exit(1);
            }
        }
        Commands::Recents => {
            let recents = RecentRoots::new(store);
            let list = recents.list();
            if list.is_empty() {
                println!("{}", "No recent lookups.".dimmed());
            } else {
                for root in list {
                    println!("{}", root);
                }
            }
        }
        Commands::Export { root, output } => {
            let root = normalize_root(&root);
            if !is_valid_root(&root) {
                anyhow::bail!("invalid root: expected 8 digits, got '{}'", root);
            }
            match service.fetch_record(&root).await {
                Ok(record) => {
                    let path = export::export_record(&record, &root, output.as_deref())?;
                    println!("Wrote {}", path.display());
                }
                Err(e) => {
                    tracing::debug!("Export fetch for root {} failed: {}", root, e);
                    eprintln!("{}", "Could not export the JSON.".red());
                    std::process::exit(1);
                }
            }
        }
        Commands::Health => {
            if service.health().await {
                println!("backend: {}", "healthy".green());
            } else {
                println!("backend: {}", "unreachable".red());
                std::process::exit(1);
            }
        }
        Commands::Theme { mode } => {
            let next = match mode {
                Some(mode) => mode,
                None => {
                    let current = store.get(THEME_KEY).unwrap_or_else(|| "light".to_string());
                    if current == "light" { "dark" } else { "light" }.to_string()
                }
            };
            store.put(THEME_KEY, &next)?;
            println!("Theme set to {}", next);
        }
    }

    Ok(())
}
