//! Jurisdiction query server.
//!
//! Loads the configured boundary dataset, builds the spatial index and
//! serves point lookups and map overlays over HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use precinct::config::Config;
use precinct::notify::Webhook;
use precinct::JurisdictionService;

mod routes;
use routes::{build_router, reload, AppState};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "serve")]
#[command(about = "Jurisdiction lookup server")]
struct Args {
    /// Config file
    #[arg(short, long, default_value = "precinct.toml")]
    config: PathBuf,

    /// Listen address (overrides the config file)
    #[arg(short, long)]
    listen: Option<String>,

    /// Debug logging (RUST_LOG overrides this)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    precinct::logging::init(args.verbose)?;

    info!("Precinct Server");

    let config = Config::load_from_file(&args.config)
        .with_context(|| format!("Loading {}", args.config.display()))?;
    let source = config.store.source();
    let options = config.store.load_options();
    let webhook = config
        .notify
        .webhook_url
        .clone()
        .map(Webhook::new)
        .transpose()
        .context("Building webhook client")?;

    info!("Loading boundaries from {}", source);
    let store = source
        .load(&options)
        .await
        .with_context(|| format!("Failed to load boundaries from {}", source))?;

    if let Some(webhook) = &webhook {
        webhook.report_rejections(&source.to_string(), &store);
    }

    let service = tokio::task::spawn_blocking(move || JurisdictionService::from_store(store))
        .await
        .context("Index build task failed")?;

    let state = Arc::new(AppState {
        service: Arc::new(service),
        source,
        options,
        renderer: config.server.renderer,
        webhook,
    });

    if let Some(interval) = config.store.refresh_interval() {
        info!("Refreshing boundaries every {}s", interval.as_secs());
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match reload(&state).await {
                    Ok(summary) => info!(
                        "Refreshed boundaries: generation {}, {} boundaries, {} rejected",
                        summary.generation, summary.boundaries, summary.rejected
                    ),
                    Err(e) => error!("Boundary refresh failed, keeping previous snapshot: {:#}", e),
                }
            }
        });
    }

    let app = build_router(state);
    let listen = args.listen.unwrap_or(config.server.listen);

    info!("Starting server on {}", listen);

    let listener = tokio::net::TcpListener::bind(&listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
