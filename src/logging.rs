//! Subscriber setup shared by the binaries.
//!
//! `RUST_LOG` takes precedence; without it the level comes from the
//! `--verbose` flag.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::new(if verbose { "debug" } else { "info" })
}

pub fn init(verbose: bool) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}
