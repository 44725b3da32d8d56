//! Logger setup for the binaries.
//!
//! Library code only emits `tracing` events; the binaries call [`init`] once
//! at startup. Output goes to stderr so stdout stays clean for JSON.

use anyhow::{Result, anyhow};
use std::env;
use tracing_subscriber::EnvFilter;

/// Environment variable consulted before `RUST_LOG`.
pub const LOG_ENV: &str = "WREATH_CATALOG_LOG";

/// Directive used when neither environment variable is set.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "warn" }
}

fn env_filter(verbose: bool) -> EnvFilter {
    let directive = env::var(LOG_ENV)
        .ok()
        .or_else(|| env::var("RUST_LOG").ok())
        .filter(|value| !value.trim().is_empty());
    match directive {
        Some(directive) => EnvFilter::try_new(&directive)
            .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose))),
        None => EnvFilter::new(default_directive(verbose)),
    }
}

/// Install the global subscriber. `verbose` (the `-v` flag) raises the
/// default level to `debug`; an explicit env filter still wins.
pub fn init(verbose: bool) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("installing log subscriber: {err}"))
}
