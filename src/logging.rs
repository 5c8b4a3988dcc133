//! Tracing subscriber setup for the CLI

use std::env;
use tracing_subscriber::EnvFilter;

/// Dependencies that are chatty at info level
const QUIET_TARGETS: [&str; 4] = ["hyper=warn", "reqwest=warn", "sqlx=warn", "rustls=warn"];

/// Build the filter from `RUST_LOG` when set, otherwise from `default_level`
pub fn build_filter(default_level: &str) -> EnvFilter {
  let base = env::var("RUST_LOG").map_or_else(
    |_| EnvFilter::new(default_level),
    |directive| EnvFilter::new(&directive),
  );

  QUIET_TARGETS.iter().fold(base, |filter, target| match target.parse() {
    Ok(directive) => filter.add_directive(directive),
    Err(_) => filter,
  })
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean JSON.
pub fn init_logging(default_level: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
  tracing_subscriber::fmt()
    .with_env_filter(build_filter(default_level))
    .with_target(false)
    .with_writer(std::io::stderr)
    .try_init()
}
