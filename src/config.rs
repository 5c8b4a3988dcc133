use std::env;
use std::path::PathBuf;

const DEFAULT_DB_PATH: &str = "swimsmart.db";
const DEFAULT_HISTORY_WINDOW: usize = 3;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Invalid value for {var}: '{value}'")]
  Invalid { var: &'static str, value: String },
}

/// Application settings loaded from the environment.
/// Gemini credentials live in `llm::GeminiConfig` so offline commands work without a key.
#[derive(Debug, Clone)]
pub struct AppConfig {
  /// SQLite file holding the report history
  pub db_path: PathBuf,
  /// Number of previous sessions sent to the coach for comparison
  pub history_window: usize,
  /// Default tracing filter when RUST_LOG is not set
  pub log_level: String,
}

impl AppConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    let db_path = env::var("SWIMSMART_DB_PATH")
      .map(PathBuf::from)
      .unwrap_or_else(|_| PathBuf::from(DEFAULT_DB_PATH));

    let history_window = match env::var("SWIMSMART_HISTORY_WINDOW") {
      Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
        var: "SWIMSMART_HISTORY_WINDOW",
        value,
      })?,
      Err(_) => DEFAULT_HISTORY_WINDOW,
    };

    let log_level = env::var("SWIMSMART_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());

    Ok(Self {
      db_path,
      history_window,
      log_level,
    })
  }
}
