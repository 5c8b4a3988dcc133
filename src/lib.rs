pub mod commands;
pub mod config;
pub mod db;
pub mod history;
pub mod llm;
pub mod logging;
pub mod models;
pub mod simulator;

#[cfg(test)]
mod test_utils;

pub use config::AppConfig;
pub use db::{initialize_db, AppState};
pub use llm::{GeminiClient, ReportGenerator};
pub use simulator::{RngSource, SimulatedSessionMetrics};
