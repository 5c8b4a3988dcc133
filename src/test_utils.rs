//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Deterministic draw sources for the simulator
//! - Mock data factories
//! - A stub report generator

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use std::sync::Mutex;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::db::AppState;
use crate::llm::{LlmError, ReportGenerator, Usage};
use crate::models::{
  Drill, GeneratedReport, ImprovementTip, MetricInsight, MetricsAnalysis, SwimReport, SwimSegment,
  SwimSession, Weakness,
};
use crate::simulator::{DrawSource, SimulatedSessionMetrics};

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// App state over an in-memory database with a three-session history window
pub async fn setup_test_state() -> AppState {
  AppState {
    db: setup_test_db().await,
    config: AppConfig {
      db_path: ":memory:".into(),
      history_window: 3,
      log_level: "debug".to_string(),
    },
  }
}

/// ---------------------------------------------------------------------------
/// Draw Sources
/// ---------------------------------------------------------------------------

/// Replays a fixed list of draws, cycling when exhausted
pub struct FixedDraws {
  values: Vec<f64>,
  index: usize,
}

impl FixedDraws {
  pub fn new(values: Vec<f64>) -> Self {
    assert!(!values.is_empty(), "FixedDraws needs at least one value");
    Self { values, index: 0 }
  }

  pub fn constant(value: f64) -> Self {
    Self::new(vec![value])
  }
}

impl DrawSource for FixedDraws {
  fn next_unit(&mut self) -> f64 {
    let value = self.values[self.index % self.values.len()];
    self.index += 1;
    value
  }
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// Session simulated with midpoint draws, dated now
pub fn mock_session(segments: Vec<SwimSegment>) -> SwimSession {
  let metrics = SimulatedSessionMetrics::simulate(&segments, &mut FixedDraws::constant(0.5));
  SwimSession::record(metrics, Some("Felt strong early, faded late.".to_string()))
}

/// Session with a fixed date, for ordering tests
pub fn mock_session_at(segments: Vec<SwimSegment>, date: DateTime<Utc>) -> SwimSession {
  SwimSession {
    id: Uuid::new_v4(),
    date,
    ..mock_session(segments)
  }
}

pub fn mock_generated_report() -> GeneratedReport {
  GeneratedReport {
    greeting: "Great swim!".to_string(),
    summary: "Solid aerobic session with a slight fade at the end.".to_string(),
    metrics_analysis: MetricsAnalysis {
      pace: MetricInsight {
        value: "1:50/100m".to_string(),
        analysis: "Even pacing through the middle.".to_string(),
      },
      stroke_rate: MetricInsight {
        value: "60 spm".to_string(),
        analysis: "Efficient turnover.".to_string(),
      },
      heart_rate: MetricInsight {
        value: "150 bpm".to_string(),
        analysis: "Comfortable aerobic effort.".to_string(),
      },
    },
    identified_weaknesses: vec![Weakness {
      weakness: "Pacing Drop-off".to_string(),
      description: "Pace slowed in the final third.".to_string(),
    }],
    improvement_tips: vec![ImprovementTip {
      tip: "Negative Split".to_string(),
      description: "Hold back early to finish faster.".to_string(),
    }],
    recommended_drills: vec![Drill {
      drill: "Catch-up Drill".to_string(),
      description: "Builds a longer, steadier stroke.".to_string(),
    }],
    closing_motivation: "Every lap counts!".to_string(),
  }
}

pub fn mock_report(segments: Vec<SwimSegment>) -> SwimReport {
  mock_generated_report().attach(mock_session(segments))
}

/// ---------------------------------------------------------------------------
/// Stub Report Generator
/// ---------------------------------------------------------------------------

/// Returns a canned report (or error) and records the history it was given
pub struct StubReportGenerator {
  fail_with: Option<String>,
  pub calls: Mutex<Vec<Vec<Uuid>>>,
}

impl StubReportGenerator {
  pub fn succeeding() -> Self {
    Self {
      fail_with: None,
      calls: Mutex::new(Vec::new()),
    }
  }

  pub fn failing(message: &str) -> Self {
    Self {
      fail_with: Some(message.to_string()),
      calls: Mutex::new(Vec::new()),
    }
  }

  pub fn call_count(&self) -> usize {
    self.calls.lock().unwrap().len()
  }
}

#[async_trait]
impl ReportGenerator for StubReportGenerator {
  fn model_name(&self) -> &str {
    "stub-model"
  }

  async fn generate(
    &self,
    _current: &SwimSession,
    history: &[SwimSession],
  ) -> Result<(GeneratedReport, Usage), LlmError> {
    self
      .calls
      .lock()
      .unwrap()
      .push(history.iter().map(|s| s.id).collect());

    match &self.fail_with {
      Some(message) => Err(LlmError::Api(message.clone())),
      None => Ok((
        mock_generated_report(),
        Usage {
          input_tokens: 420,
          output_tokens: 180,
        },
      )),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Time Helpers
/// ---------------------------------------------------------------------------

pub fn datetime_days_ago(days: i64) -> DateTime<Utc> {
  Utc::now() - Duration::days(days)
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::StrokeKind;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name = 'swim_reports'",
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 1);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_fixed_draws_cycle() {
    let mut draws = FixedDraws::new(vec![0.1, 0.2]);
    assert_eq!(draws.next_unit(), 0.1);
    assert_eq!(draws.next_unit(), 0.2);
    assert_eq!(draws.next_unit(), 0.1);
  }

  #[test]
  fn test_mock_factories_create_valid_data() {
    let session = mock_session(vec![SwimSegment::new(StrokeKind::Freestyle, 1800)]);
    assert_eq!(session.metrics.total_time, "30:00");
    assert!(session.notes.is_some());

    let past = mock_session_at(vec![], datetime_days_ago(3));
    assert_ne!(past.id, session.id);
    assert!(past.date < session.date);

    let report = mock_report(vec![SwimSegment::new(StrokeKind::Butterfly, 60)]);
    assert_eq!(report.stroke_summary(), "Butterfly");
  }
}
