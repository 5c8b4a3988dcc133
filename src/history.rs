//! Report history
//!
//! Stores each coaching report keyed by its session id. The full report is
//! kept as JSON; summary columns are broken out for listing and ordering.

use chrono::SecondsFormat;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::llm::Usage;
use crate::models::{SwimReport, SwimSession};

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Stored report {id} is unreadable: {reason}")]
  Corrupt { id: String, reason: String },

  #[error("Failed to encode report: {0}")]
  Encode(#[from] serde_json::Error),
}

/// Insert a report, replacing any earlier report for the same session
pub async fn save_report(
  pool: &SqlitePool,
  report: &SwimReport,
  model_version: Option<&str>,
  usage: Option<Usage>,
) -> Result<(), HistoryError> {
  let session = &report.swim_data;
  let report_json = serde_json::to_string(report)?;

  sqlx::query(
    r#"
    INSERT INTO swim_reports (
      session_id, recorded_at, distance_meters, total_time,
      avg_heart_rate_bpm, avg_stroke_rate_spm, stroke_summary, notes,
      report_json, model_version, input_tokens, output_tokens
    )
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
    ON CONFLICT(session_id) DO UPDATE SET
      recorded_at = excluded.recorded_at,
      distance_meters = excluded.distance_meters,
      total_time = excluded.total_time,
      avg_heart_rate_bpm = excluded.avg_heart_rate_bpm,
      avg_stroke_rate_spm = excluded.avg_stroke_rate_spm,
      stroke_summary = excluded.stroke_summary,
      notes = excluded.notes,
      report_json = excluded.report_json,
      model_version = excluded.model_version,
      input_tokens = excluded.input_tokens,
      output_tokens = excluded.output_tokens
    "#,
  )
  .bind(session.id.to_string())
  .bind(session.date.to_rfc3339_opts(SecondsFormat::Micros, true))
  .bind(i64::try_from(session.metrics.distance_meters).unwrap_or(i64::MAX))
  .bind(&session.metrics.total_time)
  .bind(i64::from(session.metrics.avg_heart_rate_bpm))
  .bind(i64::from(session.metrics.avg_stroke_rate_spm))
  .bind(report.stroke_summary())
  .bind(session.notes.as_deref())
  .bind(report_json)
  .bind(model_version)
  .bind(usage.map(|u| i64::from(u.input_tokens)))
  .bind(usage.map(|u| i64::from(u.output_tokens)))
  .execute(pool)
  .await?;

  debug!(session_id = %session.id, "saved swim report");

  Ok(())
}

fn decode(id: &str, report_json: &str) -> Result<SwimReport, HistoryError> {
  serde_json::from_str(report_json).map_err(|e| HistoryError::Corrupt {
    id: id.to_string(),
    reason: e.to_string(),
  })
}

/// Fetch the report for one session
pub async fn get_report(pool: &SqlitePool, session_id: Uuid) -> Result<Option<SwimReport>, HistoryError> {
  let id = session_id.to_string();

  let row: Option<(String,)> =
    sqlx::query_as("SELECT report_json FROM swim_reports WHERE session_id = ?1")
      .bind(&id)
      .fetch_optional(pool)
      .await?;

  row.map(|(json,)| decode(&id, &json)).transpose()
}

/// Most recent reports first
pub async fn list_reports(pool: &SqlitePool, limit: i64) -> Result<Vec<SwimReport>, HistoryError> {
  let rows: Vec<(String, String)> = sqlx::query_as(
    r#"
    SELECT session_id, report_json
    FROM swim_reports
    ORDER BY recorded_at DESC, rowid DESC
    LIMIT ?1
    "#,
  )
  .bind(limit)
  .fetch_all(pool)
  .await?;

  rows
    .into_iter()
    .map(|(id, json)| decode(&id, &json))
    .collect()
}

/// Session records of the most recent reports, newest first
pub async fn recent_sessions(pool: &SqlitePool, limit: usize) -> Result<Vec<SwimSession>, HistoryError> {
  let limit = i64::try_from(limit).unwrap_or(i64::MAX);
  Ok(
    list_reports(pool, limit)
      .await?
      .into_iter()
      .map(|r| r.swim_data)
      .collect(),
  )
}

/// Returns true if a report was removed
pub async fn delete_report(pool: &SqlitePool, session_id: Uuid) -> Result<bool, HistoryError> {
  let result = sqlx::query("DELETE FROM swim_reports WHERE session_id = ?1")
    .bind(session_id.to_string())
    .execute(pool)
    .await?;

  Ok(result.rows_affected() > 0)
}
