use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::commands::session::SessionError;
use crate::db::AppState;
use crate::history;
use crate::models::SwimReport;

/// One row of the session history list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
  pub session_id: Uuid,
  pub date: DateTime<Utc>,
  pub distance_meters: u64,
  pub stroke_summary: String,
  /// Pace as reported by the coach, e.g. "1:55/100m"
  pub pace: String,
}

impl HistoryEntry {
  pub fn from_report(report: &SwimReport) -> Self {
    Self {
      session_id: report.swim_data.id,
      date: report.swim_data.date,
      distance_meters: report.swim_data.metrics.distance_meters,
      stroke_summary: report.stroke_summary(),
      pace: report.metrics_analysis.pace.value.clone(),
    }
  }

  /// e.g. `2026-10-14  1500m Freestyle  Pace: 1:55/100m  (<id>)`
  pub fn display_line(&self) -> String {
    format!(
      "{}  {}m {}  Pace: {}  ({})",
      self.date.format("%Y-%m-%d"),
      self.distance_meters,
      self.stroke_summary,
      self.pace,
      self.session_id
    )
  }
}

pub async fn get_history(state: &AppState, limit: i64) -> Result<Vec<HistoryEntry>, SessionError> {
  let reports = history::list_reports(&state.db, limit).await?;
  Ok(reports.iter().map(HistoryEntry::from_report).collect())
}

pub async fn get_session_report(
  state: &AppState,
  session_id: Uuid,
) -> Result<Option<SwimReport>, SessionError> {
  Ok(history::get_report(&state.db, session_id).await?)
}

pub async fn delete_session_report(state: &AppState, session_id: Uuid) -> Result<bool, SessionError> {
  Ok(history::delete_report(&state.db, session_id).await?)
}
