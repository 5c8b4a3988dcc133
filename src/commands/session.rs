use serde::Serialize;
use tracing::{info, warn};

use crate::db::AppState;
use crate::history::{self, HistoryError};
use crate::llm::{LlmError, ReportGenerator};
use crate::models::{total_duration_seconds, SwimReport, SwimSegment, SwimSession};
use crate::simulator::{DrawSource, RngSource, SimulatedSessionMetrics};

/// Sessions shorter than this are discarded without a report
pub const MIN_SESSION_SECONDS: u64 = 5;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
  #[error("Failed to communicate with the AI coach: {0}")]
  Llm(#[from] LlmError),

  #[error("History error: {0}")]
  History(#[from] HistoryError),
}

impl Serialize for SessionError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// Simulate metrics for a stopped session, request a coaching report and store it.
///
/// Returns `Ok(None)` when the session is too short to analyze.
pub async fn finish_session<G>(
  state: &AppState,
  generator: &G,
  segments: Vec<SwimSegment>,
  notes: Option<String>,
) -> Result<Option<SwimReport>, SessionError>
where
  G: ReportGenerator + ?Sized,
{
  let mut source = RngSource::from_entropy();
  finish_session_with_source(state, generator, segments, notes, &mut source).await
}

/// `finish_session` with an explicit draw source for the simulator
pub async fn finish_session_with_source<G, D>(
  state: &AppState,
  generator: &G,
  segments: Vec<SwimSegment>,
  notes: Option<String>,
  source: &mut D,
) -> Result<Option<SwimReport>, SessionError>
where
  G: ReportGenerator + ?Sized,
  D: DrawSource + ?Sized,
{
  let total_seconds = total_duration_seconds(&segments);
  if total_seconds < MIN_SESSION_SECONDS {
    info!(total_seconds, "session too short, discarding");
    return Ok(None);
  }

  let metrics = SimulatedSessionMetrics::simulate(&segments, source);
  let session = SwimSession::record(metrics, notes);

  // Fetched before saving, so the current session is never its own history
  let history = history::recent_sessions(&state.db, state.config.history_window).await?;

  let (generated, usage) = generator
    .generate(&session, &history)
    .await
    .inspect_err(|e| warn!(session_id = %session.id, "report generation failed: {}", e))?;

  let report = generated.attach(session);
  history::save_report(&state.db, &report, Some(generator.model_name()), Some(usage)).await?;

  info!(
    session_id = %report.swim_data.id,
    distance_meters = report.swim_data.metrics.distance_meters,
    input_tokens = usage.input_tokens,
    output_tokens = usage.output_tokens,
    "analyzed swim session"
  );

  Ok(Some(report))
}
