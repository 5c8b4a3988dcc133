use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::simulator::SimulatedSessionMetrics;

/// A finished session: simulated metrics plus identity, timestamp and notes.
/// This is the record handed to the report service and stored with the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwimSession {
  pub id: Uuid,
  pub date: DateTime<Utc>,
  #[serde(flatten)]
  pub metrics: SimulatedSessionMetrics,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub notes: Option<String>,
}

impl SwimSession {
  /// Stamp freshly simulated metrics with a new id and the current time.
  /// Blank notes are dropped.
  pub fn record(metrics: SimulatedSessionMetrics, notes: Option<String>) -> Self {
    Self {
      id: Uuid::new_v4(),
      date: Utc::now(),
      metrics,
      notes: notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{StrokeKind, SwimSegment};

  fn sample_metrics() -> SimulatedSessionMetrics {
    SimulatedSessionMetrics {
      distance_meters: 1500,
      total_time: "30:00".to_string(),
      segments: vec![SwimSegment::new(StrokeKind::Freestyle, 1800)],
      avg_heart_rate_bpm: 150,
      avg_stroke_rate_spm: 60,
    }
  }

  #[test]
  fn test_record_drops_blank_notes() {
    let session = SwimSession::record(sample_metrics(), Some("   ".to_string()));
    assert!(session.notes.is_none());

    let session = SwimSession::record(sample_metrics(), Some(" felt strong ".to_string()));
    assert_eq!(session.notes.as_deref(), Some("felt strong"));
  }

  #[test]
  fn test_record_assigns_unique_ids() {
    let a = SwimSession::record(sample_metrics(), None);
    let b = SwimSession::record(sample_metrics(), None);
    assert_ne!(a.id, b.id);
  }

  #[test]
  fn test_session_json_is_flat_camel_case() {
    let session = SwimSession::record(sample_metrics(), Some("tired".to_string()));
    let json = serde_json::to_value(&session).unwrap();

    assert_eq!(json["distanceMeters"], 1500);
    assert_eq!(json["totalTime"], "30:00");
    assert_eq!(json["avgHeartRateBpm"], 150);
    assert_eq!(json["avgStrokeRateSpm"], 60);
    assert_eq!(json["segments"][0]["stroke"], "Freestyle");
    assert_eq!(json["notes"], "tired");
    assert!(json["date"].as_str().unwrap().contains('T'));

    let back: SwimSession = serde_json::from_value(json).unwrap();
    assert_eq!(back, session);
  }
}
