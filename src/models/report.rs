use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::SwimSession;

/// A displayed metric and the coach's reading of it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricInsight {
  pub value: String,
  pub analysis: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsAnalysis {
  pub pace: MetricInsight,
  pub stroke_rate: MetricInsight,
  pub heart_rate: MetricInsight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weakness {
  pub weakness: String,
  pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovementTip {
  pub tip: String,
  pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drill {
  pub drill: String,
  pub description: String,
}

/// Coaching report as returned by the model, before it is linked to a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedReport {
  pub greeting: String,
  pub summary: String,
  pub metrics_analysis: MetricsAnalysis,
  #[serde(default)]
  pub identified_weaknesses: Vec<Weakness>,
  #[serde(default)]
  pub improvement_tips: Vec<ImprovementTip>,
  #[serde(default)]
  pub recommended_drills: Vec<Drill>,
  pub closing_motivation: String,
}

impl GeneratedReport {
  pub fn attach(self, session: SwimSession) -> SwimReport {
    SwimReport {
      greeting: self.greeting,
      summary: self.summary,
      metrics_analysis: self.metrics_analysis,
      identified_weaknesses: self.identified_weaknesses,
      improvement_tips: self.improvement_tips,
      recommended_drills: self.recommended_drills,
      closing_motivation: self.closing_motivation,
      swim_data: session,
    }
  }
}

/// Full report, linked to the session data that generated it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwimReport {
  pub greeting: String,
  pub summary: String,
  pub metrics_analysis: MetricsAnalysis,
  pub identified_weaknesses: Vec<Weakness>,
  pub improvement_tips: Vec<ImprovementTip>,
  pub recommended_drills: Vec<Drill>,
  pub closing_motivation: String,
  pub swim_data: SwimSession,
}

impl SwimReport {
  /// Single stroke name, "Mixed Stroke", or "Unknown" for a session without segments
  pub fn stroke_summary(&self) -> String {
    let strokes: BTreeSet<&'static str> = self
      .swim_data
      .metrics
      .segments
      .iter()
      .map(|s| s.stroke.as_str())
      .collect();

    match strokes.len() {
      0 => "Unknown".to_string(),
      1 => strokes.into_iter().next().unwrap_or("Unknown").to_string(),
      _ => "Mixed Stroke".to_string(),
    }
  }
}
