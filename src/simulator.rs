//! Synthetic swim metrics
//!
//! Turns a list of timed stroke segments into distance, heart rate and stroke
//! rate estimates. This stands in for real sensor data: every pass draws fresh
//! variation from a `DrawSource`, and a cumulative fatigue model slows pace and
//! raises heart rate as effort builds up over the session.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{total_duration_seconds, StrokeKind, SwimSegment};

/// ---------------------------------------------------------------------------
/// Calibration
/// ---------------------------------------------------------------------------

pub const HEART_RATE_CAP_BPM: f64 = 190.0;
pub const DEFAULT_HEART_RATE_BPM: u32 = 140;
pub const DEFAULT_STROKE_RATE_SPM: u32 = 55;

/// Full width of the pace perturbation window (+/- 5 s per 100m)
const PACE_VARIABILITY_SECONDS: f64 = 10.0;
/// Fatigue is normalized against 1.5x the session length
const FATIGUE_HORIZON_SCALE: f64 = 1.5;
/// Upper bound on the slowdown / heart rate increase from fatigue
const MAX_FATIGUE_EFFECT: f64 = 0.15;
const DISTANCE_ROUNDING_METERS: u64 = 25;

/// Per-stroke simulation constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeProfile {
  /// Seconds per 100m at baseline effort
  pub base_pace_seconds_per_100m: f64,
  /// (min, max) bpm at baseline effort
  pub heart_rate_range: (f64, f64),
  /// (min, max) strokes per minute
  pub stroke_rate_range: (f64, f64),
  /// Fatigue accumulated per second swum in this stroke
  pub fatigue_weight: f64,
}

impl StrokeProfile {
  pub fn heart_rate_at(&self, unit: f64) -> f64 {
    lerp(self.heart_rate_range, unit)
  }

  pub fn stroke_rate_at(&self, unit: f64) -> f64 {
    lerp(self.stroke_rate_range, unit)
  }
}

fn lerp((min, max): (f64, f64), unit: f64) -> f64 {
  min + unit * (max - min)
}

static FREESTYLE: StrokeProfile = StrokeProfile {
  base_pace_seconds_per_100m: 110.0,
  heart_rate_range: (140.0, 160.0),
  stroke_rate_range: (55.0, 65.0),
  fatigue_weight: 1.0,
};

static BACKSTROKE: StrokeProfile = StrokeProfile {
  base_pace_seconds_per_100m: 125.0,
  heart_rate_range: (130.0, 150.0),
  stroke_rate_range: (50.0, 60.0),
  fatigue_weight: 1.1,
};

static BREASTSTROKE: StrokeProfile = StrokeProfile {
  base_pace_seconds_per_100m: 140.0,
  heart_rate_range: (125.0, 145.0),
  stroke_rate_range: (40.0, 50.0),
  fatigue_weight: 0.9,
};

static BUTTERFLY: StrokeProfile = StrokeProfile {
  base_pace_seconds_per_100m: 135.0,
  heart_rate_range: (155.0, 175.0),
  stroke_rate_range: (50.0, 60.0),
  fatigue_weight: 1.5,
};

impl StrokeKind {
  pub fn profile(&self) -> &'static StrokeProfile {
    match self {
      StrokeKind::Freestyle => &FREESTYLE,
      StrokeKind::Backstroke => &BACKSTROKE,
      StrokeKind::Breaststroke => &BREASTSTROKE,
      StrokeKind::Butterfly => &BUTTERFLY,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Randomness
/// ---------------------------------------------------------------------------

/// Source of uniform draws in [0, 1)
pub trait DrawSource {
  fn next_unit(&mut self) -> f64;
}

/// Adapts any `rand::Rng` into a `DrawSource`
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl RngSource<StdRng> {
  pub fn from_entropy() -> Self {
    Self(StdRng::from_entropy())
  }

  pub fn seeded(seed: u64) -> Self {
    Self(StdRng::seed_from_u64(seed))
  }
}

impl<R: Rng> DrawSource for RngSource<R> {
  fn next_unit(&mut self) -> f64 {
    self.0.gen::<f64>()
  }
}

/// ---------------------------------------------------------------------------
/// Simulation
/// ---------------------------------------------------------------------------

/// Intermediate values for one segment of a simulation pass
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentEstimate {
  pub stroke: StrokeKind,
  pub duration: u32,
  pub fatigue_factor: f64,
  pub pace_seconds_per_100m: f64,
  pub distance_meters: f64,
  pub heart_rate_bpm: f64,
  pub stroke_rate_spm: f64,
}

/// Aggregate metrics for a whole session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedSessionMetrics {
  /// Rounded to the nearest 25m
  pub distance_meters: u64,
  /// `MM:SS`
  pub total_time: String,
  pub segments: Vec<SwimSegment>,
  /// Duration-weighted, capped at 190
  pub avg_heart_rate_bpm: u32,
  /// Duration-weighted
  pub avg_stroke_rate_spm: u32,
}

/// Run the fatigue model over `segments` in order.
///
/// Each segment takes three draws from `source`: pace, heart rate, stroke rate.
pub fn estimate_segments<D: DrawSource + ?Sized>(
  segments: &[SwimSegment],
  source: &mut D,
) -> Vec<SegmentEstimate> {
  let horizon = total_duration_seconds(segments) as f64 * FATIGUE_HORIZON_SCALE;
  let mut cumulative_fatigue = 0.0;

  segments
    .iter()
    .map(|segment| {
      let profile = segment.stroke.profile();
      let duration = f64::from(segment.duration);

      // A zero-length session has nothing to normalize against
      let fatigue_factor = if horizon > 0.0 {
        1.0 + (cumulative_fatigue / horizon) * MAX_FATIGUE_EFFECT
      } else {
        1.0
      };

      let perturbation = (source.next_unit() - 0.5) * PACE_VARIABILITY_SECONDS;
      let pace = (profile.base_pace_seconds_per_100m + perturbation) * fatigue_factor;
      let distance = (duration / pace) * 100.0;

      let heart_rate =
        (profile.heart_rate_at(source.next_unit()) * fatigue_factor).min(HEART_RATE_CAP_BPM);

      let stroke_rate = profile.stroke_rate_at(source.next_unit());

      cumulative_fatigue += duration * profile.fatigue_weight;

      SegmentEstimate {
        stroke: segment.stroke,
        duration: segment.duration,
        fatigue_factor,
        pace_seconds_per_100m: pace,
        distance_meters: distance,
        heart_rate_bpm: heart_rate,
        stroke_rate_spm: stroke_rate,
      }
    })
    .collect()
}

impl SimulatedSessionMetrics {
  /// Simulate session metrics from an ordered list of segments
  pub fn simulate<D: DrawSource + ?Sized>(segments: &[SwimSegment], source: &mut D) -> Self {
    let estimates = estimate_segments(segments, source);
    Self::from_estimates(segments, &estimates)
  }

  /// Aggregate per-segment estimates into session metrics
  pub fn from_estimates(segments: &[SwimSegment], estimates: &[SegmentEstimate]) -> Self {
    let total_seconds = total_duration_seconds(segments);
    let total_distance: f64 = estimates.iter().map(|e| e.distance_meters).sum();

    let (avg_heart_rate_bpm, avg_stroke_rate_spm) = if total_seconds > 0 {
      let total = total_seconds as f64;
      let weighted_hr: f64 = estimates
        .iter()
        .map(|e| e.heart_rate_bpm * f64::from(e.duration))
        .sum();
      let weighted_sr: f64 = estimates
        .iter()
        .map(|e| e.stroke_rate_spm * f64::from(e.duration))
        .sum();
      (
        (weighted_hr / total).round() as u32,
        (weighted_sr / total).round() as u32,
      )
    } else {
      (DEFAULT_HEART_RATE_BPM, DEFAULT_STROKE_RATE_SPM)
    };

    let distance_meters =
      (total_distance / DISTANCE_ROUNDING_METERS as f64).round() as u64 * DISTANCE_ROUNDING_METERS;

    debug!(
      segments = segments.len(),
      total_seconds,
      distance_meters,
      avg_heart_rate_bpm,
      avg_stroke_rate_spm,
      "simulated swim session"
    );

    Self {
      distance_meters,
      total_time: format_clock(total_seconds as f64),
      segments: segments.to_vec(),
      avg_heart_rate_bpm,
      avg_stroke_rate_spm,
    }
  }
}

/// Format seconds as zero-padded `MM:SS`.
///
/// Rounds before splitting, so 59.6s becomes `01:00` rather than `00:60`.
pub fn format_clock(total_seconds: f64) -> String {
  let rounded = total_seconds.max(0.0).round() as u64;
  format!("{:02}:{:02}", rounded / 60, rounded % 60)
}

/// Average pace over the session as `M:SS/100m`, `None` without distance
pub fn average_pace(metrics: &SimulatedSessionMetrics) -> Option<String> {
  if metrics.distance_meters == 0 {
    return None;
  }
  let seconds = total_duration_seconds(&metrics.segments) as f64;
  let per_100m = (seconds / metrics.distance_meters as f64 * 100.0).round() as u64;
  Some(format!("{}:{:02}/100m", per_100m / 60, per_100m % 60))
}

/// One simulation pass with its per-segment estimates kept alongside the totals
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationBreakdown {
  pub average_pace: Option<String>,
  pub estimates: Vec<SegmentEstimate>,
  pub metrics: SimulatedSessionMetrics,
}

impl SimulationBreakdown {
  pub fn simulate<D: DrawSource + ?Sized>(segments: &[SwimSegment], source: &mut D) -> Self {
    let estimates = estimate_segments(segments, source);
    let metrics = SimulatedSessionMetrics::from_estimates(segments, &estimates);
    Self {
      average_pace: average_pace(&metrics),
      estimates,
      metrics,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
