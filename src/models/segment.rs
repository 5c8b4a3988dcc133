use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four competitive strokes a segment can be swum in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrokeKind {
  Freestyle,
  Backstroke,
  Breaststroke,
  Butterfly,
}

impl StrokeKind {
  pub const ALL: [StrokeKind; 4] = [
    StrokeKind::Freestyle,
    StrokeKind::Backstroke,
    StrokeKind::Breaststroke,
    StrokeKind::Butterfly,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      StrokeKind::Freestyle => "Freestyle",
      StrokeKind::Backstroke => "Backstroke",
      StrokeKind::Breaststroke => "Breaststroke",
      StrokeKind::Butterfly => "Butterfly",
    }
  }
}

impl fmt::Display for StrokeKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseSegmentError {
  #[error("Unknown stroke: {0}")]
  UnknownStroke(String),

  #[error("Expected <stroke>:<seconds>, got '{0}'")]
  Malformed(String),

  #[error("Invalid duration '{0}': must be a whole number of seconds")]
  InvalidDuration(String),
}

impl FromStr for StrokeKind {
  type Err = ParseSegmentError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let name = s.trim();
    StrokeKind::ALL
      .into_iter()
      .find(|k| k.as_str().eq_ignore_ascii_case(name))
      .ok_or_else(|| ParseSegmentError::UnknownStroke(name.to_string()))
  }
}

/// One continuous portion of a session swum in a single stroke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwimSegment {
  pub stroke: StrokeKind,
  /// Seconds; a zero-length segment contributes nothing
  pub duration: u32,
}

impl SwimSegment {
  pub fn new(stroke: StrokeKind, duration: u32) -> Self {
    Self { stroke, duration }
  }
}

/// Parses `freestyle:1800` style arguments
impl FromStr for SwimSegment {
  type Err = ParseSegmentError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (stroke, duration) = s
      .split_once(':')
      .ok_or_else(|| ParseSegmentError::Malformed(s.to_string()))?;

    let stroke = stroke.parse::<StrokeKind>()?;
    let duration = duration
      .trim()
      .parse::<u32>()
      .map_err(|_| ParseSegmentError::InvalidDuration(duration.trim().to_string()))?;

    Ok(Self { stroke, duration })
  }
}

/// Sum of segment durations in seconds
pub fn total_duration_seconds(segments: &[SwimSegment]) -> u64 {
  segments.iter().map(|s| u64::from(s.duration)).sum()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_stroke_parse_is_case_insensitive() {
    assert_eq!("freestyle".parse::<StrokeKind>(), Ok(StrokeKind::Freestyle));
    assert_eq!("BUTTERFLY".parse::<StrokeKind>(), Ok(StrokeKind::Butterfly));
    assert_eq!(" Backstroke ".parse::<StrokeKind>(), Ok(StrokeKind::Backstroke));
    assert_eq!(
      "sidestroke".parse::<StrokeKind>(),
      Err(ParseSegmentError::UnknownStroke("sidestroke".to_string()))
    );
  }

  #[test]
  fn test_segment_parse() {
    let seg: SwimSegment = "breaststroke:600".parse().unwrap();
    assert_eq!(seg, SwimSegment::new(StrokeKind::Breaststroke, 600));

    assert!(matches!(
      "freestyle".parse::<SwimSegment>(),
      Err(ParseSegmentError::Malformed(_))
    ));
    assert!(matches!(
      "freestyle:-30".parse::<SwimSegment>(),
      Err(ParseSegmentError::InvalidDuration(_))
    ));
    assert!(matches!(
      "crawl:30".parse::<SwimSegment>(),
      Err(ParseSegmentError::UnknownStroke(_))
    ));
  }

  #[test]
  fn test_segment_serializes_with_stroke_name() {
    let seg = SwimSegment::new(StrokeKind::Butterfly, 90);
    let json = serde_json::to_value(seg).unwrap();
    assert_eq!(json, serde_json::json!({ "stroke": "Butterfly", "duration": 90 }));
  }

  #[test]
  fn test_total_duration() {
    let segments = vec![
      SwimSegment::new(StrokeKind::Freestyle, 600),
      SwimSegment::new(StrokeKind::Butterfly, 0),
      SwimSegment::new(StrokeKind::Backstroke, 45),
    ];
    assert_eq!(total_duration_seconds(&segments), 645);
    assert_eq!(total_duration_seconds(&[]), 0);
  }
}
