pub mod report;
pub mod segment;
pub mod session;

pub use report::{
  Drill, GeneratedReport, ImprovementTip, MetricInsight, MetricsAnalysis, SwimReport, Weakness,
};
pub use segment::{total_duration_seconds, ParseSegmentError, StrokeKind, SwimSegment};
pub use session::SwimSession;
