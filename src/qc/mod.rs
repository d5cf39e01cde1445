//! Quality Control Analysis
//!
//! Deterministic analysis stages for a read collection:
//! - Aggregate metrics and histograms
//! - Overall quality assessment
//! - Quality warning flags
//! - Rule-based processing recommendations
//!
//! Every stage is a pure function of its inputs.

pub mod assessment;
pub mod file_reader;
pub mod qc_stats;
pub mod quality_flags;
pub mod recommendations;

pub use assessment::QualityAssessment;
pub use file_reader::{FastqReader, ParseError};
pub use qc_stats::ReadMetrics;
pub use quality_flags::{GcStatus, QualityFlags};
pub use recommendations::{
    Priority, Recommendation, RecommendationCategory, RecommendationEngine, RecommendationRule,
};
