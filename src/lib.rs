//! # QcForge - FASTQ Quality Control Reports
//!
//! Turns a collection of sequencing reads into a structured quality report:
//! aggregate metrics, an overall quality verdict, warning flags, prioritized
//! processing recommendations and a short narrative. The narrative can come
//! from an external text-generation collaborator; a deterministic template is
//! always available as a fallback.

pub mod cli;
pub mod core;
pub mod narrative;
pub mod qc;
pub mod reporting;
pub mod utils;

// Re-export commonly used types at crate level
pub use crate::core::data_structures::*;
pub use crate::narrative::{Narrative, NarrativeProvider, NarrativeSource};
pub use crate::qc::{
    FastqReader, QualityAssessment, QualityFlags, ReadMetrics, Recommendation,
    RecommendationEngine,
};
pub use crate::reporting::{AnalysisReport, ReportAssembler, ReportWriter};
pub use crate::utils::configuration::AppConfig;

/// Result type used throughout the crate
pub type Result<T> = anyhow::Result<T>;

/// Error type used throughout the crate
pub type Error = anyhow::Error;
