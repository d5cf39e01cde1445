//! Narrative generation for analysis reports
//!
//! A narrative is a short summary, a few insights and a suitability verdict.
//! Text comes from a [`NarrativeProvider`]: either the deterministic
//! [`TemplateNarrator`] or an external collaborator such as
//! [`CommandNarrator`]. Replies from external collaborators are normalized by
//! [`response::normalize_text_reply`].

pub mod command;
pub mod response;
pub mod template;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::qc::{Priority, QualityAssessment, QualityFlags, ReadMetrics, Recommendation};

pub use command::CommandNarrator;
pub use template::TemplateNarrator;

/// Summary, insights and downstream suitability for one analysis
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Narrative {
    pub summary: String,
    pub insights: Vec<String>,
    pub suitability: String,
}

impl Narrative {
    /// A narrative without a summary carries nothing worth reporting
    pub fn is_blank(&self) -> bool {
        self.summary.trim().is_empty()
    }
}

/// Where the report narrative came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrativeSource {
    /// Deterministic template requested directly (fast path)
    Template,
    /// External collaborator reply
    Provider,
    /// Template substituted after the collaborator failed
    Fallback,
}

impl NarrativeSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            NarrativeSource::Template => "template",
            NarrativeSource::Provider => "provider",
            NarrativeSource::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for NarrativeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a provider hands back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrativeReply {
    Structured(Narrative),
    /// Raw text, normalized by the assembler
    Text(String),
}

#[derive(Error, Debug)]
pub enum NarrativeError {
    #[error("Narrative provider unavailable: {message}")]
    Unavailable { message: String },

    #[error("Narrative request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Narrative command failed (exit code: {exit_code:?}): {stderr}")]
    Command { exit_code: Option<i32>, stderr: String },

    #[error("Narrative provider I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Narrative reply was empty")]
    EmptyReply,
}

/// Structured analysis summary handed to a narrative provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeRequest {
    pub file_name: String,
    pub total_reads: usize,
    pub total_bases: usize,
    pub average_quality: f64,
    pub gc_content: f64,
    pub average_read_length: f64,
    pub min_read_length: usize,
    pub max_read_length: usize,
    pub assessment: QualityAssessment,
    pub active_flags: Vec<String>,
    pub recommendation_count: usize,
    pub high_priority_count: usize,
}

impl NarrativeRequest {
    pub fn new(
        file_name: &str,
        metrics: &ReadMetrics,
        assessment: QualityAssessment,
        flags: &QualityFlags,
        recommendations: &[Recommendation],
    ) -> Self {
        Self {
            file_name: file_name.to_string(),
            total_reads: metrics.total_reads,
            total_bases: metrics.total_bases,
            average_quality: metrics.average_quality,
            gc_content: metrics.gc_content,
            average_read_length: metrics.average_read_length,
            min_read_length: metrics.min_read_length,
            max_read_length: metrics.max_read_length,
            assessment,
            active_flags: flags.active().into_iter().map(String::from).collect(),
            recommendation_count: recommendations.len(),
            high_priority_count: recommendations
                .iter()
                .filter(|r| r.priority == Priority::High)
                .count(),
        }
    }

    pub fn length_range(&self) -> usize {
        self.max_read_length - self.min_read_length
    }

    /// Concise prompt asking a text-generation collaborator for a JSON narrative
    pub fn to_prompt(&self) -> String {
        let flags = if self.active_flags.is_empty() {
            "none".to_string()
        } else {
            self.active_flags.join("; ")
        };

        format!(
            "Analyze FASTQ data (be concise):\n\n\
             File: {}\n\
             Reads: {} | Quality: {:.1}\n\
             GC: {:.1}% | Length: {:.0}bp ({}-{}bp)\n\
             Assessment: {}\n\n\
             Flags: {}\n\n\
             Provide JSON with:\n\
             - \"summary\": 1-2 sentences on data quality\n\
             - \"insights\": array of 2-3 key observations\n\
             - \"suitability\": brief downstream analysis assessment\n\n\
             JSON only, no markdown:",
            self.file_name,
            crate::utils::group_thousands(self.total_reads),
            self.average_quality,
            self.gc_content,
            self.average_read_length,
            self.min_read_length,
            self.max_read_length,
            self.assessment,
            flags,
        )
    }
}

/// Source of narrative text for a report
#[async_trait]
pub trait NarrativeProvider: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    async fn narrate(&self, request: &NarrativeRequest) -> Result<NarrativeReply, NarrativeError>;
}
