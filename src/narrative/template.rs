//! Deterministic narrative built from the analysis alone
//!
//! Used directly on the fast path and as the fallback whenever an external
//! collaborator fails. Identical requests always produce identical text.

use async_trait::async_trait;

use super::{Narrative, NarrativeError, NarrativeProvider, NarrativeReply, NarrativeRequest};
use crate::qc::GcStatus;
use crate::utils::group_thousands;

const EXCELLENT_QUALITY: f64 = 35.0;
const GOOD_QUALITY: f64 = 25.0;
const CONSISTENT_LENGTH_RANGE: usize = 5;
const MODERATE_LENGTH_RANGE: usize = 20;

#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateNarrator;

impl TemplateNarrator {
    pub fn new() -> Self {
        Self
    }

    pub fn compose(&self, request: &NarrativeRequest) -> Narrative {
        let summary = format!(
            "This FASTQ dataset contains {} reads with {}. \
             Average quality score is {:.1} and GC content is {:.1}%.",
            group_thousands(request.total_reads),
            request.assessment.description(),
            request.average_quality,
            request.gc_content,
        );

        let mut insights = vec![
            quality_insight(request.average_quality),
            gc_insight(request.gc_content),
            length_insight(request.length_range()),
        ];

        if request.recommendation_count > 0 {
            insights.push(if request.high_priority_count > 0 {
                format!(
                    "{} high-priority preprocessing steps recommended",
                    request.high_priority_count
                )
            } else {
                "Standard preprocessing steps recommended for optimal results".to_string()
            });
        }

        let suitability = format!(
            "Dataset quality rated as {} - suitable for analysis with appropriate preprocessing",
            request.assessment
        );

        Narrative {
            summary,
            insights,
            suitability,
        }
    }
}

fn quality_insight(average_quality: f64) -> String {
    if average_quality >= EXCELLENT_QUALITY {
        "Excellent base call quality indicates reliable sequencing data".to_string()
    } else if average_quality >= GOOD_QUALITY {
        "Good quality scores suitable for downstream analysis".to_string()
    } else {
        "Low quality scores may require filtering or trimming".to_string()
    }
}

fn gc_insight(gc_content: f64) -> String {
    match GcStatus::classify(gc_content) {
        GcStatus::Ideal => "GC content within ideal range suggests no major bias".to_string(),
        GcStatus::Acceptable => format!(
            "GC content ({gc_content:.1}%) is acceptable but slightly outside ideal range"
        ),
        GcStatus::Unusual => format!(
            "GC content ({gc_content:.1}%) outside typical range may indicate bias or contamination"
        ),
    }
}

fn length_insight(length_range: usize) -> String {
    if length_range <= CONSISTENT_LENGTH_RANGE {
        "Consistent read lengths indicate uniform library preparation".to_string()
    } else if length_range <= MODERATE_LENGTH_RANGE {
        "Moderate read length variation is within acceptable range".to_string()
    } else {
        "High read length variation may require length filtering".to_string()
    }
}

#[async_trait]
impl NarrativeProvider for TemplateNarrator {
    fn name(&self) -> &str {
        "template"
    }

    async fn narrate(&self, request: &NarrativeRequest) -> Result<NarrativeReply, NarrativeError> {
        Ok(NarrativeReply::Structured(self.compose(request)))
    }
}
