//! Report assembly: runs every analysis stage and builds one immutable report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::sections::{build_sections, ChartData, ReportSection, SectionInputs};
use crate::core::FastqRead;
use crate::narrative::{
    response::{normalize_structured_reply, normalize_text_reply},
    Narrative, NarrativeError, NarrativeProvider, NarrativeReply, NarrativeRequest,
    NarrativeSource, TemplateNarrator,
};
use crate::qc::{
    Priority, QualityAssessment, QualityFlags, ReadMetrics, Recommendation,
    RecommendationCategory, RecommendationEngine,
};
use crate::utils::AnalysisConfig;

/// Assumed on-disk bytes per base (sequence, quality and header overhead)
const BYTES_PER_BASE: f64 = 4.0;

/// Complete analysis report structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub report_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub file_path: String,
    pub file_size_mb: f64,
    pub metrics: ReadMetrics,
    pub quality_assessment: QualityAssessment,
    pub quality_flags: QualityFlags,
    pub recommendations: Vec<Recommendation>,
    pub narrative: Narrative,
    pub narrative_source: NarrativeSource,
    pub summary: ReportSummary,
    pub chart_data: ChartData,
    pub sections: Vec<ReportSection>,
}

/// Summary counts for the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_recommendations: usize,
    pub high_priority_count: usize,
    pub active_flag_count: usize,
}

impl AnalysisReport {
    pub fn high_priority_recommendations(&self) -> Vec<&Recommendation> {
        self.recommendations
            .iter()
            .filter(|r| r.priority == Priority::High)
            .collect()
    }

    pub fn recommendations_by_category(
        &self,
        category: RecommendationCategory,
    ) -> Vec<&Recommendation> {
        self.recommendations
            .iter()
            .filter(|r| r.category == category)
            .collect()
    }

    /// Final path component of `file_path`, or the whole value if it has none
    pub fn file_name(&self) -> &str {
        Path::new(&self.file_path)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.file_path)
    }
}

/// Rough file size estimate in MiB, rounded to two decimals
pub fn estimate_file_size_mb(total_bases: usize) -> f64 {
    let mb = total_bases as f64 * BYTES_PER_BASE / (1024.0 * 1024.0);
    (mb * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssemblerOptions {
    /// Skip the narrative provider entirely
    pub fast_mode: bool,
    /// Datasets smaller than this use the template narrative
    pub small_dataset_threshold: usize,
    pub narrative_timeout: Duration,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self {
            fast_mode: false,
            small_dataset_threshold: 50,
            narrative_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&AnalysisConfig> for AssemblerOptions {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            fast_mode: config.fast_mode,
            small_dataset_threshold: config.small_dataset_threshold,
            narrative_timeout: config.narrative_timeout(),
        }
    }
}

/// Deterministic stage outputs, computed before any narrative request
struct StageResults {
    metrics: ReadMetrics,
    assessment: QualityAssessment,
    flags: QualityFlags,
    recommendations: Vec<Recommendation>,
    request: NarrativeRequest,
}

/// Composes metrics, assessment, flags, recommendations and narrative into an [`AnalysisReport`]
#[derive(Debug, Clone, Default)]
pub struct ReportAssembler {
    options: AssemblerOptions,
    engine: RecommendationEngine,
    template: TemplateNarrator,
}

impl ReportAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: AssemblerOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &AssemblerOptions {
        &self.options
    }

    /// Analyze with the template narrative only; never makes an external call
    pub fn analyze(&self, reads: &[FastqRead], source: &str) -> AnalysisReport {
        let stages = self.run_stages(reads, source);
        let narrative = self.template.compose(&stages.request);
        self.build(source, stages, narrative, NarrativeSource::Template)
    }

    /// Analyze and ask `provider` for the narrative unless the fast path applies.
    ///
    /// Provider failures, timeouts and empty replies are recovered here by
    /// substituting the template narrative; this never returns an error.
    pub async fn analyze_async(
        &self,
        reads: &[FastqRead],
        source: &str,
        provider: &dyn NarrativeProvider,
    ) -> AnalysisReport {
        let stages = self.run_stages(reads, source);

        if self.uses_fast_path(&stages.metrics) {
            debug!(
                "Fast path: template narrative for {} reads",
                stages.metrics.total_reads
            );
            let narrative = self.template.compose(&stages.request);
            return self.build(source, stages, narrative, NarrativeSource::Template);
        }

        let (narrative, narrative_source) = match self.request_narrative(provider, &stages.request).await {
            Ok(narrative) => (narrative, NarrativeSource::Provider),
            Err(err) => {
                warn!(
                    "⚠️ Narrative provider '{}' failed ({}), using template narrative",
                    provider.name(),
                    err
                );
                (self.template.compose(&stages.request), NarrativeSource::Fallback)
            }
        };

        self.build(source, stages, narrative, narrative_source)
    }

    pub fn uses_fast_path(&self, metrics: &ReadMetrics) -> bool {
        self.options.fast_mode || metrics.total_reads < self.options.small_dataset_threshold
    }

    fn run_stages(&self, reads: &[FastqRead], source: &str) -> StageResults {
        info!("📊 Analyzing {} reads from {}", reads.len(), source);

        let metrics = ReadMetrics::from_reads(reads);
        let assessment = QualityAssessment::from_metrics(&metrics);
        let flags = QualityFlags::detect(&metrics, assessment);
        let recommendations = self.engine.recommend(&metrics, &flags);

        let file_name = Path::new(source)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(source);
        let request =
            NarrativeRequest::new(file_name, &metrics, assessment, &flags, &recommendations);

        StageResults {
            metrics,
            assessment,
            flags,
            recommendations,
            request,
        }
    }

    async fn request_narrative(
        &self,
        provider: &dyn NarrativeProvider,
        request: &NarrativeRequest,
    ) -> Result<Narrative, NarrativeError> {
        let timeout = self.options.narrative_timeout;
        debug!("Requesting narrative from '{}' (timeout {:?})", provider.name(), timeout);

        let reply = tokio::time::timeout(timeout, provider.narrate(request))
            .await
            .map_err(|_| NarrativeError::Timeout(timeout))??;

        let narrative = match reply {
            NarrativeReply::Structured(narrative) => normalize_structured_reply(narrative),
            NarrativeReply::Text(text) => normalize_text_reply(&text),
        };

        narrative.ok_or(NarrativeError::EmptyReply)
    }

    fn build(
        &self,
        source: &str,
        stages: StageResults,
        narrative: Narrative,
        narrative_source: NarrativeSource,
    ) -> AnalysisReport {
        let StageResults {
            metrics,
            assessment,
            flags,
            recommendations,
            request,
        } = stages;

        let file_size_mb = estimate_file_size_mb(metrics.total_bases);
        let summary = ReportSummary {
            total_recommendations: recommendations.len(),
            high_priority_count: request.high_priority_count,
            active_flag_count: request.active_flags.len(),
        };
        let chart_data = ChartData::from_metrics(&metrics);
        let sections = build_sections(&SectionInputs {
            file_name: &request.file_name,
            file_size_mb,
            metrics: &metrics,
            assessment,
            flags: &flags,
            recommendations: &recommendations,
            narrative: &narrative,
        });

        info!(
            "✅ Report assembled: {} ({} recommendations, narrative: {})",
            assessment,
            recommendations.len(),
            narrative_source
        );

        AnalysisReport {
            report_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            file_path: source.to_string(),
            file_size_mb,
            metrics,
            quality_assessment: assessment,
            quality_flags: flags,
            recommendations,
            narrative,
            narrative_source,
            summary,
            chart_data,
            sections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reads(count: usize, quality: u8, sequence: &str) -> Vec<FastqRead> {
        (0..count)
            .map(|i| FastqRead::new(format!("r{i}"), sequence, vec![quality; sequence.len()]))
            .collect()
    }

    #[test]
    fn test_file_size_estimate() {
        assert_eq!(estimate_file_size_mb(0), 0.0);
        // 262144 bases * 4 bytes = exactly 1 MiB
        assert_eq!(estimate_file_size_mb(262_144), 1.0);
        assert_eq!(estimate_file_size_mb(1_000_000), 3.81);
    }

    #[test]
    fn test_template_report() {
        let assembler = ReportAssembler::new();
        let report = assembler.analyze(&reads(3, 38, &"ACGT".repeat(10)), "/data/run1/sample.fastq");

        assert_eq!(report.file_path, "/data/run1/sample.fastq");
        assert_eq!(report.file_name(), "sample.fastq");
        assert_eq!(report.quality_assessment, QualityAssessment::Excellent);
        assert_eq!(report.narrative_source, NarrativeSource::Template);
        assert!(report.recommendations.is_empty());
        assert_eq!(report.summary.total_recommendations, 0);
        assert_eq!(report.sections.len(), 3);
        assert!(report.narrative.summary.starts_with("This FASTQ dataset contains 3 reads"));
    }

    #[test]
    fn test_report_query_helpers() {
        let mut sample = reads(4, 15, &"AAAAT".repeat(20));
        sample.push(FastqRead::new("short", "AT", vec![15, 15]));
        let report = ReportAssembler::new().analyze(&sample, "low.fastq");

        assert_eq!(report.recommendations.len(), 4);
        assert_eq!(report.summary.high_priority_count, 2);
        assert_eq!(report.summary.active_flag_count, 3);
        assert_eq!(report.high_priority_recommendations().len(), 2);
        assert_eq!(
            report
                .recommendations_by_category(RecommendationCategory::LengthFiltering)
                .len(),
            1
        );
        assert_eq!(report.sections.last().unwrap().title, "Processing Recommendations");
    }

    #[test]
    fn test_fast_path_rules() {
        let assembler = ReportAssembler::new();
        let small = ReadMetrics {
            total_reads: 49,
            ..ReadMetrics::default()
        };
        let large = ReadMetrics {
            total_reads: 50,
            ..ReadMetrics::default()
        };
        assert!(assembler.uses_fast_path(&small));
        assert!(!assembler.uses_fast_path(&large));

        let fast = ReportAssembler::with_options(AssemblerOptions {
            fast_mode: true,
            ..AssemblerOptions::default()
        });
        assert!(fast.uses_fast_path(&large));
    }

    #[test]
    fn test_options_from_config() {
        let config = AnalysisConfig {
            fast_mode: true,
            small_dataset_threshold: 10,
            narrative_timeout_secs: 3,
            narrator_command: None,
        };
        let options = AssemblerOptions::from(&config);
        assert!(options.fast_mode);
        assert_eq!(options.small_dataset_threshold, 10);
        assert_eq!(options.narrative_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_report_serializes() {
        let report = ReportAssembler::new().analyze(&reads(2, 30, "GGCCAATT"), "s.fastq");
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["quality_assessment"], "good");
        assert_eq!(json["narrative_source"], "template");
        assert_eq!(json["metrics"]["quality_distribution"]["30-34"], 16);
        assert_eq!(json["chart_data"]["quality_distribution"]["type"], "bar");

        let back: AnalysisReport = serde_json::from_value(json).unwrap();
        assert_eq!(back, report);
    }
}
