//! Chart data and presentation-agnostic report sections
//!
//! Sections are lists of blocks rather than markup so every renderer
//! (HTML, Markdown) can present the same content in its own way.

use serde::{Deserialize, Serialize};

use crate::core::Histogram;
use crate::narrative::Narrative;
use crate::qc::{Priority, QualityAssessment, QualityFlags, ReadMetrics, Recommendation};
use crate::utils::group_thousands;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Histogram,
    Metrics,
}

/// Labelled counts for one histogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionChart {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<u64>,
}

impl DistributionChart {
    fn from_histogram(kind: ChartKind, title: &str, histogram: &Histogram) -> Self {
        let (labels, values) = histogram.iter_labeled().unzip();
        Self {
            kind,
            title: title.to_string(),
            labels,
            values,
        }
    }

    pub fn max_value(&self) -> u64 {
        self.values.iter().copied().max().unwrap_or(0)
    }
}

/// Pre-formatted headline statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsChart {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub title: String,
    pub entries: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub quality_distribution: DistributionChart,
    pub length_distribution: DistributionChart,
    pub summary_metrics: MetricsChart,
}

impl ChartData {
    pub fn from_metrics(metrics: &ReadMetrics) -> Self {
        Self {
            quality_distribution: DistributionChart::from_histogram(
                ChartKind::Bar,
                "Quality Score Distribution",
                &metrics.quality_distribution,
            ),
            length_distribution: DistributionChart::from_histogram(
                ChartKind::Histogram,
                "Read Length Distribution",
                &metrics.length_distribution,
            ),
            summary_metrics: MetricsChart {
                kind: ChartKind::Metrics,
                title: "Summary Statistics".to_string(),
                entries: vec![
                    ("Total Reads".to_string(), group_thousands(metrics.total_reads)),
                    ("Total Bases".to_string(), group_thousands(metrics.total_bases)),
                    ("Avg Quality".to_string(), format!("{:.2}", metrics.average_quality)),
                    ("GC Content".to_string(), format!("{:.1}%", metrics.gc_content)),
                    ("Avg Length".to_string(), format!("{:.1} bp", metrics.average_read_length)),
                ],
            },
        }
    }
}

/// Which chart a section refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartRef {
    QualityDistribution,
    LengthDistribution,
    SummaryMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum SectionBlock {
    Heading(String),
    Paragraph(String),
    List(Vec<String>),
    Table(Vec<(String, String)>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSection {
    pub title: String,
    pub blocks: Vec<SectionBlock>,
    pub charts: Vec<ChartRef>,
}

impl ReportSection {
    fn new(title: &str, blocks: Vec<SectionBlock>, charts: Vec<ChartRef>) -> Self {
        Self {
            title: title.to_string(),
            blocks,
            charts,
        }
    }
}

/// Everything the section builders read
pub(crate) struct SectionInputs<'a> {
    pub file_name: &'a str,
    pub file_size_mb: f64,
    pub metrics: &'a ReadMetrics,
    pub assessment: QualityAssessment,
    pub flags: &'a QualityFlags,
    pub recommendations: &'a [Recommendation],
    pub narrative: &'a Narrative,
}

pub(crate) fn build_sections(inputs: &SectionInputs<'_>) -> Vec<ReportSection> {
    let mut sections = vec![
        executive_summary(inputs),
        dataset_overview(inputs),
        quality_analysis(inputs),
    ];

    if !inputs.recommendations.is_empty() {
        sections.push(processing_recommendations(inputs.recommendations));
    }

    sections
}

fn executive_summary(inputs: &SectionInputs<'_>) -> ReportSection {
    let high_priority = inputs
        .recommendations
        .iter()
        .filter(|r| r.priority == Priority::High)
        .count();

    let mut blocks = vec![
        SectionBlock::Heading(format!("Quality Assessment: {}", inputs.assessment.title())),
        SectionBlock::Paragraph(inputs.narrative.summary.clone()),
    ];
    if !inputs.narrative.insights.is_empty() {
        blocks.push(SectionBlock::List(inputs.narrative.insights.clone()));
    }
    blocks.push(SectionBlock::Paragraph(format!(
        "Suitability: {}",
        inputs.narrative.suitability
    )));
    blocks.push(SectionBlock::Paragraph(format!(
        "Recommendations: {} processing steps suggested, {} high priority.",
        inputs.recommendations.len(),
        high_priority
    )));

    ReportSection::new("Executive Summary", blocks, Vec::new())
}

fn dataset_overview(inputs: &SectionInputs<'_>) -> ReportSection {
    let metrics = inputs.metrics;
    let rows = vec![
        ("File".to_string(), inputs.file_name.to_string()),
        ("Total Reads".to_string(), group_thousands(metrics.total_reads)),
        ("Total Bases".to_string(), group_thousands(metrics.total_bases)),
        ("File Size".to_string(), format!("{:.1} MB", inputs.file_size_mb)),
        ("Average Quality".to_string(), format!("{:.2}", metrics.average_quality)),
        ("GC Content".to_string(), format!("{:.1}%", metrics.gc_content)),
    ];

    ReportSection::new(
        "Dataset Overview",
        vec![SectionBlock::Table(rows)],
        vec![ChartRef::SummaryMetrics],
    )
}

fn quality_analysis(inputs: &SectionInputs<'_>) -> ReportSection {
    let metrics = inputs.metrics;
    let issues: Vec<String> = inputs.flags.active().into_iter().map(String::from).collect();

    let mut blocks = vec![SectionBlock::Heading("Quality Issues".to_string())];
    if issues.is_empty() {
        blocks.push(SectionBlock::Paragraph(
            "No significant quality issues detected.".to_string(),
        ));
    } else {
        blocks.push(SectionBlock::List(issues));
    }

    blocks.push(SectionBlock::Heading("Quality Metrics".to_string()));
    blocks.push(SectionBlock::List(vec![
        format!("Average Quality Score: {:.2}", metrics.average_quality),
        format!(
            "Read Length Range: {}-{} bp",
            metrics.min_read_length, metrics.max_read_length
        ),
        format!("GC Content: {:.1}%", metrics.gc_content),
    ]));

    ReportSection::new(
        "Quality Analysis",
        blocks,
        vec![ChartRef::QualityDistribution, ChartRef::LengthDistribution],
    )
}

fn processing_recommendations(recommendations: &[Recommendation]) -> ReportSection {
    let describe = |r: &Recommendation| format!("{}: {}", r.action, r.reason);

    let high: Vec<String> = recommendations
        .iter()
        .filter(|r| r.priority == Priority::High)
        .map(describe)
        .collect();
    let other: Vec<String> = recommendations
        .iter()
        .filter(|r| r.priority != Priority::High)
        .map(describe)
        .collect();

    let mut blocks = Vec::new();
    if !high.is_empty() {
        blocks.push(SectionBlock::Heading("High Priority Actions".to_string()));
        blocks.push(SectionBlock::List(high));
    }
    if !other.is_empty() {
        blocks.push(SectionBlock::Heading("Recommended Actions".to_string()));
        blocks.push(SectionBlock::List(other));
    }

    ReportSection::new("Processing Recommendations", blocks, Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FastqRead;
    use crate::qc::RecommendationEngine;

    #[test]
    fn test_chart_labels_follow_histogram_order() {
        let reads = vec![
            FastqRead::new("a", "A".repeat(120), vec![12; 120]),
            FastqRead::new("b", "A".repeat(30), vec![2; 30]),
        ];
        let metrics = ReadMetrics::from_reads(&reads);
        let charts = ChartData::from_metrics(&metrics);

        assert_eq!(charts.quality_distribution.labels, vec!["0-4", "10-14"]);
        assert_eq!(charts.quality_distribution.values, vec![30, 120]);
        assert_eq!(charts.quality_distribution.max_value(), 120);
        assert_eq!(charts.length_distribution.labels, vec!["0-49", "100-149"]);
        assert_eq!(charts.summary_metrics.entries[0], ("Total Reads".to_string(), "2".to_string()));
    }

    #[test]
    fn test_sections_without_recommendations() {
        let metrics = ReadMetrics::from_reads(&[FastqRead::new("a", "ACGT".repeat(10), vec![40; 40])]);
        let flags = QualityFlags::from_metrics(&metrics);
        let narrative = Narrative {
            summary: "Fine.".to_string(),
            insights: Vec::new(),
            suitability: "Ready".to_string(),
        };
        let sections = build_sections(&SectionInputs {
            file_name: "a.fastq",
            file_size_mb: 0.0,
            metrics: &metrics,
            assessment: QualityAssessment::Excellent,
            flags: &flags,
            recommendations: &[],
            narrative: &narrative,
        });

        let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Executive Summary", "Dataset Overview", "Quality Analysis"]);
        assert!(sections[2]
            .blocks
            .contains(&SectionBlock::Paragraph("No significant quality issues detected.".to_string())));
    }

    #[test]
    fn test_recommendation_section_groups_by_priority() {
        let metrics = ReadMetrics::from_reads(&[
            FastqRead::new("a", "A".repeat(50), vec![22; 50]),
            FastqRead::new("b", "A".repeat(110), vec![22; 110]),
        ]);
        let flags = QualityFlags::from_metrics(&metrics);
        let recs = RecommendationEngine::new().recommend(&metrics, &flags);

        let section = processing_recommendations(&recs);
        assert_eq!(section.blocks.len(), 4);
        assert_eq!(section.blocks[0], SectionBlock::Heading("High Priority Actions".to_string()));
        match &section.blocks[1] {
            SectionBlock::List(items) => {
                assert_eq!(items.len(), 2);
                assert!(items[0].starts_with("Apply quality filtering: "));
                assert!(items[1].starts_with("Screen for contamination: "));
            }
            other => panic!("unexpected block: {other:?}"),
        }
    }
}
