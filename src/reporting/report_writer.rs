//! Renders an [`AnalysisReport`] to HTML, JSON, Markdown and TSV files

use anyhow::{Context, Result};
use html_escape::encode_text;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

use super::report_generator::AnalysisReport;
use super::sections::{ChartRef, DistributionChart, MetricsChart, ReportSection, SectionBlock};
use crate::utils::group_thousands;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Html,
    Json,
    Markdown,
    Tsv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "md",
            OutputFormat::Tsv => "tsv",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Html => "html",
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Tsv => "tsv",
        };
        f.write_str(name)
    }
}

/// Report writer for the selected output formats
#[derive(Debug, Clone)]
pub struct ReportWriter {
    formats: Vec<OutputFormat>,
}

impl Default for ReportWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportWriter {
    /// HTML and JSON
    pub fn new() -> Self {
        Self::with_formats(vec![OutputFormat::Html, OutputFormat::Json])
    }

    pub fn with_formats(formats: Vec<OutputFormat>) -> Self {
        let mut unique = Vec::with_capacity(formats.len());
        for format in formats {
            if !unique.contains(&format) {
                unique.push(format);
            }
        }
        Self { formats: unique }
    }

    pub fn formats(&self) -> &[OutputFormat] {
        &self.formats
    }

    /// `qc_report_{YYYYmmdd_HHMMSS}.{ext}`, stamped with the report's generation time
    pub fn file_name(report: &AnalysisReport, format: OutputFormat) -> String {
        format!(
            "qc_report_{}.{}",
            report.generated_at.format("%Y%m%d_%H%M%S"),
            format.extension()
        )
    }

    pub fn render(&self, report: &AnalysisReport, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Html => Ok(self.generate_html_report(report)),
            OutputFormat::Json => {
                serde_json::to_string_pretty(report).context("Failed to serialize report as JSON")
            }
            OutputFormat::Markdown => Ok(self.generate_markdown_report(report)),
            OutputFormat::Tsv => Ok(self.generate_tsv_summary(report)),
        }
    }

    /// Write every configured format into `output_dir`, creating it if needed
    pub async fn write_report_files(
        &self,
        report: &AnalysisReport,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>> {
        tokio::fs::create_dir_all(output_dir)
            .await
            .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

        let mut written = Vec::with_capacity(self.formats.len());
        for &format in &self.formats {
            let path = output_dir.join(Self::file_name(report, format));
            let content = self.render(report, format)?;
            tokio::fs::write(&path, content)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;

            let icon = match format {
                OutputFormat::Html => "🌐",
                OutputFormat::Json => "📄",
                OutputFormat::Markdown => "📝",
                OutputFormat::Tsv => "📊",
            };
            info!("{} {} report written to: {}", icon, format, path.display());
            written.push(path);
        }

        Ok(written)
    }

    /// Generate HTML report
    fn generate_html_report(&self, report: &AnalysisReport) -> String {
        let sections: String = report
            .sections
            .iter()
            .map(|section| html_section(section, report))
            .collect();

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>FASTQ Quality Report - {file}</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 40px; background: #f5f5f5; }}
        .container {{ max-width: 1200px; margin: 0 auto; background: white; padding: 30px; border-radius: 10px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }}
        .header {{ background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 30px; border-radius: 8px; margin-bottom: 30px; }}
        .header h1 {{ margin: 0 0 10px 0; }}
        .header .timestamp {{ opacity: 0.9; font-size: 14px; }}
        .section {{ margin: 25px 0; padding: 20px; border-left: 4px solid #667eea; background: #f9f9f9; border-radius: 4px; }}
        .section h2 {{ margin-top: 0; color: #333; }}
        .metrics-table {{ width: 100%; border-collapse: collapse; margin-top: 15px; }}
        .metrics-table th, .metrics-table td {{ padding: 12px; text-align: left; border-bottom: 1px solid #ddd; }}
        .chart {{ margin: 20px 0; }}
        .chart h4 {{ margin-bottom: 8px; color: #555; }}
        .bar-row {{ display: flex; align-items: center; font-size: 12px; margin: 2px 0; }}
        .bar-label {{ width: 90px; color: #666; }}
        .bar {{ background: #667eea; height: 14px; margin-right: 6px; }}
        .quality-excellent {{ color: #27ae60; }}
        .quality-good {{ color: #2ecc71; }}
        .quality-fair {{ color: #f39c12; }}
        .quality-poor {{ color: #e67e22; }}
        .quality-failed {{ color: #e74c3c; }}
        .footer {{ margin-top: 40px; padding-top: 20px; border-top: 2px solid #e0e0e0; text-align: center; color: #666; font-size: 14px; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>🧬 FASTQ Quality Report</h1>
            <div class="timestamp">File: {file} | Generated: {generated} | Quality: <span class="quality-{level}">{title}</span></div>
        </div>
{sections}
        <div class="footer">
            Report {id} | Generated by QcForge
        </div>
    </div>
</body>
</html>"#,
            file = encode_text(report.file_name()),
            generated = report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            level = report.quality_assessment.as_str(),
            title = report.quality_assessment.title(),
            sections = sections,
            id = report.report_id,
        )
    }

    /// Generate Markdown report
    fn generate_markdown_report(&self, report: &AnalysisReport) -> String {
        let mut md = String::from("# 🧬 FASTQ Quality Report\n\n");
        md.push_str(&format!(
            "**Generated:** {}\n",
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        md.push_str(&format!("**File:** {}\n", report.file_name()));
        md.push_str(&format!(
            "**Quality Assessment:** {} {}\n\n",
            report.quality_assessment.icon(),
            report.quality_assessment.title()
        ));

        for section in &report.sections {
            md.push_str(&format!("## {}\n\n", section.title));
            for block in &section.blocks {
                match block {
                    SectionBlock::Heading(text) => md.push_str(&format!("### {text}\n\n")),
                    SectionBlock::Paragraph(text) => md.push_str(&format!("{text}\n\n")),
                    SectionBlock::List(items) => {
                        for item in items {
                            md.push_str(&format!("- {item}\n"));
                        }
                        md.push('\n');
                    }
                    SectionBlock::Table(rows) => {
                        md.push_str("| Metric | Value |\n|--------|-------|\n");
                        for (label, value) in rows {
                            md.push_str(&format!("| {label} | {value} |\n"));
                        }
                        md.push('\n');
                    }
                }
            }
        }

        if !report.recommendations.is_empty() {
            md.push_str("## Recommendation Details\n\n");
            for rec in &report.recommendations {
                md.push_str(&format!("### {} ({} priority)\n\n", rec.category, rec.priority));
                md.push_str(&format!("**Action:** {}\n\n", rec.action));
                md.push_str(&format!("**Reason:** {}\n\n", rec.reason));
                if !rec.parameters.is_empty() {
                    let params: Vec<String> = rec
                        .parameters
                        .iter()
                        .map(|(key, value)| format!("`{key}` = `{value}`"))
                        .collect();
                    md.push_str(&format!("**Parameters:** {}\n\n", params.join(", ")));
                }
            }
        }

        md.push_str("---\n\n");
        md.push_str(&format!("*Report {} generated by QcForge*\n", report.report_id));
        md
    }

    /// Generate TSV summary
    fn generate_tsv_summary(&self, report: &AnalysisReport) -> String {
        let metrics = &report.metrics;
        let mut tsv = String::from("Metric\tValue\n");
        tsv.push_str(&format!("Report ID\t{}\n", report.report_id));
        tsv.push_str(&format!("Generated\t{}\n", report.generated_at.to_rfc3339()));
        tsv.push_str(&format!("File\t{}\n", report.file_path));
        tsv.push_str(&format!("Estimated Size (MB)\t{:.2}\n", report.file_size_mb));
        tsv.push_str(&format!("Total Reads\t{}\n", metrics.total_reads));
        tsv.push_str(&format!("Total Bases\t{}\n", metrics.total_bases));
        tsv.push_str(&format!("Average Read Length\t{:.2}\n", metrics.average_read_length));
        tsv.push_str(&format!("Min Read Length\t{}\n", metrics.min_read_length));
        tsv.push_str(&format!("Max Read Length\t{}\n", metrics.max_read_length));
        tsv.push_str(&format!("Average Quality\t{:.2}\n", metrics.average_quality));
        tsv.push_str(&format!("GC Content (%)\t{:.2}\n", metrics.gc_content));
        tsv.push_str(&format!("Quality Assessment\t{}\n", report.quality_assessment));
        tsv.push_str(&format!("Active Flags\t{}\n", report.summary.active_flag_count));
        tsv.push_str(&format!("Recommendations\t{}\n", report.summary.total_recommendations));
        tsv.push_str(&format!("High Priority\t{}\n", report.summary.high_priority_count));
        tsv.push_str(&format!("Narrative Source\t{}\n", report.narrative_source));
        tsv
    }
}

fn html_section(section: &ReportSection, report: &AnalysisReport) -> String {
    let mut html = format!(
        "        <div class=\"section\">\n            <h2>{}</h2>\n",
        encode_text(&section.title)
    );

    for block in &section.blocks {
        match block {
            SectionBlock::Heading(text) => {
                html.push_str(&format!("            <h3>{}</h3>\n", encode_text(text)));
            }
            SectionBlock::Paragraph(text) => {
                html.push_str(&format!("            <p>{}</p>\n", encode_text(text)));
            }
            SectionBlock::List(items) => {
                html.push_str("            <ul>\n");
                for item in items {
                    html.push_str(&format!("                <li>{}</li>\n", encode_text(item)));
                }
                html.push_str("            </ul>\n");
            }
            SectionBlock::Table(rows) => {
                html.push_str("            <table class=\"metrics-table\">\n");
                for (label, value) in rows {
                    html.push_str(&format!(
                        "                <tr><td>{}</td><td>{}</td></tr>\n",
                        encode_text(label),
                        encode_text(value)
                    ));
                }
                html.push_str("            </table>\n");
            }
        }
    }

    for chart in &section.charts {
        let charts = &report.chart_data;
        html.push_str(&match chart {
            ChartRef::QualityDistribution => html_distribution(&charts.quality_distribution),
            ChartRef::LengthDistribution => html_distribution(&charts.length_distribution),
            ChartRef::SummaryMetrics => html_metrics(&charts.summary_metrics),
        });
    }

    html.push_str("        </div>\n");
    html
}

fn html_distribution(chart: &DistributionChart) -> String {
    let max = chart.max_value().max(1) as f64;
    let mut html = format!(
        "            <div class=\"chart\">\n                <h4>{}</h4>\n",
        encode_text(&chart.title)
    );
    for (label, &value) in chart.labels.iter().zip(&chart.values) {
        let width = (value as f64 / max * 400.0).round() as u32;
        html.push_str(&format!(
            "                <div class=\"bar-row\"><span class=\"bar-label\">{}</span><span class=\"bar\" style=\"width: {}px\"></span>{}</div>\n",
            encode_text(label),
            width,
            group_thousands(value as usize)
        ));
    }
    html.push_str("            </div>\n");
    html
}

fn html_metrics(chart: &MetricsChart) -> String {
    let mut html = format!(
        "            <div class=\"chart\">\n                <h4>{}</h4>\n                <table class=\"metrics-table\">\n",
        encode_text(&chart.title)
    );
    for (label, value) in &chart.entries {
        html.push_str(&format!(
            "                    <tr><th>{}</th><td>{}</td></tr>\n",
            encode_text(label),
            encode_text(value)
        ));
    }
    html.push_str("                </table>\n            </div>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FastqRead;
    use crate::reporting::ReportAssembler;
    use tempfile::TempDir;

    fn report() -> AnalysisReport {
        let reads: Vec<FastqRead> = (0..5)
            .map(|i| FastqRead::new(format!("r{i}"), "AAAATTTTGC".repeat(8), vec![18; 80]))
            .collect();
        ReportAssembler::new().analyze(&reads, "runs/<sample>.fastq")
    }

    #[test]
    fn test_file_names() {
        let report = report();
        let stamp = report.generated_at.format("%Y%m%d_%H%M%S").to_string();

        assert_eq!(
            ReportWriter::file_name(&report, OutputFormat::Markdown),
            format!("qc_report_{stamp}.md")
        );
        assert_eq!(
            ReportWriter::file_name(&report, OutputFormat::Html),
            format!("qc_report_{stamp}.html")
        );
    }

    #[test]
    fn test_html_escapes_and_contains_values() {
        let report = report();
        let html = ReportWriter::new().render(&report, OutputFormat::Html).unwrap();

        assert!(html.contains("&lt;sample&gt;.fastq"));
        assert!(!html.contains("<sample>"));
        assert!(html.contains("quality-failed"));
        assert!(html.contains("Processing Recommendations"));
        assert!(html.contains("Quality Score Distribution"));
        assert!(html.contains(&report.report_id.to_string()));
    }

    #[test]
    fn test_markdown_and_tsv() {
        let report = report();
        let writer = ReportWriter::new();

        let md = writer.render(&report, OutputFormat::Markdown).unwrap();
        assert!(md.contains("## Executive Summary"));
        assert!(md.contains("| Total Reads | 5 |"));
        assert!(md.contains("### Quality Filtering (high priority)"));
        assert!(md.contains("`min_quality` = `20`"));

        let tsv = writer.render(&report, OutputFormat::Tsv).unwrap();
        assert!(tsv.starts_with("Metric\tValue\n"));
        assert!(tsv.contains("Total Reads\t5\n"));
        assert!(tsv.contains("Quality Assessment\tfailed\n"));
        assert!(tsv.contains("Narrative Source\ttemplate\n"));
    }

    #[test]
    fn test_duplicate_formats_collapse() {
        let writer = ReportWriter::with_formats(vec![
            OutputFormat::Json,
            OutputFormat::Tsv,
            OutputFormat::Json,
        ]);
        assert_eq!(writer.formats(), &[OutputFormat::Json, OutputFormat::Tsv]);
    }

    #[tokio::test]
    async fn test_write_report_files() {
        let temp_dir = TempDir::new().unwrap();
        let output_dir = temp_dir.path().join("nested").join("reports");
        let report = report();

        let writer = ReportWriter::with_formats(vec![
            OutputFormat::Html,
            OutputFormat::Json,
            OutputFormat::Markdown,
            OutputFormat::Tsv,
        ]);
        let written = writer.write_report_files(&report, &output_dir).await.unwrap();

        assert_eq!(written.len(), 4);
        for path in &written {
            assert!(path.exists(), "{} missing", path.display());
        }

        let json = std::fs::read_to_string(&written[1]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["metrics"]["total_reads"], 5);
        assert_eq!(parsed["quality_assessment"], "failed");
    }
}
