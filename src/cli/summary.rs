//! Coloured terminal summaries

use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;

use crate::narrative::NarrativeSource;
use crate::qc::{Priority, QualityAssessment, ReadMetrics};
use crate::reporting::AnalysisReport;
use crate::utils::group_thousands;

const RULE: &str = "═══════════════════════════════════════════";

fn banner(title: &str) {
    println!("\n{}", RULE.bright_cyan());
    println!("{}", format!("   {title}").bright_cyan().bold());
    println!("{}", RULE.bright_cyan());
}

fn assessment_label(assessment: QualityAssessment) -> colored::ColoredString {
    let label = format!("{} {}", assessment.icon(), assessment.title());
    match assessment {
        QualityAssessment::Excellent | QualityAssessment::Good => label.bright_green().bold(),
        QualityAssessment::Fair => label.yellow().bold(),
        QualityAssessment::Poor | QualityAssessment::Failed => label.bright_red().bold(),
    }
}

pub fn print_metrics(source: &str, metrics: &ReadMetrics, top: usize) {
    banner("FASTQ SUMMARY STATISTICS");

    println!("\n{}", "📁 Input:".bright_blue().bold());
    println!("  {} {}", "File:       ".white(), source.yellow());
    println!(
        "  {} {:>12}",
        "Reads:      ".white(),
        group_thousands(metrics.total_reads).yellow()
    );
    println!(
        "  {} {:>12}",
        "Bases:      ".white(),
        group_thousands(metrics.total_bases).yellow()
    );

    println!("\n{}", "📏 Length Statistics:".bright_blue().bold());
    println!("  {} {:>10.1} bp", "Average:".white(), metrics.average_read_length);
    println!(
        "  {} {:>10} bp",
        "Range:  ".white(),
        format!("{}-{}", metrics.min_read_length, metrics.max_read_length)
    );

    println!("\n{}", "⭐ Quality Metrics:".bright_blue().bold());
    println!("  {} Q{:.1}", "Average quality:".white(), metrics.average_quality);
    println!("  {} {:.1}%", "GC content:     ".white(), metrics.gc_content);
    println!(
        "  {} {}",
        "Assessment:     ".white(),
        assessment_label(QualityAssessment::from_metrics(metrics))
    );

    let bins = metrics.quality_distribution.top(top);
    if !bins.is_empty() {
        println!("\n{}", "📊 Most Common Quality Bins:".bright_blue().bold());
        for (label, count) in bins {
            println!("  {:>7} {:>12}", label.white(), group_thousands(count as usize).magenta());
        }
    }
}

pub fn print_report_summary(report: &AnalysisReport) {
    banner("QUALITY CONTROL REPORT");

    println!(
        "\n  {} {}",
        "Assessment:".white(),
        assessment_label(report.quality_assessment)
    );
    println!(
        "  {} {} reads, Q{:.1}, GC {:.1}%",
        "Dataset:   ".white(),
        group_thousands(report.metrics.total_reads),
        report.metrics.average_quality,
        report.metrics.gc_content
    );

    let flags = report.quality_flags.active();
    if flags.is_empty() {
        println!("\n{}", "✅ No quality issues detected".bright_green().bold());
    } else {
        println!("\n{}", "⚠️  Quality Issues:".bright_red().bold());
        for flag in flags {
            println!("  • {}", flag.red());
        }
    }

    if !report.recommendations.is_empty() {
        println!("\n{}", "🛠️  Recommendations:".bright_magenta().bold());
        for rec in &report.recommendations {
            let priority = match rec.priority {
                Priority::High => rec.priority.as_str().bright_red().bold(),
                Priority::Medium => rec.priority.as_str().yellow(),
                Priority::Low => rec.priority.as_str().white(),
            };
            println!("  [{}] {}: {}", priority, rec.category.label().bold(), rec.action);
        }
    }

    println!("\n{}", "📝 Summary:".bright_blue().bold());
    println!("  {}", report.narrative.summary);
    if report.narrative_source == NarrativeSource::Fallback {
        println!(
            "  {}",
            "(narrative provider unavailable, template narrative used)".dimmed()
        );
    }
}

pub fn print_written_files(paths: &[PathBuf]) {
    println!("\n{}", "💾 Reports written:".bright_blue().bold());
    for path in paths {
        println!("  {}", path.display().to_string().green());
    }
}

pub fn print_benchmark(
    reads: usize,
    parse_time: Option<Duration>,
    analysis_time: Duration,
    iterations: usize,
) {
    banner("BENCHMARK RESULTS");

    println!(
        "\n  {} {} ({} iterations)",
        "Reads:          ".white(),
        group_thousands(reads).yellow(),
        iterations
    );
    if let Some(parse_time) = parse_time {
        println!(
            "  {} {}",
            "Parse (mean):   ".white(),
            format!("{:.3}s", parse_time.as_secs_f64()).bright_green()
        );
    }
    println!(
        "  {} {}",
        "Analyze (mean): ".white(),
        format!("{:.3}s", analysis_time.as_secs_f64()).bright_green()
    );

    let secs = analysis_time.as_secs_f64();
    if secs > 0.0 {
        println!(
            "  {} {}",
            "Throughput:     ".white(),
            format!("{:.0} reads/s", reads as f64 / secs).bright_green().bold()
        );
    }
}
