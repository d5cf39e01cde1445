//! Reporting module for generating analysis reports
//!
//! Provides:
//! - Report assembly from a read collection
//! - Chart data and presentation-agnostic sections
//! - HTML, JSON, Markdown and TSV renderers

pub mod report_generator;
pub mod report_writer;
pub mod sections;

pub use report_generator::{
    estimate_file_size_mb, AnalysisReport, AssemblerOptions, ReportAssembler, ReportSummary,
};
pub use report_writer::{OutputFormat, ReportWriter};
pub use sections::{ChartData, ReportSection, SectionBlock};
