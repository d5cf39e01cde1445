//! Command-line interface
//!
//! - `report`: parse a FASTQ file, analyze it and write report files
//! - `inspect`: print summary statistics without writing anything
//! - `benchmark`: time parsing and report assembly

pub mod summary;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::core::{validate_reads, FastqRead};
use crate::narrative::CommandNarrator;
use crate::qc::{FastqReader, ReadMetrics};
use crate::reporting::{AssemblerOptions, OutputFormat, ReportAssembler, ReportWriter};
use crate::utils::AppConfig;

#[derive(Parser)]
#[command(name = "qc-forge")]
#[command(about = "Quality control reports for FASTQ sequencing reads")]
#[command(version)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Output directory (overrides config)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a FASTQ file and write quality reports
    Report {
        /// Input FASTQ file (.fastq, .fq, optionally .gz)
        input: PathBuf,

        /// Report format; repeat for several (overrides config)
        #[arg(short, long = "format", value_enum)]
        formats: Vec<OutputFormat>,

        /// Use the template narrative only
        #[arg(long)]
        fast: bool,

        /// Shell command that receives the prompt on stdin and prints a narrative
        #[arg(long, value_name = "CMD")]
        narrator_cmd: Option<String>,

        /// Narrative timeout in seconds (overrides config)
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Print summary statistics for a FASTQ file
    Inspect {
        /// Input FASTQ file
        input: PathBuf,

        /// Number of quality bins to show
        #[arg(long, default_value = "5")]
        top: usize,
    },

    /// Benchmark parsing and report assembly
    Benchmark {
        /// FASTQ file to benchmark; synthetic reads are used when omitted
        input: Option<PathBuf>,

        /// Number of synthetic reads
        #[arg(long, default_value = "100000")]
        reads: usize,

        /// Synthetic read length
        #[arg(long, default_value = "150")]
        read_length: usize,

        /// Repetitions per measurement
        #[arg(long, default_value = "3")]
        iterations: usize,
    },
}

impl Cli {
    /// Initialize logging
    pub fn init_logging(&self, configured_level: &str) -> Result<()> {
        let level = if self.verbose {
            LevelFilter::DEBUG
        } else {
            configured_level
                .parse::<LevelFilter>()
                .with_context(|| format!("Invalid log level '{configured_level}'"))?
        };

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(false))
            .with(
                EnvFilter::builder()
                    .with_default_directive(level.into())
                    .from_env_lossy(),
            )
            .init();

        Ok(())
    }

    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let config = AppConfig::load(self.config.as_deref())?;
        self.init_logging(&config.logging.level)?;

        match &self.command {
            Commands::Report {
                input,
                formats,
                fast,
                narrator_cmd,
                timeout,
            } => {
                let mut config = config;
                if !formats.is_empty() {
                    config.general.formats = formats.clone();
                }
                if let Some(output) = &self.output {
                    config.general.output_dir = output.clone();
                }
                config.analysis.fast_mode |= *fast;
                if let Some(secs) = timeout {
                    config.analysis.narrative_timeout_secs = *secs;
                }
                if narrator_cmd.is_some() {
                    config.analysis.narrator_command = narrator_cmd.clone();
                }
                config.validate()?;

                run_report(input, &config).await
            }
            Commands::Inspect { input, top } => run_inspect(input, *top),
            Commands::Benchmark {
                input,
                reads,
                read_length,
                iterations,
            } => run_benchmark(input.as_deref(), *reads, *read_length, *iterations),
        }
    }
}

fn load_reads(input: &Path) -> Result<Vec<FastqRead>> {
    let reads = FastqReader::new()
        .read_path(input)
        .with_context(|| format!("Failed to parse {}", input.display()))?;
    validate_reads(&reads)?;
    Ok(reads)
}

async fn run_report(input: &Path, config: &AppConfig) -> Result<()> {
    info!("🚀 Starting FASTQ quality report");
    info!("   📁 Input: {}", input.display());
    info!("   📂 Output directory: {}", config.general.output_dir.display());

    let reads = load_reads(input)?;
    let assembler = ReportAssembler::with_options(AssemblerOptions::from(&config.analysis));
    let source = input.to_string_lossy();

    let report = match &config.analysis.narrator_command {
        Some(command) => {
            let narrator = CommandNarrator::new(command.clone());
            assembler.analyze_async(&reads, &source, &narrator).await
        }
        None => assembler.analyze(&reads, &source),
    };

    summary::print_report_summary(&report);

    let writer = ReportWriter::with_formats(config.general.formats.clone());
    let written = writer
        .write_report_files(&report, &config.general.output_dir)
        .await?;
    summary::print_written_files(&written);

    Ok(())
}

fn run_inspect(input: &Path, top: usize) -> Result<()> {
    let reads = load_reads(input)?;
    let metrics = ReadMetrics::from_reads(&reads);
    summary::print_metrics(&input.to_string_lossy(), &metrics, top);
    Ok(())
}

fn run_benchmark(
    input: Option<&Path>,
    read_count: usize,
    read_length: usize,
    iterations: usize,
) -> Result<()> {
    let iterations = iterations.max(1);

    let (reads, parse_time) = match input {
        Some(path) => {
            let mut timings = Vec::with_capacity(iterations);
            let mut reads = Vec::new();
            for _ in 0..iterations {
                let start = Instant::now();
                reads = load_reads(path)?;
                timings.push(start.elapsed());
            }
            (reads, Some(mean_duration(&timings)))
        }
        None => (synthetic_reads(read_count, read_length), None),
    };

    let assembler = ReportAssembler::new();
    let mut timings = Vec::with_capacity(iterations);
    for _ in 0..iterations {
        let start = Instant::now();
        let report = assembler.analyze(&reads, "benchmark");
        timings.push(start.elapsed());
        std::hint::black_box(report);
    }

    summary::print_benchmark(reads.len(), parse_time, mean_duration(&timings), iterations);
    Ok(())
}

fn mean_duration(timings: &[Duration]) -> Duration {
    if timings.is_empty() {
        return Duration::ZERO;
    }
    timings.iter().sum::<Duration>() / timings.len() as u32
}

/// Random reads with qualities spread over Q10..Q40
pub fn synthetic_reads(count: usize, length: usize) -> Vec<FastqRead> {
    const BASES: [char; 4] = ['A', 'C', 'G', 'T'];
    let mut rng = fastrand::Rng::with_seed(42);

    (0..count)
        .map(|i| {
            let sequence: String = (0..length).map(|_| BASES[rng.usize(..4)]).collect();
            let qualities: Vec<u8> = (0..length).map(|_| rng.u8(10..=40)).collect();
            FastqRead::new(format!("synthetic_{i}"), sequence, qualities)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_report_arguments() {
        let cli = Cli::try_parse_from([
            "qc-forge",
            "-v",
            "--output",
            "out",
            "report",
            "reads.fastq.gz",
            "-f",
            "html",
            "--format",
            "tsv",
            "--narrator-cmd",
            "narrate --json",
            "--timeout",
            "5",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.output, Some(PathBuf::from("out")));
        match cli.command {
            Commands::Report {
                input,
                formats,
                fast,
                narrator_cmd,
                timeout,
            } => {
                assert_eq!(input, PathBuf::from("reads.fastq.gz"));
                assert_eq!(formats, vec![OutputFormat::Html, OutputFormat::Tsv]);
                assert!(!fast);
                assert_eq!(narrator_cmd.as_deref(), Some("narrate --json"));
                assert_eq!(timeout, Some(5));
            }
            _ => panic!("expected report command"),
        }
    }

    #[test]
    fn test_synthetic_reads_are_reproducible() {
        let first = synthetic_reads(20, 30);
        let second = synthetic_reads(20, 30);

        assert_eq!(first, second);
        assert!(first.iter().all(|r| r.length() == 30 && r.validate().is_ok()));
        assert!(first
            .iter()
            .flat_map(|r| r.quality_scores.iter())
            .all(|&q| (10..=40).contains(&q)));
    }

    #[test]
    fn test_mean_duration() {
        assert_eq!(mean_duration(&[]), Duration::ZERO);
        assert_eq!(
            mean_duration(&[Duration::from_millis(10), Duration::from_millis(30)]),
            Duration::from_millis(20)
        );
    }
}
