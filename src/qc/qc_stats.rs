//! QC Statistics
//!
//! Reduces a read collection to aggregate metrics and histograms

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::core::{FastqRead, Histogram};

/// Width of a quality-score histogram bin
pub const QUALITY_BIN_WIDTH: u32 = 5;

/// Width of a read-length histogram bin
pub const LENGTH_BIN_WIDTH: u32 = 50;

/// Aggregate metrics for one read collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadMetrics {
    pub total_reads: usize,
    pub total_bases: usize,
    pub average_read_length: f64,
    pub min_read_length: usize,
    pub max_read_length: usize,

    /// Mean of per-read mean quality scores
    pub average_quality: f64,

    /// Mean of per-read GC percentages
    pub gc_content: f64,

    #[serde(deserialize_with = "quality_bins")]
    pub quality_distribution: Histogram,

    #[serde(deserialize_with = "length_bins")]
    pub length_distribution: Histogram,
}

fn quality_bins<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Histogram, D::Error> {
    Histogram::deserialize_with_width(QUALITY_BIN_WIDTH, deserializer)
}

fn length_bins<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Histogram, D::Error> {
    Histogram::deserialize_with_width(LENGTH_BIN_WIDTH, deserializer)
}

impl Default for ReadMetrics {
    fn default() -> Self {
        Self {
            total_reads: 0,
            total_bases: 0,
            average_read_length: 0.0,
            min_read_length: 0,
            max_read_length: 0,
            average_quality: 0.0,
            gc_content: 0.0,
            quality_distribution: Histogram::new(QUALITY_BIN_WIDTH),
            length_distribution: Histogram::new(LENGTH_BIN_WIDTH),
        }
    }
}

impl ReadMetrics {
    /// Compute metrics for `reads`; an empty slice yields zeroed metrics
    pub fn from_reads(reads: &[FastqRead]) -> Self {
        if reads.is_empty() {
            debug!("No reads supplied, returning zeroed metrics");
            return Self::default();
        }

        let mut quality_distribution = Histogram::new(QUALITY_BIN_WIDTH);
        let mut length_distribution = Histogram::new(LENGTH_BIN_WIDTH);

        let mut total_bases = 0usize;
        let mut min_read_length = usize::MAX;
        let mut max_read_length = 0usize;
        let mut quality_sum = 0.0f64;
        let mut gc_sum = 0.0f64;

        // Single pass: per-read means are summed here and averaged below
        for read in reads {
            let length = read.length();
            total_bases += length;
            min_read_length = min_read_length.min(length);
            max_read_length = max_read_length.max(length);

            quality_sum += read.average_quality();
            gc_sum += read.gc_content();

            for &score in &read.quality_scores {
                quality_distribution.record(score as u32);
            }
            length_distribution.record(length.min(u32::MAX as usize) as u32);
        }

        let total_reads = reads.len();
        let metrics = Self {
            total_reads,
            total_bases,
            average_read_length: total_bases as f64 / total_reads as f64,
            min_read_length,
            max_read_length,
            average_quality: quality_sum / total_reads as f64,
            gc_content: gc_sum / total_reads as f64,
            quality_distribution,
            length_distribution,
        };

        debug!(
            "Computed metrics: {} reads, {} bases, Q{:.2} avg, {:.1}% GC",
            metrics.total_reads, metrics.total_bases, metrics.average_quality, metrics.gc_content
        );

        metrics
    }

    /// Spread between the longest and shortest read
    pub fn length_range(&self) -> usize {
        self.max_read_length - self.min_read_length
    }
}
