use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Core data structures shared by the QC analysis and its collaborators

/// A single sequencing read with numeric Phred scores (offset already removed)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FastqRead {
    pub identifier: String,
    pub sequence: String,
    pub quality_scores: Vec<u8>,
}

impl FastqRead {
    pub fn new(
        identifier: impl Into<String>,
        sequence: impl Into<String>,
        quality_scores: Vec<u8>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            sequence: sequence.into(),
            quality_scores,
        }
    }

    /// Number of bases in the read
    pub fn length(&self) -> usize {
        self.sequence.len()
    }

    /// Mean Phred score of this read, 0.0 when no scores are present
    pub fn average_quality(&self) -> f64 {
        if self.quality_scores.is_empty() {
            return 0.0;
        }

        let sum: u64 = self.quality_scores.iter().map(|&q| q as u64).sum();
        sum as f64 / self.quality_scores.len() as f64
    }

    /// Lowest Phred score of this read, 0 when no scores are present
    pub fn min_quality(&self) -> u8 {
        self.quality_scores.iter().copied().min().unwrap_or(0)
    }

    /// GC percentage (0-100), case-insensitive
    pub fn gc_content(&self) -> f64 {
        if self.sequence.is_empty() {
            return 0.0;
        }

        let gc_count = self
            .sequence
            .bytes()
            .filter(|b| matches!(b, b'G' | b'C' | b'g' | b'c'))
            .count();

        (gc_count as f64 / self.sequence.len() as f64) * 100.0
    }

    /// Check that every base carries exactly one quality score
    pub fn validate(&self) -> Result<(), ReadValidationError> {
        if self.quality_scores.len() != self.sequence.len() {
            return Err(ReadValidationError::QualityLengthMismatch {
                identifier: self.identifier.clone(),
                sequence_length: self.sequence.len(),
                quality_length: self.quality_scores.len(),
            });
        }
        Ok(())
    }
}

/// Fail fast on the first malformed read
pub fn validate_reads(reads: &[FastqRead]) -> Result<(), ReadValidationError> {
    reads.iter().try_for_each(FastqRead::validate)
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadValidationError {
    #[error(
        "Validation error: read '{identifier}' has {sequence_length} bases but {quality_length} quality scores"
    )]
    QualityLengthMismatch {
        identifier: String,
        sequence_length: usize,
        quality_length: usize,
    },
}

/// Fixed-width histogram keyed by bin start.
///
/// Serialized as `{"0-4": 12, "5-9": 3, ...}` in ascending numeric order,
/// which keeps chart labels stable across runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    bin_width: u32,
    counts: BTreeMap<u32, u64>,
}

impl Histogram {
    pub fn new(bin_width: u32) -> Self {
        assert!(bin_width > 0, "histogram bin width must be positive");
        Self {
            bin_width,
            counts: BTreeMap::new(),
        }
    }

    pub fn bin_width(&self) -> u32 {
        self.bin_width
    }

    /// Floor-divide `value` into its bin and count it
    pub fn record(&mut self, value: u32) {
        let start = (value / self.bin_width) * self.bin_width;
        *self.counts.entry(start).or_insert(0) += 1;
    }

    /// Last value covered by the bin starting at `start`
    pub fn bin_end(&self, start: u32) -> u32 {
        start.saturating_add(self.bin_width - 1)
    }

    pub fn label_for(&self, start: u32) -> String {
        format!("{}-{}", start, self.bin_end(start))
    }

    /// Count stored under a label such as `"35-39"`
    pub fn get(&self, label: &str) -> Option<u64> {
        let start = parse_bin_start(label)?;
        self.counts.get(&start).copied()
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// `(label, count)` pairs in ascending bin order
    pub fn iter_labeled(&self) -> impl Iterator<Item = (String, u64)> + '_ {
        self.counts
            .iter()
            .map(move |(&start, &count)| (self.label_for(start), count))
    }

    /// The `n` most populated bins, ties broken by bin order
    pub fn top(&self, n: usize) -> Vec<(String, u64)> {
        let mut bins: Vec<(String, u64)> = self.iter_labeled().collect();
        bins.sort_by(|a, b| b.1.cmp(&a.1));
        bins.truncate(n);
        bins
    }
}

fn parse_bin_start(label: &str) -> Option<u32> {
    label.split_once('-')?.0.trim().parse().ok()
}

impl fmt::Display for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter_labeled()
            .map(|(label, count)| format!("{label}: {count}"))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

impl Serialize for Histogram {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.counts.len()))?;
        for (label, count) in self.iter_labeled() {
            map.serialize_entry(&label, &count)?;
        }
        map.end()
    }
}

impl Histogram {
    /// Rebuild a histogram of known `bin_width` from its serialized label map.
    ///
    /// The width is not part of the serialized form, so the owner of the
    /// field supplies it (see `#[serde(deserialize_with)]` on `ReadMetrics`).
    /// Labels that do not describe a bin of that width are rejected.
    pub fn deserialize_with_width<'de, D>(bin_width: u32, deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        let raw: BTreeMap<String, u64> = BTreeMap::deserialize(deserializer)?;
        let mut histogram = Self::new(bin_width);

        for (label, count) in raw {
            let bounds = label.split_once('-').and_then(|(s, e)| {
                Some((s.trim().parse::<u32>().ok()?, e.trim().parse::<u32>().ok()?))
            });

            match bounds {
                Some((start, end)) if start % bin_width == 0 && end == histogram.bin_end(start) => {
                    histogram.counts.insert(start, count);
                }
                _ => {
                    return Err(D::Error::custom(format!(
                        "invalid histogram label '{label}' for bin width {bin_width}"
                    )))
                }
            }
        }

        Ok(histogram)
    }
}
