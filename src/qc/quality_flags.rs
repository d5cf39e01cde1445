//! Quality warning flags and the shared GC band classifier

use serde::{Deserialize, Serialize};

use super::assessment::QualityAssessment;
use super::qc_stats::ReadMetrics;

/// Average quality below this raises `low_quality_reads`
pub const LOW_QUALITY_THRESHOLD: f64 = 25.0;

/// Length spread above this raises `uneven_read_lengths`
pub const MAX_LENGTH_SPREAD: usize = 50;

pub const GC_IDEAL_MIN: f64 = 40.0;
pub const GC_IDEAL_MAX: f64 = 60.0;
pub const GC_ACCEPTABLE_MIN: f64 = 35.0;
pub const GC_ACCEPTABLE_MAX: f64 = 65.0;

/// Where a GC percentage falls relative to the ideal and acceptable bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GcStatus {
    Ideal,
    Acceptable,
    Unusual,
}

impl GcStatus {
    /// Both bands are inclusive; anything outside the acceptable band is unusual
    pub fn classify(gc_content: f64) -> Self {
        if (GC_IDEAL_MIN..=GC_IDEAL_MAX).contains(&gc_content) {
            GcStatus::Ideal
        } else if (GC_ACCEPTABLE_MIN..=GC_ACCEPTABLE_MAX).contains(&gc_content) {
            GcStatus::Acceptable
        } else {
            GcStatus::Unusual
        }
    }

    pub fn should_flag(&self) -> bool {
        matches!(self, GcStatus::Unusual)
    }

    pub fn description(&self) -> &'static str {
        match self {
            GcStatus::Ideal => "within ideal range",
            GcStatus::Acceptable => "acceptable but outside ideal range",
            GcStatus::Unusual => "outside typical range",
        }
    }
}

/// Boolean quality warnings carried by every report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityFlags {
    pub low_quality_reads: bool,
    pub uneven_read_lengths: bool,
    pub poor_gc_content: bool,

    // Reserved for detectors that are not part of this analysis; always false here
    pub adapter_contamination: bool,
    pub overrepresented_sequences: bool,
    pub low_complexity_regions: bool,
}

impl QualityFlags {
    /// Derive flags from metrics.
    ///
    /// The assessment is accepted so callers can pass the whole analysis
    /// context, but the current flags depend only on the metrics.
    pub fn detect(metrics: &ReadMetrics, _assessment: QualityAssessment) -> Self {
        Self::from_metrics(metrics)
    }

    pub fn from_metrics(metrics: &ReadMetrics) -> Self {
        Self {
            low_quality_reads: metrics.average_quality < LOW_QUALITY_THRESHOLD,
            uneven_read_lengths: metrics.length_range() > MAX_LENGTH_SPREAD,
            poor_gc_content: GcStatus::classify(metrics.gc_content).should_flag(),
            ..Self::default()
        }
    }

    /// Human labels of every raised flag, in declaration order
    pub fn active(&self) -> Vec<&'static str> {
        [
            (self.low_quality_reads, "Low quality reads detected"),
            (self.uneven_read_lengths, "Uneven read length distribution"),
            (self.poor_gc_content, "GC content outside normal range"),
            (self.adapter_contamination, "Potential adapter contamination"),
            (self.overrepresented_sequences, "Overrepresented sequences"),
            (self.low_complexity_regions, "Low complexity regions"),
        ]
        .into_iter()
        .filter_map(|(raised, label)| raised.then_some(label))
        .collect()
    }

    pub fn any(&self) -> bool {
        !self.active().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(average_quality: f64, min_len: usize, max_len: usize, gc: f64) -> ReadMetrics {
        ReadMetrics {
            total_reads: 10,
            total_bases: 10 * max_len,
            average_read_length: (min_len + max_len) as f64 / 2.0,
            min_read_length: min_len,
            max_read_length: max_len,
            average_quality,
            gc_content: gc,
            ..ReadMetrics::default()
        }
    }

    #[test]
    fn test_gc_band_boundaries() {
        assert_eq!(GcStatus::classify(40.0), GcStatus::Ideal);
        assert_eq!(GcStatus::classify(60.0), GcStatus::Ideal);
        assert_eq!(GcStatus::classify(50.0), GcStatus::Ideal);
        assert_eq!(GcStatus::classify(35.0), GcStatus::Acceptable);
        assert_eq!(GcStatus::classify(65.0), GcStatus::Acceptable);
        assert_eq!(GcStatus::classify(39.999), GcStatus::Acceptable);
        assert_eq!(GcStatus::classify(34.999), GcStatus::Unusual);
        assert_eq!(GcStatus::classify(65.001), GcStatus::Unusual);
    }

    #[test]
    fn test_gc_flag_agrees_with_classifier() {
        for gc in [0.0, 20.0, 34.999, 35.0, 40.0, 60.0, 65.0, 65.001, 100.0] {
            let flags = QualityFlags::from_metrics(&metrics(30.0, 100, 100, gc));
            assert_eq!(flags.poor_gc_content, GcStatus::classify(gc).should_flag(), "gc = {gc}");
        }
    }

    #[test]
    fn test_low_quality_threshold() {
        assert!(QualityFlags::from_metrics(&metrics(24.999, 100, 100, 50.0)).low_quality_reads);
        assert!(!QualityFlags::from_metrics(&metrics(25.0, 100, 100, 50.0)).low_quality_reads);
    }

    #[test]
    fn test_uneven_lengths_requires_spread_above_fifty() {
        assert!(!QualityFlags::from_metrics(&metrics(30.0, 100, 150, 50.0)).uneven_read_lengths);
        assert!(QualityFlags::from_metrics(&metrics(30.0, 100, 151, 50.0)).uneven_read_lengths);
    }

    #[test]
    fn test_reserved_flags_stay_false() {
        let flags = QualityFlags::detect(&metrics(5.0, 10, 500, 5.0), QualityAssessment::Failed);
        assert!(flags.low_quality_reads && flags.uneven_read_lengths && flags.poor_gc_content);
        assert!(!flags.adapter_contamination);
        assert!(!flags.overrepresented_sequences);
        assert!(!flags.low_complexity_regions);
        assert_eq!(flags.active().len(), 3);
    }

    #[test]
    fn test_clean_metrics_raise_nothing() {
        let flags = QualityFlags::from_metrics(&metrics(36.0, 100, 100, 48.0));
        assert_eq!(flags, QualityFlags::default());
        assert!(!flags.any());
    }
}
