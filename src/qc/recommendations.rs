//! Rule-based processing recommendations
//!
//! Rules are evaluated in table order and every triggered rule contributes
//! exactly one recommendation. The output order is the table order.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;

use super::qc_stats::ReadMetrics;
use super::quality_flags::{
    QualityFlags, GC_ACCEPTABLE_MAX, GC_ACCEPTABLE_MIN, GC_IDEAL_MAX, GC_IDEAL_MIN,
};

/// GC content outside this window escalates the contamination check to high priority
pub const GC_SEVERE_MIN: f64 = 30.0;
pub const GC_SEVERE_MAX: f64 = 70.0;

/// Reads longer than this on average are assumed to come from a platform that ligates adapters
pub const ADAPTER_TRIMMING_MIN_LENGTH: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecommendationCategory {
    #[serde(rename = "Quality Filtering")]
    QualityFiltering,
    #[serde(rename = "Length Filtering")]
    LengthFiltering,
    #[serde(rename = "Contamination Check")]
    ContaminationCheck,
    #[serde(rename = "Adapter Trimming")]
    AdapterTrimming,
}

impl RecommendationCategory {
    pub fn label(&self) -> &'static str {
        match self {
            RecommendationCategory::QualityFiltering => "Quality Filtering",
            RecommendationCategory::LengthFiltering => "Length Filtering",
            RecommendationCategory::ContaminationCheck => "Contamination Check",
            RecommendationCategory::AdapterTrimming => "Adapter Trimming",
        }
    }
}

impl fmt::Display for RecommendationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One prioritized, parameterized remediation step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: RecommendationCategory,
    pub priority: Priority,
    pub action: String,
    pub reason: String,
    pub parameters: BTreeMap<String, Value>,
}

impl Recommendation {
    fn new(
        category: RecommendationCategory,
        priority: Priority,
        action: &str,
        reason: String,
        parameters: impl IntoIterator<Item = (&'static str, Value)>,
    ) -> Self {
        Self {
            category,
            priority,
            action: action.to_string(),
            reason,
            parameters: parameters
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
        }
    }
}

/// A `(predicate, builder)` pair in the recommendation table
#[derive(Clone, Copy)]
pub struct RecommendationRule {
    pub name: &'static str,
    pub applies: fn(&ReadMetrics, &QualityFlags) -> bool,
    pub build: fn(&ReadMetrics) -> Recommendation,
}

impl RecommendationRule {
    pub fn evaluate(&self, metrics: &ReadMetrics, flags: &QualityFlags) -> Option<Recommendation> {
        (self.applies)(metrics, flags).then(|| (self.build)(metrics))
    }
}

impl fmt::Debug for RecommendationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecommendationRule").field("name", &self.name).finish()
    }
}

/// Evaluation order is part of the output contract
pub const RULES: [RecommendationRule; 4] = [
    RecommendationRule {
        name: "quality_filtering",
        applies: has_low_quality_reads,
        build: quality_filtering,
    },
    RecommendationRule {
        name: "length_filtering",
        applies: has_uneven_read_lengths,
        build: length_filtering,
    },
    RecommendationRule {
        name: "contamination_check",
        applies: has_poor_gc_content,
        build: contamination_check,
    },
    RecommendationRule {
        name: "adapter_trimming",
        applies: has_long_reads,
        build: adapter_trimming,
    },
];

fn has_low_quality_reads(_: &ReadMetrics, flags: &QualityFlags) -> bool {
    flags.low_quality_reads
}

fn has_uneven_read_lengths(_: &ReadMetrics, flags: &QualityFlags) -> bool {
    flags.uneven_read_lengths
}

fn has_poor_gc_content(_: &ReadMetrics, flags: &QualityFlags) -> bool {
    flags.poor_gc_content
}

fn has_long_reads(metrics: &ReadMetrics, _: &QualityFlags) -> bool {
    metrics.average_read_length > ADAPTER_TRIMMING_MIN_LENGTH
}

fn quality_filtering(metrics: &ReadMetrics) -> Recommendation {
    Recommendation::new(
        RecommendationCategory::QualityFiltering,
        Priority::High,
        "Apply quality filtering",
        format!(
            "Average quality score ({:.1}) is below recommended threshold (>25)",
            metrics.average_quality
        ),
        [
            ("min_quality", json!(20)),
            ("min_length", json!((metrics.average_read_length * 0.8).floor() as u64)),
        ],
    )
}

fn length_filtering(metrics: &ReadMetrics) -> Recommendation {
    Recommendation::new(
        RecommendationCategory::LengthFiltering,
        Priority::Medium,
        "Apply length filtering",
        format!(
            "Read lengths vary significantly ({}-{} bp)",
            metrics.min_read_length, metrics.max_read_length
        ),
        [
            ("min_length", json!(metrics.min_read_length + 10)),
            ("max_length", json!(metrics.max_read_length.saturating_sub(10))),
        ],
    )
}

fn contamination_check(metrics: &ReadMetrics) -> Recommendation {
    let priority = if metrics.gc_content < GC_SEVERE_MIN || metrics.gc_content > GC_SEVERE_MAX {
        Priority::High
    } else {
        Priority::Medium
    };

    Recommendation::new(
        RecommendationCategory::ContaminationCheck,
        priority,
        "Screen for contamination",
        format!(
            "GC content ({:.1}%) is outside acceptable range ({GC_ACCEPTABLE_MIN}-{GC_ACCEPTABLE_MAX}%). \
             Ideal range is {GC_IDEAL_MIN}-{GC_IDEAL_MAX}%",
            metrics.gc_content
        ),
        [
            ("ideal_gc_range", json!([GC_IDEAL_MIN, GC_IDEAL_MAX])),
            ("acceptable_gc_range", json!([GC_ACCEPTABLE_MIN, GC_ACCEPTABLE_MAX])),
        ],
    )
}

fn adapter_trimming(metrics: &ReadMetrics) -> Recommendation {
    Recommendation::new(
        RecommendationCategory::AdapterTrimming,
        Priority::Medium,
        "Trim adapter sequences",
        format!(
            "Average read length of {:.1} bp is typical of Illumina short-read data, \
             where adapter trimming is a standard preprocessing step",
            metrics.average_read_length
        ),
        [
            ("tool", json!("trimmomatic")),
            ("adapter_file", json!("TruSeq3-PE.fa")),
        ],
    )
}

/// Maps metrics and flags to an ordered list of recommendations
#[derive(Debug, Clone, Copy)]
pub struct RecommendationEngine {
    rules: &'static [RecommendationRule],
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RecommendationEngine {
    pub fn new() -> Self {
        Self { rules: &RULES }
    }

    pub fn rules(&self) -> &'static [RecommendationRule] {
        self.rules
    }

    pub fn recommend(&self, metrics: &ReadMetrics, flags: &QualityFlags) -> Vec<Recommendation> {
        self.rules
            .iter()
            .filter_map(|rule| rule.evaluate(metrics, flags))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(average_quality: f64, min_len: usize, max_len: usize, avg_len: f64, gc: f64) -> ReadMetrics {
        ReadMetrics {
            total_reads: 100,
            total_bases: (avg_len * 100.0) as usize,
            average_read_length: avg_len,
            min_read_length: min_len,
            max_read_length: max_len,
            average_quality,
            gc_content: gc,
            ..ReadMetrics::default()
        }
    }

    fn categories(recs: &[Recommendation]) -> Vec<RecommendationCategory> {
        recs.iter().map(|r| r.category).collect()
    }

    #[test]
    fn test_rule_table_order() {
        let names: Vec<&str> = RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec!["quality_filtering", "length_filtering", "contamination_check", "adapter_trimming"]
        );
    }

    #[test]
    fn test_quality_filtering_parameters() {
        let m = metrics(22.0, 50, 110, 80.0, 50.0);
        let rec = (RULES[0].build)(&m);

        assert_eq!(rec.category, RecommendationCategory::QualityFiltering);
        assert_eq!(rec.priority, Priority::High);
        assert_eq!(rec.parameters["min_quality"], json!(20));
        assert_eq!(rec.parameters["min_length"], json!(64));
        assert!(rec.reason.contains("22.0"));
    }

    #[test]
    fn test_quality_filtering_min_length_floors() {
        let m = metrics(22.0, 10, 10, 10.9, 50.0);
        let rec = (RULES[0].build)(&m);
        // 10.9 * 0.8 = 8.72
        assert_eq!(rec.parameters["min_length"], json!(8));
    }

    #[test]
    fn test_length_filtering_parameters() {
        let m = metrics(30.0, 50, 110, 80.0, 50.0);
        let rec = (RULES[1].build)(&m);

        assert_eq!(rec.priority, Priority::Medium);
        assert_eq!(rec.parameters["min_length"], json!(60));
        assert_eq!(rec.parameters["max_length"], json!(100));
        assert!(rec.reason.contains("50-110 bp"));
    }

    #[test]
    fn test_contamination_priority_by_severity() {
        let severe_low = (RULES[2].build)(&metrics(30.0, 100, 100, 100.0, 29.9));
        let severe_high = (RULES[2].build)(&metrics(30.0, 100, 100, 100.0, 70.1));
        let moderate_low = (RULES[2].build)(&metrics(30.0, 100, 100, 100.0, 30.0));
        let moderate_high = (RULES[2].build)(&metrics(30.0, 100, 100, 100.0, 70.0));

        assert_eq!(severe_low.priority, Priority::High);
        assert_eq!(severe_high.priority, Priority::High);
        assert_eq!(moderate_low.priority, Priority::Medium);
        assert_eq!(moderate_high.priority, Priority::Medium);
        assert_eq!(severe_low.parameters["ideal_gc_range"], json!([40.0, 60.0]));
        assert_eq!(severe_low.parameters["acceptable_gc_range"], json!([35.0, 65.0]));
        assert!(severe_low.reason.contains("29.9%"));
    }

    #[test]
    fn test_adapter_trimming_is_independent_of_flags() {
        let engine = RecommendationEngine::new();
        let long = metrics(38.0, 100, 100, 100.0, 50.0);
        let flags = QualityFlags::from_metrics(&long);
        assert!(!flags.any());

        let recs = engine.recommend(&long, &flags);
        assert_eq!(categories(&recs), vec![RecommendationCategory::AdapterTrimming]);
        assert_eq!(recs[0].parameters["tool"], json!("trimmomatic"));

        let exactly_fifty = metrics(38.0, 50, 50, 50.0, 50.0);
        let flags = QualityFlags::from_metrics(&exactly_fifty);
        assert!(engine.recommend(&exactly_fifty, &flags).is_empty());
    }

    #[test]
    fn test_order_is_stable_for_every_flag_subset() {
        let engine = RecommendationEngine::new();
        let m = metrics(22.0, 50, 110, 80.0, 20.0);
        let expected_order = [
            RecommendationCategory::QualityFiltering,
            RecommendationCategory::LengthFiltering,
            RecommendationCategory::ContaminationCheck,
            RecommendationCategory::AdapterTrimming,
        ];

        for mask in 0..8u8 {
            let flags = QualityFlags {
                low_quality_reads: mask & 1 != 0,
                uneven_read_lengths: mask & 2 != 0,
                poor_gc_content: mask & 4 != 0,
                ..QualityFlags::default()
            };
            let got = categories(&engine.recommend(&m, &flags));

            let expected: Vec<_> = expected_order
                .iter()
                .copied()
                .filter(|c| match c {
                    RecommendationCategory::QualityFiltering => flags.low_quality_reads,
                    RecommendationCategory::LengthFiltering => flags.uneven_read_lengths,
                    RecommendationCategory::ContaminationCheck => flags.poor_gc_content,
                    RecommendationCategory::AdapterTrimming => true,
                })
                .collect();
            assert_eq!(got, expected, "flag mask {mask:03b}");
        }
    }

    #[test]
    fn test_category_serializes_as_label() {
        let json = serde_json::to_string(&RecommendationCategory::ContaminationCheck).unwrap();
        assert_eq!(json, "\"Contamination Check\"");
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
    }
}
