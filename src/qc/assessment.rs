//! Overall quality verdict derived from average Phred quality

use serde::{Deserialize, Serialize};
use std::fmt;

use super::qc_stats::ReadMetrics;

/// Ordinal quality verdict, ordered `Failed < Poor < Fair < Good < Excellent`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityAssessment {
    Failed,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl QualityAssessment {
    /// Inclusive lower bounds, checked from the highest level down
    pub const THRESHOLDS: [(f64, QualityAssessment); 4] = [
        (35.0, QualityAssessment::Excellent),
        (30.0, QualityAssessment::Good),
        (25.0, QualityAssessment::Fair),
        (20.0, QualityAssessment::Poor),
    ];

    pub fn from_average_quality(average_quality: f64) -> Self {
        Self::THRESHOLDS
            .iter()
            .find(|(threshold, _)| average_quality >= *threshold)
            .map(|&(_, level)| level)
            .unwrap_or(QualityAssessment::Failed)
    }

    pub fn from_metrics(metrics: &ReadMetrics) -> Self {
        Self::from_average_quality(metrics.average_quality)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityAssessment::Excellent => "excellent",
            QualityAssessment::Good => "good",
            QualityAssessment::Fair => "fair",
            QualityAssessment::Poor => "poor",
            QualityAssessment::Failed => "failed",
        }
    }

    /// Capitalised label for headings
    pub fn title(&self) -> &'static str {
        match self {
            QualityAssessment::Excellent => "Excellent",
            QualityAssessment::Good => "Good",
            QualityAssessment::Fair => "Fair",
            QualityAssessment::Poor => "Poor",
            QualityAssessment::Failed => "Failed",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            QualityAssessment::Excellent => "exceptional quality with minimal issues",
            QualityAssessment::Good => "good quality suitable for most analyses",
            QualityAssessment::Fair => "acceptable quality with some concerns",
            QualityAssessment::Poor => "poor quality requiring preprocessing",
            QualityAssessment::Failed => "failed quality checks, significant issues detected",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            QualityAssessment::Excellent => "🌟",
            QualityAssessment::Good => "✅",
            QualityAssessment::Fair => "⚠️",
            QualityAssessment::Poor => "❗",
            QualityAssessment::Failed => "❌",
        }
    }
}

impl fmt::Display for QualityAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_are_inclusive_at_lower_edge() {
        assert_eq!(QualityAssessment::from_average_quality(35.0), QualityAssessment::Excellent);
        assert_eq!(QualityAssessment::from_average_quality(34.999_999), QualityAssessment::Good);
        assert_eq!(QualityAssessment::from_average_quality(30.0), QualityAssessment::Good);
        assert_eq!(QualityAssessment::from_average_quality(29.999), QualityAssessment::Fair);
        assert_eq!(QualityAssessment::from_average_quality(25.0), QualityAssessment::Fair);
        assert_eq!(QualityAssessment::from_average_quality(24.999), QualityAssessment::Poor);
        assert_eq!(QualityAssessment::from_average_quality(20.0), QualityAssessment::Poor);
        assert_eq!(QualityAssessment::from_average_quality(19.999), QualityAssessment::Failed);
        assert_eq!(QualityAssessment::from_average_quality(0.0), QualityAssessment::Failed);
    }

    #[test]
    fn test_extreme_values() {
        assert_eq!(QualityAssessment::from_average_quality(93.0), QualityAssessment::Excellent);
        assert_eq!(QualityAssessment::from_average_quality(-1.0), QualityAssessment::Failed);
        assert_eq!(QualityAssessment::from_average_quality(f64::NAN), QualityAssessment::Failed);
    }

    #[test]
    fn test_total_order() {
        assert!(QualityAssessment::Excellent > QualityAssessment::Good);
        assert!(QualityAssessment::Good > QualityAssessment::Fair);
        assert!(QualityAssessment::Fair > QualityAssessment::Poor);
        assert!(QualityAssessment::Poor > QualityAssessment::Failed);
    }

    #[test]
    fn test_serialized_lowercase() {
        let json = serde_json::to_string(&QualityAssessment::Excellent).unwrap();
        assert_eq!(json, "\"excellent\"");
        assert_eq!(QualityAssessment::Fair.to_string(), "fair");
        assert_eq!(QualityAssessment::Poor.title(), "Poor");
    }
}
