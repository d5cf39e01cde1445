//! Shared utilities: configuration and number formatting

pub mod configuration;

pub use configuration::{
    AnalysisConfig, AppConfig, ConfigurationError, GeneralConfig, LoggingConfig,
};

/// Render a count with comma thousands separators (`1234567` → `1,234,567`)
pub fn group_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    grouped
}
