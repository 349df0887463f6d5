//! Unified error hierarchy for sleeprs
//!
//! The engine itself is total: every arithmetic step is normalized modulo
//! 24 hours and cannot fail. Errors only arise at the edges, when text typed
//! by a user is turned into engine inputs or when results are written out.

use thiserror::Error;

use crate::export::ExportError;

/// Top-level error type for all sleeprs operations
#[derive(Debug, Error)]
pub enum SleepCalcError {
    /// Anchor or selection string is not of the form `H:MM AM|PM`
    #[error("Invalid time format: '{input}' (expected H:MM AM or H:MM PM)")]
    InvalidTimeFormat { input: String },

    /// Unknown tag for a chronotype, age band, direction or output format
    #[error("Invalid {field}: '{value}' (expected one of {expected})")]
    InvalidOption {
        field: String,
        value: String,
        expected: String,
    },

    /// Rendering or writing results failed
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for sleeprs operations
pub type Result<T> = std::result::Result<T, SleepCalcError>;

impl SleepCalcError {
    pub fn invalid_time(input: impl Into<String>) -> Self {
        SleepCalcError::InvalidTimeFormat {
            input: input.into(),
        }
    }

    pub fn invalid_option(field: &str, value: &str, expected: &str) -> Self {
        SleepCalcError::InvalidOption {
            field: field.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        }
    }

    /// Validation errors are shown next to the input; computation is withheld
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SleepCalcError::InvalidTimeFormat { .. } | SleepCalcError::InvalidOption { .. }
        )
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SleepCalcError::InvalidTimeFormat { .. } => ErrorSeverity::Warning,
            SleepCalcError::InvalidOption { .. } => ErrorSeverity::Warning,
            SleepCalcError::Configuration(_) => ErrorSeverity::Error,
            SleepCalcError::Export(_) | SleepCalcError::Io(_) => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            SleepCalcError::InvalidTimeFormat { input } if input.trim().is_empty() => {
                "Please enter a time such as 7:00 AM".to_string()
            }
            SleepCalcError::InvalidTimeFormat { input } => {
                format!("'{}' is not a valid time. Use a format like 7:00 AM or 10:30 PM", input)
            }
            SleepCalcError::InvalidOption {
                field, expected, ..
            } => {
                format!("Please choose a {} from: {}", field, expected)
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Error that prevents the operation
    Error,
    /// Input problem the user can correct
    Warning,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity() {
        let err = SleepCalcError::invalid_time("25:00 PM");
        assert_eq!(err.severity(), ErrorSeverity::Warning);
        assert_eq!(
            SleepCalcError::invalid_option("age range", "toddler", "teen").severity(),
            ErrorSeverity::Warning
        );

        let err = SleepCalcError::Configuration("bad toml".to_string());
        assert_eq!(err.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_validation_classification() {
        assert!(SleepCalcError::invalid_time("noon").is_validation());
        assert!(SleepCalcError::invalid_option("chronotype", "owl", "early, late").is_validation());
        assert!(!SleepCalcError::Configuration("x".to_string()).is_validation());
    }

    #[test]
    fn test_user_messages() {
        let err = SleepCalcError::invalid_time("13:00 PM");
        assert!(err.user_message().contains("13:00 PM"));
        assert!(err.user_message().contains("7:00 AM"));

        let err = SleepCalcError::invalid_time("  ");
        assert_eq!(err.user_message(), "Please enter a time such as 7:00 AM");

        let err = SleepCalcError::invalid_option("age band", "kid", "teen, adult, older-adult");
        assert!(err.user_message().contains("teen, adult, older-adult"));
    }
}
