//! Unified error handling for the run-heatmap library.
//!
//! Filtering, sorting, projection and the selection transitions never fail:
//! an empty or unmatched input is an empty result, not an error. Errors only
//! come from the edges of the crate (loading activities, validating config).

use std::fmt;

/// Unified error type for run-heatmap operations.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardError {
    /// Configuration value out of range
    InvalidConfig { field: String, message: String },
    /// Activity record that cannot be turned into an `Activity`
    InvalidActivity {
        activity_id: String,
        message: String,
    },
    /// Malformed JSON input
    Parse { message: String },
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashboardError::InvalidConfig { field, message } => {
                write!(f, "Invalid config '{}': {}", field, message)
            }
            DashboardError::InvalidActivity {
                activity_id,
                message,
            } => {
                write!(f, "Activity '{}' is invalid: {}", activity_id, message)
            }
            DashboardError::Parse { message } => {
                write!(f, "Parse error: {}", message)
            }
        }
    }
}

impl std::error::Error for DashboardError {}

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        DashboardError::Parse {
            message: err.to_string(),
        }
    }
}

/// Result type alias for run-heatmap operations.
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Extension trait for converting Option to DashboardError.
pub trait OptionExt<T> {
    /// Convert Option to Result with an invalid activity error.
    fn ok_or_invalid_activity(self, activity_id: &str, message: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_invalid_activity(self, activity_id: &str, message: &str) -> Result<T> {
        self.ok_or_else(|| DashboardError::InvalidActivity {
            activity_id: activity_id.to_string(),
            message: message.to_string(),
        })
    }
}
