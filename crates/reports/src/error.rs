use store::StoreError;
use thiserror::Error;

/// Errors that can occur when building reports.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Only one of the two date-range bounds was provided.
    #[error("Please provide both 'from_date' and 'to_date'")]
    IncompleteRange,

    /// A storage fault.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ReportError {
    /// Returns the logical field this validation error is tagged with.
    pub fn field_tag(&self) -> Option<&'static str> {
        match self {
            ReportError::IncompleteRange => Some("Params"),
            ReportError::Store(_) => None,
        }
    }
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;
