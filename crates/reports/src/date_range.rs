//! Inclusive date-range input for report queries.

use chrono::{DateTime, NaiveDate, Utc};

use crate::ReportError;

/// An inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

impl DateRange {
    /// Builds a range from optional query parameters.
    ///
    /// Both bounds must be given together; a one-sided range is rejected.
    /// No bounds at all means "no restriction" and yields `None`.
    pub fn from_params(
        from_date: Option<NaiveDate>,
        to_date: Option<NaiveDate>,
    ) -> Result<Option<Self>, ReportError> {
        match (from_date, to_date) {
            (Some(from_date), Some(to_date)) => Ok(Some(Self { from_date, to_date })),
            (None, None) => Ok(None),
            _ => Err(ReportError::IncompleteRange),
        }
    }

    /// Returns true if the timestamp's calendar date falls in the range.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let date = at.date_naive();
        self.from_date <= date && date <= self.to_date
    }
}
