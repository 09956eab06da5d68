//! Accumulation of field errors into a [`ValidationReport`].
//!
//! Errors are kept in arrival order and never deduplicated: two
//! constraints failing on the same field are two entries.

use decaf_core::{FieldError, ValidationReport};

/// Collects [`FieldError`]s during one validation walk.
#[derive(Debug, Default)]
pub struct ErrorAggregator {
    errors: Vec<FieldError>,
}

impl ErrorAggregator {
    /// An empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one failure.
    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    /// Returns the number of failures recorded so far.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns true if nothing failed so far.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Produce the report. Valid iff nothing was recorded.
    pub fn finish(self) -> ValidationReport {
        ValidationReport::from_errors(self.errors)
    }
}

impl Extend<FieldError> for ErrorAggregator {
    fn extend<I: IntoIterator<Item = FieldError>>(&mut self, iter: I) {
        self.errors.extend(iter);
    }
}

/// Fold a stream of field errors into a report.
pub fn aggregate(errors: impl IntoIterator<Item = FieldError>) -> ValidationReport {
    let mut aggregator = ErrorAggregator::new();
    aggregator.extend(errors);
    aggregator.finish()
}
