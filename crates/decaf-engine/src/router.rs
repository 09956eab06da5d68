//! # Result Router
//!
//! Applies the host's failure policy to a finished validation.
//!
//! | Report  | `throw_on_fail` | Outcome                                  |
//! |---------|-----------------|------------------------------------------|
//! | valid   | either          | [`RoutedOutcome::Passthrough`]           |
//! | invalid | `true`          | [`RoutedOutcome::Raised`]                |
//! | invalid | `false`         | [`RoutedOutcome::Annotated`]             |
//!
//! The data is moved through untouched in every case. Hosts that process
//! batches record the position of the failing item in
//! [`ErrorContext::item_index`].

use decaf_core::ValidationReport;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Host-supplied context attached to a raised validation failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorContext {
    /// Position of the failing item in the host's batch.
    pub item_index: Option<usize>,
}

/// An invalid report in raised form.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("validation failed with {} error(s):\n{report}", .report.len())]
pub struct AggregateValidationError {
    report: ValidationReport,
    /// Host context; set or overwritten without touching the report.
    pub context: ErrorContext,
}

impl AggregateValidationError {
    /// Raise `report` with an empty context.
    pub fn new(report: ValidationReport) -> Self {
        Self {
            report,
            context: ErrorContext::default(),
        }
    }

    /// Set the batch position of the failing item.
    pub fn with_item_index(mut self, index: usize) -> Self {
        self.context.item_index = Some(index);
        self
    }

    /// The full report that caused the failure.
    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    /// Consume the error and return its report.
    pub fn into_report(self) -> ValidationReport {
        self.report
    }
}

/// The routed result of validating one data item.
#[derive(Debug, Clone, PartialEq)]
pub enum RoutedOutcome {
    /// The data passed; forwarded unchanged.
    Passthrough(Value),
    /// The data failed and the host asked for failures to be raised.
    Raised(AggregateValidationError),
    /// The data failed and the host asked to continue; the original data
    /// travels with its report.
    Annotated {
        /// The original, unmodified data.
        data: Value,
        /// Every failure found.
        report: ValidationReport,
    },
}

/// Reference from an output item back to the input item it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PairedItem {
    /// Index of the input item.
    pub item: usize,
}

/// One output item in the `{ json, error, pairedItem }` host convention.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostItem {
    /// The item's data.
    pub json: Value,
    /// The validation failure, for annotated items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<AggregateValidationError>,
    /// The originating input item, for annotated items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paired_item: Option<PairedItem>,
}

/// Route a finished validation according to the failure policy.
pub fn route(data: Value, report: ValidationReport, throw_on_fail: bool) -> RoutedOutcome {
    if report.is_valid() {
        RoutedOutcome::Passthrough(data)
    } else if throw_on_fail {
        RoutedOutcome::Raised(AggregateValidationError::new(report))
    } else {
        RoutedOutcome::Annotated { data, report }
    }
}

impl RoutedOutcome {
    /// Returns true if the data passed validation.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Passthrough(_))
    }

    /// The report, if validation failed.
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            Self::Passthrough(_) => None,
            Self::Raised(e) => Some(e.report()),
            Self::Annotated { report, .. } => Some(report),
        }
    }

    /// Turn [`RoutedOutcome::Raised`] into `Err`; every other outcome is
    /// returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns the raised [`AggregateValidationError`].
    pub fn into_result(self) -> Result<Self, AggregateValidationError> {
        match self {
            Self::Raised(e) => Err(e),
            other => Ok(other),
        }
    }

    /// Convert into the host's output item for input position `index`.
    ///
    /// # Errors
    ///
    /// A raised outcome has no output item; its error is returned with
    /// `context.item_index` set to `index`.
    pub fn into_host_item(self, index: usize) -> Result<HostItem, AggregateValidationError> {
        match self {
            Self::Passthrough(json) => Ok(HostItem {
                json,
                error: None,
                paired_item: None,
            }),
            Self::Raised(e) => Err(e.with_item_index(index)),
            Self::Annotated { data, report } => Ok(HostItem {
                json: data,
                error: Some(AggregateValidationError::new(report).with_item_index(index)),
                paired_item: Some(PairedItem { item: index }),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decaf_core::{FieldError, FieldPath};
    use serde_json::json;

    fn failing() -> ValidationReport {
        ValidationReport::from_errors(vec![FieldError::new(
            FieldPath::new("name"),
            "Required",
            "value is required",
        )])
    }

    #[test]
    fn test_valid_passes_through() {
        let data = json!({"name": "x"});
        for throw in [true, false] {
            let outcome = route(data.clone(), ValidationReport::valid(), throw);
            assert_eq!(outcome, RoutedOutcome::Passthrough(data.clone()));
        }
    }

    #[test]
    fn test_invalid_raises_with_full_report() {
        let outcome = route(json!({}), failing(), true);
        let err = outcome.into_result().unwrap_err();
        assert_eq!(err.report(), &failing());
        assert_eq!(err.context.item_index, None);
        assert!(err.to_string().starts_with("validation failed with 1 error(s):"));

        let err = err.with_item_index(3).with_item_index(4);
        assert_eq!(err.context.item_index, Some(4));
        assert_eq!(err.into_report(), failing());
    }

    #[test]
    fn test_invalid_annotates_unmodified_data() {
        let data = json!({"name": "", "extra": [1, 2]});
        let outcome = route(data.clone(), failing(), false);
        assert!(!outcome.is_valid());
        assert_eq!(outcome.report(), Some(&failing()));
        match outcome.clone().into_result().unwrap() {
            RoutedOutcome::Annotated { data: d, .. } => assert_eq!(d, data),
            other => panic!("expected annotated outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_host_item_shape() {
        let item = route(json!({"name": ""}), failing(), false)
            .into_host_item(2)
            .unwrap();
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({
                "json": {"name": ""},
                "error": {
                    "report": {
                        "valid": false,
                        "errors": [{
                            "path": "name",
                            "constraintKind": "Required",
                            "message": "value is required"
                        }]
                    },
                    "context": {"itemIndex": 2}
                },
                "pairedItem": {"item": 2}
            })
        );

        let pass = route(json!({"name": "x"}), ValidationReport::valid(), false)
            .into_host_item(0)
            .unwrap();
        assert_eq!(serde_json::to_value(&pass).unwrap(), json!({"json": {"name": "x"}}));

        let raised = route(json!({}), failing(), true).into_host_item(5).unwrap_err();
        assert_eq!(raised.context.item_index, Some(5));
    }
}
