use std::fmt::Display;

/// Errors raised by the trace data model.
///
/// These are contract violations (mismatched lengths, malformed
/// boundaries, mixed dimensions) or aggregations over regions that
/// hold no data. "No peak found" is never an error; callers get an
/// empty result for that.
#[derive(Debug, Clone, PartialEq)]
pub enum DataProcessingError {
    ExpectedSlicesSameLength {
        expected: usize,
        other: usize,
        context: &'static str,
    },
    ExpectedNonEmptyData {
        context: Option<&'static str>,
    },
    InvalidBoundary {
        start: f64,
        end: f64,
    },
    MismatchedTraceDimensions,
}

impl Display for DataProcessingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for DataProcessingError {}

impl DataProcessingError {
    pub fn empty(context: &'static str) -> Self {
        Self::ExpectedNonEmptyData {
            context: Some(context),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataProcessingError>;
