use std::fmt::Display;
use std::path::PathBuf;

use chromtrace::DataProcessingError;

#[derive(Debug, Clone, PartialEq)]
pub enum PeakPickingError {
    /// The learned-model preprocessing got a fragment-trace count it
    /// cannot lay out into the fixed channel scheme.
    UnsupportedTraceCount {
        got: usize,
        expected: usize,
    },
    /// `pick` was called before a scoring-model session was loaded.
    ModelNotLoaded,
    /// A model path without the expected `.onnx` extension. The file is
    /// never parsed here, only its suffix is checked.
    InvalidModelPath {
        path: PathBuf,
    },
    /// The trace group is missing a field the learned preprocessing
    /// needs (sequence, charge, or a precursor trace).
    MissingGroupMetadata {
        field: &'static str,
    },
    /// The scoring model returned an output whose width does not match
    /// the input window.
    ModelOutputShapeMismatch {
        expected_cols: usize,
        got_cols: usize,
    },
    DataProcessing(DataProcessingError),
}

impl Display for PeakPickingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for PeakPickingError {}

impl From<DataProcessingError> for PeakPickingError {
    fn from(x: DataProcessingError) -> Self {
        Self::DataProcessing(x)
    }
}

pub type Result<T> = std::result::Result<T, PeakPickingError>;
