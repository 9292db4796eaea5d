//! Trace data model for chromatographic peak detection.
//!
//! One [`Trace`] owns a coordinate axis (retention time, ion mobility
//! or m/z) plus a parallel intensity axis; a [`TraceGroup`] bundles the
//! precursor and fragment traces of one peptide-charge observation over
//! a shared axis. Both are plain in-memory value types: loaders build
//! them, detectors consume them read-only.

// Re-export main structures
pub use crate::models::{
    Array2D,
    Trace,
    TraceDimension,
    TraceGroup,
    TraceLevel,
};
pub use crate::utils::CoordinateRange;

// Declare modules
pub mod errors;
pub mod models;
pub mod utils;

// Re-export errors
pub use crate::errors::DataProcessingError;
