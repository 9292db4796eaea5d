//! Peak detection and consensus-feature engine for chromatographic
//! traces.
//!
//! Given a [`chromtrace::TraceGroup`] (precursor + fragment intensity
//! traces over one axis), the engine locates the coordinate windows
//! where an elution event occurs and emits a small ranked set of
//! [`ConsensusFeature`] boundaries:
//!
//! - [`ClassicalPeakDetector`] smooths each trace, finds per-trace
//!   boundaries, merges overlapping boundaries across traces and keeps
//!   the top-N by apex intensity.
//! - [`LearnedPeakDetector`] builds a fixed-shape 21-channel tensor,
//!   runs a pretrained scoring model behind the [`ScoringModel`] seam
//!   and decodes the score curves back into boundaries on the original
//!   axis.
//!
//! Everything is a synchronous in-memory transform; loaders, inference
//! runtimes and reporting live in collaborating crates.

// Re-export main structures
pub use crate::models::{
    BoundaryCandidate,
    ConsensusFeature,
};
pub use crate::picking::{
    ClassicalPeakDetector,
    DEFAULT_TOP_N,
    FragmentLibrary,
    LearnedPeakConfig,
    LearnedPeakDetector,
    PredictionMode,
    ScoringModel,
    SmoothedMaximaFinder,
    Smoother,
    TraceBoundaryFinder,
};

// Declare modules
pub mod errors;
pub mod models;
pub mod picking;

// Re-export errors
pub use crate::errors::PeakPickingError;
