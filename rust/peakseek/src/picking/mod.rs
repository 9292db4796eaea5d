pub mod classical;
pub mod learned;
pub mod single_trace;
pub mod smoothing;

pub use classical::{
    ClassicalPeakDetector,
    DEFAULT_TOP_N,
};
pub use learned::{
    FragmentLibrary,
    LearnedPeakConfig,
    LearnedPeakDetector,
    PredictionMode,
    ScoringModel,
};
pub use single_trace::{
    SmoothedMaximaFinder,
    TraceBoundaryFinder,
};
pub use smoothing::Smoother;
