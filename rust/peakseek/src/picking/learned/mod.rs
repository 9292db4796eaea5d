//! Learned-model peak detection: fixed-shape tensor construction,
//! score decoding, and index remapping back onto the original axis.
//!
//! The inference runtime itself is a collaborator behind the
//! [`ScoringModel`] trait; this module never parses a model file.

pub mod decode;
pub mod tensor;

use std::path::Path;

use chromtrace::{
    Array2D,
    TraceGroup,
};
use serde::{
    Deserialize,
    Serialize,
};
use tracing::debug;

use crate::errors::{
    PeakPickingError,
    Result,
};
use crate::models::ConsensusFeature;
use crate::picking::classical::DEFAULT_TOP_N;

pub use decode::{
    PeakPrediction,
    PredictionMode,
    find_top_peaks,
};
pub use tensor::{
    AlignmentInfo,
    DEFAULT_WINDOW_SIZE,
    NUM_FRAGMENT_CHANNELS,
    TENSOR_CHANNELS,
    build_input_tensor,
};

const LEARNED_SOFTWARE: &str = "peakseek-learned";

/// Static per-fragment library intensity lookup.
///
/// Missing entries are read as `0.0` by the tensor builder, matching
/// how expected intensities behave elsewhere in this codebase.
pub trait FragmentLibrary {
    fn fragment_library_intensity(
        &self,
        sequence: &str,
        charge: u8,
        fragment_label: &str,
    ) -> Option<f32>;
}

/// A loaded scoring-model session.
///
/// `run` takes a `(TENSOR_CHANNELS, window)` tensor and returns
/// `(classes, window)` per-position scores. A loaded session is not
/// assumed thread-safe; callers that want parallelism run one detector
/// per worker.
pub trait ScoringModel {
    /// The expected input shape `(batch, channels, window)`. A zero
    /// window axis means dynamic and falls back to
    /// [`DEFAULT_WINDOW_SIZE`].
    fn input_shape(&self) -> (usize, usize, usize);

    fn run(&self, tensor: &Array2D<f32>) -> Result<Array2D<f32>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearnedPeakConfig {
    pub prediction_mode: PredictionMode,
    /// Inclusive acceptance threshold on a probability row's maximum.
    pub prediction_threshold: f32,
    pub top_n: usize,
    /// The model does not estimate peak area; this placeholder is
    /// carried into the output features instead.
    pub placeholder_area: Option<f32>,
}

impl Default for LearnedPeakConfig {
    fn default() -> Self {
        Self {
            prediction_mode: PredictionMode::Sigmoided,
            prediction_threshold: 0.5,
            top_n: DEFAULT_TOP_N,
            placeholder_area: None,
        }
    }
}

/// Checks a model path for the `.onnx` suffix. The file is never
/// opened or parsed here; the inference runtime owns that.
pub fn validate_model_path(path: &Path) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("onnx") => Ok(()),
        _ => Err(PeakPickingError::InvalidModelPath {
            path: path.to_path_buf(),
        }),
    }
}

/// Peak detector backed by a pretrained scoring model.
///
/// The session is explicit state: construct unloaded, call
/// [`LearnedPeakDetector::load`] once (repeat calls are no-ops), then
/// [`LearnedPeakDetector::pick`]. Picking before a load is a
/// [`PeakPickingError::ModelNotLoaded`] precondition failure, never a
/// silent no-op.
#[derive(Debug)]
pub struct LearnedPeakDetector<M: ScoringModel, L: FragmentLibrary> {
    pub library: L,
    pub config: LearnedPeakConfig,
    model: Option<M>,
}

impl<M: ScoringModel, L: FragmentLibrary> LearnedPeakDetector<M, L> {
    pub fn new(library: L, config: LearnedPeakConfig) -> Self {
        Self {
            library,
            config,
            model: None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Installs the scoring-model session. Idempotent: once a session
    /// is held, later calls are ignored.
    pub fn load(&mut self, model: M) {
        if self.model.is_none() {
            self.model = Some(model);
        } else {
            debug!("Scoring model already loaded, ignoring repeated load");
        }
    }

    /// Runs preprocessing, inference and decode on one trace group and
    /// returns consensus features ranked by confidence.
    pub fn pick(&self, group: &TraceGroup) -> Result<Vec<ConsensusFeature>> {
        let model = self.model.as_ref().ok_or(PeakPickingError::ModelNotLoaded)?;

        let (_, _, model_window) = model.input_shape();
        let window = if model_window == 0 {
            DEFAULT_WINDOW_SIZE
        } else {
            model_window
        };

        let (input, alignment) = build_input_tensor(group, &self.library, window)?;
        let scores = model.run(&input)?;
        if scores.ncols() != window {
            return Err(PeakPickingError::ModelOutputShapeMismatch {
                expected_cols: window,
                got_cols: scores.ncols(),
            });
        }

        let predictions = find_top_peaks(
            &scores,
            self.config.prediction_mode,
            self.config.prediction_threshold,
        );
        debug!(
            "Decoded {} predictions from {} class rows",
            predictions.len(),
            scores.nrows()
        );

        // Boundary/apex lookups go through the ORIGINAL axis, not the
        // padded one.
        let axis = &group.fragments[0].coordinate;
        let mut features: Vec<ConsensusFeature> = predictions
            .into_iter()
            .map(|p| {
                let left = axis[alignment.remap_index(p.left_index)];
                let right = axis[alignment.remap_index(p.right_index)];
                // The unshifted-negative clamp can reorder a pair that
                // straddles the axis start; keep the boundary invariant.
                let (left, right) = if left <= right {
                    (left, right)
                } else {
                    (right, left)
                };
                ConsensusFeature {
                    left_boundary: left,
                    right_boundary: right,
                    area_intensity: self.config.placeholder_area,
                    apex_coordinate: Some(axis[alignment.remap_index(p.apex_index)]),
                    apex_intensity: None,
                    confidence: Some(p.confidence),
                    software: Some(LEARNED_SOFTWARE.to_string()),
                }
            })
            .collect();

        features.sort_by(|a, b| {
            b.confidence
                .unwrap_or(0.0)
                .total_cmp(&a.confidence.unwrap_or(0.0))
        });
        features.truncate(self.config.top_n);
        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chromtrace::{
        Trace,
        TraceDimension,
    };
    use std::path::PathBuf;

    struct StubLibrary;

    impl FragmentLibrary for StubLibrary {
        fn fragment_library_intensity(
            &self,
            _sequence: &str,
            _charge: u8,
            _fragment_label: &str,
        ) -> Option<f32> {
            Some(1.0)
        }
    }

    /// Replays a fixed score array after checking the input shape.
    struct StubModel {
        window: usize,
        scores: Vec<Vec<f32>>,
    }

    impl ScoringModel for StubModel {
        fn input_shape(&self) -> (usize, usize, usize) {
            (1, TENSOR_CHANNELS, self.window)
        }

        fn run(&self, tensor: &Array2D<f32>) -> Result<Array2D<f32>> {
            assert_eq!(tensor.nrows(), TENSOR_CHANNELS);
            assert_eq!(tensor.ncols(), self.window);
            Ok(Array2D::try_new(&self.scores)?)
        }
    }

    fn group(len: usize) -> TraceGroup {
        let fragments = (0..NUM_FRAGMENT_CHANNELS)
            .map(|k| {
                let coordinate = (1..=len).map(|i| i as f64).collect();
                let mut intensity = vec![0.0f32; len];
                intensity[len / 2] = (k + 1) as f32;
                Trace::try_new(
                    coordinate,
                    intensity,
                    format!("f{}", k),
                    TraceDimension::RetentionTime,
                )
                .unwrap()
            })
            .collect();
        let coordinate = (1..=len).map(|i| i as f64).collect();
        TraceGroup::try_new(
            vec![
                Trace::try_new(
                    coordinate,
                    vec![1.0; len],
                    "precursor",
                    TraceDimension::RetentionTime,
                )
                .unwrap(),
            ],
            fragments,
            Some("PEPTIDEK".to_string()),
            Some(2),
        )
        .unwrap()
    }

    #[test]
    fn test_pick_before_load_errors() {
        let detector: LearnedPeakDetector<StubModel, _> =
            LearnedPeakDetector::new(StubLibrary, LearnedPeakConfig::default());
        assert!(!detector.is_loaded());
        assert_eq!(
            detector.pick(&group(25)).unwrap_err(),
            PeakPickingError::ModelNotLoaded
        );
    }

    #[test]
    fn test_load_is_idempotent() {
        let window = 25;
        let mut scores_a = vec![vec![0.0f32; window]];
        scores_a[0][12] = 0.9;
        let mut scores_b = vec![vec![0.0f32; window]];
        scores_b[0][6] = 0.9;

        let mut detector = LearnedPeakDetector::new(StubLibrary, LearnedPeakConfig::default());
        detector.load(StubModel {
            window,
            scores: scores_a,
        });
        assert!(detector.is_loaded());
        // The second load must be ignored.
        detector.load(StubModel {
            window,
            scores: scores_b,
        });

        let features = detector.pick(&group(window)).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].apex_coordinate, Some(13.0));
    }

    #[test]
    fn test_pick_remaps_padded_indices() {
        // 25-point group, 35-wide model window: shift = 17 - 12 = 5.
        let window = 35;
        let mut row = vec![0.0f32; window];
        row[16] = 0.6;
        row[17] = 0.9;
        row[18] = 0.6;
        let mut detector = LearnedPeakDetector::new(StubLibrary, LearnedPeakConfig::default());
        detector.load(StubModel {
            window,
            scores: vec![row],
        });

        let features = detector.pick(&group(25)).unwrap();
        assert_eq!(features.len(), 1);
        let f = &features[0];
        // Tensor indices 16..18 remap to axis indices 11..13, and the
        // axis coordinates are 1-based.
        assert_eq!(f.apex_coordinate, Some(13.0));
        assert_eq!(f.left_boundary, 12.0);
        assert_eq!(f.right_boundary, 14.0);
        assert_eq!(f.confidence, Some(0.9));
        assert_eq!(f.apex_intensity, None);
        assert_eq!(f.software.as_deref(), Some("peakseek-learned"));
    }

    #[test]
    fn test_placeholder_area_is_carried() {
        let window = 25;
        let mut row = vec![0.0f32; window];
        row[12] = 0.8;
        let config = LearnedPeakConfig {
            placeholder_area: Some(-1.0),
            ..Default::default()
        };
        let mut detector = LearnedPeakDetector::new(StubLibrary, config);
        detector.load(StubModel {
            window,
            scores: vec![row],
        });
        let features = detector.pick(&group(window)).unwrap();
        assert_eq!(features[0].area_intensity, Some(-1.0));
    }

    #[test]
    fn test_features_ranked_by_confidence_and_truncated() {
        let window = 25;
        let mut rows = Vec::new();
        for k in 0..7usize {
            let mut row = vec![0.0f32; window];
            // Exactly representable confidences.
            row[2 * k + 3] = 0.5 + 0.0625 * k as f32;
            rows.push(row);
        }
        let config = LearnedPeakConfig {
            top_n: 3,
            ..Default::default()
        };
        let mut detector = LearnedPeakDetector::new(StubLibrary, config);
        detector.load(StubModel {
            window,
            scores: rows,
        });
        let features = detector.pick(&group(window)).unwrap();
        assert_eq!(features.len(), 3);
        let confidences: Vec<f32> = features.iter().map(|f| f.confidence.unwrap()).collect();
        assert_eq!(confidences, vec![0.875, 0.8125, 0.75]);
    }

    #[test]
    fn test_model_output_width_must_match_window() {
        let window = 25;
        let mut detector = LearnedPeakDetector::new(StubLibrary, LearnedPeakConfig::default());
        detector.load(StubModel {
            window,
            scores: vec![vec![0.9f32; 10]],
        });
        assert!(matches!(
            detector.pick(&group(window)).unwrap_err(),
            PeakPickingError::ModelOutputShapeMismatch { .. }
        ));
    }

    #[test]
    fn test_model_path_extension_validation() {
        assert!(validate_model_path(&PathBuf::from("weights/conformer.onnx")).is_ok());
        assert!(validate_model_path(&PathBuf::from("weights/CONFORMER.ONNX")).is_ok());
        assert!(validate_model_path(&PathBuf::from("weights/conformer.pt")).is_err());
        assert!(validate_model_path(&PathBuf::from("conformer")).is_err());
    }
}
