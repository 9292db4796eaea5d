use chromtrace::{
    CoordinateRange,
    TraceGroup,
    TraceLevel,
};
use tracing::debug;

use crate::errors::Result;
use crate::models::{
    BoundaryCandidate,
    ConsensusFeature,
};
use crate::picking::single_trace::{
    SmoothedMaximaFinder,
    TraceBoundaryFinder,
};

pub const DEFAULT_TOP_N: usize = 5;

const CLASSICAL_SOFTWARE: &str = "peakseek-classical";

/// Multi-trace peak detector: per-trace boundary detection, cross-trace
/// interval merging, apex recomputation, ranked top-N output.
///
/// The per-trace work is delegated through the [`TraceBoundaryFinder`]
/// seam; this type owns the merge and ranking semantics.
#[derive(Debug, Clone)]
pub struct ClassicalPeakDetector<F: TraceBoundaryFinder> {
    pub finder: F,
    pub level: TraceLevel,
    pub top_n: usize,
}

impl Default for ClassicalPeakDetector<SmoothedMaximaFinder> {
    fn default() -> Self {
        Self {
            finder: SmoothedMaximaFinder::default(),
            level: TraceLevel::Both,
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// One open interval of the merge sweep: boundaries plus the running
/// area sum of every candidate folded into it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct MergedInterval {
    pub left_boundary: f64,
    pub right_boundary: f64,
    pub area_intensity: f32,
}

/// Linear interval merge: sort once by left boundary, then a single
/// sweep with an explicit open-interval accumulator.
///
/// The overlap check is strict (`candidate.left < open.right`): exactly
/// touching intervals start a new merged interval. Preserved exactly
/// for reproducibility of downstream feature tables.
pub(crate) fn merge_candidates(mut candidates: Vec<BoundaryCandidate>) -> Vec<MergedInterval> {
    candidates.sort_by(|a, b| a.left_boundary.total_cmp(&b.left_boundary));

    let mut merged: Vec<MergedInterval> = Vec::new();
    let mut open: Option<MergedInterval> = None;
    for candidate in candidates {
        match open.as_mut() {
            Some(current) if candidate.left_boundary < current.right_boundary => {
                current.right_boundary = current.right_boundary.max(candidate.right_boundary);
                current.area_intensity += candidate.area_intensity;
            }
            _ => {
                if let Some(current) = open.take() {
                    merged.push(current);
                }
                open = Some(MergedInterval {
                    left_boundary: candidate.left_boundary,
                    right_boundary: candidate.right_boundary,
                    area_intensity: candidate.area_intensity,
                });
            }
        }
    }
    if let Some(current) = open {
        merged.push(current);
    }
    merged
}

impl<F: TraceBoundaryFinder> ClassicalPeakDetector<F> {
    /// Runs the full pipeline on one trace group.
    ///
    /// Zero candidates across all traces is a valid outcome and returns
    /// an empty list, never an error.
    pub fn pick(&self, group: &TraceGroup) -> Result<Vec<ConsensusFeature>> {
        let traces = group.resolve_level(self.level);

        let mut candidates = Vec::new();
        for trace in traces.iter() {
            candidates.extend(self.finder.pick_trace(trace)?);
        }
        debug!(
            "Collected {} boundary candidates over {} traces",
            candidates.len(),
            traces.len()
        );
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let merged = merge_candidates(candidates);

        // Recompute the true apex over ALL selected traces, not just the
        // ones that contributed candidates.
        let mut features: Vec<ConsensusFeature> = merged
            .into_iter()
            .map(|interval| {
                let range: CoordinateRange =
                    (interval.left_boundary, interval.right_boundary)
                        .try_into()
                        .expect("merged intervals are ordered");
                let mut apex: Option<(f64, f32)> = None;
                for trace in traces.iter() {
                    if let Ok((c, i)) = trace.max(Some(&range)) {
                        match apex {
                            Some((_, best)) if i <= best => {}
                            _ => apex = Some((c, i)),
                        }
                    }
                }
                ConsensusFeature {
                    left_boundary: interval.left_boundary,
                    right_boundary: interval.right_boundary,
                    area_intensity: Some(interval.area_intensity),
                    apex_coordinate: apex.map(|(c, _)| c),
                    apex_intensity: apex.map(|(_, i)| i),
                    confidence: None,
                    software: Some(CLASSICAL_SOFTWARE.to_string()),
                }
            })
            .collect();

        features.sort_by(|a, b| {
            b.apex_intensity
                .unwrap_or(0.0)
                .total_cmp(&a.apex_intensity.unwrap_or(0.0))
        });
        features.truncate(self.top_n);
        Ok(features)
    }
}
