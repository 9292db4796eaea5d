use chromtrace::Trace;
use tracing::trace as trace_log;

use crate::errors::Result;
use crate::models::BoundaryCandidate;
use crate::picking::smoothing::Smoother;

/// The single-trace boundary-finder seam.
///
/// The multi-trace detector only needs this contract: one trace in,
/// zero or more `(boundary, apex, area)` candidates out. Anything that
/// honors it can drive [`crate::ClassicalPeakDetector`].
pub trait TraceBoundaryFinder {
    fn pick_trace(&self, trace: &Trace) -> Result<Vec<BoundaryCandidate>>;
}

/// Default boundary finder: smooth, take strict local maxima, walk
/// outward to the flanking minima.
///
/// Areas are integrated over the *raw* intensities inside the
/// boundaries; smoothing only steers where the boundaries land.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedMaximaFinder {
    pub smoother: Smoother,
    /// Maxima below this fraction of the trace-wide smoothed maximum
    /// are ignored.
    pub min_relative_intensity: f32,
}

impl Default for SmoothedMaximaFinder {
    fn default() -> Self {
        Self {
            smoother: Smoother::default(),
            min_relative_intensity: 0.01,
        }
    }
}

impl TraceBoundaryFinder for SmoothedMaximaFinder {
    fn pick_trace(&self, trace: &Trace) -> Result<Vec<BoundaryCandidate>> {
        if trace.len() < 3 || trace.is_empty() {
            return Ok(Vec::new());
        }

        let smoothed = self.smoother.smooth(&trace.intensity);
        let global_max = smoothed.iter().copied().fold(0.0f32, f32::max);
        if global_max <= 0.0 {
            return Ok(Vec::new());
        }
        let floor = self.min_relative_intensity * global_max;

        let mut candidates = Vec::new();
        for apex in 1..smoothed.len() - 1 {
            // Strict rise into the apex; plateaus resolve to their first
            // sample.
            if !(smoothed[apex] > smoothed[apex - 1] && smoothed[apex] >= smoothed[apex + 1]) {
                continue;
            }
            if smoothed[apex] < floor {
                continue;
            }

            let mut left = apex;
            while left > 0 && smoothed[left - 1] < smoothed[left] {
                left -= 1;
            }
            let mut right = apex;
            while right + 1 < smoothed.len() && smoothed[right + 1] < smoothed[right] {
                right += 1;
            }

            // Apex on the raw signal inside the boundaries; the smoothed
            // argmax only selected the region.
            let (raw_apex, raw_apex_intensity) = trace.intensity[left..=right]
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .map(|(i, &v)| (left + i, v))
                .unwrap_or((apex, trace.intensity[apex]));

            candidates.push(BoundaryCandidate {
                left_boundary: trace.coordinate[left],
                right_boundary: trace.coordinate[right],
                apex_coordinate: trace.coordinate[raw_apex],
                apex_intensity: raw_apex_intensity,
                area_intensity: trace.intensity[left..=right].iter().sum(),
            });
        }

        trace_log!(
            "Found {} boundary candidates on trace '{}'",
            candidates.len(),
            trace.label
        );
        Ok(candidates)
    }
}
