use serde::{
    Deserialize,
    Serialize,
};
use tracing::warn;

use crate::errors::{
    DataProcessingError,
    Result,
};
use crate::utils::CoordinateRange;

/// The physical axis a trace is measured over.
///
/// This is the closed-tag rendition of the chromatogram / mobilogram /
/// spectrum specializations: one `Trace` type, one tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceDimension {
    RetentionTime,
    IonMobility,
    MassOverCharge,
}

/// A single 1D intensity trace over one coordinate axis.
///
/// `coordinate` and `intensity` are parallel arrays of the same length;
/// coordinates are assumed ascending (loaders produce them that way,
/// `TraceGroup::flatten` sorts before building one). Transforming
/// operations return new instances, nothing mutates in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub coordinate: Vec<f64>,
    pub intensity: Vec<f32>,
    pub label: String,
    pub dimension: TraceDimension,
}

impl Trace {
    pub fn try_new(
        coordinate: Vec<f64>,
        intensity: Vec<f32>,
        label: impl Into<String>,
        dimension: TraceDimension,
    ) -> Result<Self> {
        if coordinate.len() != intensity.len() {
            return Err(DataProcessingError::ExpectedSlicesSameLength {
                expected: coordinate.len(),
                other: intensity.len(),
                context: "Trace coordinate/intensity arrays",
            });
        }
        Ok(Self {
            coordinate,
            intensity,
            label: label.into(),
            dimension,
        })
    }

    pub fn len(&self) -> usize {
        self.coordinate.len()
    }

    /// A trace is empty when it carries no non-zero intensity.
    /// An all-zero intensity array counts as empty even if coordinates
    /// exist.
    pub fn is_empty(&self) -> bool {
        self.intensity.iter().all(|&x| x == 0.0)
    }

    fn iter_in(
        &self,
        range: Option<&CoordinateRange>,
    ) -> impl Iterator<Item = (f64, f32)> + '_ {
        let range = range.copied();
        self.coordinate
            .iter()
            .copied()
            .zip(self.intensity.iter().copied())
            .filter(move |(c, _)| match &range {
                Some(r) => r.contains(*c),
                None => true,
            })
    }

    /// Returns a new trace holding only the points whose coordinate
    /// falls inside `range` (inclusive on both ends). An empty result
    /// is valid.
    pub fn filter(&self, range: &CoordinateRange) -> Trace {
        let (coordinate, intensity) = self.iter_in(Some(range)).unzip();
        Trace {
            coordinate,
            intensity,
            label: self.label.clone(),
            dimension: self.dimension,
        }
    }

    /// The `(coordinate, intensity)` pair at the intensity maximum,
    /// optionally restricted to `range`. First occurrence wins on ties.
    ///
    /// Errors with `ExpectedNonEmptyData` when the (filtered) region
    /// holds no points at all.
    pub fn max(&self, range: Option<&CoordinateRange>) -> Result<(f64, f32)> {
        let mut best: Option<(f64, f32)> = None;
        for (c, i) in self.iter_in(range) {
            match best {
                Some((_, bi)) if i <= bi => {}
                _ => best = Some((c, i)),
            }
        }
        best.ok_or_else(|| DataProcessingError::empty("Trace::max over an empty region"))
    }

    /// Summed intensity, optionally restricted to `range`.
    /// An empty region sums to `0.0`.
    pub fn sum(&self, range: Option<&CoordinateRange>) -> f32 {
        self.iter_in(range).map(|(_, i)| i).sum()
    }

    /// Median intensity, optionally restricted to `range`. Even-length
    /// regions average the two middle values.
    ///
    /// Errors with `ExpectedNonEmptyData` for an empty region; a median
    /// of nothing is never silently `NaN`.
    pub fn median(&self, range: Option<&CoordinateRange>) -> Result<f32> {
        let mut values: Vec<f32> = self.iter_in(range).map(|(_, i)| i).collect();
        if values.is_empty() {
            return Err(DataProcessingError::empty(
                "Trace::median over an empty region",
            ));
        }
        values.sort_unstable_by(f32::total_cmp);
        let mid = values.len() / 2;
        if values.len() % 2 == 1 {
            Ok(values[mid])
        } else {
            Ok((values[mid - 1] + values[mid]) / 2.0)
        }
    }

    /// Crops or zero-pads the trace to `target` points, centered.
    ///
    /// The convention is center-preserving: sample `len/2` of the input
    /// lands at index `target/2` of the output. For crops that means the
    /// kept window starts at `len/2 - target/2`; for pads the left pad is
    /// `target/2 - len/2`, with intensities zero-filled and coordinates
    /// extrapolated outward using the step between the first two points.
    ///
    /// Padding a trace with fewer than two points errors: no uniform
    /// step can be inferred from it.
    pub fn align_length(&self, target: usize) -> Result<Trace> {
        let len = self.len();
        if target == len {
            return Ok(self.clone());
        }

        if target < len {
            let left = len / 2 - target / 2;
            return Ok(Trace {
                coordinate: self.coordinate[left..left + target].to_vec(),
                intensity: self.intensity[left..left + target].to_vec(),
                label: self.label.clone(),
                dimension: self.dimension,
            });
        }

        if len < 2 {
            return Err(DataProcessingError::empty(
                "Trace::align_length cannot infer a step from fewer than 2 points",
            ));
        }
        let step = self.coordinate[1] - self.coordinate[0];
        if step <= 0.0 {
            warn!(
                "Non-increasing step {} inferred while padding trace '{}'",
                step, self.label
            );
        }

        let pad_left = target / 2 - len / 2;
        let pad_right = target - len - pad_left;

        let mut coordinate = Vec::with_capacity(target);
        let mut intensity = Vec::with_capacity(target);
        let first = self.coordinate[0];
        let last = self.coordinate[len - 1];
        for i in 0..pad_left {
            coordinate.push(first - step * (pad_left - i) as f64);
            intensity.push(0.0);
        }
        coordinate.extend_from_slice(&self.coordinate);
        intensity.extend_from_slice(&self.intensity);
        for i in 0..pad_right {
            coordinate.push(last + step * (i + 1) as f64);
            intensity.push(0.0);
        }

        Ok(Trace {
            coordinate,
            intensity,
            label: self.label.clone(),
            dimension: self.dimension,
        })
    }
}
