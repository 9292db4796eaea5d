use serde::{
    Deserialize,
    Serialize,
};

use crate::errors::{
    DataProcessingError,
    Result,
};
use crate::models::trace::{
    Trace,
    TraceDimension,
};
use crate::utils::CoordinateRange;

/// Which side of a precursor/fragment pairing an operation reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceLevel {
    Precursor,
    Fragment,
    Both,
}

/// The precursor + fragment traces of one peptide-charge observation,
/// sharing one coordinate axis.
///
/// Built once per (peptide, charge, run) extraction by a loader and
/// consumed read-only by the peak detectors. At least one of the two
/// lists is non-empty and every trace shares one `TraceDimension`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceGroup {
    pub precursors: Vec<Trace>,
    pub fragments: Vec<Trace>,
    pub sequence: Option<String>,
    pub precursor_charge: Option<u8>,
}

impl TraceGroup {
    pub fn try_new(
        precursors: Vec<Trace>,
        fragments: Vec<Trace>,
        sequence: Option<String>,
        precursor_charge: Option<u8>,
    ) -> Result<Self> {
        if precursors.is_empty() && fragments.is_empty() {
            return Err(DataProcessingError::empty(
                "TraceGroup requires at least one trace",
            ));
        }
        let mut dims = precursors.iter().chain(fragments.iter()).map(|t| t.dimension);
        let first = dims.next().expect("at least one trace checked above");
        if dims.any(|d| d != first) {
            return Err(DataProcessingError::MismatchedTraceDimensions);
        }
        Ok(Self {
            precursors,
            fragments,
            sequence,
            precursor_charge,
        })
    }

    pub fn dimension(&self) -> TraceDimension {
        self.precursors
            .first()
            .or_else(|| self.fragments.first())
            .map(|t| t.dimension)
            .expect("TraceGroup invariant: at least one trace")
    }

    pub fn resolve_level(&self, level: TraceLevel) -> Vec<&Trace> {
        match level {
            TraceLevel::Precursor => self.precursors.iter().collect(),
            TraceLevel::Fragment => self.fragments.iter().collect(),
            TraceLevel::Both => self.precursors.iter().chain(self.fragments.iter()).collect(),
        }
    }

    /// The largest in-range intensity across the selected traces.
    /// `0.0` when the selection is empty or no points fall in range
    /// (not an error).
    pub fn max(&self, range: &CoordinateRange, level: TraceLevel) -> f32 {
        self.resolve_level(level)
            .iter()
            .filter_map(|t| t.max(Some(range)).ok())
            .map(|(_, intensity)| intensity)
            .fold(0.0, f32::max)
    }

    /// Summed in-range intensity across the selected traces.
    pub fn sum(&self, range: &CoordinateRange, level: TraceLevel) -> f32 {
        self.resolve_level(level)
            .iter()
            .map(|t| t.sum(Some(range)))
            .sum()
    }

    /// Concatenates every selected point into one combined trace,
    /// sorted ascending by coordinate. Used for group-wide medians.
    pub fn flatten(&self, level: TraceLevel) -> Result<Trace> {
        let traces = self.resolve_level(level);
        if traces.is_empty() {
            return Err(DataProcessingError::empty(
                "TraceGroup::flatten over an empty level",
            ));
        }
        let mut points: Vec<(f64, f32)> = traces
            .iter()
            .flat_map(|t| t.coordinate.iter().copied().zip(t.intensity.iter().copied()))
            .collect();
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (coordinate, intensity) = points.into_iter().unzip();
        Ok(Trace {
            coordinate,
            intensity,
            label: "flattened".to_string(),
            dimension: self.dimension(),
        })
    }

    /// `Trace::align_length` applied to every member, metadata kept.
    pub fn align_length(&self, target: usize) -> Result<TraceGroup> {
        let precursors = self
            .precursors
            .iter()
            .map(|t| t.align_length(target))
            .collect::<Result<Vec<_>>>()?;
        let fragments = self
            .fragments
            .iter()
            .map(|t| t.align_length(target))
            .collect::<Result<Vec<_>>>()?;
        Ok(TraceGroup {
            precursors,
            fragments,
            sequence: self.sequence.clone(),
            precursor_charge: self.precursor_charge,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(label: &str, intensity: Vec<f32>) -> Trace {
        let coordinate = (0..intensity.len()).map(|i| i as f64).collect();
        Trace::try_new(coordinate, intensity, label, TraceDimension::RetentionTime).unwrap()
    }

    fn group() -> TraceGroup {
        TraceGroup::try_new(
            vec![trace("precursor", vec![1.0, 2.0, 3.0, 2.0])],
            vec![
                trace("y4^1", vec![0.0, 5.0, 1.0, 0.0]),
                trace("b3^1", vec![2.0, 0.0, 4.0, 1.0]),
            ],
            Some("PEPTIDEK".to_string()),
            Some(2),
        )
        .unwrap()
    }

    #[test]
    fn test_requires_some_trace() {
        assert!(TraceGroup::try_new(vec![], vec![], None, None).is_err());
        assert!(TraceGroup::try_new(vec![trace("p", vec![1.0])], vec![], None, None).is_ok());
    }

    #[test]
    fn test_rejects_mixed_dimensions() {
        let mobilogram = Trace::try_new(
            vec![0.8, 0.9],
            vec![1.0, 2.0],
            "precursor",
            TraceDimension::IonMobility,
        )
        .unwrap();
        let out = TraceGroup::try_new(
            vec![mobilogram],
            vec![trace("y4^1", vec![1.0, 2.0])],
            None,
            None,
        );
        assert!(out.is_err());
    }

    #[test]
    fn test_resolve_level() {
        let group = group();
        assert_eq!(group.resolve_level(TraceLevel::Precursor).len(), 1);
        assert_eq!(group.resolve_level(TraceLevel::Fragment).len(), 2);
        assert_eq!(group.resolve_level(TraceLevel::Both).len(), 3);
    }

    #[test]
    fn test_group_max_and_sum() {
        let group = group();
        let range = (0.0, 3.0).try_into().unwrap();
        assert_eq!(group.max(&range, TraceLevel::Fragment), 5.0);
        assert_eq!(group.max(&range, TraceLevel::Both), 5.0);
        assert_eq!(group.sum(&range, TraceLevel::Precursor), 8.0);
        assert_eq!(group.sum(&range, TraceLevel::Fragment), 13.0);

        // Out-of-axis range: max is 0.0, never an error.
        let range = (100.0, 200.0).try_into().unwrap();
        assert_eq!(group.max(&range, TraceLevel::Both), 0.0);
    }

    #[test]
    fn test_flatten_sorts_by_coordinate() {
        let group = group();
        let flat = group.flatten(TraceLevel::Fragment).unwrap();
        assert_eq!(flat.len(), 8);
        assert!(flat.coordinate.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(flat.dimension, TraceDimension::RetentionTime);
        // Two points per shared coordinate, one from each fragment.
        assert_eq!(flat.coordinate[0], 0.0);
        assert_eq!(flat.coordinate[1], 0.0);
    }

    #[test]
    fn test_align_length_applies_to_all() {
        let group = group();
        let aligned = group.align_length(8).unwrap();
        assert!(aligned.precursors.iter().all(|t| t.len() == 8));
        assert!(aligned.fragments.iter().all(|t| t.len() == 8));
        assert_eq!(aligned.sequence, group.sequence);
        assert_eq!(aligned.precursor_charge, group.precursor_charge);
    }
}
