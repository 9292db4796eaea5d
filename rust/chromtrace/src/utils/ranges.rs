use serde::{
    Deserialize,
    Serialize,
};

use crate::errors::DataProcessingError;

/// An inclusive coordinate window `[start, end]` on a trace axis.
///
/// Construction goes through `TryFrom<(f64, f64)>`, which is the only
/// place where a malformed boundary can surface. Everything downstream
/// takes an already-valid range.
///
/// Example:
/// ```
/// use chromtrace::CoordinateRange;
///
/// let range: CoordinateRange = (12.0, 18.0).try_into().unwrap();
/// assert!(range.contains(12.0));
/// assert!(range.contains(18.0));
/// assert!(!range.contains(18.1));
///
/// let reversed: Result<CoordinateRange, _> = (18.0, 12.0).try_into();
/// assert!(reversed.is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateRange {
    start: f64,
    end: f64,
}

impl TryFrom<(f64, f64)> for CoordinateRange {
    type Error = DataProcessingError;

    fn try_from((start, end): (f64, f64)) -> Result<Self, Self::Error> {
        if !start.is_finite() || !end.is_finite() || start > end {
            return Err(DataProcessingError::InvalidBoundary { start, end });
        }
        Ok(Self { start, end })
    }
}

impl CoordinateRange {
    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn contains(&self, coordinate: f64) -> bool {
        coordinate >= self.start && coordinate <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_range() {
        let range = CoordinateRange::try_from((1.0, 5.0)).unwrap();
        assert_eq!(range.start(), 1.0);
        assert_eq!(range.end(), 5.0);
        // Degenerate single-point windows are allowed.
        assert!(CoordinateRange::try_from((3.0, 3.0)).is_ok());
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(CoordinateRange::try_from((5.0, 1.0)).is_err());
        assert!(CoordinateRange::try_from((f64::NAN, 1.0)).is_err());
        assert!(CoordinateRange::try_from((0.0, f64::INFINITY)).is_err());
    }

    #[test]
    fn test_inclusive_ends() {
        let range = CoordinateRange::try_from((2.0, 4.0)).unwrap();
        assert!(range.contains(2.0));
        assert!(range.contains(4.0));
        assert!(!range.contains(1.999));
        assert!(!range.contains(4.001));
    }
}
