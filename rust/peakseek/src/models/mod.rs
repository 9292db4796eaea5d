use serde::Serialize;

/// One peak boundary found on a single trace. Transient: these only
/// exist between the per-trace finder and the cross-trace merge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryCandidate {
    pub left_boundary: f64,
    pub right_boundary: f64,
    pub apex_coordinate: f64,
    pub apex_intensity: f32,
    pub area_intensity: f32,
}

/// A merged, cross-trace peak boundary with aggregated intensity and
/// apex: the engine's best single estimate of where (and how strong) an
/// elution event is.
///
/// Produced only by a detector, never mutated afterwards.
/// `left_boundary <= right_boundary` always holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsensusFeature {
    pub left_boundary: f64,
    pub right_boundary: f64,
    pub area_intensity: Option<f32>,
    pub apex_coordinate: Option<f64>,
    pub apex_intensity: Option<f32>,
    /// Statistical score or q-value when the producing detector has one.
    /// `f32::INFINITY` is the hard-boundary sentinel of the binarized
    /// decode path.
    pub confidence: Option<f32>,
    pub software: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consensus_feature_serializes() {
        let feature = ConsensusFeature {
            left_boundary: 12.5,
            right_boundary: 18.0,
            area_intensity: Some(120.0),
            apex_coordinate: Some(14.0),
            apex_intensity: Some(40.0),
            confidence: None,
            software: Some("peakseek-classical".to_string()),
        };
        let json = serde_json::to_value(&feature).unwrap();
        assert_eq!(json["left_boundary"], 12.5);
        assert_eq!(json["right_boundary"], 18.0);
        assert_eq!(json["apex_coordinate"], 14.0);
        assert!(json["confidence"].is_null());
    }
}
