use chromtrace::Array2D;
use serde::{
    Deserialize,
    Serialize,
};
use tracing::warn;

/// How the scoring-model output rows are to be read.
///
/// Closed enum per axis: an unsupported prediction type is
/// unrepresentable rather than a runtime fallthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictionMode {
    /// Raw scores; a logistic sigmoid is applied first, then the
    /// `Sigmoided` path runs.
    Logits,
    /// Per-position probabilities in `[0, 1]`.
    Sigmoided,
    /// A 0/1 mask per position.
    Binarized,
}

/// One decoded index window in tensor space, before remapping back to
/// the original axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakPrediction {
    pub left_index: usize,
    pub right_index: usize,
    pub apex_index: usize,
    /// The row maximum for probability rows; `f32::INFINITY` for
    /// binarized rows (hard boundary, no probabilistic score).
    pub confidence: f32,
}

/// Decodes every class row of a `(classes, window)` score array into at
/// most one prediction per row.
///
/// Probability rows below `threshold` (strictly below; exactly-equal is
/// accepted) yield nothing. Malformed binarized rows are skipped at the
/// row level, never propagated as errors.
pub fn find_top_peaks(
    scores: &Array2D<f32>,
    mode: PredictionMode,
    threshold: f32,
) -> Vec<PeakPrediction> {
    scores
        .iter_rows()
        .enumerate()
        .filter_map(|(row_idx, row)| match mode {
            PredictionMode::Logits => {
                let sigmoided: Vec<f32> = row.iter().map(|&x| sigmoid(x)).collect();
                decode_probability_row(&sigmoided, threshold)
            }
            PredictionMode::Sigmoided => decode_probability_row(row, threshold),
            PredictionMode::Binarized => {
                let decoded = decode_binarized_row(row);
                if decoded.is_none() {
                    warn!("Binarized row {} has no clean edge pair, skipping", row_idx);
                }
                decoded
            }
        })
        .collect()
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Argmax + half-maximum boundary expansion: grow outward from the
/// argmax while the score stays at or above half the maximum, stopping
/// at the first position that drops below.
fn decode_probability_row(row: &[f32], threshold: f32) -> Option<PeakPrediction> {
    let mut apex = 0;
    let mut max = *row.first()?;
    for (i, &v) in row.iter().enumerate().skip(1) {
        // First occurrence wins on ties.
        if v > max {
            apex = i;
            max = v;
        }
    }
    if max < threshold {
        return None;
    }

    let half = max * 0.5;
    let mut left = apex;
    while left > 0 && row[left - 1] >= half {
        left -= 1;
    }
    let mut right = apex;
    while right + 1 < row.len() && row[right + 1] >= half {
        right += 1;
    }

    Some(PeakPrediction {
        left_index: left,
        right_index: right,
        apex_index: apex,
        confidence: max,
    })
}

/// First rising edge and first falling edge of a 0/1 mask (via first
/// difference), midpoint apex. Rows without a clean edge pair yield
/// nothing.
fn decode_binarized_row(row: &[f32]) -> Option<PeakPrediction> {
    let mut rising = None;
    for i in 0..row.len().saturating_sub(1) {
        if row[i + 1] > row[i] {
            rising = Some(i + 1);
            break;
        }
    }
    let left = rising?;

    let mut falling = None;
    for i in left..row.len().saturating_sub(1) {
        if row[i + 1] < row[i] {
            falling = Some(i);
            break;
        }
    }
    let right = falling?;

    Some(PeakPrediction {
        left_index: left,
        right_index: right,
        apex_index: (left + right) / 2,
        confidence: f32::INFINITY,
    })
}
