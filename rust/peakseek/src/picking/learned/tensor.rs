use arrayvec::ArrayVec;
use chromtrace::{
    Array2D,
    TraceGroup,
};
use tracing::debug;

use crate::errors::{
    PeakPickingError,
    Result,
};
use crate::picking::learned::FragmentLibrary;

/// Fixed channel count of the learned-model input.
pub const TENSOR_CHANNELS: usize = 21;
/// The fragment-channel blocks are laid out for exactly this many
/// fragment traces.
pub const NUM_FRAGMENT_CHANNELS: usize = 6;
/// Window size used when the model reports a dynamic input axis.
pub const DEFAULT_WINDOW_SIZE: usize = 175;

/// How the input was reshaped to the model window, kept around so
/// predicted indices can be mapped back onto the original axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentInfo {
    pub original_len: usize,
    pub window: usize,
}

impl AlignmentInfo {
    /// Maps a tensor-space index back to the original coordinate axis.
    ///
    /// The shift is `window/2 - original_len/2`, the exact complement
    /// of the centered crop/pad convention. An index that would go
    /// negative after shifting is used unshifted; this asymmetric clamp
    /// keeps outputs reproducible against existing feature tables (see
    /// DESIGN.md). The result additionally clamps to the last valid
    /// axis index so out-of-axis predictions degrade to the trace edge.
    pub fn remap_index(&self, index: usize) -> usize {
        let shift = (self.window / 2) as isize - (self.original_len / 2) as isize;
        let shifted = index as isize - shift;
        let remapped = if shifted < 0 { index } else { shifted as usize };
        remapped.min(self.original_len.saturating_sub(1))
    }
}

/// Builds the `(TENSOR_CHANNELS, window)` input tensor for the scoring
/// model.
///
/// Channel layout (fixed):
/// - 0-5: the six fragment intensities, min-max scaled jointly;
/// - 6-11: the same six, min-max scaled independently per channel;
/// - 12: the precursor intensity, scaled independently;
/// - 13-18: per-fragment library intensities broadcast across the
///   window, scaled jointly across the six;
/// - 19: distance-from-window-center ramp (0 at the middle, +1 per
///   step outward), independent of the data;
/// - 20: the precursor charge, broadcast.
pub fn build_input_tensor(
    group: &TraceGroup,
    library: &impl FragmentLibrary,
    window: usize,
) -> Result<(Array2D<f32>, AlignmentInfo)> {
    if group.fragments.len() != NUM_FRAGMENT_CHANNELS {
        return Err(PeakPickingError::UnsupportedTraceCount {
            got: group.fragments.len(),
            expected: NUM_FRAGMENT_CHANNELS,
        });
    }
    if group.precursors.is_empty() {
        return Err(PeakPickingError::MissingGroupMetadata {
            field: "precursor trace",
        });
    }
    let sequence = group
        .sequence
        .as_deref()
        .ok_or(PeakPickingError::MissingGroupMetadata { field: "sequence" })?;
    let charge = group
        .precursor_charge
        .ok_or(PeakPickingError::MissingGroupMetadata {
            field: "precursor_charge",
        })?;

    let original_len = group.fragments[0].len();
    let aligned = group.align_length(window)?;
    debug!(
        "Built model window {} from a {}-point trace group",
        window, original_len
    );

    let mut tensor = Array2D::new_filled(TENSOR_CHANNELS, window, 0.0f32);

    // Channels 0-5 and 6-11: observed fragment intensities.
    for (k, fragment) in aligned.fragments.iter().enumerate() {
        let row: &mut [f32] = tensor.get_row_mut(k).expect("channel in layout");
        row.copy_from_slice(&fragment.intensity);
        let row: &mut [f32] = tensor
            .get_row_mut(NUM_FRAGMENT_CHANNELS + k)
            .expect("channel in layout");
        row.copy_from_slice(&fragment.intensity);
    }
    scale_rows_jointly(&mut tensor, 0..NUM_FRAGMENT_CHANNELS);
    for k in NUM_FRAGMENT_CHANNELS..2 * NUM_FRAGMENT_CHANNELS {
        scale_rows_jointly(&mut tensor, k..k + 1);
    }

    // Channel 12: precursor intensity, scaled on its own.
    tensor
        .get_row_mut(12)
        .expect("channel in layout")
        .copy_from_slice(&aligned.precursors[0].intensity);
    scale_rows_jointly(&mut tensor, 12..13);

    // Channels 13-18: static library intensities, broadcast then
    // jointly scaled. Missing library entries read as 0.0.
    let library_intensities: ArrayVec<f32, NUM_FRAGMENT_CHANNELS> = aligned
        .fragments
        .iter()
        .map(|fragment| {
            library
                .fragment_library_intensity(sequence, charge, &fragment.label)
                .unwrap_or(0.0)
        })
        .collect();
    for (k, &value) in library_intensities.iter().enumerate() {
        tensor.get_row_mut(13 + k).expect("channel in layout").fill(value);
    }
    scale_rows_jointly(&mut tensor, 13..13 + NUM_FRAGMENT_CHANNELS);

    // Channel 19: distance from the window center, data-independent.
    let mid = window / 2;
    for (i, v) in tensor
        .get_row_mut(19)
        .expect("channel in layout")
        .iter_mut()
        .enumerate()
    {
        *v = (i as isize - mid as isize).unsigned_abs() as f32;
    }

    // Channel 20: precursor charge, broadcast.
    tensor
        .get_row_mut(20)
        .expect("channel in layout")
        .fill(charge as f32);

    Ok((
        tensor,
        AlignmentInfo {
            original_len,
            window,
        },
    ))
}

/// Min-max scales the given row range in place with one shared
/// min/max: `(x - min) / (max - min)`. Any non-finite result of a
/// zero-range input becomes `0.0`.
fn scale_rows_jointly(tensor: &mut Array2D<f32>, rows: std::ops::Range<usize>) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for row_idx in rows.clone() {
        for &v in tensor.get_row(row_idx).expect("row in range") {
            min = min.min(v);
            max = max.max(v);
        }
    }
    for row_idx in rows {
        for v in tensor.get_row_mut(row_idx).expect("row in range") {
            let scaled = (*v - min) / (max - min);
            *v = if scaled.is_finite() { scaled } else { 0.0 };
        }
    }
}
