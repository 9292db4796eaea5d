use serde::{
    Deserialize,
    Serialize,
};
use tracing::warn;

/// Smoothing applied to a trace before boundary detection.
///
/// A closed enum per axis instead of the usual string dispatch: an
/// unsupported smoother is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Smoother {
    /// No smoothing, the raw intensities are used as-is.
    Identity,
    /// Savitzky-Golay least-squares smoothing over `frame_length`
    /// samples with a polynomial of `polynomial_order`.
    SavitzkyGolay {
        frame_length: usize,
        polynomial_order: usize,
    },
    /// Gaussian kernel smoothing, `sigma` in samples, truncated at 3σ.
    Gaussian { sigma: f64 },
}

impl Default for Smoother {
    fn default() -> Self {
        Smoother::SavitzkyGolay {
            frame_length: 11,
            polynomial_order: 3,
        }
    }
}

impl Smoother {
    /// Returns a smoothed copy of `values`. Edges are handled by
    /// clamping (the first/last sample is replicated outward), so the
    /// output always has the input length.
    pub fn smooth(&self, values: &[f32]) -> Vec<f32> {
        match self {
            Smoother::Identity => values.to_vec(),
            Smoother::SavitzkyGolay {
                frame_length,
                polynomial_order,
            } => {
                let kernel = savitzky_golay_kernel(*frame_length, *polynomial_order);
                convolve_clamped(values, &kernel)
            }
            Smoother::Gaussian { sigma } => {
                let kernel = gaussian_kernel(*sigma);
                convolve_clamped(values, &kernel)
            }
        }
    }
}

/// Convolve with an odd-length kernel, clamping indices at the edges.
fn convolve_clamped(values: &[f32], kernel: &[f64]) -> Vec<f32> {
    if values.is_empty() || kernel.len() <= 1 {
        return values.to_vec();
    }
    let half = (kernel.len() / 2) as isize;
    let len = values.len() as isize;
    (0..len)
        .map(|i| {
            let mut acc = 0.0f64;
            for (k, &w) in kernel.iter().enumerate() {
                let idx = (i + k as isize - half).clamp(0, len - 1) as usize;
                acc += w * values[idx] as f64;
            }
            acc as f32
        })
        .collect()
}

/// Normalized Gaussian kernel with the given stddev in samples,
/// truncated at 3σ.
fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    if sigma <= 0.0 {
        warn!("Non-positive gaussian sigma {}, smoothing disabled", sigma);
        return vec![1.0];
    }
    let half = (3.0 * sigma).ceil() as isize;
    let mut kernel: Vec<f64> = (-half..=half)
        .map(|x| (-(x as f64).powi(2) / (2.0 * sigma * sigma)).exp())
        .collect();
    let total: f64 = kernel.iter().sum();
    for w in kernel.iter_mut() {
        *w /= total;
    }
    kernel
}

/// Savitzky-Golay smoothing weights from the least-squares normal
/// equations: the fitted value at the window center is
/// `sum_j w_j * y_j` with `w_j = sum_k c_k * j^k`, where `c` solves
/// `G c = e_0` and `G_{k,l} = sum_j j^(k+l)` over the window offsets.
fn savitzky_golay_kernel(frame_length: usize, polynomial_order: usize) -> Vec<f64> {
    let mut frame = frame_length.max(3);
    if frame % 2 == 0 {
        warn!(
            "Savitzky-Golay frame length {} is even, using {}",
            frame,
            frame + 1
        );
        frame += 1;
    }
    let mut order = polynomial_order;
    if order >= frame {
        warn!(
            "Savitzky-Golay order {} >= frame length {}, clamping",
            order, frame
        );
        order = frame - 1;
    }

    let m = (frame / 2) as i64;
    let terms = order + 1;

    // Normal matrix G_{k,l} = sum_j j^(k+l), j in -m..=m.
    let mut power_sums = vec![0.0f64; 2 * terms - 1];
    for j in -m..=m {
        let mut p = 1.0f64;
        for s in power_sums.iter_mut() {
            *s += p;
            p *= j as f64;
        }
    }
    let mut g = vec![vec![0.0f64; terms]; terms];
    for k in 0..terms {
        for l in 0..terms {
            g[k][l] = power_sums[k + l];
        }
    }

    // Solve G c = e_0 by Gaussian elimination with partial pivoting.
    let mut rhs = vec![0.0f64; terms];
    rhs[0] = 1.0;
    for col in 0..terms {
        let pivot = (col..terms)
            .max_by(|&a, &b| g[a][col].abs().total_cmp(&g[b][col].abs()))
            .unwrap_or(col);
        g.swap(col, pivot);
        rhs.swap(col, pivot);
        let diag = g[col][col];
        for row in (col + 1)..terms {
            let factor = g[row][col] / diag;
            for c in col..terms {
                g[row][c] -= factor * g[col][c];
            }
            rhs[row] -= factor * rhs[col];
        }
    }
    let mut coeffs = vec![0.0f64; terms];
    for row in (0..terms).rev() {
        let mut acc = rhs[row];
        for c in (row + 1)..terms {
            acc -= g[row][c] * coeffs[c];
        }
        coeffs[row] = acc / g[row][row];
    }

    // w_j = sum_k c_k * j^k
    (-m..=m)
        .map(|j| {
            let mut p = 1.0f64;
            let mut w = 0.0f64;
            for &c in coeffs.iter() {
                w += c * p;
                p *= j as f64;
            }
            w
        })
        .collect()
}
