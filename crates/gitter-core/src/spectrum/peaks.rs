use ndarray::Array2;
use num_complex::Complex;
use tracing::debug;

use crate::config::{GratingConfig, Roi};
use crate::error::{GitterError, Result};
use crate::frame::Frame;

use super::fft::padded_spectrum;

/// ROI-local argmax offsets of the three first-order peaks.
///
/// `(i, k)` belongs to the order-1 box, `(l, m)` to the order-3 box and
/// `(n, o)` to the order-2 box; the first of each pair is the row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PeakIndices {
    pub i: usize,
    pub k: usize,
    pub l: usize,
    pub m: usize,
    pub n: usize,
    pub o: usize,
}

/// Spectrum phase at each located first-order peak, in (-pi, pi].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrderPhases {
    pub order_1: f64,
    pub order_2: f64,
    pub order_3: f64,
}

/// Locate the three first-order grating peaks of one frame and return their
/// phases and ROI-local indices.
pub fn extract(
    frame: &Frame,
    config: &GratingConfig,
    shift_dy: i64,
    shift_dx: i64,
) -> Result<(OrderPhases, PeakIndices)> {
    let spectrum = padded_spectrum(frame, config, shift_dy, shift_dx)?;

    let (phase_1, i, k) = roi_peak(&spectrum, &config.roi_1, 1)?;
    let (phase_3, l, m) = roi_peak(&spectrum, &config.roi_3, 3)?;
    let (phase_2, n, o) = roi_peak(&spectrum, &config.roi_2, 2)?;

    debug!(i, k, l, m, n, o, "grating peaks located");

    Ok((
        OrderPhases {
            order_1: phase_1,
            order_2: phase_2,
            order_3: phase_3,
        },
        PeakIndices { i, k, l, m, n, o },
    ))
}

/// Argmax of the magnitude spectrum inside `roi`, row-major with first-wins
/// ties, plus the complex phase at the winning bin.
fn roi_peak(
    spectrum: &Array2<Complex<f64>>,
    roi: &Roi,
    order: usize,
) -> Result<(f64, usize, usize)> {
    let (h, w) = spectrum.dim();
    if roi.row_end > h || roi.col_end > w || roi.row_start >= roi.row_end || roi.col_start >= roi.col_end
    {
        return Err(GitterError::InvalidFrame(format!(
            "order {order} search box outside the {h}x{w} spectrum"
        )));
    }

    let mut best = f64::NEG_INFINITY;
    let mut best_row = 0;
    let mut best_col = 0;
    let mut sum = 0.0;

    for r in roi.row_start..roi.row_end {
        for c in roi.col_start..roi.col_end {
            let mag = spectrum[[r, c]].norm();
            sum += mag;
            if mag > best {
                best = mag;
                best_row = r;
                best_col = c;
            }
        }
    }

    let count = (roi.row_end - roi.row_start) * (roi.col_end - roi.col_start);
    let mean = sum / count as f64;
    if !(best > mean) {
        return Err(GitterError::NoGratingDetected {
            order,
            max: best,
            mean,
        });
    }

    let phase = spectrum[[best_row, best_col]].arg();
    Ok((phase, best_row - roi.row_start, best_col - roi.col_start))
}
