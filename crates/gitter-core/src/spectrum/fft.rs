//! Centered, zero-padded 2-D DFT of a frame window.
//!
//! The crop window is placed at the exact center of a `pad` x `pad` canvas,
//! which is transformed with the ordering ifftshift -> fft2 -> fftshift so
//! that DC sits at (pad/2, pad/2). Zero-padding buys sub-pixel frequency
//! resolution for the peak search.

use ndarray::Array2;
use num_complex::Complex;
use rayon::prelude::*;
use rustfft::FftPlanner;

use crate::config::GratingConfig;
use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::{GitterError, Result};
use crate::frame::Frame;

/// Compute the centered magnitude/phase spectrum of the crop window of
/// `frame`, optionally offset by `(shift_dy, shift_dx)`.
pub fn padded_spectrum(
    frame: &Frame,
    config: &GratingConfig,
    shift_dy: i64,
    shift_dx: i64,
) -> Result<Array2<Complex<f64>>> {
    if config.pad < config.crop {
        return Err(GitterError::InvalidFrame(format!(
            "canvas {} smaller than crop {}",
            config.pad, config.crop
        )));
    }

    let window = frame.centered_window(config.crop, shift_dy, shift_dx)?;

    // The window lands on the canvas already ifftshifted (everything else
    // is zero), saving one full-canvas pass at this size.
    let pad = config.pad;
    let off = pad / 2 - config.crop / 2;
    let shift = pad - pad / 2;
    let mut work = Array2::<Complex<f64>>::zeros((pad, pad));
    for r in 0..config.crop {
        for c in 0..config.crop {
            let rr = (off + r + shift) % pad;
            let cc = (off + c + shift) % pad;
            work[[rr, cc]] = Complex::new(window[[r, c]], 0.0);
        }
    }

    fft2d_in_place(&mut work);
    Ok(fftshift(&work))
}

/// Circularly shift so that index 0 moves to the array center.
pub fn fftshift(data: &Array2<Complex<f64>>) -> Array2<Complex<f64>> {
    let (h, w) = data.dim();
    roll(data, h / 2, w / 2)
}

/// Inverse of [`fftshift`]; identical to it for even sizes.
pub fn ifftshift(data: &Array2<Complex<f64>>) -> Array2<Complex<f64>> {
    let (h, w) = data.dim();
    roll(data, h - h / 2, w - w / 2)
}

fn roll(data: &Array2<Complex<f64>>, dr: usize, dc: usize) -> Array2<Complex<f64>> {
    let (h, w) = data.dim();
    let mut out = Array2::<Complex<f64>>::zeros((h, w));
    for r in 0..h {
        let rr = (r + dr) % h;
        for c in 0..w {
            out[[rr, (c + dc) % w]] = data[[r, c]];
        }
    }
    out
}

/// In-place forward 2-D FFT: row-wise pass, then column-wise pass.
fn fft2d_in_place(work: &mut Array2<Complex<f64>>) {
    let (h, w) = work.dim();
    let mut planner = FftPlanner::new();
    let fft_row = planner.plan_fft_forward(w);
    let fft_col = planner.plan_fft_forward(h);

    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        fft2d_parallel(work, &fft_row, &fft_col, h, w);
    } else {
        fft2d_sequential(work, &fft_row, &fft_col, h, w);
    }
}

fn fft2d_parallel(
    work: &mut Array2<Complex<f64>>,
    fft_row: &std::sync::Arc<dyn rustfft::Fft<f64>>,
    fft_col: &std::sync::Arc<dyn rustfft::Fft<f64>>,
    h: usize,
    w: usize,
) {
    let processed_rows: Vec<Vec<Complex<f64>>> = (0..h)
        .into_par_iter()
        .map(|row| {
            let mut row_data: Vec<Complex<f64>> = (0..w).map(|c| work[[row, c]]).collect();
            fft_row.process(&mut row_data);
            row_data
        })
        .collect();
    for (row, row_data) in processed_rows.into_iter().enumerate() {
        for (col, val) in row_data.into_iter().enumerate() {
            work[[row, col]] = val;
        }
    }

    let processed_cols: Vec<Vec<Complex<f64>>> = (0..w)
        .into_par_iter()
        .map(|col| {
            let mut col_data: Vec<Complex<f64>> = (0..h).map(|r| work[[r, col]]).collect();
            fft_col.process(&mut col_data);
            col_data
        })
        .collect();
    for (col, col_data) in processed_cols.into_iter().enumerate() {
        for (row, val) in col_data.into_iter().enumerate() {
            work[[row, col]] = val;
        }
    }
}

fn fft2d_sequential(
    work: &mut Array2<Complex<f64>>,
    fft_row: &std::sync::Arc<dyn rustfft::Fft<f64>>,
    fft_col: &std::sync::Arc<dyn rustfft::Fft<f64>>,
    h: usize,
    w: usize,
) {
    for row in 0..h {
        let mut row_data: Vec<Complex<f64>> = (0..w).map(|c| work[[row, c]]).collect();
        fft_row.process(&mut row_data);
        for col in 0..w {
            work[[row, col]] = row_data[col];
        }
    }
    for col in 0..w {
        let mut col_data: Vec<Complex<f64>> = (0..h).map(|r| work[[r, col]]).collect();
        fft_col.process(&mut col_data);
        for row in 0..h {
            work[[row, col]] = col_data[row];
        }
    }
}
