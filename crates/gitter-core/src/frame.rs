use ndarray::Array2;

use crate::error::{GitterError, Result};

/// A single grayscale image frame.
///
/// Pixel data is row-major, shape = (height, width). Color sources must be
/// pre-summed into one plane before they reach the analyzer.
#[derive(Clone, Debug)]
pub struct Frame {
    pub data: Array2<f32>,
}

impl Frame {
    pub fn new(data: Array2<f32>) -> Self {
        Self { data }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// Rotate the frame 90 degrees counter-clockwise.
    pub fn rot90_ccw(&self) -> Frame {
        let (h, w) = self.data.dim();
        let mut out = Array2::<f32>::zeros((w, h));
        for r in 0..h {
            for c in 0..w {
                out[[w - 1 - c, r]] = self.data[[r, c]];
            }
        }
        Frame::new(out)
    }

    /// Extract a `side` x `side` window centered on the frame, offset by
    /// `(shift_dy, shift_dx)` pixels (negative moves the window up/left).
    ///
    /// Fails with `InvalidFrame` when the frame cannot hold the window, the
    /// shifted window leaves the frame, or the window carries non-finite
    /// samples.
    pub fn centered_window(
        &self,
        side: usize,
        shift_dy: i64,
        shift_dx: i64,
    ) -> Result<Array2<f64>> {
        let (h, w) = self.data.dim();
        if h < side || w < side {
            return Err(GitterError::InvalidFrame(format!(
                "frame {h}x{w} smaller than {side}x{side} window"
            )));
        }

        let r0 = (h / 2 - side / 2) as i64 + shift_dy;
        let c0 = (w / 2 - side / 2) as i64 + shift_dx;
        if r0 < 0 || c0 < 0 || r0 + side as i64 > h as i64 || c0 + side as i64 > w as i64 {
            return Err(GitterError::InvalidFrame(format!(
                "shifted window ({shift_dy}, {shift_dx}) leaves the {h}x{w} frame"
            )));
        }
        let (r0, c0) = (r0 as usize, c0 as usize);

        let mut window = Array2::<f64>::zeros((side, side));
        for r in 0..side {
            for c in 0..side {
                let v = self.data[[r0 + r, c0 + c]];
                if !v.is_finite() {
                    return Err(GitterError::InvalidFrame(format!(
                        "non-finite sample at ({}, {})",
                        r0 + r,
                        c0 + c
                    )));
                }
                window[[r, c]] = v as f64;
            }
        }
        Ok(window)
    }
}
