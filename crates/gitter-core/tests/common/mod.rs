use ndarray::Array2;
use statrs::function::erf::erf;
use std::f64::consts::TAU;

use gitter_core::frame::Frame;

/// Frame of a three-beam grating: DC offset plus one cosine per first
/// order.
///
/// `theta_deg` is the order-1 direction (rows grow downward, clockwise
/// positive); the other two lobes sit 60 and 120 degrees away. `pitch_px`
/// is the period on the camera, `phases` the per-order phase offsets.
pub fn grating_frame(
    size: (usize, usize),
    pitch_px: f64,
    theta_deg: f64,
    phases: [f64; 3],
) -> Frame {
    let (h, w) = size;
    let dirs = [theta_deg, theta_deg - 60.0, theta_deg - 120.0].map(f64::to_radians);
    let mut data = Array2::<f32>::zeros((h, w));
    for r in 0..h {
        for c in 0..w {
            let mut v = 3.0f64;
            for (dir, phase) in dirs.iter().zip(phases.iter()) {
                let arg =
                    TAU * (c as f64 * dir.cos() + r as f64 * dir.sin()) / pitch_px + phase;
                v += arg.cos();
            }
            data[[r, c]] = v as f32;
        }
    }
    Frame::new(data)
}

/// Frame holding only the order-1 cosine.
pub fn single_order_frame(size: (usize, usize), pitch_px: f64, theta_deg: f64, phase: f64) -> Frame {
    let (h, w) = size;
    let dir = theta_deg.to_radians();
    let mut data = Array2::<f32>::zeros((h, w));
    for r in 0..h {
        for c in 0..w {
            let arg = TAU * (c as f64 * dir.cos() + r as f64 * dir.sin()) / pitch_px + phase;
            data[[r, c]] = (1.0 + arg.cos()) as f32;
        }
    }
    Frame::new(data)
}

/// Three-beam grating dimmed by a smooth separable mask: dark above
/// `edge_row` and right of `edge_col` (absolute frame coordinates), with
/// erf transitions of the given `slope`.
pub fn masked_grating_frame(
    size: (usize, usize),
    pitch_px: f64,
    theta_deg: f64,
    phases: [f64; 3],
    edge_row: f64,
    edge_col: f64,
    slope: f64,
) -> Frame {
    let grating = grating_frame(size, pitch_px, theta_deg, phases);
    let (h, w) = size;
    let mut data = Array2::<f32>::zeros((h, w));
    for r in 0..h {
        let mask_v = 0.5 * (1.0 + erf(slope * (r as f64 - edge_row)));
        for c in 0..w {
            let mask_h = 0.5 * (1.0 + erf(slope * (edge_col - c as f64)));
            data[[r, c]] = grating.data[[r, c]] * (mask_v * mask_h) as f32;
        }
    }
    Frame::new(data)
}

/// Rotate 90 degrees clockwise: the inverse of the solvers' pre-rotation,
/// so a pattern built in solver coordinates becomes a valid input frame.
pub fn rot90_cw(frame: &Frame) -> Frame {
    let (h, w) = frame.data.dim();
    let mut out = Array2::<f32>::zeros((w, h));
    for r in 0..h {
        for c in 0..w {
            out[[c, h - 1 - r]] = frame.data[[r, c]];
        }
    }
    Frame::new(out)
}

/// Place `content` at the exact center of a zero frame of shape `(h, w)`.
pub fn embed_centered(content: &Frame, h: usize, w: usize) -> Frame {
    let (ch, cw) = content.data.dim();
    assert!(h >= ch && w >= cw);
    let (r0, c0) = (h / 2 - ch / 2, w / 2 - cw / 2);
    let mut data = Array2::<f32>::zeros((h, w));
    for r in 0..ch {
        for c in 0..cw {
            data[[r0 + r, c0 + c]] = content.data[[r, c]];
        }
    }
    Frame::new(data)
}
