//! Grating rotation from the located first-order peaks.
//!
//! All angles are degrees, clockwise positive around the image-plane z-axis.
//! The formulas use single-argument `atan` on index ratios; the additive
//! constants (120, 60, -90) place each branch result relative to the
//! 120-degree lobe geometry of the three-beam grating and only hold for the
//! (-90, 90) range of `atan`. They must not be rewritten with `atan2`.

use crate::config::GratingConfig;
use crate::error::{GitterError, Result};
use crate::spectrum::PeakIndices;

/// Camera-referenced grating angles derived from one frame, degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GratingReport {
    /// Order #1 angle inferred from the order-3 lobe.
    pub winkel_1: f64,
    /// Order #1 angle measured directly in its own search box.
    pub winkel_1_mess: f64,
    /// Order #1 angle inferred from the order-2 lobe.
    pub winkel_1_nr2: f64,
    /// Order #2 lobe angle to the vertical.
    pub winkel_2: f64,
    /// Order #3 lobe angle to the vertical.
    pub winkel_3: f64,
    /// Mean of the three order-1 estimates.
    pub avg: f64,
    /// Deviation of the mean from the nominal grating angle.
    pub err_to_nominal: f64,
}

/// Convert ROI-local peak indices into the grating angle report.
pub fn angles(peaks: &PeakIndices, config: &GratingConfig) -> Result<GratingReport> {
    let half = (config.pad / 2) as f64;
    let (i, k) = (peaks.i as f64, peaks.k as f64);
    let (l, m) = (peaks.l as f64, peaks.m as f64);
    let (n, o) = (peaks.n as f64, peaks.o as f64);

    if half - l == 0.0 {
        return Err(GitterError::DegenerateGeometry(
            "order 3 peak sits on the spectrum center row",
        ));
    }
    if half - n == 0.0 {
        return Err(GitterError::DegenerateGeometry(
            "order 2 peak sits on the spectrum center row",
        ));
    }

    let winkel_3 = ((half - m) / (half - l)).atan().to_degrees();
    let winkel_1 = 120.0 - winkel_3 - 90.0;
    // 500 is the column gap between the order-1 search box and the spectrum
    // center; the row needs no such term because the box starts on the
    // center row.
    let winkel_1_mess = (i / (k + 500.0)).atan().to_degrees();
    let winkel_2 = (o / (half - n)).atan().to_degrees();
    let winkel_1_nr2 = 60.0 + winkel_2 - 90.0;

    let avg = (winkel_1 + winkel_1_mess + winkel_1_nr2) / 3.0;

    Ok(GratingReport {
        winkel_1,
        winkel_1_mess,
        winkel_1_nr2,
        winkel_2,
        winkel_3,
        avg,
        err_to_nominal: avg - config.nominal_angle_deg,
    })
}
