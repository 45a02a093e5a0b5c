use serde::{Deserialize, Serialize};

use crate::consts::{
    CROP, EDGE_CROP, GRATING_ERROR_TOLERANCE_MRAD, NOMINAL_GRATING_ANGLE_DEG, PAD, PITCH_UM,
    PIXEL_SIZE_UM, SINGULAR_DET_EPS,
};

/// Half-open search box in the padded magnitude spectrum, row-major.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roi {
    pub row_start: usize,
    pub row_end: usize,
    pub col_start: usize,
    pub col_end: usize,
}

impl Roi {
    pub const fn new(row_start: usize, row_end: usize, col_start: usize, col_end: usize) -> Self {
        Self {
            row_start,
            row_end,
            col_start,
            col_end,
        }
    }
}

/// Immutable description of one grating/camera combination.
///
/// Every entry point takes a reference to this record, so analyzers for
/// different gratings or cameras can run side by side.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GratingConfig {
    /// Grating period in the object plane, micrometres.
    pub pitch_um: f64,
    /// Camera pixel pitch in the object plane, micrometres.
    pub pixel_size_um: f64,
    /// Expected angle of first order #1 to the camera x-axis, degrees.
    pub nominal_angle_deg: f64,
    /// Side of the centered window taken from each frame.
    pub crop: usize,
    /// Side of the zero-padded FFT canvas.
    pub pad: usize,
    /// Search box for first order #1.
    pub roi_1: Roi,
    /// Search box for first order #2.
    pub roi_2: Roi,
    /// Search box for first order #3.
    pub roi_3: Roi,
    /// Side of the central window used by the edge-fit solver.
    pub edge_crop: usize,
    /// Tolerance band for the grating-to-piezo angle error, milliradians.
    pub tolerance_mrad: f64,
    /// |det| below which the basis solve is rejected as singular.
    pub singular_eps: f64,
}

impl Default for GratingConfig {
    fn default() -> Self {
        Self {
            pitch_um: PITCH_UM,
            pixel_size_um: PIXEL_SIZE_UM,
            nominal_angle_deg: NOMINAL_GRATING_ANGLE_DEG,
            crop: CROP,
            pad: PAD,
            roi_1: Roi::new(3000, 6000, 3500, 6000),
            roi_2: Roi::new(0, 2700, 3000, 6000),
            roi_3: Roi::new(0, 2500, 0, 3000),
            edge_crop: EDGE_CROP,
            tolerance_mrad: GRATING_ERROR_TOLERANCE_MRAD,
            singular_eps: SINGULAR_DET_EPS,
        }
    }
}
