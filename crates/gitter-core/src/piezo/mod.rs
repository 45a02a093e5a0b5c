pub mod edge_fit;
pub mod phase_shift;

pub use edge_fit::solve_edges;
pub use phase_shift::solve_fft;

use crate::angle::GratingReport;

/// Outcome of a piezo-shift solve.
#[derive(Clone, Copy, Debug)]
pub struct PiezoReport {
    /// In-plane angle of the piezo drive, degrees, clockwise positive.
    pub piezo_angle_deg: f64,
    /// Grating angles measured on the rotated stack.
    pub grating: GratingReport,
    /// Grating-to-piezo angle error, milliradians.
    pub grating_error_mrad: f64,
    /// Piezo displacement over the stack from the v1/v3 solve, micrometres.
    /// Absent on the edge-fit path.
    pub displacement_um: Option<[f64; 2]>,
    /// v2/v3 cross-check solve. Reported for comparison, never used for
    /// the acceptance decision.
    pub secondary: Option<SecondarySolve>,
    /// Fitted (vertical, horizontal) edge shifts in pixels. Edge-fit path
    /// only.
    pub edge_shift_px: Option<[f64; 2]>,
}

/// Result of the v2/v3 basis solve.
#[derive(Clone, Copy, Debug)]
pub struct SecondarySolve {
    pub piezo_angle_deg: f64,
    pub displacement_um: [f64; 2],
}

/// Milliradians per degree as used in all tolerance reports.
///
/// Kept as pi/0.18 rather than 1000*pi/180 so reported values stay
/// bit-identical with the existing bench records.
pub(crate) const MRAD_PER_DEG: f64 = std::f64::consts::PI / 0.18;
