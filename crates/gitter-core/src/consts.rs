/// Grating period in the object plane, micrometres.
pub const PITCH_UM: f64 = 33.0;

/// Camera pixel pitch in the object plane, micrometres.
pub const PIXEL_SIZE_UM: f64 = 3.33;

/// Expected angle of first order #1 to the camera x-axis, degrees.
pub const NOMINAL_GRATING_ANGLE_DEG: f64 = 8.95;

/// Side of the centered square window taken from each frame.
pub const CROP: usize = 1000;

/// Side of the zero-padded FFT canvas. DC ends up at (PAD/2, PAD/2).
pub const PAD: usize = 6000;

/// Side of the central window used by the edge-fit solver.
pub const EDGE_CROP: usize = 400;

/// Tolerance band for the grating-to-piezo angle error, milliradians.
pub const GRATING_ERROR_TOLERANCE_MRAD: f64 = 2.0;

/// Minimum pixel count (h*w) to use row-level Rayon parallelism in the FFT passes.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// |det| below which the 2x2 basis solve is rejected as singular.
pub const SINGULAR_DET_EPS: f64 = 1e-9;

/// |b| below which a fitted ERF step is considered degenerate.
pub const ERF_FIT_B_EPS: f64 = 1e-6;
