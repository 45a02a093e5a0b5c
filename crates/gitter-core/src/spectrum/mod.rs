pub mod fft;
pub mod peaks;

pub use peaks::{extract, OrderPhases, PeakIndices};
