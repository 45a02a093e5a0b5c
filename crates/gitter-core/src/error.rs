use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitterError {
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    #[error("no grating peak in order {order} search box (max {max:.4e}, mean {mean:.4e})")]
    NoGratingDetected { order: usize, max: f64, mean: f64 },

    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(&'static str),

    #[error("near-singular basis matrix (det = {det:.4e})")]
    SingularGeometry { det: f64 },

    #[error("frame stack too short: got {got}, need at least 2")]
    StackTooShort { got: usize },

    #[error("edge fit failed: {0}")]
    EdgeFitFailed(String),

    #[error("no overlap after vertical shift of {shift_v:.1} px (window {window} px)")]
    NoOverlap { shift_v: f64, window: usize },
}

pub type Result<T> = std::result::Result<T, GitterError>;
