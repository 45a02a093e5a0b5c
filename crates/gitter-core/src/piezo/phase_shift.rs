//! Piezo displacement from first-order phase shifts across a frame stack.

use std::f64::consts::{PI, TAU};

use nalgebra::{Matrix2, Vector2};
use tracing::debug;

use crate::angle;
use crate::config::GratingConfig;
use crate::error::{GitterError, Result};
use crate::frame::Frame;
use crate::spectrum::{extract, PeakIndices};

use super::{PiezoReport, SecondarySolve, MRAD_PER_DEG};

/// Solve the piezo displacement vector and angle from the phase evolution
/// of the three grating orders across `stack`.
///
/// Frames are rotated 90 degrees counter-clockwise before analysis; the
/// stack must be ordered by strictly increasing piezo drive.
pub fn solve_fft(stack: &[Frame], config: &GratingConfig) -> Result<PiezoReport> {
    if stack.len() < 2 {
        return Err(GitterError::StackTooShort { got: stack.len() });
    }

    let mut series_1 = Vec::with_capacity(stack.len());
    let mut series_2 = Vec::with_capacity(stack.len());
    let mut series_3 = Vec::with_capacity(stack.len());
    let mut peaks = PeakIndices::default();
    for frame in stack {
        let rotated = frame.rot90_ccw();
        let (phases, frame_peaks) = extract(&rotated, config, 0, 0)?;
        series_1.push(phases.order_1);
        series_2.push(phases.order_2);
        series_3.push(phases.order_3);
        peaks = frame_peaks;
    }

    let report = angle::angles(&peaks, config)?;

    let s1 = total_travel_um(&unwrap_steps(&series_1), config.pitch_um);
    let s2 = total_travel_um(&unwrap_steps(&series_2), config.pitch_um);
    let s3 = total_travel_um(&unwrap_steps(&series_3), config.pitch_um);
    debug!(s1, s2, s3, "order travel accumulated");

    let w1 = report.winkel_1.to_radians();
    let w2 = report.winkel_2.to_radians();
    let w3 = report.winkel_3.to_radians();
    let v1 = Vector2::new(w1.cos(), -w1.sin());
    let v2 = Vector2::new(-w2.sin(), w2.cos());
    let v3 = Vector2::new(-w3.sin(), w3.cos());

    let x = solve_basis(v1, v3, Vector2::new(-s1, s3), config.singular_eps)?;
    if x[1] == 0.0 {
        return Err(GitterError::DegenerateGeometry(
            "piezo displacement has no y component",
        ));
    }
    let piezo_angle_deg = (x[0] / x[1]).atan().to_degrees();
    let verr_deg = -(report.err_to_nominal - piezo_angle_deg);

    // Cross-check on the v2/v3 basis; a singular or degenerate secondary
    // solve does not fail the canonical one.
    let secondary = solve_basis(v2, v3, Vector2::new(-s2, s3), config.singular_eps)
        .ok()
        .filter(|x2| x2[1] != 0.0)
        .map(|x2| SecondarySolve {
            piezo_angle_deg: (x2[0] / x2[1]).atan().to_degrees(),
            displacement_um: [x2[0], x2[1]],
        });

    debug!(
        dx = x[0],
        dy = x[1],
        angle = piezo_angle_deg,
        "piezo displacement solved"
    );

    Ok(PiezoReport {
        piezo_angle_deg,
        grating: report,
        grating_error_mrad: verr_deg * MRAD_PER_DEG,
        displacement_um: Some([x[0], x[1]]),
        secondary,
        edge_shift_px: None,
    })
}

/// Forward differences of a phase series, with steps larger than pi folded
/// back into (-pi, pi].
///
/// A folded step is `p[i] - p[i+1] - signum(p[i] - p[i+1]) * 2pi`: the fold
/// acts on the reversed difference, so a wrapped step carries the opposite
/// sign of its conventionally unwrapped value. Downstream only step
/// magnitudes are consumed.
pub(crate) fn unwrap_steps(series: &[f64]) -> Vec<f64> {
    series
        .windows(2)
        .map(|w| {
            let d = w[1] - w[0];
            if d.abs() > PI {
                let r = w[0] - w[1];
                r - r.signum() * TAU
            } else {
                d
            }
        })
        .collect()
}

/// Sum of per-step travel in micrometres: each phase step of 2pi is one
/// grating period.
fn total_travel_um(steps: &[f64], pitch_um: f64) -> f64 {
    steps.iter().map(|d| d.abs() * pitch_um / TAU).sum()
}

fn solve_basis(
    row_a: Vector2<f64>,
    row_b: Vector2<f64>,
    rhs: Vector2<f64>,
    eps: f64,
) -> Result<Vector2<f64>> {
    let a = Matrix2::new(row_a[0], row_a[1], row_b[0], row_b[1]);
    let det = a.determinant();
    if det.abs() < eps {
        return Err(GitterError::SingularGeometry { det });
    }
    let inv = a
        .try_inverse()
        .ok_or(GitterError::SingularGeometry { det })?;
    Ok(inv * rhs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn small_steps_pass_through_unchanged() {
        let series = [0.1, 0.4, -0.2, 0.9];
        let steps = unwrap_steps(&series);
        let expected: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();
        for (got, want) in steps.iter().zip(expected.iter()) {
            assert_relative_eq!(*got, *want, epsilon = 1e-12);
        }
    }

    #[test]
    fn wrapped_step_folds_with_reversed_sign() {
        // 3.0 -> -3.0 jumps by -6.0; the fold yields 6.0 - 2pi, not
        // -6.0 + 2pi.
        let steps = unwrap_steps(&[3.0, -3.0]);
        assert_relative_eq!(steps[0], 6.0 - TAU, epsilon = 1e-12);

        let steps = unwrap_steps(&[-3.0, 3.0]);
        assert_relative_eq!(steps[0], -6.0 + TAU, epsilon = 1e-12);
    }

    #[test]
    fn step_magnitudes_are_preserved_by_the_fold() {
        let steps = unwrap_steps(&[3.0, -3.0]);
        assert!(steps[0].abs() < PI);
        assert_relative_eq!(steps[0].abs(), TAU - 6.0, epsilon = 1e-12);
    }

    #[test]
    fn travel_converts_full_turns_to_pitch() {
        let steps = [TAU / 2.0, -TAU / 4.0];
        assert_relative_eq!(
            total_travel_um(&steps, 33.0),
            33.0 / 2.0 + 33.0 / 4.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn singular_basis_is_rejected() {
        let v = Vector2::new(1.0, 0.0);
        let result = solve_basis(v, v, Vector2::new(1.0, 2.0), 1e-9);
        assert!(matches!(
            result,
            Err(GitterError::SingularGeometry { .. })
        ));
    }
}
