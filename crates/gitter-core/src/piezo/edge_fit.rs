//! Piezo angle from an error-function fit to the grating edge.
//!
//! Instead of tracking spectral phases, this path follows the smooth
//! intensity step at the grating edge: the first and last frames of the
//! stack are collapsed to row and column mean profiles and the step model
//! `a * erf(b*x + c) + d` is fitted to each, with the edge position defined
//! as `c / b`. The vertical and horizontal position differences give the
//! drive direction.

use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt};
use nalgebra::{storage::Owned, DVector, Dyn, Matrix, Vector4, U4};
use ndarray::{s, Array2};
use statrs::function::erf::erf;
use tracing::debug;

use crate::angle;
use crate::config::GratingConfig;
use crate::consts::ERF_FIT_B_EPS;
use crate::error::{GitterError, Result};
use crate::frame::Frame;
use crate::spectrum::extract;

use super::{PiezoReport, MRAD_PER_DEG};

/// Solve the piezo drive angle from the edge motion between the first and
/// last frames of `stack`.
///
/// Frames are rotated 90 degrees counter-clockwise before analysis. The
/// optional `(shift_dy, shift_dx)` moves the edge window off the frame
/// center.
pub fn solve_edges(
    stack: &[Frame],
    config: &GratingConfig,
    shift_dy: i64,
    shift_dx: i64,
) -> Result<PiezoReport> {
    if stack.len() < 2 {
        return Err(GitterError::StackTooShort { got: stack.len() });
    }

    let first = stack[0].rot90_ccw();
    let last = stack[stack.len() - 1].rot90_ccw();

    let (_, peaks) = extract(&first, config, 0, 0)?;
    let report = angle::angles(&peaks, config)?;

    let window = config.edge_crop;
    let win_first = first.centered_window(window, shift_dy, shift_dx)?;
    let win_last = last.centered_window(window, shift_dy, shift_dx)?;

    // Vertical edge: one mean per row, ascending x.
    let xs_up: Vec<f64> = (0..window).map(|x| x as f64).collect();
    let fit_first = fit_erf(&xs_up, &mean_per_row(&win_first))?;
    let fit_last = fit_erf(&xs_up, &mean_per_row(&win_last))?;
    let shift_v = fit_last.position() - fit_first.position();
    debug!(shift_v, "vertical edge shift fitted");

    ensure_overlap(shift_v, window)?;
    if shift_v == 0.0 {
        return Err(GitterError::DegenerateGeometry(
            "vertical edge shift is zero",
        ));
    }

    // Align rows before the horizontal fit: the first window rolls by
    // int(shift_v) rows in the positive direction, the last by the same
    // amount in the negative direction; overhang rows are trimmed, not
    // wrapped.
    let s = shift_v as i64;
    let first_rows = roll_trim(&win_first, s);
    let last_rows = roll_trim(&win_last, -s);

    // Horizontal edge: one mean per column, descending x.
    let xs_down: Vec<f64> = (0..window).map(|x| (window - x) as f64).collect();
    let fit_first_h = fit_erf(&xs_down, &mean_per_col(&first_rows))?;
    let fit_last_h = fit_erf(&xs_down, &mean_per_col(&last_rows))?;
    let shift_h = fit_last_h.position() - fit_first_h.position();
    debug!(shift_h, "horizontal edge shift fitted");

    let piezo_angle_deg = (shift_h / shift_v).atan().to_degrees();
    let verr_deg = -(report.avg - config.nominal_angle_deg - piezo_angle_deg);

    Ok(PiezoReport {
        piezo_angle_deg,
        grating: report,
        grating_error_mrad: verr_deg * MRAD_PER_DEG,
        displacement_um: None,
        secondary: None,
        edge_shift_px: Some([shift_v, shift_h]),
    })
}

/// Fitted step model `a * erf(b*x + c) + d`.
#[derive(Clone, Copy, Debug)]
struct ErfFit {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
}

impl ErfFit {
    /// Edge position in the fit's x coordinate.
    fn position(&self) -> f64 {
        self.c / self.b
    }
}

struct ErfProblem<'a> {
    xs: &'a [f64],
    ys: &'a [f64],
    params: Vector4<f64>,
}

impl LeastSquaresProblem<f64, Dyn, U4> for ErfProblem<'_> {
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, U4>;
    type ParameterStorage = Owned<f64, U4>;

    fn set_params(&mut self, params: &Vector4<f64>) {
        self.params.copy_from(params);
    }

    fn params(&self) -> Vector4<f64> {
        self.params
    }

    fn residuals(&self) -> Option<DVector<f64>> {
        let (a, b, c, d) = (
            self.params[0],
            self.params[1],
            self.params[2],
            self.params[3],
        );
        Some(DVector::from_iterator(
            self.xs.len(),
            self.xs
                .iter()
                .zip(self.ys)
                .map(|(&x, &y)| a * erf(b * x + c) + d - y),
        ))
    }

    fn jacobian(&self) -> Option<Matrix<f64, Dyn, U4, Self::JacobianStorage>> {
        let (a, b, c) = (self.params[0], self.params[1], self.params[2]);
        let mut jac = Matrix::<f64, Dyn, U4, Self::JacobianStorage>::zeros(self.xs.len());
        for (row, &x) in self.xs.iter().enumerate() {
            let u = b * x + c;
            let gauss = std::f64::consts::FRAC_2_SQRT_PI * (-u * u).exp();
            jac[(row, 0)] = erf(u);
            jac[(row, 1)] = a * gauss * x;
            jac[(row, 2)] = a * gauss;
            jac[(row, 3)] = 1.0;
        }
        Some(jac)
    }
}

/// Least-squares fit of the step model, starting from (1, 0.5, 0.5, 0.5).
fn fit_erf(xs: &[f64], ys: &[f64]) -> Result<ErfFit> {
    let problem = ErfProblem {
        xs,
        ys,
        params: Vector4::new(1.0, 0.5, 0.5, 0.5),
    };
    let (solved, report) = LevenbergMarquardt::new().minimize(problem);
    if !report.termination.was_successful() {
        return Err(GitterError::EdgeFitFailed(format!(
            "no convergence: {:?}",
            report.termination
        )));
    }

    let p = solved.params;
    if p[1].abs() < ERF_FIT_B_EPS {
        return Err(GitterError::EdgeFitFailed(format!(
            "step slope {:.4e} below {:.0e}",
            p[1], ERF_FIT_B_EPS
        )));
    }

    Ok(ErfFit {
        a: p[0],
        b: p[1],
        c: p[2],
        d: p[3],
    })
}

fn ensure_overlap(shift_v: f64, window: usize) -> Result<()> {
    if shift_v.abs() >= window as f64 {
        return Err(GitterError::NoOverlap { shift_v, window });
    }
    Ok(())
}

/// Shift the window by `shift` rows and drop the rows that would wrap.
fn roll_trim(window: &Array2<f64>, shift: i64) -> Array2<f64> {
    let rows = window.nrows() as i64;
    let start = (-shift).max(0);
    let end = rows - shift.max(0);
    window.slice(s![start as usize..end as usize, ..]).to_owned()
}

fn mean_per_row(window: &Array2<f64>) -> Vec<f64> {
    window
        .rows()
        .into_iter()
        .map(|row| row.sum() / row.len() as f64)
        .collect()
}

fn mean_per_col(window: &Array2<f64>) -> Vec<f64> {
    window
        .columns()
        .into_iter()
        .map(|col| col.sum() / col.len() as f64)
        .collect()
}
