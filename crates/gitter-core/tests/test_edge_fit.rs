mod common;

use gitter_core::config::GratingConfig;
use gitter_core::error::GitterError;
use gitter_core::frame::Frame;
use gitter_core::piezo::solve_edges;

use common::{masked_grating_frame, rot90_cw};

const PITCH_PX: f64 = 33.0 / 3.33;

/// Camera-side frame of a nominal grating masked by a smooth corner: dark
/// above `edge_row` and right of `edge_col` (coordinates of the rotated
/// frame; the edge window sees rows/cols 300..700).
fn masked_frame(edge_row: f64, edge_col: f64) -> Frame {
    rot90_cw(&masked_grating_frame(
        (1000, 1000),
        PITCH_PX,
        8.95,
        [0.4, 0.9, -0.3],
        edge_row,
        edge_col,
        0.5,
    ))
}

#[test]
fn single_frame_stack_is_too_short() {
    let config = GratingConfig::default();
    let stack = vec![masked_frame(304.0, 696.0)];
    assert!(matches!(
        solve_edges(&stack, &config, 0, 0),
        Err(GitterError::StackTooShort { got: 1 })
    ));
}

#[test]
fn edge_motion_round_trips_through_the_fit() {
    let config = GratingConfig::default();

    // The scene moves 4 px down and 3 px right between the two frames.
    let stack = vec![masked_frame(304.0, 696.0), masked_frame(308.0, 699.0)];
    let report = solve_edges(&stack, &config, 0, 0).unwrap();

    let [shift_v, shift_h] = report.edge_shift_px.unwrap();
    // Edge positions are c/b of the fitted step: a downward scene motion
    // lowers the vertical position, a rightward motion raises the
    // horizontal one (descending-x fit).
    assert!(
        (shift_v - (-4.0)).abs() < 0.5,
        "vertical shift {shift_v} vs expected -4"
    );
    assert!(
        (shift_h - 3.0).abs() < 0.5,
        "horizontal shift {shift_h} vs expected 3"
    );

    let expected_angle = (shift_h / shift_v).atan().to_degrees();
    assert!((report.piezo_angle_deg - expected_angle).abs() < 1e-9);
    assert!(
        (report.piezo_angle_deg - (-36.87)).abs() < 1.0,
        "piezo angle {}",
        report.piezo_angle_deg
    );

    // Grating angles come from the same (masked) frame; the mask blurs the
    // peaks but must not move them materially.
    assert!((report.grating.avg - 8.95).abs() < 0.5);

    let verr = -(report.grating.avg - config.nominal_angle_deg - report.piezo_angle_deg);
    assert!(
        (report.grating_error_mrad - verr * std::f64::consts::PI / 0.18).abs() < 1e-9
    );

    assert!(report.displacement_um.is_none());
    assert!(report.secondary.is_none());
}

#[test]
fn identical_frames_leave_the_edge_angle_undefined() {
    let config = GratingConfig::default();
    let frame = masked_frame(304.0, 696.0);
    let stack = vec![frame.clone(), frame];
    assert!(matches!(
        solve_edges(&stack, &config, 0, 0),
        Err(GitterError::DegenerateGeometry(_))
    ));
}
