//! Rotation matrices and small scalar helpers shared by the projection code.
//!
//! Matrices are built from table trig so they can be rebuilt every frame.

use crate::trig;
use nalgebra::Matrix3;

/// Rotation about the vertical (y) axis, mixing x and z.
pub fn spin_matrix(angle: f64) -> Matrix3<f64> {
    let (s, c) = trig::sin_cos(angle);
    Matrix3::new(
        c, 0.0, -s,
        0.0, 1.0, 0.0,
        s, 0.0, c,
    )
}

/// Rotation about the horizontal (x) axis, mixing y and z.
pub fn tilt_matrix(angle: f64) -> Matrix3<f64> {
    let (s, c) = trig::sin_cos(angle);
    Matrix3::new(
        1.0, 0.0, 0.0,
        0.0, c, -s,
        0.0, s, c,
    )
}

/// Rotation about the polar (z) axis, mixing x and y.
pub fn node_matrix(angle: f64) -> Matrix3<f64> {
    let (s, c) = trig::sin_cos(angle);
    Matrix3::new(
        c, -s, 0.0,
        s, c, 0.0,
        0.0, 0.0, 1.0,
    )
}

/// Globe orientation: spin first, then axial tilt.
pub fn globe_matrix(rotation: f64, tilt: f64) -> Matrix3<f64> {
    tilt_matrix(tilt) * spin_matrix(rotation)
}

/// Linear remap of `value` from `[in_lo, in_hi]` to `[out_lo, out_hi]`, unclamped.
pub fn map_range(value: f64, in_lo: f64, in_hi: f64, out_lo: f64, out_hi: f64) -> f64 {
    out_lo + (value - in_lo) * (out_hi - out_lo) / (in_hi - in_lo)
}

/// Remap then clamp; NaN input lands on `min`.
pub fn map_clamped(value: f64, input: (f64, f64), output: (f64, f64), min: f64, max: f64) -> f64 {
    let v = map_range(value, input.0, input.1, output.0, output.1);
    if v.is_nan() { min } else { v.clamp(min, max) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector3;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn spin_matches_hand_rotation() {
        let r = 0.7;
        let v = Vector3::new(10.0, 3.0, -4.0);
        let out = spin_matrix(r) * v;
        let (s, c) = trig::sin_cos(r);
        assert_abs_diff_eq!(out.x, v.x * c - v.z * s, epsilon = 1e-12);
        assert_abs_diff_eq!(out.y, v.y, epsilon = 1e-12);
        assert_abs_diff_eq!(out.z, v.x * s + v.z * c, epsilon = 1e-12);
    }

    #[test]
    fn tilt_quarter_turn_moves_y_to_z() {
        let out = tilt_matrix(FRAC_PI_2) * Vector3::new(0.0, 1.0, 0.0);
        assert_abs_diff_eq!(out.z, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(out.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn rotations_preserve_length() {
        let v = Vector3::new(1.0, -2.0, 3.0);
        let m = node_matrix(2.1) * globe_matrix(0.4, -0.41);
        assert_abs_diff_eq!((m * v).norm(), v.norm(), epsilon = 1e-9);
    }

    #[test]
    fn map_clamped_bounds() {
        assert_eq!(map_clamped(1000.0, (-200.0, 200.0), (0.3, 1.0), 0.1, 1.0), 1.0);
        assert_abs_diff_eq!(map_clamped(0.0, (-200.0, 200.0), (0.3, 1.0), 0.1, 1.0), 0.65, epsilon = 1e-12);
        assert_eq!(map_clamped(f64::NAN, (-200.0, 200.0), (0.3, 1.0), 0.1, 1.0), 0.1);
    }
}
