//! Minimum-image geometry in an orthorhombic periodic box.
//!
//! The minimum-image convention is only valid while every cutoff of
//! interest is at most half the shortest box edge. That is a caller
//! contract and is not checked here.

use crate::error::{Error, Result};
use crate::util::{dot, norm, sub};

/// Orthorhombic, non-fluctuating simulation box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodicBox {
    lengths: [f64; 3],
}

impl PeriodicBox {
    /// Build a box from its three edge lengths. Every edge must be finite and positive.
    pub fn new(lengths: [f64; 3]) -> Result<Self> {
        for (axis, &l) in lengths.iter().enumerate() {
            if !(l.is_finite() && l > 0.0) {
                return Err(Error::InvalidTrajectory(format!(
                    "box length along axis {} must be positive and finite, got {}",
                    axis, l
                )));
            }
        }
        Ok(Self { lengths })
    }

    /// Build a box from `(lo, hi)` bounds per axis; the edge is `hi - lo`.
    pub fn from_bounds(bounds: [[f64; 2]; 3]) -> Result<Self> {
        Self::new([
            bounds[0][1] - bounds[0][0],
            bounds[1][1] - bounds[1][0],
            bounds[2][1] - bounds[2][0],
        ])
    }

    pub fn lengths(&self) -> [f64; 3] {
        self.lengths
    }

    pub fn volume(&self) -> f64 {
        self.lengths[0] * self.lengths[1] * self.lengths[2]
    }

    /// Number density for `n_atoms` particles.
    pub fn density(&self, n_atoms: usize) -> f64 {
        n_atoms as f64 / self.volume()
    }

    /// Half of the shortest edge, the largest cutoff the minimum image supports.
    pub fn half_min_length(&self) -> f64 {
        0.5 * self.lengths.iter().cloned().fold(f64::INFINITY, f64::min)
    }

    /// Minimum-image displacement from `p1` to `p2`.
    ///
    /// Image shifts round half to even, so a component of exactly `±L/2`
    /// keeps its sign when it is an even multiple away (`5 -> 5`,
    /// `15 -> -5` for `L = 10`).
    #[inline]
    pub fn minimum_image(&self, p1: &[f64; 3], p2: &[f64; 3]) -> [f64; 3] {
        let mut v = sub(p2, p1);
        for (c, &l) in v.iter_mut().zip(self.lengths.iter()) {
            *c -= l * (*c / l).round_ties_even();
        }
        v
    }

    /// Minimum-image distance between `p1` and `p2`.
    #[inline]
    pub fn distance(&self, p1: &[f64; 3], p2: &[f64; 3]) -> f64 {
        norm(&self.minimum_image(p1, p2))
    }
}

/// Angle in degrees between two vectors sharing an apex.
///
/// Returns `None` when either vector has zero length. The cosine is clamped
/// to `[-1, 1]` so rounding on collinear vectors cannot produce NaN.
#[inline]
pub fn angle_degrees(v1: &[f64; 3], v2: &[f64; 3]) -> Option<f64> {
    let d1 = norm(v1);
    let d2 = norm(v2);
    if d1 == 0.0 || d2 == 0.0 {
        return None;
    }
    angle_degrees_with_norms(v1, v2, d1, d2)
}

/// Same as [`angle_degrees`] when the norms are already known.
#[inline]
pub fn angle_degrees_with_norms(v1: &[f64; 3], v2: &[f64; 3], d1: f64, d2: f64) -> Option<f64> {
    if d1 == 0.0 || d2 == 0.0 {
        return None;
    }
    let cos_theta = (dot(v1, v2) / (d1 * d2)).clamp(-1.0, 1.0);
    Some(cos_theta.acos().to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cubic(l: f64) -> PeriodicBox {
        PeriodicBox::new([l, l, l]).unwrap()
    }

    #[test]
    fn test_minimum_image_is_periodic() {
        let pbc = PeriodicBox::new([10.0, 12.0, 14.0]).unwrap();
        let p = [1.5, -2.0, 7.25];
        let shifted = [p[0] + 10.0, p[1] + 12.0, p[2] + 14.0];
        assert_eq!(pbc.minimum_image(&p, &shifted), [0.0, 0.0, 0.0]);
        assert_eq!(pbc.minimum_image(&p, &p), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_minimum_image_wraps_across_boundary() {
        let pbc = cubic(10.0);
        let v = pbc.minimum_image(&[0.5, 0.0, 0.0], &[9.5, 0.0, 0.0]);
        assert!((v[0] + 1.0).abs() < 1e-12);
        assert!((pbc.distance(&[0.5, 0.5, 0.5], &[9.5, 9.5, 9.5]) - 3f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_minimum_image_half_box_rounds_to_even() {
        let pbc = cubic(10.0);
        let origin = [0.0, 0.0, 0.0];
        assert_eq!(pbc.minimum_image(&origin, &[5.0, 0.0, 0.0]), [5.0, 0.0, 0.0]);
        assert_eq!(pbc.minimum_image(&origin, &[-5.0, 0.0, 0.0]), [-5.0, 0.0, 0.0]);
        assert_eq!(pbc.minimum_image(&origin, &[15.0, 0.0, 0.0]), [-5.0, 0.0, 0.0]);
        assert_eq!(pbc.minimum_image(&origin, &[0.0, 25.0, 0.0]), [0.0, 5.0, 0.0]);
    }

    #[test]
    fn test_box_rejects_non_positive_edges() {
        assert!(PeriodicBox::new([1.0, 0.0, 1.0]).is_err());
        assert!(PeriodicBox::new([1.0, -2.0, 1.0]).is_err());
        assert!(PeriodicBox::new([f64::NAN, 1.0, 1.0]).is_err());
    }

    #[test]
    fn test_from_bounds_uses_hi_minus_lo() {
        let pbc = PeriodicBox::from_bounds([[-5.0, 5.0], [2.0, 10.0], [0.0, 4.0]]).unwrap();
        assert_eq!(pbc.lengths(), [10.0, 8.0, 4.0]);
        assert!((pbc.volume() - 320.0).abs() < 1e-12);
        assert!((pbc.density(32) - 0.1).abs() < 1e-12);
        assert!((pbc.half_min_length() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_angle_degrees() {
        let right = angle_degrees(&[1.0, 0.0, 0.0], &[0.0, 2.0, 0.0]).unwrap();
        assert!((right - 90.0).abs() < 1e-12);
        let straight = angle_degrees(&[1.0, 1.0, 0.0], &[-3.0, -3.0, 0.0]).unwrap();
        assert!((straight - 180.0).abs() < 1e-9);
        let same = angle_degrees(&[0.1, 0.2, 0.3], &[0.2, 0.4, 0.6]).unwrap();
        assert!(same.is_finite());
        assert!(same.abs() < 1e-6);
    }

    #[test]
    fn test_angle_zero_length_is_none() {
        assert!(angle_degrees(&[0.0, 0.0, 0.0], &[1.0, 0.0, 0.0]).is_none());
        assert!(angle_degrees(&[1.0, 0.0, 0.0], &[0.0, 0.0, 0.0]).is_none());
    }
}
