//! Small vector helpers shared across modules.

/// Dot product of two 3-vectors.
#[inline(always)]
pub fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Squared Euclidean length.
#[inline(always)]
pub fn norm_squared(v: &[f64; 3]) -> f64 {
    dot(v, v)
}

#[inline(always)]
pub fn norm(v: &[f64; 3]) -> f64 {
    norm_squared(v).sqrt()
}

/// Component-wise `b - a`.
#[inline(always)]
pub fn sub(b: &[f64; 3], a: &[f64; 3]) -> [f64; 3] {
    [b[0] - a[0], b[1] - a[1], b[2] - a[2]]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_norm() {
        let v = [3.0, 4.0, 0.0];
        assert!((norm(&v) - 5.0).abs() < 1e-12);
        assert!((norm_squared(&[1.0, 1.0, 1.0]) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_sub_and_dot() {
        let d = sub(&[1.0, 2.0, 3.0], &[1.0, 1.0, 1.0]);
        assert_eq!(d, [0.0, 1.0, 2.0]);
        assert!((dot(&d, &[1.0, 1.0, 1.0]) - 3.0).abs() < 1e-12);
    }
}
