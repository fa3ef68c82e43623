//! Normalization and integration helpers.
//!
//! Grid construction follows NumPy's `linspace` / `arange` conventions so
//! the tabulated abscissae line up with existing analysis scripts.

use mdcorr_core::{Error, Result};

/// `n` evenly spaced samples over `[start, stop]`, endpoints included.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut out: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
            out[n - 1] = stop;
            out
        }
    }
}

/// Upper bound on the number of bins a single histogram may have.
pub const MAX_BINS: usize = 1 << 26;

/// Number of bins `floor(range / width) + 1` covering a range of length
/// `range`, rejected under `name` when it is not representable or exceeds
/// [`MAX_BINS`].
pub fn bin_count(name: &'static str, range: f64, width: f64) -> Result<usize> {
    let steps = (range / width).floor();
    if !(steps.is_finite() && steps >= 0.0 && steps < MAX_BINS as f64) {
        return Err(Error::invalid_parameter(
            name,
            format!(
                "a width of {} over a range of {} gives {} bins (at most {} allowed)",
                width, range, steps, MAX_BINS
            ),
        ));
    }
    (steps as usize).checked_add(1).ok_or_else(|| {
        Error::invalid_parameter(name, format!("bin count overflows for width {}", width))
    })
}

/// `start, start + step, ...` strictly below `stop`.
pub fn arange(start: f64, stop: f64, step: f64) -> Vec<f64> {
    if !(step > 0.0) || !(stop > start) {
        return Vec::new();
    }
    let n = ((stop - start) / step).ceil() as usize;
    (0..n).map(|i| start + i as f64 * step).collect()
}

/// Element-wise `numerator / denominator`, with exactly `0.0` wherever the
/// denominator is zero.
pub fn divide_or_zero(numerator: &[f64], denominator: &[f64]) -> Vec<f64> {
    numerator
        .iter()
        .zip(denominator.iter())
        .map(|(&n, &d)| if d != 0.0 { n / d } else { 0.0 })
        .collect()
}

/// Piecewise-linear interpolation of `(xp, fp)` at `x`.
///
/// `xp` must be ascending. Queries outside `[xp[0], xp[last]]` take the
/// nearest end value.
pub fn interp(x: &[f64], xp: &[f64], fp: &[f64]) -> Vec<f64> {
    let n = xp.len().min(fp.len());
    if n == 0 {
        return vec![f64::NAN; x.len()];
    }
    x.iter()
        .map(|&xi| {
            if xi.is_nan() {
                return f64::NAN;
            }
            if xi <= xp[0] {
                return fp[0];
            }
            if xi >= xp[n - 1] {
                return fp[n - 1];
            }
            // First index with xp[idx] > xi; 1 <= idx < n here.
            let idx = xp[..n].partition_point(|&v| v <= xi);
            let (x0, x1) = (xp[idx - 1], xp[idx]);
            let (f0, f1) = (fp[idx - 1], fp[idx]);
            if x1 == x0 {
                f1
            } else {
                f0 + (f1 - f0) * (xi - x0) / (x1 - x0)
            }
        })
        .collect()
}

/// Trapezoidal rule over samples `(x, y)`.
pub fn trapezoid(y: &[f64], x: &[f64]) -> f64 {
    y.windows(2)
        .zip(x.windows(2))
        .map(|(yw, xw)| 0.5 * (yw[0] + yw[1]) * (xw[1] - xw[0]))
        .sum()
}

/// Integrate `y(x)` with the trapezoidal rule after dropping non-finite samples.
///
/// Fails with [`Error::NonFiniteIntegration`] when no finite sample is left.
pub fn integrate_finite(x: &[f64], y: &[f64]) -> Result<f64> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y.iter())
        .filter(|(xi, yi)| xi.is_finite() && yi.is_finite())
        .map(|(&xi, &yi)| (xi, yi))
        .unzip();

    if xs.is_empty() {
        return Err(Error::NonFiniteIntegration { samples: y.len() });
    }
    let dropped = y.len() - ys.len();
    if dropped > 0 {
        log::debug!("Dropped {} non-finite integrand samples", dropped);
    }
    Ok(trapezoid(&ys, &xs))
}
