//! Radial distribution function g(r) and coordination number.
//!
//! Every unordered pair `i < j` in every frame is binned by its
//! minimum-image distance, counting twice (once from each end). The raw
//! histogram is divided by the ideal-gas expectation
//!
//!   ideal(r) = rho · 4π r² · dr · n_frames · n_atoms
//!
//! and g(r) is integrated to a coordination number up to `sigma`.

use crate::numeric::{arange, bin_count, divide_or_zero, integrate_finite, interp, linspace};
use crate::output::write_table;
use mdcorr_core::{CorrelationResult, Error, Histogram, PeriodicBox, Result, Trajectory};
use rayon::prelude::*;
use std::f64::consts::PI;
use std::io::Write;

/// Pairs closer than this are never counted.
pub const SHORT_RANGE_EXCLUSION: f64 = 1.0;

/// Parameters for the RDF calculation.
#[derive(Debug, Clone)]
pub struct RdfParams {
    /// Distance bin width.
    pub dr: f64,
    /// Lower edge of the first bin.
    pub dmin: f64,
    /// Upper distance cutoff. `None` uses half of the box edge along x.
    pub dmax: Option<f64>,
    /// Cutoff for the coordination number integral.
    pub sigma: f64,
    /// Accumulate frames on the rayon thread pool.
    pub parallel: bool,
}

impl Default for RdfParams {
    fn default() -> Self {
        Self {
            dr: 0.02,
            dmin: 0.0,
            dmax: None,
            sigma: 3.7,
            parallel: true,
        }
    }
}

impl RdfParams {
    /// Upper cutoff actually used for `periodic_box`.
    pub fn resolved_dmax(&self, periodic_box: &PeriodicBox) -> f64 {
        self.dmax
            .unwrap_or_else(|| 0.5 * periodic_box.lengths()[0])
    }

    /// Number of distance bins, `floor((dmax - dmin) / dr) + 1`.
    pub fn nbin(&self, periodic_box: &PeriodicBox) -> Result<usize> {
        bin_count("dr", self.resolved_dmax(periodic_box) - self.dmin, self.dr)
    }
}

/// Normalized RDF with its raw counts and coordination number.
#[derive(Debug, Clone)]
pub struct RdfResult {
    /// `bin_centers` are the distances, `values` are g(r).
    pub correlation: CorrelationResult,
    pub raw: Histogram,
    pub coordination_number: f64,
    /// Number density `n_atoms / volume`.
    pub density: f64,
    pub n_frames: usize,
    pub n_atoms: usize,
}

impl RdfResult {
    pub fn d_values(&self) -> &[f64] {
        &self.correlation.bin_centers
    }

    pub fn g_values(&self) -> &[f64] {
        &self.correlation.values
    }

    /// Write the `(r, g(r))` table.
    pub fn write_dat<W: Write>(&self, writer: W) -> Result<()> {
        write_table(writer, &[self.d_values(), self.g_values()])
    }
}

fn validate(trajectory: &Trajectory, params: &RdfParams) -> Result<f64> {
    if trajectory.is_empty() {
        return Err(Error::invalid_parameter(
            "trajectory",
            "contains no frames",
        ));
    }
    if trajectory.n_atoms() < 2 {
        return Err(Error::invalid_parameter(
            "trajectory",
            format!("needs at least 2 particles, got {}", trajectory.n_atoms()),
        ));
    }
    if !(params.dr.is_finite() && params.dr > 0.0) {
        return Err(Error::invalid_parameter(
            "dr",
            format!("must be positive and finite, got {}", params.dr),
        ));
    }
    if !(params.dmin.is_finite() && params.dmin >= 0.0) {
        return Err(Error::invalid_parameter(
            "dmin",
            format!("must be non-negative and finite, got {}", params.dmin),
        ));
    }
    let pbc = trajectory.periodic_box();
    let dmax = params.resolved_dmax(pbc);
    if !(dmax.is_finite() && dmax > params.dmin) {
        return Err(Error::invalid_parameter(
            "dmax",
            format!("must be finite and exceed dmin = {}, got {}", params.dmin, dmax),
        ));
    }
    if dmax > pbc.half_min_length() {
        log::warn!(
            "dmax = {} exceeds half the shortest box edge ({}); minimum-image distances beyond it are incomplete",
            dmax,
            pbc.half_min_length(),
        );
    }
    Ok(dmax)
}

/// Bin every unique pair of one frame into `hist`, two counts per pair.
fn accumulate_frame(
    positions: &[[f64; 3]],
    periodic_box: &PeriodicBox,
    dmax: f64,
    hist: &mut Histogram,
) {
    for (i, pi) in positions.iter().enumerate() {
        for pj in &positions[i + 1..] {
            let d = periodic_box.distance(pi, pj);
            if d > SHORT_RANGE_EXCLUSION && d < dmax {
                hist.add(d, 2);
            }
        }
    }
}

/// Raw pair histogram summed over all frames.
pub fn accumulate_rdf(trajectory: &Trajectory, params: &RdfParams) -> Result<Histogram> {
    let dmax = validate(trajectory, params)?;
    let pbc = *trajectory.periodic_box();
    let template = Histogram::new(params.dmin, params.dr, params.nbin(&pbc)?)?;

    let per_frame = |(idx, frame): (usize, &mdcorr_core::Frame)| -> Result<Histogram> {
        let mut hist = template.empty_like();
        accumulate_frame(&frame.positions, &pbc, dmax, &mut hist);
        log::debug!("Frame {}: {} pair counts", idx, hist.total());
        Ok(hist)
    };
    let merge = |mut a: Histogram, b: Histogram| -> Result<Histogram> {
        a.merge(&b)?;
        Ok(a)
    };

    if params.parallel {
        trajectory
            .frames()
            .par_iter()
            .enumerate()
            .map(per_frame)
            .try_reduce(|| template.empty_like(), merge)
    } else {
        trajectory
            .frames()
            .iter()
            .enumerate()
            .map(per_frame)
            .try_fold(template.empty_like(), |acc, h| merge(acc, h?))
    }
}

/// Divide raw counts by the ideal-gas expectation at each `d_values` entry.
///
/// Bins whose expectation is zero (r = 0) are set to exactly zero.
pub fn normalize_rdf(
    raw: &Histogram,
    d_values: &[f64],
    density: f64,
    n_frames: usize,
    n_atoms: usize,
) -> Vec<f64> {
    let scale = density * 4.0 * PI * raw.width() * n_frames as f64 * n_atoms as f64;
    let ideal: Vec<f64> = d_values.iter().map(|d| scale * d * d).collect();
    let counts: Vec<f64> = raw.counts().iter().map(|&c| c as f64).collect();
    divide_or_zero(&counts, &ideal)
}

/// Integrate `4π rho r² g(r)` over `[dmin, sigma)` with the trapezoidal rule.
///
/// g(r) is linearly interpolated onto a grid with spacing `dr`; non-finite
/// samples are dropped before integrating.
pub fn coordination_number(
    d_values: &[f64],
    g_values: &[f64],
    density: f64,
    dmin: f64,
    sigma: f64,
    dr: f64,
) -> Result<f64> {
    let grid = arange(dmin, sigma, dr);
    if grid.is_empty() {
        return Err(Error::invalid_parameter(
            "sigma",
            format!("integration range [{}, {}) is empty", dmin, sigma),
        ));
    }
    let g_interp = interp(&grid, d_values, g_values);
    let integrand: Vec<f64> = grid
        .iter()
        .zip(g_interp.iter())
        .map(|(&d, &g)| 4.0 * PI * density * d * d * g)
        .collect();
    integrate_finite(&grid, &integrand)
}

/// Compute g(r) and the coordination number for a trajectory.
pub fn compute_rdf(trajectory: &Trajectory, params: &RdfParams) -> Result<RdfResult> {
    if !(params.sigma.is_finite() && params.sigma > params.dmin) {
        return Err(Error::invalid_parameter(
            "sigma",
            format!(
                "must be finite and exceed dmin = {}, got {}",
                params.dmin, params.sigma
            ),
        ));
    }
    let raw = accumulate_rdf(trajectory, params)?;
    let pbc = trajectory.periodic_box();
    let dmax = params.resolved_dmax(pbc);
    let n_frames = trajectory.n_frames();
    let n_atoms = trajectory.n_atoms();
    let density = pbc.density(n_atoms);

    let d_values = linspace(params.dmin, dmax, raw.nbin());
    let g_values = normalize_rdf(&raw, &d_values, density, n_frames, n_atoms);
    let nc = coordination_number(
        &d_values,
        &g_values,
        density,
        params.dmin,
        params.sigma,
        params.dr,
    )?;

    log::info!(
        "RDF over {} frames, {} atoms: {} bins in [{}, {}], {} pair counts, coordination number = {:.4}",
        n_frames,
        n_atoms,
        raw.nbin(),
        params.dmin,
        dmax,
        raw.total(),
        nc,
    );

    Ok(RdfResult {
        correlation: CorrelationResult {
            bin_centers: d_values,
            values: g_values,
            total_count: raw.total(),
        },
        raw,
        coordination_number: nc,
        density,
        n_frames,
        n_atoms,
    })
}
