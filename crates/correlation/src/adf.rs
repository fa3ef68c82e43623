//! Angular distribution function for a J-I-K type triplet.
//!
//! For every center `i` of type I, every neighbor `j != i` of type J and
//! every neighbor `k > j`, `k != i` of type K, the angle j-i-k is binned
//! when both minimum-image bond lengths are below `sigma`.
//!
//! Only `k > j` is visited. When J and K differ, a triplet whose K-typed
//! particle has the lower index is never counted; this ordering rule is
//! part of the established behavior and is kept as is.

use crate::numeric::{bin_count, linspace};
use crate::output::write_table;
use mdcorr_core::periodic::angle_degrees_with_norms;
use mdcorr_core::util::norm;
use mdcorr_core::{
    AtomType, CorrelationResult, Error, Frame, Histogram, PeriodicBox, Result, Trajectory,
};
use rayon::prelude::*;
use std::fmt;
use std::io::Write;

/// Ordered J-I-K type triplet; `i` is the central particle type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeTriplet {
    pub j: AtomType,
    pub i: AtomType,
    pub k: AtomType,
}

impl TypeTriplet {
    pub fn new(j: i32, i: i32, k: i32) -> Self {
        Self {
            j: AtomType(j),
            i: AtomType(i),
            k: AtomType(k),
        }
    }
}

impl fmt::Display for TypeTriplet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.j, self.i, self.k)
    }
}

/// What to do with a triplet whose bond vector has zero length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DegeneratePolicy {
    /// Skip the triplet and count it in [`AdfResult::degenerate_triplets`].
    #[default]
    Skip,
    /// Abort with [`Error::DegenerateGeometry`] for the first offending
    /// triplet in frame order. Accumulation runs serially under this policy
    /// so the reported frame and particles do not depend on scheduling.
    Fail,
}

/// Parameters for the ADF calculation.
#[derive(Debug, Clone)]
pub struct AdfParams {
    /// Angle bin width in degrees.
    pub dang: f64,
    pub angmin: f64,
    pub angmax: f64,
    /// Bond length cutoff for both j-i and k-i.
    pub sigma: f64,
    pub triplet: TypeTriplet,
    pub degenerate: DegeneratePolicy,
    /// Accumulate frames on the rayon thread pool.
    pub parallel: bool,
}

impl AdfParams {
    /// Default binning (0.5° over 0–180°) and cutoff 6.5 for `triplet`.
    pub fn new(triplet: TypeTriplet) -> Self {
        Self {
            dang: 0.5,
            angmin: 0.0,
            angmax: 180.0,
            sigma: 6.5,
            triplet,
            degenerate: DegeneratePolicy::Skip,
            parallel: true,
        }
    }

    /// Number of angle bins, `floor((angmax - angmin) / dang) + 1`.
    pub fn nbin(&self) -> Result<usize> {
        bin_count("dang", self.angmax - self.angmin, self.dang)
    }
}

/// Raw angle counts before normalization.
#[derive(Debug, Clone)]
pub struct AdfCounts {
    pub hist: Histogram,
    /// Triplets skipped because a bond vector had zero length.
    pub degenerate_triplets: u64,
}

impl AdfCounts {
    /// Number of binned angles.
    pub fn total(&self) -> u64 {
        self.hist.total()
    }

    fn merge(mut self, other: AdfCounts) -> Result<AdfCounts> {
        self.hist.merge(&other.hist)?;
        self.degenerate_triplets += other.degenerate_triplets;
        Ok(self)
    }
}

/// Normalized ADF.
#[derive(Debug, Clone)]
pub struct AdfResult {
    /// `bin_centers` are angles in degrees, `values` the probability density.
    pub correlation: CorrelationResult,
    pub raw: Histogram,
    pub degenerate_triplets: u64,
    pub triplet: TypeTriplet,
    pub n_frames: usize,
}

impl AdfResult {
    pub fn angles_degrees(&self) -> &[f64] {
        &self.correlation.bin_centers
    }

    pub fn angles_radians(&self) -> Vec<f64> {
        self.correlation
            .bin_centers
            .iter()
            .map(|a| a.to_radians())
            .collect()
    }

    pub fn adf_values(&self) -> &[f64] {
        &self.correlation.values
    }

    /// Number of binned triplets.
    pub fn total(&self) -> u64 {
        self.correlation.total_count
    }

    /// `adf_<j><i><k>.dat`
    pub fn default_file_name(&self) -> String {
        format!(
            "adf_{}{}{}.dat",
            self.triplet.j, self.triplet.i, self.triplet.k
        )
    }

    /// Write the `(degrees, radians, adf)` table.
    pub fn write_dat<W: Write>(&self, writer: W) -> Result<()> {
        let radians = self.angles_radians();
        write_table(
            writer,
            &[self.angles_degrees(), radians.as_slice(), self.adf_values()],
        )
    }
}

fn validate<'a>(trajectory: &'a Trajectory, params: &AdfParams) -> Result<&'a [AtomType]> {
    if trajectory.is_empty() {
        return Err(Error::invalid_parameter(
            "trajectory",
            "contains no frames",
        ));
    }
    let types = trajectory.atom_types().ok_or_else(|| {
        Error::invalid_parameter(
            "trajectory",
            "has no type labels; read it with a column layout that includes the type column",
        )
    })?;
    if !(params.dang.is_finite() && params.dang > 0.0) {
        return Err(Error::invalid_parameter(
            "dang",
            format!("must be positive and finite, got {}", params.dang),
        ));
    }
    if !(params.angmin.is_finite() && params.angmax.is_finite() && params.angmax > params.angmin)
    {
        return Err(Error::invalid_parameter(
            "angmax",
            format!(
                "angle range [{}, {}] is empty or not finite",
                params.angmin, params.angmax
            ),
        ));
    }
    if !(params.sigma.is_finite() && params.sigma > 0.0) {
        return Err(Error::invalid_parameter(
            "sigma",
            format!("must be positive and finite, got {}", params.sigma),
        ));
    }
    let half = trajectory.periodic_box().half_min_length();
    if params.sigma > half {
        log::warn!(
            "sigma = {} exceeds half the shortest box edge ({}); minimum-image bonds beyond it are incomplete",
            params.sigma,
            half,
        );
    }
    Ok(types)
}

fn accumulate_frame(
    frame_idx: usize,
    positions: &[[f64; 3]],
    types: &[AtomType],
    periodic_box: &PeriodicBox,
    params: &AdfParams,
    hist: &mut Histogram,
) -> Result<u64> {
    let t = params.triplet;
    let sigma = params.sigma;
    let n = positions.len();
    let mut degenerate = 0u64;

    for i in 0..n {
        if types[i] != t.i {
            continue;
        }
        let pi = &positions[i];
        for j in 0..n {
            if j == i || types[j] != t.j {
                continue;
            }
            let v1 = periodic_box.minimum_image(pi, &positions[j]);
            let d1 = norm(&v1);
            if d1 >= sigma {
                continue;
            }
            for k in (j + 1)..n {
                if k == i || types[k] != t.k {
                    continue;
                }
                let v2 = periodic_box.minimum_image(pi, &positions[k]);
                let d2 = norm(&v2);
                if d2 >= sigma {
                    continue;
                }
                match angle_degrees_with_norms(&v1, &v2, d1, d2) {
                    Some(angle) => {
                        hist.add(angle, 1);
                    }
                    None => match params.degenerate {
                        DegeneratePolicy::Skip => degenerate += 1,
                        DegeneratePolicy::Fail => {
                            return Err(Error::DegenerateGeometry {
                                frame: frame_idx,
                                center: i,
                                first: j,
                                second: k,
                            })
                        }
                    },
                }
            }
        }
    }
    Ok(degenerate)
}

/// Raw angle histogram summed over all frames.
pub fn accumulate_adf(trajectory: &Trajectory, params: &AdfParams) -> Result<AdfCounts> {
    let types = validate(trajectory, params)?;
    let pbc = *trajectory.periodic_box();
    let template = Histogram::new(params.angmin, params.dang, params.nbin()?)?;

    let empty = || AdfCounts {
        hist: template.empty_like(),
        degenerate_triplets: 0,
    };
    let per_frame = |(idx, frame): (usize, &Frame)| -> Result<AdfCounts> {
        let mut counts = empty();
        counts.degenerate_triplets =
            accumulate_frame(idx, &frame.positions, types, &pbc, params, &mut counts.hist)?;
        log::debug!("Frame {}: {} triplets binned", idx, counts.total());
        Ok(counts)
    };

    let parallel = params.parallel && params.degenerate == DegeneratePolicy::Skip;
    let counts = if parallel {
        trajectory
            .frames()
            .par_iter()
            .enumerate()
            .map(per_frame)
            .try_reduce(empty, AdfCounts::merge)?
    } else {
        trajectory
            .frames()
            .iter()
            .enumerate()
            .map(per_frame)
            .try_fold(empty(), |acc, c| acc.merge(c?))?
    };

    if counts.degenerate_triplets > 0 {
        log::warn!(
            "Skipped {} {} triplets with a zero-length bond vector",
            counts.degenerate_triplets,
            params.triplet,
        );
    }
    Ok(counts)
}

/// Convert raw counts into a probability density: `count / (total * dang)`.
///
/// An empty histogram is an error rather than a NaN-filled result.
pub fn normalize_adf(raw: &Histogram) -> Result<Vec<f64>> {
    let total = raw.total();
    if total == 0 {
        return Err(Error::EmptyHistogram { what: "triplets" });
    }
    let scale = total as f64 * raw.width();
    Ok(raw.counts().iter().map(|&c| c as f64 / scale).collect())
}

/// Compute the ADF of `params.triplet` for a trajectory.
pub fn compute_adf(trajectory: &Trajectory, params: &AdfParams) -> Result<AdfResult> {
    let counts = accumulate_adf(trajectory, params)?;
    let values = normalize_adf(&counts.hist)?;
    let angles = linspace(params.angmin, params.angmax, counts.hist.nbin());

    log::info!(
        "ADF {} over {} frames: {} triplets binned into {} bins",
        params.triplet,
        trajectory.n_frames(),
        counts.total(),
        counts.hist.nbin(),
    );

    Ok(AdfResult {
        correlation: CorrelationResult {
            bin_centers: angles,
            values,
            total_count: counts.total(),
        },
        raw: counts.hist,
        degenerate_triplets: counts.degenerate_triplets,
        triplet: params.triplet,
        n_frames: trajectory.n_frames(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed_frame(positions: Vec<[f64; 3]>, types: &[i32], l: f64) -> Trajectory {
        Trajectory::new(
            vec![Frame::new(0, positions)],
            PeriodicBox::new([l, l, l]).unwrap(),
            Some(types.iter().map(|&t| AtomType(t)).collect()),
        )
        .unwrap()
    }

    #[test]
    fn test_single_right_angle_triplet() {
        let traj = typed_frame(
            vec![[5.0, 5.0, 5.0], [6.0, 5.0, 5.0], [5.0, 6.5, 5.0]],
            &[2, 1, 1],
            20.0,
        );
        let params = AdfParams::new(TypeTriplet::new(1, 2, 1));
        let result = compute_adf(&traj, &params).unwrap();

        assert_eq!(result.total(), 1);
        assert_eq!(result.adf_values().len(), 361);
        let bin = ((90.0 - params.angmin) / params.dang).floor() as usize;
        for (b, &v) in result.adf_values().iter().enumerate() {
            if b == bin {
                assert!((v * result.total() as f64 * params.dang - 1.0).abs() < 1e-12);
            } else {
                assert_eq!(v, 0.0);
            }
        }
    }

    #[test]
    fn test_straight_angle_lands_in_last_bin() {
        let traj = typed_frame(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [-1.0, 0.0, 0.0]],
            &[1, 1, 1],
            10.0,
        );
        let params = AdfParams {
            sigma: 2.0,
            ..AdfParams::new(TypeTriplet::new(1, 1, 1))
        };
        let counts = accumulate_adf(&traj, &params).unwrap();
        // Only center 0 qualifies; from 1 and 2 the far neighbor sits exactly at the cutoff.
        assert_eq!(counts.hist.counts()[360], 1);
        assert_eq!(counts.hist.counts()[0], 0);
        assert_eq!(counts.total(), 1);
    }

    #[test]
    fn test_k_after_j_ordering_is_preserved() {
        // Center 0 (type 2), a type-3 particle at index 1, a type-1 particle at index 2.
        // Triplet J=1, I=2, K=3 needs k > j, so the only physical triplet is not visited.
        let positions = vec![[0.0, 0.0, 0.0], [1.5, 0.0, 0.0], [0.0, 1.5, 0.0]];
        let skipped = typed_frame(positions.clone(), &[2, 3, 1], 10.0);
        let params = AdfParams::new(TypeTriplet::new(1, 2, 3));
        assert_eq!(accumulate_adf(&skipped, &params).unwrap().total(), 0);

        // Swapping the labels so the K particle comes after J counts it.
        let counted = typed_frame(positions, &[2, 1, 3], 10.0);
        assert_eq!(accumulate_adf(&counted, &params).unwrap().total(), 1);
    }

    #[test]
    fn test_empty_histogram_is_an_error() {
        let traj = typed_frame(vec![[0.0; 3], [1.0, 0.0, 0.0]], &[1, 1], 10.0);
        let params = AdfParams::new(TypeTriplet::new(1, 1, 1));
        let err = compute_adf(&traj, &params).unwrap_err();
        assert!(matches!(err, Error::EmptyHistogram { .. }));
        assert_eq!(err.stage(), mdcorr_core::Stage::Normalization);
    }

    #[test]
    fn test_cutoff_excludes_long_bonds() {
        let traj = typed_frame(
            vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 3.0, 0.0]],
            &[1, 1, 1],
            20.0,
        );
        let params = AdfParams {
            sigma: 2.0,
            ..AdfParams::new(TypeTriplet::new(1, 1, 1))
        };
        // Every candidate triplet has one bond of length 3.0 or sqrt(10).
        assert_eq!(accumulate_adf(&traj, &params).unwrap().total(), 0);
    }

    #[test]
    fn test_degenerate_policy() {
        // Particle 1 sits on top of the center.
        let positions = vec![
            [0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0],
            [1.5, 0.0, 0.0],
            [0.0, 1.5, 0.0],
        ];
        let traj = typed_frame(positions, &[2, 1, 1, 1], 10.0);

        let skip = AdfParams::new(TypeTriplet::new(1, 2, 1));
        let counts = accumulate_adf(&traj, &skip).unwrap();
        // (1,2) and (1,3) are degenerate, (2,3) is a right angle.
        assert_eq!(counts.degenerate_triplets, 2);
        assert_eq!(counts.total(), 1);
        assert_eq!(counts.hist.counts()[180], 1);

        let fail = AdfParams {
            degenerate: DegeneratePolicy::Fail,
            ..skip
        };
        match accumulate_adf(&traj, &fail).unwrap_err() {
            Error::DegenerateGeometry {
                frame,
                center,
                first,
                second,
            } => {
                assert_eq!((frame, center, first, second), (0, 0, 1, 2));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_fail_policy_reports_first_frame_in_parallel() {
        let clean = vec![[0.0; 3], [1.5, 0.0, 0.0], [0.0, 1.5, 0.0]];
        let overlapping = vec![[0.0; 3], [0.0; 3], [0.0, 1.5, 0.0]];
        let frames = (0..16)
            .map(|f| {
                let positions = if f < 3 { clean.clone() } else { overlapping.clone() };
                Frame::new(f as i64, positions)
            })
            .collect();
        let traj = Trajectory::new(
            frames,
            PeriodicBox::new([10.0, 10.0, 10.0]).unwrap(),
            Some(vec![AtomType(2), AtomType(1), AtomType(1)]),
        )
        .unwrap();
        let params = AdfParams {
            degenerate: DegeneratePolicy::Fail,
            parallel: true,
            ..AdfParams::new(TypeTriplet::new(1, 2, 1))
        };
        for _ in 0..8 {
            match accumulate_adf(&traj, &params).unwrap_err() {
                Error::DegenerateGeometry { frame, .. } => assert_eq!(frame, 3),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_tiny_angle_bin_is_rejected() {
        let traj = typed_frame(
            vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            &[2, 1, 1],
            10.0,
        );
        let params = AdfParams {
            dang: 1e-300,
            ..AdfParams::new(TypeTriplet::new(1, 2, 1))
        };
        assert!(matches!(
            accumulate_adf(&traj, &params),
            Err(Error::InvalidParameter { name: "dang", .. })
        ));
    }

    #[test]
    fn test_requires_type_labels() {
        let traj = Trajectory::new(
            vec![Frame::new(0, vec![[0.0; 3]])],
            PeriodicBox::new([5.0, 5.0, 5.0]).unwrap(),
            None,
        )
        .unwrap();
        let err = accumulate_adf(&traj, &AdfParams::new(TypeTriplet::new(1, 1, 1))).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidParameter {
                name: "trajectory",
                ..
            }
        ));
    }

    #[test]
    fn test_default_file_name() {
        let traj = typed_frame(
            vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            &[2, 1, 3],
            10.0,
        );
        let result = compute_adf(&traj, &AdfParams::new(TypeTriplet::new(1, 2, 3))).unwrap();
        assert_eq!(result.default_file_name(), "adf_123.dat");
        assert!((result.angles_radians()[360] - std::f64::consts::PI).abs() < 1e-12);
    }
}
