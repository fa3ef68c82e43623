//! Criterion benchmarks for RDF and ADF accumulation.
//!
//! Uses a jittered cubic lattice so the benchmarks need no input files.
//!
//! Run with: cargo bench -p mdcorr

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mdcorr::adf::{accumulate_adf, AdfParams, TypeTriplet};
use mdcorr::rdf::{accumulate_rdf, RdfParams};
use mdcorr_core::{AtomType, Frame, PeriodicBox, Trajectory};

/// Cubic lattice with `per_side³` particles, spacing 3.0, small deterministic
/// jitter per frame, and alternating type labels 1/2.
fn build_synthetic_trajectory(per_side: usize, n_frames: usize) -> Trajectory {
    let spacing = 3.0;
    let l = spacing * per_side as f64;
    let n_atoms = per_side.pow(3);

    let frames = (0..n_frames)
        .map(|f| {
            let mut positions = Vec::with_capacity(n_atoms);
            for x in 0..per_side {
                for y in 0..per_side {
                    for z in 0..per_side {
                        let idx = (x * per_side + y) * per_side + z;
                        let phase = (idx * 7 + f * 13) as f64;
                        positions.push([
                            x as f64 * spacing + 0.3 * phase.sin(),
                            y as f64 * spacing + 0.3 * (1.3 * phase).cos(),
                            z as f64 * spacing + 0.3 * (0.7 * phase).sin(),
                        ]);
                    }
                }
            }
            Frame::new(f as i64, positions)
        })
        .collect();

    let types = (0..n_atoms).map(|i| AtomType(1 + (i % 2) as i32)).collect();
    Trajectory::new(frames, PeriodicBox::new([l, l, l]).unwrap(), Some(types)).unwrap()
}

fn bench_rdf(c: &mut Criterion) {
    let mut group = c.benchmark_group("rdf_accumulate");
    for per_side in [6usize, 10] {
        let traj = build_synthetic_trajectory(per_side, 8);
        for parallel in [false, true] {
            let params = RdfParams {
                parallel,
                ..RdfParams::default()
            };
            let label = if parallel { "parallel" } else { "serial" };
            group.bench_with_input(
                BenchmarkId::new(label, traj.n_atoms()),
                &traj,
                |b, traj| b.iter(|| accumulate_rdf(black_box(traj), &params).unwrap()),
            );
        }
    }
    group.finish();
}

fn bench_adf(c: &mut Criterion) {
    let mut group = c.benchmark_group("adf_accumulate");
    group.sample_size(20);
    for per_side in [6usize, 8] {
        let traj = build_synthetic_trajectory(per_side, 4);
        let params = AdfParams {
            sigma: 4.0,
            ..AdfParams::new(TypeTriplet::new(1, 2, 1))
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(traj.n_atoms()),
            &traj,
            |b, traj| b.iter(|| accumulate_adf(black_box(traj), &params).unwrap()),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_rdf, bench_adf);
criterion_main!(benches);
