use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use mdcorr::adf::{compute_adf, AdfParams, DegeneratePolicy, TypeTriplet};
use mdcorr::output::RDF_FILE_NAME;
use mdcorr::rdf::{compute_rdf, RdfParams};
use mdcorr_core::trajectory::{read_lammpstrj, ColumnLayout};

use crate::cli::{AdfArgs, Command, RdfArgs};

pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Rdf(args) => run_rdf(args),
        Command::Adf(args) => run_adf(args),
    }
}

fn create_output(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn run_rdf(args: RdfArgs) -> Result<()> {
    let layout = if args.typed {
        ColumnLayout::id_type_xyz_forces()
    } else {
        ColumnLayout::id_xyz_forces()
    };
    let trajectory = read_lammpstrj(&args.common.trajectory, layout).with_context(|| {
        format!(
            "Failed to read trajectory {}",
            args.common.trajectory.display()
        )
    })?;

    let params = RdfParams {
        dr: args.dr,
        dmin: args.dmin,
        dmax: args.dmax,
        sigma: args.sigma,
        parallel: !args.common.serial,
    };
    println!(
        "dmin, dmax: {}, {}",
        params.dmin,
        params.resolved_dmax(trajectory.periodic_box())
    );

    let result = compute_rdf(&trajectory, &params).context("RDF calculation failed")?;

    let out_path = args
        .common
        .output
        .unwrap_or_else(|| PathBuf::from(RDF_FILE_NAME));
    result
        .write_dat(create_output(&out_path)?)
        .with_context(|| format!("Failed to write {}", out_path.display()))?;

    println!("Coordination number = {}", result.coordination_number);
    println!("Wrote {}", out_path.display());
    Ok(())
}

fn run_adf(args: AdfArgs) -> Result<()> {
    let trajectory = read_lammpstrj(&args.common.trajectory, ColumnLayout::id_type_xyz_forces())
        .with_context(|| {
            format!(
                "Failed to read trajectory {}",
                args.common.trajectory.display()
            )
        })?;

    let triplet = TypeTriplet::new(args.types[0], args.types[1], args.types[2]);
    let params = AdfParams {
        dang: args.dang,
        angmin: args.angmin,
        angmax: args.angmax,
        sigma: args.sigma,
        triplet,
        degenerate: if args.strict {
            DegeneratePolicy::Fail
        } else {
            DegeneratePolicy::Skip
        },
        parallel: !args.common.serial,
    };

    let result = compute_adf(&trajectory, &params)
        .with_context(|| format!("ADF calculation for triplet {} failed", triplet))?;

    let out_path = args
        .common
        .output
        .unwrap_or_else(|| PathBuf::from(result.default_file_name()));
    result
        .write_dat(create_output(&out_path)?)
        .with_context(|| format!("Failed to write {}", out_path.display()))?;

    println!(
        "Triplet {}: {} angles binned over {} frames",
        triplet,
        result.total(),
        result.n_frames
    );
    if result.degenerate_triplets > 0 {
        println!(
            "Skipped {} triplets with overlapping particles",
            result.degenerate_triplets
        );
    }
    println!("Wrote {}", out_path.display());
    Ok(())
}
