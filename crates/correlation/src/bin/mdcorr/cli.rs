use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "mdcorr",
    about = "Radial and angular distribution functions from LAMMPS trajectories",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Radial distribution function g(r) and coordination number
    Rdf(RdfArgs),

    /// Angular distribution function for a J-I-K type triplet
    Adf(AdfArgs),
}

/// Options shared by both commands.
#[derive(Args)]
pub struct CommonOptions {
    /// LAMMPS text dump (.lammpstrj)
    #[arg(value_name = "TRAJECTORY")]
    pub trajectory: PathBuf,

    /// Output table (defaults to rdf.dat / adf_JIK.dat)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Accumulate frames on a single thread
    #[arg(long)]
    pub serial: bool,
}

#[derive(Args)]
pub struct RdfArgs {
    #[command(flatten)]
    pub common: CommonOptions,

    /// Distance bin width
    #[arg(long, value_name = "DR", default_value = "0.02")]
    pub dr: f64,

    /// Lower edge of the first distance bin
    #[arg(long, value_name = "D", default_value = "0.0")]
    pub dmin: f64,

    /// Upper distance cutoff (default: half the box edge along x)
    #[arg(long, value_name = "D")]
    pub dmax: Option<f64>,

    /// Coordination number cutoff
    #[arg(long, value_name = "R", default_value = "3.7")]
    pub sigma: f64,

    /// Rows are `id type x y z fx fy fz` instead of `id x y z fx fy fz`
    #[arg(long)]
    pub typed: bool,
}

#[derive(Args)]
pub struct AdfArgs {
    #[command(flatten)]
    pub common: CommonOptions,

    /// Atom types J, I (center) and K
    #[arg(long, num_args = 3, value_names = ["J", "I", "K"], required = true, allow_hyphen_values = true)]
    pub types: Vec<i32>,

    /// Angle bin width in degrees
    #[arg(long, value_name = "DEG", default_value = "0.5")]
    pub dang: f64,

    /// Lower end of the angle range in degrees
    #[arg(long, value_name = "DEG", default_value = "0.0")]
    pub angmin: f64,

    /// Upper end of the angle range in degrees
    #[arg(long, value_name = "DEG", default_value = "180.0")]
    pub angmax: f64,

    /// Bond length cutoff for both neighbors
    #[arg(long, value_name = "R", default_value = "6.5")]
    pub sigma: f64,

    /// Abort on overlapping particles instead of skipping the triplet
    #[arg(long)]
    pub strict: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}
