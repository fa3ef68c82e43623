//! Core library for md-correlation.
//!
//! Pure Rust building blocks with no Python dependencies: in-memory
//! trajectories, the LAMMPS dump reader, minimum-image geometry in an
//! orthorhombic box, and fixed-width histograms.

pub mod error;
pub mod histogram;
pub mod periodic;
pub mod trajectory;
pub mod util;

pub use error::{Error, Result, Stage};
pub use histogram::{CorrelationResult, Histogram};
pub use periodic::PeriodicBox;
pub use trajectory::{AtomType, Frame, Trajectory};
