//! Spatial correlation functions for periodic MD trajectories.
//!
//! - [`rdf`]: radial distribution function g(r) and coordination number
//! - [`adf`]: angular distribution function for a J-I-K type triplet
//! - [`numeric`]: normalization, interpolation and trapezoidal integration
//! - [`output`]: `.dat` column tables

pub mod adf;
pub mod numeric;
pub mod output;
pub mod rdf;

pub use adf::{compute_adf, AdfParams, AdfResult, DegeneratePolicy, TypeTriplet};
pub use rdf::{compute_rdf, RdfParams, RdfResult};
