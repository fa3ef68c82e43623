//! In-memory trajectory storage and readers.
//!
//! Provides native Rust readers for molecular dynamics trajectory files:
//! - LAMMPS text dump (`.lammpstrj`)

pub mod lammpstrj;

pub use lammpstrj::{read_lammpstrj, ColumnLayout, LammpsDumpReader};

use crate::error::{Error, Result};
use crate::periodic::PeriodicBox;
use std::fmt;

/// Integer particle type label as written in the dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomType(pub i32);

impl fmt::Display for AtomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One snapshot of the system.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Timestep recorded in the frame header.
    pub timestep: i64,
    pub positions: Vec<[f64; 3]>,
    pub forces: Option<Vec<[f64; 3]>>,
}

impl Frame {
    pub fn new(timestep: i64, positions: Vec<[f64; 3]>) -> Self {
        Self {
            timestep,
            positions,
            forces: None,
        }
    }

    pub fn with_forces(mut self, forces: Vec<[f64; 3]>) -> Self {
        self.forces = Some(forces);
        self
    }

    pub fn n_atoms(&self) -> usize {
        self.positions.len()
    }
}

/// Immutable sequence of frames sharing particle count, box and type labels.
#[derive(Debug, Clone)]
pub struct Trajectory {
    frames: Vec<Frame>,
    n_atoms: usize,
    periodic_box: PeriodicBox,
    atom_types: Option<Vec<AtomType>>,
}

impl Trajectory {
    /// Validate and assemble a trajectory.
    ///
    /// Every frame must hold the same number of particles, force arrays must
    /// match it, and type labels (when given) must cover every particle.
    pub fn new(
        frames: Vec<Frame>,
        periodic_box: PeriodicBox,
        atom_types: Option<Vec<AtomType>>,
    ) -> Result<Self> {
        let n_atoms = frames.first().map(Frame::n_atoms).unwrap_or(0);

        for (idx, frame) in frames.iter().enumerate() {
            if frame.n_atoms() != n_atoms {
                return Err(Error::InvalidTrajectory(format!(
                    "frame {} has {} particles, expected {}",
                    idx,
                    frame.n_atoms(),
                    n_atoms
                )));
            }
            if let Some(forces) = &frame.forces {
                if forces.len() != n_atoms {
                    return Err(Error::InvalidTrajectory(format!(
                        "frame {} has {} force vectors for {} particles",
                        idx,
                        forces.len(),
                        n_atoms
                    )));
                }
            }
        }

        if let Some(types) = &atom_types {
            if !frames.is_empty() && types.len() != n_atoms {
                return Err(Error::InvalidTrajectory(format!(
                    "{} type labels given for {} particles",
                    types.len(),
                    n_atoms
                )));
            }
        }

        Ok(Self {
            frames,
            n_atoms,
            periodic_box,
            atom_types,
        })
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn n_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn n_atoms(&self) -> usize {
        self.n_atoms
    }

    pub fn periodic_box(&self) -> &PeriodicBox {
        &self.periodic_box
    }

    /// Per-particle type labels, if the source provided them.
    pub fn atom_types(&self) -> Option<&[AtomType]> {
        self.atom_types.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
