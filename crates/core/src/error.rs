//! Error types shared by the reader, the accumulation engines and the
//! normalization helpers.

use std::fmt;
use thiserror::Error;

/// Pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parsing,
    Accumulation,
    Normalization,
    Integration,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Parsing => "parsing",
            Stage::Accumulation => "accumulation",
            Stage::Normalization => "normalization",
            Stage::Integration => "integration",
        };
        f.write_str(name)
    }
}

/// Errors produced while reading trajectories or computing correlation
/// functions.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Malformed trajectory text. `line` is 1-based.
    #[error("malformed trajectory input at line {line}: {details}")]
    Parse { line: usize, details: String },

    /// Structurally inconsistent trajectory (atom counts, box, labels).
    #[error("invalid trajectory: {0}")]
    InvalidTrajectory(String),

    #[error("invalid parameter '{name}': {details}")]
    InvalidParameter { name: &'static str, details: String },

    /// A zero-length bond vector reached the angle computation.
    #[error(
        "degenerate geometry in frame {frame}: zero-length vector for triplet \
         ({first}, {center}, {second}) centered on particle {center}"
    )]
    DegenerateGeometry {
        frame: usize,
        center: usize,
        first: usize,
        second: usize,
    },

    /// Normalization was requested for a histogram that never received a count.
    #[error("no qualifying {what} found; the histogram is empty and cannot be normalized")]
    EmptyHistogram { what: &'static str },

    #[error("all {samples} integrand samples are non-finite; nothing left to integrate")]
    NonFiniteIntegration { samples: usize },
}

impl Error {
    pub fn parse(line: usize, details: impl Into<String>) -> Self {
        Self::Parse {
            line,
            details: details.into(),
        }
    }

    pub fn invalid_parameter(name: &'static str, details: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            details: details.into(),
        }
    }

    /// The stage of the pipeline that raised this error.
    pub fn stage(&self) -> Stage {
        match self {
            Error::Io { .. } | Error::Parse { .. } | Error::InvalidTrajectory(_) => Stage::Parsing,
            Error::InvalidParameter { .. } | Error::DegenerateGeometry { .. } => {
                Stage::Accumulation
            }
            Error::EmptyHistogram { .. } => Stage::Normalization,
            Error::NonFiniteIntegration { .. } => Stage::Integration,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
