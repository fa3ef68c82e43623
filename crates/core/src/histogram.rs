//! Fixed-width histograms and normalized correlation results.

use crate::error::{Error, Result};

/// Fixed-width histogram of non-negative integer counts over `[min, min + nbin * width)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    min: f64,
    width: f64,
    counts: Vec<u64>,
}

impl Histogram {
    /// Create a zero-filled histogram with `nbin` bins of `width` starting at `min`.
    pub fn new(min: f64, width: f64, nbin: usize) -> Result<Self> {
        if !(width.is_finite() && width > 0.0) {
            return Err(Error::invalid_parameter(
                "bin width",
                format!("must be positive and finite, got {}", width),
            ));
        }
        if !min.is_finite() {
            return Err(Error::invalid_parameter(
                "bin origin",
                format!("must be finite, got {}", min),
            ));
        }
        Ok(Self {
            min,
            width,
            counts: vec![0; nbin],
        })
    }

    /// Same binning, all counts zero.
    pub fn empty_like(&self) -> Self {
        Self {
            min: self.min,
            width: self.width,
            counts: vec![0; self.counts.len()],
        }
    }

    /// Bin index `floor((x - min) / width)`, or `None` if outside `[0, nbin)`.
    #[inline]
    pub fn bin_index(&self, x: f64) -> Option<usize> {
        let b = ((x - self.min) / self.width).floor();
        if b >= 0.0 && b < self.counts.len() as f64 {
            Some(b as usize)
        } else {
            None
        }
    }

    /// Add `weight` to the bin containing `x`. Returns false when `x` falls outside.
    #[inline]
    pub fn add(&mut self, x: f64, weight: u64) -> bool {
        match self.bin_index(x) {
            Some(b) => {
                self.counts[b] += weight;
                true
            }
            None => false,
        }
    }

    /// Sum another histogram with identical binning into this one.
    pub fn merge(&mut self, other: &Histogram) -> Result<()> {
        if self.counts.len() != other.counts.len()
            || self.min != other.min
            || self.width != other.width
        {
            return Err(Error::invalid_parameter(
                "histogram",
                "cannot merge histograms with different binning",
            ));
        }
        for (a, b) in self.counts.iter_mut().zip(other.counts.iter()) {
            *a += *b;
        }
        Ok(())
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn nbin(&self) -> usize {
        self.counts.len()
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Normalized correlation function.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationResult {
    /// Abscissa for each bin (distance or angle).
    pub bin_centers: Vec<f64>,
    /// Normalized value per bin.
    pub values: Vec<f64>,
    /// Sum of raw increments that landed in a bin.
    pub total_count: u64,
}
