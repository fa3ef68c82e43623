//! LAMMPS text dump (`.lammpstrj`) reader.
//!
//! Each frame is a 9-line header followed by one whitespace separated row
//! per particle:
//!
//! ```text
//! ITEM: TIMESTEP
//! 1000
//! ITEM: NUMBER OF ATOMS
//! 3
//! ITEM: BOX BOUNDS pp pp pp
//! 0.0 20.0
//! 0.0 20.0
//! 0.0 20.0
//! ITEM: ATOMS id type x y z fx fy fz
//! 1 1 0.0 0.0 0.0 0.0 0.0 0.0
//! ...
//! ```
//!
//! Box edges are `hi - lo`. The box and the type labels are taken from the
//! first frame; later frames must carry the same labels.

use super::{AtomType, Frame, Trajectory};
use crate::error::{Error, Result};
use crate::periodic::PeriodicBox;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Header lines preceding the particle rows of every frame.
pub const HEADER_LINES: usize = 9;

/// Which columns of a particle row hold what (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    /// Integer type label, if present.
    pub type_column: Option<usize>,
    /// First of three consecutive position columns.
    pub position_column: usize,
    /// First of three consecutive force columns, if present.
    pub force_column: Option<usize>,
}

impl ColumnLayout {
    /// `id x y z fx fy fz`
    pub fn id_xyz_forces() -> Self {
        Self {
            type_column: None,
            position_column: 1,
            force_column: Some(4),
        }
    }

    /// `id type x y z fx fy fz`
    pub fn id_type_xyz_forces() -> Self {
        Self {
            type_column: Some(1),
            position_column: 2,
            force_column: Some(5),
        }
    }

    /// Minimum number of columns a row must have.
    pub fn min_columns(&self) -> usize {
        let mut n = self.position_column + 3;
        if let Some(t) = self.type_column {
            n = n.max(t + 1);
        }
        if let Some(f) = self.force_column {
            n = n.max(f + 3);
        }
        n
    }
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self::id_type_xyz_forces()
    }
}

/// Streaming reader for LAMMPS text dumps.
pub struct LammpsDumpReader<R> {
    reader: R,
    layout: ColumnLayout,
    line_no: usize,
    current_frame: usize,
    n_atoms: Option<usize>,
    periodic_box: Option<PeriodicBox>,
    atom_types: Option<Vec<AtomType>>,
    box_warned: bool,
}

impl LammpsDumpReader<BufReader<File>> {
    /// Open a dump file for reading.
    pub fn open<P: AsRef<Path>>(path: P, layout: ColumnLayout) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(BufReader::new(file), layout))
    }
}

impl<R: BufRead> LammpsDumpReader<R> {
    pub fn new(reader: R, layout: ColumnLayout) -> Self {
        Self {
            reader,
            layout,
            line_no: 0,
            current_frame: 0,
            n_atoms: None,
            periodic_box: None,
            atom_types: None,
            box_warned: false,
        }
    }

    /// Particle count declared by the first frame.
    pub fn n_atoms(&self) -> Option<usize> {
        self.n_atoms
    }

    /// Box read from the first frame.
    pub fn periodic_box(&self) -> Option<&PeriodicBox> {
        self.periodic_box.as_ref()
    }

    /// Type labels read from the first frame.
    pub fn atom_types(&self) -> Option<&[AtomType]> {
        self.atom_types.as_deref()
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// Read the next frame. Returns `None` at end of file.
    pub fn read_frame(&mut self) -> Result<Option<Frame>> {
        // Blank lines between frames or at the end of the file are tolerated.
        let first = loop {
            match self.next_line()? {
                None => return Ok(None),
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => break line,
            }
        };
        self.expect_item(&first, "TIMESTEP")?;

        let line = self.require_line("timestep")?;
        let timestep: i64 = line.trim().parse().map_err(|_| {
            Error::parse(
                self.line_no,
                format!("expected an integer timestep, found '{}'", line.trim()),
            )
        })?;

        let line = self.require_line("ITEM: NUMBER OF ATOMS")?;
        self.expect_item(&line, "NUMBER OF ATOMS")?;
        let line = self.require_line("atom count")?;
        let n_atoms: usize = line.trim().parse().map_err(|_| {
            Error::parse(
                self.line_no,
                format!("expected an integer atom count, found '{}'", line.trim()),
            )
        })?;
        match self.n_atoms {
            None => self.n_atoms = Some(n_atoms),
            Some(expected) if expected != n_atoms => {
                return Err(Error::parse(
                    self.line_no,
                    format!(
                        "frame {} declares {} atoms but the first frame declared {}",
                        self.current_frame, n_atoms, expected
                    ),
                ));
            }
            Some(_) => {}
        }

        let line = self.require_line("ITEM: BOX BOUNDS")?;
        self.expect_item(&line, "BOX BOUNDS")?;
        if line.split_whitespace().any(|t| t == "xy" || t == "xz" || t == "yz") {
            return Err(Error::parse(
                self.line_no,
                "triclinic boxes are not supported",
            ));
        }
        let mut bounds = [[0.0f64; 2]; 3];
        for axis_bounds in bounds.iter_mut() {
            let line = self.require_line("box bounds")?;
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 2 {
                return Err(Error::parse(
                    self.line_no,
                    format!("expected '<lo> <hi>' box bounds, found '{}'", line.trim()),
                ));
            }
            axis_bounds[0] = self.parse_float(fields[0])?;
            axis_bounds[1] = self.parse_float(fields[1])?;
        }
        let frame_box = PeriodicBox::from_bounds(bounds)
            .map_err(|e| Error::parse(self.line_no, e.to_string()))?;
        match &self.periodic_box {
            None => self.periodic_box = Some(frame_box),
            Some(first_box) => {
                if !self.box_warned && !same_box(first_box, &frame_box) {
                    log::warn!(
                        "Box changes at frame {} ({:?} -> {:?}); using the first frame's box for all frames",
                        self.current_frame,
                        first_box.lengths(),
                        frame_box.lengths(),
                    );
                    self.box_warned = true;
                }
            }
        }

        let line = self.require_line("ITEM: ATOMS")?;
        self.expect_item(&line, "ATOMS")?;

        let min_columns = self.layout.min_columns();
        let mut positions = Vec::with_capacity(n_atoms);
        let mut forces = self
            .layout
            .force_column
            .map(|_| Vec::with_capacity(n_atoms));
        let mut types = self.layout.type_column.map(|_| Vec::with_capacity(n_atoms));

        for atom in 0..n_atoms {
            let line = self.next_line()?.ok_or_else(|| {
                Error::parse(
                    self.line_no,
                    format!(
                        "unexpected end of file in frame {} (read {}/{} atom rows)",
                        self.current_frame, atom, n_atoms
                    ),
                )
            })?;
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < min_columns {
                return Err(Error::parse(
                    self.line_no,
                    format!(
                        "expected at least {} columns, found {}",
                        min_columns,
                        fields.len()
                    ),
                ));
            }

            positions.push(self.parse_vec3(&fields, self.layout.position_column)?);
            if let (Some(col), Some(out)) = (self.layout.force_column, forces.as_mut()) {
                out.push(self.parse_vec3(&fields, col)?);
            }
            if let (Some(col), Some(out)) = (self.layout.type_column, types.as_mut()) {
                let label = parse_type(fields[col]).ok_or_else(|| {
                    Error::parse(
                        self.line_no,
                        format!("expected an integer type label, found '{}'", fields[col]),
                    )
                })?;
                out.push(label);
            }
        }

        if let Some(types) = types {
            match &self.atom_types {
                None => self.atom_types = Some(types),
                Some(first) => {
                    if let Some(idx) = first.iter().zip(types.iter()).position(|(a, b)| a != b) {
                        // Row of the offending particle within this frame.
                        let line = self.line_no - n_atoms + idx + 1;
                        return Err(Error::parse(
                            line,
                            format!(
                                "type label of particle {} changed from {} to {} in frame {}",
                                idx, first[idx], types[idx], self.current_frame
                            ),
                        ));
                    }
                }
            }
        }

        let mut frame = Frame::new(timestep, positions);
        if let Some(forces) = forces {
            frame = frame.with_forces(forces);
        }

        log::debug!(
            "Read frame {} (timestep {}, {} atoms)",
            self.current_frame,
            timestep,
            n_atoms
        );
        self.current_frame += 1;
        Ok(Some(frame))
    }

    /// Read every remaining frame into a [`Trajectory`].
    pub fn read_all(mut self) -> Result<Trajectory> {
        let mut frames = Vec::new();
        while let Some(frame) = self.read_frame()? {
            frames.push(frame);
        }
        let periodic_box = match (frames.is_empty(), self.periodic_box) {
            (false, Some(b)) => b,
            _ => return Err(Error::parse(1, "no frames found in trajectory")),
        };
        Trajectory::new(frames, periodic_box, self.atom_types)
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let bytes = self.reader.read_line(&mut line)?;
        if bytes == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        let trimmed_len = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed_len);
        Ok(Some(line))
    }

    fn require_line(&mut self, what: &str) -> Result<String> {
        self.next_line()?.ok_or_else(|| {
            Error::parse(
                self.line_no + 1,
                format!(
                    "unexpected end of file in frame {} header (expected {})",
                    self.current_frame, what
                ),
            )
        })
    }

    fn expect_item(&self, line: &str, item: &str) -> Result<()> {
        let rest = line.trim_start().strip_prefix("ITEM:").map(str::trim_start);
        match rest {
            Some(rest) if rest.starts_with(item) => Ok(()),
            _ => Err(Error::parse(
                self.line_no,
                format!("expected 'ITEM: {}', found '{}'", item, line.trim()),
            )),
        }
    }

    fn parse_float(&self, field: &str) -> Result<f64> {
        field.parse::<f64>().map_err(|_| {
            Error::parse(
                self.line_no,
                format!("expected a number, found '{}'", field),
            )
        })
    }

    fn parse_vec3(&self, fields: &[&str], start: usize) -> Result<[f64; 3]> {
        Ok([
            self.parse_float(fields[start])?,
            self.parse_float(fields[start + 1])?,
            self.parse_float(fields[start + 2])?,
        ])
    }
}

/// Accept `2` as well as `2.0`, reject `2.5`.
fn parse_type(field: &str) -> Option<AtomType> {
    if let Ok(v) = field.parse::<i32>() {
        return Some(AtomType(v));
    }
    let v: f64 = field.parse().ok()?;
    if v.fract() == 0.0 && v >= i32::MIN as f64 && v <= i32::MAX as f64 {
        Some(AtomType(v as i32))
    } else {
        None
    }
}

fn same_box(a: &PeriodicBox, b: &PeriodicBox) -> bool {
    a.lengths()
        .iter()
        .zip(b.lengths().iter())
        .all(|(x, y)| (x - y).abs() <= 1e-9 * x.abs().max(1.0))
}

/// Read a whole LAMMPS dump file into memory.
pub fn read_lammpstrj<P: AsRef<Path>>(path: P, layout: ColumnLayout) -> Result<Trajectory> {
    let path = path.as_ref();
    let trajectory = LammpsDumpReader::open(path, layout)?.read_all()?;
    log::info!(
        "Loaded {}: {} frames, {} atoms, box {:?}",
        path.display(),
        trajectory.n_frames(),
        trajectory.n_atoms(),
        trajectory.periodic_box().lengths(),
    );
    Ok(trajectory)
}
