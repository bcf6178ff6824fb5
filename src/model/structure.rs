// src/model/structure.rs

use crate::error::{Error, Result};
use crate::model::constraint::{Axis, Constraint, Flag, MOVABLE};
use crate::utils::linalg::{self, Basis};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    // Lattice vectors: [a_vec, b_vec, c_vec]
    pub basis: Basis,
    pub scale: f64,
}

impl Lattice {
    pub fn new(basis: Basis, scale: f64) -> Self {
        Self { basis, scale }
    }

    pub fn scaled_basis(&self) -> Basis {
        linalg::scale_basis(&self.basis, self.scale)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CoordinateMode {
    #[default]
    Direct,
    Cartesian,
}

impl CoordinateMode {
    /// POSCAR convention: a mode line starting with C or K means Cartesian.
    pub fn from_line(line: &str) -> Self {
        match line.trim_start().chars().next() {
            Some('C' | 'c' | 'K' | 'k') => CoordinateMode::Cartesian,
            _ => CoordinateMode::Direct,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CoordinateMode::Direct => "Direct",
            CoordinateMode::Cartesian => "Cartesian",
        }
    }
}

/// A set of atoms grouped by type. Rows of `coordinates` (and
/// `constraints`) are contiguous per type, in `atom_types` order.
/// Serialize-only: every instance comes from a checked constructor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtomicSystem {
    atom_types: Vec<String>,
    atom_counts: Vec<usize>,
    total_count: usize,
    coordinates: Vec<[f64; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    constraints: Option<Vec<Constraint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lattice: Option<Lattice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frame_index: Option<i64>,
    mode: CoordinateMode,
}

impl AtomicSystem {
    /// Grouping declared by a header (POSCAR, XDATCAR): types and counts are
    /// taken as given and rows are assumed to already be in block order.
    pub fn from_declared_counts(
        atom_types: Vec<String>,
        atom_counts: Vec<usize>,
        coordinates: Vec<[f64; 3]>,
    ) -> Result<Self> {
        if atom_types.len() != atom_counts.len() {
            return Err(Error::ShapeMismatch {
                expected: atom_types.len(),
                found: atom_counts.len(),
            });
        }
        check_unique(&atom_types)?;

        let system = Self {
            total_count: atom_counts.iter().sum(),
            atom_types,
            atom_counts,
            coordinates,
            constraints: None,
            lattice: None,
            frame_index: None,
            mode: CoordinateMode::Direct,
        };
        system.verify()?;
        Ok(system)
    }

    /// Grouping derived from per-row labels (XYZ, CIF): types in first-seen
    /// order, rows stably regrouped into per-type blocks. `declared_total`
    /// is the count the file claims and is checked against the rows.
    pub fn from_labeled_rows<S: AsRef<str>>(
        declared_total: usize,
        labels: &[S],
        rows: Vec<[f64; 3]>,
    ) -> Result<Self> {
        if labels.len() != rows.len() {
            return Err(Error::ShapeMismatch {
                expected: rows.len(),
                found: labels.len(),
            });
        }
        let (atom_types, atom_counts, order) = first_seen_grouping(labels);
        let coordinates = order.iter().map(|&i| rows[i]).collect();

        let system = Self {
            atom_types,
            atom_counts,
            total_count: declared_total,
            coordinates,
            constraints: None,
            lattice: None,
            frame_index: None,
            mode: CoordinateMode::Cartesian,
        };
        system.verify()?;
        Ok(system)
    }

    pub fn with_constraints(mut self, constraints: Vec<Constraint>) -> Result<Self> {
        if constraints.len() != self.total_count {
            return Err(Error::ShapeMismatch {
                expected: self.total_count,
                found: constraints.len(),
            });
        }
        self.constraints = Some(constraints);
        Ok(self)
    }

    pub fn with_lattice(mut self, lattice: Lattice) -> Self {
        self.lattice = Some(lattice);
        self
    }

    pub fn with_frame_index(mut self, frame_index: i64) -> Self {
        self.frame_index = Some(frame_index);
        self
    }

    pub fn with_mode(mut self, mode: CoordinateMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn atom_types(&self) -> &[String] {
        &self.atom_types
    }

    pub fn atom_counts(&self) -> &[usize] {
        &self.atom_counts
    }

    #[inline]
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn coordinates(&self) -> &[[f64; 3]] {
        &self.coordinates
    }

    pub fn constraints(&self) -> Option<&[Constraint]> {
        self.constraints.as_deref()
    }

    /// Constraints with the all-movable default filled in.
    pub fn effective_constraints(&self) -> Vec<Constraint> {
        match &self.constraints {
            Some(c) => c.clone(),
            None => vec![MOVABLE; self.total_count],
        }
    }

    pub fn lattice(&self) -> Option<&Lattice> {
        self.lattice.as_ref()
    }

    pub fn frame_index(&self) -> Option<i64> {
        self.frame_index
    }

    pub fn set_frame_index(&mut self, frame_index: i64) {
        self.frame_index = Some(frame_index);
    }

    pub fn mode(&self) -> CoordinateMode {
        self.mode
    }

    #[inline]
    pub fn is_periodic(&self) -> bool {
        self.lattice.is_some()
    }

    /// (type, count) pairs in type order.
    pub fn natoms(&self) -> Vec<(&str, usize)> {
        self.atom_types
            .iter()
            .map(String::as_str)
            .zip(self.atom_counts.iter().copied())
            .collect()
    }

    /// Checks that the declared total agrees with the rows held.
    pub fn verify(&self) -> Result<()> {
        if self.coordinates.len() != self.total_count {
            return Err(Error::StructureValue {
                declared: self.total_count,
                found: self.coordinates.len(),
            });
        }
        let summed: usize = self.atom_counts.iter().sum();
        if summed != self.total_count {
            return Err(Error::StructureValue {
                declared: self.total_count,
                found: summed,
            });
        }
        if let Some(c) = &self.constraints {
            if c.len() != self.total_count {
                return Err(Error::ShapeMismatch {
                    expected: self.total_count,
                    found: c.len(),
                });
            }
        }
        Ok(())
    }

    /// Row range of each type block, from the prefix sums of `atom_counts`.
    pub fn blocks(&self) -> impl Iterator<Item = (&str, Range<usize>)> + '_ {
        let mut start = 0;
        self.atom_types
            .iter()
            .zip(self.atom_counts.iter())
            .map(move |(t, &n)| {
                let range = start..start + n;
                start += n;
                (t.as_str(), range)
            })
    }

    pub fn group_by_type<'s, 'r, T>(&'s self, rows: &'r [T]) -> Result<HashMap<&'s str, &'r [T]>> {
        if rows.len() != self.total_count {
            return Err(Error::ShapeMismatch {
                expected: self.total_count,
                found: rows.len(),
            });
        }
        Ok(self
            .blocks()
            .map(|(t, range)| (t, &rows[range]))
            .collect())
    }

    /// Atom type → coordinate rows.
    pub fn atomco_dict(&self) -> Result<HashMap<&str, &[[f64; 3]]>> {
        self.group_by_type(&self.coordinates)
    }

    /// Atom type → constraint rows (defaults filled in).
    pub fn constraint_dict(&self) -> Result<HashMap<&str, Vec<Constraint>>> {
        let effective = self.effective_constraints();
        let grouped = self.group_by_type(&effective)?;
        Ok(grouped.into_iter().map(|(t, rows)| (t, rows.to_vec())).collect())
    }

    /// Number of rows per flag pattern, keyed like "T,T,F".
    pub fn constraint_summary(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for c in self.effective_constraints() {
            let key = format!("{},{},{}", c[0], c[1], c[2]);
            *counts.entry(key).or_insert(0) += 1;
        }
        counts
    }

    /// Sets `axis` of every row of `atom_type` to `flag`. An absent type
    /// leaves the system untouched and returns false.
    pub fn constrain_atom_type(&mut self, atom_type: &str, flag: Flag, axis: Axis) -> bool {
        let Some(range) = self
            .blocks()
            .find(|(t, _)| *t == atom_type)
            .map(|(_, r)| r)
        else {
            log::warn!("No atoms of type '{}'; constraints unchanged", atom_type);
            return false;
        };

        let total = self.total_count;
        let constraints = self
            .constraints
            .get_or_insert_with(|| vec![MOVABLE; total]);
        for row in &mut constraints[range] {
            for &col in axis.columns() {
                row[col] = flag;
            }
        }
        true
    }

    pub fn volume(&self) -> Result<f64> {
        let lattice = self.lattice.as_ref();
        linalg::cell_volume(lattice.map(|l| &l.basis), lattice.map_or(1.0, |l| l.scale))
    }

    /// Converts direct coordinates to Cartesian in place.
    pub fn to_cartesian(&mut self) -> Result<()> {
        let lattice = self.lattice.ok_or(Error::MissingLattice)?;
        if self.mode == CoordinateMode::Direct {
            self.coordinates = linalg::direct_to_cartesian(&lattice.scaled_basis(), &self.coordinates);
            self.mode = CoordinateMode::Cartesian;
        }
        Ok(())
    }

    /// Converts Cartesian coordinates to direct in place. The system is left
    /// unchanged if the basis is singular.
    pub fn to_direct(&mut self) -> Result<()> {
        let lattice = self.lattice.ok_or(Error::MissingLattice)?;
        if self.mode == CoordinateMode::Cartesian {
            self.coordinates = linalg::cartesian_to_direct(&lattice.scaled_basis(), &self.coordinates)?;
            self.mode = CoordinateMode::Direct;
        }
        Ok(())
    }
}

fn check_unique(atom_types: &[String]) -> Result<()> {
    for (i, t) in atom_types.iter().enumerate() {
        if atom_types[..i].contains(t) {
            return Err(Error::DuplicateType(t.clone()));
        }
    }
    Ok(())
}

/// Distinct labels in first-seen order, their counts, and the stable
/// permutation that brings rows into per-type blocks.
pub(crate) fn first_seen_grouping<S: AsRef<str>>(labels: &[S]) -> (Vec<String>, Vec<usize>, Vec<usize>) {
    let mut types: Vec<String> = Vec::new();
    let mut members: Vec<Vec<usize>> = Vec::new();

    for (i, label) in labels.iter().enumerate() {
        let label = label.as_ref();
        match types.iter().position(|t| t == label) {
            Some(k) => members[k].push(i),
            None => {
                types.push(label.to_string());
                members.push(vec![i]);
            }
        }
    }

    let counts = members.iter().map(Vec::len).collect();
    let order = members.into_iter().flatten().collect();
    (types, counts, order)
}
