// src/io/cif.rs
//
// Crystal-table reader. The document is cut at every `loop_` line; the
// first segment carries `_key value` attributes and the last one holds the
// atom-site table.

use crate::error::{Error, Result};
use crate::io::Format;
use crate::model::structure::first_seen_grouping;
use crate::model::{AtomicSystem, CoordinateMode, Lattice};
use crate::utils::linalg;
use crate::utils::tokens;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CellParameters {
    pub length_a: Option<f64>,
    pub length_b: Option<f64>,
    pub length_c: Option<f64>,
    pub angle_alpha: Option<f64>,
    pub angle_beta: Option<f64>,
    pub angle_gamma: Option<f64>,
}

impl CellParameters {
    fn slot(&mut self, key: &str) -> Option<&mut Option<f64>> {
        match key {
            "cell_length_a" => Some(&mut self.length_a),
            "cell_length_b" => Some(&mut self.length_b),
            "cell_length_c" => Some(&mut self.length_c),
            "cell_angle_alpha" => Some(&mut self.angle_alpha),
            "cell_angle_beta" => Some(&mut self.angle_beta),
            "cell_angle_gamma" => Some(&mut self.angle_gamma),
            _ => None,
        }
    }

    /// Lattice vectors (a along x, b in the xy-plane), once all six are known.
    pub fn basis(&self) -> Option<linalg::Basis> {
        Some(linalg::basis_from_parameters(
            self.length_a?,
            self.length_b?,
            self.length_c?,
            self.angle_alpha?,
            self.angle_beta?,
            self.angle_gamma?,
        ))
    }
}

#[derive(Debug, Clone)]
pub struct CifFile {
    pub cell: CellParameters,
    /// Non-numeric header attributes, keyed without the leading underscore
    pub attributes: BTreeMap<String, String>,
    /// Atom-site column headers
    pub titles: Vec<String>,
    /// Site labels, in the row order of `system`
    pub atom_names: Vec<String>,
    pub system: AtomicSystem,
}

pub fn parse(path: &Path) -> Result<CifFile> {
    let file = File::open(path)?;
    let cif = read(BufReader::new(file))?;
    log::info!(
        "Loaded {} sites ({} types) from {}",
        cif.system.total_count(),
        cif.system.atom_types().len(),
        path.display()
    );
    Ok(cif)
}

/// "5.431(2)" -> 5.431
fn strip_uncertainty(value: &str) -> &str {
    match value.find('(') {
        Some(i) if value.ends_with(')') => &value[..i],
        _ => value,
    }
}

pub fn read<R: BufRead>(reader: R) -> Result<CifFile> {
    let lines: Vec<String> = reader.lines().collect::<std::io::Result<_>>()?;

    // Segment boundaries as (first line index, end index)
    let mut segments = Vec::new();
    let mut start = 0;
    for (i, line) in lines.iter().enumerate() {
        if line.starts_with("loop_") {
            segments.push((start, i));
            start = i + 1;
        }
    }
    segments.push((start, lines.len()));

    let attribute_re = Regex::new(r"^_(\w+)\s+(.+)$").map_err(|e| Error::parse(Format::Cif, 0, e.to_string()))?;

    let mut cell = CellParameters::default();
    let mut attributes = BTreeMap::new();
    let (first_start, first_end) = segments[0];
    for (i, raw) in lines[first_start..first_end].iter().enumerate() {
        let line_no = first_start + i + 1;
        let line = raw.trim();
        if !line.starts_with('_') {
            continue;
        }
        let Some(caps) = attribute_re.captures(line) else {
            log::warn!("CIF line {}: skipping attribute without value: {}", line_no, line);
            continue;
        };
        let key = &caps[1];
        let value = caps[2].trim();
        match cell.slot(key) {
            Some(slot) => {
                *slot = Some(tokens::parse_f64(strip_uncertainty(value), Format::Cif, line_no)?);
            }
            None => {
                attributes.insert(key.to_string(), value.to_string());
            }
        }
        log::debug!("{} = {}", key, value);
    }

    let mut titles = Vec::new();
    let mut names = Vec::new();
    let mut labels = Vec::new();
    let mut rows = Vec::new();
    // A file without any loop_ has no atom table
    if segments.len() > 1 {
        let (last_start, last_end) = segments[segments.len() - 1];
        for (i, raw) in lines[last_start..last_end].iter().enumerate() {
            let line_no = last_start + i + 1;
            let line = raw.trim();
            if let Some(title) = line.strip_prefix('_') {
                titles.push(title.to_string());
                continue;
            }
            let parts = tokens::str2list(line);
            if parts.is_empty() {
                continue;
            }
            if parts.len() < 8 {
                return Err(Error::parse(
                    Format::Cif,
                    line_no,
                    format!("atom-site row needs 8 columns, found {}", parts.len()),
                ));
            }
            let xyz: Vec<&str> = parts[2..5].iter().map(|v| strip_uncertainty(v)).collect();
            rows.push(tokens::parse_row3(&xyz, Format::Cif, line_no)?);
            names.push(parts[0].to_string());
            labels.push(parts[7].to_string());
        }
    }

    let (_, _, order) = first_seen_grouping(&labels);
    let atom_names = order.iter().map(|&i| names[i].clone()).collect();

    let mut system = AtomicSystem::from_labeled_rows(rows.len(), &labels, rows)?.with_mode(CoordinateMode::Direct);
    if let Some(basis) = cell.basis() {
        system = system.with_lattice(Lattice::new(basis, 1.0));
    } else {
        log::debug!("CIF cell incomplete; no lattice attached");
    }

    Ok(CifFile {
        cell,
        attributes,
        titles,
        atom_names,
        system,
    })
}
