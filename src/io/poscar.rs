// src/io/poscar.rs

use crate::config::WriteOptions;
use crate::error::{Error, Result};
use crate::io::Format;
use crate::model::{AtomicSystem, Axis, Constraint, CoordinateMode, Flag, Lattice, MOVABLE};
use crate::utils::linalg::IDENTITY;
use crate::utils::tokens;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// A POSCAR/CONTCAR document.
#[derive(Debug, Clone, PartialEq)]
pub struct Poscar {
    pub title: String,
    pub system: AtomicSystem,
    /// Lines consumed by header and coordinates; trailing content
    /// (velocities, predictor block) starts here.
    pub total_lines: usize,
}

pub fn parse(path: &Path) -> Result<Poscar> {
    let file = File::open(path)?;
    let poscar = read(BufReader::new(file))?;
    log::info!(
        "Loaded {} atoms ({} types) from {}",
        poscar.system.total_count(),
        poscar.system.atom_types().len(),
        path.display()
    );
    Ok(poscar)
}

pub fn read<R: BufRead>(reader: R) -> Result<Poscar> {
    let lines = reader.lines().collect::<std::io::Result<Vec<String>>>()?;
    let line = |i: usize| line_at(&lines, i);

    let title = line(0)?.trim().to_string();

    // Scale
    let scale_tok = tokens::str2list(line(1)?);
    let scale = match scale_tok.first() {
        Some(tok) => tokens::parse_f64(tok, Format::Poscar, 2)?,
        None => return Err(Error::parse(Format::Poscar, 2, "missing scale factor")),
    };

    // Lattice
    let mut basis = [[0.0; 3]; 3];
    for (i, row) in basis.iter_mut().enumerate() {
        let ln = 3 + i;
        let parts = tokens::line2list(line(2 + i)?, Format::Poscar, ln)?;
        if parts.len() < 3 {
            return Err(Error::parse(Format::Poscar, ln, "invalid lattice line"));
        }
        row.copy_from_slice(&parts[..3]);
    }

    // Elements & Counts
    let atom_types: Vec<String> = tokens::str2list(line(5)?)
        .into_iter()
        .map(str::to_string)
        .collect();
    let atom_counts = tokens::str2list(line(6)?)
        .into_iter()
        .map(|tok| tokens::parse_usize(tok, Format::Poscar, 7))
        .collect::<Result<Vec<usize>>>()?;
    if atom_types.len() != atom_counts.len() {
        return Err(Error::parse(
            Format::Poscar,
            7,
            format!(
                "{} atom types but {} counts",
                atom_types.len(),
                atom_counts.len()
            ),
        ));
    }
    let ntot: usize = atom_counts.iter().sum();

    // Mode
    let selective = matches!(line(7)?.trim_start().chars().next(), Some('S' | 's'));
    let data_begin = if selective { 9 } else { 8 };
    let mode = CoordinateMode::from_line(line(data_begin - 1)?);

    // Atoms
    let mut coordinates = Vec::with_capacity(ntot.min(1 << 16));
    let mut constraints = Vec::with_capacity(if selective { ntot.min(1 << 16) } else { 0 });
    for (k, raw) in lines.iter().skip(data_begin).take(ntot).enumerate() {
        let ln = data_begin + k + 1;
        let parts = tokens::str2list(raw);
        coordinates.push(tokens::parse_row3(&parts, Format::Poscar, ln)?);
        if selective {
            constraints.push(parse_flags(&parts[3..], ln)?);
        }
    }

    let mut system = AtomicSystem::from_declared_counts(atom_types, atom_counts, coordinates)?
        .with_lattice(Lattice::new(basis, scale))
        .with_mode(mode);
    if selective {
        system = system.with_constraints(constraints)?;
    }

    Ok(Poscar {
        title,
        system,
        total_lines: data_begin + ntot,
    })
}

fn line_at(lines: &[String], i: usize) -> Result<&str> {
    lines
        .get(i)
        .map(String::as_str)
        .ok_or_else(|| Error::parse(Format::Poscar, i + 1, "unexpected end of file"))
}

/// Flag columns of a coordinate row; a row without flags is all-movable.
fn parse_flags(parts: &[&str], line_no: usize) -> Result<Constraint> {
    if parts.is_empty() {
        return Ok(MOVABLE);
    }
    if parts.len() < 3 {
        return Err(Error::parse(
            Format::Poscar,
            line_no,
            "expected three selective-dynamics flags",
        ));
    }
    let mut flags = MOVABLE;
    for (slot, tok) in flags.iter_mut().zip(parts) {
        *slot = tok.parse::<Flag>().map_err(|_| {
            Error::parse(Format::Poscar, line_no, format!("invalid flag '{}'", tok))
        })?;
    }
    Ok(flags)
}

/// Edits the constraints of one atom type from textual flag and axis,
/// e.g. `("O", "F", "all")`. The flag must be exactly `T` or `F`; the
/// axis is case-insensitive. An absent atom type is a silent no-op.
pub fn constrain_atom_type(system: &mut AtomicSystem, atom_type: &str, flag: &str, axis: &str) -> Result<bool> {
    let flag: Flag = flag.parse()?;
    let axis: Axis = axis.parse()?;
    Ok(system.constrain_atom_type(atom_type, flag, axis))
}

/// Always writes the selective-dynamics block; missing constraints are
/// written as movable and a missing lattice as the unit cube.
pub fn write<W: Write>(mut writer: W, system: &AtomicSystem, options: &WriteOptions) -> Result<()> {
    let lattice = system.lattice().copied().unwrap_or_else(|| {
        log::debug!("No lattice on system; writing unit basis");
        Lattice::new(IDENTITY, 1.0)
    });

    // 1. Header
    writeln!(writer, "{}", options.poscar_title)?;
    writeln!(writer, " {:.9}", lattice.scale)?;

    // 2. Lattice Vectors
    for vec in &lattice.basis {
        writeln!(writer, "{:14.8}{:14.8}{:14.8}", vec[0], vec[1], vec[2])?;
    }

    // 3. Elements & Counts
    for (label, _) in system.natoms() {
        write!(writer, "{:5}", label)?;
    }
    writeln!(writer)?;
    for (_, count) in system.natoms() {
        write!(writer, "{:5}", count)?;
    }
    writeln!(writer)?;

    writeln!(writer, "Selective Dynamics")?;
    writeln!(writer, "{}", system.mode().label())?;

    // 4. Positions and flags
    let constraints = system.effective_constraints();
    for (p, c) in system.coordinates().iter().zip(constraints.iter()) {
        writeln!(
            writer,
            "{:18.12}{:18.12}{:18.12}{:>5}{:>5}{:>5}",
            p[0], p[1], p[2], c[0], c[1], c[2]
        )?;
    }

    Ok(())
}

pub fn save(path: &Path, system: &AtomicSystem, options: &WriteOptions) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write(&mut writer, system, options)?;
    writer.flush()?;
    log::info!("Wrote {} atoms to {}", system.total_count(), path.display());
    Ok(())
}
