// src/io/xyz.rs

use crate::config::WriteOptions;
use crate::error::{Error, Result};
use crate::io::Format;
use crate::model::AtomicSystem;
use crate::utils::linalg::{self, Basis, IDENTITY};
use crate::utils::tokens;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

pub fn parse(path: &Path) -> Result<AtomicSystem> {
    let file = File::open(path)?;
    let system = read(BufReader::new(file))?;
    log::info!(
        "Loaded {} atoms ({} types) from {}",
        system.total_count(),
        system.atom_types().len(),
        path.display()
    );
    Ok(system)
}

/// Reads one frame: atom count, `STEP =<n>` line, then `<type> x y z` rows.
pub fn read<R: BufRead>(reader: R) -> Result<AtomicSystem> {
    let mut lines = reader.lines().enumerate();

    // 1. Number of Atoms (first non-blank line)
    let (count_no, count_line) = loop {
        match lines.next() {
            Some((i, line)) => {
                let line = line?;
                if !line.trim().is_empty() {
                    break (i + 1, line);
                }
            }
            None => return Err(Error::parse(Format::Xyz, 1, "empty XYZ file")),
        }
    };
    let declared = tokens::parse_usize(count_line.trim(), Format::Xyz, count_no)?;

    // 2. Step line
    let step = match lines.next() {
        Some((_, line)) => tokens::step_after_equals(&line?),
        None => None,
    };
    if step.is_none() {
        log::debug!("XYZ comment line carries no step label");
    }

    // 3. Atoms
    let capacity = declared.min(1 << 16);
    let mut labels = Vec::with_capacity(capacity);
    let mut rows = Vec::with_capacity(capacity);
    for (i, line) in lines {
        let line = line?;
        let parts = tokens::str2list(&line);
        if parts.is_empty() {
            continue;
        }
        if parts.len() < 4 {
            return Err(Error::parse(Format::Xyz, i + 1, "expected '<type> <x> <y> <z>'"));
        }
        rows.push(tokens::parse_row3(&parts[1..], Format::Xyz, i + 1)?);
        labels.push(parts[0].to_string());
    }

    let system = AtomicSystem::from_labeled_rows(declared, &labels, rows)?;
    Ok(match step {
        Some(step) => system.with_frame_index(step),
        None => system,
    })
}

/// Rows converted to direct coordinates of `basis` (identity when None).
pub fn coordinate_transform(system: &AtomicSystem, basis: Option<&Basis>) -> Result<Vec<[f64; 3]>> {
    linalg::cartesian_to_direct(basis.unwrap_or(&IDENTITY), system.coordinates())
}

pub fn write<W: Write>(mut writer: W, system: &AtomicSystem, options: &WriteOptions) -> Result<()> {
    let step = system.frame_index().unwrap_or(options.default_frame_index);

    writeln!(writer, "{:12}", system.total_count())?;
    writeln!(writer, "STEP ={:9}", step)?;

    // Re-emitted block by block, in type order
    let atomco = system.atomco_dict()?;
    for atom_type in system.atom_types() {
        for row in atomco[atom_type.as_str()].iter() {
            writeln!(
                writer,
                "{:<4}{:>16.8}{:>16.8}{:>16.8}",
                atom_type, row[0], row[1], row[2]
            )?;
        }
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
