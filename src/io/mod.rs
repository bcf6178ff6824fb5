// src/io/mod.rs
pub mod cif;
pub mod poscar;
pub mod xdatcar;
pub mod xyz;

use crate::config::WriteOptions;
use crate::error::{Error, Result};
use crate::model::{AtomicSystem, CoordinateMode};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Xyz,
    Poscar,
    Xdatcar,
    Cif,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Xyz => write!(f, "XYZ"),
            Format::Poscar => write!(f, "POSCAR"),
            Format::Xdatcar => write!(f, "XDATCAR"),
            Format::Cif => write!(f, "CIF"),
        }
    }
}

/// Format from the file name. VASP files are recognised by name
/// (POSCAR, CONTCAR, XDATCAR, optionally with a suffix) or a `.vasp`
/// extension; anything unrecognised falls back to POSCAR.
pub fn detect_format(path: &Path) -> Format {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if name.ends_with(".xyz") {
        Format::Xyz
    } else if name.ends_with(".cif") {
        Format::Cif
    } else if name.contains("xdatcar") {
        Format::Xdatcar
    } else {
        Format::Poscar
    }
}

pub fn load_structure(path: &Path) -> Result<AtomicSystem> {
    match detect_format(path) {
        Format::Xyz => xyz::parse(path),
        Format::Poscar => poscar::parse(path).map(|p| p.system),
        Format::Cif => cif::parse(path).map(|c| c.system),
        Format::Xdatcar => {
            // Last complete frame stands for the whole trajectory
            let traj = xdatcar::Xdatcar::open(path)?;
            let mut last = None;
            for frame in traj.frames()? {
                last = Some(frame?);
            }
            let frame = last.ok_or_else(|| {
                Error::parse(Format::Xdatcar, xdatcar::HEADER_LINES, "trajectory contains no frames")
            })?;
            traj.snapshot(&frame)
        }
    }
}

/// Writes `system` in the format named by `path`. XYZ holds Cartesian
/// rows only, so a periodic system in direct coordinates is converted on
/// a copy first.
pub fn save_structure(path: &Path, system: &AtomicSystem, options: &WriteOptions) -> Result<()> {
    match detect_format(path) {
        Format::Xyz if system.mode() == CoordinateMode::Direct && system.is_periodic() => {
            let mut cartesian = system.clone();
            cartesian.to_cartesian()?;
            xyz::save(path, &cartesian, options)
        }
        Format::Xyz => xyz::save(path, system, options),
        Format::Poscar => poscar::save(path, system, options),
        format @ (Format::Xdatcar | Format::Cif) => Err(Error::UnsupportedWrite(format)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Lattice;

    #[test]
    fn test_format_detection() {
        assert_eq!(detect_format(Path::new("run/ts.xyz")), Format::Xyz);
        assert_eq!(detect_format(Path::new("Si.CIF")), Format::Cif);
        assert_eq!(detect_format(Path::new("XDATCAR")), Format::Xdatcar);
        assert_eq!(detect_format(Path::new("XDATCAR_2")), Format::Xdatcar);
        assert_eq!(detect_format(Path::new("CONTCAR")), Format::Poscar);
        assert_eq!(detect_format(Path::new("slab.vasp")), Format::Poscar);
        assert_eq!(detect_format(Path::new("POSCAR")), Format::Poscar);
    }

    #[test]
    fn test_direct_system_saved_as_cartesian_xyz() {
        let cell = [[4.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 4.0]];
        let system = AtomicSystem::from_declared_counts(vec!["H".into()], vec![1], vec![[0.5, 0.5, 0.5]])
            .unwrap()
            .with_lattice(Lattice::new(cell, 1.0));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xyz");
        save_structure(&path, &system, &WriteOptions::default()).unwrap();

        let reloaded = load_structure(&path).unwrap();
        for k in 0..3 {
            assert!((reloaded.coordinates()[0][k] - 2.0).abs() < 1e-8);
        }
        // Caller's system is untouched
        assert_eq!(system.mode(), CoordinateMode::Direct);
        assert_eq!(system.coordinates()[0], [0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_read_only_formats_rejected() {
        let system = AtomicSystem::from_declared_counts(vec!["H".into()], vec![1], vec![[0.0; 3]]).unwrap();
        let err = save_structure(Path::new("out.cif"), &system, &WriteOptions::default()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedWrite(Format::Cif)));
    }
}
