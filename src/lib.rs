//! Readers and writers for atomic coordinate files.
//!
//! Every format is parsed into one [`AtomicSystem`]: atom types in a fixed
//! order, per-type counts, and coordinate rows grouped contiguously by type.
//!
//! | Format  | Files                | Read | Write |
//! |---------|----------------------|------|-------|
//! | XYZ     | `*.xyz`              | yes  | yes   |
//! | POSCAR  | `POSCAR`, `CONTCAR`  | yes  | yes   |
//! | XDATCAR | `XDATCAR*`           | yes  | no    |
//! | CIF     | `*.cif`              | yes  | no    |
//!
//! ```no_run
//! use atomco::io::{load_structure, save_structure};
//! use atomco::config::WriteOptions;
//! use atomco::{Axis, Flag};
//! use std::path::Path;
//!
//! let mut system = load_structure(Path::new("CONTCAR"))?;
//! system.constrain_atom_type("O", Flag::Fixed, Axis::All);
//! save_structure(Path::new("POSCAR_new"), &system, &WriteOptions::default())?;
//! # Ok::<(), atomco::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod utils;

pub use error::{Error, Result};
pub use io::Format;
pub use model::{AtomicSystem, Axis, Constraint, CoordinateMode, Flag, Lattice, MOVABLE};
