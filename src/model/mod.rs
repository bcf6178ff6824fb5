//src/model/mod.rs
pub mod constraint;
pub mod structure;

// Re-exports for cleaner imports
pub use constraint::{Axis, Constraint, Flag, MOVABLE};
pub use structure::{AtomicSystem, CoordinateMode, Lattice};
