// src/model/constraint.rs

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Selective-dynamics flag for one axis of one atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Flag {
    #[default]
    Movable,
    Fixed,
}

impl Flag {
    pub fn symbol(self) -> &'static str {
        match self {
            Flag::Movable => "T",
            Flag::Fixed => "F",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.symbol())
    }
}

impl FromStr for Flag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "T" => Ok(Flag::Movable),
            "F" => Ok(Flag::Fixed),
            _ => Err(Error::InvalidFlag(s.to_string())),
        }
    }
}

/// Per-row constraint triple.
pub type Constraint = [Flag; 3];

pub const MOVABLE: Constraint = [Flag::Movable; 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axis {
    X,
    Y,
    Z,
    #[default]
    All,
}

impl Axis {
    /// Column indices touched by this axis.
    pub fn columns(self) -> &'static [usize] {
        match self {
            Axis::X => &[0],
            Axis::Y => &[1],
            Axis::Z => &[2],
            Axis::All => &[0, 1, 2],
        }
    }
}

impl FromStr for Axis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            "all" => Ok(Axis::All),
            _ => Err(Error::InvalidAxis(s.to_string())),
        }
    }
}
