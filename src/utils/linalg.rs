// src/utils/linalg.rs

use crate::error::{Error, Result};
use nalgebra::{Matrix3, Vector3};

/// Lattice vectors as rows: [[ax, ay, az], [bx, by, bz], [cx, cy, cz]]
pub type Basis = [[f64; 3]; 3];

/// Relative determinant threshold below which a basis counts as singular.
pub const SINGULAR_TOLERANCE: f64 = 1e-12;

pub const IDENTITY: Basis = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

fn to_matrix(basis: &Basis) -> Matrix3<f64> {
  Matrix3::from_row_slice(&[
    basis[0][0],
    basis[0][1],
    basis[0][2],
    basis[1][0],
    basis[1][1],
    basis[1][2],
    basis[2][0],
    basis[2][1],
    basis[2][2],
  ])
}

pub fn scale_basis(basis: &Basis, scale: f64) -> Basis {
  let mut out = *basis;
  for row in out.iter_mut() {
    for v in row.iter_mut() {
      *v *= scale;
    }
  }
  out
}

pub fn determinant(basis: &Basis) -> f64 {
  to_matrix(basis).determinant()
}

/// A basis is singular when |det| is negligible next to the product of
/// its row lengths. A zero row is always singular.
pub fn is_singular(basis: &Basis) -> bool {
  let det = determinant(basis);
  let norms: f64 = basis
    .iter()
    .map(|r| (r[0] * r[0] + r[1] * r[1] + r[2] * r[2]).sqrt())
    .product();
  det.abs() <= SINGULAR_TOLERANCE * norms
}

/// Convert fractional coordinates to Cartesian using lattice matrix
///
/// # Formula
/// ```text
/// Cartesian = Lattice^T × Fractional
/// ```
pub fn frac_to_cart(frac: [f64; 3], lattice: &Basis) -> [f64; 3] {
  let cart_vec = to_matrix(lattice).transpose() * Vector3::from(frac);
  [cart_vec.x, cart_vec.y, cart_vec.z]
}

/// Direct rows to Cartesian rows, same order.
pub fn direct_to_cartesian(basis: &Basis, direct: &[[f64; 3]]) -> Vec<[f64; 3]> {
  direct.iter().map(|row| frac_to_cart(*row, basis)).collect()
}

/// Cartesian rows to direct rows, same order. The inverse is computed once
/// for the whole block.
pub fn cartesian_to_direct(basis: &Basis, cartesian: &[[f64; 3]]) -> Result<Vec<[f64; 3]>> {
  let singular = || Error::SingularBasis {
    determinant: determinant(basis),
  };
  if is_singular(basis) {
    return Err(singular());
  }
  let inv = to_matrix(basis)
    .transpose()
    .try_inverse()
    .ok_or_else(singular)?;

  Ok(
    cartesian
      .iter()
      .map(|row| {
        let v = inv * Vector3::from(*row);
        [v.x, v.y, v.z]
      })
      .collect(),
  )
}

/// det(scale · basis)
pub fn cell_volume(basis: Option<&Basis>, scale: f64) -> Result<f64> {
  let basis = basis.ok_or(Error::MissingLattice)?;
  Ok(determinant(&scale_basis(basis, scale)))
}

/// Lattice vectors from cell lengths and angles (degrees), a along x and
/// b in the xy-plane.
pub fn basis_from_parameters(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Basis {
  let (ca, cb, cg) = (
    alpha.to_radians().cos(),
    beta.to_radians().cos(),
    gamma.to_radians().cos(),
  );
  let sg = gamma.to_radians().sin();
  let v = (1.0 - ca * ca - cb * cb - cg * cg + 2.0 * ca * cb * cg).sqrt();

  [
    [a, 0.0, 0.0],
    [b * cg, b * sg, 0.0],
    [c * cb, c * (ca - cb * cg) / sg, c * v / sg],
  ]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_cubic_lattice() {
    // Simple cubic lattice 5.0 Å
    let lattice = [[5.0, 0.0, 0.0], [0.0, 5.0, 0.0], [0.0, 0.0, 5.0]];

    let cart = frac_to_cart([0.5, 0.5, 0.5], &lattice);

    assert!((cart[0] - 2.5).abs() < 1e-10);
    assert!((cart[1] - 2.5).abs() < 1e-10);
    assert!((cart[2] - 2.5).abs() < 1e-10);
  }

  #[test]
  fn test_block_roundtrip() {
    // Non-orthogonal lattice
    let lattice = [[4.0, 0.0, 0.0], [2.0, 3.46, 0.0], [0.3, -0.7, 5.0]];
    let direct = vec![[0.333, 0.667, 0.25], [0.0, 0.0, 0.0], [-0.5, 1.25, 0.9]];

    let cart = direct_to_cartesian(&lattice, &direct);
    let back = cartesian_to_direct(&lattice, &cart).unwrap();

    assert_eq!(back.len(), direct.len());
    for (b, d) in back.iter().zip(direct.iter()) {
      for k in 0..3 {
        assert!((b[k] - d[k]).abs() < 1e-9);
      }
    }
  }

  #[test]
  fn test_rows_are_lattice_vectors() {
    let lattice = [[1.0, 2.0, 3.0], [0.0, 1.0, 4.0], [5.0, 6.0, 0.0]];
    let cart = direct_to_cartesian(&lattice, &[[0.0, 1.0, 0.0]]);
    assert_eq!(cart[0], [0.0, 1.0, 4.0]);
  }

  #[test]
  fn test_zero_row_is_singular() {
    let lattice = [[3.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 5.0]];
    let err = cartesian_to_direct(&lattice, &[[1.0, 1.0, 1.0]]).unwrap_err();
    assert!(matches!(err, Error::SingularBasis { .. }));
  }

  #[test]
  fn test_coplanar_rows_are_singular() {
    let lattice = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]];
    assert!(is_singular(&lattice));
    assert!(!is_singular(&IDENTITY));
  }

  #[test]
  fn test_cell_volume() {
    let lattice = [[2.0, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0, 4.0]];
    let v = cell_volume(Some(&lattice), 2.0).unwrap();
    assert!((v - 192.0).abs() < 1e-9);

    assert!(matches!(cell_volume(None, 1.0), Err(Error::MissingLattice)));
  }

  #[test]
  fn test_basis_from_parameters() {
    let basis = basis_from_parameters(3.0, 4.0, 5.0, 90.0, 90.0, 90.0);
    let expected = [[3.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 5.0]];
    for i in 0..3 {
      for k in 0..3 {
        assert!((basis[i][k] - expected[i][k]).abs() < 1e-9);
      }
    }

    let hex = basis_from_parameters(2.5, 2.5, 4.0, 90.0, 90.0, 120.0);
    let area = 2.5 * 2.5 * 120f64.to_radians().sin();
    assert!((determinant(&hex) - area * 4.0).abs() < 1e-9);
  }
}
