use atomco::config::WriteOptions;
use atomco::io::{self, poscar, xdatcar, Format};
use atomco::{AtomicSystem, Axis, CoordinateMode, Error, Flag, MOVABLE};
use std::fs;

const POSCAR: &str = "\
Pt(111) with O
1.0
  5.5437 0.0000 0.0000
  0.0000 5.5437 0.0000
  0.0000 0.0000 20.000
  Pt O
  2 1
Direct
  0.000 0.000 0.100
  0.500 0.500 0.100
  0.250 0.250 0.200
";

const XDATCAR: &str = "\
Pt O
1.0
 4.0 0.0 0.0
 0.0 4.0 0.0
 0.0 0.0 4.0
 Pt O
 2 1
Direct configuration=     1
 0.0 0.0 0.0
 0.5 0.5 0.0
 0.2 0.2 0.2
Direct configuration=     2
 0.0 0.0 0.1
 0.5 0.5 0.1
 0.2 0.2 0.3
";

#[test]
fn test_poscar_roundtrip_makes_constraints_explicit() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("POSCAR");
    let dst = dir.path().join("CONTCAR");
    fs::write(&src, POSCAR).unwrap();

    let first = io::load_structure(&src).unwrap();
    assert!(first.constraints().is_none());
    io::save_structure(&dst, &first, &WriteOptions::default()).unwrap();

    let second = poscar::parse(&dst).unwrap();
    assert_eq!(second.title, "Created by atomco");
    let second = second.system;
    assert_eq!(second.atom_types(), first.atom_types());
    assert_eq!(second.atom_counts(), first.atom_counts());
    for (a, b) in first.coordinates().iter().zip(second.coordinates()) {
        for k in 0..3 {
            assert!((a[k] - b[k]).abs() < 1e-9);
        }
    }
    assert_eq!(second.constraints().unwrap(), vec![MOVABLE; 3].as_slice());
    assert!((second.volume().unwrap() - first.volume().unwrap()).abs() < 1e-6);
}

#[test]
fn test_constrain_then_reload() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("POSCAR");
    let dst = dir.path().join("POSCAR_fixed");
    fs::write(&src, POSCAR).unwrap();

    let mut system = io::load_structure(&src).unwrap();
    assert!(system.constrain_atom_type("O", Flag::Fixed, Axis::All));
    assert!(!system.constrain_atom_type("N", Flag::Fixed, Axis::All));
    io::save_structure(&dst, &system, &WriteOptions::default()).unwrap();

    let reloaded = io::load_structure(&dst).unwrap();
    let c = reloaded.constraints().unwrap();
    assert_eq!(c[0], MOVABLE);
    assert_eq!(c[1], MOVABLE);
    assert_eq!(c[2], [Flag::Fixed; 3]);
}

#[test]
fn test_poscar_to_xyz() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("POSCAR");
    let dst = dir.path().join("out.xyz");
    fs::write(&src, POSCAR).unwrap();

    let system = io::load_structure(&src).unwrap();
    assert_eq!(system.mode(), CoordinateMode::Direct);
    let options = WriteOptions {
        default_frame_index: 5,
        ..WriteOptions::default()
    };
    io::save_structure(&dst, &system, &options).unwrap();

    let xyz = io::load_structure(&dst).unwrap();
    assert_eq!(xyz.frame_index(), Some(5));
    assert_eq!(xyz.atom_types(), ["Pt", "O"]);
    assert!((xyz.coordinates()[1][0] - 0.5 * 5.5437).abs() < 1e-6);
    assert!((xyz.coordinates()[2][2] - 4.0).abs() < 1e-6);
}

#[test]
fn test_trajectory_loads_last_frame() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("XDATCAR");
    fs::write(&path, XDATCAR).unwrap();

    let system = io::load_structure(&path).unwrap();
    assert_eq!(system.frame_index(), Some(2));
    assert_eq!(system.coordinates()[2], [0.2, 0.2, 0.3]);
    assert_eq!(system.mode(), CoordinateMode::Direct);

    let traj = xdatcar::Xdatcar::open(&path).unwrap();
    assert_eq!(traj.frames().unwrap().count(), 2);
}

#[test]
fn test_empty_trajectory_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("XDATCAR");
    let header: String = XDATCAR.lines().take(7).map(|l| format!("{}\n", l)).collect();
    fs::write(&path, header).unwrap();

    let err = io::load_structure(&path).unwrap_err();
    assert!(matches!(err, Error::Parse { format: Format::Xdatcar, .. }));
}

#[test]
fn test_cif_loads_with_lattice() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ts.cif");
    fs::write(
        &path,
        "\
data_ts
_cell_length_a    3.0
_cell_length_b    3.0
_cell_length_c    3.0
_cell_angle_alpha 90
_cell_angle_beta  90
_cell_angle_gamma 90
loop_
_atom_site_label
_atom_site_type_symbol
_atom_site_fract_x
_atom_site_fract_y
_atom_site_fract_z
_atom_site_U_iso_or_equiv
_atom_site_adp_type
_atom_site_type
Na1 Na 0.0 0.0 0.0 0.0 Uiso Na
Cl1 Cl 0.5 0.5 0.5 0.0 Uiso Cl
",
    )
    .unwrap();

    let mut system = io::load_structure(&path).unwrap();
    assert_eq!(system.atom_types(), ["Na", "Cl"]);
    assert!((system.volume().unwrap() - 27.0).abs() < 1e-9);

    system.to_cartesian().unwrap();
    assert!((system.coordinates()[1][0] - 1.5).abs() < 1e-9);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = io::load_structure(&dir.path().join("POSCAR")).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn test_grouping_reassembles_coordinates() {
    let system = AtomicSystem::from_labeled_rows(
        4,
        &["O", "H", "O", "H"],
        vec![[0.0; 3], [1.0; 3], [2.0; 3], [3.0; 3]],
    )
    .unwrap();

    let grouped = system.atomco_dict().unwrap();
    let joined: Vec<[f64; 3]> = system
        .atom_types()
        .iter()
        .flat_map(|t| grouped[t.as_str()].iter().copied())
        .collect();
    assert_eq!(joined, system.coordinates());
    assert_eq!(system.coordinates()[1], [2.0; 3]);
}
