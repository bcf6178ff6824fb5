// src/utils/report.rs

use crate::model::AtomicSystem;

const MAX_ROWS: usize = 20;

/// Text printed by `atomco info` for a loaded file
pub fn structure_summary(system: &AtomicSystem, filename: &str) -> String {
    let formula_str: String = system
        .natoms()
        .iter()
        .map(|(el, count)| format!("{}{}", el, count))
        .collect::<Vec<_>>()
        .join(" ");

    let mut out = String::new();
    out.push_str(&format!("File: {}\n", filename));
    out.push_str(&format!("Formula: {}\n", formula_str));
    out.push_str(&format!("Atoms: {}\n", system.total_count()));
    out.push_str(&format!("Coordinates: {}\n", system.mode().label()));
    if let Some(step) = system.frame_index() {
        out.push_str(&format!("Frame: {}\n", step));
    }
    match system.volume() {
        Ok(v) => out.push_str(&format!("Volume: {:.4} Å^3\n", v)),
        Err(_) => out.push_str("Volume: n/a (no lattice)\n"),
    }

    if system.constraints().is_some() {
        out.push_str("Constraints:\n");
        for (flags, n) in system.constraint_summary() {
            out.push_str(&format!("  {:<8} {}\n", flags, n));
        }
    }

    out.push_str("--------------------------------------------------\n");
    out.push_str(&format!(
        "{:<8} {:<8} {:<10} {:<10} {:<10}\n",
        "Index", "Element", "X", "Y", "Z"
    ));
    out.push_str("--------------------------------------------------\n");

    let rows = system.blocks().flat_map(|(el, range)| range.map(move |i| (i, el)));
    for (i, el) in rows.take(MAX_ROWS) {
        let p = system.coordinates()[i];
        out.push_str(&format!(
            "{:<8} {:<8} {:<10.4} {:<10.4} {:<10.4}\n",
            i, el, p[0], p[1], p[2]
        ));
    }

    if system.total_count() > MAX_ROWS {
        out.push_str(&format!("... and {} more atoms.\n", system.total_count() - MAX_ROWS));
    }

    out
}
