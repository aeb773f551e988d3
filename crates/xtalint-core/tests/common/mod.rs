#![allow(dead_code)]

use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use xtalint::core::crystal::Crystal;
use xtalint::core::crystal::cell::CrystalCell;
use xtalint::core::crystal::space_group::SpaceGroup;
use xtalint::core::models::atom::Atom;
use xtalint::core::models::chain::ChainType;
use xtalint::core::models::system::MolecularSystem;

/// Adds a protein chain of glycine residues, one CA atom each, laid out on a
/// straight line.
pub fn add_line_chain(
    system: &mut MolecularSystem,
    code: char,
    start: Point3<f64>,
    step: Vector3<f64>,
    atoms: usize,
) {
    let chain_id = system.add_chain(code, ChainType::Protein);
    for k in 0..atoms {
        let residue_id = system
            .add_residue(chain_id, k as isize + 1, None, "GLY")
            .expect("chain exists");
        let serial = system.atom_count() + 1;
        let position = start + step * k as f64;
        system
            .add_atom_to_residue(residue_id, Atom::new(serial, "CA", "C", residue_id, position))
            .expect("residue exists");
    }
}

/// Two five-atom chains 1.5 Å apart along x, side by side 3 Å apart along y.
pub fn homodimer() -> MolecularSystem {
    let mut system = MolecularSystem::new();
    let step = Vector3::new(1.5, 0.0, 0.0);
    add_line_chain(&mut system, 'A', Point3::new(0.0, 0.0, 0.0), step, 5);
    add_line_chain(&mut system, 'B', Point3::new(0.0, 3.0, 0.0), step, 5);
    system
}

/// Two chains running along a 20 Å a-axis, each spanning 18 Å, so every
/// chain touches every chain of the neighboring cell along a.
pub fn packed_crystal_system() -> (MolecularSystem, Crystal) {
    let mut system = MolecularSystem::new();
    let step = Vector3::new(1.5, 0.0, 0.0);
    add_line_chain(&mut system, 'A', Point3::new(0.0, 2.0, 2.0), step, 13);
    add_line_chain(&mut system, 'B', Point3::new(0.0, 5.0, 2.0), step, 13);
    let crystal = crystal(20.0, 30.0, 40.0, "P 21 21 21");
    (system, crystal)
}

pub fn crystal(a: f64, b: f64, c: f64, symbol: &str) -> Crystal {
    Crystal::new(
        CrystalCell::new(a, b, c, 90.0, 90.0, 90.0).expect("valid cell"),
        SpaceGroup::from_symbol(symbol).expect("known space group"),
    )
}

pub fn random_points(seed: u64, n: usize, edge: f64) -> Vec<Point3<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            Point3::new(
                rng.random_range(0.0..edge),
                rng.random_range(0.0..edge),
                rng.random_range(0.0..edge),
            )
        })
        .collect()
}
