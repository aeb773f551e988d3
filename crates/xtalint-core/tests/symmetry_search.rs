mod common;

use common::add_line_chain;
use nalgebra::{Point3, Vector3};
use std::collections::HashSet;
use std::sync::Arc;
use xtalint::core::crystal::Crystal;
use xtalint::core::crystal::cell::CrystalCell;
use xtalint::core::crystal::space_group::SpaceGroup;
use xtalint::core::crystal::transform::SymmetryTransform;
use xtalint::core::models::system::MolecularSystem;
use xtalint::core::tables::radii::RadiusTable;
use xtalint::engine::catalog::{ChainInterface, InterfaceKey};
use xtalint::engine::chains::{ChainTemplate, PlacedChain};
use xtalint::engine::config::{DEFAULT_CUTOFF, InterfaceConfigBuilder, SelectionConfig, SurfaceConfig};
use xtalint::engine::contacts::ContactGraphBuilder;
use xtalint::engine::progress::ProgressReporter;
use xtalint::workflows;

const SCAN: i32 = 4;

/// Two skewed chains at general positions, so no operator maps a chain onto
/// itself.
fn skewed_pair() -> MolecularSystem {
    let mut system = MolecularSystem::new();
    add_line_chain(
        &mut system,
        'A',
        Point3::new(4.0, 5.0, 6.0),
        Vector3::new(1.5, 0.4, 0.3),
        10,
    );
    add_line_chain(
        &mut system,
        'B',
        Point3::new(7.0, 11.0, 13.0),
        Vector3::new(0.3, 1.4, 0.6),
        10,
    );
    system
}

fn catalog_keys(system: &MolecularSystem, crystal: &Crystal, redundancy_elimination: bool) -> HashSet<InterfaceKey> {
    let config = InterfaceConfigBuilder::new()
        .sphere_points(240)
        .redundancy_elimination(redundancy_elimination)
        .build()
        .unwrap();
    let catalog = workflows::interfaces::run(system, Some(crystal), &config, &ProgressReporter::new()).unwrap();
    let keys: HashSet<InterfaceKey> = catalog.iter().map(|i| i.key().clone()).collect();
    assert_eq!(keys.len(), catalog.len());
    keys
}

/// Every operator and every translation in `-SCAN..=SCAN`, every chain pair,
/// without culling or redundancy checks.
fn exhaustive_keys(system: &MolecularSystem, crystal: &Crystal) -> HashSet<InterfaceKey> {
    let templates: Vec<Arc<ChainTemplate>> = ChainTemplate::collect(
        system,
        &SelectionConfig::default(),
        &SurfaceConfig::default(),
        &RadiusTable::default(),
    )
    .into_iter()
    .map(Arc::new)
    .collect();
    let originals: Vec<PlacedChain> = templates.iter().map(|t| PlacedChain::original(t.clone())).collect();
    let builder = ContactGraphBuilder::new(DEFAULT_CUTOFF);
    let space_group = &crystal.space_group;

    let mut keys = HashSet::new();
    for op_id in 0..space_group.num_operators() {
        let operator = space_group.operator(op_id).unwrap();
        for x in -SCAN..=SCAN {
            for y in -SCAN..=SCAN {
                for z in -SCAN..=SCAN {
                    let translation = Vector3::new(x, y, z);
                    let transform = SymmetryTransform::resolve(op_id, operator, translation, &crystal.cell);
                    for (i, original) in originals.iter().enumerate() {
                        for (j, template) in templates.iter().enumerate() {
                            if i == j && transform.is_identity() {
                                continue;
                            }
                            let placed = PlacedChain::place(template.clone(), transform.clone());
                            let graph = builder.build_between(original.positions(), placed.positions());
                            if !graph.is_empty() {
                                keys.insert(ChainInterface::new(original.clone(), placed, graph).key().clone());
                            }
                        }
                    }
                }
            }
        }
    }
    keys
}

fn assert_matches_exhaustive_scan(crystal: Crystal) {
    let system = skewed_pair();
    let expected = exhaustive_keys(&system, &crystal);
    let reduced = catalog_keys(&system, &crystal, true);
    let full = catalog_keys(&system, &crystal, false);

    assert!(expected.len() >= 2, "lattice too sparse: {} interfaces", expected.len());
    assert_eq!(reduced, expected);
    assert_eq!(full, expected);
}

#[test]
fn tetragonal_screw_axes_find_every_interface() {
    let cell = CrystalCell::new(24.0, 24.0, 30.0, 90.0, 90.0, 90.0).unwrap();
    let space_group = SpaceGroup::from_symbol("P 41 21 2").unwrap();
    assert_matches_exhaustive_scan(Crystal::new(cell, space_group));
}

#[test]
fn trigonal_screw_axes_find_every_interface() {
    let cell = CrystalCell::new(26.0, 26.0, 32.0, 90.0, 90.0, 120.0).unwrap();
    let space_group = SpaceGroup::from_symbol("P 31 2 1").unwrap();
    assert_matches_exhaustive_scan(Crystal::new(cell, space_group));
}
