mod common;

use common::random_points;
use nalgebra::Point3;
use std::f64::consts::PI;
use xtalint::engine::asa::{AsaAtom, AsaEngine};
use xtalint::engine::config::SurfaceConfig;

fn engine(threads: usize) -> AsaEngine {
    AsaEngine::new(&SurfaceConfig {
        probe_radius: 1.4,
        sphere_points: 960,
        threads,
        include_hydrogens: false,
    })
    .expect("valid surface configuration")
}

fn random_atoms(seed: u64, n: usize) -> Vec<AsaAtom> {
    random_points(seed, n, 15.0)
        .into_iter()
        .enumerate()
        .map(|(k, position)| AsaAtom {
            position,
            radius: 1.4 + 0.1 * (k % 5) as f64,
        })
        .collect()
}

#[test]
fn repeated_calls_are_bit_identical() {
    let atoms = random_atoms(1, 200);
    let engine = engine(3);
    let first = engine.calculate(&atoms).unwrap();
    let second = engine.calculate(&atoms).unwrap();
    assert_eq!(first, second);
}

#[test]
fn thread_count_does_not_change_results() {
    let atoms = random_atoms(2, 301);
    let serial = engine(1).calculate(&atoms).unwrap();
    let parallel = engine(4).calculate(&atoms).unwrap();
    assert_eq!(serial.len(), parallel.len());
    for (s, p) in serial.iter().zip(&parallel) {
        assert!((s - p).abs() <= 1e-9);
    }
}

#[test]
fn more_threads_than_atoms_is_fine() {
    let atoms = random_atoms(3, 3);
    let few = engine(8).calculate(&atoms).unwrap();
    assert_eq!(few, engine(1).calculate(&atoms).unwrap());
}

#[test]
fn single_atom_has_full_sphere_area() {
    let atoms = [AsaAtom {
        position: Point3::new(-3.0, 7.5, 0.25),
        radius: 1.87,
    }];
    let asa = engine(2).calculate(&atoms).unwrap();
    let expected = 4.0 * PI * (1.87_f64 + 1.4).powi(2);
    assert!((asa[0] - expected).abs() < 1e-9);
}

#[test]
fn adding_an_occluding_atom_never_increases_area() {
    let atoms = random_atoms(4, 40);
    let before = engine(1).calculate(&atoms).unwrap();

    let mut extended = atoms.clone();
    extended.push(AsaAtom {
        position: atoms[0].position + nalgebra::Vector3::new(1.2, 0.8, -0.5),
        radius: 1.8,
    });
    let after = engine(1).calculate(&extended).unwrap();

    for (k, (b, a)) in before.iter().zip(&after).enumerate() {
        assert!(a <= b, "atom {} grew from {} to {}", k, b, a);
    }
}

#[test]
fn buried_atom_has_zero_area() {
    let center = Point3::new(0.0, 0.0, 0.0);
    let mut atoms = vec![AsaAtom {
        position: center,
        radius: 1.0,
    }];
    for offset in [
        [1.5, 0.0, 0.0],
        [-1.5, 0.0, 0.0],
        [0.0, 1.5, 0.0],
        [0.0, -1.5, 0.0],
        [0.0, 0.0, 1.5],
        [0.0, 0.0, -1.5],
        [1.0, 1.0, 1.0],
        [-1.0, -1.0, -1.0],
        [1.0, -1.0, 1.0],
        [-1.0, 1.0, -1.0],
        [1.0, 1.0, -1.0],
        [-1.0, -1.0, 1.0],
        [1.0, -1.0, -1.0],
        [-1.0, 1.0, 1.0],
    ] {
        atoms.push(AsaAtom {
            position: Point3::new(offset[0], offset[1], offset[2]),
            radius: 2.0,
        });
    }
    let asa = engine(2).calculate(&atoms).unwrap();
    assert_eq!(asa[0], 0.0);
}
