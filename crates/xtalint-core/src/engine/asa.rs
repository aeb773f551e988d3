use super::chains::ChainTemplate;
use super::config::SurfaceConfig;
use super::error::EngineError;
use super::grid::SpatialGrid;
use crate::core::models::ids::ResidueId;
use crate::core::models::residue::ResidueKind;
use crate::core::tables::reference_asa::ReferenceAsaTable;
use nalgebra::{Point3, Vector3};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::f64::consts::PI;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, instrument};

/// An atom as seen by the surface calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AsaAtom {
    pub position: Point3<f64>,
    pub radius: f64,
}

/// Pairs coordinates with radii.
pub fn asa_atoms(positions: &[Point3<f64>], radii: &[f64]) -> Vec<AsaAtom> {
    positions
        .iter()
        .zip(radii)
        .map(|(&position, &radius)| AsaAtom { position, radius })
        .collect()
}

/// `n` near-uniform points on the unit sphere from the golden-section spiral.
pub fn sphere_points(n: usize) -> Vec<Vector3<f64>> {
    let increment = PI * (3.0 - 5.0_f64.sqrt());
    let offset = 2.0 / n as f64;
    (0..n)
        .map(|k| {
            let y = k as f64 * offset - 1.0 + offset / 2.0;
            let r = (1.0 - y * y).sqrt();
            let phi = k as f64 * increment;
            Vector3::new(phi.cos() * r, y, phi.sin() * r)
        })
        .collect()
}

/// Splits `0..len` into `parts` contiguous ranges whose sizes differ by at
/// most one; the first `len % parts` ranges get the extra element.
pub fn partition_ranges(len: usize, parts: usize) -> Vec<Range<usize>> {
    let parts = parts.max(1);
    let base = len / parts;
    let remainder = len % parts;
    let mut start = 0;
    (0..parts)
        .map(|k| {
            let size = base + usize::from(k < remainder);
            let range = start..start + size;
            start += size;
            range
        })
        .collect()
}

/// Shrake-Rupley accessible surface area on a dedicated worker pool.
///
/// Each call partitions the atoms into one contiguous range per worker, and
/// every worker writes only its own slice of the output. Results do not
/// depend on the number of workers.
pub struct AsaEngine {
    probe_radius: f64,
    sphere_points: Vec<Vector3<f64>>,
    threads: usize,
    pool: ThreadPool,
}

impl std::fmt::Debug for AsaEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsaEngine")
            .field("probe_radius", &self.probe_radius)
            .field("sphere_points", &self.sphere_points.len())
            .field("threads", &self.threads)
            .finish()
    }
}

impl AsaEngine {
    pub fn new(config: &SurfaceConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .thread_name(|i| format!("asa-worker-{}", i))
            .build()
            .map_err(|e| EngineError::ThreadPool {
                threads: config.threads,
                reason: e.to_string(),
            })?;
        Ok(Self {
            probe_radius: config.probe_radius,
            sphere_points: sphere_points(config.sphere_points),
            threads: config.threads,
            pool,
        })
    }

    pub fn probe_radius(&self) -> f64 {
        self.probe_radius
    }

    pub fn num_sphere_points(&self) -> usize {
        self.sphere_points.len()
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Per-atom accessible surface area, in input order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::AsaWorker`] if any worker panics; no partial
    /// result is returned in that case.
    #[instrument(level = "debug", skip_all, name = "asa_calculation", fields(atoms = atoms.len()))]
    pub fn calculate(&self, atoms: &[AsaAtom]) -> Result<Vec<f64>, EngineError> {
        if atoms.is_empty() {
            return Ok(Vec::new());
        }

        let neighbors = self.neighbor_lists(atoms);
        let ranges = partition_ranges(atoms.len(), self.threads);
        let mut output = vec![0.0; atoms.len()];

        fill_partitioned(&self.pool, &ranges, &mut output, |index| {
            self.atom_asa(index, atoms, &neighbors[index])
        })?;

        debug!(
            atoms = atoms.len(),
            workers = ranges.len(),
            "Computed accessible surface area."
        );
        Ok(output)
    }

    /// For each atom, every other atom close enough to occlude part of its
    /// probe sphere: `d < r_i + r_j + 2 * probe`.
    fn neighbor_lists(&self, atoms: &[AsaAtom]) -> Vec<Vec<usize>> {
        let max_radius = atoms.iter().map(|a| a.radius).fold(0.0, f64::max);
        let search = 2.0 * (max_radius + self.probe_radius);
        let positions: Vec<Point3<f64>> = atoms.iter().map(|a| a.position).collect();

        let mut lists = SpatialGrid::single(&positions, search).neighbor_lists();
        for (i, list) in lists.iter_mut().enumerate() {
            let atom = &atoms[i];
            list.retain(|&j| {
                let reach = atom.radius + atoms[j].radius + 2.0 * self.probe_radius;
                nalgebra::distance_squared(&atom.position, &atoms[j].position) < reach * reach
            });
        }
        lists
    }

    fn atom_asa(&self, index: usize, atoms: &[AsaAtom], neighbors: &[usize]) -> f64 {
        let atom = &atoms[index];
        let radius = atom.radius + self.probe_radius;

        let mut accessible = 0usize;
        // Neighbor that blocked the previous point; nearby points are likely
        // blocked by the same atom.
        let mut closest = 0usize;
        for point in &self.sphere_points {
            let test = atom.position + point * radius;
            let blocker = (0..neighbors.len())
                .map(|k| (closest + k) % neighbors.len())
                .find(|&slot| {
                    let other = &atoms[neighbors[slot]];
                    let reach = other.radius + self.probe_radius;
                    nalgebra::distance_squared(&test, &other.position) < reach * reach
                });
            match blocker {
                Some(slot) => closest = slot,
                None => accessible += 1,
            }
        }

        4.0 * PI / self.sphere_points.len() as f64 * radius * radius * accessible as f64
    }
}

/// Fills `output` on `pool` with one task per range, slot `k` receiving
/// `value(k)`.
///
/// `ranges` must tile `output` in order. A panic in any task is caught at the
/// scope barrier and reported as [`EngineError::AsaWorker`]; the contents of
/// `output` are then unspecified.
fn fill_partitioned<F>(
    pool: &ThreadPool,
    ranges: &[Range<usize>],
    output: &mut [f64],
    value: F,
) -> Result<(), EngineError>
where
    F: Fn(usize) -> f64 + Sync,
{
    let value = &value;
    panic::catch_unwind(AssertUnwindSafe(|| {
        pool.scope(|scope| {
            let mut rest: &mut [f64] = output;
            for range in ranges {
                let (chunk, tail) = std::mem::take(&mut rest).split_at_mut(range.len());
                rest = tail;
                let start = range.start;
                scope.spawn(move |_| {
                    for (offset, slot) in chunk.iter_mut().enumerate() {
                        *slot = value(start + offset);
                    }
                });
            }
        })
    }))
    .map_err(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        EngineError::AsaWorker(reason)
    })
}

/// Surface areas of one residue.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidueArea {
    pub residue_id: ResidueId,
    pub number: isize,
    pub insertion_code: Option<char>,
    pub name: String,
    pub kind: ResidueKind,
    /// Accessible area of the residue in the isolated chain.
    pub asa: f64,
    /// Area lost on complex formation; zero outside an interface.
    pub bsa: f64,
    /// `asa` relative to the extended-tripeptide reference, for amino acids.
    pub relative_asa: Option<f64>,
}

impl ResidueArea {
    pub fn label(&self) -> String {
        match self.insertion_code {
            Some(code) => format!("{}{}", self.number, code),
            None => self.number.to_string(),
        }
    }

    /// `bsa / asa`, or `None` for a fully buried residue.
    pub fn buried_fraction(&self) -> Option<f64> {
        (self.asa > 0.0).then(|| self.bsa / self.asa)
    }
}

/// Sums per-atom areas of a chain into per-residue areas.
///
/// `complexed` holds the per-atom areas of the same atoms inside a complex;
/// when given, buried area is `isolated - complexed`.
pub fn residue_areas(
    template: &ChainTemplate,
    isolated: &[f64],
    complexed: Option<&[f64]>,
    reference: &ReferenceAsaTable,
) -> Vec<ResidueArea> {
    template
        .residues()
        .iter()
        .map(|residue| {
            let asa: f64 = isolated[residue.atoms.clone()].iter().sum();
            let bsa = complexed
                .map(|c| asa - c[residue.atoms.clone()].iter().sum::<f64>())
                .unwrap_or(0.0);
            ResidueArea {
                residue_id: residue.residue_id,
                number: residue.number,
                insertion_code: residue.insertion_code,
                name: residue.name.clone(),
                kind: residue.kind,
                asa,
                bsa,
                relative_asa: residue
                    .kind
                    .amino_acid()
                    .and_then(|aa| reference.relative(aa, asa)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(threads: usize, points: usize) -> AsaEngine {
        AsaEngine::new(&SurfaceConfig {
            probe_radius: 1.4,
            sphere_points: points,
            threads,
            include_hydrogens: false,
        })
        .unwrap()
    }

    #[test]
    fn partitioned_fill_writes_every_slot_once() {
        let engine = engine(3, 12);
        let ranges = partition_ranges(10, 3);
        let mut output = vec![-1.0; 10];

        fill_partitioned(&engine.pool, &ranges, &mut output, |index| index as f64 * 2.0).unwrap();

        let expected: Vec<f64> = (0..10).map(|k| k as f64 * 2.0).collect();
        assert_eq!(output, expected);
    }

    #[test]
    fn panicking_worker_fails_the_whole_pass() {
        let engine = engine(3, 12);
        let ranges = partition_ranges(10, 3);
        let mut output = vec![0.0; 10];

        let result = fill_partitioned(&engine.pool, &ranges, &mut output, |index| {
            if index == 7 {
                panic!("sampling failed at atom {}", index);
            }
            1.0
        });

        match result {
            Err(EngineError::AsaWorker(reason)) => assert!(reason.contains("sampling failed at atom 7")),
            other => panic!("Expected a worker failure, got {:?}", other),
        }
    }

    #[test]
    fn sphere_points_lie_on_the_unit_sphere() {
        let points = sphere_points(100);
        assert_eq!(points.len(), 100);
        for p in &points {
            assert!((p.norm() - 1.0).abs() < 1e-12);
        }
        let mean: Vector3<f64> = points.iter().sum::<Vector3<f64>>() / 100.0;
        assert!(mean.norm() < 0.1);
    }

    #[test]
    fn partition_gives_remainder_to_first_ranges() {
        assert_eq!(partition_ranges(10, 3), vec![0..4, 4..7, 7..10]);
        assert_eq!(partition_ranges(2, 4), vec![0..1, 1..2, 2..2, 2..2]);
        assert_eq!(partition_ranges(5, 0), vec![0..5]);
    }

    #[test]
    fn isolated_atom_is_fully_accessible() {
        let atoms = [AsaAtom {
            position: Point3::new(1.0, 2.0, 3.0),
            radius: 1.7,
        }];
        let asa = engine(1, 960).calculate(&atoms).unwrap();
        let expected = 4.0 * PI * (1.7_f64 + 1.4).powi(2);
        assert!((asa[0] - expected).abs() < 1e-9);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(engine(2, 96).calculate(&[]).unwrap().is_empty());
    }

    #[test]
    fn touching_atoms_bury_each_other_symmetrically() {
        let atoms = [
            AsaAtom {
                position: Point3::new(0.0, 0.0, 0.0),
                radius: 1.5,
            },
            AsaAtom {
                position: Point3::new(2.0, 0.0, 0.0),
                radius: 1.5,
            },
        ];
        let asa = engine(1, 960).calculate(&atoms).unwrap();
        let free = 4.0 * PI * 2.9_f64.powi(2);
        assert!(asa[0] < free);
        assert!((asa[0] - asa[1]).abs() < 2.0);
    }

    #[test]
    fn far_atoms_do_not_interact() {
        let atoms = [
            AsaAtom {
                position: Point3::new(0.0, 0.0, 0.0),
                radius: 1.5,
            },
            AsaAtom {
                position: Point3::new(6.0, 0.0, 0.0),
                radius: 1.5,
            },
        ];
        let asa = engine(1, 240).calculate(&atoms).unwrap();
        let free = 4.0 * PI * 2.9_f64.powi(2);
        assert!((asa[0] - free).abs() < 1e-9);
        assert!((asa[1] - free).abs() < 1e-9);
    }

    #[test]
    fn zero_threads_is_a_configuration_error() {
        let err = AsaEngine::new(&SurfaceConfig {
            threads: 0,
            ..SurfaceConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, EngineError::Config { .. }));
    }
}
