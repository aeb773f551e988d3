use super::grid::{PointPair, SpatialGrid};
use nalgebra::Point3;
use std::collections::{BTreeSet, HashSet};
use std::hash::Hash;
use tracing::trace;

/// How the two sides of a [`ContactGraph`] relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactMode {
    /// Both sides are the same collection; edges satisfy `i < j`.
    SelfContacts,
    /// The sides are distinct collections with independent index spaces.
    Disjoint,
    /// The sides may share atoms; shared atoms never pair with themselves and
    /// each physical contact appears once.
    Crossed,
}

/// Atom-atom contacts between an i-side and a j-side collection.
///
/// An empty graph is an ordinary result meaning "no contact".
#[derive(Debug, Clone, PartialEq)]
pub struct ContactGraph {
    mode: ContactMode,
    edges: Vec<PointPair>,
}

impl ContactGraph {
    pub fn empty(mode: ContactMode) -> Self {
        Self {
            mode,
            edges: Vec::new(),
        }
    }

    /// Wraps edges found elsewhere, e.g. by a reference search.
    pub fn from_edges(mode: ContactMode, edges: Vec<PointPair>) -> Self {
        Self { mode, edges }
    }

    pub fn mode(&self) -> ContactMode {
        self.mode
    }

    pub fn edges(&self) -> &[PointPair] {
        &self.edges
    }

    pub fn num_contacts(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Indices of i-side atoms with at least one contact.
    pub fn contacting_atoms_i(&self) -> BTreeSet<usize> {
        self.edges.iter().map(|e| e.i).collect()
    }

    /// Indices of j-side atoms with at least one contact.
    pub fn contacting_atoms_j(&self) -> BTreeSet<usize> {
        self.edges.iter().map(|e| e.j).collect()
    }

    pub fn min_distance(&self) -> Option<f64> {
        self.edges.iter().map(|e| e.distance).min_by(f64::total_cmp)
    }

    /// Edges shorter than `threshold`.
    pub fn clashes(&self, threshold: f64) -> impl Iterator<Item = &PointPair> {
        self.edges.iter().filter(move |e| e.distance < threshold)
    }
}

/// Builds [`ContactGraph`]s on top of a [`SpatialGrid`].
#[derive(Debug, Clone, Copy)]
pub struct ContactGraphBuilder {
    cutoff: f64,
}

impl ContactGraphBuilder {
    pub fn new(cutoff: f64) -> Self {
        Self { cutoff }
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Contacts within one collection, without self-loops or mirrored edges.
    pub fn build_self(&self, atoms: &[Point3<f64>]) -> ContactGraph {
        let edges = SpatialGrid::single(atoms, self.cutoff).pairs_within();
        trace!(atoms = atoms.len(), contacts = edges.len(), "Built self contact graph.");
        ContactGraph {
            mode: ContactMode::SelfContacts,
            edges,
        }
    }

    /// Contacts between two distinct collections.
    pub fn build_between(&self, i_atoms: &[Point3<f64>], j_atoms: &[Point3<f64>]) -> ContactGraph {
        let edges = SpatialGrid::pair(i_atoms, j_atoms, self.cutoff).pairs_within();
        trace!(
            i_atoms = i_atoms.len(),
            j_atoms = j_atoms.len(),
            contacts = edges.len(),
            "Built contact graph."
        );
        ContactGraph {
            mode: ContactMode::Disjoint,
            edges,
        }
    }

    /// Contacts between two collections that may share atoms.
    ///
    /// Each atom is identified by a key. A pair whose two atoms have the same
    /// key is a self-contact and is skipped. When both orientations of one
    /// physical pair occur (an atom present on both sides), only the first is
    /// kept.
    pub fn build_crossed<K>(
        &self,
        i_atoms: &[Point3<f64>],
        i_keys: &[K],
        j_atoms: &[Point3<f64>],
        j_keys: &[K],
    ) -> ContactGraph
    where
        K: Copy + Eq + Hash + Ord,
    {
        let mut seen: HashSet<(K, K)> = HashSet::new();
        let edges = SpatialGrid::pair(i_atoms, j_atoms, self.cutoff)
            .pairs_within()
            .into_iter()
            .filter(|pair| {
                let (ki, kj) = (i_keys[pair.i], j_keys[pair.j]);
                ki != kj && seen.insert((ki.min(kj), ki.max(kj)))
            })
            .collect();
        ContactGraph {
            mode: ContactMode::Crossed,
            edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize, spacing: f64, y: f64) -> Vec<Point3<f64>> {
        (0..n).map(|k| Point3::new(k as f64 * spacing, y, 0.0)).collect()
    }

    #[test]
    fn self_graph_has_no_loops_or_mirrored_edges() {
        let atoms = line(4, 1.0, 0.0);
        let graph = ContactGraphBuilder::new(1.5).build_self(&atoms);
        assert_eq!(graph.mode(), ContactMode::SelfContacts);
        assert_eq!(graph.num_contacts(), 3);
        assert!(graph.edges().iter().all(|e| e.i < e.j));
    }

    #[test]
    fn disjoint_graph_records_distances() {
        let a = line(5, 1.5, 0.0);
        let b = line(5, 1.5, 3.0);
        let graph = ContactGraphBuilder::new(3.5).build_between(&a, &b);
        assert_eq!(graph.contacting_atoms_i().len(), 5);
        assert_eq!(graph.contacting_atoms_j().len(), 5);
        assert!((graph.min_distance().unwrap() - 3.0).abs() < 1e-12);
        assert!(graph.edges().iter().all(|e| e.distance <= 3.5));
    }

    #[test]
    fn far_apart_collections_give_an_empty_graph() {
        let a = line(3, 1.0, 0.0);
        let b = line(3, 1.0, 100.0);
        let graph = ContactGraphBuilder::new(5.0).build_between(&a, &b);
        assert!(graph.is_empty());
        assert_eq!(graph.min_distance(), None);
    }

    #[test]
    fn crossed_graph_skips_shared_atoms_and_duplicates() {
        // Atom keys 0..3 on both sides; atoms 1 and 2 appear on both.
        let positions = line(4, 1.0, 0.0);
        let i_atoms = positions[0..3].to_vec();
        let i_keys = [0usize, 1, 2];
        let j_atoms = positions[1..4].to_vec();
        let j_keys = [1usize, 2, 3];

        let graph = ContactGraphBuilder::new(1.2).build_crossed(&i_atoms, &i_keys, &j_atoms, &j_keys);

        let mut physical: Vec<(usize, usize)> = graph
            .edges()
            .iter()
            .map(|e| {
                let (a, b) = (i_keys[e.i], j_keys[e.j]);
                (a.min(b), a.max(b))
            })
            .collect();
        physical.sort_unstable();
        assert_eq!(physical, vec![(0, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn clashes_are_edges_below_threshold() {
        let a = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 4.0, 0.0)];
        let b = vec![Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 8.0, 0.0)];
        let graph = ContactGraphBuilder::new(5.0).build_between(&a, &b);
        assert_eq!(graph.num_contacts(), 3);
        assert_eq!(graph.clashes(1.5).count(), 1);
    }
}
