use super::asa::{AsaEngine, ResidueArea, asa_atoms, residue_areas};
use super::chains::{ChainTemplate, PlacedChain};
use super::contacts::ContactGraph;
use super::error::EngineError;
use super::grid::PointPair;
use super::progress::{Progress, ProgressReporter};
use crate::core::models::ids::{ChainId, ResidueId};
use crate::core::models::residue::{AminoAcidType, ResidueKind};
use crate::core::tables::reference_asa::ReferenceAsaTable;
use nalgebra::Vector3;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Residues with a buried fraction at or above this value form the
/// interface core; the others are rim residues.
pub const CORE_BURIED_FRACTION: f64 = 0.95;

/// Buried areas at or below this value are treated as numerical noise when
/// classifying residues.
const BURIED_AREA_EPSILON: f64 = 1e-6;

const DISULFIDE_DISTANCE: f64 = 2.05;
const DISULFIDE_TOLERANCE: f64 = 0.10;

/// Structural identity of an interface.
///
/// Two interfaces are the same when they join chains of the same biological
/// identity through the same set of atom contacts, regardless of which
/// symmetry copy produced them or which side is listed first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InterfaceKey {
    chains: (char, char),
    edges: Vec<(usize, usize)>,
}

fn sorted_edges(edges: impl Iterator<Item = (usize, usize)>) -> Vec<(usize, usize)> {
    let mut edges: Vec<(usize, usize)> = edges.collect();
    edges.sort_unstable();
    edges.dedup();
    edges
}

impl InterfaceKey {
    pub fn new(first: &PlacedChain, second: &PlacedChain, contacts: &ContactGraph) -> Self {
        let (a, b) = (first.code(), second.code());
        let first_serials = first.template().serials();
        let second_serials = second.template().serials();

        let as_listed = sorted_edges(
            contacts
                .edges()
                .iter()
                .map(|edge| (first_serials[edge.i], second_serials[edge.j])),
        );
        let edges = match a.cmp(&b) {
            Ordering::Less => as_listed,
            Ordering::Greater => sorted_edges(as_listed.into_iter().map(|(s1, s2)| (s2, s1))),
            // Either chain may be listed first; the smaller of the two views
            // represents the contact set.
            Ordering::Equal => {
                let mirrored = sorted_edges(as_listed.iter().map(|&(s1, s2)| (s2, s1)));
                as_listed.min(mirrored)
            }
        };

        Self {
            chains: (a.min(b), a.max(b)),
            edges,
        }
    }

    pub fn chains(&self) -> (char, char) {
        self.chains
    }
}

/// Per-atom and per-residue areas of one side of an interface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterfaceSide {
    atom_asa: Vec<f64>,
    atom_bsa: Vec<f64>,
    residues: Vec<ResidueArea>,
}

impl InterfaceSide {
    fn new(
        template: &ChainTemplate,
        isolated: &[f64],
        complexed: &[f64],
        reference: &ReferenceAsaTable,
    ) -> Self {
        Self {
            atom_asa: isolated.to_vec(),
            atom_bsa: isolated.iter().zip(complexed).map(|(i, c)| i - c).collect(),
            residues: residue_areas(template, isolated, Some(complexed), reference),
        }
    }

    /// Accessible area of each atom in the isolated chain.
    pub fn atom_asa(&self) -> &[f64] {
        &self.atom_asa
    }

    pub fn atom_bsa(&self) -> &[f64] {
        &self.atom_bsa
    }

    pub fn residues(&self) -> &[ResidueArea] {
        &self.residues
    }

    pub fn buried_area(&self) -> f64 {
        self.residues.iter().map(|r| r.bsa).sum()
    }

    /// Residues that lose any accessible area.
    pub fn interface_residues(&self) -> impl Iterator<Item = &ResidueArea> {
        self.residues.iter().filter(|r| r.bsa > BURIED_AREA_EPSILON)
    }

    pub fn core_residues(&self) -> impl Iterator<Item = &ResidueArea> {
        self.interface_residues()
            .filter(|r| r.buried_fraction().is_some_and(|f| f >= CORE_BURIED_FRACTION))
    }

    pub fn rim_residues(&self) -> impl Iterator<Item = &ResidueArea> {
        self.interface_residues()
            .filter(|r| r.buried_fraction().is_some_and(|f| f < CORE_BURIED_FRACTION))
    }
}

/// Two chain copies in contact.
///
/// The first chain is always at its deposited position. Areas are empty
/// until the interface passes through an [`InterfaceCatalog`].
#[derive(Debug, Clone)]
pub struct ChainInterface {
    id: usize,
    first: PlacedChain,
    second: PlacedChain,
    contacts: ContactGraph,
    key: InterfaceKey,
    first_side: InterfaceSide,
    second_side: InterfaceSide,
}

impl ChainInterface {
    pub fn new(first: PlacedChain, second: PlacedChain, contacts: ContactGraph) -> Self {
        let key = InterfaceKey::new(&first, &second, &contacts);
        Self {
            id: 0,
            first,
            second,
            contacts,
            key,
            first_side: InterfaceSide::default(),
            second_side: InterfaceSide::default(),
        }
    }

    /// Catalog id, starting at 1; 0 before cataloging.
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn first(&self) -> &PlacedChain {
        &self.first
    }

    pub fn second(&self) -> &PlacedChain {
        &self.second
    }

    pub fn contacts(&self) -> &ContactGraph {
        &self.contacts
    }

    pub fn key(&self) -> &InterfaceKey {
        &self.key
    }

    pub fn first_side(&self) -> &InterfaceSide {
        &self.first_side
    }

    pub fn second_side(&self) -> &InterfaceSide {
        &self.second_side
    }

    pub fn num_contacts(&self) -> usize {
        self.contacts.num_contacts()
    }

    /// Operator placing the second chain.
    pub fn operator_id(&self) -> usize {
        self.second.transform().operator_id()
    }

    /// Lattice translation placing the second chain.
    pub fn translation(&self) -> &Vector3<i32> {
        self.second.transform().translation()
    }

    /// Whether both chains come from the deposited asymmetric unit.
    pub fn is_within_asymmetric_unit(&self) -> bool {
        self.second.transform().is_identity()
    }

    pub fn total_buried_area(&self) -> f64 {
        self.first_side.buried_area() + self.second_side.buried_area()
    }

    /// Half the total buried area, i.e. the area of the contact surface.
    pub fn interface_area(&self) -> f64 {
        self.total_buried_area() / 2.0
    }

    pub fn num_clashes(&self, threshold: f64) -> usize {
        self.contacts.clashes(threshold).count()
    }

    pub fn has_clashes(&self, threshold: f64) -> bool {
        self.contacts.clashes(threshold).next().is_some()
    }

    /// Residues of each side with at least one atom contact, in chain order.
    pub fn contacting_residues(&self) -> (Vec<ResidueId>, Vec<ResidueId>) {
        let side = |chain: &PlacedChain, atoms: std::collections::BTreeSet<usize>| {
            let template = chain.template();
            let mut ids: Vec<ResidueId> = Vec::new();
            for index in atoms {
                let id = template.residue_of(index).residue_id;
                if ids.last() != Some(&id) {
                    ids.push(id);
                }
            }
            ids
        };
        (
            side(&self.first, self.contacts.contacting_atoms_i()),
            side(&self.second, self.contacts.contacting_atoms_j()),
        )
    }

    /// Cysteine SG pairs at disulfide-bond distance.
    pub fn disulfide_bridges(&self) -> Vec<&PointPair> {
        let is_cys_sg = |chain: &PlacedChain, index: usize| {
            let template = chain.template();
            template.atom_name(index) == "SG"
                && template.residue_of(index).kind == ResidueKind::AminoAcid(AminoAcidType::Cysteine)
        };
        self.contacts
            .edges()
            .iter()
            .filter(|e| (e.distance - DISULFIDE_DISTANCE).abs() <= DISULFIDE_TOLERANCE)
            .filter(|e| is_cys_sg(&self.first, e.i) && is_cys_sg(&self.second, e.j))
            .collect()
    }

    fn sort_key(&self) -> (char, char, usize, [i32; 3]) {
        let t = self.translation();
        (self.first.code(), self.second.code(), self.operator_id(), [t.x, t.y, t.z])
    }
}

/// The distinct interfaces of a structure, largest first, with ids from 1.
#[derive(Debug, Clone, Default)]
pub struct InterfaceCatalog {
    interfaces: Vec<ChainInterface>,
}

impl InterfaceCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Deduplicates the candidates, computes their areas, sorts them and
    /// assigns ids.
    ///
    /// Isolated-chain areas are computed once per chain and operator and
    /// shared by every interface using that copy.
    #[instrument(skip_all, name = "interface_catalog")]
    pub fn build(
        candidates: Vec<ChainInterface>,
        asa: &AsaEngine,
        reference: &ReferenceAsaTable,
        reporter: &ProgressReporter,
    ) -> Result<Self, EngineError> {
        let total_candidates = candidates.len();
        let mut interfaces = deduplicate(candidates);
        info!(
            candidates = total_candidates,
            distinct = interfaces.len(),
            "Deduplicated interface candidates."
        );

        reporter.report(Progress::TaskStart {
            total: interfaces.len() as u64,
        });
        let mut isolated_cache: HashMap<(ChainId, usize), Arc<Vec<f64>>> = HashMap::new();
        for interface in &mut interfaces {
            let first_isolated = isolated_asa(&mut isolated_cache, &interface.first, asa)?;
            let second_isolated = isolated_asa(&mut isolated_cache, &interface.second, asa)?;

            let mut complex = asa_atoms(interface.first.positions(), interface.first.template().radii());
            complex.extend(asa_atoms(
                interface.second.positions(),
                interface.second.template().radii(),
            ));
            let complexed = asa.calculate(&complex)?;
            let (first_complexed, second_complexed) = complexed.split_at(interface.first.template().len());

            interface.first_side = InterfaceSide::new(
                interface.first.template(),
                &first_isolated,
                first_complexed,
                reference,
            );
            interface.second_side = InterfaceSide::new(
                interface.second.template(),
                &second_isolated,
                second_complexed,
                reference,
            );
            reporter.report(Progress::TaskIncrement { amount: 1 });
        }
        reporter.report(Progress::TaskFinish);

        interfaces.sort_by(|a, b| {
            b.interface_area()
                .total_cmp(&a.interface_area())
                .then_with(|| a.sort_key().cmp(&b.sort_key()))
        });
        for (index, interface) in interfaces.iter_mut().enumerate() {
            interface.id = index + 1;
        }

        debug!(
            isolated_passes = isolated_cache.len(),
            "Finished interface areas."
        );
        Ok(Self { interfaces })
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChainInterface> {
        self.interfaces.iter()
    }

    pub fn interfaces(&self) -> &[ChainInterface] {
        &self.interfaces
    }

    /// Looks an interface up by its catalog id.
    pub fn get(&self, id: usize) -> Option<&ChainInterface> {
        id.checked_sub(1).and_then(|index| self.interfaces.get(index))
    }

    pub fn count_above_area(&self, min_area: f64) -> usize {
        self.interfaces
            .iter()
            .filter(|i| i.interface_area() > min_area)
            .count()
    }

    pub fn num_with_clashes(&self, threshold: f64) -> usize {
        self.interfaces
            .iter()
            .filter(|i| i.has_clashes(threshold))
            .count()
    }
}

impl<'a> IntoIterator for &'a InterfaceCatalog {
    type Item = &'a ChainInterface;
    type IntoIter = std::slice::Iter<'a, ChainInterface>;

    fn into_iter(self) -> Self::IntoIter {
        self.interfaces.iter()
    }
}

/// Keeps the first interface of every structural identity, in input order.
fn deduplicate(candidates: Vec<ChainInterface>) -> Vec<ChainInterface> {
    let mut seen: HashSet<InterfaceKey> = HashSet::with_capacity(candidates.len());
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.key.clone()))
        .collect()
}

fn isolated_asa(
    cache: &mut HashMap<(ChainId, usize), Arc<Vec<f64>>>,
    chain: &PlacedChain,
    asa: &AsaEngine,
) -> Result<Arc<Vec<f64>>, EngineError> {
    let key = (chain.template().chain_id(), chain.transform().operator_id());
    if let Some(values) = cache.get(&key) {
        return Ok(values.clone());
    }
    let values = Arc::new(asa.calculate(&asa_atoms(chain.positions(), chain.template().radii()))?);
    cache.insert(key, values.clone());
    Ok(values)
}
