use super::chains::{ChainTemplate, PlacedChain};
use super::error::EngineError;
use crate::core::crystal::Crystal;
use crate::core::crystal::transform::SymmetryTransform;
use crate::core::utils::geometry::{BoundingBox, centroid};
use nalgebra::{Point3, Vector3};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Rotation determinants below this magnitude mark a transform as degenerate.
const DEGENERATE_DETERMINANT: f64 = 1e-6;

/// The selected chains of the asymmetric unit placed by one transform.
#[derive(Debug, Clone)]
pub struct AsymmetricUnitCopy {
    transform: SymmetryTransform,
    chains: Vec<PlacedChain>,
    bounds: BoundingBox,
}

impl AsymmetricUnitCopy {
    fn place(templates: &[Arc<ChainTemplate>], transform: SymmetryTransform) -> Option<Self> {
        let chains: Vec<PlacedChain> = templates
            .iter()
            .map(|t| PlacedChain::place(t.clone(), transform.clone()))
            .collect();
        let bounds = BoundingBox::union_all(chains.iter().map(|c| c.bounds()))?;
        Some(Self {
            transform,
            chains,
            bounds,
        })
    }

    pub fn operator_id(&self) -> usize {
        self.transform.operator_id()
    }

    pub fn transform(&self) -> &SymmetryTransform {
        &self.transform
    }

    pub fn chains(&self) -> &[PlacedChain] {
        &self.chains
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }
}

/// The asymmetric unit expanded by every operator of the space group.
///
/// Copy `k` is produced by operator `k`; copy 0 is the deposited unit.
#[derive(Debug, Clone)]
pub struct UnitCell {
    copies: Vec<AsymmetricUnitCopy>,
    radius: f64,
}

impl UnitCell {
    /// Largest distance of any atom from the centroid of its copy.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn copies(&self) -> &[AsymmetricUnitCopy] {
        &self.copies
    }

    pub fn num_copies(&self) -> usize {
        self.copies.len()
    }

    pub fn copy(&self, operator_id: usize) -> Option<&AsymmetricUnitCopy> {
        self.copies.get(operator_id)
    }
}

/// Generates symmetry copies of the asymmetric unit within a crystal.
#[derive(Debug, Clone, Copy)]
pub struct SymmetryEnumerator<'a> {
    crystal: &'a Crystal,
}

impl<'a> SymmetryEnumerator<'a> {
    pub fn new(crystal: &'a Crystal) -> Self {
        Self { crystal }
    }

    pub fn crystal(&self) -> &Crystal {
        self.crystal
    }

    pub fn num_operators(&self) -> usize {
        self.crystal.space_group.num_operators()
    }

    /// Combines operator `operator_id` with the lattice translation.
    pub fn resolve_transform(
        &self,
        operator_id: usize,
        translation: Vector3<i32>,
    ) -> Result<SymmetryTransform, EngineError> {
        let operator = self
            .crystal
            .space_group
            .operator(operator_id)
            .ok_or_else(|| {
                EngineError::Internal(format!(
                    "Operator {} requested from a space group with {} operators",
                    operator_id,
                    self.num_operators()
                ))
            })?;
        Ok(SymmetryTransform::resolve(
            operator_id,
            operator,
            translation,
            &self.crystal.cell,
        ))
    }

    /// Applies every operator to the asymmetric unit.
    ///
    /// Each copy is moved by whole lattice vectors so that its centroid lies
    /// within half a cell of the deposited centroid along every axis. The
    /// shift is part of the copy's transform.
    #[instrument(skip_all, name = "unit_cell_expansion")]
    pub fn expand_unit_cell(
        &self,
        templates: &[Arc<ChainTemplate>],
    ) -> Result<UnitCell, EngineError> {
        let reference = centroid(templates.iter().flat_map(|t| t.positions())).ok_or_else(|| {
            EngineError::Internal("Cannot expand an empty asymmetric unit".to_string())
        })?;
        let radius = templates
            .iter()
            .flat_map(|t| t.positions())
            .map(|p| nalgebra::distance(p, &reference))
            .fold(0.0, f64::max);
        let cell = &self.crystal.cell;
        let reference_frac = cell.to_fractional(&reference);

        let mut copies = Vec::with_capacity(self.num_operators());
        for operator_id in 0..self.num_operators() {
            let unshifted = self.resolve_transform(operator_id, Vector3::zeros())?;
            let moved_frac = cell.to_fractional(&unshifted.apply(&reference));
            let shift = recentering_shift(&reference_frac, &moved_frac);
            let transform = if shift == Vector3::zeros() {
                unshifted
            } else {
                self.resolve_transform(operator_id, shift)?
            };
            debug!(
                operator_id,
                shift = ?(shift.x, shift.y, shift.z),
                "Placed asymmetric unit copy."
            );
            let copy = AsymmetricUnitCopy::place(templates, transform).ok_or_else(|| {
                EngineError::Internal("Asymmetric unit copy has no atoms".to_string())
            })?;
            copies.push(copy);
        }
        Ok(UnitCell { copies, radius })
    }

    /// Places the asymmetric unit with an already resolved transform.
    pub fn place_copy(
        &self,
        templates: &[Arc<ChainTemplate>],
        transform: SymmetryTransform,
    ) -> Option<AsymmetricUnitCopy> {
        AsymmetricUnitCopy::place(templates, transform)
    }

    /// Box of `copy` after moving it by `translation`, without placing atoms.
    pub fn translated_bounds(&self, copy: &AsymmetricUnitCopy, translation: &Vector3<i32>) -> BoundingBox {
        copy.bounds.translated(&self.crystal.cell.lattice_vector(translation))
    }

    /// Whether a copy of `unit_cell` moved by `translation` can come within
    /// `cutoff` of the deposited unit.
    ///
    /// Re-centred copies keep their centroid within half the longest body
    /// diagonal of the deposited centroid, so a translation longer than that
    /// plus both radii and the cutoff cannot produce a contact.
    pub fn can_reach(&self, unit_cell: &UnitCell, translation: &Vector3<i32>, cutoff: f64) -> bool {
        let cell = &self.crystal.cell;
        let reach = 2.0 * unit_cell.radius + cutoff + cell.max_dimension() / 2.0;
        cell.lattice_vector(translation).norm() <= reach
    }

    /// Every lattice translation with components in `-shell..=shell`, except
    /// zero, nearest shells first.
    pub fn neighboring_cells(shell: u32) -> Vec<Vector3<i32>> {
        let s = shell as i32;
        let mut cells: Vec<Vector3<i32>> = (-s..=s)
            .flat_map(|i| (-s..=s).flat_map(move |j| (-s..=s).map(move |k| Vector3::new(i, j, k))))
            .filter(|t| *t != Vector3::zeros())
            .collect();
        cells.sort_by_key(|t| (shell_index(t), t.x, t.y, t.z));
        cells
    }
}

fn shell_index(t: &Vector3<i32>) -> i32 {
    t.x.abs().max(t.y.abs()).max(t.z.abs())
}

fn recentering_shift(reference: &Point3<f64>, moved: &Point3<f64>) -> Vector3<i32> {
    (moved - reference).map(|d| -(d.round() as i32))
}

#[derive(Debug, Clone)]
struct VisitedEntry {
    transform: SymmetryTransform,
    partner_matched: bool,
}

/// Append-only record of transforms whose contacts were fully explored.
///
/// Each entry can absorb at most one redundant partner, its inverse.
#[derive(Debug, Clone, Default)]
pub struct VisitedLog {
    entries: Vec<VisitedEntry>,
}

impl VisitedLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn record(&mut self, transform: SymmetryTransform) {
        self.entries.push(VisitedEntry {
            transform,
            partner_matched: false,
        });
    }

    /// Flags entry `index` as having consumed its inverse.
    pub fn mark_partner_matched(&mut self, index: usize) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.partner_matched = true;
        }
    }

    pub fn transforms(&self) -> impl Iterator<Item = &SymmetryTransform> {
        self.entries.iter().map(|e| &e.transform)
    }
}

/// Finds a visited transform that `candidate` is the inverse of.
///
/// Returns the index of the matching log entry, or `None` if the candidate
/// must be explored. Entries that already matched a partner are ignored.
/// Degenerate candidates are never redundant.
pub fn is_redundant(candidate: &SymmetryTransform, log: &VisitedLog) -> Option<usize> {
    let det = candidate.determinant();
    if det.abs() < DEGENERATE_DETERMINANT {
        warn!(
            operator_id = candidate.operator_id(),
            determinant = det,
            "Degenerate symmetry transform; treating it as non-redundant."
        );
        return None;
    }
    log.entries
        .iter()
        .position(|entry| !entry.partner_matched && candidate.is_inverse_of(&entry.transform))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::crystal::cell::CrystalCell;
    use crate::core::crystal::operator::SymmetryOperator;
    use crate::core::crystal::space_group::SpaceGroup;
    use crate::core::models::atom::Atom;
    use crate::core::models::chain::ChainType;
    use crate::core::models::system::MolecularSystem;
    use crate::core::tables::radii::RadiusTable;
    use crate::engine::config::{SelectionConfig, SurfaceConfig};
    use nalgebra::Matrix3;

    fn p21_crystal() -> Crystal {
        Crystal::new(
            CrystalCell::new(30.0, 40.0, 50.0, 90.0, 100.0, 90.0).unwrap(),
            SpaceGroup::from_symbol("P 1 21 1").unwrap(),
        )
    }

    fn short_chain() -> Vec<Arc<ChainTemplate>> {
        let mut system = MolecularSystem::new();
        let chain_id = system.add_chain('A', ChainType::Protein);
        for k in 0..3 {
            let res_id = system.add_residue(chain_id, k + 1, None, "GLY").unwrap();
            let position = Point3::new(12.0 + 1.5 * k as f64, 7.0, 9.0);
            let atom = Atom::new(k as usize + 1, "CA", "C", res_id, position);
            system.add_atom_to_residue(res_id, atom).unwrap();
        }
        ChainTemplate::collect(
            &system,
            &SelectionConfig::default(),
            &SurfaceConfig::default(),
            &RadiusTable::default(),
        )
        .into_iter()
        .map(Arc::new)
        .collect()
    }

    #[test]
    fn unit_cell_copies_stay_next_to_the_deposited_unit() {
        let crystal = p21_crystal();
        let enumerator = SymmetryEnumerator::new(&crystal);
        let unit_cell = enumerator.expand_unit_cell(&short_chain()).unwrap();

        assert_eq!(unit_cell.num_copies(), 2);
        assert!((unit_cell.radius() - 1.5).abs() < 1e-9);
        assert!(unit_cell.copy(0).unwrap().transform().is_identity());

        let reference = crystal.cell.to_fractional(&Point3::new(13.5, 7.0, 9.0));
        let moved = unit_cell.copy(1).unwrap().chains()[0].centroid().unwrap();
        let separation = crystal.cell.to_fractional(&moved) - reference;
        assert!(separation.amax() <= 0.5 + 1e-9);
    }

    #[test]
    fn distant_lattice_translations_cannot_reach_a_small_unit() {
        let crystal = p21_crystal();
        let enumerator = SymmetryEnumerator::new(&crystal);
        let unit_cell = enumerator.expand_unit_cell(&short_chain()).unwrap();

        // Reach is 2 * 1.5 + 5 plus half the longest body diagonal (about 37 Å).
        assert!(enumerator.can_reach(&unit_cell, &Vector3::new(1, 0, 0), 5.0));
        assert!(enumerator.can_reach(&unit_cell, &Vector3::new(0, 1, 0), 5.0));
        assert!(!enumerator.can_reach(&unit_cell, &Vector3::new(1, 1, 0), 5.0));
        assert!(!enumerator.can_reach(&unit_cell, &Vector3::new(2, 0, 0), 5.0));
        assert!(!enumerator.can_reach(&unit_cell, &Vector3::new(0, 2, 0), 5.0));
        assert!(enumerator.can_reach(&unit_cell, &Vector3::new(2, 0, 0), 30.0));
    }

    #[test]
    fn neighboring_cells_cover_the_shell_without_origin() {
        let cells = SymmetryEnumerator::neighboring_cells(2);
        assert_eq!(cells.len(), 124);
        assert!(!cells.contains(&Vector3::zeros()));
        assert!(cells[..26].iter().all(|t| shell_index(t) == 1));
        assert_eq!(SymmetryEnumerator::neighboring_cells(1).len(), 26);
    }

    #[test]
    fn resolve_transform_rejects_unknown_operator() {
        let crystal = p21_crystal();
        let enumerator = SymmetryEnumerator::new(&crystal);
        assert!(enumerator.resolve_transform(2, Vector3::zeros()).is_err());
        assert!(enumerator.resolve_transform(1, Vector3::new(0, 1, 0)).is_ok());
    }

    #[test]
    fn screw_axis_transform_and_its_inverse_are_detected() {
        let crystal = p21_crystal();
        let enumerator = SymmetryEnumerator::new(&crystal);
        // 2-fold screw (-x, y+1/2, -z): its inverse is (-x, y-1/2, -z).
        let forward = enumerator.resolve_transform(1, Vector3::zeros()).unwrap();
        let inverse = enumerator.resolve_transform(1, Vector3::new(0, -1, 0)).unwrap();
        let unrelated = enumerator.resolve_transform(1, Vector3::new(1, 0, 0)).unwrap();

        let mut log = VisitedLog::new();
        log.record(forward);
        assert_eq!(is_redundant(&inverse, &log), Some(0));
        assert_eq!(is_redundant(&unrelated, &log), None);

        log.mark_partner_matched(0);
        assert_eq!(is_redundant(&inverse, &log), None);
    }

    #[test]
    fn degenerate_transform_is_never_redundant() {
        let cell = CrystalCell::new(10.0, 10.0, 10.0, 90.0, 90.0, 90.0).unwrap();
        let flat = SymmetryOperator::new(Matrix3::zeros(), Vector3::zeros());
        let degenerate = SymmetryTransform::resolve(1, &flat, Vector3::zeros(), &cell);

        let mut log = VisitedLog::new();
        log.record(degenerate.clone());
        assert_eq!(is_redundant(&degenerate, &log), None);
    }

    #[test]
    fn recentering_moves_centroid_within_half_a_cell() {
        let reference = Point3::new(0.2, 0.3, 0.4);
        let moved = Point3::new(-0.2, 1.8, -0.4);
        let shift = recentering_shift(&reference, &moved);
        assert_eq!(shift, Vector3::new(0, -2, 1));
        let shifted = moved + shift.map(f64::from);
        assert!((shifted - reference).amax() <= 0.5);
    }
}
