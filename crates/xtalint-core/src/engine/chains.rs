use super::config::{SelectionConfig, SurfaceConfig};
use crate::core::crystal::transform::SymmetryTransform;
use crate::core::models::chain::ChainType;
use crate::core::models::ids::{AtomId, ChainId, ResidueId};
use crate::core::models::residue::ResidueKind;
use crate::core::models::system::MolecularSystem;
use crate::core::tables::radii::RadiusTable;
use crate::core::utils::geometry::{BoundingBox, centroid};
use nalgebra::Point3;
use std::ops::Range;
use std::sync::Arc;
use tracing::debug;

/// A residue of a [`ChainTemplate`] and the contiguous range of its atoms.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateResidue {
    pub residue_id: ResidueId,
    pub number: isize,
    pub insertion_code: Option<char>,
    pub name: String,
    pub kind: ResidueKind,
    pub atoms: Range<usize>,
}

/// The selected atoms of one deposited chain, flattened for the engines.
///
/// Atoms are stored residue by residue in input order, with their radii
/// resolved once. Symmetry copies share a template and only carry their own
/// coordinates.
#[derive(Debug, Clone)]
pub struct ChainTemplate {
    chain_id: ChainId,
    code: char,
    atom_ids: Vec<AtomId>,
    serials: Vec<usize>,
    names: Vec<String>,
    radii: Vec<f64>,
    positions: Vec<Point3<f64>>,
    residues: Vec<TemplateResidue>,
    atom_residue: Vec<usize>,
}

impl ChainTemplate {
    /// Builds templates for every chain the selection admits, in chain order.
    ///
    /// Chains left without atoms after filtering are dropped.
    pub fn collect(
        system: &MolecularSystem,
        selection: &SelectionConfig,
        surface: &SurfaceConfig,
        radii: &RadiusTable,
    ) -> Vec<ChainTemplate> {
        system
            .chains_iter()
            .filter(|(_, chain)| chain_is_selected(chain.chain_type, selection))
            .filter_map(|(chain_id, _)| {
                let template = Self::from_chain(system, chain_id, selection, surface, radii)?;
                if template.is_empty() {
                    debug!(chain = %template.code, "Chain has no selected atoms; skipping.");
                    None
                } else {
                    Some(template)
                }
            })
            .collect()
    }

    /// Builds the template of a single chain, or `None` if it does not exist.
    pub fn from_chain(
        system: &MolecularSystem,
        chain_id: ChainId,
        selection: &SelectionConfig,
        surface: &SurfaceConfig,
        radii: &RadiusTable,
    ) -> Option<ChainTemplate> {
        let chain = system.chain(chain_id)?;
        let mut template = ChainTemplate {
            chain_id,
            code: chain.id,
            atom_ids: Vec::new(),
            serials: Vec::new(),
            names: Vec::new(),
            radii: Vec::new(),
            positions: Vec::new(),
            residues: Vec::new(),
            atom_residue: Vec::new(),
        };

        for &residue_id in chain.residues() {
            let Some(residue) = system.residue(residue_id) else {
                continue;
            };
            if !residue_is_selected(residue.kind, selection) {
                continue;
            }

            let start = template.atom_ids.len();
            for &atom_id in residue.atoms() {
                let Some(atom) = system.atom(atom_id) else {
                    continue;
                };
                if atom.is_hydrogen() && !surface.include_hydrogens {
                    continue;
                }
                template.atom_ids.push(atom_id);
                template.serials.push(atom.serial);
                template.names.push(atom.name.clone());
                template.radii.push(radii.radius(&atom.name, &atom.element, residue.kind));
                template.positions.push(atom.position);
                template.atom_residue.push(template.residues.len());
            }

            let end = template.atom_ids.len();
            if end > start {
                template.residues.push(TemplateResidue {
                    residue_id,
                    number: residue.number,
                    insertion_code: residue.insertion_code,
                    name: residue.name.clone(),
                    kind: residue.kind,
                    atoms: start..end,
                });
            }
        }

        Some(template)
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// The chain code, i.e. the chain's biological identity.
    pub fn code(&self) -> char {
        self.code
    }

    pub fn len(&self) -> usize {
        self.atom_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atom_ids.is_empty()
    }

    pub fn atom_ids(&self) -> &[AtomId] {
        &self.atom_ids
    }

    pub fn serials(&self) -> &[usize] {
        &self.serials
    }

    pub fn atom_name(&self, index: usize) -> &str {
        &self.names[index]
    }

    pub fn radii(&self) -> &[f64] {
        &self.radii
    }

    /// Deposited coordinates.
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    pub fn residues(&self) -> &[TemplateResidue] {
        &self.residues
    }

    /// The residue owning the atom at `index`.
    pub fn residue_of(&self, index: usize) -> &TemplateResidue {
        &self.residues[self.atom_residue[index]]
    }
}

fn chain_is_selected(chain_type: ChainType, selection: &SelectionConfig) -> bool {
    if selection.include_non_polymer {
        chain_type != ChainType::Water
    } else {
        chain_type == ChainType::Protein
    }
}

fn residue_is_selected(kind: ResidueKind, selection: &SelectionConfig) -> bool {
    match kind {
        ResidueKind::Water => false,
        ResidueKind::Hetero => selection.include_non_polymer,
        ResidueKind::AminoAcid(_) | ResidueKind::Nucleotide(_) => true,
    }
}

/// A chain template placed in the crystal by a symmetry transform.
#[derive(Debug, Clone)]
pub struct PlacedChain {
    template: Arc<ChainTemplate>,
    transform: SymmetryTransform,
    positions: Vec<Point3<f64>>,
    bounds: BoundingBox,
}

impl PlacedChain {
    /// The chain at its deposited coordinates.
    pub fn original(template: Arc<ChainTemplate>) -> Self {
        let positions = template.positions().to_vec();
        Self::with_positions(template, SymmetryTransform::identity(), positions)
    }

    /// The chain moved by `transform`.
    pub fn place(template: Arc<ChainTemplate>, transform: SymmetryTransform) -> Self {
        let positions = template
            .positions()
            .iter()
            .map(|p| transform.apply(p))
            .collect();
        Self::with_positions(template, transform, positions)
    }

    fn with_positions(
        template: Arc<ChainTemplate>,
        transform: SymmetryTransform,
        positions: Vec<Point3<f64>>,
    ) -> Self {
        // Templates are never empty, so a box always exists.
        let bounds = BoundingBox::from_points(&positions).unwrap_or(BoundingBox {
            min: Point3::origin(),
            max: Point3::origin(),
        });
        Self {
            template,
            transform,
            positions,
            bounds,
        }
    }

    pub fn template(&self) -> &Arc<ChainTemplate> {
        &self.template
    }

    pub fn code(&self) -> char {
        self.template.code()
    }

    pub fn transform(&self) -> &SymmetryTransform {
        &self.transform
    }

    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    pub fn centroid(&self) -> Option<Point3<f64>> {
        centroid(&self.positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;

    fn add_residue(
        system: &mut MolecularSystem,
        chain: char,
        chain_type: ChainType,
        number: isize,
        name: &str,
        atoms: &[(&str, &str, f64)],
    ) {
        let chain_id = system.add_chain(chain, chain_type);
        let res_id = system.add_residue(chain_id, number, None, name).unwrap();
        for (atom_name, element, x) in atoms {
            let serial = system.atom_count() + 1;
            let atom = Atom::new(serial, atom_name, element, res_id, Point3::new(*x, 0.0, 0.0));
            system.add_atom_to_residue(res_id, atom).unwrap();
        }
    }

    fn sample_system() -> MolecularSystem {
        let mut system = MolecularSystem::new();
        add_residue(&mut system, 'A', ChainType::Protein, 1, "ALA", &[("N", "N", 0.0), ("CA", "C", 1.5), ("H", "H", -1.0)]);
        add_residue(&mut system, 'A', ChainType::Protein, 2, "SO4", &[("S", "S", 3.0)]);
        add_residue(&mut system, 'A', ChainType::Protein, 3, "HOH", &[("O", "O", 6.0)]);
        add_residue(&mut system, 'B', ChainType::Ligand, 101, "HEM", &[("FE", "Fe", 10.0)]);
        add_residue(&mut system, 'W', ChainType::Water, 201, "HOH", &[("O", "O", 20.0)]);
        system
    }

    #[test]
    fn default_selection_keeps_protein_residues_without_hydrogens() {
        let system = sample_system();
        let templates = ChainTemplate::collect(
            &system,
            &SelectionConfig::default(),
            &SurfaceConfig::default(),
            &RadiusTable::default(),
        );
        assert_eq!(templates.len(), 1);
        let template = &templates[0];
        assert_eq!(template.code(), 'A');
        assert_eq!(template.len(), 2);
        assert_eq!(template.residues().len(), 1);
        assert_eq!(template.residues()[0].atoms, 0..2);
        assert_eq!(template.radii(), &[1.65, 1.87]);
    }

    #[test]
    fn non_polymer_selection_adds_ligands_but_never_water() {
        let system = sample_system();
        let selection = SelectionConfig {
            include_non_polymer: true,
        };
        let templates = ChainTemplate::collect(
            &system,
            &selection,
            &SurfaceConfig::default(),
            &RadiusTable::default(),
        );
        let codes: Vec<char> = templates.iter().map(|t| t.code()).collect();
        assert_eq!(codes, vec!['A', 'B']);
        assert_eq!(templates[0].residues().len(), 2);
        assert_eq!(templates[0].residue_of(2).name, "SO4");
    }

    #[test]
    fn hydrogens_are_kept_on_request() {
        let system = sample_system();
        let surface = SurfaceConfig {
            include_hydrogens: true,
            ..SurfaceConfig::default()
        };
        let templates = ChainTemplate::collect(
            &system,
            &SelectionConfig::default(),
            &surface,
            &RadiusTable::default(),
        );
        assert_eq!(templates[0].len(), 3);
    }

    #[test]
    fn placed_chain_moves_positions_and_bounds() {
        let system = sample_system();
        let template = Arc::new(
            ChainTemplate::collect(
                &system,
                &SelectionConfig::default(),
                &SurfaceConfig::default(),
                &RadiusTable::default(),
            )
            .remove(0),
        );
        let original = PlacedChain::original(template.clone());
        assert!(original.transform().is_identity());
        assert_eq!(original.bounds().max.x, 1.5);

        let cell = crate::core::crystal::cell::CrystalCell::new(10.0, 10.0, 10.0, 90.0, 90.0, 90.0).unwrap();
        let shifted = SymmetryTransform::identity().translated(&nalgebra::Vector3::new(1, 0, 0), &cell);
        let placed = PlacedChain::place(template, shifted);
        assert!((placed.positions()[0].x - 10.0).abs() < 1e-12);
        assert!((placed.bounds().max.x - 11.5).abs() < 1e-12);
    }
}
