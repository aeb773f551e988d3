use super::TableLoadError;
use crate::core::models::residue::{AminoAcidType, ResidueKind};
use phf::{Map, phf_map};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

// Chothia (1976) protein radii, as used by NACCESS.
const TRIGONAL_CARBON: f64 = 1.76;
const TETRAHEDRAL_CARBON: f64 = 1.87;
const TRIGONAL_NITROGEN: f64 = 1.65;
const TETRAHEDRAL_NITROGEN: f64 = 1.50;
const SULFUR: f64 = 1.85;
const OXYGEN: f64 = 1.40;

const NUCLEOTIDE_CARBON: f64 = 1.80;
const NUCLEOTIDE_NITROGEN: f64 = 1.60;
const PHOSPHORUS: f64 = 1.90;

const UNKNOWN_ELEMENT_RADIUS: f64 = 1.55;

static ELEMENT_RADII: Map<&'static str, f64> = phf_map! {
    "H" => 1.20,
    "D" => 1.20,
    "C" => 1.70,
    "N" => 1.55,
    "O" => 1.52,
    "F" => 1.47,
    "Na" => 2.27,
    "Mg" => 1.73,
    "P" => 1.80,
    "S" => 1.80,
    "Cl" => 1.75,
    "K" => 2.75,
    "Ca" => 2.00,
    "Fe" => 2.00,
    "Ni" => 1.63,
    "Cu" => 1.40,
    "Zn" => 1.39,
    "Se" => 1.90,
    "Br" => 1.85,
};

/// Van der Waals radii used for surface calculations.
///
/// Amino-acid atoms get the Chothia united-atom radii, which depend on the
/// hybridization implied by the atom name; nucleotide atoms get their own
/// per-element set. Everything else (ligands, ions, hydrogens) falls back to
/// the per-element table, and unknown elements to the nitrogen radius.
#[derive(Debug, Clone, PartialEq)]
pub struct RadiusTable {
    element_radii: HashMap<String, f64>,
    residue_rules: bool,
}

impl Default for RadiusTable {
    fn default() -> Self {
        Self::chothia()
    }
}

impl RadiusTable {
    /// Residue-aware radii for amino acids and nucleotides.
    pub fn chothia() -> Self {
        Self {
            element_radii: ELEMENT_RADII
                .entries()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
            residue_rules: true,
        }
    }

    /// Plain per-element radii, ignoring residue context.
    pub fn element_only() -> Self {
        Self {
            residue_rules: false,
            ..Self::chothia()
        }
    }

    /// Replaces or adds per-element radii.
    pub fn with_overrides(mut self, overrides: HashMap<String, f64>) -> Self {
        self.element_radii.extend(overrides);
        self
    }

    /// Loads per-element overrides from a TOML file of `Element = radius`
    /// pairs and applies them on top of the Chothia defaults.
    pub fn load_overrides(path: &Path) -> Result<Self, TableLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| TableLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let overrides: HashMap<String, f64> =
            toml::from_str(&content).map_err(|e| TableLoadError::Toml {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
        if let Some((element, radius)) = overrides
            .iter()
            .find(|(_, r)| !r.is_finite() || **r <= 0.0) {
            return Err(TableLoadError::InvalidEntry {
                path: path.to_string_lossy().to_string(),
                message: format!("radius for '{}' must be positive, got {}", element, radius),
            });
        }
        Ok(Self::chothia().with_overrides(overrides))
    }

    pub fn element_radius(&self, element: &str) -> Option<f64> {
        self.element_radii.get(element).copied()
    }

    /// Radius of an atom given its name, element and residue kind.
    pub fn radius(&self, atom_name: &str, element: &str, kind: ResidueKind) -> f64 {
        if self.residue_rules {
            let by_residue = match kind {
                ResidueKind::AminoAcid(aa) => amino_acid_radius(aa, atom_name, element),
                ResidueKind::Nucleotide(_) => nucleotide_radius(element),
                ResidueKind::Hetero | ResidueKind::Water => None,
            };
            if let Some(radius) = by_residue {
                return radius;
            }
        }
        self.element_radius(element).unwrap_or_else(|| {
            debug!(element, atom_name, "Unknown element; using the nitrogen radius.");
            UNKNOWN_ELEMENT_RADIUS
        })
    }
}

fn amino_acid_radius(aa: AminoAcidType, atom_name: &str, element: &str) -> Option<f64> {
    use AminoAcidType::*;
    match element {
        "O" => Some(OXYGEN),
        "S" => Some(SULFUR),
        "N" if atom_name == "NZ" => Some(TETRAHEDRAL_NITROGEN),
        "N" => Some(TRIGONAL_NITROGEN),
        "C" => match atom_name {
            "C" | "CE1" | "CE2" | "CE3" | "CH2" | "CZ" | "CZ2" | "CZ3" => Some(TRIGONAL_CARBON),
            "CA" | "CB" | "CE" | "CG1" | "CG2" => Some(TETRAHEDRAL_CARBON),
            "CG" | "CD" | "CD1" | "CD2" => match aa {
                Phenylalanine | Tryptophan | Tyrosine | Histidine | AsparticAcid | Asparagine => {
                    Some(TRIGONAL_CARBON)
                }
                Proline | Lysine | Arginine | Methionine | Isoleucine | Leucine => {
                    Some(TETRAHEDRAL_CARBON)
                }
                Glutamine | GlutamicAcid if atom_name == "CD" => Some(TRIGONAL_CARBON),
                Glutamine | GlutamicAcid if atom_name == "CG" => Some(TETRAHEDRAL_CARBON),
                _ => None,
            },
            _ => None,
        },
        _ => None,
    }
}

fn nucleotide_radius(element: &str) -> Option<f64> {
    match element {
        "C" => Some(NUCLEOTIDE_CARBON),
        "N" => Some(NUCLEOTIDE_NITROGEN),
        "P" => Some(PHOSPHORUS),
        "O" => Some(OXYGEN),
        _ => None,
    }
}
