use super::ids::{AtomId, ChainId};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AminoAcidType {
    // --- Aliphatic, Nonpolar ---
    Alanine,
    Glycine,
    Isoleucine,
    Leucine,
    Proline,
    Valine,

    // --- Aromatic ---
    Phenylalanine,
    Tryptophan,
    Tyrosine,

    // --- Polar, Uncharged ---
    Asparagine,
    Cysteine,
    Glutamine,
    Serine,
    Threonine,
    Methionine,

    // --- Charged ---
    Arginine,
    Lysine,
    AsparticAcid,
    GlutamicAcid,
    Histidine,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unrecognized amino acid code: '{0}'")]
pub struct ParseAminoAcidError(pub String);

impl AminoAcidType {
    pub const ALL: [AminoAcidType; 20] = [
        Self::Alanine,
        Self::Arginine,
        Self::Asparagine,
        Self::AsparticAcid,
        Self::Cysteine,
        Self::Glutamine,
        Self::GlutamicAcid,
        Self::Glycine,
        Self::Histidine,
        Self::Isoleucine,
        Self::Leucine,
        Self::Lysine,
        Self::Methionine,
        Self::Phenylalanine,
        Self::Proline,
        Self::Serine,
        Self::Threonine,
        Self::Tryptophan,
        Self::Tyrosine,
        Self::Valine,
    ];

    pub fn three_letter_code(self) -> &'static str {
        match self {
            Self::Alanine => "ALA",
            Self::Arginine => "ARG",
            Self::Asparagine => "ASN",
            Self::AsparticAcid => "ASP",
            Self::Cysteine => "CYS",
            Self::Glutamine => "GLN",
            Self::GlutamicAcid => "GLU",
            Self::Glycine => "GLY",
            Self::Histidine => "HIS",
            Self::Isoleucine => "ILE",
            Self::Leucine => "LEU",
            Self::Lysine => "LYS",
            Self::Methionine => "MET",
            Self::Phenylalanine => "PHE",
            Self::Proline => "PRO",
            Self::Serine => "SER",
            Self::Threonine => "THR",
            Self::Tryptophan => "TRP",
            Self::Tyrosine => "TYR",
            Self::Valine => "VAL",
        }
    }
}

impl FromStr for AminoAcidType {
    type Err = ParseAminoAcidError;

    /// Parses a three-letter residue name.
    ///
    /// Protonation-state variants of histidine (`HSD`, `HSE`, `HSP`, `HID`,
    /// `HIE`, `HIP`) and selenomethionine (`MSE`) map onto their parent
    /// amino acid, since they share its surface reference values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ALA" => Ok(Self::Alanine),
            "ARG" => Ok(Self::Arginine),
            "ASN" => Ok(Self::Asparagine),
            "ASP" => Ok(Self::AsparticAcid),
            "CYS" => Ok(Self::Cysteine),
            "GLN" => Ok(Self::Glutamine),
            "GLU" => Ok(Self::GlutamicAcid),
            "GLY" => Ok(Self::Glycine),
            "HIS" | "HSD" | "HSE" | "HSP" | "HID" | "HIE" | "HIP" => Ok(Self::Histidine),
            "ILE" => Ok(Self::Isoleucine),
            "LEU" => Ok(Self::Leucine),
            "LYS" => Ok(Self::Lysine),
            "MET" | "MSE" => Ok(Self::Methionine),
            "PHE" => Ok(Self::Phenylalanine),
            "PRO" => Ok(Self::Proline),
            "SER" => Ok(Self::Serine),
            "THR" => Ok(Self::Threonine),
            "TRP" => Ok(Self::Tryptophan),
            "TYR" => Ok(Self::Tyrosine),
            "VAL" => Ok(Self::Valine),
            other => Err(ParseAminoAcidError(other.to_string())),
        }
    }
}

impl fmt::Display for AminoAcidType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.three_letter_code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NucleicAcidType {
    Dna,
    Rna,
}

/// The closed set of residue kinds the engine distinguishes when filtering
/// atoms for contact and surface calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResidueKind {
    AminoAcid(AminoAcidType),
    Nucleotide(NucleicAcidType),
    Hetero,
    Water,
}

impl ResidueKind {
    /// Classifies a residue from its name.
    pub fn from_name(name: &str) -> Self {
        let name = name.trim().to_ascii_uppercase();
        if let Ok(aa) = name.parse::<AminoAcidType>() {
            return Self::AminoAcid(aa);
        }
        match name.as_str() {
            "HOH" | "WAT" | "DOD" | "H2O" | "TIP" | "TIP3" | "SOL" => Self::Water,
            "DA" | "DC" | "DG" | "DT" | "DU" | "DI" => Self::Nucleotide(NucleicAcidType::Dna),
            "A" | "C" | "G" | "U" | "I" => Self::Nucleotide(NucleicAcidType::Rna),
            _ => Self::Hetero,
        }
    }

    pub fn amino_acid(self) -> Option<AminoAcidType> {
        match self {
            Self::AminoAcid(aa) => Some(aa),
            _ => None,
        }
    }

    pub fn is_polymer(self) -> bool {
        matches!(self, Self::AminoAcid(_) | Self::Nucleotide(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Residue {
    pub number: isize,                      // Residue sequence number from source file
    pub insertion_code: Option<char>,       // PDB insertion code, if any
    pub name: String,                       // Name of the residue (e.g., "ALA", "HEM")
    pub kind: ResidueKind,                  // Classification derived from the name
    pub chain_id: ChainId,                  // ID of the parent chain
    pub(crate) atoms: Vec<AtomId>,          // Atoms in input order
    atom_name_map: HashMap<String, AtomId>, // Map from atom name to its stable ID
}

impl Residue {
    pub(crate) fn new(
        number: isize,
        insertion_code: Option<char>,
        name: &str,
        chain_id: ChainId,
    ) -> Self {
        Self {
            number,
            insertion_code,
            name: name.to_string(),
            kind: ResidueKind::from_name(name),
            chain_id,
            atoms: Vec::new(),
            atom_name_map: HashMap::new(),
        }
    }

    pub(crate) fn add_atom(&mut self, atom_name: &str, atom_id: AtomId) {
        self.atoms.push(atom_id);
        self.atom_name_map.insert(atom_name.to_string(), atom_id);
    }

    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }

    pub fn get_atom_id_by_name(&self, name: &str) -> Option<AtomId> {
        self.atom_name_map.get(name).copied()
    }

    /// Residue number with its insertion code, as printed in reports (e.g., "52A").
    pub fn label(&self) -> String {
        match self.insertion_code {
            Some(code) => format!("{}{}", self.number, code),
            None => self.number.to_string(),
        }
    }
}
