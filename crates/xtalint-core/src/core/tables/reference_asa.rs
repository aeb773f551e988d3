use super::TableLoadError;
use crate::core::models::residue::{AminoAcidType, ParseAminoAcidError};
use phf::{Map, phf_map};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

// Gly-X-Gly extended tripeptide values, Miller et al. (1987).
static TRIPEPTIDE_ASA: Map<&'static str, f64> = phf_map! {
    "ALA" => 113.0,
    "ARG" => 241.0,
    "ASN" => 158.0,
    "ASP" => 151.0,
    "CYS" => 140.0,
    "GLN" => 189.0,
    "GLU" => 183.0,
    "GLY" => 85.0,
    "HIS" => 194.0,
    "ILE" => 182.0,
    "LEU" => 180.0,
    "LYS" => 211.0,
    "MET" => 204.0,
    "PHE" => 218.0,
    "PRO" => 143.0,
    "SER" => 122.0,
    "THR" => 146.0,
    "TRP" => 259.0,
    "TYR" => 229.0,
    "VAL" => 160.0,
};

#[derive(Debug, Deserialize)]
struct ReferenceRecord {
    residue: String,
    asa: f64,
}

/// Maximum accessible area of each amino acid, used to derive relative ASA.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceAsaTable {
    values: HashMap<AminoAcidType, f64>,
}

impl Default for ReferenceAsaTable {
    fn default() -> Self {
        Self::extended_tripeptide()
    }
}

impl ReferenceAsaTable {
    pub fn extended_tripeptide() -> Self {
        let values = AminoAcidType::ALL
            .iter()
            .filter_map(|&aa| {
                TRIPEPTIDE_ASA
                    .get(aa.three_letter_code())
                    .map(|&asa| (aa, asa))
            })
            .collect();
        Self { values }
    }

    /// Loads a table from a CSV file with `residue,asa` columns.
    ///
    /// Amino acids missing from the file keep no reference value, so their
    /// relative ASA is reported as unavailable.
    pub fn load(path: &Path) -> Result<Self, TableLoadError> {
        let path_str = || path.to_string_lossy().to_string();
        let mut reader = csv::Reader::from_path(path).map_err(|e| TableLoadError::Csv {
            path: path_str(),
            source: e,
        })?;

        let mut values = HashMap::new();
        for result in reader.deserialize::<ReferenceRecord>() {
            let record = result.map_err(|e| TableLoadError::Csv {
                path: path_str(),
                source: e,
            })?;
            let aa: AminoAcidType = record.residue.parse().map_err(|e: ParseAminoAcidError| {
                TableLoadError::InvalidEntry {
                    path: path_str(),
                    message: e.to_string(),
                }
            })?;
            if !record.asa.is_finite() || record.asa <= 0.0 {
                return Err(TableLoadError::InvalidEntry {
                    path: path_str(),
                    message: format!("reference ASA for {} must be positive", record.residue),
                });
            }
            values.insert(aa, record.asa);
        }
        Ok(Self { values })
    }

    pub fn get(&self, aa: AminoAcidType) -> Option<f64> {
        self.values.get(&aa).copied()
    }

    /// `asa` divided by the reference value of `aa`.
    pub fn relative(&self, aa: AminoAcidType, asa: f64) -> Option<f64> {
        self.get(aa).map(|reference| asa / reference)
    }
}
