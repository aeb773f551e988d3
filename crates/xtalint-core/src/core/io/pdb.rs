use crate::core::crystal::Crystal;
use crate::core::crystal::cell::CrystalCell;
use crate::core::crystal::error::CrystalError;
use crate::core::crystal::space_group::SpaceGroup;
use crate::core::io::traits::StructureFile;
use crate::core::models::atom::{Atom, element_from_atom_name};
use crate::core::models::chain::ChainType;
use crate::core::models::ids::{ChainId, ResidueId};
use crate::core::models::residue::{NucleicAcidType, ResidueKind};
use crate::core::models::system::MolecularSystem;
use nalgebra::Point3;
use std::collections::{HashMap, HashSet};
use std::io::{self, BufRead};
use thiserror::Error;

/// Header information carried by a PDB file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdbMetadata {
    /// The four-character entry code from the `HEADER` record.
    pub id_code: Option<String>,
    /// The unit cell from the `CRYST1` record.
    pub cell: Option<CrystalCell>,
    /// The space-group symbol from the `CRYST1` record.
    pub space_group_symbol: Option<String>,
}

impl PdbMetadata {
    /// Resolves the crystal described by the `CRYST1` record.
    ///
    /// Returns `Ok(None)` when the file has no cell, only the 1x1x1
    /// placeholder cell, or no space-group symbol.
    ///
    /// # Errors
    ///
    /// Returns [`CrystalError::UnknownSpaceGroup`] if the symbol is not in the
    /// built-in table.
    pub fn crystal(&self) -> Result<Option<Crystal>, CrystalError> {
        let (Some(cell), Some(symbol)) = (&self.cell, &self.space_group_symbol) else {
            return Ok(None);
        };
        if cell.is_dummy() {
            return Ok(None);
        }
        let space_group = SpaceGroup::from_symbol(symbol)?;
        Ok(Some(Crystal::new(cell.clone(), space_group)))
    }
}

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: PdbParseErrorKind,
    },
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
    #[error("Invalid crystal description on line {line}: {source}")]
    Crystal {
        line: usize,
        #[source]
        source: CrystalError,
    },
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: &'static str, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: &'static str, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: &'static str },
    #[error("Line is too short for a {record} record")]
    LineTooShort { record: &'static str },
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

fn parse_float(line: &str, line_num: usize, start: usize, end: usize, columns: &'static str) -> Result<f64, PdbError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns,
            value: value.into(),
        },
    })
}

fn parse_int<T: std::str::FromStr>(
    line: &str,
    line_num: usize,
    start: usize,
    end: usize,
    columns: &'static str,
) -> Result<T, PdbError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidInt {
            columns,
            value: value.into(),
        },
    })
}

pub struct PdbFile;

impl PdbFile {
    fn parse_cryst1(line: &str, line_num: usize) -> Result<(CrystalCell, Option<String>), PdbError> {
        if line.len() < 54 {
            return Err(PdbError::Parse {
                line: line_num,
                kind: PdbParseErrorKind::LineTooShort { record: "CRYST1" },
            });
        }
        let a = parse_float(line, line_num, 6, 15, "7-15")?;
        let b = parse_float(line, line_num, 15, 24, "16-24")?;
        let c = parse_float(line, line_num, 24, 33, "25-33")?;
        let alpha = parse_float(line, line_num, 33, 40, "34-40")?;
        let beta = parse_float(line, line_num, 40, 47, "41-47")?;
        let gamma = parse_float(line, line_num, 47, 54, "48-54")?;
        let cell = CrystalCell::new(a, b, c, alpha, beta, gamma).map_err(|source| PdbError::Crystal {
            line: line_num,
            source,
        })?;
        let symbol = slice_and_trim(line, 55, 66);
        Ok((cell, (!symbol.is_empty()).then(|| symbol.to_string())))
    }

    fn classify_chains(system: &mut MolecularSystem) {
        let chain_types: Vec<(ChainId, ChainType)> = system
            .chains_iter()
            .map(|(chain_id, chain)| {
                let kinds: Vec<ResidueKind> = chain
                    .residues()
                    .iter()
                    .filter_map(|&r| system.residue(r).map(|res| res.kind))
                    .collect();
                (chain_id, chain_type_from_kinds(&kinds))
            })
            .collect();

        for (chain_id, chain_type) in chain_types {
            if let Some(chain) = system.chain_mut(chain_id) {
                chain.chain_type = chain_type;
            }
        }
    }
}

fn chain_type_from_kinds(kinds: &[ResidueKind]) -> ChainType {
    if kinds.iter().any(|k| matches!(k, ResidueKind::AminoAcid(_))) {
        ChainType::Protein
    } else if kinds
        .iter()
        .any(|k| matches!(k, ResidueKind::Nucleotide(NucleicAcidType::Dna)))
    {
        ChainType::DNA
    } else if kinds
        .iter()
        .any(|k| matches!(k, ResidueKind::Nucleotide(NucleicAcidType::Rna)))
    {
        ChainType::RNA
    } else if !kinds.is_empty() && kinds.iter().all(|k| *k == ResidueKind::Water) {
        ChainType::Water
    } else if kinds.is_empty() {
        ChainType::Other
    } else {
        ChainType::Ligand
    }
}

impl StructureFile for PdbFile {
    type Metadata = PdbMetadata;
    type Error = PdbError;

    fn read_from(
        reader: &mut impl BufRead,
    ) -> Result<(MolecularSystem, Self::Metadata), Self::Error> {
        let mut system = MolecularSystem::new();
        let mut metadata = PdbMetadata::default();
        let mut seen_serials: HashSet<(char, usize)> = HashSet::new();
        let mut residue_cache: HashMap<(char, isize, Option<char>), ResidueId> = HashMap::new();
        let mut in_first_model = true;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            let record_type = slice_and_trim(&line, 0, 6);

            match record_type {
                "HEADER" => {
                    let code = slice_and_trim(&line, 62, 66);
                    if !code.is_empty() {
                        metadata.id_code = Some(code.to_string());
                    }
                }
                "CRYST1" => {
                    let (cell, symbol) = Self::parse_cryst1(&line, line_num)?;
                    metadata.cell = Some(cell);
                    metadata.space_group_symbol = symbol;
                }
                "ENDMDL" => in_first_model = false,
                "END" => break,
                "ATOM" | "HETATM" if in_first_model => {
                    if line.len() < 54 {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::LineTooShort { record: "ATOM/HETATM" },
                        });
                    }

                    let alt_loc = line.get(16..17).and_then(|s| s.chars().next()).unwrap_or(' ');
                    if alt_loc != ' ' && alt_loc != 'A' {
                        continue;
                    }

                    let serial: usize = parse_int(&line, line_num, 6, 11, "7-11")?;
                    let name = slice_and_trim(&line, 12, 16);
                    if name.is_empty() {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::MissingRequiredField { columns: "13-16" },
                        });
                    }
                    let res_name = slice_and_trim(&line, 17, 20);
                    let chain_code = slice_and_trim(&line, 21, 22).chars().next().unwrap_or('A');
                    let res_seq: isize = parse_int(&line, line_num, 22, 26, "23-26")?;
                    let insertion_code = slice_and_trim(&line, 26, 27).chars().next();
                    let x = parse_float(&line, line_num, 30, 38, "31-38")?;
                    let y = parse_float(&line, line_num, 38, 46, "39-46")?;
                    let z = parse_float(&line, line_num, 46, 54, "47-54")?;

                    let element_field = slice_and_trim(&line, 76, 78);
                    let element = if element_field.is_empty() {
                        element_from_atom_name(name)
                    } else {
                        element_field.to_string()
                    };

                    if !seen_serials.insert((chain_code, serial)) {
                        return Err(PdbError::Inconsistency(format!(
                            "Duplicate atom serial {} in chain {}",
                            serial, chain_code
                        )));
                    }

                    let residue_key = (chain_code, res_seq, insertion_code);
                    let residue_id = match residue_cache.get(&residue_key) {
                        Some(&id) => id,
                        None => {
                            let chain_id = system.add_chain(chain_code, ChainType::Other);
                            let id = system
                                .add_residue(chain_id, res_seq, insertion_code, res_name)
                                .ok_or_else(|| {
                                    PdbError::Inconsistency(format!(
                                        "Chain {} vanished while adding residue {}",
                                        chain_code, res_seq
                                    ))
                                })?;
                            residue_cache.insert(residue_key, id);
                            id
                        }
                    };

                    let atom = Atom::new(serial, name, &element, residue_id, Point3::new(x, y, z))
                        .with_hetero(record_type == "HETATM");
                    system.add_atom_to_residue(residue_id, atom).ok_or_else(|| {
                        PdbError::Inconsistency(format!("Residue {} vanished while adding atom {}", res_seq, serial))
                    })?;
                }
                _ => {}
            }
        }

        Self::classify_chains(&mut system);
        Ok((system, metadata))
    }
}
