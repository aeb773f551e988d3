pub mod interfaces;
pub mod surface;

use crate::error::{CliError, Result};
use std::path::Path;
use tracing::info;
use xtalint::core::io::pdb::{PdbFile, PdbMetadata};
use xtalint::core::io::traits::StructureFile;
use xtalint::core::models::system::MolecularSystem;

fn load_structure(path: &Path) -> Result<(MolecularSystem, PdbMetadata)> {
    info!("Loading input structure from {:?}", path);
    let (system, metadata) = PdbFile::read_from_path(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    info!(
        chains = system.chain_count(),
        atoms = system.atom_count(),
        "Structure loaded."
    );
    Ok((system, metadata))
}
