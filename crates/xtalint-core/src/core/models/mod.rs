//! # Core Models Module
//!
//! Data structures describing the deposited asymmetric unit of a structure.
//!
//! ## Overview
//!
//! A structure is held in a [`system::MolecularSystem`], an arena of chains,
//! residues and atoms addressed by the typed keys in [`ids`]. The model is
//! deliberately passive: it stores what the input file said and nothing the
//! engine computes. Symmetry copies, contact graphs and surface areas are all
//! derived views built by the engine on demand.
//!
//! ## Key Components
//!
//! - [`atom`] - Atom serial, name, element and Cartesian position
//! - [`residue`] - Residues and their closed classification [`residue::ResidueKind`]
//! - [`chain`] - Chains and their [`chain::ChainType`]
//! - [`system`] - The arena holding a complete asymmetric unit
//! - [`ids`] - Typed keys for atoms, residues and chains
//!
//! ## Usage
//!
//! ```ignore
//! use xtalint::core::models::{atom::Atom, chain::ChainType, system::MolecularSystem};
//!
//! let mut system = MolecularSystem::new();
//! let chain_id = system.add_chain('A', ChainType::Protein);
//! let residue_id = system.add_residue(chain_id, 1, None, "ALA").unwrap();
//! system.add_atom_to_residue(residue_id, Atom::new(1, "CA", "C", residue_id, Point3::origin()));
//! ```

pub mod atom;
pub mod chain;
pub mod ids;
pub mod residue;
pub mod system;
