//! # Core Module
//!
//! Data structures and boundary code shared by the engine.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Atoms, residues, chains and the `MolecularSystem` arena
//! - **Crystallography** ([`crystal`]) - Unit cells, symmetry operators, space groups and resolved transforms
//! - **File I/O** ([`io`]) - Reading PDB coordinate files together with their crystal record
//! - **Lookup Tables** ([`tables`]) - Atomic radii and reference accessible areas
//! - **Utilities** ([`utils`]) - Bounding boxes and small geometry helpers
//!
//! Everything here is plain data with no global state; tables are built once
//! and passed to the engine by reference.

pub mod crystal;
pub mod io;
pub mod models;
pub mod tables;
pub mod utils;
