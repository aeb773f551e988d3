//! Reading structure files.
//!
//! The core only needs atoms grouped into chains plus the crystal
//! description, so the reader covers the coordinate and lattice records of
//! the PDB format and ignores everything else.

pub mod pdb;
pub mod traits;
