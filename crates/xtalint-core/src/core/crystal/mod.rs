//! # Crystal Module
//!
//! Lattice geometry and crystallographic symmetry.
//!
//! ## Overview
//!
//! A crystal is described by its [`cell::CrystalCell`] (the six lattice
//! parameters and the matrices converting between fractional and Cartesian
//! coordinates) and its [`space_group::SpaceGroup`] (an ordered list of
//! [`operator::SymmetryOperator`]s acting on fractional coordinates, the first
//! of which is always the identity). A [`transform::SymmetryTransform`] is one
//! operator combined with an integer lattice translation and resolved into
//! Cartesian space; it is the unit of work for interface enumeration.
//!
//! ## Key Components
//!
//! - [`cell`] - Lattice parameters and coordinate conversion
//! - [`operator`] - Parsing and formatting of algebraic operators (`-X,Y+1/2,-Z`)
//! - [`space_group`] - Operator lists and a built-in table of common protein space groups
//! - [`transform`] - Resolved affine transforms and the inverse-pair test

pub mod cell;
pub mod error;
pub mod operator;
pub mod space_group;
pub mod transform;

use cell::CrystalCell;
use space_group::SpaceGroup;

/// The lattice and symmetry of a crystal.
#[derive(Debug, Clone, PartialEq)]
pub struct Crystal {
    pub cell: CrystalCell,
    pub space_group: SpaceGroup,
}

impl Crystal {
    pub fn new(cell: CrystalCell, space_group: SpaceGroup) -> Self {
        Self { cell, space_group }
    }
}
