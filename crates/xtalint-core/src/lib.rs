//! # xtalint
//!
//! Enumeration of the chain-chain interfaces of a protein crystal, with buried
//! surface areas computed by the Shrake-Rupley rolling-ball method.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Passive data: the structure model
//!   (`MolecularSystem`), crystal cells, space groups and symmetry transforms,
//!   the PDB reader, and the radius and reference-area tables.
//!
//! - **[`engine`]: The Logic Core.** The algorithms: cell-list contact
//!   detection, parallel surface area, unit-cell expansion with redundancy
//!   elimination, and the interface catalog.
//!
//! - **[`workflows`]: The Public API.** Complete analyses
//!   ([`workflows::interfaces::run`], [`workflows::surface::run`]) that tie
//!   `engine` and `core` together.

pub mod core;
pub mod engine;
pub mod workflows;
