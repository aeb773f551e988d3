//! # Engine Module
//!
//! The geometric algorithms behind interface analysis.
//!
//! ## Overview
//!
//! Starting from the chains selected out of a [`crate::core::models::system::MolecularSystem`],
//! the engine places symmetry copies of the asymmetric unit, detects atom
//! contacts between deposited chains and their copies, and measures how much
//! accessible surface each contact buries.
//!
//! ## Architecture
//!
//! - **Contacts** ([`grid`], [`contacts`]) - Cell-list neighbor search and contact graphs
//! - **Surface** ([`asa`]) - Shrake-Rupley accessible surface area on a worker pool
//! - **Chains** ([`chains`]) - Flattened chain templates and their placed copies
//! - **Symmetry** ([`symmetry`]) - Unit-cell expansion, lattice neighbors and the visited-transform log
//! - **Search** ([`interfaces`]) - The interface enumeration driver
//! - **Results** ([`catalog`]) - Deduplication, buried areas, ordering and ids
//! - **Configuration** ([`config`]), **Errors** ([`error`]), **Progress** ([`progress`])
//!
//! Only the surface calculation runs in parallel. Enumeration is single
//! threaded and keeps no state between structures.

pub mod asa;
pub mod catalog;
pub mod chains;
pub mod config;
pub mod contacts;
pub mod error;
pub mod grid;
pub mod interfaces;
pub mod progress;
pub mod symmetry;
