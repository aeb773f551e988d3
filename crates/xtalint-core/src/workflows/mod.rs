//! # Workflows Module
//!
//! Complete analyses built from the engine, and the entry points most users
//! need.
//!
//! - **Interfaces** ([`interfaces`]) - Every distinct chain-chain interface of a
//!   crystal with its buried surface area.
//! - **Surface** ([`surface`]) - Accessible surface area of each isolated chain,
//!   per residue.
//!
//! Both workflows validate their configuration before doing any work and
//! report phases through a [`crate::engine::progress::ProgressReporter`].

pub mod interfaces;
pub mod surface;
