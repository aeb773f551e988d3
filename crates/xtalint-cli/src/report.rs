use crate::error::{CliError, Result};
use serde::Serialize;
use std::fmt::Write;
use std::path::Path;
use xtalint::core::crystal::Crystal;
use xtalint::engine::asa::ResidueArea;
use xtalint::engine::catalog::{CORE_BURIED_FRACTION, ChainInterface, InterfaceCatalog};
use xtalint::workflows::surface::SurfaceReport;

/// One line of the interface summary.
#[derive(Debug, Serialize)]
pub struct InterfaceRow {
    pub id: usize,
    pub chain_1: char,
    pub chain_2: char,
    pub operator: String,
    pub translation: String,
    pub contacts: usize,
    pub interface_area: f64,
    pub buried_area_1: f64,
    pub buried_area_2: f64,
    pub residues_1: usize,
    pub residues_2: usize,
    pub clashes: usize,
    pub disulfides: usize,
}

impl InterfaceRow {
    pub fn new(interface: &ChainInterface, crystal: Option<&Crystal>, clash_distance: f64) -> Self {
        let (first, second) = (interface.first_side(), interface.second_side());
        let t = interface.translation();
        Self {
            id: interface.id(),
            chain_1: interface.first().code(),
            chain_2: interface.second().code(),
            operator: operator_label(crystal, interface.operator_id()),
            translation: format!("({},{},{})", t.x, t.y, t.z),
            contacts: interface.num_contacts(),
            interface_area: interface.interface_area(),
            buried_area_1: first.buried_area(),
            buried_area_2: second.buried_area(),
            residues_1: first.interface_residues().count(),
            residues_2: second.interface_residues().count(),
            clashes: interface.num_clashes(clash_distance),
            disulfides: interface.disulfide_bridges().len(),
        }
    }
}

/// Buried area of one residue on one side of an interface.
#[derive(Debug, Serialize)]
pub struct InterfaceResidueRow {
    pub interface: usize,
    pub chain: char,
    pub residue: String,
    pub name: String,
    pub asa: f64,
    pub bsa: f64,
    pub rsa: Option<f64>,
    pub location: &'static str,
}

/// Accessible area of one residue of an isolated chain.
#[derive(Debug, Serialize)]
pub struct SurfaceResidueRow {
    pub chain: char,
    pub residue: String,
    pub name: String,
    pub asa: f64,
    pub rsa: Option<f64>,
}

pub fn operator_label(crystal: Option<&Crystal>, operator_id: usize) -> String {
    crystal
        .and_then(|c| c.space_group.operator(operator_id))
        .map(|op| op.to_algebraic())
        .unwrap_or_else(|| "X,Y,Z".to_string())
}

fn location(residue: &ResidueArea) -> &'static str {
    if residue.bsa <= 0.0 {
        return "surface";
    }
    match residue.buried_fraction() {
        Some(f) if f >= CORE_BURIED_FRACTION => "core",
        _ => "rim",
    }
}

pub fn interface_rows(
    catalog: &InterfaceCatalog,
    crystal: Option<&Crystal>,
    clash_distance: f64,
) -> Vec<InterfaceRow> {
    catalog
        .iter()
        .map(|i| InterfaceRow::new(i, crystal, clash_distance))
        .collect()
}

/// Residues that lose area in each interface, both sides.
pub fn interface_residue_rows(catalog: &InterfaceCatalog) -> Vec<InterfaceResidueRow> {
    let mut rows = Vec::new();
    for interface in catalog {
        for (chain, side) in [
            (interface.first().code(), interface.first_side()),
            (interface.second().code(), interface.second_side()),
        ] {
            rows.extend(side.interface_residues().map(|r| InterfaceResidueRow {
                interface: interface.id(),
                chain,
                residue: r.label(),
                name: r.name.clone(),
                asa: r.asa,
                bsa: r.bsa,
                rsa: r.relative_asa,
                location: location(r),
            }));
        }
    }
    rows
}

pub fn surface_rows(report: &SurfaceReport) -> Vec<SurfaceResidueRow> {
    report
        .chains
        .iter()
        .flat_map(|chain| {
            chain.residues.iter().map(move |r| SurfaceResidueRow {
                chain: chain.code,
                residue: r.label(),
                name: r.name.clone(),
                asa: r.asa,
                rsa: r.relative_asa,
            })
        })
        .collect()
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let to_error = |source: csv::Error| CliError::Output {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(to_error)?;
    for row in rows {
        writer.serialize(row).map_err(to_error)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn format_interface_table(rows: &[InterfaceRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4}  {:<6}  {:<24}  {:<12}  {:>8}  {:>10}  {:>7}",
        "ID", "Chains", "Operator", "Translation", "Contacts", "Area (Å²)", "Clashes"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:>4}  {:<6}  {:<24}  {:<12}  {:>8}  {:>10.1}  {:>7}",
            row.id,
            format!("{}-{}", row.chain_1, row.chain_2),
            row.operator,
            row.translation,
            row.contacts,
            row.interface_area,
            row.clashes
        );
    }
    out
}

pub fn format_surface_table(report: &SurfaceReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<6}  {:>8}  {:>10}", "Chain", "Residues", "ASA (Å²)");
    for chain in &report.chains {
        let _ = writeln!(
            out,
            "{:<6}  {:>8}  {:>10.1}",
            chain.code,
            chain.residues.len(),
            chain.total_asa()
        );
    }
    let _ = writeln!(out, "{:<6}  {:>8}  {:>10.1}", "Total", "", report.total_asa());
    out
}
