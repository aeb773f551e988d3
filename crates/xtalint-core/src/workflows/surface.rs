use crate::core::models::ids::ChainId;
use crate::core::models::system::MolecularSystem;
use crate::engine::asa::{AsaEngine, ResidueArea, asa_atoms, residue_areas};
use crate::engine::chains::ChainTemplate;
use crate::engine::config::SurfaceAnalysisConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{info, instrument};

/// Accessible surface of one isolated chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainSurface {
    pub chain_id: ChainId,
    pub code: char,
    pub atom_asa: Vec<f64>,
    pub residues: Vec<ResidueArea>,
}

impl ChainSurface {
    pub fn total_asa(&self) -> f64 {
        self.atom_asa.iter().sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceReport {
    pub chains: Vec<ChainSurface>,
}

impl SurfaceReport {
    pub fn total_asa(&self) -> f64 {
        self.chains.iter().map(ChainSurface::total_asa).sum()
    }
}

/// Computes per-atom and per-residue ASA of every selected chain on its own.
#[instrument(skip_all, name = "surface_workflow")]
pub fn run(
    system: &MolecularSystem,
    config: &SurfaceAnalysisConfig,
    reporter: &ProgressReporter,
) -> Result<SurfaceReport, EngineError> {
    let asa = AsaEngine::new(&config.surface)?;
    let templates = ChainTemplate::collect(system, &config.selection, &config.surface, &config.radii);

    reporter.report(Progress::PhaseStart {
        name: "Surface Areas",
    });
    reporter.report(Progress::TaskStart {
        total: templates.len() as u64,
    });
    let mut chains = Vec::with_capacity(templates.len());
    for template in &templates {
        let atom_asa = asa.calculate(&asa_atoms(template.positions(), template.radii()))?;
        let residues = residue_areas(template, &atom_asa, None, &config.reference_asa);
        chains.push(ChainSurface {
            chain_id: template.chain_id(),
            code: template.code(),
            atom_asa,
            residues,
        });
        reporter.report(Progress::TaskIncrement { amount: 1 });
    }
    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    let report = SurfaceReport { chains };
    info!(
        chains = report.chains.len(),
        total_asa = report.total_asa(),
        "Surface analysis finished."
    );
    Ok(report)
}
