use crate::core::crystal::Crystal;
use crate::core::models::system::MolecularSystem;
use crate::engine::asa::AsaEngine;
use crate::engine::catalog::InterfaceCatalog;
use crate::engine::chains::ChainTemplate;
use crate::engine::config::InterfaceConfig;
use crate::engine::error::EngineError;
use crate::engine::interfaces::InterfaceEnumerator;
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{info, instrument};

/// Finds and measures every distinct chain-chain interface of a structure.
///
/// Without a crystal (or with a placeholder cell) only contacts between the
/// deposited chains are reported. A structure with no selected chains yields
/// an empty catalog.
#[instrument(skip_all, name = "interfaces_workflow")]
pub fn run(
    system: &MolecularSystem,
    crystal: Option<&Crystal>,
    config: &InterfaceConfig,
    reporter: &ProgressReporter,
) -> Result<InterfaceCatalog, EngineError> {
    reporter.report(Progress::PhaseStart {
        name: "Preparation",
    });
    config.search.validate()?;
    let asa = AsaEngine::new(&config.surface)?;
    let templates = ChainTemplate::collect(system, &config.selection, &config.surface, &config.radii);
    info!(
        chains = templates.len(),
        atoms = templates.iter().map(ChainTemplate::len).sum::<usize>(),
        space_group = crystal.map(|c| c.space_group.symbol()).unwrap_or("none"),
        "Selected chains for interface search."
    );
    reporter.report(Progress::PhaseFinish);

    if templates.is_empty() {
        info!("No chains selected; returning an empty catalog.");
        return Ok(InterfaceCatalog::empty());
    }

    reporter.report(Progress::PhaseStart {
        name: "Symmetry Search",
    });
    let enumerator = InterfaceEnumerator::new(templates, crystal, &config.search);
    let candidates = enumerator.enumerate(reporter)?;
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart {
        name: "Buried Surface Areas",
    });
    let catalog = InterfaceCatalog::build(candidates, &asa, &config.reference_asa, reporter)?;
    reporter.report(Progress::PhaseFinish);

    info!(
        interfaces = catalog.len(),
        largest_area = catalog.get(1).map(|i| i.interface_area()).unwrap_or(0.0),
        "Interface analysis finished."
    );
    Ok(catalog)
}
