use super::load_structure;
use crate::cli::InterfacesArgs;
use crate::config::PartialRunConfig;
use crate::error::Result;
use crate::report;
use crate::ui::{CliProgressHandler, UiEvent};
use tokio::sync::mpsc;
use tracing::{info, warn};
use xtalint::core::crystal::Crystal;
use xtalint::engine::catalog::InterfaceCatalog;
use xtalint::engine::config::InterfaceConfig;
use xtalint::engine::error::EngineError;
use xtalint::engine::progress::ProgressReporter;
use xtalint::workflows;

/// Everything needed to report on an interface run.
pub struct InterfaceAnalysis {
    pub config: InterfaceConfig,
    pub crystal: Option<Crystal>,
    pub catalog: InterfaceCatalog,
}

pub fn analyze(
    args: &InterfacesArgs,
    threads: Option<usize>,
    reporter: &ProgressReporter,
) -> Result<InterfaceAnalysis> {
    let partial =
        PartialRunConfig::load(args.config.as_deref())?.with_set_values(&args.set_values)?;
    let space_group = partial.space_group_override(args.space_group.as_deref())?;
    info!("Merging configuration from file and CLI arguments...");
    let config = partial.merge_interfaces(args, threads)?;

    let (system, metadata) = load_structure(&args.input)?;
    let mut crystal = metadata.crystal().map_err(EngineError::from)?;
    match (crystal.as_mut(), space_group) {
        (Some(crystal), Some(space_group)) => {
            info!(
                from = crystal.space_group.symbol(),
                to = space_group.symbol(),
                "Overriding space group."
            );
            crystal.space_group = space_group;
        }
        (None, Some(space_group)) => warn!(
            "Ignoring space group '{}': the structure has no usable unit cell.",
            space_group.symbol()
        ),
        _ => {}
    }
    if crystal.is_none() {
        warn!("No crystal information found; only interfaces within the asymmetric unit are reported.");
    }

    let catalog = workflows::interfaces::run(&system, crystal.as_ref(), &config, reporter)?;
    Ok(InterfaceAnalysis {
        config,
        crystal,
        catalog,
    })
}

pub async fn run(
    args: InterfacesArgs,
    threads: Option<usize>,
    ui_sender: mpsc::Sender<UiEvent>,
) -> Result<()> {
    let progress_handler = CliProgressHandler::new(ui_sender);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let analysis = tokio::task::block_in_place(|| analyze(&args, threads, &reporter))?;
    progress_handler.log(format!(
        "Found {} interface(s), {} above 100 Å².",
        analysis.catalog.len(),
        analysis.catalog.count_above_area(100.0)
    ));

    let clash_distance = analysis.config.search.clash_distance;
    let rows = report::interface_rows(&analysis.catalog, analysis.crystal.as_ref(), clash_distance);
    if rows.is_empty() {
        println!("No interfaces found.");
    } else {
        print!("{}", report::format_interface_table(&rows));
        let with_clashes = analysis.catalog.num_with_clashes(clash_distance);
        if with_clashes > 0 {
            warn!(
                interfaces = with_clashes,
                "Some interfaces contain atoms closer than {:.2} Å.", clash_distance
            );
        }
    }

    if let Some(path) = &args.output {
        report::write_csv(path, &rows)?;
        println!("Interface summary written to: {}", path.display());
    }
    if let Some(path) = &args.residues {
        report::write_csv(path, &report::interface_residue_rows(&analysis.catalog))?;
        println!("Interface residues written to: {}", path.display());
    }

    Ok(())
}
