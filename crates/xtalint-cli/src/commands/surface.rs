use super::load_structure;
use crate::cli::SurfaceArgs;
use crate::config::PartialRunConfig;
use crate::error::Result;
use crate::report;
use crate::ui::{CliProgressHandler, UiEvent};
use tokio::sync::mpsc;
use tracing::{info, warn};
use xtalint::engine::progress::ProgressReporter;
use xtalint::workflows;
use xtalint::workflows::surface::SurfaceReport;

pub fn analyze(
    args: &SurfaceArgs,
    threads: Option<usize>,
    reporter: &ProgressReporter,
) -> Result<SurfaceReport> {
    let partial =
        PartialRunConfig::load(args.config.as_deref())?.with_set_values(&args.set_values)?;
    info!("Merging configuration from file and CLI arguments...");
    let config = partial.merge_surface(args, threads)?;

    let (system, _) = load_structure(&args.input)?;
    Ok(workflows::surface::run(&system, &config, reporter)?)
}

pub async fn run(
    args: SurfaceArgs,
    threads: Option<usize>,
    ui_sender: mpsc::Sender<UiEvent>,
) -> Result<()> {
    let progress_handler = CliProgressHandler::new(ui_sender);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let surface = tokio::task::block_in_place(|| analyze(&args, threads, &reporter))?;
    progress_handler.log(format!(
        "Measured {} chain(s), {:.1} Å² in total.",
        surface.chains.len(),
        surface.total_asa()
    ));

    if surface.chains.is_empty() {
        warn!("No chains were selected for surface analysis.");
        println!("No chains selected.");
    } else {
        print!("{}", report::format_surface_table(&surface));
    }

    if let Some(path) = &args.output {
        report::write_csv(path, &report::surface_rows(&surface))?;
        println!("Residue surface areas written to: {}", path.display());
    }

    Ok(())
}
