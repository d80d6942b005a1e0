use crate::cli::JobArgs;
use crate::config::PartialJobConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use dbsim::engine::progress::ProgressReporter;
use dbsim::workflows::defect_influence;
use tracing::{info, warn};

pub fn run(args: JobArgs, show_progress: bool) -> Result<()> {
    let config = PartialJobConfig::from_file(&args.config)?;
    let layout = config.layout()?;
    let params = config.merge_defect_influence(&args)?;

    let progress_handler = CliProgressHandler::new(show_progress);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!(
        "Searching defect influence (charge {}, padding {} column(s) x {} dimer row(s)).",
        params.defect.charge, params.scanning_area.columns, params.scanning_area.dimer_rows
    );
    let (influence, stats) = defect_influence::run(&layout, &params, &reporter)?;

    println!(
        "Evaluated {} defect position(s) in {:.3?} with {} simulator invocation(s).",
        stats.num_evaluated_defect_positions, stats.time_total, stats.num_simulator_invocations
    );
    if influence.distance_nm > 0.0 {
        println!(
            "Farthest influential defect position: {} at {:.6} nm",
            influence.position, influence.distance_nm
        );
    } else {
        warn!("No scanned defect position changes the ground state.");
        println!("No defect position within the scanning area influences the layout.");
    }
    Ok(())
}
