use crate::cli::StabilityArgs;
use crate::config::PartialJobConfig;
use crate::error::Result;
use dbsim::workflows::population_stability;
use tracing::{info, warn};

pub fn run(args: StabilityArgs) -> Result<()> {
    let config = PartialJobConfig::from_file(&args.job.config)?;
    let layout = config.layout()?;
    let params = config.merge_stability(&args)?;

    info!("Assessing population stability of {} SiDB(s).", layout.num_cells());
    let assessments = population_stability::assess(&layout, &params)?;

    if assessments.is_empty() {
        warn!("No physically valid charge distribution to assess.");
        println!("No physically valid charge distribution found.");
        return Ok(());
    }

    let precision = params.precision_for_distance as usize;
    println!(
        "{:>4}  {:>12}  {:<14} {:<7}  {:>12}  {:>10}",
        "#", "energy (eV)", "critical cell", "change", "margin (eV)", "dist (nm)"
    );
    for (rank, entry) in assessments.iter().enumerate() {
        println!(
            "{:>4}  {:>12.6}  {:<14} {:<7}  {:>12.6}  {:>10.precision$}",
            rank,
            entry.system_energy,
            entry.critical_cell.to_string(),
            entry.transition.to_string(),
            entry.minimum_potential_difference_to_transition,
            entry.distance_corresponding_to_potential,
        );
    }
    Ok(())
}
