use crate::cli::DomainArgs;
use crate::config::{DomainStrategy, PartialJobConfig};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use dbsim::engine::progress::ProgressReporter;
use dbsim::workflows::domain::{
    OperationalDomain, OperationalDomainStats, contour_tracing, flood_fill, grid_search,
    random_sampling,
};
use std::path::Path;
use tracing::info;

pub fn run(args: DomainArgs, show_progress: bool) -> Result<()> {
    let config = PartialJobConfig::from_file(&args.job.config)?;
    let layout = config.layout()?;
    let truth_tables = config.truth_tables()?;
    let job = config.merge_domain(&args)?;

    let progress_handler = CliProgressHandler::new(show_progress);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!(
        "Exploring {} x {} with {:?}.",
        job.params.x_axis.parameter, job.params.y_axis.parameter, job.strategy
    );
    let (domain, stats) = match job.strategy {
        DomainStrategy::GridSearch => {
            grid_search::run(&layout, &truth_tables, &job.params, &reporter)?
        }
        DomainStrategy::RandomSampling { samples } => {
            random_sampling::run(&layout, &truth_tables, samples, &job.params, &reporter)?
        }
        DomainStrategy::FloodFill {
            seeds,
            neighborhood,
        } => flood_fill::run(
            &layout,
            &truth_tables,
            seeds,
            neighborhood,
            &job.params,
            &reporter,
        )?,
        DomainStrategy::ContourTracing { samples } => {
            contour_tracing::run(&layout, &truth_tables, samples, &job.params, &reporter)?
        }
    };

    print_stats(&stats);

    if let Some(path) = &args.output {
        write_domain(&domain, path)?;
        println!("✓ Operational domain written to: {}", path.display());
    }
    Ok(())
}

fn print_stats(stats: &OperationalDomainStats) {
    println!(
        "Evaluated {} parameter point(s) in {:.3?} with {} simulator invocation(s).",
        stats.num_evaluated_parameter_combinations,
        stats.time_total,
        stats.num_simulator_invocations
    );
    println!(
        "  operational: {}, non-operational: {}",
        stats.num_operational_parameter_combinations,
        stats.num_non_operational_parameter_combinations
    );
}

fn write_domain(domain: &OperationalDomain, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        domain.x_dimension().to_string(),
        domain.y_dimension().to_string(),
        "status".to_string(),
    ])?;
    for (_, point, status) in domain.iter() {
        writer.write_record([point.x.to_string(), point.y.to_string(), status.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}
