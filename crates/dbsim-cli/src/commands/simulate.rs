use crate::cli::{EngineArg, SimulateArgs};
use crate::config::PartialJobConfig;
use crate::error::Result;
use dbsim::engine::config::{BaseNumberDetection, QuickExactParams};
use dbsim::engine::error::EngineError;
use dbsim::engine::result::SimulationResult;
use dbsim::engine::simulator::SimulationEngine;
use dbsim::engine::surface::ChargeDistributionSurface;
use dbsim::engine::{exhaustive, quickexact};
use dbsim::workflows::occupation::occupation_probability_non_gate_based;
use std::path::Path;
use tracing::{info, warn};

pub fn run(args: SimulateArgs) -> Result<()> {
    let config = PartialJobConfig::from_file(&args.job.config)?;
    let layout = config.layout()?;
    let simulation = config.simulation(&args.job)?;

    let engine = SimulationEngine::from(args.engine);
    info!(
        "Simulating {} SiDB(s) with {}.",
        layout.num_cells(),
        engine.name()
    );
    let mut result = match args.engine {
        EngineArg::QuickExact => {
            let detection = if args.no_base_detection {
                BaseNumberDetection::Off
            } else {
                BaseNumberDetection::On
            };
            quickexact::run(&layout, &QuickExactParams::new(simulation, detection))?
        }
        EngineArg::Exhaustive => exhaustive::run(&layout, &simulation)?,
    };
    result.sort_by_energy();

    print_summary(&result);

    if let Some(temperature) = args.temperature {
        let probability =
            occupation_probability_non_gate_based(&result.energy_distribution(), temperature)
                .map_err(EngineError::from)?;
        println!(
            "Probability of an excited state at {} K: {:.6}",
            temperature, probability
        );
    }

    if let Some(path) = &args.output {
        write_distributions(&result, path)?;
        println!("✓ Charge distributions written to: {}", path.display());
    }
    Ok(())
}

fn charge_string(surface: &ChargeDistributionSurface) -> String {
    surface
        .charge_states()
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn print_summary(result: &SimulationResult) {
    println!(
        "{} found {} valid charge distribution(s) in {:.3?}.",
        result.algorithm_name,
        result.len(),
        result.simulation_runtime
    );
    for (key, value) in &result.additional_simulation_parameters {
        println!("  {key}: {value}");
    }

    let Some(ground_state) = result.ground_state() else {
        warn!("No physically valid charge distribution exists for this layout.");
        return;
    };
    println!(
        "Ground state: {} at {:.6} eV{}",
        charge_string(ground_state),
        ground_state.system_energy(),
        if result.is_ground_state_degenerate() {
            " (degenerate)"
        } else {
            ""
        }
    );
    for (energy, degeneracy) in result.energy_distribution().levels() {
        println!("  {energy:>12.6} eV  x{degeneracy}");
    }
}

fn write_distributions(result: &SimulationResult, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    let mut header = vec!["energy".to_string(), "charges".to_string()];
    if let Some(first) = result.charge_distributions.first() {
        header.extend(first.cells().iter().map(ToString::to_string));
    }
    writer.write_record(&header)?;

    for surface in &result.charge_distributions {
        let mut record = vec![
            format!("{:.6}", surface.system_energy()),
            charge_string(surface),
        ];
        record.extend(surface.charge_states().iter().map(|s| s.sign().to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
