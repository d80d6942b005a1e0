use crate::cli::OperationalArgs;
use crate::config::PartialJobConfig;
use crate::error::Result;
use dbsim::core::bdl::{BdlInputIterator, detect_bdl_pairs};
use dbsim::core::models::cell::CellRole;
use dbsim::core::models::layout::SidbLayout;
use dbsim::core::models::truth_table::TruthTable;
use dbsim::engine::config::OperationalParams;
use dbsim::engine::error::EngineError;
use dbsim::workflows::energy_state::energy_and_state_types;
use dbsim::workflows::occupation::occupation_probability_gate_based;
use dbsim::workflows::operational::{OperationalStatus, is_operational};
use tracing::info;

pub fn run(args: OperationalArgs) -> Result<()> {
    let config = PartialJobConfig::from_file(&args.job.config)?;
    let layout = config.layout()?;
    let truth_tables = config.truth_tables()?;
    let params = config.merge_operational(&args)?;

    info!(
        "Checking {} truth table(s) with {}.",
        truth_tables.len(),
        params.engine.name()
    );
    let assessment = is_operational(&layout, &truth_tables, &params)?;

    println!(
        "Layout is {} ({} simulator invocation(s)).",
        assessment.status, assessment.simulator_invocations
    );
    if let Some((input, reason)) = assessment.failure {
        println!("  First failing input combination {input:#b}: {reason:?}");
    }

    if let Some(temperature) = args.temperature {
        print_error_probabilities(&layout, &truth_tables, &params, temperature)?;
    } else if assessment.status == OperationalStatus::NonOperational {
        info!("Pass --temperature to inspect the error probability per input.");
    }
    Ok(())
}

fn print_error_probabilities(
    layout: &SidbLayout,
    truth_tables: &[TruthTable],
    params: &OperationalParams,
    temperature: f64,
) -> Result<()> {
    let output_pairs = detect_bdl_pairs(layout, CellRole::Output, &params.bdl_pairs);
    println!("Probability of an erroneous output at {temperature} K:");

    for (input_index, input_layout) in BdlInputIterator::new(layout, &params.bdl_pairs) {
        let result = params.engine.simulate(&input_layout, &params.simulation)?;
        let states = energy_and_state_types(&result, &output_pairs, truth_tables, input_index)?;
        let probability =
            occupation_probability_gate_based(&states, temperature).map_err(EngineError::from)?;
        println!("  input {input_index:#b}: {probability:.6}");
    }
    Ok(())
}
