use super::{DomainEvaluator, OperationalDomain, OperationalDomainStats, fold_evaluations};
use crate::core::models::layout::SidbLayout;
use crate::core::models::truth_table::TruthTable;
use crate::engine::config::OperationalDomainParams;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use std::time::Instant;
use tracing::{info, instrument};

/// Classifies every point of the parameter grid.
#[instrument(skip_all, name = "grid_search")]
pub fn run(
    layout: &SidbLayout,
    truth_tables: &[TruthTable],
    params: &OperationalDomainParams,
    reporter: &ProgressReporter,
) -> Result<(OperationalDomain, OperationalDomainStats), EngineError> {
    params.validate()?;
    let start = Instant::now();

    let evaluator = DomainEvaluator::new(layout, truth_tables, params);
    let indices: Vec<_> = (0..evaluator.total_points())
        .map(|flat| evaluator.grid_index(flat))
        .collect();
    info!(
        "Evaluating {} x {} grid ({} vs {}).",
        params.x_axis.num_points(),
        params.y_axis.num_points(),
        params.x_axis.parameter,
        params.y_axis.parameter
    );

    let evaluations = {
        let task = reporter.task("Grid search", indices.len() as u64);
        evaluator.evaluate_all(&indices, &task)?
    };

    let (domain, stats) = fold_evaluations(evaluator.empty_domain(), evaluations, start);
    info!(
        operational = stats.num_operational_parameter_combinations,
        evaluated = stats.num_evaluated_parameter_combinations,
        "Grid search finished."
    );
    Ok((domain, stats))
}
