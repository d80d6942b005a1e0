use super::{DomainEvaluator, OperationalDomain, OperationalDomainStats, fold_evaluations};
use crate::core::models::layout::SidbLayout;
use crate::core::models::truth_table::TruthTable;
use crate::engine::config::OperationalDomainParams;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use rand::thread_rng;
use std::time::Instant;
use tracing::{info, instrument};

/// Classifies up to `num_samples` distinct, uniformly drawn grid points.
///
/// Asking for more samples than the grid holds evaluates every point once.
#[instrument(skip_all, name = "random_sampling", fields(num_samples = num_samples))]
pub fn run(
    layout: &SidbLayout,
    truth_tables: &[TruthTable],
    num_samples: usize,
    params: &OperationalDomainParams,
    reporter: &ProgressReporter,
) -> Result<(OperationalDomain, OperationalDomainStats), EngineError> {
    params.validate()?;
    let start = Instant::now();

    let evaluator = DomainEvaluator::new(layout, truth_tables, params);
    let indices = evaluator.sample_indices(&mut thread_rng(), num_samples);
    info!(
        "Sampling {} of {} grid point(s).",
        indices.len(),
        evaluator.total_points()
    );

    let evaluations = {
        let task = reporter.task("Random sampling", indices.len() as u64);
        evaluator.evaluate_all(&indices, &task)?
    };

    Ok(fold_evaluations(evaluator.empty_domain(), evaluations, start))
}
