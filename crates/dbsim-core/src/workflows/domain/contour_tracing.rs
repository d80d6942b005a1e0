use super::{DomainEvaluator, OperationalDomain, OperationalDomainStats, SequentialExplorer};
use crate::core::models::layout::SidbLayout;
use crate::core::models::truth_table::TruthTable;
use crate::engine::config::OperationalDomainParams;
use crate::engine::error::EngineError;
use crate::engine::progress::{ProgressReporter, TaskGuard};
use crate::workflows::operational::OperationalStatus;
use rand::thread_rng;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

type Point = (isize, isize);

/// Moore neighborhood in clockwise order, starting west.
const CLOCKWISE: [Point; 8] = [
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
];

/// Delineates the outline of one operational region by Moore-neighbor tracing.
///
/// `num_samples` random grid points are classified first. The first operational sample
/// is moved west until its western neighbor is non-operational, and the boundary is
/// walked clockwise from there. Grid points outside the configured bounds count as
/// non-operational and are never evaluated. Only the region containing that sample is
/// traced; if no sample is operational, the samples alone are returned.
#[instrument(skip_all, name = "contour_tracing", fields(num_samples = num_samples))]
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
    let samples = evaluator.sample_indices(&mut thread_rng(), num_samples);
    let mut explorer = SequentialExplorer::new(evaluator);

    {
        let task = reporter.task(
            "Contour tracing",
            explorer.evaluator().total_points() as u64,
        );

        let mut first_operational = None;
        for &sample in &samples {
            if explorer.status(sample, &task)? == OperationalStatus::Operational
                && first_operational.is_none()
            {
                first_operational = Some(sample);
            }
        }

        match first_operational {
            Some((x, y)) => trace_contour(&mut explorer, (x as isize, y as isize), &task)?,
            None => warn!("No operational sample among {} drawn; skipping contour.", samples.len()),
        }
    }

    let (domain, stats) = explorer.finish(start);
    info!(
        operational = stats.num_operational_parameter_combinations,
        evaluated = stats.num_evaluated_parameter_combinations,
        "Contour tracing finished."
    );
    Ok((domain, stats))
}

fn trace_contour(
    explorer: &mut SequentialExplorer<'_>,
    from: Point,
    task: &TaskGuard<'_, '_>,
) -> Result<(), EngineError> {
    let (mut x, y) = from;
    while explorer.is_operational_at(x - 1, y, task)? {
        x -= 1;
    }

    let mut current = (x, y);
    let mut backtrack = (x - 1, y);
    let mut visited = HashSet::from([(current, backtrack)]);

    // The first repeated (current, backtrack) state closes the contour.
    loop {
        let Some((next, next_backtrack)) = next_boundary_point(explorer, current, backtrack, task)?
        else {
            debug!(?current, "Operational point is isolated.");
            break;
        };
        current = next;
        backtrack = next_backtrack;
        if !visited.insert((current, backtrack)) {
            break;
        }
    }
    debug!("Contour closed after {} step(s).", visited.len());
    Ok(())
}

/// Scans clockwise around `current`, starting after `backtrack`, for the next operational point.
///
/// Returns that point together with the non-operational point checked right before it.
fn next_boundary_point(
    explorer: &mut SequentialExplorer<'_>,
    current: Point,
    backtrack: Point,
    task: &TaskGuard<'_, '_>,
) -> Result<Option<(Point, Point)>, EngineError> {
    let entry = (backtrack.0 - current.0, backtrack.1 - current.1);
    let first = CLOCKWISE.iter().position(|&o| o == entry).unwrap_or(0);

    for step in 1..CLOCKWISE.len() {
        let (dx, dy) = CLOCKWISE[(first + step) % CLOCKWISE.len()];
        let candidate = (current.0 + dx, current.1 + dy);
        if explorer.is_operational_at(candidate.0, candidate.1, task)? {
            let (bx, by) = CLOCKWISE[(first + step - 1) % CLOCKWISE.len()];
            return Ok(Some((candidate, (current.0 + bx, current.1 + by))));
        }
    }
    Ok(None)
}
