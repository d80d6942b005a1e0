use super::{DomainEvaluator, GridIndex, OperationalDomain, OperationalDomainStats, SequentialExplorer};
use crate::core::models::layout::SidbLayout;
use crate::core::models::truth_table::TruthTable;
use crate::engine::config::{ConfigError, Neighborhood, OperationalDomainParams};
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use crate::workflows::operational::OperationalStatus;
use rand::thread_rng;
use std::collections::VecDeque;
use std::time::Instant;
use tracing::{debug, info, instrument};

const VON_NEUMANN_OFFSETS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const MOORE_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

fn offsets(neighborhood: Neighborhood) -> &'static [(isize, isize)] {
    match neighborhood {
        Neighborhood::VonNeumann => &VON_NEUMANN_OFFSETS,
        Neighborhood::Moore => &MOORE_OFFSETS,
    }
}

/// Grows the operational region outward from `num_seeds` random grid points.
///
/// Every operational point has all of its in-bounds neighbors classified. Operational
/// islands that no seed lands in stay unexplored.
#[instrument(skip_all, name = "flood_fill", fields(num_seeds = num_seeds))]
pub fn run(
    layout: &SidbLayout,
    truth_tables: &[TruthTable],
    num_seeds: usize,
    neighborhood: Neighborhood,
    params: &OperationalDomainParams,
    reporter: &ProgressReporter,
) -> Result<(OperationalDomain, OperationalDomainStats), EngineError> {
    params.validate()?;
    if num_seeds == 0 {
        return Err(ConfigError::InvalidValue {
            name: "num_seeds",
            reason: "at least one seed is required".to_string(),
        }
        .into());
    }
    let start = Instant::now();

    let evaluator = DomainEvaluator::new(layout, truth_tables, params);
    let seeds = evaluator.sample_indices(&mut thread_rng(), num_seeds);
    let mut explorer = SequentialExplorer::new(evaluator);

    {
        let task = reporter.task(
            "Flood fill",
            explorer.evaluator().total_points() as u64,
        );

        let mut queue: VecDeque<GridIndex> = VecDeque::new();
        for &seed in &seeds {
            if explorer.status(seed, &task)? == OperationalStatus::Operational {
                queue.push_back(seed);
            }
        }
        debug!(
            "{} of {} seed(s) are operational.",
            queue.len(),
            seeds.len()
        );

        while let Some((x, y)) = queue.pop_front() {
            for &(dx, dy) in offsets(neighborhood) {
                let (nx, ny) = (x as isize + dx, y as isize + dy);
                if !explorer.evaluator().contains(nx, ny) {
                    continue;
                }
                let neighbor = (nx as usize, ny as usize);
                if explorer.is_evaluated(neighbor) {
                    continue;
                }
                if explorer.status(neighbor, &task)? == OperationalStatus::Operational {
                    queue.push_back(neighbor);
                }
            }
        }
    }

    let (domain, stats) = explorer.finish(start);
    info!(
        operational = stats.num_operational_parameter_combinations,
        evaluated = stats.num_evaluated_parameter_combinations,
        "Flood fill finished."
    );
    Ok((domain, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::domain::test_support::{
        assert_agrees_with, assert_within_bounds, mixed_window, operational_window,
        reference_domain,
    };
    use crate::workflows::operational::tests::bdl_wire;

    #[test]
    fn single_seed_fills_fully_operational_window() {
        let params = operational_window();
        let (domain, stats) = run(
            &bdl_wire(),
            &[TruthTable::identity()],
            1,
            Neighborhood::Moore,
            &params,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(domain.len(), 121);
        assert_eq!(stats.num_operational_parameter_combinations, 121);
        assert_eq!(stats.num_simulator_invocations, 242);
        assert_within_bounds(&domain, &params);
    }

    #[test]
    fn von_neumann_fill_also_reaches_every_point_of_a_rectangle() {
        let (domain, _) = run(
            &bdl_wire(),
            &[TruthTable::identity()],
            1,
            Neighborhood::VonNeumann,
            &operational_window(),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(domain.count(OperationalStatus::Operational), 121);
    }

    #[test]
    fn agrees_with_grid_search_on_mixed_window() {
        let params = mixed_window();
        let reference = reference_domain(&params);
        let (domain, _) = run(
            &bdl_wire(),
            &[TruthTable::identity()],
            5,
            Neighborhood::Moore,
            &params,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert!(domain.len() >= 5);
        assert_agrees_with(&domain, &reference);
        assert_within_bounds(&domain, &params);
    }

    #[test]
    fn seeding_every_point_recovers_all_operational_islands() {
        let params = mixed_window();
        let reference = reference_domain(&params);
        let (domain, _) = run(
            &bdl_wire(),
            &[TruthTable::identity()],
            usize::MAX,
            Neighborhood::Moore,
            &params,
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(domain, reference);
    }

    #[test]
    fn rejects_zero_seeds() {
        let err = run(
            &bdl_wire(),
            &[TruthTable::identity()],
            0,
            Neighborhood::Moore,
            &operational_window(),
            &ProgressReporter::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Config {
                source: ConfigError::InvalidValue { name: "num_seeds", .. }
            }
        ));
    }
}
