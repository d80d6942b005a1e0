use crate::core::models::cell::ChargeState;
use crate::core::models::coords::SiqadCoord;
use crate::core::models::defect::Defect;
use crate::core::models::layout::SidbLayout;
use crate::engine::config::{BaseNumberDetection, DefectInfluenceParams, QuickExactParams};
use crate::engine::error::EngineError;
use crate::engine::progress::{ProgressReporter, TaskGuard};
use crate::engine::quickexact;
use kiddo::{KdTree, SquaredEuclidean};
use std::cmp::Ordering;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Farthest defect position that still changes the ground state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DefectInfluence {
    pub position: SiqadCoord,
    /// Distance in nanometres from `position` to the nearest SiDB of the layout.
    pub distance_nm: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefectInfluenceStats {
    pub time_total: Duration,
    pub num_simulator_invocations: usize,
    pub num_evaluated_defect_positions: usize,
}

/// Finds the defect position farthest from `layout` at which the defect still alters
/// the simulated ground state.
///
/// Candidates are all free sites in the layout's bounding box padded by the scanning
/// area. Each candidate is simulated independently on its own copy of the layout; the
/// per-candidate results are reduced to the maximum distance afterwards. An empty
/// layout has nothing to influence and yields the default position at distance zero.
#[instrument(skip_all, name = "defect_influence")]
pub fn run(
    layout: &SidbLayout,
    params: &DefectInfluenceParams,
    reporter: &ProgressReporter,
) -> Result<(DefectInfluence, DefectInfluenceStats), EngineError> {
    params.simulation.validate()?;
    params.defect.validate()?;
    let start = Instant::now();

    let Some(candidates) = candidate_positions(layout, params) else {
        debug!("Layout is empty; nothing to influence.");
        return Ok((
            DefectInfluence::default(),
            DefectInfluenceStats {
                time_total: start.elapsed(),
                ..DefectInfluenceStats::default()
            },
        ));
    };

    let quickexact_params = QuickExactParams::new(params.simulation, BaseNumberDetection::Off);
    let reference = ground_state_set(layout, &quickexact_params)?;
    info!(
        "Scanning {} candidate defect position(s).",
        candidates.len()
    );

    let positions: Vec<[f64; 2]> = layout
        .coords()
        .iter()
        .map(|&c| {
            let p = layout.lattice().position_nm(c);
            [p.x, p.y]
        })
        .collect();
    let kdtree: KdTree<f64, 2> = (&positions).into();

    let influences = {
        let task = reporter.task("Defect influence", candidates.len() as u64);
        evaluate_candidates(
            layout,
            &candidates,
            params.defect,
            &quickexact_params,
            &reference,
            &kdtree,
            &task,
        )?
    };

    let best = influences
        .into_iter()
        .flatten()
        .fold(DefectInfluence::default(), |best, candidate| {
            match candidate.distance_nm.partial_cmp(&best.distance_nm) {
                Some(Ordering::Greater) => candidate,
                Some(Ordering::Equal) if candidate.position < best.position => candidate,
                _ => best,
            }
        });

    let stats = DefectInfluenceStats {
        time_total: start.elapsed(),
        num_simulator_invocations: candidates.len() + 1,
        num_evaluated_defect_positions: candidates.len(),
    };
    info!(
        position = %best.position,
        distance_nm = best.distance_nm,
        "Defect influence search finished."
    );
    Ok((best, stats))
}

/// Free sites in the padded bounding box, in row-major order.
fn candidate_positions(
    layout: &SidbLayout,
    params: &DefectInfluenceParams,
) -> Option<Vec<SiqadCoord>> {
    let (nw, se) = layout.bounding_box()?;
    let area = params.scanning_area;
    let rows = (nw.cube_row() - 2 * area.dimer_rows)..=(se.cube_row() + 2 * area.dimer_rows);
    let columns = (nw.x - area.columns)..=(se.x + area.columns);

    Some(
        rows.flat_map(|row| columns.clone().map(move |x| SiqadCoord::from_cube(x, row)))
            .filter(|&c| layout.is_empty_cell(c) && !layout.has_defect(c))
            .collect(),
    )
}

/// Sorted charge vectors of every minimum-energy distribution.
fn ground_state_set(
    layout: &SidbLayout,
    params: &QuickExactParams,
) -> Result<Vec<Vec<ChargeState>>, EngineError> {
    let result = quickexact::run(layout, params)?;
    let mut states: Vec<Vec<ChargeState>> = result
        .ground_states()
        .into_iter()
        .map(|surface| surface.charge_states().to_vec())
        .collect();
    states.sort();
    states.dedup();
    Ok(states)
}

/// A defect influences the layout when it makes the ground state degenerate
/// or moves it away from the undisturbed one.
fn changes_ground_state(reference: &[Vec<ChargeState>], disturbed: &[Vec<ChargeState>]) -> bool {
    disturbed.len() > 1 || disturbed != reference
}

fn evaluate_candidates(
    layout: &SidbLayout,
    candidates: &[SiqadCoord],
    defect: Defect,
    params: &QuickExactParams,
    reference: &[Vec<ChargeState>],
    kdtree: &KdTree<f64, 2>,
    task: &TaskGuard<'_, '_>,
) -> Result<Vec<Option<DefectInfluence>>, EngineError> {
    #[cfg(not(feature = "parallel"))]
    let iterator = candidates.iter();

    #[cfg(feature = "parallel")]
    let iterator = candidates.par_iter();

    iterator
        .map(|&position| {
            let mut disturbed = layout.clone();
            disturbed.assign_defect(position, defect);
            let charges = ground_state_set(&disturbed, params)?;
            task.tick();

            if !changes_ground_state(reference, &charges) {
                return Ok(None);
            }
            let p = layout.lattice().position_nm(position);
            let nearest = kdtree.nearest_one::<SquaredEuclidean>(&[p.x, p.y]);
            Ok(Some(DefectInfluence {
                position,
                distance_nm: nearest.distance.sqrt(),
            }))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::physics::params::SimulationParameters;
    use crate::engine::config::{DefectInfluenceParamsBuilder, ScanningArea};

    const TOLERANCE: f64 = 1e-6;

    fn single_sidb() -> SidbLayout {
        SidbLayout::with_normal_cells([SiqadCoord::new(0, 0, 0)])
    }

    fn params(lambda_tf: f64, scanning_area: ScanningArea) -> DefectInfluenceParams {
        DefectInfluenceParamsBuilder::new()
            .simulation(SimulationParameters::default())
            .defect(Defect::new(-1.0, 5.6, lambda_tf))
            .scanning_area(scanning_area)
            .build()
            .unwrap()
    }

    fn small_area() -> ScanningArea {
        ScanningArea {
            columns: 2,
            dimer_rows: 2,
        }
    }

    #[test]
    fn empty_layout_is_not_influenced() {
        let (influence, stats) = run(
            &SidbLayout::default(),
            &params(5.0, ScanningArea::default()),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(influence.position, SiqadCoord::default());
        assert_eq!(influence.distance_nm, 0.0);
        assert_eq!(stats.num_simulator_invocations, 0);
    }

    #[test]
    fn finds_farthest_influential_site_in_small_area() {
        let (influence, stats) =
            run(&single_sidb(), &params(5.0, small_area()), &ProgressReporter::new()).unwrap();

        assert_eq!(influence.position, SiqadCoord::new(-1, -1, 1));
        assert!((influence.distance_nm - 0.665060).abs() < TOLERANCE);
        assert_eq!(stats.num_evaluated_defect_positions, 44);
        assert_eq!(stats.num_simulator_invocations, 45);
    }

    #[test]
    fn strong_screening_shrinks_influence_radius() {
        let (influence, _) = run(
            &single_sidb(),
            &params(1.0, ScanningArea::default()),
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(influence.position, SiqadCoord::new(-1, 0, 1));
        assert!((influence.distance_nm - 0.445063).abs() < TOLERANCE);
    }

    #[test]
    fn weak_screening_reaches_edge_of_scanning_area() {
        let (influence, _) =
            run(&single_sidb(), &params(20.0, small_area()), &ProgressReporter::new()).unwrap();

        assert_eq!(influence.position, SiqadCoord::new(0, -1, 0));
        assert!((influence.distance_nm - 0.768).abs() < TOLERANCE);
    }

    #[test]
    fn defect_making_ground_state_degenerate_counts_as_influential() {
        let layout = SidbLayout::with_normal_cells([
            SiqadCoord::new(0, 0, 0),
            SiqadCoord::new(4, 0, 0),
            SiqadCoord::new(6, 0, 0),
        ]);
        let (influence, _) = run(
            &layout,
            &params(5.0, ScanningArea::default()),
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(influence.position, SiqadCoord::new(10, 0, 0));
        assert!((influence.distance_nm - 1.536).abs() < TOLERANCE);
    }

    #[test]
    fn degenerate_or_shifted_ground_state_is_a_change() {
        use ChargeState::{Negative, Neutral};
        let reference = vec![vec![Negative, Neutral, Negative]];

        assert!(!changes_ground_state(&reference, &reference));
        assert!(changes_ground_state(
            &reference,
            &[vec![Negative, Negative, Neutral]]
        ));
        assert!(changes_ground_state(
            &reference,
            &[
                vec![Negative, Negative, Neutral],
                vec![Negative, Neutral, Negative],
            ]
        ));
    }

    fn y_shape_or_gate() -> SidbLayout {
        SidbLayout::with_normal_cells([
            SiqadCoord::new(10, 0, 0),
            SiqadCoord::new(0, 1, 0),
            SiqadCoord::new(8, 1, 0),
            SiqadCoord::new(2, 2, 0),
            SiqadCoord::new(6, 2, 0),
            SiqadCoord::new(4, 4, 0),
            SiqadCoord::new(4, 5, 1),
            SiqadCoord::new(4, 7, 1),
        ])
    }

    #[test]
    fn y_shape_or_gate_reference_influence() {
        let layout = y_shape_or_gate();
        let (influence, _) = run(
            &layout,
            &params(5.0, ScanningArea::default()),
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(influence.position, SiqadCoord::new(12, 4, 1));
        assert!((influence.distance_nm - 2.8999201713).abs() < 1e-6);

        let (screened, _) = run(
            &layout,
            &params(1.0, ScanningArea::default()),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert!(screened.distance_nm < influence.distance_nm);
    }

    #[test]
    fn occupied_and_defective_sites_are_not_candidates() {
        let mut layout = single_sidb();
        layout.assign_defect(SiqadCoord::new(40, 0, 0), Defect::default());
        let candidates = candidate_positions(&layout, &params(5.0, small_area())).unwrap();

        assert_eq!(candidates.len(), 44);
        assert!(!candidates.contains(&SiqadCoord::new(0, 0, 0)));
        assert!(candidates.windows(2).all(|w| w[0] < w[1]));

        let (nw, se) = (candidates[0], candidates[candidates.len() - 1]);
        assert_eq!(nw, SiqadCoord::new(-2, -2, 0));
        assert_eq!(se, SiqadCoord::new(2, 2, 0));
    }

    #[test]
    fn invalid_defect_is_rejected() {
        let mut invalid = params(5.0, small_area());
        invalid.defect.epsilon_r = 0.0;
        let err = run(&single_sidb(), &invalid, &ProgressReporter::new()).unwrap_err();
        assert!(matches!(err, EngineError::Parameters { .. }));
    }
}
