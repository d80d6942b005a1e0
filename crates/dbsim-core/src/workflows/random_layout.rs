use crate::core::models::cell::CellRole;
use crate::core::models::coords::{Lattice, SiqadCoord};
use crate::core::models::layout::SidbLayout;
use crate::engine::config::{PositiveCharges, RandomLayoutParams};
use crate::engine::error::EngineError;
use crate::engine::surface::can_positive_charges_occur;
use rand::{Rng, thread_rng};
use std::collections::HashSet;
use tracing::{debug, instrument, trace, warn};

/// Places `number_of_sidbs` SiDBs at distinct random sites of the configured area.
#[instrument(skip_all, name = "random_layout")]
pub fn generate(params: &RandomLayoutParams) -> Result<SidbLayout, EngineError> {
    generate_with_rng(params, &mut thread_rng())
}

/// Like [`generate`], drawing sites from `rng`.
///
/// With [`PositiveCharges::Forbidden`], layouts in which some SiDB could become
/// positive are discarded and redrawn, up to `maximum_attempts` times.
pub fn generate_with_rng<R: Rng + ?Sized>(
    params: &RandomLayoutParams,
    rng: &mut R,
) -> Result<SidbLayout, EngineError> {
    params.simulation.validate()?;

    let (nw, se) = (params.north_west, params.south_east);
    let first_row = nw.cube_row();
    if nw.x > se.x || first_row > se.cube_row() {
        return Err(EngineError::InvalidArea {
            reason: format!("north-west corner {nw} lies south or east of {se}"),
        });
    }
    let width = (se.x - nw.x + 1) as usize;
    let num_sites = width * (se.cube_row() - first_row + 1) as usize;
    if params.number_of_sidbs > num_sites {
        return Err(EngineError::InvalidArea {
            reason: format!(
                "{} SiDB(s) requested but the area holds {num_sites} site(s)",
                params.number_of_sidbs
            ),
        });
    }

    for attempt in 1..=params.maximum_attempts {
        let cells = rand::seq::index::sample(rng, num_sites, params.number_of_sidbs)
            .into_iter()
            .map(|site| {
                let x = nw.x + (site % width) as i64;
                let row = first_row + (site / width) as i64;
                (SiqadCoord::from_cube(x, row), CellRole::Normal)
            });
        let layout = SidbLayout::from_cells(Lattice::default(), cells);

        if params.positive_charges == PositiveCharges::Forbidden
            && can_positive_charges_occur(&layout, &params.simulation)
        {
            trace!(attempt, "Discarding layout with possible positive charges.");
            continue;
        }
        debug!(attempt, "Generated random layout.");
        return Ok(layout);
    }

    warn!(
        attempts = params.maximum_attempts,
        "Every drawn layout admitted positive charges."
    );
    Err(EngineError::GenerationExhausted {
        attempts: params.maximum_attempts,
    })
}

/// Generates `number_of_unique_layouts` pairwise distinct random layouts.
#[instrument(skip_all, name = "random_layouts")]
pub fn generate_multiple(
    params: &RandomLayoutParams,
    number_of_unique_layouts: usize,
) -> Result<Vec<SidbLayout>, EngineError> {
    generate_multiple_with_rng(params, number_of_unique_layouts, &mut thread_rng())
}

/// Like [`generate_multiple`], drawing sites from `rng`.
///
/// A layout whose cell set was already produced is discarded. At most
/// `maximum_attempts` layouts are drawn in total.
pub fn generate_multiple_with_rng<R: Rng + ?Sized>(
    params: &RandomLayoutParams,
    number_of_unique_layouts: usize,
    rng: &mut R,
) -> Result<Vec<SidbLayout>, EngineError> {
    let mut seen: HashSet<Vec<SiqadCoord>> = HashSet::with_capacity(number_of_unique_layouts);
    let mut layouts = Vec::with_capacity(number_of_unique_layouts);

    for attempt in 1..=params.maximum_attempts {
        if layouts.len() == number_of_unique_layouts {
            break;
        }
        let layout = generate_with_rng(params, rng)?;
        if !seen.insert(layout.coords()) {
            trace!(attempt, "Discarding duplicate layout.");
            continue;
        }
        layouts.push(layout);
    }

    if layouts.len() < number_of_unique_layouts {
        warn!(
            found = layouts.len(),
            requested = number_of_unique_layouts,
            "Ran out of attempts before finding enough distinct layouts."
        );
        return Err(EngineError::GenerationExhausted {
            attempts: params.maximum_attempts,
        });
    }
    debug!(count = layouts.len(), "Generated distinct random layouts.");
    Ok(layouts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::physics::params::SimulationParameters;
    use crate::engine::config::RandomLayoutParamsBuilder;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn c(x: i64, y: i64, z: u8) -> SiqadCoord {
        SiqadCoord::new(x, y, z)
    }

    #[test]
    fn places_requested_number_of_sidbs_inside_area() {
        let params = RandomLayoutParamsBuilder::new()
            .area(c(-10, -10, 0), c(5, 7, 1))
            .number_of_sidbs(10)
            .build()
            .unwrap();
        let layout = generate_with_rng(&params, &mut StdRng::seed_from_u64(7)).unwrap();

        assert_eq!(layout.num_cells(), 10);
        for coord in layout.coords() {
            assert!((-10..=5).contains(&coord.x));
            assert!((-10..=7).contains(&coord.y));
        }
    }

    #[test]
    fn identical_corners_yield_single_site() {
        let params = RandomLayoutParamsBuilder::new()
            .area(c(-10, -10, 1), c(-10, -10, 1))
            .number_of_sidbs(1)
            .build()
            .unwrap();
        let layout = generate(&params).unwrap();
        assert_eq!(layout.coords(), vec![c(-10, -10, 1)]);
    }

    #[test]
    fn forbidding_positive_charges_keeps_sidbs_apart() {
        let params = RandomLayoutParamsBuilder::new()
            .area(c(0, 0, 0), c(30, 30, 1))
            .number_of_sidbs(20)
            .positive_charges(PositiveCharges::Forbidden)
            .build()
            .unwrap();
        let layout = generate_with_rng(&params, &mut StdRng::seed_from_u64(42)).unwrap();

        assert_eq!(layout.num_cells(), 20);
        assert!(!can_positive_charges_occur(&layout, &params.simulation));
    }

    #[test]
    fn gives_up_when_every_layout_admits_positive_charges() {
        let params = RandomLayoutParamsBuilder::new()
            .area(c(0, 0, 0), c(1, 0, 0))
            .number_of_sidbs(2)
            .positive_charges(PositiveCharges::Forbidden)
            .simulation(SimulationParameters::default().with_epsilon_r(1.0))
            .maximum_attempts(5)
            .build()
            .unwrap();
        let err = generate(&params).unwrap_err();
        assert!(matches!(err, EngineError::GenerationExhausted { attempts: 5 }));
    }

    #[test]
    fn rejects_inverted_or_overfull_area() {
        let inverted = RandomLayoutParamsBuilder::new()
            .area(c(5, 7, 0), c(-10, -10, 0))
            .number_of_sidbs(1)
            .build()
            .unwrap();
        assert!(matches!(
            generate(&inverted),
            Err(EngineError::InvalidArea { .. })
        ));

        let overfull = RandomLayoutParamsBuilder::new()
            .area(c(0, 0, 0), c(1, 0, 1))
            .number_of_sidbs(5)
            .build()
            .unwrap();
        assert!(matches!(
            generate(&overfull),
            Err(EngineError::InvalidArea { .. })
        ));
    }

    #[test]
    fn multiple_layouts_are_pairwise_distinct() {
        let params = RandomLayoutParamsBuilder::new()
            .area(c(0, 0, 0), c(9, 9, 1))
            .number_of_sidbs(10)
            .positive_charges(PositiveCharges::Forbidden)
            .build()
            .unwrap();
        let layouts =
            generate_multiple_with_rng(&params, 3, &mut StdRng::seed_from_u64(3)).unwrap();

        assert_eq!(layouts.len(), 3);
        for (i, first) in layouts.iter().enumerate() {
            assert_eq!(first.num_cells(), 10);
            for second in &layouts[i + 1..] {
                assert_ne!(first.coords(), second.coords());
            }
        }
    }

    #[test]
    fn multiple_layouts_fail_when_area_has_too_few_arrangements() {
        let params = RandomLayoutParamsBuilder::new()
            .area(c(0, 0, 0), c(1, 0, 0))
            .number_of_sidbs(1)
            .maximum_attempts(50)
            .build()
            .unwrap();
        let err =
            generate_multiple_with_rng(&params, 3, &mut StdRng::seed_from_u64(11)).unwrap_err();
        assert!(matches!(err, EngineError::GenerationExhausted { attempts: 50 }));

        let both = generate_multiple_with_rng(&params, 2, &mut StdRng::seed_from_u64(11)).unwrap();
        let mut sites: Vec<_> = both.iter().flat_map(|l| l.coords()).collect();
        sites.sort();
        assert_eq!(sites, vec![c(0, 0, 0), c(1, 0, 0)]);
    }
}
