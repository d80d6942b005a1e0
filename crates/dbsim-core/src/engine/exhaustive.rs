use super::error::EngineError;
use super::quickexact::BASE_NUMBER_KEY;
use super::result::SimulationResult;
use super::surface::ChargeDistributionSurface;
use crate::core::models::layout::SidbLayout;
use crate::core::physics::params::SimulationParameters;
use std::time::Instant;
use tracing::{debug, instrument};

pub const ALGORITHM_NAME: &str = "ExGS";

/// Tests every one of the `base^n` charge assignments of `layout`.
#[instrument(skip_all, name = "exhaustive", fields(num_cells = layout.num_cells()))]
pub fn run(
    layout: &SidbLayout,
    params: &SimulationParameters,
) -> Result<SimulationResult, EngineError> {
    params.validate()?;
    for (_, defect) in layout.defects() {
        defect.validate()?;
    }

    let start = Instant::now();
    let mut result = SimulationResult::new(ALGORITHM_NAME, *params);

    if !layout.is_empty() {
        let mut surface = ChargeDistributionSurface::new(layout, *params);
        let max_index = surface.max_charge_index();
        debug!("Testing {} assignment(s).", u128::from(max_index) + 1);

        for index in 0..=max_index {
            surface.assign_charge_index(index);
            if surface.is_physically_valid() {
                let mut snapshot = surface.clone();
                snapshot.recompute_system_energy();
                result.charge_distributions.push(snapshot);
            }
        }
    }

    result
        .additional_simulation_parameters
        .insert(BASE_NUMBER_KEY.to_string(), f64::from(params.base));
    result.simulation_runtime = start.elapsed();
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::cell::ChargeState;
    use crate::core::models::coords::SiqadCoord;

    #[test]
    fn enumerates_both_degenerate_states_of_close_pair() {
        let layout = SidbLayout::with_normal_cells([SiqadCoord::new(0, 0, 0), SiqadCoord::new(1, 0, 0)]);
        let result = run(&layout, &SimulationParameters::default().with_base(2)).unwrap();
        assert_eq!(result.algorithm_name, "ExGS");
        assert_eq!(result.len(), 2);
        for distribution in &result.charge_distributions {
            assert_eq!(distribution.count_charge_state(ChargeState::Negative), 1);
            assert_eq!(distribution.count_charge_state(ChargeState::Neutral), 1);
        }
    }

    #[test]
    fn empty_layout_yields_empty_result() {
        let result = run(&SidbLayout::default(), &SimulationParameters::default()).unwrap();
        assert!(result.is_empty());
    }
}
