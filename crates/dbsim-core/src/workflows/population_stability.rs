use crate::core::models::cell::ChargeState;
use crate::core::models::coords::SiqadCoord;
use crate::core::models::layout::SidbLayout;
use crate::core::physics::potentials::distance_for_potential;
use crate::engine::config::{BaseNumberDetection, PopulationStabilityParams, QuickExactParams};
use crate::engine::error::EngineError;
use crate::engine::quickexact;
use crate::engine::surface::ChargeDistributionSurface;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionType {
    NegativeToNeutral,
    NeutralToNegative,
    NeutralToPositive,
    PositiveToNeutral,
}

impl fmt::Display for TransitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransitionType::NegativeToNeutral => "- -> 0",
            TransitionType::NeutralToNegative => "0 -> -",
            TransitionType::NeutralToPositive => "0 -> +",
            TransitionType::PositiveToNeutral => "+ -> 0",
        })
    }
}

/// How far one charge distribution is from losing population stability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationStability {
    /// The SiDB whose charge state changes first as the local potential drifts.
    pub critical_cell: SiqadCoord,
    pub transition: TransitionType,
    /// Potential change (V) at the critical cell that triggers the transition.
    pub minimum_potential_difference_to_transition: f64,
    /// Distance (nm) at which a unit charge induces that potential change.
    pub distance_corresponding_to_potential: f64,
    pub system_energy: f64,
}

/// Reports, for every physically valid charge distribution of `layout` in order of
/// increasing energy, the SiDB closest to a charge transition.
#[instrument(skip_all, name = "population_stability", fields(num_cells = layout.num_cells()))]
pub fn assess(
    layout: &SidbLayout,
    params: &PopulationStabilityParams,
) -> Result<Vec<PopulationStability>, EngineError> {
    let mut result = quickexact::run(
        layout,
        &QuickExactParams::new(params.simulation, BaseNumberDetection::On),
    )?;
    result.sort_by_energy();

    let assessments: Vec<_> = result
        .charge_distributions
        .iter()
        .filter_map(|surface| critical_transition(surface, params))
        .collect();
    debug!("Assessed {} charge distribution(s).", assessments.len());
    Ok(assessments)
}

fn critical_transition(
    surface: &ChargeDistributionSurface,
    params: &PopulationStabilityParams,
) -> Option<PopulationStability> {
    let sim = surface.params();
    let (index, transition, difference) = (0..surface.num_cells())
        .map(|i| {
            let v = surface.local_potential(i);
            let to_negative = (-v + sim.mu_minus).abs();
            let to_positive = (-v + sim.mu_plus()).abs();
            match surface.charge_state(i) {
                ChargeState::Negative => (i, TransitionType::NegativeToNeutral, to_negative),
                ChargeState::Positive => (i, TransitionType::PositiveToNeutral, to_positive),
                ChargeState::Neutral if to_positive < to_negative => {
                    (i, TransitionType::NeutralToPositive, to_positive)
                }
                ChargeState::Neutral => (i, TransitionType::NeutralToNegative, to_negative),
            }
        })
        .min_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(Ordering::Equal))?;

    Some(PopulationStability {
        critical_cell: surface.cells()[index],
        transition,
        minimum_potential_difference_to_transition: difference,
        distance_corresponding_to_potential: distance_for_potential(
            difference,
            sim.epsilon_r,
            sim.lambda_tf,
            params.precision_for_distance,
        ),
        system_energy: surface.system_energy(),
    })
}
