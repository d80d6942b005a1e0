use crate::core::bdl::BdlPair;
use crate::core::models::cell::ChargeState;
use crate::core::models::truth_table::TruthTable;
use crate::core::physics::{ENERGY_PRECISION, round_to_decimal_places};
use crate::engine::error::EngineError;
use crate::engine::result::SimulationResult;
use std::cmp::Ordering;

/// Energy of one charge distribution and whether it shows the expected output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateEnergy {
    /// System energy in eV, rounded to the energy precision.
    pub energy: f64,
    /// `true` if every output pair carries the expected bit (transparent), `false` if erroneous.
    pub transparent: bool,
}

/// Tags every distribution of `result` as transparent or erroneous for input `input_index`.
///
/// An output pair encodes `1` when its lower SiDB is charged, negative or positive, and
/// `0` when it is neutral. Entries are sorted by ascending energy.
pub fn energy_and_state_types(
    result: &SimulationResult,
    output_pairs: &[BdlPair],
    truth_tables: &[TruthTable],
    input_index: u64,
) -> Result<Vec<StateEnergy>, EngineError> {
    if output_pairs.is_empty() || output_pairs.len() != truth_tables.len() {
        return Err(EngineError::OutputArityMismatch {
            truth_tables: truth_tables.len(),
            output_pairs: output_pairs.len(),
        });
    }

    let mut states: Vec<StateEnergy> = result
        .charge_distributions
        .iter()
        .map(|surface| {
            let transparent = output_pairs.iter().zip(truth_tables).all(|(pair, tt)| {
                let lower_charged = matches!(
                    surface.charge_at(pair.lower),
                    Some(ChargeState::Negative | ChargeState::Positive)
                );
                tt.bit(input_index as usize) == Some(lower_charged)
            });
            StateEnergy {
                energy: round_to_decimal_places(surface.system_energy(), ENERGY_PRECISION),
                transparent,
            }
        })
        .collect();
    states.sort_by(|a, b| a.energy.partial_cmp(&b.energy).unwrap_or(Ordering::Equal));
    Ok(states)
}
