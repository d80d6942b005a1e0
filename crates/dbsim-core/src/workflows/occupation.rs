use super::energy_state::StateEnergy;
use crate::core::physics::BOLTZMANN_EV_PER_K;
use crate::engine::config::ConfigError;
use crate::engine::result::EnergyDistribution;

fn validate_temperature(temperature: f64) -> Result<(), ConfigError> {
    if temperature.is_finite() && temperature >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            name: "temperature",
            reason: format!("{temperature} K is not a non-negative finite temperature"),
        })
    }
}

/// Boltzmann factor of a state `excitation` eV above the ground state.
///
/// At zero kelvin only ground states are populated.
fn boltzmann_factor(excitation: f64, temperature: f64) -> f64 {
    if temperature == 0.0 {
        if excitation > 0.0 { 0.0 } else { 1.0 }
    } else {
        (-excitation / (BOLTZMANN_EV_PER_K * temperature)).exp()
    }
}

/// Probability of finding a gate in an erroneous state at `temperature` kelvin.
///
/// Returns zero when there are no states.
pub fn occupation_probability_gate_based(
    states: &[StateEnergy],
    temperature: f64,
) -> Result<f64, ConfigError> {
    validate_temperature(temperature)?;
    let Some(min_energy) = states.iter().map(|s| s.energy).reduce(f64::min) else {
        return Ok(0.0);
    };

    let (partition_function, erroneous) =
        states.iter().fold((0.0, 0.0), |(z, err), state| {
            let factor = boltzmann_factor(state.energy - min_energy, temperature);
            (z + factor, if state.transparent { err } else { err + factor })
        });
    Ok(erroneous / partition_function)
}

/// Probability of finding the system in any excited state at `temperature` kelvin.
pub fn occupation_probability_non_gate_based(
    distribution: &EnergyDistribution,
    temperature: f64,
) -> Result<f64, ConfigError> {
    validate_temperature(temperature)?;
    let Some(min_energy) = distribution.min_energy() else {
        return Ok(0.0);
    };

    let mut partition_function = 0.0;
    let mut excited = 0.0;
    for &(energy, degeneracy) in distribution.levels() {
        let weight = degeneracy as f64 * boltzmann_factor(energy - min_energy, temperature);
        partition_function += weight;
        if energy > min_energy {
            excited += weight;
        }
    }
    Ok(excited / partition_function)
}
