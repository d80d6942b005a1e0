use super::surface::ChargeDistributionSurface;
use crate::core::physics::params::SimulationParameters;
use crate::core::physics::{ENERGY_PRECISION, round_to_decimal_places};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::time::Duration;

/// Number of distributions found at each (rounded) system energy, ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnergyDistribution {
    levels: Vec<(f64, usize)>,
}

impl EnergyDistribution {
    pub fn from_energies(energies: impl IntoIterator<Item = f64>) -> Self {
        let mut rounded: Vec<f64> = energies
            .into_iter()
            .map(|e| round_to_decimal_places(e, ENERGY_PRECISION))
            .collect();
        rounded.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let mut levels: Vec<(f64, usize)> = Vec::new();
        for energy in rounded {
            match levels.last_mut() {
                Some((last, count)) if *last == energy => *count += 1,
                _ => levels.push((energy, 1)),
            }
        }
        Self { levels }
    }

    pub fn levels(&self) -> &[(f64, usize)] {
        &self.levels
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn min_energy(&self) -> Option<f64> {
        self.levels.first().map(|(e, _)| *e)
    }

    pub fn ground_state_degeneracy(&self) -> usize {
        self.levels.first().map_or(0, |(_, count)| *count)
    }

    pub fn is_ground_state_degenerate(&self) -> bool {
        self.ground_state_degeneracy() > 1
    }
}

/// All physically valid charge distributions of one layout under one set of parameters.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub algorithm_name: &'static str,
    pub simulation_runtime: Duration,
    pub simulation_parameters: SimulationParameters,
    pub charge_distributions: Vec<ChargeDistributionSurface>,
    /// Free-form numeric metadata, e.g. the base number the enumeration ran in.
    pub additional_simulation_parameters: BTreeMap<String, f64>,
}

impl SimulationResult {
    pub fn new(algorithm_name: &'static str, simulation_parameters: SimulationParameters) -> Self {
        Self {
            algorithm_name,
            simulation_runtime: Duration::ZERO,
            simulation_parameters,
            charge_distributions: Vec::new(),
            additional_simulation_parameters: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.charge_distributions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.charge_distributions.len()
    }

    pub fn energy_distribution(&self) -> EnergyDistribution {
        EnergyDistribution::from_energies(self.charge_distributions.iter().map(|s| s.system_energy()))
    }

    /// Distributions whose rounded energy equals the rounded minimum.
    pub fn ground_states(&self) -> Vec<&ChargeDistributionSurface> {
        let Some(min) = self.energy_distribution().min_energy() else {
            return Vec::new();
        };
        self.charge_distributions
            .iter()
            .filter(|s| round_to_decimal_places(s.system_energy(), ENERGY_PRECISION) == min)
            .collect()
    }

    /// The first distribution of minimum energy, in enumeration order.
    pub fn ground_state(&self) -> Option<&ChargeDistributionSurface> {
        self.charge_distributions.iter().min_by(|a, b| {
            round_to_decimal_places(a.system_energy(), ENERGY_PRECISION)
                .partial_cmp(&round_to_decimal_places(b.system_energy(), ENERGY_PRECISION))
                .unwrap_or(Ordering::Equal)
        })
    }

    pub fn is_ground_state_degenerate(&self) -> bool {
        self.energy_distribution().is_ground_state_degenerate()
    }

    /// Orders the distributions by ascending system energy.
    pub fn sort_by_energy(&mut self) {
        self.charge_distributions.sort_by(|a, b| {
            a.system_energy()
                .partial_cmp(&b.system_energy())
                .unwrap_or(Ordering::Equal)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn energy_distribution_groups_rounded_energies() {
        let dist = EnergyDistribution::from_energies([0.3, -1.0000001, -1.0, 0.1 + 0.2]);
        assert_eq!(dist.levels(), &[(-1.0, 2), (0.3, 2)]);
        assert_eq!(dist.min_energy(), Some(-1.0));
        assert!(dist.is_ground_state_degenerate());
    }

    #[test]
    fn empty_distribution_has_no_ground_state() {
        let dist = EnergyDistribution::from_energies(std::iter::empty());
        assert!(dist.is_empty());
        assert_eq!(dist.min_energy(), None);
        assert_eq!(dist.ground_state_degeneracy(), 0);
        assert!(!dist.is_ground_state_degenerate());
    }

    #[test]
    fn empty_result_reports_no_ground_state() {
        let result = SimulationResult::new("QuickExact", SimulationParameters::default());
        assert!(result.is_empty());
        assert!(result.ground_state().is_none());
        assert!(result.ground_states().is_empty());
        assert!(!result.is_ground_state_degenerate());
    }
}
