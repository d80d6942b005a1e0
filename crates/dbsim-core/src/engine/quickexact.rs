use super::config::{BaseNumberDetection, QuickExactParams};
use super::error::EngineError;
use super::gray_code::GrayCode;
use super::result::SimulationResult;
use super::surface::ChargeDistributionSurface;
use crate::core::models::cell::ChargeState;
use crate::core::models::layout::SidbLayout;
use std::time::Instant;
use tracing::{debug, instrument, trace};

pub const ALGORITHM_NAME: &str = "QuickExact";
pub const BASE_NUMBER_KEY: &str = "base_number";

/// Enumerates every physically valid charge distribution of `layout`.
///
/// Cells that are negative in every valid distribution are fixed up front, one free
/// cell becomes the dependent cell, and the remaining cells are walked in Gray-code
/// order so that consecutive configurations differ in a single cell. With positive
/// charges in play, cells that can become positive are enumerated exhaustively in
/// base 3 for every Gray-code step of the others.
#[instrument(skip_all, name = "quickexact", fields(num_cells = layout.num_cells()))]
pub fn run(layout: &SidbLayout, params: &QuickExactParams) -> Result<SimulationResult, EngineError> {
    params.simulation.validate()?;
    for (_, defect) in layout.defects() {
        defect.validate()?;
    }

    let start = Instant::now();
    let mut result = SimulationResult::new(ALGORITHM_NAME, params.simulation);

    if layout.is_empty() {
        result
            .additional_simulation_parameters
            .insert(BASE_NUMBER_KEY.to_string(), f64::from(params.simulation.base));
        result.simulation_runtime = start.elapsed();
        return Ok(result);
    }

    let mut surface = ChargeDistributionSurface::new(layout, params.simulation);
    let num_fixed = surface.detect_pre_assigned_negative_cells();
    let free_cells = surface.free_cells();
    let positive_candidates: Vec<usize> = free_cells
        .iter()
        .copied()
        .filter(|&i| surface.can_be_positive(i))
        .collect();

    let base = match params.base_number_detection {
        BaseNumberDetection::On if positive_candidates.is_empty() => 2,
        BaseNumberDetection::On => 3,
        BaseNumberDetection::Off => params.simulation.base,
    };
    surface.set_base(base);

    debug!(
        "Enumerating {} free cell(s) in base {} ({} fixed negative, {} positive candidate(s)).",
        free_cells.len(),
        base,
        num_fixed,
        positive_candidates.len()
    );

    match free_cells.first() {
        None => record_if_valid(&surface, &mut result),
        Some(&dependent) => {
            surface.set_dependent_cell(Some(dependent));
            if base == 2 {
                enumerate_two_state(&mut surface, &mut result);
            } else {
                enumerate_three_state(&mut surface, &positive_candidates, &mut result);
            }
        }
    }

    result
        .additional_simulation_parameters
        .insert(BASE_NUMBER_KEY.to_string(), f64::from(base));
    result.simulation_runtime = start.elapsed();

    debug!(
        "Found {} valid charge distribution(s) in {:.3?}.",
        result.len(),
        result.simulation_runtime
    );
    Ok(result)
}

fn record_if_valid(surface: &ChargeDistributionSurface, result: &mut SimulationResult) {
    if surface.is_physically_valid() {
        let mut snapshot = surface.clone();
        snapshot.recompute_system_energy();
        trace!(
            "Valid distribution with energy {:.6} eV.",
            snapshot.system_energy()
        );
        result.charge_distributions.push(snapshot);
    }
}

#[inline]
fn toggle_binary(surface: &mut ChargeDistributionSurface, cell: usize) {
    let next = match surface.charge_state(cell) {
        ChargeState::Negative => ChargeState::Neutral,
        _ => ChargeState::Negative,
    };
    surface.assign_charge_state(cell, next);
}

fn enumerate_two_state(surface: &mut ChargeDistributionSurface, result: &mut SimulationResult) {
    let independent = surface.independent_cells().to_vec();
    for &cell in &independent {
        surface.assign_charge_state(cell, ChargeState::Negative);
    }
    surface.update_dependent_cell();
    record_if_valid(surface, result);

    let k = independent.len();
    let mut gray = GrayCode::new(k);
    while let Some(bit) = gray.step() {
        toggle_binary(surface, independent[k - 1 - bit as usize]);
        surface.update_dependent_cell();
        record_if_valid(surface, result);
    }
}

fn enumerate_three_state(
    surface: &mut ChargeDistributionSurface,
    positive_candidates: &[usize],
    result: &mut SimulationResult,
) {
    let independent = surface.independent_cells().to_vec();
    let (inner, outer): (Vec<usize>, Vec<usize>) = independent
        .iter()
        .partition(|&&i| positive_candidates.contains(&i));
    for &cell in &independent {
        surface.assign_charge_state(cell, ChargeState::Negative);
    }

    let inner_count = 3u64.checked_pow(inner.len() as u32).unwrap_or(u64::MAX);
    let k = outer.len();
    let mut gray = GrayCode::new(k);
    loop {
        for inner_index in 0..inner_count {
            assign_ternary_digits(surface, &inner, inner_index);
            surface.update_dependent_cell();
            record_if_valid(surface, result);
        }
        let Some(bit) = gray.step() else {
            break;
        };
        toggle_binary(surface, outer[k - 1 - bit as usize]);
    }
}

fn assign_ternary_digits(surface: &mut ChargeDistributionSurface, cells: &[usize], index: u64) {
    let mut remaining = index;
    for &cell in cells.iter().rev() {
        if let Some(state) = ChargeState::from_digit(remaining % 3) {
            surface.assign_charge_state(cell, state);
        }
        remaining /= 3;
    }
}
