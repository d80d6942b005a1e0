use crate::core::models::cell::ChargeState;
use crate::core::models::coords::SiqadCoord;
use crate::core::models::layout::SidbLayout;
use crate::core::physics::POP_STABILITY_ERR;
use crate::core::physics::params::SimulationParameters;
use crate::core::physics::potentials::{point_charge_potential, screened_coulomb_potential};
use nalgebra::{DMatrix, DVector};
use std::sync::Arc;

/// Charge state a cell must take to be population stable under `local_potential`.
///
/// This is the derivation rule for the dependent cell of a surface: the state is fully
/// determined by the potential the other cells (and the environment) induce on it.
pub fn derive_dependent_charge(
    local_potential: f64,
    params: &SimulationParameters,
    base: u8,
) -> ChargeState {
    if -local_potential + params.mu_minus < POP_STABILITY_ERR {
        ChargeState::Negative
    } else if base == 3 && -local_potential + params.mu_plus() > -POP_STABILITY_ERR {
        ChargeState::Positive
    } else {
        ChargeState::Neutral
    }
}

/// Whether `state` is compatible with `local_potential` relative to the transition levels.
#[inline]
pub fn is_population_stable(
    state: ChargeState,
    local_potential: f64,
    params: &SimulationParameters,
) -> bool {
    let to_minus = -local_potential + params.mu_minus;
    let to_plus = -local_potential + params.mu_plus();
    match state {
        ChargeState::Negative => to_minus < POP_STABILITY_ERR,
        ChargeState::Positive => to_plus > -POP_STABILITY_ERR,
        ChargeState::Neutral => to_minus > -POP_STABILITY_ERR && to_plus < POP_STABILITY_ERR,
    }
}

/// Whether any cell of `layout` could become positively charged under `params`.
///
/// A cell can only be positive if it would be positive with every other cell negative,
/// since that assignment maximizes the electron repulsion it experiences.
pub fn can_positive_charges_occur(layout: &SidbLayout, params: &SimulationParameters) -> bool {
    let surface = ChargeDistributionSurface::new(layout, *params);
    (0..surface.num_cells()).any(|i| surface.can_be_positive(i))
}

/// The mutable charge configuration of a layout together with its electrostatics.
///
/// The surface owns a dense matrix of pairwise potentials and the local potential of
/// every cell. Assigning a charge state updates all local potentials and the system
/// energy in O(n). The pairwise matrix and the external potentials never change after
/// construction and are shared between clones, so snapshots only copy per-cell state.
///
/// Cells fall into three groups for enumeration purposes:
/// - **fixed** cells, proven negative in every valid configuration,
/// - at most one **dependent** cell, whose state is always derived from its local potential,
/// - **independent** cells, whose joint assignment is encoded by the charge index.
#[derive(Debug, Clone)]
pub struct ChargeDistributionSurface {
    /// Cell sites in row-major order; indices into every per-cell vector.
    cells: Arc<[SiqadCoord]>,
    params: SimulationParameters,
    /// Unit pair potentials (V); zero on the diagonal.
    pair_potentials: Arc<DMatrix<f64>>,
    /// Potential (V) from defects and applied external fields on each cell.
    external_potentials: Arc<[f64]>,
    charges: Vec<ChargeState>,
    /// Total local potential (V) on each cell, external contribution included.
    local_potentials: Vec<f64>,
    system_energy: f64,
    base: u8,
    dependent_cell: Option<usize>,
    fixed_negative: Vec<bool>,
    independent_cells: Vec<usize>,
}

impl ChargeDistributionSurface {
    /// Creates a surface for `layout` with every cell negatively charged.
    pub fn new(layout: &SidbLayout, params: SimulationParameters) -> Self {
        let cells: Arc<[SiqadCoord]> = layout.coords().into();
        let n = cells.len();
        let lattice = layout.lattice();

        let pair_potentials = DMatrix::from_fn(n, n, |i, j| {
            if i == j {
                0.0
            } else {
                screened_coulomb_potential(
                    lattice.distance_nm(cells[i], cells[j]),
                    params.epsilon_r,
                    params.lambda_tf,
                )
            }
        });

        let external_potentials: Arc<[f64]> = cells
            .iter()
            .map(|&cell| {
                let defect_potential: f64 = layout
                    .defects()
                    .map(|(site, defect)| {
                        point_charge_potential(
                            defect.charge,
                            lattice.distance_nm(cell, site),
                            defect.epsilon_r,
                            defect.lambda_tf,
                        )
                    })
                    .sum();
                defect_potential
                    + layout.local_external_potential(cell)
                    + layout.global_external_potential()
            })
            .collect();

        let mut surface = Self {
            cells,
            params,
            pair_potentials: Arc::new(pair_potentials),
            external_potentials,
            charges: vec![ChargeState::Negative; n],
            local_potentials: vec![0.0; n],
            system_energy: 0.0,
            base: params.base,
            dependent_cell: None,
            fixed_negative: vec![false; n],
            independent_cells: (0..n).collect(),
        };
        surface.recompute_local_potentials();
        surface.recompute_system_energy();
        surface
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> &[SiqadCoord] {
        &self.cells
    }

    pub fn cell_index(&self, coord: SiqadCoord) -> Option<usize> {
        self.cells.binary_search(&coord).ok()
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn base(&self) -> u8 {
        self.base
    }

    pub fn set_base(&mut self, base: u8) {
        self.base = base;
    }

    pub fn charge_state(&self, index: usize) -> ChargeState {
        self.charges[index]
    }

    /// Returns the charge state of the cell at `coord`, or `None` if no cell sits there.
    pub fn charge_at(&self, coord: SiqadCoord) -> Option<ChargeState> {
        self.cell_index(coord).map(|i| self.charges[i])
    }

    pub fn charge_states(&self) -> &[ChargeState] {
        &self.charges
    }

    pub fn count_charge_state(&self, state: ChargeState) -> usize {
        self.charges.iter().filter(|&&s| s == state).count()
    }

    pub fn local_potential(&self, index: usize) -> f64 {
        self.local_potentials[index]
    }

    pub fn local_potential_at(&self, coord: SiqadCoord) -> Option<f64> {
        self.cell_index(coord).map(|i| self.local_potentials[i])
    }

    pub fn pair_potential(&self, i: usize, j: usize) -> f64 {
        self.pair_potentials[(i, j)]
    }

    pub fn external_potential(&self, index: usize) -> f64 {
        self.external_potentials[index]
    }

    /// Electrostatic energy (eV) of the current configuration.
    pub fn system_energy(&self) -> f64 {
        self.system_energy
    }

    /// Assigns a charge state and propagates the change to all local potentials and the energy.
    pub fn assign_charge_state(&mut self, index: usize, state: ChargeState) {
        let old = self.charges[index];
        if old == state {
            return;
        }
        let delta = state.as_f64() - old.as_f64();
        // The cell's own potential is unaffected by its charge.
        self.system_energy += delta * self.local_potentials[index];
        for (v, p) in self
            .local_potentials
            .iter_mut()
            .zip(self.pair_potentials.column(index).iter())
        {
            *v += p * delta;
        }
        self.charges[index] = state;
    }

    pub fn assign_all_charge_states(&mut self, state: ChargeState) {
        self.charges.fill(state);
        self.recompute_local_potentials();
        self.recompute_system_energy();
    }

    /// Recomputes every local potential from the charges and external potentials.
    pub fn recompute_local_potentials(&mut self) {
        let n = self.num_cells();
        let q = DVector::from_iterator(n, self.charges.iter().map(|s| s.as_f64()));
        let induced = &*self.pair_potentials * q;
        for (i, v) in self.local_potentials.iter_mut().enumerate() {
            *v = induced[i] + self.external_potentials[i];
        }
    }

    /// Recomputes the system energy from the current local potentials.
    pub fn recompute_system_energy(&mut self) {
        self.system_energy = self
            .charges
            .iter()
            .zip(&self.local_potentials)
            .zip(self.external_potentials.iter())
            .map(|((q, v), ext)| 0.5 * q.as_f64() * (v + ext))
            .sum();
    }

    /// Local potential cell `index` would see with every other cell negative.
    fn potential_with_other_cells_negative(&self, index: usize) -> f64 {
        self.external_potentials[index] - self.pair_potentials.row(index).sum()
    }

    /// Whether cell `index` must be negative in every population-stable configuration.
    pub fn must_be_negative(&self, index: usize) -> bool {
        -self.potential_with_other_cells_negative(index) + self.params.mu_minus
            < -POP_STABILITY_ERR
    }

    /// Whether cell `index` can be positive in some population-stable configuration.
    pub fn can_be_positive(&self, index: usize) -> bool {
        -self.potential_with_other_cells_negative(index) + self.params.mu_plus()
            > -POP_STABILITY_ERR
    }

    /// Fixes every cell that is negative in all valid configurations and returns their count.
    pub fn detect_pre_assigned_negative_cells(&mut self) -> usize {
        for i in 0..self.num_cells() {
            if self.must_be_negative(i) {
                self.fixed_negative[i] = true;
                self.assign_charge_state(i, ChargeState::Negative);
            }
        }
        if self.dependent_cell.is_some_and(|d| self.fixed_negative[d]) {
            self.dependent_cell = None;
        }
        self.refresh_independent_cells();
        self.fixed_negative.iter().filter(|&&f| f).count()
    }

    pub fn is_fixed_negative(&self, index: usize) -> bool {
        self.fixed_negative[index]
    }

    /// Cells neither fixed nor dependent, in enumeration order.
    pub fn independent_cells(&self) -> &[usize] {
        &self.independent_cells
    }

    /// Cells not proven negative, i.e. the ones that take part in enumeration.
    pub fn free_cells(&self) -> Vec<usize> {
        (0..self.num_cells())
            .filter(|&i| !self.fixed_negative[i])
            .collect()
    }

    pub fn dependent_cell(&self) -> Option<usize> {
        self.dependent_cell
    }

    /// Designates the dependent cell. Fixed cells cannot be dependent.
    pub fn set_dependent_cell(&mut self, index: Option<usize>) {
        self.dependent_cell = index.filter(|&i| !self.fixed_negative[i]);
        self.refresh_independent_cells();
    }

    /// Re-derives the dependent cell's state from its current local potential.
    pub fn update_dependent_cell(&mut self) {
        if let Some(d) = self.dependent_cell {
            let state = derive_dependent_charge(self.local_potentials[d], &self.params, self.base);
            self.assign_charge_state(d, state);
        }
    }

    fn refresh_independent_cells(&mut self) {
        self.independent_cells = (0..self.num_cells())
            .filter(|&i| !self.fixed_negative[i] && Some(i) != self.dependent_cell)
            .collect();
    }

    /// Encodes the independent cells' states in the active base, first cell most significant.
    pub fn charge_index(&self) -> u64 {
        let base = u64::from(self.base);
        self.independent_cells
            .iter()
            .fold(0u64, |acc, &i| acc * base + self.charges[i].digit())
    }

    /// Largest charge index for the current base and independent cell count.
    pub fn max_charge_index(&self) -> u64 {
        u64::from(self.base)
            .checked_pow(self.independent_cells.len() as u32)
            .map_or(u64::MAX, |count| count - 1)
    }

    /// Assigns the independent cells from `index` and re-derives the dependent cell.
    pub fn assign_charge_index(&mut self, index: u64) {
        let base = u64::from(self.base);
        let mut remaining = index;
        for pos in (0..self.independent_cells.len()).rev() {
            let cell = self.independent_cells[pos];
            if let Some(state) = ChargeState::from_digit(remaining % base) {
                self.assign_charge_state(cell, state);
            }
            remaining /= base;
        }
        self.update_dependent_cell();
    }

    pub fn is_population_stable(&self) -> bool {
        self.charges
            .iter()
            .zip(&self.local_potentials)
            .all(|(&state, &v)| is_population_stable(state, v, &self.params))
    }

    /// Whether no single electron hop between two cells lowers the system energy.
    pub fn is_configuration_stable(&self) -> bool {
        let n = self.num_cells();
        for i in 0..n {
            let qi = self.charges[i].sign();
            if qi == 1 {
                continue;
            }
            for j in 0..n {
                if self.charges[j].sign() <= qi {
                    continue;
                }
                let hop_energy = self.local_potentials[i]
                    - self.local_potentials[j]
                    - self.pair_potentials[(i, j)];
                if hop_energy < -POP_STABILITY_ERR {
                    return false;
                }
            }
        }
        true
    }

    pub fn is_physically_valid(&self) -> bool {
        self.is_population_stable() && self.is_configuration_stable()
    }
}
