//! Operational domains: the region of a two-dimensional physical-parameter grid in which
//! a gate layout works.
//!
//! All four explorers share the grid defined by the two [`SweepAxis`] values of an
//! [`OperationalDomainParams`] and query the operational oracle at grid points.
//!
//! - [`grid_search`] evaluates every grid point (in parallel).
//! - [`random_sampling`] evaluates a random subset of grid points (in parallel).
//! - [`flood_fill`] grows the operational region outward from random seeds.
//! - [`contour_tracing`] walks the boundary of the operational region.
//!
//! Flood fill and contour tracing depend on the order of their own evaluations and run
//! sequentially.

pub mod contour_tracing;
pub mod flood_fill;
pub mod grid_search;
pub mod random_sampling;

use crate::core::models::layout::SidbLayout;
use crate::core::models::truth_table::TruthTable;
use crate::engine::config::{OperationalDomainParams, SweepAxis, SweepParameter};
use crate::engine::error::EngineError;
use crate::engine::progress::TaskGuard;
use crate::workflows::operational::{OperationalAssessment, OperationalStatus, is_operational};
use rand::Rng;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Position on the parameter grid as `(x step, y step)`.
pub type GridIndex = (usize, usize);

/// Parameter values at one grid point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperationalDomain {
    pub x_axis: SweepAxis,
    pub y_axis: SweepAxis,
    values: BTreeMap<GridIndex, OperationalStatus>,
}

impl OperationalDomain {
    pub fn new(x_axis: SweepAxis, y_axis: SweepAxis) -> Self {
        Self {
            x_axis,
            y_axis,
            values: BTreeMap::new(),
        }
    }

    pub fn x_dimension(&self) -> SweepParameter {
        self.x_axis.parameter
    }

    pub fn y_dimension(&self) -> SweepParameter {
        self.y_axis.parameter
    }

    pub fn point(&self, index: GridIndex) -> ParameterPoint {
        ParameterPoint {
            x: self.x_axis.value_at(index.0),
            y: self.y_axis.value_at(index.1),
        }
    }

    pub fn status(&self, index: GridIndex) -> Option<OperationalStatus> {
        self.values.get(&index).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn count(&self, status: OperationalStatus) -> usize {
        self.values.values().filter(|&&s| s == status).count()
    }

    /// Iterates over all classified points in grid order.
    pub fn iter(&self) -> impl Iterator<Item = (GridIndex, ParameterPoint, OperationalStatus)> + '_ {
        self.values
            .iter()
            .map(|(&index, &status)| (index, self.point(index), status))
    }

    pub(crate) fn insert(&mut self, index: GridIndex, status: OperationalStatus) {
        self.values.insert(index, status);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationalDomainStats {
    pub time_total: Duration,
    pub num_simulator_invocations: usize,
    pub num_evaluated_parameter_combinations: usize,
    pub num_operational_parameter_combinations: usize,
    pub num_non_operational_parameter_combinations: usize,
}

/// Runs the operational oracle at grid points of one domain.
pub(crate) struct DomainEvaluator<'a> {
    layout: &'a SidbLayout,
    truth_tables: &'a [TruthTable],
    params: &'a OperationalDomainParams,
}

impl<'a> DomainEvaluator<'a> {
    pub(crate) fn new(
        layout: &'a SidbLayout,
        truth_tables: &'a [TruthTable],
        params: &'a OperationalDomainParams,
    ) -> Self {
        Self {
            layout,
            truth_tables,
            params,
        }
    }

    pub(crate) fn dimensions(&self) -> (usize, usize) {
        (self.params.x_axis.num_points(), self.params.y_axis.num_points())
    }

    pub(crate) fn total_points(&self) -> usize {
        let (nx, ny) = self.dimensions();
        nx * ny
    }

    pub(crate) fn contains(&self, x: isize, y: isize) -> bool {
        let (nx, ny) = self.dimensions();
        x >= 0 && y >= 0 && (x as usize) < nx && (y as usize) < ny
    }

    /// Maps a row-major flat index to its grid index.
    pub(crate) fn grid_index(&self, flat: usize) -> GridIndex {
        let (nx, _) = self.dimensions();
        (flat % nx, flat / nx)
    }

    pub(crate) fn empty_domain(&self) -> OperationalDomain {
        OperationalDomain::new(self.params.x_axis, self.params.y_axis)
    }

    /// Draws up to `amount` distinct grid indices in random order.
    pub(crate) fn sample_indices(&self, rng: &mut impl Rng, amount: usize) -> Vec<GridIndex> {
        let total = self.total_points();
        rand::seq::index::sample(rng, total, amount.min(total))
            .into_iter()
            .map(|flat| self.grid_index(flat))
            .collect()
    }

    pub(crate) fn evaluate(&self, index: GridIndex) -> Result<OperationalAssessment, EngineError> {
        let x_value = self.params.x_axis.value_at(index.0);
        let y_value = self.params.y_axis.value_at(index.1);
        let mut operational = self.params.operational;
        operational.simulation = self.params.x_axis.parameter.apply(
            self.params.y_axis.parameter.apply(operational.simulation, y_value),
            x_value,
        );
        is_operational(self.layout, self.truth_tables, &operational)
    }

    /// Evaluates `indices` independently of each other, in parallel when enabled.
    pub(crate) fn evaluate_all(
        &self,
        indices: &[GridIndex],
        task: &TaskGuard<'_, '_>,
    ) -> Result<Vec<(GridIndex, OperationalAssessment)>, EngineError> {
        #[cfg(not(feature = "parallel"))]
        let iterator = indices.iter();

        #[cfg(feature = "parallel")]
        let iterator = indices.par_iter();

        iterator
            .map(|&index| {
                let assessment = self.evaluate(index)?;
                task.tick();
                Ok((index, assessment))
            })
            .collect()
    }
}

/// Folds independently evaluated points into a domain and its statistics.
pub(crate) fn fold_evaluations(
    mut domain: OperationalDomain,
    evaluations: Vec<(GridIndex, OperationalAssessment)>,
    start: Instant,
) -> (OperationalDomain, OperationalDomainStats) {
    let mut invocations = 0;
    for (index, assessment) in evaluations {
        invocations += assessment.simulator_invocations;
        domain.insert(index, assessment.status);
    }
    let stats = summarize(&domain, invocations, start);
    (domain, stats)
}

pub(crate) fn summarize(
    domain: &OperationalDomain,
    num_simulator_invocations: usize,
    start: Instant,
) -> OperationalDomainStats {
    OperationalDomainStats {
        time_total: start.elapsed(),
        num_simulator_invocations,
        num_evaluated_parameter_combinations: domain.len(),
        num_operational_parameter_combinations: domain.count(OperationalStatus::Operational),
        num_non_operational_parameter_combinations: domain
            .count(OperationalStatus::NonOperational),
    }
}

/// Memoizing point-by-point evaluation for the sequential explorers.
pub(crate) struct SequentialExplorer<'a> {
    evaluator: DomainEvaluator<'a>,
    domain: OperationalDomain,
    num_simulator_invocations: usize,
}

impl<'a> SequentialExplorer<'a> {
    pub(crate) fn new(evaluator: DomainEvaluator<'a>) -> Self {
        let domain = evaluator.empty_domain();
        Self {
            evaluator,
            domain,
            num_simulator_invocations: 0,
        }
    }

    pub(crate) fn evaluator(&self) -> &DomainEvaluator<'a> {
        &self.evaluator
    }

    pub(crate) fn is_evaluated(&self, index: GridIndex) -> bool {
        self.domain.status(index).is_some()
    }

    /// Returns the status at `index`, running the oracle only on first access.
    pub(crate) fn status(
        &mut self,
        index: GridIndex,
        task: &TaskGuard<'_, '_>,
    ) -> Result<OperationalStatus, EngineError> {
        if let Some(status) = self.domain.status(index) {
            return Ok(status);
        }
        let assessment = self.evaluator.evaluate(index)?;
        task.tick();
        self.num_simulator_invocations += assessment.simulator_invocations;
        self.domain.insert(index, assessment.status);
        Ok(assessment.status)
    }

    /// Like [`Self::status`], but points off the grid count as non-operational unevaluated.
    pub(crate) fn is_operational_at(
        &mut self,
        x: isize,
        y: isize,
        task: &TaskGuard<'_, '_>,
    ) -> Result<bool, EngineError> {
        if !self.evaluator.contains(x, y) {
            return Ok(false);
        }
        Ok(self.status((x as usize, y as usize), task)? == OperationalStatus::Operational)
    }

    pub(crate) fn finish(self, start: Instant) -> (OperationalDomain, OperationalDomainStats) {
        let stats = summarize(&self.domain, self.num_simulator_invocations, start);
        (self.domain, stats)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::SweepParameter;

    fn axes() -> (SweepAxis, SweepAxis) {
        (
            SweepAxis::new(SweepParameter::EpsilonR, 5.0, 6.0, 0.5),
            SweepAxis::new(SweepParameter::MuMinus, -0.4, -0.2, 0.1),
        )
    }

    #[test]
    fn domain_maps_indices_to_parameter_values() {
        let (x, y) = axes();
        let mut domain = OperationalDomain::new(x, y);
        domain.insert((2, 1), OperationalStatus::Operational);
        domain.insert((0, 0), OperationalStatus::NonOperational);

        assert_eq!(domain.len(), 2);
        assert_eq!(domain.x_dimension(), SweepParameter::EpsilonR);
        assert_eq!(domain.y_dimension(), SweepParameter::MuMinus);
        assert_eq!(domain.count(OperationalStatus::Operational), 1);

        let point = domain.point((2, 1));
        assert_eq!(point.x, 6.0);
        assert!((point.y - (-0.3)).abs() < 1e-12);
        assert_eq!(domain.status((1, 1)), None);
    }

    #[test]
    fn summarize_counts_statuses() {
        let (x, y) = axes();
        let mut domain = OperationalDomain::new(x, y);
        domain.insert((0, 0), OperationalStatus::Operational);
        domain.insert((1, 0), OperationalStatus::NonOperational);
        domain.insert((2, 0), OperationalStatus::Operational);

        let stats = summarize(&domain, 7, Instant::now());
        assert_eq!(stats.num_simulator_invocations, 7);
        assert_eq!(stats.num_evaluated_parameter_combinations, 3);
        assert_eq!(stats.num_operational_parameter_combinations, 2);
        assert_eq!(stats.num_non_operational_parameter_combinations, 1);
    }
}
