use super::simulator::SimulationEngine;
use crate::core::bdl::BdlPairParams;
use crate::core::models::coords::SiqadCoord;
use crate::core::models::defect::Defect;
use crate::core::physics::params::SimulationParameters;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const GRID_ALIGNMENT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid {parameter} sweep: {reason}")]
    InvalidAxis {
        parameter: SweepParameter,
        reason: String,
    },
    #[error("Both sweep axes vary {0}")]
    IdenticalSweepAxes(SweepParameter),
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

/// Whether QuickExact may switch to the 3-state domain when positive charges are reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BaseNumberDetection {
    /// Pick base 3 exactly when some cell can become positive, base 2 otherwise.
    #[default]
    On,
    /// Always use the base given in the simulation parameters.
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct QuickExactParams {
    pub simulation: SimulationParameters,
    pub base_number_detection: BaseNumberDetection,
}

impl QuickExactParams {
    pub fn new(simulation: SimulationParameters, base_number_detection: BaseNumberDetection) -> Self {
        Self {
            simulation,
            base_number_detection,
        }
    }
}

/// Physical quantity varied along one axis of an operational domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SweepParameter {
    EpsilonR,
    LambdaTf,
    MuMinus,
}

impl SweepParameter {
    pub fn apply(self, params: SimulationParameters, value: f64) -> SimulationParameters {
        match self {
            SweepParameter::EpsilonR => params.with_epsilon_r(value),
            SweepParameter::LambdaTf => params.with_lambda_tf(value),
            SweepParameter::MuMinus => params.with_mu_minus(value),
        }
    }
}

impl fmt::Display for SweepParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SweepParameter::EpsilonR => "epsilon_r",
            SweepParameter::LambdaTf => "lambda_tf",
            SweepParameter::MuMinus => "mu_minus",
        })
    }
}

/// One axis of the parameter grid: `min, min + step, ...` while the value stays within `max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SweepAxis {
    pub parameter: SweepParameter,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl SweepAxis {
    pub fn new(parameter: SweepParameter, min: f64, max: f64, step: f64) -> Self {
        Self {
            parameter,
            min,
            max,
            step,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidAxis {
            parameter: self.parameter,
            reason: reason.to_string(),
        };
        if !(self.min.is_finite() && self.max.is_finite() && self.step.is_finite()) {
            return Err(invalid("bounds and step must be finite"));
        }
        if !(self.step > 0.0) {
            return Err(invalid("step must be positive"));
        }
        if self.min > self.max {
            return Err(invalid("minimum exceeds maximum"));
        }
        Ok(())
    }

    /// Number of steps between `min` and `max`.
    ///
    /// The grid contains `max` only when it lands on a step, up to a tolerance of
    /// `1e-6` steps; otherwise the last grid point is the largest step below `max`.
    /// The last grid point never exceeds `max`.
    pub fn num_steps(&self) -> usize {
        let ratio = (self.max - self.min) / self.step;
        let nearest = ratio.round();
        let steps = if (ratio - nearest).abs() < GRID_ALIGNMENT_TOLERANCE {
            nearest
        } else {
            ratio.floor()
        };
        steps.max(0.0) as usize
    }

    pub fn num_points(&self) -> usize {
        self.num_steps() + 1
    }

    /// Parameter value at grid index `index`.
    #[inline]
    pub fn value_at(&self, index: usize) -> f64 {
        (self.min + index as f64 * self.step).min(self.max)
    }
}

/// Neighbors considered when flood fill expands from an operational point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Neighborhood {
    /// The four edge-adjacent grid points.
    VonNeumann,
    /// All eight surrounding grid points.
    #[default]
    Moore,
}

/// Options for a single operational-status check.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OperationalParams {
    pub simulation: SimulationParameters,
    pub engine: SimulationEngine,
    pub bdl_pairs: BdlPairParams,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperationalDomainParams {
    pub operational: OperationalParams,
    pub x_axis: SweepAxis,
    pub y_axis: SweepAxis,
}

impl OperationalDomainParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.x_axis.validate()?;
        self.y_axis.validate()?;
        if self.x_axis.parameter == self.y_axis.parameter {
            return Err(ConfigError::IdenticalSweepAxes(self.x_axis.parameter));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct OperationalDomainParamsBuilder {
    simulation: Option<SimulationParameters>,
    engine: Option<SimulationEngine>,
    bdl_pairs: Option<BdlPairParams>,
    x_axis: Option<SweepAxis>,
    y_axis: Option<SweepAxis>,
}

impl OperationalDomainParamsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn simulation(mut self, params: SimulationParameters) -> Self {
        self.simulation = Some(params);
        self
    }
    pub fn engine(mut self, engine: SimulationEngine) -> Self {
        self.engine = Some(engine);
        self
    }
    pub fn bdl_pairs(mut self, params: BdlPairParams) -> Self {
        self.bdl_pairs = Some(params);
        self
    }
    pub fn x_axis(mut self, axis: SweepAxis) -> Self {
        self.x_axis = Some(axis);
        self
    }
    pub fn y_axis(mut self, axis: SweepAxis) -> Self {
        self.y_axis = Some(axis);
        self
    }

    pub fn build(self) -> Result<OperationalDomainParams, ConfigError> {
        let x_axis = self.x_axis.ok_or(ConfigError::MissingParameter("x_axis"))?;
        let y_axis = self.y_axis.ok_or(ConfigError::MissingParameter("y_axis"))?;
        let params = OperationalDomainParams {
            operational: OperationalParams {
                simulation: self.simulation.unwrap_or_default(),
                engine: self.engine.unwrap_or_default(),
                bdl_pairs: self.bdl_pairs.unwrap_or_default(),
            },
            x_axis,
            y_axis,
        };
        params.validate()?;
        Ok(params)
    }
}

/// Padding around the layout's bounding box scanned for defect positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScanningArea {
    /// Extra dimer columns on each side.
    pub columns: i64,
    /// Extra dimer rows above and below.
    pub dimer_rows: i64,
}

impl Default for ScanningArea {
    fn default() -> Self {
        Self {
            columns: 50,
            dimer_rows: 6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefectInfluenceParams {
    pub simulation: SimulationParameters,
    pub defect: Defect,
    pub scanning_area: ScanningArea,
}

#[derive(Default)]
pub struct DefectInfluenceParamsBuilder {
    simulation: Option<SimulationParameters>,
    defect: Option<Defect>,
    scanning_area: Option<ScanningArea>,
}

impl DefectInfluenceParamsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn simulation(mut self, params: SimulationParameters) -> Self {
        self.simulation = Some(params);
        self
    }
    pub fn defect(mut self, defect: Defect) -> Self {
        self.defect = Some(defect);
        self
    }
    pub fn scanning_area(mut self, area: ScanningArea) -> Self {
        self.scanning_area = Some(area);
        self
    }

    pub fn build(self) -> Result<DefectInfluenceParams, ConfigError> {
        Ok(DefectInfluenceParams {
            simulation: self.simulation.unwrap_or_default(),
            defect: self.defect.ok_or(ConfigError::MissingParameter("defect"))?,
            scanning_area: self.scanning_area.unwrap_or_default(),
        })
    }
}

/// Options for assessing how close each charge distribution is to a charge transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationStabilityParams {
    pub simulation: SimulationParameters,
    /// Decimal places of the distance reported for each potential difference.
    pub precision_for_distance: u32,
}

impl Default for PopulationStabilityParams {
    fn default() -> Self {
        Self {
            simulation: SimulationParameters::default(),
            precision_for_distance: 2,
        }
    }
}

/// Whether generated layouts may admit positively charged SiDBs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PositiveCharges {
    #[default]
    Allowed,
    Forbidden,
}

/// Options for placing SiDBs at random inside a rectangular area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomLayoutParams {
    /// North-west corner of the area (inclusive).
    pub north_west: SiqadCoord,
    /// South-east corner of the area (inclusive).
    pub south_east: SiqadCoord,
    pub number_of_sidbs: usize,
    pub positive_charges: PositiveCharges,
    pub simulation: SimulationParameters,
    pub maximum_attempts: usize,
}

#[derive(Default)]
pub struct RandomLayoutParamsBuilder {
    north_west: Option<SiqadCoord>,
    south_east: Option<SiqadCoord>,
    number_of_sidbs: Option<usize>,
    positive_charges: Option<PositiveCharges>,
    simulation: Option<SimulationParameters>,
    maximum_attempts: Option<usize>,
}

impl RandomLayoutParamsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn area(mut self, north_west: SiqadCoord, south_east: SiqadCoord) -> Self {
        self.north_west = Some(north_west);
        self.south_east = Some(south_east);
        self
    }
    pub fn number_of_sidbs(mut self, number: usize) -> Self {
        self.number_of_sidbs = Some(number);
        self
    }
    pub fn positive_charges(mut self, positive_charges: PositiveCharges) -> Self {
        self.positive_charges = Some(positive_charges);
        self
    }
    pub fn simulation(mut self, params: SimulationParameters) -> Self {
        self.simulation = Some(params);
        self
    }
    pub fn maximum_attempts(mut self, attempts: usize) -> Self {
        self.maximum_attempts = Some(attempts);
        self
    }

    pub fn build(self) -> Result<RandomLayoutParams, ConfigError> {
        Ok(RandomLayoutParams {
            north_west: self.north_west.ok_or(ConfigError::MissingParameter("area"))?,
            south_east: self.south_east.ok_or(ConfigError::MissingParameter("area"))?,
            number_of_sidbs: self
                .number_of_sidbs
                .ok_or(ConfigError::MissingParameter("number_of_sidbs"))?,
            positive_charges: self.positive_charges.unwrap_or_default(),
            simulation: self.simulation.unwrap_or_default(),
            maximum_attempts: self.maximum_attempts.unwrap_or(10_000),
        })
    }
}
