use crate::cli::{DomainArgs, JobArgs, OperationalArgs, StabilityArgs, StrategyArg};
use crate::error::{CliError, Result};
use dbsim::core::bdl::BdlPairParams;
use dbsim::core::models::cell::CellRole;
use dbsim::core::models::coords::{Lattice, SiqadCoord};
use dbsim::core::models::defect::Defect;
use dbsim::core::models::layout::SidbLayout;
use dbsim::core::models::truth_table::TruthTable;
use dbsim::core::physics::params::SimulationParameters;
use dbsim::engine::config::{
    DefectInfluenceParams, DefectInfluenceParamsBuilder, Neighborhood,
    OperationalDomainParams, OperationalDomainParamsBuilder, OperationalParams,
    PopulationStabilityParams, ScanningArea, SweepAxis,
};
use dbsim::engine::error::EngineError;
use dbsim::engine::simulator::SimulationEngine;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
struct PartialCell {
    x: i64,
    y: i64,
    z: u8,
    #[serde(default)]
    role: CellRole,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialDefect {
    charge: Option<f64>,
    #[serde(rename = "epsilon-r")]
    epsilon_r: Option<f64>,
    #[serde(rename = "lambda-tf")]
    lambda_tf: Option<f64>,
}

impl From<PartialDefect> for Defect {
    fn from(p: PartialDefect) -> Self {
        let default = Defect::default();
        Defect::new(
            p.charge.unwrap_or(default.charge),
            p.epsilon_r.unwrap_or(default.epsilon_r),
            p.lambda_tf.unwrap_or(default.lambda_tf),
        )
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
struct PlacedDefect {
    x: i64,
    y: i64,
    z: u8,
    charge: Option<f64>,
    #[serde(rename = "epsilon-r")]
    epsilon_r: Option<f64>,
    #[serde(rename = "lambda-tf")]
    lambda_tf: Option<f64>,
}

impl PlacedDefect {
    fn defect(&self) -> Defect {
        PartialDefect {
            charge: self.charge,
            epsilon_r: self.epsilon_r,
            lambda_tf: self.lambda_tf,
        }
        .into()
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialLayoutConfig {
    lattice: Option<Lattice>,
    #[serde(default)]
    cells: Vec<PartialCell>,
    #[serde(default)]
    defects: Vec<PlacedDefect>,
    #[serde(rename = "global-external-potential")]
    global_external_potential: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialOperationalConfig {
    engine: Option<SimulationEngine>,
    #[serde(rename = "truth-tables")]
    truth_tables: Option<Vec<String>>,
    #[serde(rename = "bdl-minimum-distance")]
    bdl_minimum_distance: Option<f64>,
    #[serde(rename = "bdl-maximum-distance")]
    bdl_maximum_distance: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialDomainConfig {
    strategy: Option<StrategyArg>,
    samples: Option<usize>,
    seeds: Option<usize>,
    neighborhood: Option<Neighborhood>,
    #[serde(rename = "x-axis")]
    x_axis: Option<SweepAxis>,
    #[serde(rename = "y-axis")]
    y_axis: Option<SweepAxis>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialDefectInfluenceConfig {
    defect: Option<PartialDefect>,
    #[serde(rename = "scanning-area")]
    scanning_area: Option<ScanningArea>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialStabilityConfig {
    precision: Option<u32>,
}

/// A job file as written by the user; every section is optional until a command needs it.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialJobConfig {
    layout: Option<PartialLayoutConfig>,
    simulation: Option<SimulationParameters>,
    operational: Option<PartialOperationalConfig>,
    domain: Option<PartialDomainConfig>,
    #[serde(rename = "defect-influence")]
    defect_influence: Option<PartialDefectInfluenceConfig>,
    stability: Option<PartialStabilityConfig>,
}

/// How the operational domain of a job is explored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DomainStrategy {
    GridSearch,
    RandomSampling { samples: usize },
    FloodFill { seeds: usize, neighborhood: Neighborhood },
    ContourTracing { samples: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DomainJob {
    pub params: OperationalDomainParams,
    pub strategy: DomainStrategy,
}

fn required<T>(value: Option<T>, key: &str) -> Result<T> {
    value.ok_or_else(|| {
        CliError::Config(format!(
            "A value for '{}' is required either in the config file or via CLI argument.",
            key
        ))
    })
}

impl PartialJobConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading job file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Builds the layout described by the `[layout]` section.
    pub fn layout(&self) -> Result<SidbLayout> {
        let section = self
            .layout
            .as_ref()
            .ok_or_else(|| CliError::Config("The job file has no [layout] section.".to_string()))?;

        let mut layout = SidbLayout::from_cells(
            section.lattice.unwrap_or_default(),
            section
                .cells
                .iter()
                .map(|c| (SiqadCoord::new(c.x, c.y, c.z), c.role)),
        );
        for placed in &section.defects {
            layout.assign_defect(
                SiqadCoord::new(placed.x, placed.y, placed.z),
                placed.defect(),
            );
        }
        if let Some(potential) = section.global_external_potential {
            layout.set_global_external_potential(potential);
        }
        debug!(
            cells = layout.num_cells(),
            defects = section.defects.len(),
            "Layout assembled."
        );
        Ok(layout)
    }

    /// Physical parameters from `[simulation]`, with command-line overrides applied.
    pub fn simulation(&self, args: &JobArgs) -> Result<SimulationParameters> {
        let mut params = self.simulation.unwrap_or_default();
        if let Some(base) = args.base {
            params = params.with_base(base);
        }
        if let Some(epsilon_r) = args.epsilon_r {
            params = params.with_epsilon_r(epsilon_r);
        }
        if let Some(lambda_tf) = args.lambda_tf {
            params = params.with_lambda_tf(lambda_tf);
        }
        if let Some(mu_minus) = args.mu_minus {
            params = params.with_mu_minus(mu_minus);
        }
        params.validate().map_err(EngineError::from)?;
        Ok(params)
    }

    pub fn truth_tables(&self) -> Result<Vec<TruthTable>> {
        let strings = required(
            self.operational
                .as_ref()
                .and_then(|o| o.truth_tables.as_ref()),
            "operational.truth-tables",
        )?;
        strings
            .iter()
            .map(|s| {
                s.parse::<TruthTable>().map_err(|e| {
                    CliError::Config(format!("Invalid truth table '{}': {}", s, e))
                })
            })
            .collect()
    }

    pub fn operational_params(
        &self,
        args: &JobArgs,
        engine: Option<SimulationEngine>,
    ) -> Result<OperationalParams> {
        let section = self.operational.as_ref();
        let defaults = BdlPairParams::default();
        Ok(OperationalParams {
            simulation: self.simulation(args)?,
            engine: engine
                .or(section.and_then(|o| o.engine))
                .unwrap_or_default(),
            bdl_pairs: BdlPairParams {
                minimum_distance_nm: section
                    .and_then(|o| o.bdl_minimum_distance)
                    .unwrap_or(defaults.minimum_distance_nm),
                maximum_distance_nm: section
                    .and_then(|o| o.bdl_maximum_distance)
                    .unwrap_or(defaults.maximum_distance_nm),
            },
        })
    }

    pub fn merge_operational(&self, args: &OperationalArgs) -> Result<OperationalParams> {
        self.operational_params(&args.job, args.engine.map(Into::into))
    }

    pub fn merge_domain(&self, args: &DomainArgs) -> Result<DomainJob> {
        let section = self.domain.as_ref();
        let operational = self.operational_params(&args.job, None)?;

        let params = OperationalDomainParamsBuilder::new()
            .simulation(operational.simulation)
            .engine(operational.engine)
            .bdl_pairs(operational.bdl_pairs)
            .x_axis(required(section.and_then(|d| d.x_axis), "domain.x-axis")?)
            .y_axis(required(section.and_then(|d| d.y_axis), "domain.y-axis")?)
            .build()
            .map_err(EngineError::from)?;

        let samples = || required(args.samples.or(section.and_then(|d| d.samples)), "samples");
        let strategy = match args
            .strategy
            .or(section.and_then(|d| d.strategy))
            .unwrap_or(StrategyArg::GridSearch)
        {
            StrategyArg::GridSearch => DomainStrategy::GridSearch,
            StrategyArg::RandomSampling => DomainStrategy::RandomSampling { samples: samples()? },
            StrategyArg::ContourTracing => DomainStrategy::ContourTracing { samples: samples()? },
            StrategyArg::FloodFill => DomainStrategy::FloodFill {
                seeds: required(args.seeds.or(section.and_then(|d| d.seeds)), "seeds")?,
                neighborhood: args
                    .neighborhood
                    .map(Neighborhood::from)
                    .or(section.and_then(|d| d.neighborhood))
                    .unwrap_or_default(),
            },
        };

        Ok(DomainJob { params, strategy })
    }

    pub fn merge_defect_influence(&self, args: &JobArgs) -> Result<DefectInfluenceParams> {
        let section = self.defect_influence.as_ref();
        let mut builder = DefectInfluenceParamsBuilder::new()
            .simulation(self.simulation(args)?)
            .defect(
                section
                    .and_then(|d| d.defect.clone())
                    .map(Defect::from)
                    .unwrap_or_default(),
            );
        if let Some(area) = section.and_then(|d| d.scanning_area) {
            builder = builder.scanning_area(area);
        }
        let params = builder.build().map_err(EngineError::from)?;
        params.defect.validate().map_err(EngineError::from)?;
        Ok(params)
    }

    pub fn merge_stability(&self, args: &StabilityArgs) -> Result<PopulationStabilityParams> {
        let defaults = PopulationStabilityParams::default();
        Ok(PopulationStabilityParams {
            simulation: self.simulation(&args.job)?,
            precision_for_distance: args
                .precision
                .or(self.stability.as_ref().and_then(|s| s.precision))
                .unwrap_or(defaults.precision_for_distance),
        })
    }
}
