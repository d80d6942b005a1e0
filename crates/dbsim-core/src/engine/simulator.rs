use super::config::{BaseNumberDetection, QuickExactParams};
use super::error::EngineError;
use super::result::SimulationResult;
use super::{exhaustive, quickexact};
use crate::core::models::layout::SidbLayout;
use crate::core::physics::params::SimulationParameters;
use serde::{Deserialize, Serialize};

/// Exact simulator used wherever a workflow needs the valid charge distributions of a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SimulationEngine {
    #[default]
    QuickExact,
    /// Brute-force enumeration of every assignment; only viable for small layouts.
    Exhaustive,
}

impl SimulationEngine {
    /// Simulates `layout` in exactly the base given by `params`.
    pub fn simulate(
        &self,
        layout: &SidbLayout,
        params: &SimulationParameters,
    ) -> Result<SimulationResult, EngineError> {
        match self {
            SimulationEngine::QuickExact => quickexact::run(
                layout,
                &QuickExactParams::new(*params, BaseNumberDetection::Off),
            ),
            SimulationEngine::Exhaustive => exhaustive::run(layout, params),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SimulationEngine::QuickExact => quickexact::ALGORITHM_NAME,
            SimulationEngine::Exhaustive => exhaustive::ALGORITHM_NAME,
        }
    }
}
