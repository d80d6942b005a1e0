use crate::core::physics::params::ParameterError;
use serde::{Deserialize, Serialize};

/// A fixed point charge on the surface with its own screening environment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Defect {
    /// Charge in units of the elementary charge.
    pub charge: f64,
    pub epsilon_r: f64,
    /// Thomas-Fermi screening length in nm.
    pub lambda_tf: f64,
}

impl Defect {
    pub fn new(charge: f64, epsilon_r: f64, lambda_tf: f64) -> Self {
        Self {
            charge,
            epsilon_r,
            lambda_tf,
        }
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        if !(self.epsilon_r > 0.0) {
            return Err(ParameterError::NonPositiveEpsilonR(self.epsilon_r));
        }
        if !(self.lambda_tf > 0.0) {
            return Err(ParameterError::NonPositiveLambdaTf(self.lambda_tf));
        }
        Ok(())
    }
}

impl Default for Defect {
    fn default() -> Self {
        Self::new(-1.0, 5.6, 5.0)
    }
}
