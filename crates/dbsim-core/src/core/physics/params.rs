use super::{ELEMENTARY_CHARGE, EPSILON_0, MU_PLUS_OFFSET};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ParameterError {
    #[error("Base number must be 2 or 3, got {0}")]
    InvalidBase(u8),
    #[error("Relative permittivity must be positive, got {0}")]
    NonPositiveEpsilonR(f64),
    #[error("Thomas-Fermi screening length must be positive, got {0} nm")]
    NonPositiveLambdaTf(f64),
    #[error("Transition level mu_minus must be finite, got {0}")]
    NonFiniteMuMinus(f64),
}

#[derive(Debug, Error)]
pub enum ParamLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Invalid parameters in '{path}': {source}")]
    Invalid {
        path: String,
        source: ParameterError,
    },
}

/// Physical parameters of a single simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct SimulationParameters {
    /// Size of the charge-state domain: 2 (negative, neutral) or 3 (adds positive).
    pub base: u8,
    /// Relative permittivity of the surface.
    pub epsilon_r: f64,
    /// Thomas-Fermi screening length in nm.
    pub lambda_tf: f64,
    /// Energy of the (-/0) charge transition level in eV.
    pub mu_minus: f64,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            base: 3,
            epsilon_r: 5.6,
            lambda_tf: 5.0,
            mu_minus: -0.32,
        }
    }
}

impl SimulationParameters {
    pub fn new(base: u8, mu_minus: f64) -> Self {
        Self {
            base,
            mu_minus,
            ..Self::default()
        }
    }

    pub fn with_base(mut self, base: u8) -> Self {
        self.base = base;
        self
    }

    pub fn with_epsilon_r(mut self, epsilon_r: f64) -> Self {
        self.epsilon_r = epsilon_r;
        self
    }

    pub fn with_lambda_tf(mut self, lambda_tf: f64) -> Self {
        self.lambda_tf = lambda_tf;
        self
    }

    pub fn with_mu_minus(mut self, mu_minus: f64) -> Self {
        self.mu_minus = mu_minus;
        self
    }

    /// Energy of the (0/+) charge transition level in eV.
    #[inline]
    pub fn mu_plus(&self) -> f64 {
        self.mu_minus - MU_PLUS_OFFSET
    }

    /// Coulomb constant 1/(4*pi*eps0*eps_r) in N*m^2/C^2.
    #[inline]
    pub fn coulomb_constant(&self) -> f64 {
        coulomb_constant(self.epsilon_r)
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.base != 2 && self.base != 3 {
            return Err(ParameterError::InvalidBase(self.base));
        }
        if !(self.epsilon_r > 0.0) {
            return Err(ParameterError::NonPositiveEpsilonR(self.epsilon_r));
        }
        if !(self.lambda_tf > 0.0) {
            return Err(ParameterError::NonPositiveLambdaTf(self.lambda_tf));
        }
        if !self.mu_minus.is_finite() {
            return Err(ParameterError::NonFiniteMuMinus(self.mu_minus));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ParamLoadError> {
        let path_str = path.to_string_lossy().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| ParamLoadError::Io {
            path: path_str.clone(),
            source: e,
        })?;
        let params: Self = toml::from_str(&content).map_err(|e| ParamLoadError::Toml {
            path: path_str.clone(),
            source: e,
        })?;
        params.validate().map_err(|e| ParamLoadError::Invalid {
            path: path_str,
            source: e,
        })?;
        Ok(params)
    }
}

#[inline]
pub(crate) fn coulomb_constant(epsilon_r: f64) -> f64 {
    1.0 / (4.0 * PI * EPSILON_0 * epsilon_r)
}

/// Potential prefactor k*e in V*m, shared by every pair potential.
#[inline]
pub(crate) fn potential_prefactor(epsilon_r: f64) -> f64 {
    coulomb_constant(epsilon_r) * ELEMENTARY_CHARGE
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_match_si100_surface() {
        let params = SimulationParameters::default();
        assert_eq!(params.base, 3);
        assert_eq!(params.epsilon_r, 5.6);
        assert_eq!(params.lambda_tf, 5.0);
        assert_eq!(params.mu_minus, -0.32);
        assert!((params.mu_plus() - (-0.91)).abs() < 1e-12);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn validate_rejects_unphysical_values() {
        assert_eq!(
            SimulationParameters::default().with_base(4).validate(),
            Err(ParameterError::InvalidBase(4))
        );
        assert_eq!(
            SimulationParameters::default().with_epsilon_r(0.0).validate(),
            Err(ParameterError::NonPositiveEpsilonR(0.0))
        );
        assert_eq!(
            SimulationParameters::default().with_lambda_tf(-1.0).validate(),
            Err(ParameterError::NonPositiveLambdaTf(-1.0))
        );
        assert!(matches!(
            SimulationParameters::default()
                .with_epsilon_r(f64::NAN)
                .validate(),
            Err(ParameterError::NonPositiveEpsilonR(_))
        ));
    }

    #[test]
    fn load_reads_partial_toml_and_fills_defaults() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("params.toml");
        fs::write(&path, "base = 2\nmu-minus = -0.28\n").expect("Failed to write params");

        let params = SimulationParameters::load(&path).unwrap();
        assert_eq!(params.base, 2);
        assert_eq!(params.mu_minus, -0.28);
        assert_eq!(params.epsilon_r, 5.6);
    }

    #[test]
    fn load_reports_invalid_values_with_path() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("params.toml");
        fs::write(&path, "lambda-tf = 0.0\n").expect("Failed to write params");

        let err = SimulationParameters::load(&path).unwrap_err();
        assert!(matches!(
            err,
            ParamLoadError::Invalid {
                source: ParameterError::NonPositiveLambdaTf(_),
                ..
            }
        ));
    }

    #[test]
    fn load_reports_unknown_keys_as_toml_errors() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("params.toml");
        fs::write(&path, "temperature = 4.0\n").expect("Failed to write params");

        assert!(matches!(
            SimulationParameters::load(&path),
            Err(ParamLoadError::Toml { .. })
        ));
    }
}
