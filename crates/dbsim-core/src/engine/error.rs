use super::config::ConfigError;
use crate::core::physics::params::ParameterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid simulation parameters: {source}")]
    Parameters {
        #[from]
        source: ParameterError,
    },

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error(
        "Truth table expects {truth_table_inputs} input(s) but the layout has {input_pairs} input BDL pair(s)"
    )]
    InputArityMismatch {
        truth_table_inputs: usize,
        input_pairs: usize,
    },

    #[error("{truth_tables} truth table(s) given for {output_pairs} output BDL pair(s)")]
    OutputArityMismatch {
        truth_tables: usize,
        output_pairs: usize,
    },

    #[error("Invalid layout area: {reason}")]
    InvalidArea { reason: String },

    #[error("Random layout generation gave up after {attempts} attempts")]
    GenerationExhausted { attempts: usize },
}
