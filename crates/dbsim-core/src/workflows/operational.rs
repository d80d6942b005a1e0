use crate::core::bdl::{BdlInputIterator, BdlPair, detect_bdl_pairs};
use crate::core::models::cell::{CellRole, ChargeState};
use crate::core::models::layout::SidbLayout;
use crate::core::models::truth_table::TruthTable;
use crate::engine::config::OperationalParams;
use crate::engine::error::EngineError;
use crate::engine::surface::can_positive_charges_occur;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, instrument, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationalStatus {
    Operational,
    NonOperational,
}

impl fmt::Display for OperationalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OperationalStatus::Operational => "operational",
            OperationalStatus::NonOperational => "non-operational",
        })
    }
}

/// Why a gate failed for a given input combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    PositiveCharges,
    NoValidDistribution,
    DegenerateGroundState,
    UndefinedOutput { output: usize },
    WrongOutput { output: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationalAssessment {
    pub status: OperationalStatus,
    /// Number of simulator runs performed before the verdict was reached.
    pub simulator_invocations: usize,
    /// The first failing input combination, if any.
    pub failure: Option<(u64, FailureReason)>,
}

/// Logic value an output pair must carry for an expected bit.
fn expected_output_states(bit: bool) -> (ChargeState, ChargeState) {
    if bit {
        (ChargeState::Neutral, ChargeState::Negative)
    } else {
        (ChargeState::Negative, ChargeState::Neutral)
    }
}

/// Checks whether `layout` implements `truth_tables` under the given physical parameters.
///
/// Every input combination is simulated; the gate is non-operational as soon as one
/// combination admits positive charges, has no valid or an ambiguous ground state, or
/// leaves an output pair in a state that does not match the expected bit.
#[instrument(skip_all, name = "is_operational")]
pub fn is_operational(
    layout: &SidbLayout,
    truth_tables: &[TruthTable],
    params: &OperationalParams,
) -> Result<OperationalAssessment, EngineError> {
    params.simulation.validate()?;

    let inputs = BdlInputIterator::new(layout, &params.bdl_pairs);
    let output_pairs = detect_bdl_pairs(layout, CellRole::Output, &params.bdl_pairs);
    check_arity(truth_tables, inputs.num_input_pairs(), output_pairs.len())?;

    let mut simulator_invocations = 0;
    for (input_index, input_layout) in inputs {
        if let Some(reason) = evaluate_input(
            &input_layout,
            input_index,
            truth_tables,
            &output_pairs,
            params,
            &mut simulator_invocations,
        )? {
            trace!(input_index, ?reason, "Gate fails.");
            return Ok(OperationalAssessment {
                status: OperationalStatus::NonOperational,
                simulator_invocations,
                failure: Some((input_index, reason)),
            });
        }
    }

    debug!(simulator_invocations, "Gate is operational.");
    Ok(OperationalAssessment {
        status: OperationalStatus::Operational,
        simulator_invocations,
        failure: None,
    })
}

fn check_arity(
    truth_tables: &[TruthTable],
    input_pairs: usize,
    output_pairs: usize,
) -> Result<(), EngineError> {
    if truth_tables.len() != output_pairs || output_pairs == 0 {
        return Err(EngineError::OutputArityMismatch {
            truth_tables: truth_tables.len(),
            output_pairs,
        });
    }
    if let Some(tt) = truth_tables.iter().find(|tt| tt.num_vars() != input_pairs) {
        return Err(EngineError::InputArityMismatch {
            truth_table_inputs: tt.num_vars(),
            input_pairs,
        });
    }
    Ok(())
}

fn evaluate_input(
    layout: &SidbLayout,
    input_index: u64,
    truth_tables: &[TruthTable],
    output_pairs: &[BdlPair],
    params: &OperationalParams,
    simulator_invocations: &mut usize,
) -> Result<Option<FailureReason>, EngineError> {
    if can_positive_charges_occur(layout, &params.simulation) {
        return Ok(Some(FailureReason::PositiveCharges));
    }

    let result = params.engine.simulate(layout, &params.simulation)?;
    *simulator_invocations += 1;

    let Some(ground_state) = result.ground_state() else {
        return Ok(Some(FailureReason::NoValidDistribution));
    };
    if result.is_ground_state_degenerate() {
        return Ok(Some(FailureReason::DegenerateGroundState));
    }

    for (output, (pair, tt)) in output_pairs.iter().zip(truth_tables).enumerate() {
        let upper = ground_state.charge_at(pair.upper);
        let lower = ground_state.charge_at(pair.lower);
        if upper == lower {
            return Ok(Some(FailureReason::UndefinedOutput { output }));
        }
        let expected_bit = tt.bit(input_index as usize).unwrap_or(false);
        let (expected_upper, expected_lower) = expected_output_states(expected_bit);
        if upper != Some(expected_upper) || lower != Some(expected_lower) {
            return Ok(Some(FailureReason::WrongOutput { output }));
        }
    }
    Ok(None)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::models::coords::{Lattice, SiqadCoord};
    use crate::core::physics::params::SimulationParameters;
    use crate::engine::simulator::SimulationEngine;

    fn c(x: i64, y: i64, z: u8) -> SiqadCoord {
        SiqadCoord::new(x, y, z)
    }

    /// Straight chain of BDL pairs carrying one input to one output.
    pub(crate) fn bdl_wire() -> SidbLayout {
        SidbLayout::from_cells(
            Lattice::Si100,
            [
                (c(0, 0, 0), CellRole::Input),
                (c(3, 0, 0), CellRole::Input),
                (c(6, 0, 0), CellRole::Normal),
                (c(8, 0, 0), CellRole::Normal),
                (c(12, 0, 0), CellRole::Normal),
                (c(14, 0, 0), CellRole::Normal),
                (c(18, 0, 0), CellRole::Output),
                (c(20, 0, 0), CellRole::Output),
                (c(24, 0, 0), CellRole::Normal),
            ],
        )
    }

    pub(crate) fn wire_params() -> OperationalParams {
        OperationalParams {
            simulation: SimulationParameters::default().with_base(2),
            ..OperationalParams::default()
        }
    }

    #[test]
    fn bdl_wire_implements_identity() {
        let assessment =
            is_operational(&bdl_wire(), &[TruthTable::identity()], &wire_params()).unwrap();
        assert_eq!(assessment.status, OperationalStatus::Operational);
        assert_eq!(assessment.simulator_invocations, 2);
        assert_eq!(assessment.failure, None);
    }

    #[test]
    fn bdl_wire_does_not_implement_inverter() {
        let assessment = is_operational(&bdl_wire(), &[TruthTable::not()], &wire_params()).unwrap();
        assert_eq!(assessment.status, OperationalStatus::NonOperational);
        assert_eq!(
            assessment.failure,
            Some((0, FailureReason::WrongOutput { output: 0 }))
        );
        assert_eq!(assessment.simulator_invocations, 1);
    }

    #[test]
    fn exhaustive_engine_agrees_on_bdl_wire() {
        let params = OperationalParams {
            engine: SimulationEngine::Exhaustive,
            ..wire_params()
        };
        let assessment = is_operational(&bdl_wire(), &[TruthTable::identity()], &params).unwrap();
        assert_eq!(assessment.status, OperationalStatus::Operational);
    }

    #[test]
    fn strong_coupling_admits_positive_charges() {
        let params = OperationalParams {
            simulation: SimulationParameters::default()
                .with_base(2)
                .with_epsilon_r(1.0)
                .with_lambda_tf(3.0),
            ..OperationalParams::default()
        };
        let assessment = is_operational(&bdl_wire(), &[TruthTable::identity()], &params).unwrap();
        assert_eq!(assessment.status, OperationalStatus::NonOperational);
        assert_eq!(
            assessment.failure,
            Some((0, FailureReason::PositiveCharges))
        );
        assert_eq!(assessment.simulator_invocations, 0);
    }

    #[test]
    fn weak_screening_leaves_outputs_undefined() {
        let params = OperationalParams {
            simulation: SimulationParameters::default()
                .with_base(2)
                .with_epsilon_r(8.0)
                .with_lambda_tf(1.0),
            ..OperationalParams::default()
        };
        let assessment = is_operational(&bdl_wire(), &[TruthTable::identity()], &params).unwrap();
        assert_eq!(assessment.status, OperationalStatus::NonOperational);
        assert!(matches!(
            assessment.failure,
            Some((_, FailureReason::UndefinedOutput { output: 0 }))
        ));
    }

    /// Two-input AND gate with a Y-shaped wiring into a single output pair.
    fn siqad_and_gate() -> SidbLayout {
        SidbLayout::from_cells(
            Lattice::Si100,
            [
                (c(0, 0, 1), CellRole::Input),
                (c(2, 1, 1), CellRole::Input),
                (c(20, 0, 1), CellRole::Input),
                (c(18, 1, 1), CellRole::Input),
                (c(4, 2, 1), CellRole::Normal),
                (c(6, 3, 1), CellRole::Normal),
                (c(14, 3, 1), CellRole::Normal),
                (c(16, 2, 1), CellRole::Normal),
                (c(10, 6, 0), CellRole::Output),
                (c(10, 7, 0), CellRole::Output),
                (c(10, 9, 1), CellRole::Normal),
            ],
        )
    }

    fn and_gate_params() -> OperationalParams {
        OperationalParams {
            simulation: SimulationParameters::default()
                .with_base(2)
                .with_mu_minus(-0.28),
            ..OperationalParams::default()
        }
    }

    #[test]
    fn siqad_and_gate_implements_and() {
        let assessment =
            is_operational(&siqad_and_gate(), &[TruthTable::and()], &and_gate_params()).unwrap();
        assert_eq!(assessment.status, OperationalStatus::Operational);
        assert_eq!(assessment.simulator_invocations, 4);
        assert_eq!(assessment.failure, None);
    }

    #[test]
    fn siqad_and_gate_does_not_implement_or() {
        let assessment =
            is_operational(&siqad_and_gate(), &[TruthTable::or()], &and_gate_params()).unwrap();
        assert_eq!(assessment.status, OperationalStatus::NonOperational);
        assert_eq!(
            assessment.failure,
            Some((1, FailureReason::WrongOutput { output: 0 }))
        );
        assert_eq!(assessment.simulator_invocations, 2);
    }

    #[test]
    fn mismatched_truth_tables_are_rejected() {
        let err = is_operational(&bdl_wire(), &[TruthTable::and()], &wire_params()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InputArityMismatch {
                truth_table_inputs: 2,
                input_pairs: 1
            }
        ));

        let err = is_operational(&bdl_wire(), &[], &wire_params()).unwrap_err();
        assert!(matches!(err, EngineError::OutputArityMismatch { .. }));
    }
}
