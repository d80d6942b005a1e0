//! # Engine Module
//!
//! The stateful simulation machinery: charge distribution surfaces with incremental
//! electrostatics, the Gray-code stepper that drives enumeration, and the two exact
//! simulators that produce [`result::SimulationResult`]s.
//!
//! - **Surface** ([`surface`]) - charge states, potentials, energy and validity checks
//! - **Simulators** ([`quickexact`], [`exhaustive`], [`simulator`]) - exact enumeration
//! - **Configuration** ([`config`]) - parameter structs and builders for every workflow
//! - **Progress Monitoring** ([`progress`]) - progress reporting to front ends
//! - **Error Handling** ([`error`]) - engine error types

pub mod config;
pub mod error;
pub mod exhaustive;
pub mod gray_code;
pub mod progress;
pub mod quickexact;
pub mod result;
pub mod simulator;
pub mod surface;
