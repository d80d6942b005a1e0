//! # dbsim Core Library
//!
//! Exact ground-state simulation of silicon dangling bond (SiDB) charge configurations and
//! operational-domain analysis of SiDB logic gates built on top of it.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`SidbLayout`, coordinates, truth
//!   tables, BDL pairs) and the pure physics of the surface (`SimulationParameters`,
//!   screened Coulomb potentials).
//!
//! - **[`engine`]: The Logic Core.** The stateful simulation machinery. It holds the
//!   `ChargeDistributionSurface` with its incremental potential bookkeeping, the Gray-code
//!   stepper, the exact `quickexact` enumerator and the brute-force `exhaustive` engine.
//!
//! - **[`workflows`]: The Public API.** Complete procedures that use the engine as an oracle:
//!   operational-status checks, the four operational-domain explorers, the defect-influence
//!   search, population-stability assessment and occupation probabilities.

pub mod core;
pub mod engine;
pub mod workflows;
