//! # Workflows Module
//!
//! High-level procedures that use the exact simulators as an oracle.
//!
//! ## Overview
//!
//! Each workflow validates its parameters, runs one or many simulations and condenses the
//! resulting charge distributions into an answer about the layout: whether a gate works,
//! where in parameter space it works, how far a defect may sit and still disturb it, or how
//! close its charge states are to a transition.
//!
//! ## Architecture
//!
//! - **Operational Status** ([`operational`]) - gate correctness over all input combinations
//! - **Operational Domains** ([`domain`]) - grid search, random sampling, flood fill and
//!   contour tracing over two physical parameters
//! - **Defect Influence** ([`defect_influence`]) - farthest defect position that still
//!   changes the ground state
//! - **Population Stability** ([`population_stability`]) - critical cell and transition of
//!   every valid charge distribution
//! - **Excited States** ([`energy_state`], [`occupation`]) - transparent/erroneous tagging
//!   and Boltzmann occupation of erroneous or excited states
//! - **Random Layouts** ([`random_layout`]) - random SiDB placement inside an area
//!
//! Independent simulations (grid points, sampled points, defect positions) run in parallel
//! when the `parallel` feature is enabled.

pub mod defect_influence;
pub mod domain;
pub mod energy_state;
pub mod occupation;
pub mod operational;
pub mod population_stability;
pub mod random_layout;
