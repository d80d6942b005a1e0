//! Stateless layout models and surface physics.

pub mod bdl;
pub mod models;
pub mod physics;
