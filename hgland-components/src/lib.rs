//! Land mercury emission processes
//!
//! This crate computes the Hg0 flux from land surfaces for a chemistry
//! transport model timestep.
//!
//! # Module Organisation
//!
//! - `emissions`: the flux calculators (biomass burning, vegetation, soil,
//!   snowpack, prompt recycling)
//! - `parameters`: one parameter struct per process, with defaults
//! - `transpiration`: the monthly transpiration climatology
//! - `deposition`, `reservoir`: deposited and stored mercury
//! - `gtmm`: the bridge to the external land model
//! - `config`, `driver`: TOML configuration and the per-timestep driver

pub mod config;
pub mod deposition;
pub mod driver;
pub mod emissions;
pub mod gtmm;
pub mod parameters;
pub mod reservoir;
pub mod transpiration;
