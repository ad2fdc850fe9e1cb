//! Core types for land-surface mercury emission calculations
//!
//! Provides the horizontal grid and surface classification, meteorological
//! inputs (with a configurable snow accessor), the simulation calendar and the
//! binary punch file codec shared by every emission process.

pub mod bpch;
pub mod clock;
pub mod grid;
pub mod met;

pub mod errors;
