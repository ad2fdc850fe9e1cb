//! Land-surface mercury emissions
//!
//! The calculations live in the `hgland-core` and `hgland-components`
//! crates. This crate builds the `hgland._lib` Python extension on top of
//! them.

pub mod python;
