//! # dnaerys_core
//!
//! Query composition and dispatch for the Dnaerys variant store.
//!
//! Loosely-typed tool parameters are normalized into bounded region and
//! pagination specs, annotation tokens are compiled into a typed filter,
//! and the [`query::Dispatcher`] issues exactly one remote call per
//! operation against a [`store::VariantStore`]. Every dispatcher operation
//! is fail-soft: it always yields a value of its declared shape.

pub mod query;
pub mod store;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
