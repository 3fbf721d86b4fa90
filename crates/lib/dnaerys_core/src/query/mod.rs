// @zen-component: VQ-Query
//
//! Query composition, dispatch and result assembly.
//!
//! # Public API
//!
//! - [`normalize`]: region, length and pagination normalization
//! - [`filter::build_filter`]: annotation tokens to a typed filter
//! - [`Dispatcher`]: one remote call per operation, always answers
//! - [`aggregate`]: batch draining and the empty-result sentinel
//!
//! Failures inside this module are ordinary [`QueryError`] values carried
//! with `?`. They are collapsed to neutral defaults only at the dispatcher
//! boundary, where [`Outcome`] keeps the reason for the audit side channel.

pub mod aggregate;
pub mod dispatch;
pub mod filter;
pub mod normalize;
pub mod vocabulary;

use thiserror::Error;
use tracing::{debug, error};

use crate::store::{Endpoint, StoreError};

pub use aggregate::{EMPTY_SENTINEL, SexFilter};
pub use dispatch::{DatasetSummary, Dispatcher, SampleNamesBySex};
pub use filter::{AnnotationFilter, AnnotationInput, build_filter};
pub use normalize::{
    Chromosome, PageInput, PaginationSpec, QueryPolicy, RefAssembly, RegionInput, RegionSpec,
    Zygosity,
};

/// Reasons a query was answered with its neutral default.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Invalid region: start {start}, end {end}")]
    InvalidRegion { start: i64, end: i64 },

    #[error("Unknown chromosome: {0:?}")]
    UnknownChromosome(String),

    #[error("Contradictory variant lengths: min {min} > max {max}")]
    ContradictoryLengths { min: u32, max: u32 },

    #[error("Missing sample identifier")]
    MissingSample,

    #[error("Missing trio role: {0}")]
    MissingRole(&'static str),

    #[error("Store call {endpoint} failed: {source}")]
    Store {
        endpoint: Endpoint,
        #[source]
        source: StoreError,
    },
}

impl QueryError {
    /// Attach the endpoint a store failure came from.
    pub fn store(endpoint: Endpoint) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Store { endpoint, source }
    }

    /// `true` for failures detected locally, before any remote call.
    pub fn is_input(&self) -> bool {
        !matches!(self, Self::Store { .. })
    }
}

/// Result of a dispatcher operation: the answer, or the neutral default
/// together with the reason it was substituted.
#[derive(Debug)]
pub enum Outcome<T> {
    Answered(T),
    Defaulted { value: T, reason: QueryError },
}

impl<T> Outcome<T> {
    /// Collapse a fallible result, logging the failure.
    ///
    /// Input-validity failures are logged at debug level, store failures
    /// at error level.
    pub fn settle(operation: &'static str, result: Result<T, QueryError>, default: T) -> Self {
        match result {
            Ok(value) => Self::Answered(value),
            Err(reason) => {
                match &reason {
                    QueryError::Store { endpoint, source } => {
                        error!(operation, %endpoint, error = %source, "store call failed, returning default");
                    }
                    other => {
                        debug!(operation, reason = %other, "query voided, returning default");
                    }
                }
                Self::Defaulted {
                    value: default,
                    reason,
                }
            }
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Answered(value) | Self::Defaulted { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Answered(value) | Self::Defaulted { value, .. } => value,
        }
    }

    pub fn reason(&self) -> Option<&QueryError> {
        match self {
            Self::Answered(_) => None,
            Self::Defaulted { reason, .. } => Some(reason),
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, Self::Answered(_))
    }

    /// Transform the carried value, keeping the reason.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Answered(value) => Outcome::Answered(f(value)),
            Self::Defaulted { value, reason } => Outcome::Defaulted {
                value: f(value),
                reason,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settle_keeps_answer() {
        let outcome = Outcome::settle("count", Ok(7_i64), 0);
        assert!(outcome.is_answered());
        assert_eq!(*outcome.value(), 7);
        assert!(outcome.reason().is_none());
    }

    #[test]
    fn settle_substitutes_default_and_keeps_reason() {
        let outcome = Outcome::settle("count", Err(QueryError::MissingSample), 0_i64);
        assert!(!outcome.is_answered());
        assert_eq!(outcome.into_value(), 0);
    }

    #[test]
    fn store_failures_are_not_input_failures() {
        let err = QueryError::store(Endpoint::KinshipDuo)(StoreError::Other("down".into()));
        assert!(!err.is_input());
        assert!(err.to_string().contains("kinshipDuo"));
        assert!(QueryError::MissingRole("proband").is_input());
    }

    #[test]
    fn map_preserves_reason() {
        let outcome: Outcome<Vec<u8>> = Outcome::Defaulted {
            value: vec![],
            reason: QueryError::UnknownChromosome("23".into()),
        };
        let mapped = outcome.map(|v| v.len());
        assert_eq!(*mapped.value(), 0);
        assert!(matches!(
            mapped.reason(),
            Some(QueryError::UnknownChromosome(c)) if c == "23"
        ));
    }
}
