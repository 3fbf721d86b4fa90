// @zen-component: VQ-StoreContract
//
//! Remote variant store contract.
//!
//! The store's storage engine and distributed execution are opaque; this
//! module only describes the logical request/response shapes and the
//! [`VariantStore`] seam the dispatcher calls through. [`http`] provides the
//! production implementation.

pub mod config;
pub mod http;
pub mod models;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use thiserror::Error;

pub use config::StoreConfig;
pub use http::{HttpVariantStore, StoreChannel};
pub use models::{
    Cohort, DatasetInfo, KinshipRequest, RegionRequest, Relatedness, TrioRoles, VariantRecord,
};

/// A stream of allele batches, drained by the result aggregator.
pub type AlleleStream = BoxStream<'static, Result<Vec<VariantRecord>, StoreError>>;

/// Errors raised while talking to the remote store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Store response parse error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid store URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Store error: {0}")]
    Other(String),
}

/// Remote operations exposed by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    DatasetInfo,
    CountVariantsInRegion,
    CountVariantsInRegionInSamples,
    SelectVariantsInRegion,
    SelectVariantsInRegionInSamples,
    CountSamplesInRegion,
    SelectSamplesInRegion,
    SelectDeNovo,
    SelectHetDominant,
    SelectHomRecessive,
    KinshipDuo,
}

impl Endpoint {
    /// Path segment of the operation, relative to the store base URL.
    pub fn path(self) -> &'static str {
        match self {
            Self::DatasetInfo => "datasetInfo",
            Self::CountVariantsInRegion => "countVariantsInRegion",
            Self::CountVariantsInRegionInSamples => "countVariantsInRegionInSamples",
            Self::SelectVariantsInRegion => "selectVariantsInRegion",
            Self::SelectVariantsInRegionInSamples => "selectVariantsInRegionInSamples",
            Self::CountSamplesInRegion => "countSamplesInRegion",
            Self::SelectSamplesInRegion => "selectSamplesInRegion",
            Self::SelectDeNovo => "selectDeNovo",
            Self::SelectHetDominant => "selectHetDominant",
            Self::SelectHomRecessive => "selectHomRecessive",
            Self::KinshipDuo => "kinshipDuo",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// The remote store as seen by the dispatcher.
///
/// One method per response shape. Implementations must be safe to share
/// across concurrent calls; the dispatcher holds no locks around them.
#[async_trait]
pub trait VariantStore: Send + Sync {
    /// Dataset totals, optionally with per-cohort sample names.
    async fn dataset_info(&self, with_sample_names: bool) -> Result<DatasetInfo, StoreError>;

    /// A single count (variants or samples, depending on `endpoint`).
    async fn count(&self, endpoint: Endpoint, request: &RegionRequest)
    -> Result<u64, StoreError>;

    /// A stream of allele batches for a select endpoint.
    async fn select_alleles(
        &self,
        endpoint: Endpoint,
        request: &RegionRequest,
    ) -> Result<AlleleStream, StoreError>;

    /// The full set of sample identifiers matching a region query.
    async fn select_samples(&self, request: &RegionRequest) -> Result<Vec<String>, StoreError>;

    /// Relatedness records for a sample pair.
    async fn kinship(&self, request: &KinshipRequest) -> Result<Vec<Relatedness>, StoreError>;
}
