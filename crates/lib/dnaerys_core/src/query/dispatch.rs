// @zen-component: VQ-Dispatcher
//
//! Query dispatcher.
//!
//! Every operation normalizes its inputs, issues exactly one store call
//! and interprets the reply. Input-validity failures short-circuit before
//! the store is touched. Nothing here returns an error: failures become
//! [`Outcome::Defaulted`] with the operation's neutral value.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::aggregate::{self, EMPTY_SENTINEL, SexFilter, or_empty_sentinel, partition_by_sex};
use super::filter::{AnnotationInput, build_filter};
use super::normalize::{
    PageInput, PaginationSpec, QueryPolicy, RegionInput, Zygosity, normalize_region,
};
use super::{Outcome, QueryError};
use crate::store::models::{KinshipRequest, RegionRequest, TrioRoles, VariantRecord};
use crate::store::{Endpoint, VariantStore};

/// Dataset totals as reported to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSummary {
    pub variants_total: i64,
    pub samples_total: i64,
    pub females_total: i64,
    pub males_total: i64,
    pub nodes_total: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_names_by_sex: Option<SampleNamesBySex>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleNamesBySex {
    pub female: Vec<String>,
    pub male: Vec<String>,
}

/// How a region request is scoped. One descriptor covers every region
/// query shape; absent parts are left out of the request.
#[derive(Debug, Clone, Copy, Default)]
struct QueryMode<'a> {
    zygosity: Option<Zygosity>,
    sample: Option<&'a str>,
    page: Option<PaginationSpec>,
    trio: Option<&'a TrioRoles>,
}

/// Issues store calls on behalf of the tool surface.
#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<dyn VariantStore>,
    policy: QueryPolicy,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn VariantStore>, policy: QueryPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &QueryPolicy {
        &self.policy
    }

    /// Count variants in a region, optionally within one sample.
    pub async fn count_variants(
        &self,
        region: &RegionInput,
        zygosity: Zygosity,
        sample: Option<&str>,
        ann: &AnnotationInput,
    ) -> Outcome<i64> {
        let endpoint = match sample {
            Some(_) => Endpoint::CountVariantsInRegionInSamples,
            None => Endpoint::CountVariantsInRegion,
        };
        let mode = QueryMode {
            zygosity: Some(zygosity),
            sample,
            ..QueryMode::default()
        };
        let result = self.count(endpoint, region, ann, mode).await;
        Outcome::settle(endpoint.path(), result, 0)
    }

    /// One page of variants in a region, optionally within one sample.
    pub async fn select_variants(
        &self,
        region: &RegionInput,
        zygosity: Zygosity,
        sample: Option<&str>,
        ann: &AnnotationInput,
        page: &PageInput,
    ) -> Outcome<Vec<String>> {
        let endpoint = match sample {
            Some(_) => Endpoint::SelectVariantsInRegionInSamples,
            None => Endpoint::SelectVariantsInRegion,
        };
        let mode = QueryMode {
            zygosity: Some(zygosity),
            sample,
            page: Some(page.into()),
            trio: None,
        };
        let result = self.select_records(endpoint, region, ann, mode).await;
        Outcome::settle(endpoint.path(), result, empty_list())
    }

    /// Count samples carrying matching variants.
    pub async fn count_samples(
        &self,
        region: &RegionInput,
        zygosity: Zygosity,
        ann: &AnnotationInput,
    ) -> Outcome<i64> {
        let endpoint = Endpoint::CountSamplesInRegion;
        let mode = QueryMode {
            zygosity: Some(zygosity),
            ..QueryMode::default()
        };
        let result = self.count(endpoint, region, ann, mode).await;
        Outcome::settle(endpoint.path(), result, 0)
    }

    /// Identifiers of samples carrying matching variants. Not paginated.
    pub async fn select_samples(
        &self,
        region: &RegionInput,
        zygosity: Zygosity,
        ann: &AnnotationInput,
    ) -> Outcome<Vec<String>> {
        let endpoint = Endpoint::SelectSamplesInRegion;
        let mode = QueryMode {
            zygosity: Some(zygosity),
            ..QueryMode::default()
        };
        let result = async {
            let request = self.build_request(region, ann, mode)?;
            debug!(%endpoint, "dispatching");
            let samples = self
                .store
                .select_samples(&request)
                .await
                .map_err(QueryError::store(endpoint))?;
            Ok::<_, QueryError>(or_empty_sentinel(samples))
        }
        .await;
        Outcome::settle(endpoint.path(), result, empty_list())
    }

    /// Inheritance-pattern select over a trio. The endpoint follows the
    /// role set; every role must name a sample.
    pub async fn select_inheritance(
        &self,
        trio: &TrioRoles,
        region: &RegionInput,
        ann: &AnnotationInput,
        page: &PageInput,
    ) -> Outcome<Vec<String>> {
        let endpoint = match trio {
            TrioRoles::DeNovo { .. } => Endpoint::SelectDeNovo,
            TrioRoles::HetDominant { .. } => Endpoint::SelectHetDominant,
            TrioRoles::HomRecessive { .. } => Endpoint::SelectHomRecessive,
        };
        let mode = QueryMode {
            page: Some(page.into()),
            trio: Some(trio),
            ..QueryMode::default()
        };
        let result = self.select_records(endpoint, region, ann, mode).await;
        Outcome::settle(endpoint.path(), result, empty_list())
    }

    /// Relationship degree between two samples, or `""` when the store has
    /// no record for the pair.
    pub async fn kinship(&self, sample1: &str, sample2: &str) -> Outcome<String> {
        let endpoint = Endpoint::KinshipDuo;
        let result = async {
            if sample1.trim().is_empty() || sample2.trim().is_empty() {
                return Err(QueryError::MissingSample);
            }
            let request = KinshipRequest {
                sample1: sample1.to_string(),
                sample2: sample2.to_string(),
                seq: true,
            };
            debug!(%endpoint, "dispatching");
            let records = self
                .store
                .kinship(&request)
                .await
                .map_err(QueryError::store(endpoint))?;
            let degree = records.into_iter().next().map(|r| r.degree);
            Ok::<_, QueryError>(degree.unwrap_or_default())
        }
        .await;
        Outcome::settle(endpoint.path(), result, String::new())
    }

    /// Dataset totals, with sample names by sex when asked for.
    pub async fn dataset_info(&self, include_names: bool) -> Outcome<DatasetSummary> {
        let endpoint = Endpoint::DatasetInfo;
        let result = async {
            debug!(%endpoint, include_names, "dispatching");
            let info = self
                .store
                .dataset_info(include_names)
                .await
                .map_err(QueryError::store(endpoint))?;
            let sample_names_by_sex = include_names.then(|| SampleNamesBySex {
                female: partition_by_sex(&info.cohorts, SexFilter::Female),
                male: partition_by_sex(&info.cohorts, SexFilter::Male),
            });
            Ok::<_, QueryError>(DatasetSummary {
                variants_total: to_count(info.variants_total),
                samples_total: to_count(info.samples_total),
                females_total: to_count(info.females_total),
                males_total: to_count(info.males_total),
                nodes_total: to_count(info.rings_total),
                sample_names_by_sex,
            })
        }
        .await;
        Outcome::settle(endpoint.path(), result, DatasetSummary::default())
    }

    /// Sample identifiers of one sex partition, or of all samples with
    /// females listed first.
    pub async fn sample_ids(&self, filter: SexFilter) -> Outcome<Vec<String>> {
        let endpoint = Endpoint::DatasetInfo;
        let result = async {
            debug!(%endpoint, ?filter, "dispatching");
            let info = self
                .store
                .dataset_info(true)
                .await
                .map_err(QueryError::store(endpoint))?;
            Ok::<_, QueryError>(or_empty_sentinel(partition_by_sex(&info.cohorts, filter)))
        }
        .await;
        Outcome::settle(endpoint.path(), result, empty_list())
    }

    async fn count(
        &self,
        endpoint: Endpoint,
        region: &RegionInput,
        ann: &AnnotationInput,
        mode: QueryMode<'_>,
    ) -> Result<i64, QueryError> {
        let request = self.build_request(region, ann, mode)?;
        debug!(%endpoint, chr = %request.chr, start = request.start, end = request.end, "dispatching");
        let count = self
            .store
            .count(endpoint, &request)
            .await
            .map_err(QueryError::store(endpoint))?;
        Ok(to_count(count))
    }

    async fn select_records(
        &self,
        endpoint: Endpoint,
        region: &RegionInput,
        ann: &AnnotationInput,
        mode: QueryMode<'_>,
    ) -> Result<Vec<String>, QueryError> {
        let request = self.build_request(region, ann, mode)?;
        debug!(%endpoint, chr = %request.chr, start = request.start, end = request.end, "dispatching");
        let batches = self
            .store
            .select_alleles(endpoint, &request)
            .await
            .map_err(QueryError::store(endpoint))?;
        let mut records = aggregate::drain(batches)
            .await
            .map_err(QueryError::store(endpoint))?;
        if let Some(page) = mode.page {
            records.truncate(page.limit as usize);
        }
        Ok(or_empty_sentinel(
            records.iter().map(VariantRecord::to_text).collect(),
        ))
    }

    /// The one request builder behind every region query.
    fn build_request(
        &self,
        region: &RegionInput,
        ann: &AnnotationInput,
        mode: QueryMode<'_>,
    ) -> Result<RegionRequest, QueryError> {
        let samples = match mode.sample {
            Some(s) if s.trim().is_empty() => return Err(QueryError::MissingSample),
            Some(s) => vec![s.to_string()],
            None => Vec::new(),
        };
        if let Some(trio) = mode.trio {
            if let Some((role, _)) = trio.roles().into_iter().find(|(_, id)| id.trim().is_empty()) {
                return Err(QueryError::MissingRole(role));
            }
        }

        let spec = normalize_region(region, &self.policy)?;
        let (variant_min_length, variant_max_length) = spec.lengths.to_wire();

        Ok(RegionRequest {
            assembly: self.policy.assembly,
            chr: spec.chromosome,
            start: spec.start,
            end: spec.end,
            reference: spec.reference,
            alt: spec.alternate,
            variant_min_length,
            variant_max_length,
            hom: mode.zygosity.map(Zygosity::hom),
            het: mode.zygosity.map(Zygosity::het),
            samples,
            ann: build_filter(ann, &self.policy),
            skip: mode.page.map(|p| p.skip),
            limit: mode.page.map(|p| p.limit),
            trio: mode.trio.cloned(),
        })
    }
}

fn empty_list() -> Vec<String> {
    vec![EMPTY_SENTINEL.to_string()]
}

fn to_count(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
