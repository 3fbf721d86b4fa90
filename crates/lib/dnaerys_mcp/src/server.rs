// @zen-component: MCP-Server
//
//! MCP server handler. One tool per dispatcher operation.

use std::future::Future;
use std::sync::Arc;

use dnaerys_core::query::{DatasetSummary, Dispatcher, Outcome, SexFilter, Zygosity};
use dnaerys_core::store::TrioRoles;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router,
};
use serde::{Serialize, de::DeserializeOwned};
use tracing::warn;

use crate::hooks::{HookContext, HookPipeline, ToolCallOutcome};
use crate::tools::params::{
    DatasetInfoRequest, DeNovoRequest, HetDominantRequest, HomRecessiveRequest, KinshipRequest,
    RegionPageRequest, RegionRequest, SampleRegionPageRequest, SampleRegionRequest,
};
use crate::tools::{count_result, json_result, list_result, text_result};

/// Dnaerys MCP server handler.
///
/// Cheap to clone: the dispatcher and hook pipeline are shared, so the
/// Streamable HTTP factory builds one per session.
#[derive(Clone)]
pub struct DnaerysMcpServer {
    dispatcher: Arc<Dispatcher>,
    hook_pipeline: Arc<HookPipeline>,
    tool_router: ToolRouter<Self>,
}

impl DnaerysMcpServer {
    /// Run hooks around one dispatcher call and render its value.
    ///
    /// The call is built from the parameters as left by the before-hooks,
    /// and the result is rendered from the value as left by the
    /// after-hooks. Defaulted outcomes are rendered like answers; only the
    /// hooks see the reason. A rejecting hook fails the call with
    /// `INVALID_REQUEST`.
    async fn run<P, T, F, Fut>(
        &self,
        tool: &'static str,
        req: P,
        call: F,
        render: impl FnOnce(T) -> Result<CallToolResult, ErrorData>,
    ) -> Result<CallToolResult, ErrorData>
    where
        P: Serialize + DeserializeOwned,
        T: Serialize + DeserializeOwned,
        F: FnOnce(P) -> Fut,
        Fut: Future<Output = Outcome<T>>,
    {
        let ctx = HookContext::new(tool);
        let mut params = serde_json::to_value(&req)
            .map_err(|e| ErrorData::new(ErrorCode::INTERNAL_ERROR, e.to_string(), None))?;

        self.hook_pipeline
            .run_before(&ctx, &mut params)
            .await
            .map_err(|e| ErrorData::new(ErrorCode::INVALID_REQUEST, e.to_string(), None))?;

        let req: P = serde_json::from_value(params).map_err(|e| {
            ErrorData::new(
                ErrorCode::INVALID_PARAMS,
                format!("hook left invalid parameters: {e}"),
                None,
            )
        })?;

        let outcome = call(req).await;

        let mut audit = ToolCallOutcome::from_outcome(&outcome);
        if let Err(e) = self.hook_pipeline.run_after(&ctx, &mut audit).await {
            warn!(tool, "after_call hook failed: {e}");
        }

        let value: T = serde_json::from_value(audit.into_value()).map_err(|e| {
            ErrorData::new(
                ErrorCode::INTERNAL_ERROR,
                format!("hook left an invalid result: {e}"),
                None,
            )
        })?;
        render(value)
    }

    async fn region_count(
        &self,
        tool: &'static str,
        req: RegionRequest,
        zygosity: Zygosity,
    ) -> Result<CallToolResult, ErrorData> {
        let d = &self.dispatcher;
        let call = move |req: RegionRequest| async move {
            d.count_variants(&req.region, zygosity, None, &req.annotations)
                .await
        };
        self.run(tool, req, call, count_result).await
    }

    async fn sample_count(
        &self,
        tool: &'static str,
        req: SampleRegionRequest,
        zygosity: Zygosity,
    ) -> Result<CallToolResult, ErrorData> {
        let d = &self.dispatcher;
        let call = move |req: SampleRegionRequest| async move {
            d.count_variants(
                &req.region,
                zygosity,
                Some(req.sample_id.as_str()),
                &req.annotations,
            )
            .await
        };
        self.run(tool, req, call, count_result).await
    }

    async fn region_select(
        &self,
        tool: &'static str,
        req: RegionPageRequest,
        zygosity: Zygosity,
    ) -> Result<CallToolResult, ErrorData> {
        let d = &self.dispatcher;
        let call = move |req: RegionPageRequest| async move {
            d.select_variants(&req.region, zygosity, None, &req.annotations, &req.page)
                .await
        };
        self.run(tool, req, call, list_result).await
    }

    async fn sample_select(
        &self,
        tool: &'static str,
        req: SampleRegionPageRequest,
        zygosity: Zygosity,
    ) -> Result<CallToolResult, ErrorData> {
        let d = &self.dispatcher;
        let call = move |req: SampleRegionPageRequest| async move {
            d.select_variants(
                &req.region,
                zygosity,
                Some(req.sample_id.as_str()),
                &req.annotations,
                &req.page,
            )
            .await
        };
        self.run(tool, req, call, list_result).await
    }

    async fn cohort_count(
        &self,
        tool: &'static str,
        req: RegionRequest,
        zygosity: Zygosity,
    ) -> Result<CallToolResult, ErrorData> {
        let d = &self.dispatcher;
        let call = move |req: RegionRequest| async move {
            d.count_samples(&req.region, zygosity, &req.annotations).await
        };
        self.run(tool, req, call, count_result).await
    }

    async fn cohort_select(
        &self,
        tool: &'static str,
        req: RegionRequest,
        zygosity: Zygosity,
    ) -> Result<CallToolResult, ErrorData> {
        let d = &self.dispatcher;
        let call = move |req: RegionRequest| async move {
            d.select_samples(&req.region, zygosity, &req.annotations).await
        };
        self.run(tool, req, call, list_result).await
    }

    async fn dataset_total(
        &self,
        tool: &'static str,
        pick: fn(&DatasetSummary) -> i64,
    ) -> Result<CallToolResult, ErrorData> {
        let d = &self.dispatcher;
        let call = move |()| async move { d.dataset_info(false).await.map(|s| pick(&s)) };
        self.run(tool, (), call, count_result).await
    }

    async fn listing(&self, tool: &'static str, filter: SexFilter) -> Result<CallToolResult, ErrorData> {
        let d = &self.dispatcher;
        let call = move |()| async move { d.sample_ids(filter).await };
        self.run(tool, (), call, list_result).await
    }

    /// Serve over stdin/stdout until the client disconnects.
    pub async fn serve_stdio(self) -> Result<(), rmcp::RmcpError> {
        let service = self.serve((tokio::io::stdin(), tokio::io::stdout())).await?;
        service.waiting().await?;
        Ok(())
    }
}

#[tool_router]
impl DnaerysMcpServer {
    pub fn new(dispatcher: Arc<Dispatcher>, hook_pipeline: Arc<HookPipeline>) -> Self {
        Self {
            dispatcher,
            hook_pipeline,
            tool_router: Self::tool_router(),
        }
    }

    /// Return tool definitions registered in this server.
    #[cfg(test)]
    pub(crate) fn list_tools() -> Vec<rmcp::model::Tool> {
        Self::tool_router().list_all()
    }

    // Dataset

    #[tool(
        description = "Returns dataset totals: variants, samples, female and male samples, and database cluster nodes. Optionally includes all sample IDs grouped by sex."
    )]
    async fn dataset_info(
        &self,
        Parameters(req): Parameters<DatasetInfoRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let d = &self.dispatcher;
        let call = move |req: DatasetInfoRequest| async move {
            d.dataset_info(req.include_sample_names.unwrap_or(false))
                .await
        };
        self.run("dataset_info", req, call, json_result).await
    }

    #[tool(description = "Returns number of variants in the dataset")]
    async fn variants_total(&self) -> Result<CallToolResult, ErrorData> {
        self.dataset_total("variants_total", |s| s.variants_total)
            .await
    }

    #[tool(description = "Returns number of nodes in database cluster")]
    async fn nodes_total(&self) -> Result<CallToolResult, ErrorData> {
        self.dataset_total("nodes_total", |s| s.nodes_total).await
    }

    #[tool(description = "Returns number of samples in the dataset")]
    async fn count_samples_total(&self) -> Result<CallToolResult, ErrorData> {
        self.dataset_total("count_samples_total", |s| s.samples_total)
            .await
    }

    #[tool(description = "Returns number of female samples in the dataset")]
    async fn count_female_samples_total(&self) -> Result<CallToolResult, ErrorData> {
        self.dataset_total("count_female_samples_total", |s| s.females_total)
            .await
    }

    #[tool(description = "Returns number of male samples in the dataset")]
    async fn count_male_samples_total(&self) -> Result<CallToolResult, ErrorData> {
        self.dataset_total("count_male_samples_total", |s| s.males_total)
            .await
    }

    #[tool(description = "Returns all sample IDs in the dataset, female samples first")]
    async fn sample_ids(&self) -> Result<CallToolResult, ErrorData> {
        self.listing("sample_ids", SexFilter::All).await
    }

    #[tool(description = "Returns all female sample IDs in the dataset")]
    async fn female_sample_ids(&self) -> Result<CallToolResult, ErrorData> {
        self.listing("female_sample_ids", SexFilter::Female).await
    }

    #[tool(description = "Returns all male sample IDs in the dataset")]
    async fn male_sample_ids(&self) -> Result<CallToolResult, ErrorData> {
        self.listing("male_sample_ids", SexFilter::Male).await
    }

    // Region counts

    #[tool(
        description = "Returns number of variants in a region. A region is a chromosome (1..22, X, Y, MT) with start and end coordinates in GRCh38. Optional REF/ALT alleles, variant length bounds, gnomAD AF bounds and annotation filters (impact, biotype, feature type, variant type, consequence, AlphaMissense class, ClinVar significance, biallelic only). Values within one filter are alternatives; different filters must all match."
    )]
    async fn count_variants_in_region(
        &self,
        Parameters(req): Parameters<RegionRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.region_count("count_variants_in_region", req, Zygosity::ANY)
            .await
    }

    #[tool(
        description = "Returns number of homozygous variants in a region. Same region and filter parameters as count_variants_in_region."
    )]
    async fn count_homozygous_variants_in_region(
        &self,
        Parameters(req): Parameters<RegionRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.region_count("count_homozygous_variants_in_region", req, Zygosity::HOM)
            .await
    }

    #[tool(
        description = "Returns number of heterozygous variants in a region. Same region and filter parameters as count_variants_in_region."
    )]
    async fn count_heterozygous_variants_in_region(
        &self,
        Parameters(req): Parameters<RegionRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.region_count("count_heterozygous_variants_in_region", req, Zygosity::HET)
            .await
    }

    #[tool(
        description = "Returns number of variants in one sample in a region. Sample is given by sample ID. Same region and filter parameters as count_variants_in_region."
    )]
    async fn count_variants_in_region_in_sample(
        &self,
        Parameters(req): Parameters<SampleRegionRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.sample_count("count_variants_in_region_in_sample", req, Zygosity::ANY)
            .await
    }

    #[tool(
        description = "Returns number of homozygous variants in one sample in a region. Same parameters as count_variants_in_region_in_sample."
    )]
    async fn count_homozygous_variants_in_region_in_sample(
        &self,
        Parameters(req): Parameters<SampleRegionRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.sample_count(
            "count_homozygous_variants_in_region_in_sample",
            req,
            Zygosity::HOM,
        )
        .await
    }

    #[tool(
        description = "Returns number of heterozygous variants in one sample in a region. Same parameters as count_variants_in_region_in_sample."
    )]
    async fn count_heterozygous_variants_in_region_in_sample(
        &self,
        Parameters(req): Parameters<SampleRegionRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.sample_count(
            "count_heterozygous_variants_in_region_in_sample",
            req,
            Zygosity::HET,
        )
        .await
    }

    // Region selects

    #[tool(
        description = "Returns variants in a region, one JSON record per item. Returns a single empty JSON object if no variants are found (this is NOT an error). Paginated with skip and limit (at most 100 per call). Same region and filter parameters as count_variants_in_region."
    )]
    async fn select_variants_in_region(
        &self,
        Parameters(req): Parameters<RegionPageRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.region_select("select_variants_in_region", req, Zygosity::ANY)
            .await
    }

    #[tool(
        description = "Returns only homozygous variants in a region. Same parameters and empty-result convention as select_variants_in_region."
    )]
    async fn select_homozygous_variants_in_region(
        &self,
        Parameters(req): Parameters<RegionPageRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.region_select("select_homozygous_variants_in_region", req, Zygosity::HOM)
            .await
    }

    #[tool(
        description = "Returns only heterozygous variants in a region. Same parameters and empty-result convention as select_variants_in_region."
    )]
    async fn select_heterozygous_variants_in_region(
        &self,
        Parameters(req): Parameters<RegionPageRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.region_select("select_heterozygous_variants_in_region", req, Zygosity::HET)
            .await
    }

    #[tool(
        description = "Returns variants in one sample in a region. Sample is given by sample ID. Same parameters and empty-result convention as select_variants_in_region."
    )]
    async fn select_variants_in_region_in_sample(
        &self,
        Parameters(req): Parameters<SampleRegionPageRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.sample_select("select_variants_in_region_in_sample", req, Zygosity::ANY)
            .await
    }

    #[tool(
        description = "Returns only homozygous variants in one sample in a region. Same parameters as select_variants_in_region_in_sample."
    )]
    async fn select_homozygous_variants_in_region_in_sample(
        &self,
        Parameters(req): Parameters<SampleRegionPageRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.sample_select(
            "select_homozygous_variants_in_region_in_sample",
            req,
            Zygosity::HOM,
        )
        .await
    }

    #[tool(
        description = "Returns only heterozygous variants in one sample in a region. Same parameters as select_variants_in_region_in_sample."
    )]
    async fn select_heterozygous_variants_in_region_in_sample(
        &self,
        Parameters(req): Parameters<SampleRegionPageRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.sample_select(
            "select_heterozygous_variants_in_region_in_sample",
            req,
            Zygosity::HET,
        )
        .await
    }

    // Cohort

    #[tool(
        description = "Returns number of samples with homozygous or heterozygous variants in a region. Same region and filter parameters as count_variants_in_region."
    )]
    async fn count_samples_with_variants(
        &self,
        Parameters(req): Parameters<RegionRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.cohort_count("count_samples_with_variants", req, Zygosity::ANY)
            .await
    }

    #[tool(
        description = "Returns number of samples with homozygous variants in a region. Same region and filter parameters as count_variants_in_region."
    )]
    async fn count_samples_with_hom_variants(
        &self,
        Parameters(req): Parameters<RegionRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.cohort_count("count_samples_with_hom_variants", req, Zygosity::HOM)
            .await
    }

    #[tool(
        description = "Returns number of samples with heterozygous variants in a region. Same region and filter parameters as count_variants_in_region."
    )]
    async fn count_samples_with_het_variants(
        &self,
        Parameters(req): Parameters<RegionRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.cohort_count("count_samples_with_het_variants", req, Zygosity::HET)
            .await
    }

    #[tool(
        description = "Returns unique sample IDs with homozygous or heterozygous variants in a region. Returns a single empty JSON object if no samples are found (this is NOT an error). Same region and filter parameters as count_variants_in_region."
    )]
    async fn select_samples_with_variants(
        &self,
        Parameters(req): Parameters<RegionRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.cohort_select("select_samples_with_variants", req, Zygosity::ANY)
            .await
    }

    #[tool(
        description = "Returns unique sample IDs with homozygous variants in a region. Same parameters and empty-result convention as select_samples_with_variants."
    )]
    async fn select_samples_with_hom_variants(
        &self,
        Parameters(req): Parameters<RegionRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.cohort_select("select_samples_with_hom_variants", req, Zygosity::HOM)
            .await
    }

    #[tool(
        description = "Returns unique sample IDs with heterozygous variants in a region. Same parameters and empty-result convention as select_samples_with_variants."
    )]
    async fn select_samples_with_het_variants(
        &self,
        Parameters(req): Parameters<RegionRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.cohort_select("select_samples_with_het_variants", req, Zygosity::HET)
            .await
    }

    // Trio

    #[tool(
        description = "Returns de novo variants in the proband of a trio (present in the proband, absent in both parents) in a region. All three sample IDs are required. Returns a single empty JSON object if no variants are found (this is NOT an error). Paginated with skip and limit (at most 100 per call)."
    )]
    async fn de_novo_in_trio(
        &self,
        Parameters(req): Parameters<DeNovoRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let d = &self.dispatcher;
        let call = move |req: DeNovoRequest| async move {
            let trio = TrioRoles::DeNovo {
                parent1: req.parent1,
                parent2: req.parent2,
                proband: req.proband,
            };
            d.select_inheritance(&trio, &req.region, &req.annotations, &req.page)
                .await
        };
        self.run("de_novo_in_trio", req, call, list_result).await
    }

    #[tool(
        description = "Returns heterozygous dominant variants in the affected child of a trio, given one affected and one unaffected parent, in a region. All three sample IDs are required. Same empty-result convention and pagination as de_novo_in_trio."
    )]
    async fn het_dominant_in_trio(
        &self,
        Parameters(req): Parameters<HetDominantRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let d = &self.dispatcher;
        let call = move |req: HetDominantRequest| async move {
            let trio = TrioRoles::HetDominant {
                affected_parent: req.affected_parent,
                unaffected_parent: req.unaffected_parent,
                proband: req.affected_child,
            };
            d.select_inheritance(&trio, &req.region, &req.annotations, &req.page)
                .await
        };
        self.run("het_dominant_in_trio", req, call, list_result)
            .await
    }

    #[tool(
        description = "Returns homozygous recessive variants in the affected child of a trio, given two unaffected parents, in a region. All three sample IDs are required. Same empty-result convention and pagination as de_novo_in_trio."
    )]
    async fn hom_recessive_in_trio(
        &self,
        Parameters(req): Parameters<HomRecessiveRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let d = &self.dispatcher;
        let call = move |req: HomRecessiveRequest| async move {
            let trio = TrioRoles::HomRecessive {
                unaffected_parent1: req.unaffected_parent1,
                unaffected_parent2: req.unaffected_parent2,
                proband: req.affected_child,
            };
            d.select_inheritance(&trio, &req.region, &req.annotations, &req.page)
                .await
        };
        self.run("hom_recessive_in_trio", req, call, list_result)
            .await
    }

    // Kinship

    #[tool(
        description = "Returns the degree of relatedness (kinship) between two samples given by sample ID. Returns an empty string if the samples are not related."
    )]
    async fn kinship(
        &self,
        Parameters(req): Parameters<KinshipRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let d = &self.dispatcher;
        let call = move |req: KinshipRequest| async move {
            d.kinship(&req.sample1, &req.sample2).await
        };
        self.run("kinship", req, call, text_result).await
    }
}

#[tool_handler]
impl ServerHandler for DnaerysMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Dnaerys MCP server. Counts and selects genomic variants, samples, trio inheritance patterns and kinship in a Dnaerys variant store. Empty lists come back as a single empty JSON object; that is not an error."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
