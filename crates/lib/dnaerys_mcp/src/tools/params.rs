//! Tool parameter types.
//!
//! Region, annotation and page fields are shared across tools through
//! flattening, so every tool documents them identically. Identifiers
//! default to empty so that a missing one voids the query instead of
//! failing the call.

use dnaerys_core::query::{AnnotationInput, PageInput, RegionInput};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for `dataset_info`.
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatasetInfoRequest {
    /// Include sample IDs, grouped by sex.
    #[serde(default)]
    pub include_sample_names: Option<bool>,
}

/// A region with optional annotation filters.
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct RegionRequest {
    #[serde(flatten)]
    pub region: RegionInput,
    #[serde(flatten)]
    pub annotations: AnnotationInput,
}

/// A region, filters and a page.
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct RegionPageRequest {
    #[serde(flatten)]
    pub region: RegionInput,
    #[serde(flatten)]
    pub annotations: AnnotationInput,
    #[serde(flatten)]
    pub page: PageInput,
}

/// A region with filters, scoped to one sample.
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SampleRegionRequest {
    /// Sample ID.
    #[serde(default)]
    pub sample_id: String,
    #[serde(flatten)]
    pub region: RegionInput,
    #[serde(flatten)]
    pub annotations: AnnotationInput,
}

/// A region, filters and a page, scoped to one sample.
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SampleRegionPageRequest {
    /// Sample ID.
    #[serde(default)]
    pub sample_id: String,
    #[serde(flatten)]
    pub region: RegionInput,
    #[serde(flatten)]
    pub annotations: AnnotationInput,
    #[serde(flatten)]
    pub page: PageInput,
}

/// De novo search in a trio.
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeNovoRequest {
    /// Sample ID of the first parent.
    #[serde(default)]
    pub parent1: String,
    /// Sample ID of the second parent.
    #[serde(default)]
    pub parent2: String,
    /// Sample ID of the proband.
    #[serde(default)]
    pub proband: String,
    #[serde(flatten)]
    pub region: RegionInput,
    #[serde(flatten)]
    pub annotations: AnnotationInput,
    #[serde(flatten)]
    pub page: PageInput,
}

/// Heterozygous dominant search in a trio.
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HetDominantRequest {
    /// Sample ID of the affected parent.
    #[serde(default)]
    pub affected_parent: String,
    /// Sample ID of the unaffected parent.
    #[serde(default)]
    pub unaffected_parent: String,
    /// Sample ID of the affected child.
    #[serde(default)]
    pub affected_child: String,
    #[serde(flatten)]
    pub region: RegionInput,
    #[serde(flatten)]
    pub annotations: AnnotationInput,
    #[serde(flatten)]
    pub page: PageInput,
}

/// Homozygous recessive search in a trio.
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HomRecessiveRequest {
    /// Sample ID of the first unaffected parent.
    #[serde(default)]
    pub unaffected_parent1: String,
    /// Sample ID of the second unaffected parent.
    #[serde(default)]
    pub unaffected_parent2: String,
    /// Sample ID of the affected child.
    #[serde(default)]
    pub affected_child: String,
    #[serde(flatten)]
    pub region: RegionInput,
    #[serde(flatten)]
    pub annotations: AnnotationInput,
    #[serde(flatten)]
    pub page: PageInput,
}

/// Kinship between two samples.
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KinshipRequest {
    /// First sample ID.
    #[serde(default)]
    pub sample1: String,
    /// Second sample ID.
    #[serde(default)]
    pub sample2: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flattened_fields_share_one_level() {
        let req: SampleRegionPageRequest = serde_json::from_value(json!({
            "sampleId": "HG00096",
            "chromosome": "17",
            "start": 43044295,
            "end": 43125364,
            "variantMaxLength": 50,
            "impact": "HIGH,MODERATE",
            "gnomadAfLessThan": 0.01,
            "limit": 20
        }))
        .expect("parse");
        assert_eq!(req.sample_id, "HG00096");
        assert_eq!(req.region.chromosome, "17");
        assert_eq!(req.region.variant_max_length, Some(50));
        assert_eq!(req.annotations.impact.as_deref(), Some("HIGH,MODERATE"));
        assert_eq!(req.annotations.gnomad_af_less_than, Some(0.01));
        assert_eq!(req.page.limit, Some(20));
        assert_eq!(req.page.skip, None);
    }

    #[test]
    fn missing_trio_role_defaults_to_empty() {
        let req: DeNovoRequest = serde_json::from_value(json!({
            "parent2": "S2",
            "proband": "S3",
            "chromosome": "1",
            "start": 1,
            "end": 2
        }))
        .expect("parse");
        assert_eq!(req.parent1, "");
    }

    #[test]
    fn schema_lists_flattened_properties() {
        let schema = serde_json::to_value(schemars::schema_for!(RegionPageRequest)).unwrap();
        let props = schema["properties"].as_object().expect("properties");
        for key in ["chromosome", "start", "end", "refAllele", "clinSignificance", "skip", "limit"] {
            assert!(props.contains_key(key), "missing {key}");
        }
    }
}
