//! Wire-level request and response shapes of the remote store.
//!
//! Field names follow the store's camelCase JSON contract.

use serde::{Deserialize, Serialize};

use crate::query::filter::AnnotationFilter;
use crate::query::normalize::{Chromosome, RefAssembly};

/// Body of every region-based request (counts, selects, trio selects).
///
/// Optional parts are omitted from the JSON rather than sent as null:
/// zygosity flags are absent for trio queries, `samples` is absent unless
/// the query is scoped to samples, and `skip`/`limit` only appear on
/// paginated selects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionRequest {
    pub assembly: RefAssembly,
    pub chr: Chromosome,
    pub start: u64,
    pub end: u64,
    #[serde(rename = "ref")]
    pub reference: String,
    pub alt: String,
    pub variant_min_length: i32,
    pub variant_max_length: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hom: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub het: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<String>,
    pub ann: AnnotationFilter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(flatten)]
    pub trio: Option<TrioRoles>,
}

/// Named sample roles of an inheritance query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TrioRoles {
    /// Both parents and the proband; the store infers the pattern.
    #[serde(rename_all = "camelCase")]
    DeNovo {
        parent1: String,
        parent2: String,
        proband: String,
    },
    #[serde(rename_all = "camelCase")]
    HetDominant {
        affected_parent: String,
        unaffected_parent: String,
        #[serde(rename = "affectedChild")]
        proband: String,
    },
    #[serde(rename_all = "camelCase")]
    HomRecessive {
        unaffected_parent1: String,
        unaffected_parent2: String,
        #[serde(rename = "affectedChild")]
        proband: String,
    },
}

impl TrioRoles {
    /// Role names paired with their sample identifiers, in request order.
    pub fn roles(&self) -> [(&'static str, &str); 3] {
        match self {
            Self::DeNovo {
                parent1,
                parent2,
                proband,
            } => [
                ("parent1", parent1.as_str()),
                ("parent2", parent2.as_str()),
                ("proband", proband.as_str()),
            ],
            Self::HetDominant {
                affected_parent,
                unaffected_parent,
                proband,
            } => [
                ("affectedParent", affected_parent.as_str()),
                ("unaffectedParent", unaffected_parent.as_str()),
                ("proband", proband.as_str()),
            ],
            Self::HomRecessive {
                unaffected_parent1,
                unaffected_parent2,
                proband,
            } => [
                ("unaffectedParent1", unaffected_parent1.as_str()),
                ("unaffectedParent2", unaffected_parent2.as_str()),
                ("proband", proband.as_str()),
            ],
        }
    }
}

/// Kinship lookup for a pair of samples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KinshipRequest {
    pub sample1: String,
    pub sample2: String,
    /// Ask the store for sequencing-derived relatedness.
    pub seq: bool,
}

/// Dataset-wide totals returned by `datasetInfo`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatasetInfo {
    pub variants_total: u64,
    pub samples_total: u64,
    pub females_total: u64,
    pub males_total: u64,
    /// Number of storage nodes in the cluster.
    pub rings_total: u64,
    pub cohorts: Vec<Cohort>,
}

/// One cohort's sample names, partitioned by sex.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Cohort {
    pub cohort_name: String,
    pub female_samples_names: Vec<String>,
    pub male_samples_names: Vec<String>,
}

/// One relatedness record between two samples.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Relatedness {
    pub sample1: String,
    pub sample2: String,
    /// Relationship degree label, e.g. `FIRST_DEGREE`.
    pub degree: String,
}

/// A variant record as returned by the store.
///
/// The fields are never inspected here; records are only counted,
/// concatenated and rendered back to JSON text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantRecord(pub serde_json::Value);

impl VariantRecord {
    /// Render the record as compact JSON text.
    pub fn to_text(&self) -> String {
        self.0.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RegionRequest {
        RegionRequest {
            assembly: RefAssembly::Grch38,
            chr: Chromosome::Chr(17),
            start: 100,
            end: 200,
            reference: String::new(),
            alt: "T".into(),
            variant_min_length: 0,
            variant_max_length: i32::MAX,
            hom: Some(true),
            het: Some(false),
            samples: vec![],
            ann: AnnotationFilter::default(),
            skip: None,
            limit: None,
            trio: None,
        }
    }

    #[test]
    fn region_request_omits_absent_parts() {
        let json = serde_json::to_value(request()).expect("serialize");
        assert_eq!(json["assembly"], "GRCh38");
        assert_eq!(json["chr"], "17");
        assert_eq!(json["ref"], "");
        assert_eq!(json["alt"], "T");
        assert_eq!(json["variantMaxLength"], i32::MAX);
        assert_eq!(json["hom"], true);
        assert_eq!(json["het"], false);
        assert!(json.get("samples").is_none());
        assert!(json.get("skip").is_none());
        assert!(json.get("limit").is_none());
        assert!(json.get("proband").is_none());
        assert!(json["ann"].is_object());
    }

    #[test]
    fn trio_roles_are_flattened_into_request() {
        let req = RegionRequest {
            hom: None,
            het: None,
            trio: Some(TrioRoles::HetDominant {
                affected_parent: "P1".into(),
                unaffected_parent: "P2".into(),
                proband: "C".into(),
            }),
            ..request()
        };
        let json = serde_json::to_value(req).expect("serialize");
        assert_eq!(json["affectedParent"], "P1");
        assert_eq!(json["unaffectedParent"], "P2");
        assert_eq!(json["affectedChild"], "C");
        assert!(json.get("hom").is_none());
    }

    #[test]
    fn dataset_info_tolerates_missing_fields() {
        let info: DatasetInfo =
            serde_json::from_str(r#"{"samplesTotal": 3, "cohorts": [{"cohortName": "c1"}]}"#)
                .expect("parse");
        assert_eq!(info.samples_total, 3);
        assert_eq!(info.variants_total, 0);
        assert!(info.cohorts[0].female_samples_names.is_empty());
    }

    #[test]
    fn variant_record_renders_compact_json() {
        let record = VariantRecord(serde_json::json!({"pos": 5, "ref": "A"}));
        assert_eq!(record.to_text(), r#"{"pos":5,"ref":"A"}"#);
    }
}
