// @zen-component: VQ-FilterBuilder
//
//! Annotation filter builder.
//!
//! Each category arrives as a comma-separated string and becomes a set of
//! vocabulary values. The store ANDs categories together and ORs values
//! within a category; this module only produces the filter value.
//! Unrecognized tokens are dropped without error.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::normalize::QueryPolicy;
use super::vocabulary::{
    AlphaMissense, BioType, ClinSignificance, Consequence, FeatureType, Impact, VariantType,
};

/// Raw annotation parameters as supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationInput {
    /// Return only biallelic variants.
    #[serde(default)]
    pub biallelic_only: Option<bool>,
    /// Return only variants with gnomAD allele frequency less than this value.
    #[serde(default)]
    pub gnomad_af_less_than: Option<f32>,
    /// Return only variants with gnomAD allele frequency greater than this value.
    #[serde(default)]
    pub gnomad_af_greater_than: Option<f32>,
    /// Comma-separated list of VEP impact ratings: HIGH, MODERATE, LOW,
    /// MODIFIER. A variant matches if it has ANY of the listed values.
    #[serde(default)]
    pub impact: Option<String>,
    /// Comma-separated list of VEP biotypes, e.g. PROTEIN_CODING, LNCRNA,
    /// NONSENSE_MEDIATED_DECAY, PSEUDOGENE. Matches ANY listed value.
    #[serde(default)]
    pub biotype: Option<String>,
    /// Comma-separated list of feature types: TRANSCRIPT,
    /// REGULATORYFEATURE, MOTIFFEATURE. Matches ANY listed value.
    #[serde(default)]
    pub feature: Option<String>,
    /// Comma-separated list of variant types: SNV, INSERTION, DELETION,
    /// INDEL, SUBSTITUTION, INVERSION, TRANSLOCATION, DUPLICATION,
    /// SEQUENCE_ALTERATION. Matches ANY listed value.
    #[serde(default)]
    pub variant_type: Option<String>,
    /// Comma-separated list of Sequence Ontology consequences, e.g.
    /// MISSENSE_VARIANT, STOP_GAINED, FRAMESHIFT_VARIANT,
    /// SPLICE_DONOR_VARIANT, SYNONYMOUS_VARIANT. Matches ANY listed value.
    #[serde(default)]
    pub consequences: Option<String>,
    /// Comma-separated list of AlphaMissense classes: LIKELY_BENIGN,
    /// LIKELY_PATHOGENIC, AMBIGUOUS. Matches ANY listed value.
    #[serde(default)]
    pub alpha_missense: Option<String>,
    /// Comma-separated list of ClinVar significances, e.g. PATHOGENIC,
    /// LIKELY_PATHOGENIC, UNCERTAIN_SIGNIFICANCE, BENIGN, LIKELY_BENIGN,
    /// CONFLICTING_INTERPRETATIONS. Matches ANY listed value.
    #[serde(default)]
    pub clin_significance: Option<String>,
}

/// Typed annotation filter as sent to the store.
///
/// Absent constraints are omitted from the JSON; an empty category does
/// not restrict results.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gnomad_af_lt: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gnomad_af_gt: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biallelic_only: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub impact: Vec<Impact>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub btypes: Vec<BioType>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ftypes: Vec<FeatureType>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub vtypes: Vec<VariantType>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub consequences: Vec<Consequence>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub am_class: Vec<AlphaMissense>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub clnsgn: Vec<ClinSignificance>,
}

impl AnnotationFilter {
    /// `true` when no constraint is set.
    pub fn is_unrestricted(&self) -> bool {
        *self == Self::default()
    }
}

/// Compile caller tokens into an [`AnnotationFilter`].
pub fn build_filter(input: &AnnotationInput, policy: &QueryPolicy) -> AnnotationFilter {
    AnnotationFilter {
        gnomad_af_lt: af_bound(input.gnomad_af_less_than, policy),
        gnomad_af_gt: af_bound(input.gnomad_af_greater_than, policy),
        biallelic_only: input.biallelic_only.filter(|b| *b),
        impact: tokens(input.impact.as_deref(), Impact::from_token),
        btypes: tokens(input.biotype.as_deref(), BioType::from_token),
        ftypes: tokens(input.feature.as_deref(), FeatureType::from_token),
        vtypes: tokens(input.variant_type.as_deref(), VariantType::from_token),
        consequences: tokens(input.consequences.as_deref(), Consequence::from_token),
        am_class: tokens(input.alpha_missense.as_deref(), AlphaMissense::from_token),
        clnsgn: tokens(input.clin_significance.as_deref(), ClinSignificance::from_token),
    }
}

fn af_bound(value: Option<f32>, policy: &QueryPolicy) -> Option<f32> {
    value.filter(|v| {
        if policy.positive_af_only {
            *v > 0.0
        } else {
            *v >= 0.0
        }
    })
}

/// Resolve a comma-separated list, dropping unknown and repeated tokens.
fn tokens<T: Copy + PartialEq>(input: Option<&str>, resolve: fn(&str) -> Option<T>) -> Vec<T> {
    let mut values = Vec::new();
    for value in input.unwrap_or_default().split(',').filter_map(resolve) {
        if !values.contains(&value) {
            values.push(value);
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(input: AnnotationInput) -> AnnotationFilter {
        build_filter(&input, &QueryPolicy::default())
    }

    #[test]
    fn unknown_tokens_are_dropped() {
        let filter = build(AnnotationInput {
            impact: Some("HIGH,bogus,LOW".into()),
            ..Default::default()
        });
        assert_eq!(filter.impact, vec![Impact::High, Impact::Low]);
    }

    #[test]
    fn repeated_tokens_keep_first_position() {
        let filter = build(AnnotationInput {
            consequences: Some("stop_gained, missense_variant,STOP-GAINED".into()),
            ..Default::default()
        });
        assert_eq!(
            filter.consequences,
            vec![Consequence::StopGained, Consequence::MissenseVariant]
        );
    }

    #[test]
    fn zero_af_bound_is_not_a_constraint() {
        let filter = build(AnnotationInput {
            gnomad_af_less_than: Some(0.0),
            gnomad_af_greater_than: Some(-1.0),
            ..Default::default()
        });
        assert_eq!(filter.gnomad_af_lt, None);
        assert_eq!(filter.gnomad_af_gt, None);

        let filter = build(AnnotationInput {
            gnomad_af_less_than: Some(0.01),
            ..Default::default()
        });
        assert_eq!(filter.gnomad_af_lt, Some(0.01));
    }

    #[test]
    fn zero_af_bound_kept_when_policy_allows() {
        let policy = QueryPolicy {
            positive_af_only: false,
            ..QueryPolicy::default()
        };
        let input = AnnotationInput {
            gnomad_af_less_than: Some(0.0),
            gnomad_af_greater_than: Some(-0.5),
            ..Default::default()
        };
        let filter = build_filter(&input, &policy);
        assert_eq!(filter.gnomad_af_lt, Some(0.0));
        assert_eq!(filter.gnomad_af_gt, None);
    }

    #[test]
    fn biallelic_only_set_when_true() {
        let on = build(AnnotationInput {
            biallelic_only: Some(true),
            ..Default::default()
        });
        let off = build(AnnotationInput {
            biallelic_only: Some(false),
            ..Default::default()
        });
        assert_eq!(on.biallelic_only, Some(true));
        assert!(off.is_unrestricted());
    }

    #[test]
    fn empty_input_yields_unrestricted_filter() {
        let filter = build(AnnotationInput {
            impact: Some(String::new()),
            biotype: Some(" , ,".into()),
            ..Default::default()
        });
        assert!(filter.is_unrestricted());
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn filter_serializes_category_sets() {
        let filter = build(AnnotationInput {
            clin_significance: Some("benign,pathogenic".into()),
            alpha_missense: Some("likely_pathogenic".into()),
            feature: Some("transcript".into()),
            ..Default::default()
        });
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(json["clnsgn"], serde_json::json!(["CLNSIG_BENIGN", "PATHOGENIC"]));
        assert_eq!(json["amClass"], serde_json::json!(["LIKELY_PATHOGENIC"]));
        assert_eq!(json["ftypes"], serde_json::json!(["TRANSCRIPT"]));
        assert!(json.get("impact").is_none());
    }
}
