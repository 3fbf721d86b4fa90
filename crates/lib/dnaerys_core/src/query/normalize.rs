// @zen-component: VQ-Normalizer
//
//! Parameter normalization.
//!
//! Turns raw, optional tool inputs into region, length and pagination
//! values the store can always accept. Invalid regions are rejected with a
//! [`QueryError`] so the dispatcher can short-circuit before any remote
//! call; contradictory or out-of-range optional bounds are clamped instead.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize, Serializer};

use super::QueryError;

/// Largest page a list-returning operation ever requests.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Wire encoding of an unbounded maximum variant length.
pub const UNBOUNDED_LENGTH: i32 = i32::MAX;

/// Reference genome assembly the coordinates refer to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefAssembly {
    #[serde(rename = "GRCh37")]
    Grch37,
    #[default]
    #[serde(rename = "GRCh38")]
    Grch38,
}

impl std::str::FromStr for RefAssembly {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grch37" | "hg19" => Ok(Self::Grch37),
            "grch38" | "hg38" => Ok(Self::Grch38),
            other => Err(format!("unknown assembly: {other}")),
        }
    }
}

/// A contig of the human reference: autosomes 1-22, X, Y and the
/// mitochondrial genome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chromosome {
    Chr(u8),
    X,
    Y,
    Mt,
}

impl Chromosome {
    /// Resolve a user-supplied contig token.
    ///
    /// Accepts `1`..`22`, `X`, `Y`, `MT` (or `M`), case-insensitively and
    /// with an optional `chr` prefix. Anything else is unrecognized.
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim().to_ascii_uppercase();
        let name = token.strip_prefix("CHR").unwrap_or(token.as_str());
        match name {
            "X" => Some(Self::X),
            "Y" => Some(Self::Y),
            "M" | "MT" => Some(Self::Mt),
            // Reject "01" and "+1", which `parse` would accept.
            n if n.starts_with('0') || !n.bytes().all(|b| b.is_ascii_digit()) => None,
            n => match n.parse::<u8>() {
                Ok(i @ 1..=22) => Some(Self::Chr(i)),
                _ => None,
            },
        }
    }

    /// Canonical name as sent to the store.
    pub fn name(&self) -> String {
        match self {
            Self::Chr(i) => i.to_string(),
            Self::X => "X".into(),
            Self::Y => "Y".into(),
            Self::Mt => "MT".into(),
        }
    }
}

impl Serialize for Chromosome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

impl std::fmt::Display for Chromosome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

/// Knobs for the two lenient policies applied during normalization.
///
/// The defaults reproduce the store client's established behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPolicy {
    /// When `max < min` after defaulting: reset both to the unrestricted
    /// range (`true`) or void the whole query (`false`).
    pub reset_contradictory_lengths: bool,
    /// Treat an allele-frequency bound of 0 as "no constraint" (`true`),
    /// or send any non-negative bound as given (`false`).
    pub positive_af_only: bool,
    /// Assembly every region request refers to.
    pub assembly: RefAssembly,
}

impl Default for QueryPolicy {
    fn default() -> Self {
        Self {
            reset_contradictory_lengths: true,
            positive_af_only: true,
            assembly: RefAssembly::Grch38,
        }
    }
}

/// Raw region parameters as supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegionInput {
    /// Chromosome ID, in a form of 1, 2, ..., 22, X, Y, MT.
    pub chromosome: String,
    /// Start of region.
    pub start: i64,
    /// End of region.
    pub end: i64,
    /// Reference allele bases (REF).
    #[serde(default)]
    pub ref_allele: Option<String>,
    /// Alternative allele bases (ALT).
    #[serde(default)]
    pub alt_allele: Option<String>,
    /// Minimal variant length.
    #[serde(default)]
    pub variant_min_length: Option<i32>,
    /// Maximal variant length.
    #[serde(default)]
    pub variant_max_length: Option<i32>,
}

impl RegionInput {
    pub fn new(chromosome: impl Into<String>, start: i64, end: i64) -> Self {
        Self {
            chromosome: chromosome.into(),
            start,
            end,
            ..Self::default()
        }
    }
}

/// Variant length bounds; `max == None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthBounds {
    pub min: u32,
    pub max: Option<u32>,
}

impl LengthBounds {
    pub const UNRESTRICTED: Self = Self { min: 0, max: None };

    /// Wire encoding: `(min, max)` with unbounded as [`UNBOUNDED_LENGTH`].
    pub fn to_wire(self) -> (i32, i32) {
        let clamp = |v: u32| i32::try_from(v).unwrap_or(UNBOUNDED_LENGTH);
        (clamp(self.min), self.max.map_or(UNBOUNDED_LENGTH, clamp))
    }
}

/// A validated region, ready to be placed in a store request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSpec {
    pub chromosome: Chromosome,
    pub start: u64,
    pub end: u64,
    /// Empty means any reference bases.
    pub reference: String,
    /// Empty means any alternate bases.
    pub alternate: String,
    pub lengths: LengthBounds,
}

/// Validate and default a region.
///
/// Fails when `start < 0`, `end < start` or the chromosome is not a
/// recognized contig. Allele and length defaults never fail, except for
/// contradictory lengths under a rejecting [`QueryPolicy`].
pub fn normalize_region(input: &RegionInput, policy: &QueryPolicy) -> Result<RegionSpec, QueryError> {
    if input.start < 0 || input.end < input.start {
        return Err(QueryError::InvalidRegion {
            start: input.start,
            end: input.end,
        });
    }

    let chromosome = Chromosome::from_token(&input.chromosome)
        .ok_or_else(|| QueryError::UnknownChromosome(input.chromosome.clone()))?;

    let lengths = normalize_lengths(input.variant_min_length, input.variant_max_length, policy)?;

    Ok(RegionSpec {
        chromosome,
        start: input.start as u64,
        end: input.end as u64,
        reference: input.ref_allele.clone().unwrap_or_default(),
        alternate: input.alt_allele.clone().unwrap_or_default(),
        lengths,
    })
}

/// Default and reconcile variant length bounds.
///
/// Absent or non-positive bounds mean "unrestricted" on that side. A
/// `max` below `min` is ignored as a whole (both sides reset) unless the
/// policy asks for rejection.
pub fn normalize_lengths(
    min: Option<i32>,
    max: Option<i32>,
    policy: &QueryPolicy,
) -> Result<LengthBounds, QueryError> {
    let min = min.filter(|v| *v > 0).map_or(0, |v| v as u32);
    let max = max.filter(|v| *v > 0).map(|v| v as u32);

    match max {
        Some(m) if m < min => {
            if policy.reset_contradictory_lengths {
                Ok(LengthBounds::UNRESTRICTED)
            } else {
                Err(QueryError::ContradictoryLengths { min, max: m })
            }
        }
        _ => Ok(LengthBounds { min, max }),
    }
}

/// Raw pagination parameters as supplied by a caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageInput {
    /// Number of items to be skipped in returned result.
    #[serde(default)]
    pub skip: Option<i32>,
    /// Limit items in returned result (max 100).
    #[serde(default)]
    pub limit: Option<i32>,
}

/// Normalized pagination: `skip >= 0`, `1 <= limit <= 100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationSpec {
    pub skip: u32,
    pub limit: u32,
}

impl PaginationSpec {
    pub fn normalize(skip: Option<i32>, limit: Option<i32>) -> Self {
        let skip = skip.filter(|s| *s >= 0).map_or(0, |s| s as u32);
        let limit = limit
            .filter(|l| *l > 0 && *l as u32 <= MAX_PAGE_SIZE)
            .map_or(MAX_PAGE_SIZE, |l| l as u32);
        Self { skip, limit }
    }
}

impl From<&PageInput> for PaginationSpec {
    fn from(page: &PageInput) -> Self {
        Self::normalize(page.skip, page.limit)
    }
}

/// Which genotype states a region query matches.
///
/// Only the three meaningful combinations can be constructed; a query
/// that selects neither zygosity cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zygosity {
    hom: bool,
    het: bool,
}

impl Zygosity {
    /// Homozygous or heterozygous.
    pub const ANY: Self = Self { hom: true, het: true };
    pub const HOM: Self = Self { hom: true, het: false };
    pub const HET: Self = Self { hom: false, het: true };

    pub fn hom(self) -> bool {
        self.hom
    }

    pub fn het(self) -> bool {
        self.het
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(chr: &str, start: i64, end: i64) -> RegionInput {
        RegionInput::new(chr, start, end)
    }

    #[test]
    fn chromosome_tokens_resolve_case_insensitively() {
        assert_eq!(Chromosome::from_token("1"), Some(Chromosome::Chr(1)));
        assert_eq!(Chromosome::from_token("22"), Some(Chromosome::Chr(22)));
        assert_eq!(Chromosome::from_token("chr7"), Some(Chromosome::Chr(7)));
        assert_eq!(Chromosome::from_token(" x "), Some(Chromosome::X));
        assert_eq!(Chromosome::from_token("ChrY"), Some(Chromosome::Y));
        assert_eq!(Chromosome::from_token("mt"), Some(Chromosome::Mt));
        assert_eq!(Chromosome::from_token("chrM"), Some(Chromosome::Mt));
    }

    #[test]
    fn chromosome_rejects_unknown_contigs() {
        for token in ["23", "0", "01", "+1", "", "chr", "Z", "1_KI270706v1_random"] {
            assert_eq!(Chromosome::from_token(token), None, "token {token:?}");
        }
    }

    #[test]
    fn chromosome_serializes_canonical_name() {
        assert_eq!(serde_json::to_value(Chromosome::Chr(3)).unwrap(), "3");
        assert_eq!(serde_json::to_value(Chromosome::Mt).unwrap(), "MT");
    }

    #[test]
    fn negative_start_voids_region() {
        let err = normalize_region(&region("1", -1, 10), &QueryPolicy::default()).unwrap_err();
        assert!(matches!(err, QueryError::InvalidRegion { start: -1, end: 10 }));
    }

    #[test]
    fn end_before_start_voids_region() {
        let err = normalize_region(&region("1", 10, 5), &QueryPolicy::default()).unwrap_err();
        assert!(matches!(err, QueryError::InvalidRegion { .. }));
    }

    #[test]
    fn unknown_chromosome_voids_region() {
        let err = normalize_region(&region("23", 1, 5), &QueryPolicy::default()).unwrap_err();
        assert!(matches!(err, QueryError::UnknownChromosome(ref c) if c == "23"));
    }

    #[test]
    fn point_region_is_valid_and_alleles_default_to_any() {
        let spec = normalize_region(&region("X", 5, 5), &QueryPolicy::default()).unwrap();
        assert_eq!(spec.chromosome, Chromosome::X);
        assert_eq!((spec.start, spec.end), (5, 5));
        assert_eq!(spec.reference, "");
        assert_eq!(spec.alternate, "");
        assert_eq!(spec.lengths, LengthBounds::UNRESTRICTED);
    }

    #[test]
    fn contradictory_lengths_reset_to_unrestricted() {
        let policy = QueryPolicy::default();
        assert_eq!(
            normalize_lengths(Some(50), Some(10), &policy).unwrap(),
            LengthBounds::UNRESTRICTED
        );
        assert_eq!(
            normalize_lengths(Some(10), Some(50), &policy).unwrap(),
            LengthBounds {
                min: 10,
                max: Some(50)
            }
        );
    }

    #[test]
    fn non_positive_lengths_mean_unbounded() {
        let policy = QueryPolicy::default();
        assert_eq!(
            normalize_lengths(Some(-4), Some(0), &policy).unwrap(),
            LengthBounds::UNRESTRICTED
        );
        assert_eq!(
            normalize_lengths(Some(7), None, &policy).unwrap(),
            LengthBounds { min: 7, max: None }
        );
    }

    #[test]
    fn contradictory_lengths_rejected_when_policy_says_so() {
        let policy = QueryPolicy {
            reset_contradictory_lengths: false,
            ..QueryPolicy::default()
        };
        let err = normalize_lengths(Some(50), Some(10), &policy).unwrap_err();
        assert!(matches!(err, QueryError::ContradictoryLengths { min: 50, max: 10 }));
    }

    #[test]
    fn length_bounds_wire_encoding() {
        assert_eq!(LengthBounds::UNRESTRICTED.to_wire(), (0, UNBOUNDED_LENGTH));
        assert_eq!(
            LengthBounds {
                min: 3,
                max: Some(9)
            }
            .to_wire(),
            (3, 9)
        );
    }

    #[test]
    fn pagination_defaults_and_clamps() {
        assert_eq!(
            PaginationSpec::normalize(Some(-3), Some(500)),
            PaginationSpec { skip: 0, limit: 100 }
        );
        assert_eq!(
            PaginationSpec::normalize(None, None),
            PaginationSpec { skip: 0, limit: 100 }
        );
        assert_eq!(
            PaginationSpec::normalize(Some(20), Some(0)),
            PaginationSpec { skip: 20, limit: 100 }
        );
        assert_eq!(
            PaginationSpec::normalize(Some(5), Some(100)),
            PaginationSpec { skip: 5, limit: 100 }
        );
        assert_eq!(
            PaginationSpec::normalize(Some(0), Some(1)),
            PaginationSpec { skip: 0, limit: 1 }
        );
    }

    #[test]
    fn zygosity_constants() {
        assert!(Zygosity::ANY.hom() && Zygosity::ANY.het());
        assert!(Zygosity::HOM.hom() && !Zygosity::HOM.het());
        assert!(!Zygosity::HET.hom() && Zygosity::HET.het());
    }

    #[test]
    fn assembly_parses_aliases() {
        assert_eq!("hg19".parse::<RefAssembly>(), Ok(RefAssembly::Grch37));
        assert_eq!("GRCh38".parse::<RefAssembly>(), Ok(RefAssembly::Grch38));
        assert!("mm10".parse::<RefAssembly>().is_err());
    }
}
