//! Fixed annotation vocabularies.
//!
//! Each category is a table of accepted tokens (primary term first, then
//! aliases) mapping to an enum value. Adding a term means adding a table
//! row; lookup code never changes.

use serde::{Serialize, Serializer};

/// Canonicalize a free-text token for table lookup.
fn canonical(token: &str) -> String {
    token
        .trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}

/// Resolve a token against a vocabulary table. `None` is "unrecognized".
pub fn lookup<T: Copy>(terms: &[(&str, T)], token: &str) -> Option<T> {
    let token = canonical(token);
    if token.is_empty() {
        return None;
    }
    terms
        .iter()
        .find(|(term, _)| *term == token)
        .map(|(_, value)| *value)
}

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $variant:ident => [$primary:literal $(, $alias:literal)* $(,)?] ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $variant ),+
        }

        impl $name {
            /// Accepted tokens, primary term first for each value.
            pub const TERMS: &'static [(&'static str, Self)] = &[
                $( ($primary, Self::$variant), $( ($alias, Self::$variant), )* )+
            ];

            /// Resolve a free-text token; `None` if it is not in the vocabulary.
            pub fn from_token(token: &str) -> Option<Self> {
                lookup(Self::TERMS, token)
            }

            /// Primary term, as sent to the store.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $primary ),+
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

vocabulary! {
    /// VEP impact rating.
    Impact {
        High => ["HIGH"],
        Moderate => ["MODERATE"],
        Low => ["LOW"],
        Modifier => ["MODIFIER"],
    }
}

vocabulary! {
    /// VEP transcript biotype.
    BioType {
        ProcessedTranscript => ["PROCESSED_TRANSCRIPT"],
        Lncrna => ["LNCRNA"],
        Antisense => ["ANTISENSE"],
        MacroLncrna => ["MACRO_LNCRNA"],
        NonCoding => ["NON_CODING"],
        RetainedIntron => ["RETAINED_INTRON"],
        SenseIntronic => ["SENSE_INTRONIC"],
        SenseOverlapping => ["SENSE_OVERLAPPING"],
        Lincrna => ["LINCRNA"],
        Ncrna => ["NCRNA"],
        Mirna => ["MIRNA"],
        Miscrna => ["MISCRNA", "MISC_RNA"],
        Pirna => ["PIRNA"],
        Rrna => ["RRNA"],
        Sirna => ["SIRNA"],
        Snrna => ["SNRNA"],
        Snorna => ["SNORNA"],
        Trna => ["TRNA"],
        Vaultrna => ["VAULTRNA"],
        ProteinCoding => ["PROTEIN_CODING"],
        Pseudogene => ["PSEUDOGENE"],
        IgPseudogene => ["IG_PSEUDOGENE"],
        Readthrough => ["READTHROUGH"],
        StopCodonReadthrough => ["STOP_CODON_READTHROUGH"],
        Tec => ["TEC"],
        TrGene => ["TR_GENE"],
        IgGene => ["IG_GENE"],
        NonsenseMediatedDecay => ["NONSENSE_MEDIATED_DECAY"],
    }
}

vocabulary! {
    /// VEP feature type the consequence was computed against.
    FeatureType {
        Transcript => ["TRANSCRIPT"],
        RegulatoryFeature => ["REGULATORYFEATURE", "REGULATORY_FEATURE"],
        MotifFeature => ["MOTIFFEATURE", "MOTIF_FEATURE"],
    }
}

vocabulary! {
    /// Sequence Ontology variant class.
    VariantType {
        Snv => ["SNV"],
        Insertion => ["INSERTION"],
        Deletion => ["DELETION"],
        Indel => ["INDEL"],
        Substitution => ["SUBSTITUTION"],
        Inversion => ["INVERSION"],
        Translocation => ["TRANSLOCATION"],
        Duplication => ["DUPLICATION"],
        SequenceAlteration => ["SEQUENCE_ALTERATION"],
    }
}

vocabulary! {
    /// Sequence Ontology variant consequence.
    Consequence {
        TranscriptAblation => ["TRANSCRIPT_ABLATION"],
        SpliceAcceptorVariant => ["SPLICE_ACCEPTOR_VARIANT"],
        SpliceDonorVariant => ["SPLICE_DONOR_VARIANT"],
        StopGained => ["STOP_GAINED"],
        FrameshiftVariant => ["FRAMESHIFT_VARIANT"],
        StopLost => ["STOP_LOST"],
        StartLost => ["START_LOST"],
        TranscriptAmplification => ["TRANSCRIPT_AMPLIFICATION"],
        InframeInsertion => ["INFRAME_INSERTION"],
        InframeDeletion => ["INFRAME_DELETION"],
        MissenseVariant => ["MISSENSE_VARIANT"],
        ProteinAlteringVariant => ["PROTEIN_ALTERING_VARIANT"],
        SpliceRegionVariant => ["SPLICE_REGION_VARIANT"],
        IncompleteTerminalCodonVariant => ["INCOMPLETE_TERMINAL_CODON_VARIANT"],
        StartRetainedVariant => ["START_RETAINED_VARIANT"],
        StopRetainedVariant => ["STOP_RETAINED_VARIANT"],
        SynonymousVariant => ["SYNONYMOUS_VARIANT"],
        CodingSequenceVariant => ["CODING_SEQUENCE_VARIANT"],
        MatureMirnaVariant => ["MATURE_MIRNA_VARIANT"],
        FivePrimeUtrVariant => ["FIVE_PRIME_UTR_VARIANT", "5_PRIME_UTR_VARIANT"],
        ThreePrimeUtrVariant => ["THREE_PRIME_UTR_VARIANT", "3_PRIME_UTR_VARIANT"],
        NonCodingTranscriptExonVariant => ["NON_CODING_TRANSCRIPT_EXON_VARIANT"],
        IntronVariant => ["INTRON_VARIANT"],
        NmdTranscriptVariant => ["NMD_TRANSCRIPT_VARIANT"],
        NonCodingTranscriptVariant => ["NON_CODING_TRANSCRIPT_VARIANT"],
        UpstreamGeneVariant => ["UPSTREAM_GENE_VARIANT"],
        DownstreamGeneVariant => ["DOWNSTREAM_GENE_VARIANT"],
        TfbsAblation => ["TFBS_ABLATION"],
        TfbsAmplification => ["TFBS_AMPLIFICATION"],
        TfBindingSiteVariant => ["TF_BINDING_SITE_VARIANT"],
        RegulatoryRegionAblation => ["REGULATORY_REGION_ABLATION"],
        RegulatoryRegionAmplification => ["REGULATORY_REGION_AMPLIFICATION"],
        FeatureElongation => ["FEATURE_ELONGATION"],
        RegulatoryRegionVariant => ["REGULATORY_REGION_VARIANT"],
        FeatureTruncation => ["FEATURE_TRUNCATION"],
        IntergenicVariant => ["INTERGENIC_VARIANT"],
        SplicePolypyrimidineTractVariant => ["SPLICE_POLYPYRIMIDINE_TRACT_VARIANT"],
        SpliceDonor5thBaseVariant => ["SPLICE_DONOR_5TH_BASE_VARIANT"],
        SpliceDonorRegionVariant => ["SPLICE_DONOR_REGION_VARIANT"],
        CodingTranscriptVariant => ["CODING_TRANSCRIPT_VARIANT"],
        SequenceVariant => ["SEQUENCE_VARIANT"],
    }
}

vocabulary! {
    /// AlphaMissense pathogenicity class.
    AlphaMissense {
        LikelyBenign => ["LIKELY_BENIGN"],
        LikelyPathogenic => ["LIKELY_PATHOGENIC"],
        Ambiguous => ["AMBIGUOUS"],
    }
}

vocabulary! {
    /// ClinVar clinical significance.
    ClinSignificance {
        Benign => ["CLNSIG_BENIGN", "BENIGN"],
        LikelyBenign => ["LIKELY_BENIGN"],
        UncertainSignificance => ["UNCERTAIN_SIGNIFICANCE"],
        LikelyPathogenic => ["LIKELY_PATHOGENIC"],
        Pathogenic => ["PATHOGENIC"],
        DrugResponse => ["DRUG_RESPONSE"],
        Association => ["ASSOCIATION"],
        RiskFactor => ["RISK_FACTOR"],
        Protective => ["PROTECTIVE"],
        Affects => ["AFFECTS"],
        ConfersSensitivity => ["CONFERS_SENSITIVITY"],
        ConflictingInterpretations => [
            "CONFLICTING_INTERPRETATIONS",
            "CONFLICTING_INTERPRETATIONS_OF_PATHOGENICITY",
        ],
        LikelyPathogenicLowPenetrance => ["LIKELY_PATHOGENIC_LOW_PENETRANCE"],
        PathogenicLowPenetrance => ["PATHOGENIC_LOW_PENETRANCE"],
        UncertainRiskAllele => ["UNCERTAIN_RISK_ALLELE"],
        LikelyRiskAllele => ["LIKELY_RISK_ALLELE"],
        EstablishedRiskAllele => ["ESTABLISHED_RISK_ALLELE"],
    }
}
