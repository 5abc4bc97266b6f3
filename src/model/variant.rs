use std::fmt::Display;

/// The genotype of a patient at the variant locus
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Genotype {
    /// The genotype could not be determined
    NoCall,
    /// Two reference alleles
    HomozygousReference,
    /// One reference and one alternate allele
    Heterozygous,
    /// Two alternate alleles
    HomozygousAlternate,
    /// A single alternate allele on a hemizygous locus (e.g. X chromosome in males)
    Hemizygous,
}

/// Sequence Ontology terms describing the consequence of a variant
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VariantEffect {
    TranscriptAblation,
    SpliceAcceptorVariant,
    SpliceDonorVariant,
    StopGained,
    FrameshiftVariant,
    StopLost,
    StartLost,
    InframeInsertion,
    InframeDeletion,
    MissenseVariant,
    SpliceRegionVariant,
    SynonymousVariant,
    FivePrimeUtrVariant,
    ThreePrimeUtrVariant,
    IntronVariant,
}

impl Display for VariantEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            VariantEffect::TranscriptAblation => "transcript_ablation",
            VariantEffect::SpliceAcceptorVariant => "splice_acceptor_variant",
            VariantEffect::SpliceDonorVariant => "splice_donor_variant",
            VariantEffect::StopGained => "stop_gained",
            VariantEffect::FrameshiftVariant => "frameshift_variant",
            VariantEffect::StopLost => "stop_lost",
            VariantEffect::StartLost => "start_lost",
            VariantEffect::InframeInsertion => "inframe_insertion",
            VariantEffect::InframeDeletion => "inframe_deletion",
            VariantEffect::MissenseVariant => "missense_variant",
            VariantEffect::SpliceRegionVariant => "splice_region_variant",
            VariantEffect::SynonymousVariant => "synonymous_variant",
            VariantEffect::FivePrimeUtrVariant => "5_prime_UTR_variant",
            VariantEffect::ThreePrimeUtrVariant => "3_prime_UTR_variant",
            VariantEffect::IntronVariant => "intron_variant",
        };
        write!(f, "{label}")
    }
}

/// A variant found in a patient, together with the patient's genotype
///
/// # Examples
///
/// ```
/// use genophenocorr::model::{Genotype, Variant, VariantEffect};
///
/// let variant = Variant::new("12_56004589_C_G", Genotype::Heterozygous)
///     .with_gene("SLC9A5")
///     .with_effect(VariantEffect::MissenseVariant);
///
/// assert_eq!(variant.key(), "12_56004589_C_G");
/// assert!(variant.affects_gene("SLC9A5"));
/// assert!(variant.has_effect(VariantEffect::MissenseVariant));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variant {
    key: String,
    genes: Vec<String>,
    effects: Vec<VariantEffect>,
    genotype: Genotype,
}

impl Variant {
    /// Constructs a new `Variant` without gene or effect annotations
    pub fn new(key: &str, genotype: Genotype) -> Self {
        Self {
            key: key.to_string(),
            genes: Vec::new(),
            effects: Vec::new(),
            genotype,
        }
    }

    /// Adds an affected gene symbol
    #[must_use]
    pub fn with_gene(mut self, symbol: &str) -> Self {
        self.genes.push(symbol.to_string());
        self
    }

    /// Adds a predicted effect
    #[must_use]
    pub fn with_effect(mut self, effect: VariantEffect) -> Self {
        if !self.effects.contains(&effect) {
            self.effects.push(effect);
        }
        self
    }

    /// A unique key of the variant, e.g. `chrom_pos_ref_alt`
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Symbols of the genes affected by the variant
    pub fn genes(&self) -> &[String] {
        &self.genes
    }

    /// Predicted effects of the variant
    pub fn effects(&self) -> &[VariantEffect] {
        &self.effects
    }

    /// The genotype of the patient carrying the variant
    pub fn genotype(&self) -> Genotype {
        self.genotype
    }

    pub fn affects_gene(&self, symbol: &str) -> bool {
        self.genes.iter().any(|gene| gene == symbol)
    }

    pub fn has_effect(&self, effect: VariantEffect) -> bool {
        self.effects.contains(&effect)
    }
}
