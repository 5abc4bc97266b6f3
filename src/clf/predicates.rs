//! Predicates that select the variants an [`AlleleCounter`](super::AlleleCounter) counts
use std::sync::Arc;

use crate::model::{Variant, VariantEffect};

/// Tests a single [`Variant`]
pub trait VariantPredicate: Send + Sync {
    fn name(&self) -> &str;

    /// Human readable description, e.g. `Affects ABC1`
    fn description(&self) -> &str;

    /// Returns `true` if the variant matches
    fn test(&self, variant: &Variant) -> bool;
}

/// Matches a variant by its key, e.g. `12_56004589_C_G`
#[derive(Debug, Clone)]
pub struct VariantKeyPredicate {
    key: String,
    description: String,
}

impl VariantKeyPredicate {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            description: format!("Variant is {key}"),
        }
    }
}

impl VariantPredicate for VariantKeyPredicate {
    fn name(&self) -> &str {
        &self.key
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn test(&self, variant: &Variant) -> bool {
        variant.key() == self.key
    }
}

/// Matches all variants that affect a gene
///
/// # Examples
///
/// ```
/// use genophenocorr::clf::predicates::{GenePredicate, VariantPredicate};
/// use genophenocorr::model::{Genotype, Variant};
///
/// let predicate = GenePredicate::new("SLC9A5");
/// let variant = Variant::new("12_56004589_C_G", Genotype::Heterozygous).with_gene("SLC9A5");
/// assert!(predicate.test(&variant));
/// assert_eq!(predicate.description(), "Affects SLC9A5");
/// ```
#[derive(Debug, Clone)]
pub struct GenePredicate {
    symbol: String,
    description: String,
}

impl GenePredicate {
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            description: format!("Affects {symbol}"),
        }
    }
}

impl VariantPredicate for GenePredicate {
    fn name(&self) -> &str {
        &self.symbol
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn test(&self, variant: &Variant) -> bool {
        variant.affects_gene(&self.symbol)
    }
}

/// Matches all variants with the given predicted effect
#[derive(Debug, Clone)]
pub struct EffectPredicate {
    effect: VariantEffect,
    name: String,
    description: String,
}

impl EffectPredicate {
    pub fn new(effect: VariantEffect) -> Self {
        Self {
            effect,
            name: effect.to_string(),
            description: format!("Is {effect}"),
        }
    }
}

impl VariantPredicate for EffectPredicate {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn test(&self, variant: &Variant) -> bool {
        variant.has_effect(self.effect)
    }
}

/// Matches every variant the inner predicate does not match
pub struct InvertedPredicate {
    inner: Arc<dyn VariantPredicate>,
    name: String,
    description: String,
}

impl InvertedPredicate {
    pub fn new(inner: Arc<dyn VariantPredicate>) -> Self {
        let name = format!("NOT {}", inner.name());
        let description = format!("NOT ({})", inner.description());
        Self {
            inner,
            name,
            description,
        }
    }
}

impl VariantPredicate for InvertedPredicate {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn test(&self, variant: &Variant) -> bool {
        !self.inner.test(variant)
    }
}
