//! Rule-based field extractors for Chinese VAT invoices.

pub mod amounts;
pub mod corrections;
pub mod fields;
pub mod matcher;
pub mod normalize;
pub mod parties;
pub mod patterns;

pub use amounts::{format_amount, parse_amount, reconcile_amount};
pub use corrections::{correct_known_errors, Substitution, SUBSTITUTIONS};
pub use fields::{trailing_amounts, FieldRules};
pub use matcher::{extract_field, FieldRule, MatchCandidate, Selection, Strategy};
pub use normalize::{normalize, normalize_opt};
pub use parties::{
    resolve_parties, resolve_parties_with, EntityPair, Parties, PartyOptions, Role, Tier,
};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;
}
