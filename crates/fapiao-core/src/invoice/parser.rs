//! Rule-based invoice parser assembling the final record.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::models::config::ExtractionConfig;
use crate::models::invoice::{Field, InvoiceRecord};

use super::rules::{
    corrections::correct_known_errors,
    fields::{trailing_amounts, FieldRules},
    matcher::MatchCandidate,
    normalize::{char_prefix, normalize},
    parties::{resolve_parties_with, EntityPair, PartyOptions, Tier},
    reconcile_amount, FieldExtractor,
};

/// A field whose value came from a fallback heuristic rather than labeled evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FallbackUse {
    /// Field that was filled.
    pub field: Field,
    /// Strategy or tier that produced it.
    pub source: String,
}

impl FallbackUse {
    fn new(field: Field, source: impl Into<String>) -> Self {
        Self {
            field,
            source: source.into(),
        }
    }
}

/// Result of invoice extraction.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Extracted record.
    pub record: InvoiceRecord,
    /// Fields recovered by fallback heuristics, for quality monitoring.
    pub fallbacks: Vec<FallbackUse>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl ExtractionResult {
    /// Whether any field relied on a fallback heuristic.
    pub fn used_fallback(&self) -> bool {
        !self.fallbacks.is_empty()
    }
}

/// Trait for invoice parsing.
pub trait InvoiceParser {
    /// Parse an invoice from raw text. Never fails: missing fields are empty.
    fn parse(&self, text: &str) -> ExtractionResult;
}

/// Invoice parser driven by ordered pattern strategies.
#[derive(Debug, Clone)]
pub struct RuleBasedParser {
    config: ExtractionConfig,
    rules: FieldRules,
}

impl RuleBasedParser {
    /// Create a new parser with default settings.
    pub fn new() -> Self {
        Self::with_config(ExtractionConfig::default())
    }

    /// Create a parser with the given extraction settings.
    pub fn with_config(config: ExtractionConfig) -> Self {
        let rules = FieldRules::new(&config);
        Self { config, rules }
    }

    /// Enable or disable OCR corrections.
    pub fn with_corrections(mut self, enabled: bool) -> Self {
        self.config.apply_ocr_corrections = enabled;
        self
    }

    /// Set the buyer/seller keyword window.
    pub fn with_context_window(mut self, window: usize) -> Self {
        self.config.party_context_window = window;
        self
    }

    /// Current settings.
    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    fn party_options(&self) -> PartyOptions {
        PartyOptions {
            positional_fallback: self.config.positional_party_fallback,
            context_window: self.config.party_context_window,
        }
    }

    fn extract_scalars(&self, text: &str, fallbacks: &mut Vec<FallbackUse>) -> InvoiceRecord {
        let mut take = |field: Field, found: Option<MatchCandidate>| -> String {
            match found {
                Some(candidate) => {
                    if candidate.fallback {
                        fallbacks.push(FallbackUse::new(field, candidate.strategy));
                    }
                    candidate.value().to_string()
                }
                None => String::new(),
            }
        };

        let invoice_number = take(Field::InvoiceNumber, self.rules.invoice_number.extract(text));
        let invoice_code = take(Field::InvoiceCode, self.rules.invoice_code.extract(text));
        let date = take(Field::Date, self.rules.date.extract(text));
        let total = take(Field::Total, self.rules.total.extract(text));

        let (amount, tax) = match self.rules.summary_line.extract(text) {
            Some(row) => (row.group(0).to_string(), row.group(1).to_string()),
            None => (String::new(), String::new()),
        };

        InvoiceRecord {
            invoice_number,
            invoice_code,
            date,
            total,
            amount,
            tax,
            ..InvoiceRecord::default()
        }
    }

    /// Fill amount/tax from table figures when the summary row was not found.
    fn amounts_fallback(
        &self,
        text: &str,
        record: InvoiceRecord,
        fallbacks: &mut Vec<FallbackUse>,
    ) -> InvoiceRecord {
        if !record.amount.is_empty() && !record.tax.is_empty() {
            return record;
        }

        let mut record = record;
        let mut tax_from_trailing = false;

        if self.config.trailing_amounts_fallback {
            if let Some((amount, tax)) = trailing_amounts(text) {
                if record.amount.is_empty() {
                    fallbacks.push(FallbackUse::new(Field::Amount, "trailing_amounts"));
                    record.amount = amount;
                }
                if record.tax.is_empty() {
                    record.tax = tax;
                    tax_from_trailing = true;
                }
            }
        }

        if record.tax.is_empty() || tax_from_trailing {
            if let Some(labeled) = self.rules.labeled_tax.extract(text) {
                record.tax = labeled.value().to_string();
                tax_from_trailing = false;
            }
        }

        if tax_from_trailing {
            fallbacks.push(FallbackUse::new(Field::Tax, "trailing_amounts"));
        }

        record
    }

    fn apply_parties(
        record: InvoiceRecord,
        buyer: EntityPair,
        seller: EntityPair,
        fallbacks: &mut Vec<FallbackUse>,
    ) -> InvoiceRecord {
        let mut report = |field: Field, tier: Option<Tier>| {
            if let Some(tier) = tier.filter(Tier::is_fallback) {
                fallbacks.push(FallbackUse::new(field, format!("{tier:?}").to_lowercase()));
            }
        };
        report(Field::Buyer, buyer.name_tier);
        report(Field::BuyerTaxId, buyer.tax_id_tier);
        report(Field::Seller, seller.name_tier);
        report(Field::SellerTaxId, seller.tax_id_tier);

        InvoiceRecord {
            buyer: buyer.name,
            buyer_tax_id: buyer.tax_id,
            seller: seller.name,
            seller_tax_id: seller.tax_id,
            ..record
        }
    }
}

impl Default for RuleBasedParser {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceParser for RuleBasedParser {
    fn parse(&self, text: &str) -> ExtractionResult {
        let start = Instant::now();
        let mut fallbacks = Vec::new();

        let clean = normalize(text);
        info!("Parsing invoice from {} characters of text", clean.chars().count());

        if clean.is_empty() {
            return ExtractionResult {
                record: InvoiceRecord::empty(),
                fallbacks,
                processing_time_ms: start.elapsed().as_millis() as u64,
            };
        }

        let record = self.extract_scalars(&clean, &mut fallbacks);
        let record = self.amounts_fallback(&clean, record, &mut fallbacks);

        let parties = resolve_parties_with(&clean, &self.party_options());
        let record = Self::apply_parties(record, parties.buyer, parties.seller, &mut fallbacks);

        let record = if self.config.apply_ocr_corrections {
            correct_known_errors(record)
        } else {
            record
        };

        let record = reconcile_amount(record);

        let record = InvoiceRecord {
            raw_text_sample: char_prefix(&clean, self.config.raw_text_sample_len).to_string(),
            ..record
        };

        if !fallbacks.is_empty() {
            debug!("Fallback heuristics used: {:?}", fallbacks);
        }
        debug!(
            "Extracted invoice {:?}, {} fields missing",
            record.invoice_number,
            record.missing_fields().len()
        );

        ExtractionResult {
            record,
            fallbacks,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

/// Extract an invoice record from raw text with default settings.
pub fn extract_invoice_info(raw_text: &str) -> InvoiceRecord {
    RuleBasedParser::new().parse(raw_text).record
}
