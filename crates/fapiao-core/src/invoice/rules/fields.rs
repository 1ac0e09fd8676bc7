//! Strategy tables for the scalar invoice fields.

use crate::models::config::ExtractionConfig;

use super::matcher::{FieldRule, Selection, Strategy};
use super::patterns::*;

/// All scalar field rules, built once per parser.
#[derive(Debug, Clone)]
pub struct FieldRules {
    pub invoice_number: FieldRule,
    pub invoice_code: FieldRule,
    pub date: FieldRule,
    pub total: FieldRule,
    /// Summary row yielding (amount, tax).
    pub summary_line: FieldRule,
    /// Labeled tax figure, used when the summary row is missing.
    pub labeled_tax: FieldRule,
}

impl FieldRules {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            invoice_number: invoice_number_rule()
                .fallbacks_enabled(config.invoice_number_fallback),
            invoice_code: invoice_code_rule(),
            date: date_rule(),
            total: total_rule(),
            summary_line: summary_line_rule(),
            labeled_tax: labeled_tax_rule(),
        }
    }
}

impl Default for FieldRules {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

pub fn invoice_number_rule() -> FieldRule {
    FieldRule::new(
        "invoiceNumber",
        Selection::FirstMatch,
        vec![
            Strategy::labeled("invoice_number", &INVOICE_NUMBER, 1),
            Strategy::labeled("invoice_number_short", &INVOICE_NUMBER_SHORT, 1),
            Strategy::labeled("invoice_number_loose", &INVOICE_NUMBER_LOOSE, 1),
            Strategy::fallback("long_digit_run", &LONG_DIGIT_RUN, 1),
        ],
    )
}

pub fn invoice_code_rule() -> FieldRule {
    FieldRule::new(
        "invoiceCode",
        Selection::FirstMatch,
        vec![Strategy::labeled("invoice_code", &INVOICE_CODE, 1)],
    )
}

pub fn date_rule() -> FieldRule {
    FieldRule::new(
        "date",
        Selection::FirstMatch,
        vec![
            Strategy::labeled("issue_date", &ISSUE_DATE, 1),
            Strategy::labeled("issue_date_short", &ISSUE_DATE_SHORT, 1),
            Strategy::fallback("date_cn", &DATE_CN, 1),
            Strategy::fallback("date_cn_spaced", &DATE_CN_SPACED, 1),
            Strategy::labeled("issue_date_ocr", &ISSUE_DATE_OCR, 1),
            Strategy::labeled("issue_date_ocr_spaced", &ISSUE_DATE_OCR_SPACED, 1),
            Strategy::fallback("date_cn_ocr", &DATE_CN_OCR, 1),
            Strategy::fallback("date_cn_ocr_spaced", &DATE_CN_OCR_SPACED, 1),
        ],
    )
}

pub fn total_rule() -> FieldRule {
    FieldRule::new(
        "total",
        Selection::FirstMatch,
        vec![
            Strategy::labeled("total_gross", &TOTAL_GROSS, 1),
            Strategy::labeled("total_gross_paren", &TOTAL_GROSS_PAREN, 1),
            Strategy::labeled("total_gross_loose", &TOTAL_GROSS_LOOSE, 1),
            Strategy::labeled("total_gross_bare", &TOTAL_GROSS_BARE, 1),
        ],
    )
}

pub fn summary_line_rule() -> FieldRule {
    FieldRule::new(
        "amount+tax",
        Selection::LastMatch,
        vec![
            Strategy::labeled("summary_line", &SUMMARY_LINE, 1).with_groups(&[1, 2]),
            Strategy::labeled("summary_line_currency", &SUMMARY_LINE_CURRENCY, 1)
                .with_groups(&[1, 2]),
            Strategy::labeled("summary_line_plain", &SUMMARY_LINE_PLAIN, 1).with_groups(&[1, 2]),
        ],
    )
}

pub fn labeled_tax_rule() -> FieldRule {
    FieldRule::new(
        "tax",
        Selection::LastMatch,
        vec![Strategy::labeled("tax_amount", &TAX_AMOUNT, 1)],
    )
}

/// Last two two-decimal figures in the text, as (second to last, last).
pub fn trailing_amounts(text: &str) -> Option<(String, String)> {
    let amounts: Vec<&str> = DECIMAL_AMOUNT
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();

    match amounts.as_slice() {
        [.., amount, tax] => Some((amount.to_string(), tax.to_string())),
        _ => None,
    }
}
