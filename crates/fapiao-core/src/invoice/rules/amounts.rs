//! Amount parsing and cross-field reconciliation.

use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

use crate::models::invoice::InvoiceRecord;

/// Parse an amount such as `113.00`, `-5.50` or `¥1,234.56`.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .trim()
        .trim_start_matches(['¥', '￥'])
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    Decimal::from_str(&cleaned).ok()
}

/// Format an amount with exactly two fractional digits.
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

/// Derive the pre-tax amount as `total - tax` when it is missing.
///
/// The record is returned unchanged if `amount` is already set, if either
/// operand is missing or not a number, or if the difference is out of range.
pub fn reconcile_amount(record: InvoiceRecord) -> InvoiceRecord {
    if !record.amount.is_empty() {
        return record;
    }

    let (Some(total), Some(tax)) = (parse_amount(&record.total), parse_amount(&record.tax)) else {
        return record;
    };

    let Some(difference) = total.checked_sub(tax) else {
        debug!("Amount out of range for total {} and tax {}", total, tax);
        return record;
    };

    let amount = format_amount(difference);
    debug!("Derived amount {} from total {} and tax {}", amount, total, tax);

    InvoiceRecord { amount, ..record }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(amount: &str, tax: &str, total: &str) -> InvoiceRecord {
        InvoiceRecord {
            amount: amount.to_string(),
            tax: tax.to_string(),
            total: total.to_string(),
            ..InvoiceRecord::default()
        }
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("113.00"), Some(Decimal::from_str("113.00").unwrap()));
        assert_eq!(parse_amount("¥1,234.56"), Some(Decimal::from_str("1234.56").unwrap()));
        assert_eq!(parse_amount("-5.50"), Some(Decimal::from_str("-5.50").unwrap()));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("abc"), None);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::from_str("100").unwrap()), "100.00");
        assert_eq!(format_amount(Decimal::from_str("0.1").unwrap()), "0.10");
        assert_eq!(format_amount(Decimal::from_str("-3.456").unwrap()), "-3.46");
    }

    #[test]
    fn test_reconcile_derives_amount() {
        let reconciled = reconcile_amount(record("", "13.00", "113.00"));
        assert_eq!(reconciled.amount, "100.00");
        assert_eq!(reconciled.tax, "13.00");
        assert_eq!(reconciled.total, "113.00");
    }

    #[test]
    fn test_reconcile_without_float_artefacts() {
        assert_eq!(reconcile_amount(record("", "0.20", "0.30")).amount, "0.10");
    }

    #[test]
    fn test_reconcile_missing_total_leaves_amount_empty() {
        assert_eq!(reconcile_amount(record("", "13.00", "")).amount, "");
    }

    #[test]
    fn test_reconcile_unparseable_operand() {
        assert_eq!(reconcile_amount(record("", "abc", "113.00")).amount, "");
    }

    #[test]
    fn test_reconcile_overflow_leaves_amount_empty() {
        let reconciled = reconcile_amount(record("", "-1.00", "79228162514264337593543950335.00"));
        assert_eq!(reconciled.amount, "");
        assert_eq!(reconciled.total, "79228162514264337593543950335.00");
    }

    #[test]
    fn test_reconcile_keeps_existing_amount() {
        assert_eq!(reconcile_amount(record("90.00", "13.00", "113.00")).amount, "90.00");
    }
}
