//! Allow-listed repairs for known OCR misrecognitions.
//!
//! Substitutions apply to individual extracted fields only, never to the
//! document text.

use tracing::debug;

use crate::models::invoice::{Field, InvoiceRecord};

/// Where in the field value a substitution applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Every occurrence.
    Anywhere,
    /// Only a trailing occurrence.
    Suffix,
}

/// One allow-listed substitution.
#[derive(Debug, Clone, Copy)]
pub struct Substitution {
    pub field: Field,
    pub from: &'static str,
    pub to: &'static str,
    pub anchor: Anchor,
}

const fn sub(field: Field, from: &'static str, to: &'static str, anchor: Anchor) -> Substitution {
    Substitution {
        field,
        from,
        to,
        anchor,
    }
}

/// Known confusions, applied in order.
pub const SUBSTITUTIONS: &[Substitution] = &[
    // 日 recognized as 昌 at the end of a date
    sub(Field::Date, "昌", "日", Anchor::Suffix),
    // 滴滴 recognized as 泣清
    sub(Field::Seller, "泣清", "滴滴", Anchor::Anywhere),
    sub(Field::Seller, "泣", "滴", Anchor::Anywhere),
    sub(Field::Buyer, "泣清", "滴滴", Anchor::Anywhere),
    sub(Field::Buyer, "泣", "滴", Anchor::Anywhere),
];

impl Substitution {
    fn apply(&self, value: &str) -> String {
        match self.anchor {
            Anchor::Anywhere => value.replace(self.from, self.to),
            Anchor::Suffix => match value.strip_suffix(self.from) {
                Some(head) => format!("{head}{}", self.to),
                None => value.to_string(),
            },
        }
    }
}

/// Apply every substitution in `table` to its field.
pub fn correct_with(record: InvoiceRecord, table: &[Substitution]) -> InvoiceRecord {
    table.iter().fold(record, |record, substitution| {
        let current = record.get(substitution.field);
        if current.is_empty() {
            return record;
        }

        let corrected = substitution.apply(current).trim().to_string();
        if corrected == current {
            return record;
        }

        debug!(
            "Corrected {}: {:?} -> {:?}",
            substitution.field, current, corrected
        );
        record.with(substitution.field, corrected)
    })
}

/// Repair known OCR errors in already extracted fields.
pub fn correct_known_errors(record: InvoiceRecord) -> InvoiceRecord {
    correct_with(record, SUBSTITUTIONS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record() -> InvoiceRecord {
        InvoiceRecord::empty()
            .with(Field::Date, "2024年5月1昌")
            .with(Field::Seller, "北京泣清出行科技有限公司")
            .with(Field::Buyer, "泣水公司")
            .with(Field::InvoiceNumber, "泣12345678")
    }

    #[test]
    fn test_corrects_listed_fields() {
        let corrected = correct_known_errors(record());
        assert_eq!(corrected.date, "2024年5月1日");
        assert_eq!(corrected.seller, "北京滴滴出行科技有限公司");
        assert_eq!(corrected.buyer, "滴水公司");
        // Fields without table entries are untouched
        assert_eq!(corrected.invoice_number, "泣12345678");
    }

    #[test]
    fn test_date_only_fixed_at_end() {
        let record = InvoiceRecord::empty().with(Field::Date, "昌2024年5月1日");
        let corrected = correct_known_errors(record);
        assert_eq!(corrected.date, "昌2024年5月1日");
    }

    #[test]
    fn test_idempotent() {
        let once = correct_known_errors(record());
        let twice = correct_known_errors(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_no_op_on_clean_record() {
        let clean = InvoiceRecord::empty()
            .with(Field::Date, "2024年5月1日")
            .with(Field::Seller, "Beta Co");
        assert_eq!(correct_known_errors(clean.clone()), clean);
    }

    #[test]
    fn test_replacements_never_reintroduce_patterns() {
        for a in SUBSTITUTIONS {
            for b in SUBSTITUTIONS.iter().filter(|b| b.field == a.field) {
                assert!(!a.to.contains(b.from), "{} -> {} feeds {}", a.from, a.to, b.from);
            }
        }
    }
}
