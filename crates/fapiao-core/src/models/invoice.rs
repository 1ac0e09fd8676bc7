//! Invoice record produced by the extraction engine.

use serde::{Deserialize, Serialize};

/// Structured fields recovered from one invoice document.
///
/// Every field is always present. A field the engine could not recover is
/// the empty string, never absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord {
    /// Invoice number (发票号码).
    pub invoice_number: String,

    /// Invoice code (发票代码), only present on older paper invoices.
    pub invoice_code: String,

    /// Issue date as printed, e.g. `2024年5月1日`.
    pub date: String,

    /// Total amount before tax (不含税合计).
    pub amount: String,

    /// Total tax (税额合计).
    pub tax: String,

    /// Total including tax (价税合计, 小写).
    pub total: String,

    /// Buyer name (购买方名称).
    pub buyer: String,

    /// Buyer tax identifier (统一社会信用代码/纳税人识别号).
    pub buyer_tax_id: String,

    /// Seller name (销售方名称).
    pub seller: String,

    /// Seller tax identifier.
    pub seller_tax_id: String,

    /// Prefix of the normalized input, for diagnostics only.
    pub raw_text_sample: String,
}

/// Named fields of an [`InvoiceRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    InvoiceNumber,
    InvoiceCode,
    Date,
    Amount,
    Tax,
    Total,
    Buyer,
    BuyerTaxId,
    Seller,
    SellerTaxId,
}

impl Field {
    /// All extractable fields in record order.
    pub const ALL: [Field; 10] = [
        Field::InvoiceNumber,
        Field::InvoiceCode,
        Field::Date,
        Field::Amount,
        Field::Tax,
        Field::Total,
        Field::Buyer,
        Field::BuyerTaxId,
        Field::Seller,
        Field::SellerTaxId,
    ];

    /// Stable field name as used in serialized records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::InvoiceNumber => "invoiceNumber",
            Field::InvoiceCode => "invoiceCode",
            Field::Date => "date",
            Field::Amount => "amount",
            Field::Tax => "tax",
            Field::Total => "total",
            Field::Buyer => "buyer",
            Field::BuyerTaxId => "buyerTaxId",
            Field::Seller => "seller",
            Field::SellerTaxId => "sellerTaxId",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl InvoiceRecord {
    /// Create a record with every field empty.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get the value of a field.
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::InvoiceNumber => &self.invoice_number,
            Field::InvoiceCode => &self.invoice_code,
            Field::Date => &self.date,
            Field::Amount => &self.amount,
            Field::Tax => &self.tax,
            Field::Total => &self.total,
            Field::Buyer => &self.buyer,
            Field::BuyerTaxId => &self.buyer_tax_id,
            Field::Seller => &self.seller,
            Field::SellerTaxId => &self.seller_tax_id,
        }
    }

    /// Return a copy of this record with one field replaced.
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        let value = value.into();
        match field {
            Field::InvoiceNumber => self.invoice_number = value,
            Field::InvoiceCode => self.invoice_code = value,
            Field::Date => self.date = value,
            Field::Amount => self.amount = value,
            Field::Tax => self.tax = value,
            Field::Total => self.total = value,
            Field::Buyer => self.buyer = value,
            Field::BuyerTaxId => self.buyer_tax_id = value,
            Field::Seller => self.seller = value,
            Field::SellerTaxId => self.seller_tax_id = value,
        }
        self
    }

    /// Check whether no field was recovered.
    pub fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|f| self.get(*f).is_empty())
    }

    /// Fields that are still empty.
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .iter()
            .copied()
            .filter(|f| self.get(*f).is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_record_has_every_field() {
        let record = InvoiceRecord::empty();
        assert!(record.is_empty());
        assert_eq!(record.missing_fields().len(), Field::ALL.len());

        let json = serde_json::to_value(&record).unwrap();
        for field in Field::ALL {
            assert_eq!(json[field.as_str()], "");
        }
        assert_eq!(json["rawTextSample"], "");
    }

    #[test]
    fn test_with_replaces_single_field() {
        let record = InvoiceRecord::empty().with(Field::Tax, "13.00");
        assert_eq!(record.get(Field::Tax), "13.00");
        assert_eq!(record.missing_fields().len(), Field::ALL.len() - 1);
    }
}
