//! Output formatting shared by the process and batch commands.

use std::path::Path;

use chrono::NaiveDate;
use fapiao_core::models::invoice::InvoiceRecord;

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension for written outputs.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// Column headers of the summary export.
pub const SUMMARY_HEADERS: [&str; 13] = [
    "文件名",
    "文件类型",
    "发票号码",
    "开票日期",
    "不含税合计",
    "税额合计",
    "价税合计",
    "购买方",
    "购买方税号",
    "销售方",
    "销售方税号",
    "处理状态",
    "错误信息",
];

/// One document in a batch run.
#[derive(Debug)]
pub struct SummaryRow {
    pub file_name: String,
    pub file_type: String,
    /// `None` when the document could not be processed.
    pub record: Option<InvoiceRecord>,
    pub error: Option<String>,
}

pub fn format_record(record: &InvoiceRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(record)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

fn format_csv(record: &InvoiceRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "invoiceNumber",
        "invoiceCode",
        "date",
        "amount",
        "tax",
        "total",
        "buyer",
        "buyerTaxId",
        "seller",
        "sellerTaxId",
    ])?;

    wtr.write_record([
        &record.invoice_number,
        &record.invoice_code,
        &record.date,
        &record.amount,
        &record.tax,
        &record.total,
        &record.buyer,
        &record.buyer_tax_id,
        &record.seller,
        &record.seller_tax_id,
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &InvoiceRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("发票号码: {}\n", record.invoice_number));
    if !record.invoice_code.is_empty() {
        output.push_str(&format!("发票代码: {}\n", record.invoice_code));
    }
    output.push_str(&format!("开票日期: {}\n", record.date));
    output.push('\n');

    output.push_str("购买方:\n");
    output.push_str(&format!("  {}\n", record.buyer));
    output.push_str(&format!("  税号: {}\n", record.buyer_tax_id));
    output.push('\n');

    output.push_str("销售方:\n");
    output.push_str(&format!("  {}\n", record.seller));
    output.push_str(&format!("  税号: {}\n", record.seller_tax_id));
    output.push('\n');

    output.push_str("金额:\n");
    output.push_str(&format!("  不含税: {}\n", record.amount));
    output.push_str(&format!("  税额:   {}\n", record.tax));
    output.push_str(&format!("  价税合计: {}\n", record.total));

    output
}

/// Default summary file name for the given day.
pub fn summary_file_name(day: NaiveDate) -> String {
    format!("发票数据汇总_{}.csv", day.format("%Y-%m-%d"))
}

pub fn write_summary(path: &Path, rows: &[SummaryRow]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(SUMMARY_HEADERS)?;

    for row in rows {
        let empty = InvoiceRecord::empty();
        let record = row.record.as_ref().unwrap_or(&empty);
        let status = if row.record.is_some() { "成功" } else { "失败" };

        wtr.write_record([
            row.file_name.as_str(),
            row.file_type.as_str(),
            &record.invoice_number,
            &record.date,
            &record.amount,
            &record.tax,
            &record.total,
            &record.buyer,
            &record.buyer_tax_id,
            &record.seller,
            &record.seller_tax_id,
            status,
            row.error.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fapiao_core::models::invoice::Field;

    #[test]
    fn test_summary_file_name() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(summary_file_name(day), "发票数据汇总_2024-05-01.csv");
    }

    #[test]
    fn test_csv_has_header_and_row() {
        let record = InvoiceRecord::empty().with(Field::InvoiceNumber, "12345678");
        let csv = format_record(&record, OutputFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("invoiceNumber,invoiceCode,date"));
        assert!(lines[1].starts_with("12345678,,"));
    }

    #[test]
    fn test_summary_marks_failures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        let rows = vec![
            SummaryRow {
                file_name: "a.txt".to_string(),
                file_type: "text".to_string(),
                record: Some(InvoiceRecord::empty().with(Field::Total, "87.00")),
                error: None,
            },
            SummaryRow {
                file_name: "b.pdf".to_string(),
                file_type: "pdf".to_string(),
                record: None,
                error: Some("PDF has no pages".to_string()),
            },
        ];

        write_summary(&path, &rows).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines[0], SUMMARY_HEADERS.join(","));
        assert_eq!(lines[1], "a.txt,text,,,,,87.00,,,,,成功,");
        assert_eq!(lines[2], "b.pdf,pdf,,,,,,,,,,失败,PDF has no pages");
    }
}
