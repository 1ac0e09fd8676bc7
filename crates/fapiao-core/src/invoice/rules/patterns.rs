//! Common regex patterns for Chinese VAT invoice extraction.
//!
//! All patterns run against normalized text: whitespace is collapsed to single
//! spaces and full-width colons/commas are already ASCII.

use lazy_static::lazy_static;
use regex::Regex;

/// Characters that may appear in a party name.
pub const NAME_CHARS: &str = r"[\u{4e00}-\u{9fa5}A-Za-z0-9（）()·\-—_ ]";

lazy_static! {
    // Whitespace runs, including non-breaking space
    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"[\s\u{00a0}]+").unwrap();

    // Invoice number (发票号码), most specific label first
    pub static ref INVOICE_NUMBER: Regex = Regex::new(
        r"发票号码[:\s]*([0-9]{8,24})"
    ).unwrap();

    pub static ref INVOICE_NUMBER_SHORT: Regex = Regex::new(
        r"发票号[:\s]*([0-9]{8,24})"
    ).unwrap();

    pub static ref INVOICE_NUMBER_LOOSE: Regex = Regex::new(
        r"号码[:\s]*([0-9]{8,24})"
    ).unwrap();

    pub static ref LONG_DIGIT_RUN: Regex = Regex::new(r"([0-9]{8,24})").unwrap();

    // Invoice code (发票代码)
    pub static ref INVOICE_CODE: Regex = Regex::new(
        r"发票代码[:\s]*([0-9]{10,12})"
    ).unwrap();

    // Issue date (开票日期), e.g. 2024年5月1日
    pub static ref ISSUE_DATE: Regex = Regex::new(
        r"开票日期[:\s]*([0-9]{4}年[0-9]{1,2}月[0-9]{1,2}日)"
    ).unwrap();

    pub static ref ISSUE_DATE_SHORT: Regex = Regex::new(
        r"日期[:\s]*([0-9]{4}年[0-9]{1,2}月[0-9]{1,2}日)"
    ).unwrap();

    pub static ref DATE_CN: Regex = Regex::new(
        r"([0-9]{4}年[0-9]{1,2}月[0-9]{1,2}日)"
    ).unwrap();

    pub static ref DATE_CN_SPACED: Regex = Regex::new(
        r"([0-9]{4}\s*年\s*[0-9]{1,2}\s*月\s*[0-9]{1,2}\s*日)"
    ).unwrap();

    // OCR tolerant: 票 read as 景, 日 read as 昌, and a label that lost 日 or 期
    pub static ref ISSUE_DATE_OCR: Regex = Regex::new(
        r"开[票景](?:日期|[日期])[:\s]*([0-9]{4}年[0-9]{1,2}月[0-9]{1,2}[日昌])"
    ).unwrap();

    pub static ref ISSUE_DATE_OCR_SPACED: Regex = Regex::new(
        r"开[票景](?:日期|[日期])[:\s]*([0-9]{4}\s*年\s*[0-9]{1,2}\s*月\s*[0-9]{1,2}\s*[日昌])"
    ).unwrap();

    pub static ref DATE_CN_OCR: Regex = Regex::new(
        r"([0-9]{4}年[0-9]{1,2}月[0-9]{1,2}[日昌])"
    ).unwrap();

    pub static ref DATE_CN_OCR_SPACED: Regex = Regex::new(
        r"([0-9]{4}\s*年\s*[0-9]{1,2}\s*月\s*[0-9]{1,2}\s*[日昌])"
    ).unwrap();

    // Total including tax (价税合计, 小写 figure)
    pub static ref TOTAL_GROSS: Regex = Regex::new(
        r"价\s*税\s*合\s*计\s*[（(]?\s*小\s*写\s*[）)]?[:\s]*[¥￥]?\s*([-+]?[0-9]+\.[0-9]{2})"
    ).unwrap();

    pub static ref TOTAL_GROSS_PAREN: Regex = Regex::new(
        r"[（(]\s*小\s*写\s*[）)]\s*[:\s]*[¥￥]?\s*([-+]?[0-9]+\.[0-9]{2})"
    ).unwrap();

    pub static ref TOTAL_GROSS_LOOSE: Regex = Regex::new(
        r"小\s*写[^0-9\-]+([-+]?[0-9]+\.[0-9]{2})"
    ).unwrap();

    pub static ref TOTAL_GROSS_BARE: Regex = Regex::new(
        r"小写[:\s]*[¥￥]?\s*([-+]?[0-9]+\.[0-9]{2})"
    ).unwrap();

    // Summary row (合计): pre-tax amount followed by tax
    pub static ref SUMMARY_LINE: Regex = Regex::new(
        r"合\s*计[\s:]*[¥￥]?\s*([-+]?[0-9]+\.[0-9]{2})\s*[¥￥]?\s+[¥￥]?\s*([-+]?[0-9]+\.[0-9]{2})"
    ).unwrap();

    pub static ref SUMMARY_LINE_CURRENCY: Regex = Regex::new(
        r"合计[:\s]*([-+]?[0-9]+\.[0-9]{2})[¥￥]?\s+([-+]?[0-9]+\.[0-9]{2})[¥￥]?"
    ).unwrap();

    pub static ref SUMMARY_LINE_PLAIN: Regex = Regex::new(
        r"合计[:\s]*([-+]?[0-9]+\.[0-9]{2})\s+([-+]?[0-9]+\.[0-9]{2})"
    ).unwrap();

    // Labeled tax (税额)
    pub static ref TAX_AMOUNT: Regex = Regex::new(
        r"税额[:\s]*[¥￥]?\s*(-?[0-9]+\.[0-9]{2})"
    ).unwrap();

    // Any two-decimal figure
    pub static ref DECIMAL_AMOUNT: Regex = Regex::new(r"([0-9]+\.[0-9]{2})").unwrap();

    // Party tax identifier (统一社会信用代码/纳税人识别号)
    pub static ref TAX_ID: Regex = Regex::new(
        r"(统一社会信用代码/纳税人识别号|纳税人识别号)[:\s]*([A-Za-z0-9]{15,30})"
    ).unwrap();

    // Name directly followed by a tax identifier label
    pub static ref PAIRED_NAME: Regex = Regex::new(&format!(
        r"名称[:\s]*({NAME_CHARS}+?)\s{{0,20}}(?:统一社会信用代码/纳税人识别号|纳税人识别号)"
    )).unwrap();

    pub static ref NAME_LABEL: Regex = Regex::new(r"名称[:\s]*").unwrap();

    // Role keywords
    pub static ref BUYER_KEYWORD: Regex = Regex::new(r"购[买方]*").unwrap();

    pub static ref SELLER_KEYWORD: Regex = Regex::new(r"销[售方]*").unwrap();
}

/// Labels that end a party name run.
pub const NAME_STOP_LABELS: &[&str] = &[
    "名称",
    "统一社会信用代码",
    "纳税人识别号",
    "地址",
    "电话",
    "开户行",
    "账号",
];

/// Check whether a character may appear in a party name.
pub fn is_name_char(c: char) -> bool {
    matches!(c, '\u{4e00}'..='\u{9fa5}')
        || c.is_ascii_alphanumeric()
        || matches!(c, '（' | '）' | '(' | ')' | '·' | '-' | '—' | '_' | ' ')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_char_class_agrees_with_regex() {
        let class = Regex::new(&format!("^{NAME_CHARS}$")).unwrap();
        for c in ['滴', 'A', 'z', '7', '（', ')', '·', '-', '—', '_', ' ', ':', '/', '¥', '.'] {
            assert_eq!(is_name_char(c), class.is_match(&c.to_string()), "char {c:?}");
        }
    }

    #[test]
    fn test_paired_name_stops_before_label() {
        let caps = PAIRED_NAME
            .captures("名称:Alpha Co 统一社会信用代码/纳税人识别号:ABC123456789012")
            .unwrap();
        assert_eq!(&caps[1], "Alpha Co");
    }

    #[test]
    fn test_summary_line_with_currency_prefix() {
        let caps = SUMMARY_LINE.captures("合 计 ¥100.00 ¥13.00").unwrap();
        assert_eq!(&caps[1], "100.00");
        assert_eq!(&caps[2], "13.00");
    }
}
