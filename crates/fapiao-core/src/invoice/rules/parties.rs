//! Buyer and seller identification.
//!
//! Resolution runs as a pipeline of tiers. Each tier receives the partially
//! filled [`Parties`] and returns an equally or more complete value; the
//! pipeline stops as soon as both roles have a name and a tax id.
//!
//! 1. Paired: names immediately followed by a tax id label, matched with the
//!    tax id occurrences in order.
//! 2. Independent: every name and every tax id, assigned by position.
//! 3. Contextual: a name label shortly after a buyer/seller keyword.
//!
//! Invoices print the buyer block before the seller block, so the first
//! occurrence belongs to the buyer. A name span is never given to both roles.

use serde::Serialize;
use tracing::debug;

use super::patterns::{
    is_name_char, BUYER_KEYWORD, NAME_LABEL, NAME_STOP_LABELS, PAIRED_NAME, SELLER_KEYWORD, TAX_ID,
};

/// Role of a party on the invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Buyer,
    Seller,
}

/// Tier that produced a party value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Paired,
    Independent,
    Contextual,
}

impl Tier {
    /// Whether values from this tier are guesses rather than paired evidence.
    pub fn is_fallback(&self) -> bool {
        !matches!(self, Tier::Paired)
    }
}

/// Name and tax id of one party.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityPair {
    pub role: Role,
    pub name: String,
    pub tax_id: String,
    /// Byte offset of the name in the normalized text.
    pub name_offset: Option<usize>,
    /// Tier that supplied the name, if any.
    pub name_tier: Option<Tier>,
    /// Tier that supplied the tax id, if any.
    pub tax_id_tier: Option<Tier>,
}

impl EntityPair {
    fn new(role: Role) -> Self {
        Self {
            role,
            name: String::new(),
            tax_id: String::new(),
            name_offset: None,
            name_tier: None,
            tax_id_tier: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.tax_id.is_empty()
    }

    fn with_name(self, (offset, name): NameSpan<'_>, tier: Tier) -> Self {
        Self {
            name: name.to_string(),
            name_offset: Some(offset),
            name_tier: Some(tier),
            ..self
        }
    }

    fn with_tax_id(self, tax_id: &str, tier: Tier) -> Self {
        Self {
            tax_id: tax_id.to_string(),
            tax_id_tier: Some(tier),
            ..self
        }
    }

    /// Fill an empty name, unless the span already belongs to the other role.
    fn fill_name(self, span: Option<NameSpan<'_>>, taken: Option<usize>, tier: Tier) -> Self {
        match span {
            Some((offset, name))
                if self.name.is_empty() && !name.is_empty() && taken != Some(offset) =>
            {
                self.with_name((offset, name), tier)
            }
            _ => self,
        }
    }

    fn fill_tax_id(self, tax_id: Option<&str>, tier: Tier) -> Self {
        match tax_id {
            Some(tax_id) if self.tax_id.is_empty() && !tax_id.is_empty() => {
                self.with_tax_id(tax_id, tier)
            }
            _ => self,
        }
    }
}

/// Both parties of an invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parties {
    pub buyer: EntityPair,
    pub seller: EntityPair,
}

impl Default for Parties {
    fn default() -> Self {
        Self {
            buyer: EntityPair::new(Role::Buyer),
            seller: EntityPair::new(Role::Seller),
        }
    }
}

impl Parties {
    pub fn is_complete(&self) -> bool {
        self.buyer.is_complete() && self.seller.is_complete()
    }

    fn names_complete(&self) -> bool {
        !self.buyer.name.is_empty() && !self.seller.name.is_empty()
    }
}

/// Tunables for party resolution.
#[derive(Debug, Clone, Copy)]
pub struct PartyOptions {
    /// Run the positional tier.
    pub positional_fallback: bool,
    /// Characters after a role keyword searched for a name label (0 disables).
    pub context_window: usize,
}

impl Default for PartyOptions {
    fn default() -> Self {
        Self {
            positional_fallback: true,
            context_window: 64,
        }
    }
}

type TierFn = fn(Parties, &str, &PartyOptions) -> Parties;

/// A name and its byte offset in the text.
type NameSpan<'a> = (usize, &'a str);

const TIERS: &[(Tier, TierFn)] = &[
    (Tier::Paired, paired_tier),
    (Tier::Independent, independent_tier),
    (Tier::Contextual, contextual_tier),
];

/// Resolve buyer and seller from normalized text with default options.
pub fn resolve_parties(text: &str) -> Parties {
    resolve_parties_with(text, &PartyOptions::default())
}

/// Resolve buyer and seller from normalized text.
pub fn resolve_parties_with(text: &str, options: &PartyOptions) -> Parties {
    let mut parties = Parties::default();

    for (tier, run) in TIERS {
        if parties.is_complete() {
            break;
        }
        parties = run(parties, text, options);
        debug!(
            "After {:?} tier: buyer={:?}/{:?} seller={:?}/{:?}",
            tier,
            parties.buyer.name,
            parties.buyer.tax_id,
            parties.seller.name,
            parties.seller.tax_id
        );
    }

    parties
}

fn paired_tier(parties: Parties, text: &str, _options: &PartyOptions) -> Parties {
    let names: Vec<NameSpan<'_>> = PAIRED_NAME
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| span_at(text, m.start(), m.as_str().trim())))
        .collect();
    let ids = tax_ids(text);

    debug!("Paired extraction: {} names, {} tax ids", names.len(), ids.len());

    let mut parties = parties;
    if let (Some(name), Some(id)) = (names.first(), ids.first()) {
        parties.buyer = parties
            .buyer
            .with_name(*name, Tier::Paired)
            .with_tax_id(id, Tier::Paired);
    }
    if let (Some(name), Some(id)) = (names.get(1), ids.get(1)) {
        parties.seller = parties
            .seller
            .with_name(*name, Tier::Paired)
            .with_tax_id(id, Tier::Paired);
    }
    parties
}

fn independent_tier(parties: Parties, text: &str, options: &PartyOptions) -> Parties {
    if !options.positional_fallback {
        return parties;
    }

    let mut parties = parties;

    if !parties.names_complete() {
        let slots = name_slots(text);
        debug!("Independent names: {:?}", slots);
        let first = slots.first().copied().flatten();
        let second = slots.get(1).copied().flatten();
        parties.buyer = parties
            .buyer
            .fill_name(first, parties.seller.name_offset, Tier::Independent);
        parties.seller = parties
            .seller
            .fill_name(second, parties.buyer.name_offset, Tier::Independent);
    }

    if parties.buyer.tax_id.is_empty() || parties.seller.tax_id.is_empty() {
        let ids = tax_ids(text);
        debug!("Independent tax ids: {:?}", ids);
        parties.buyer = parties.buyer.fill_tax_id(ids.first().copied(), Tier::Independent);
        parties.seller = parties.seller.fill_tax_id(ids.get(1).copied(), Tier::Independent);
    }

    parties
}

fn contextual_tier(parties: Parties, text: &str, options: &PartyOptions) -> Parties {
    if options.context_window == 0 || parties.names_complete() || !NAME_LABEL.is_match(text) {
        return parties;
    }

    let mut parties = parties;
    if parties.buyer.name.is_empty() {
        let taken = parties.seller.name_offset;
        let span = name_near_keyword(text, Role::Buyer, options.context_window, taken);
        parties.buyer = parties.buyer.fill_name(span, taken, Tier::Contextual);
    }
    if parties.seller.name.is_empty() {
        let taken = parties.buyer.name_offset;
        let span = name_near_keyword(text, Role::Seller, options.context_window, taken);
        parties.seller = parties.seller.fill_name(span, taken, Tier::Contextual);
    }
    parties
}

fn tax_ids(text: &str) -> Vec<&str> {
    TAX_ID
        .captures_iter(text)
        .filter_map(|caps| caps.get(2).map(|m| m.as_str()))
        .collect()
}

/// One slot per `名称` label in reading order; a blank label keeps its slot.
fn name_slots(text: &str) -> Vec<Option<NameSpan<'_>>> {
    NAME_LABEL
        .find_iter(text)
        .map(|label| name_after(text, label.end()))
        .collect()
}

/// Name following byte offset `from`, if any.
fn name_after(text: &str, from: usize) -> Option<NameSpan<'_>> {
    let rest = &text[from..];
    let name = take_name(rest);
    if name.is_empty() {
        return None;
    }
    Some(span_at(text, from, name))
}

/// Locate `name`, a trimmed slice of the text starting at or after `from`.
fn span_at<'a>(text: &'a str, from: usize, name: &'a str) -> NameSpan<'a> {
    let lead = text[from..].len() - text[from..].trim_start().len();
    (from + lead, name)
}

/// Leading name run of `rest`, ending at a non-name character or a known label.
pub fn take_name(rest: &str) -> &str {
    let end = rest
        .char_indices()
        .find(|(idx, c)| {
            !is_name_char(*c)
                || NAME_STOP_LABELS
                    .iter()
                    .any(|label| rest[*idx..].starts_with(label))
        })
        .map(|(idx, _)| idx)
        .unwrap_or(rest.len());

    rest[..end].trim()
}

/// First name label within `window` characters after a keyword for `role`,
/// skipping keywords whose window mentions the other role first and names
/// starting at the `taken` offset.
fn name_near_keyword(
    text: &str,
    role: Role,
    window: usize,
    taken: Option<usize>,
) -> Option<NameSpan<'_>> {
    let (keyword, opposing) = match role {
        Role::Buyer => (&*BUYER_KEYWORD, '销'),
        Role::Seller => (&*SELLER_KEYWORD, '购'),
    };

    keyword.find_iter(text).find_map(|hit| {
        let after = &text[hit.end()..];
        let scope = super::normalize::char_prefix(after, window);
        let label = NAME_LABEL.find(scope)?;

        if scope[..label.start()].contains(opposing) {
            return None;
        }

        let span = name_after(text, hit.end() + label.end())?;
        (taken != Some(span.0)).then_some(span)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ID_LABEL: &str = "统一社会信用代码/纳税人识别号";

    #[test]
    fn test_paired_tier_fills_both_roles() {
        let text = format!(
            "名称:Alpha Co {ID_LABEL}:ABC123456789012 名称:Beta Co {ID_LABEL}:XYZ987654321098"
        );
        let parties = resolve_parties(&text);

        assert_eq!(parties.buyer.name, "Alpha Co");
        assert_eq!(parties.buyer.tax_id, "ABC123456789012");
        assert_eq!(parties.seller.name, "Beta Co");
        assert_eq!(parties.seller.tax_id, "XYZ987654321098");
        assert_eq!(parties.buyer.name_tier, Some(Tier::Paired));
        assert_eq!(parties.seller.tax_id_tier, Some(Tier::Paired));
    }

    #[test]
    fn test_names_without_tax_ids_use_position() {
        let parties = resolve_parties("名称:Alpha Co 名称:Beta Co");

        assert_eq!(parties.buyer.name, "Alpha Co");
        assert_eq!(parties.seller.name, "Beta Co");
        assert_eq!(parties.buyer.tax_id, "");
        assert_eq!(parties.buyer.name_tier, Some(Tier::Independent));
        assert_eq!(parties.seller.name_tier, Some(Tier::Independent));
    }

    #[test]
    fn test_single_pair_then_independent_seller() {
        let text = "名称:甲公司 纳税人识别号:91110000123456789X 名称:乙公司 地址:北京";
        let parties = resolve_parties(text);

        assert_eq!(parties.buyer.name, "甲公司");
        assert_eq!(parties.buyer.tax_id, "91110000123456789X");
        assert_eq!(parties.buyer.name_tier, Some(Tier::Paired));
        // The buyer keeps its paired name; the second name fills the seller
        assert_eq!(parties.seller.name, "乙公司");
        assert_eq!(parties.seller.name_tier, Some(Tier::Independent));
        assert_eq!(parties.seller.tax_id, "");
    }

    #[test]
    fn test_blank_buyer_name_keeps_its_slot() {
        let parties = resolve_parties("购买方 名称: 地址:北京市 销售方 名称:Beta Co 地址:上海");

        assert_eq!(parties.buyer.name, "");
        assert_eq!(parties.buyer.name_tier, None);
        assert_eq!(parties.seller.name, "Beta Co");
        assert_eq!(parties.seller.name_tier, Some(Tier::Independent));
    }

    #[test]
    fn test_paired_name_not_reused_for_other_role() {
        let text = "名称:Alpha 地址:x 名称:Beta 纳税人识别号:111111111111111";
        let parties = resolve_parties(text);

        assert_eq!(parties.buyer.name, "Beta");
        assert_eq!(parties.buyer.name_tier, Some(Tier::Paired));
        assert_eq!(parties.seller.name, "");
    }

    #[test]
    fn test_name_offsets_point_into_text() {
        let text = "名称:Alpha Co 名称: Beta Co";
        let parties = resolve_parties(text);

        let buyer_at = parties.buyer.name_offset.unwrap();
        let seller_at = parties.seller.name_offset.unwrap();
        assert!(text[buyer_at..].starts_with("Alpha Co"));
        assert!(text[seller_at..].starts_with("Beta Co"));
    }

    #[test]
    fn test_independent_tax_ids_by_position() {
        let text = "纳税人识别号:111111111111111 纳税人识别号:222222222222222";
        let parties = resolve_parties(text);
        assert_eq!(parties.buyer.tax_id, "111111111111111");
        assert_eq!(parties.seller.tax_id, "222222222222222");
        assert_eq!(parties.seller.tax_id_tier, Some(Tier::Independent));
    }

    #[test]
    fn test_contextual_tier_after_keyword() {
        // One name only: the independent tier gives it to the buyer
        let text = "购买方信息 名称:Alpha Co";
        let parties = resolve_parties(text);
        assert_eq!(parties.buyer.name, "Alpha Co");
        assert_eq!(parties.seller.name, "");

        let options = PartyOptions {
            positional_fallback: false,
            ..PartyOptions::default()
        };
        let text = "销售方 名称:Beta Co";
        let parties = resolve_parties_with(text, &options);
        assert_eq!(parties.buyer.name, "");
        assert_eq!(parties.seller.name, "Beta Co");
        assert_eq!(parties.seller.name_tier, Some(Tier::Contextual));
    }

    #[test]
    fn test_contextual_tier_skips_opposing_keyword() {
        let options = PartyOptions {
            positional_fallback: false,
            ..PartyOptions::default()
        };
        let parties = resolve_parties_with("购买方 销售方 名称:Beta Co", &options);
        assert_eq!(parties.buyer.name, "");
        assert_eq!(parties.seller.name, "Beta Co");
    }

    #[test]
    fn test_contextual_window_bound() {
        let options = PartyOptions {
            positional_fallback: false,
            context_window: 4,
        };
        let parties = resolve_parties_with("销售方 很长的一段说明文字 名称:Beta Co", &options);
        assert_eq!(parties.seller.name, "");
    }

    #[test]
    fn test_take_name_stops_at_labels() {
        assert_eq!(take_name("滴滴出行 地址:北京"), "滴滴出行");
        assert_eq!(take_name("Alpha Co 名称:Beta"), "Alpha Co");
        assert_eq!(take_name("Gamma Ltd, x"), "Gamma Ltd");
        assert_eq!(take_name(":"), "");
    }

    #[test]
    fn test_nothing_found() {
        assert_eq!(resolve_parties("合计 100.00 13.00"), Parties::default());
        assert_eq!(resolve_parties(""), Parties::default());
    }
}
