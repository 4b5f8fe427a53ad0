// src/scrape/announcement.rs
//
// Fact extraction from one EKAP result announcement ("Sonuç İlanı").
//
// Per field: an ordered list of strategies, first success wins. Keyword
// tables are data, so adding a heuristic for a new announcement vintage
// is a table edit. A field miss is a warning on the fact record, never an
// error; the record always comes back so the caller can log and skip.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::consts::{FALLBACK_AMOUNT_FLOOR, MIN_COMPANY_NAME_CHARS, MIN_TAX_ID_DIGITS};
use crate::core::html::{block_text, cells, rows, tag_texts, values_after_label, visible_text};
use crate::core::normalize::{parse_currency_amount, parse_local_date};
use crate::core::sanitize::{digits_only, first_digit_run, fold_tr};

/// Facts pulled out of one result announcement.
///
/// `is_success` is the persistence gate: a winner name or a contract
/// amount must be present. Everything else may be absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultFact {
    pub winner_company: Option<String>,
    pub winner_tax_id: Option<String>,
    pub contract_amount: Option<Decimal>,
    pub number_of_bidders: u32,
    pub award_date: Option<DateTime<Utc>>,
    pub result_status: Option<String>,
    pub is_success: bool,
    pub warnings: Vec<String>,
}

// Label keywords in priority order, spelled with their diacritics.
// Matching folds both sides through fold_tr, so "YÜKLENİCİ", "Yüklenici"
// and "Yuklenici" all hit.
const WINNER_LABELS: &[&str] = &["istekli", "yüklenici", "kazanan", "firma"];
const WINNER_MARKERS: &[&str] = &["kazanan", "yüklenici"];
const TAX_ID_LABELS: &[&str] = &["vergi kimlik", "t.c. kimlik", "vkn", "tckn"];
const AMOUNT_LABELS: &[&str] = &["sözleşme bedel", "teklif tutar", "ihale bedel", "toplam tutar"];
const BIDDER_LABELS: &[&str] = &["teklif veren", "istekli sayı", "katılımcı sayı"];
const DATE_LABELS: &[&str] = &["ihale tarihi", "sonuç tarihi", "karar tarihi"];
const STATUS_LABEL: &str = "ihale sonucu";
const STATUS_MARKERS: &[&str] = &["yapılmıştır", "iptal", "sonuç"];
const STATUS_HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "strong"];

/// Default status when the notice names no outcome at all.
pub const STATUS_UNSPECIFIED: &str = "Belirtilmemiş";

/// Extract result facts from one announcement document.
///
/// Returns `None` only for empty/whitespace input. Malformed markup is
/// not fatal: the scanner is total, and whatever fields it cannot locate
/// are reported through `warnings` with `is_success` reflecting the gate.
pub fn extract_result_fact(html_doc: &str) -> Option<ResultFact> {
    if html_doc.trim().is_empty() {
        warn!("announcement HTML is empty");
        return None;
    }

    let mut warnings = Vec::new();

    let winner_company = extract_winner_company(html_doc);
    if winner_company.is_none() {
        warnings.push("winner company not found".to_string());
    }

    let winner_tax_id = extract_tax_id(html_doc);
    if winner_tax_id.is_none() {
        warnings.push("winner tax id not found".to_string());
    }

    let contract_amount = extract_contract_amount(html_doc);
    if contract_amount.is_none() {
        warnings.push("contract amount not found".to_string());
    }

    let number_of_bidders = extract_bidder_count(html_doc).unwrap_or_else(|| {
        warnings.push("bidder count not found, defaulting to 0".to_string());
        0
    });

    let award_date = extract_award_date(html_doc);
    if award_date.is_none() {
        warnings.push("award date not found".to_string());
    }

    let result_status = extract_result_status(html_doc).unwrap_or_else(|| {
        warnings.push("result status not found".to_string());
        STATUS_UNSPECIFIED.to_string()
    });

    let is_success = winner_company.is_some() || contract_amount.is_some();
    if !is_success {
        warnings.push("neither winner company nor contract amount could be extracted".to_string());
    }

    for w in &warnings {
        warn!("{w}");
    }

    Some(ResultFact {
        winner_company,
        winner_tax_id,
        contract_amount,
        number_of_bidders,
        award_date,
        result_status: Some(result_status),
        is_success,
        warnings,
    })
}

/* ---------------- field strategies ---------------- */

/// Labelled-cell lookup: keywords in priority order, candidates in
/// document order under each keyword, first value `accept` takes wins.
/// A keyword can legitimately match the wrong row first (e.g. "istekli"
/// also sits inside "Teklif Veren İstekli Sayısı"), so rejected values
/// fall through to the next candidate instead of ending the strategy.
fn labeled_scan<T>(doc: &str, labels: &[&str], accept: impl Fn(&str) -> Option<T>) -> Option<T> {
    for label in labels {
        let needle = fold_tr(label);
        for value in values_after_label(doc, |text| fold_tr(text).contains(&needle)) {
            if let Some(out) = accept(&value) {
                debug!(%label, value = %value, "label hit");
                return Some(out);
            }
        }
    }
    None
}

fn long_enough(name: &str) -> bool {
    name.chars().count() >= MIN_COMPANY_NAME_CHARS
}

fn extract_winner_company(doc: &str) -> Option<String> {
    // Strategy A: label cell → adjacent cell.
    if let Some(name) = labeled_scan(doc, WINNER_LABELS, |v| {
        let name = v.trim();
        if long_enough(name) { Some(name.to_string()) } else { None }
    }) {
        return Some(name);
    }

    // Strategy B: a bold "kazanan"/"yüklenici" marker anywhere in a row;
    // take that row's second cell.
    let markers: Vec<String> = WINNER_MARKERS.iter().map(|m| fold_tr(m)).collect();
    for row in rows(doc) {
        let mut marked = false;
        for tag in ["strong", "b"] {
            for text in tag_texts(row, tag) {
                let folded = fold_tr(&text);
                if markers.iter().any(|m| folded.contains(m.as_str())) {
                    marked = true;
                }
            }
        }
        if !marked {
            continue;
        }
        if let Some(cell) = cells(row).get(1) {
            let name = block_text(cell).trim().to_string();
            if long_enough(&name) {
                debug!(company = %name, "winner via bold marker");
                return Some(name);
            }
        }
    }

    None
}

fn extract_tax_id(doc: &str) -> Option<String> {
    labeled_scan(doc, TAX_ID_LABELS, |v| {
        let digits = digits_only(v);
        if digits.len() >= MIN_TAX_ID_DIGITS { Some(digits) } else { None }
    })
}

fn currency_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\d.,]+\s*(?:₺|TL|tl)").unwrap())
}

fn extract_contract_amount(doc: &str) -> Option<Decimal> {
    // Strategy A: labelled amount cell.
    if let Some(amount) = labeled_scan(doc, AMOUNT_LABELS, |v| {
        parse_currency_amount(v).filter(|a| *a > Decimal::ZERO)
    }) {
        return Some(amount);
    }

    // Strategy B: any "1.234.567,89 TL" token in the visible text. Small
    // values are stray page furniture (fees, counters), so apply the
    // plausibility floor.
    let floor = Decimal::from(FALLBACK_AMOUNT_FLOOR);
    let text = visible_text(doc);
    for m in currency_token_re().find_iter(&text) {
        if let Some(amount) = parse_currency_amount(m.as_str()) {
            if amount > floor {
                debug!(%amount, "contract amount via document scan");
                return Some(amount);
            }
        }
    }

    None
}

fn extract_bidder_count(doc: &str) -> Option<u32> {
    labeled_scan(doc, BIDDER_LABELS, |v| first_digit_run(v)?.parse().ok())
}

fn extract_award_date(doc: &str) -> Option<DateTime<Utc>> {
    labeled_scan(doc, DATE_LABELS, parse_local_date)
}

fn extract_result_status(doc: &str) -> Option<String> {
    // Strategy A: the "İhale Sonucu" labelled cell.
    if let Some(status) = labeled_scan(doc, &[STATUS_LABEL], |v| {
        let t = v.trim();
        if t.is_empty() { None } else { Some(t.to_string()) }
    }) {
        return Some(status);
    }

    // Strategy B: heading-like elements announcing the outcome, e.g.
    // "İhale Yapılmıştır" / "İhale İptal Edilmiştir".
    let markers: Vec<String> = STATUS_MARKERS.iter().map(|m| fold_tr(m)).collect();
    for tag in STATUS_HEADING_TAGS {
        for text in tag_texts(doc, tag) {
            let folded = fold_tr(&text);
            if markers.iter().any(|m| folded.contains(m.as_str())) {
                let t = text.trim().to_string();
                if !t.is_empty() {
                    return Some(t);
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const FULL_NOTICE: &str = r#"
        <html><body>
        <h2>İhale Yapılmıştır</h2>
        <table>
            <tr><td>İhale Kayıt Numarası</td><td>2025/12345</td></tr>
            <tr><td>İhale Tarihi</td><td>15.03.2025</td></tr>
            <tr><td>Teklif Veren İstekli Sayısı</td><td>7</td></tr>
            <tr><td>Üzerine İhale Yapılan İsteklinin Adı</td><td>Örnek İnşaat A.Ş.</td></tr>
            <tr><td>Vergi Kimlik Numarası</td><td>123 456 789 0</td></tr>
            <tr><td>Sözleşme Bedeli (KDV Hariç)</td><td>1.234.567,89 TL</td></tr>
        </table>
        </body></html>
    "#;

    #[test]
    fn full_notice_extracts_every_field() {
        let fact = extract_result_fact(FULL_NOTICE).unwrap();
        assert!(fact.is_success);
        assert_eq!(fact.winner_company.as_deref(), Some("Örnek İnşaat A.Ş."));
        assert_eq!(fact.winner_tax_id.as_deref(), Some("1234567890"));
        assert_eq!(fact.contract_amount, Some(dec!(1234567.89)));
        assert_eq!(fact.number_of_bidders, 7);
        assert_eq!(
            fact.award_date.unwrap().to_rfc3339(),
            "2025-03-15T00:00:00+00:00"
        );
        assert_eq!(fact.result_status.as_deref(), Some("İhale Yapılmıştır"));
    }

    #[test]
    fn uppercase_diacritic_labels_still_match() {
        let doc = r#"<table>
            <tr><td>YÜKLENİCİ</td><td>BÜYÜK TİCARET LTD. ŞTİ.</td></tr>
        </table>"#;
        let fact = extract_result_fact(doc).unwrap();
        assert_eq!(fact.winner_company.as_deref(), Some("BÜYÜK TİCARET LTD. ŞTİ."));
        assert!(fact.is_success);
    }

    #[test]
    fn bold_marker_fallback_takes_second_cell() {
        let doc = r#"<table>
            <tr><td><strong>İhaleyi Kazanan</strong></td><td>Fallback Sanayi A.Ş.</td></tr>
        </table>"#;
        // Marker outside any cell, so the label scan sees nothing and
        // only the bold-marker row fallback can find the name.
        let doc_b = r#"<table>
            <tr><b>KAZANAN</b><td>Sıra No 1</td><td>Fallback Sanayi A.Ş.</td></tr>
        </table>"#;
        for d in [doc, doc_b] {
            let fact = extract_result_fact(d).unwrap();
            assert_eq!(fact.winner_company.as_deref(), Some("Fallback Sanayi A.Ş."));
        }
    }

    #[test]
    fn short_company_names_are_rejected() {
        let doc = r#"<table><tr><td>Firma</td><td>AB</td></tr></table>"#;
        let fact = extract_result_fact(doc).unwrap();
        assert_eq!(fact.winner_company, None);
        assert!(!fact.is_success);
    }

    #[test]
    fn tax_id_under_ten_digits_is_discarded() {
        let doc = r#"<table>
            <tr><td>İstekli</td><td>Kısa Vergi Test A.Ş.</td></tr>
            <tr><td>Vergi Kimlik No</td><td>12345</td></tr>
        </table>"#;
        let fact = extract_result_fact(doc).unwrap();
        assert_eq!(fact.winner_tax_id, None);
        assert!(fact.warnings.iter().any(|w| w.contains("tax id")));
    }

    #[test]
    fn amount_fallback_scans_free_text_with_floor() {
        let doc = r#"<html><body>
            <p>Doküman bedeli 150,00 TL olup sözleşme imzalanmıştır.</p>
            <p>Yüklenicinin teklifi 2.450.000,00 TL olarak kesinleşmiştir.</p>
        </body></html>"#;
        let fact = extract_result_fact(doc).unwrap();
        // 150 TL is below the plausibility floor; the big figure wins.
        assert_eq!(fact.contract_amount, Some(dec!(2450000.00)));
        assert!(fact.is_success);
    }

    #[test]
    fn labeled_zero_amount_falls_through() {
        let doc = r#"<table>
            <tr><td>Sözleşme Bedeli</td><td>0,00 TL</td></tr>
        </table>"#;
        let fact = extract_result_fact(doc).unwrap();
        assert_eq!(fact.contract_amount, None);
    }

    #[test]
    fn success_gate_winner_only() {
        let doc = r#"<table>
            <tr><td>Yüklenici</td><td>Tek Alan Ltd. Şti.</td></tr>
        </table>"#;
        let fact = extract_result_fact(doc).unwrap();
        assert!(fact.is_success);
        assert_eq!(fact.contract_amount, None);
        assert!(fact.warnings.iter().any(|w| w.contains("contract amount")));
    }

    #[test]
    fn success_gate_neither_field() {
        let doc = "<html><body><p>İlgisiz içerik</p></body></html>";
        let fact = extract_result_fact(doc).unwrap();
        assert!(!fact.is_success);
        assert!(fact.warnings.len() >= 2);
        // Still a usable record: status defaults, bidders default.
        assert_eq!(fact.result_status.as_deref(), Some(STATUS_UNSPECIFIED));
        assert_eq!(fact.number_of_bidders, 0);
    }

    #[test]
    fn empty_input_is_the_only_none() {
        assert!(extract_result_fact("").is_none());
        assert!(extract_result_fact("   \n\t ").is_none());
        assert!(extract_result_fact("<not <valid html>>>").is_some());
    }

    #[test]
    fn cancelled_notice_status_from_heading() {
        let doc = r#"<html><body>
            <h1>İhale İptal Edilmiştir</h1>
            <table><tr><td>İdare</td><td>Örnek Belediyesi</td></tr></table>
        </body></html>"#;
        let fact = extract_result_fact(doc).unwrap();
        assert_eq!(fact.result_status.as_deref(), Some("İhale İptal Edilmiştir"));
    }

    #[test]
    fn extraction_is_idempotent() {
        let a = extract_result_fact(FULL_NOTICE).unwrap();
        let b = extract_result_fact(FULL_NOTICE).unwrap();
        assert_eq!(a, b);
    }
}
