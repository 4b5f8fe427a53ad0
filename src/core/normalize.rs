// src/core/normalize.rs
//
// Locale-formatted currency and date parsing for Turkish notices.
// Both parsers are total: any failure is a None, the caller decides
// whether that deserves a warning.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;

/// Parse a Turkish-formatted money amount: thousands separator `.` or
/// space, decimal separator `,`, optional `TL`/`₺` token in either case.
/// `"1.234.567,89 TL"` → `1234567.89`; `"500 TL"` → `500`. Returns `None`
/// if what remains after stripping is not a non-negative number.
pub fn parse_currency_amount(text: &str) -> Option<Decimal> {
    let chars: Vec<char> = text.trim().chars().collect();
    if chars.is_empty() {
        return None;
    }

    // Drop currency tokens, keep everything else.
    let mut stripped = String::with_capacity(chars.len());
    let mut i = 0usize;
    while i < chars.len() {
        match chars[i] {
            '₺' => i += 1,
            't' | 'T' if matches!(chars.get(i + 1), Some('l' | 'L')) => i += 2,
            c => {
                stripped.push(c);
                i += 1;
            }
        }
    }

    // Thousands separators out, decimal comma in.
    let compact: String = stripped.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }
    let normalized = compact.replace('.', "").replace(',', ".");

    Decimal::from_str(&normalized)
        .ok()
        .filter(|d| !d.is_sign_negative())
}

const DATE_TIME_FORMATS: &[&str] = &[
    "%d.%m.%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%d.%m.%Y", "%d/%m/%Y", "%d-%m-%Y"];

/// Parse a day-first Turkish date, with optional time suffix. The wall
/// clock in the notice is taken as-is and relabelled UTC; no timezone
/// conversion is applied. ISO-style values occasionally appear in newer
/// notices and are accepted as a last resort.
pub fn parse_local_date(text: &str) -> Option<DateTime<Utc>> {
    let t = text.trim();
    if t.is_empty() {
        return None;
    }
    for f in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(t, f) {
            return Some(dt.and_utc());
        }
    }
    for f in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(t, f) {
            return Some(d.and_hms_opt(0, 0, 0)?.and_utc());
        }
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(t, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(d) = NaiveDate::parse_from_str(t, "%Y-%m-%d") {
        return Some(d.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}
