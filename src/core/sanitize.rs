// src/core/sanitize.rs

/// Decode the handful of entities EKAP notices actually emit.
pub fn normalize_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

/// Collapse runs of whitespace to single spaces and trim.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

/// Turkish-aware case fold with diacritics stripped.
///
/// "YÜKLENİCİ", "Yüklenici" and "Yuklenici" all fold to "yuklenici", so
/// keyword matching never depends on byte-literal Turkish characters.
/// Dotless I folds to plain i as well; in folded space the distinction
/// does not matter for label lookup.
pub fn fold_tr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            'İ' | 'I' | 'ı' => out.push('i'),
            'Ş' | 'ş' => out.push('s'),
            'Ğ' | 'ğ' => out.push('g'),
            'Ü' | 'ü' => out.push('u'),
            'Ö' | 'ö' => out.push('o'),
            'Ç' | 'ç' => out.push('c'),
            _ => out.extend(ch.to_lowercase()),
        }
    }
    out
}

/// Keep only ASCII digits.
pub fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// First run of consecutive ASCII digits, if any.
pub fn first_digit_run(s: &str) -> Option<String> {
    let run: String = s
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if run.is_empty() { None } else { Some(run) }
}
