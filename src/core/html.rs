// src/core/html.rs
//
// String-slice HTML walking. EKAP result notices are table soup with
// inconsistent markup across announcement vintages; a lenient scanner
// holds up better than a strict DOM here. Tag-name matching is
// case-insensitive and guards the tag-name boundary (so "<b" never
// matches "<br>" or "<body>").

use super::sanitize::{normalize_entities, normalize_ws};

/// ASCII-lowercase without touching multibyte chars, so byte offsets into
/// the lowered copy stay valid for the original.
pub fn to_lower(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
        .collect()
}

fn is_tag_boundary(b: u8) -> bool {
    matches!(b, b'>' | b'/' | b' ' | b'\t' | b'\r' | b'\n')
}

/// Next `<tag …>` opening position at or after `from` in the lowered doc.
fn find_open_ci(lc: &str, tag: &str, from: usize) -> Option<usize> {
    let pat = format!("<{tag}");
    let mut pos = from;
    while let Some(rel) = lc.get(pos..)?.find(&pat) {
        let start = pos + rel;
        match lc.as_bytes().get(start + pat.len()) {
            Some(&b) if is_tag_boundary(b) => return Some(start),
            None => return None,
            _ => pos = start + 1,
        }
    }
    None
}

/// Find the next `<tag …>…</tag>` block at or after `from`. Returns byte
/// offsets spanning the whole block including both tags. Blocks with a
/// missing close tag are skipped.
pub fn next_tag_block_ci(s: &str, tag: &str, from: usize) -> Option<(usize, usize)> {
    let lc = to_lower(s);
    let close = format!("</{tag}>");
    let start = find_open_ci(&lc, tag, from)?;
    let open_end = s[start..].find('>')? + start + 1;
    let end_rel = lc[open_end..].find(&close)?;
    Some((start, open_end + end_rel + close.len()))
}

/// Content between the opening tag and the final closing tag of a block.
pub fn inner_after_open_tag(block: &str) -> &str {
    if let Some(oe) = block.find('>') {
        if let Some(cs) = block.rfind('<') {
            if cs > oe {
                return &block[oe + 1..cs];
            }
        }
    }
    ""
}

/// Drop every tag, keep the text, collapse whitespace.
pub fn strip_tags<S: AsRef<str>>(s: S) -> String {
    let s = s.as_ref();
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    normalize_ws(&out)
}

/// Readable text of one tag block: entities decoded, tags stripped,
/// whitespace collapsed.
pub fn block_text(block: &str) -> String {
    strip_tags(normalize_entities(inner_after_open_tag(block)))
}

/// Document text as a reader would see it: script/style bodies removed,
/// then tags stripped.
pub fn visible_text(doc: &str) -> String {
    let mut kept = String::with_capacity(doc.len());
    let mut pos = 0usize;
    loop {
        let script = next_tag_block_ci(doc, "script", pos);
        let style = next_tag_block_ci(doc, "style", pos);
        let (s, e) = match (script, style) {
            (Some(a), Some(b)) => {
                if a.0 < b.0 { a } else { b }
            }
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => break,
        };
        kept.push_str(&doc[pos..s]);
        pos = e;
    }
    kept.push_str(&doc[pos..]);
    strip_tags(normalize_entities(&kept))
}

/// Iterate the `<tr>` blocks of a document or table slice, in order.
pub fn rows(doc: &str) -> impl Iterator<Item = &str> {
    let mut pos = 0usize;
    std::iter::from_fn(move || {
        let (s, e) = next_tag_block_ci(doc, "tr", pos)?;
        pos = e;
        Some(&doc[s..e])
    })
}

/// The `<td>`/`<th>` cell blocks of one row, in document order. A cell
/// with no close tag swallows the rest of the row.
pub fn cells(row: &str) -> Vec<&str> {
    let lc = to_lower(row);
    let mut out = Vec::new();
    let mut pos = 0usize;
    loop {
        let td = find_open_ci(&lc, "td", pos);
        let th = find_open_ci(&lc, "th", pos);
        let (start, close) = match (td, th) {
            (Some(a), Some(b)) if b < a => (b, "</th>"),
            (Some(a), _) => (a, "</td>"),
            (None, Some(b)) => (b, "</th>"),
            (None, None) => break,
        };
        let Some(open_end) = row[start..].find('>').map(|i| start + i + 1) else {
            break;
        };
        let end = match lc[open_end..].find(close) {
            Some(i) => open_end + i + close.len(),
            None => row.len(),
        };
        out.push(&row[start..end]);
        if end >= row.len() {
            break;
        }
        pos = end;
    }
    out
}

/// Generic label→value walk: scan every row, and wherever `is_label`
/// accepts a cell's text, collect the text of the nearest following cell
/// in that row, in document order. Labels with no following cell are
/// skipped so a later candidate or strategy can still fire.
pub fn values_after_label<F>(doc: &str, mut is_label: F) -> Vec<String>
where
    F: FnMut(&str) -> bool,
{
    let mut out = Vec::new();
    for row in rows(doc) {
        let cs = cells(row);
        for (i, cell) in cs.iter().enumerate() {
            if !is_label(&block_text(cell)) {
                continue;
            }
            if let Some(value) = cs.get(i + 1) {
                let v = block_text(value);
                if !v.is_empty() {
                    out.push(v);
                }
            }
        }
    }
    out
}

/// First candidate of [`values_after_label`], when any caller-side
/// acceptance beyond non-emptiness is not needed.
pub fn value_after_label<F>(doc: &str, is_label: F) -> Option<String>
where
    F: FnMut(&str) -> bool,
{
    values_after_label(doc, is_label).into_iter().next()
}

/// Readable texts of every `<tag>` block in the slice, in order.
pub fn tag_texts(doc: &str, tag: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut pos = 0usize;
    while let Some((s, e)) = next_tag_block_ci(doc, tag, pos) {
        out.push(block_text(&doc[s..e]));
        pos = e;
    }
    out
}
