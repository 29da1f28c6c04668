use std::sync::LazyLock;

use regex::Regex;

// ---------------------------------------------------------------------------
// History-text extraction
// ---------------------------------------------------------------------------
//
// Ledger history lines are free text typed by accountants. Two token kinds
// are worth pulling out: invoice numbers and supplier codes. Each kind has
// a family of patterns tried in priority order; the first hit wins.

static INVOICE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\bNF\.?\s*(\d+)",
        r"\bNOTA\s+FISCAL\s*\.?\s*(\d+)",
        r"\bN\.?F\.?E\.?\s*(\d+)",
        r"\bDOC\.?\s*(\d+)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static SUPPLIER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"\bFORNECEDOR\s*\.?\s*(\d+)", r"\bFORN\.?\s*(\d+)"]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
});

fn first_capture(patterns: &[Regex], text: &str) -> Option<String> {
    for pattern in patterns {
        if let Some(caps) = pattern.captures(text) {
            if let Some(m) = caps.get(1) {
                return Some(m.as_str().to_string());
            }
        }
    }
    None
}

/// Pull an invoice number out of a history line, if one is present.
///
/// Matching is case-insensitive via uppercasing; "NF." forms take priority
/// over the spelled-out "NOTA FISCAL" forms.
pub fn extract_invoice_number(history: &str) -> Option<String> {
    let upper = history.to_uppercase();
    first_capture(&INVOICE_PATTERNS, &upper)
}

/// Pull a supplier code reference ("FORN 1234", "FORNECEDOR 1234") out of
/// a history line.
pub fn extract_supplier_code(history: &str) -> Option<String> {
    let upper = history.to_uppercase();
    first_capture(&SUPPLIER_PATTERNS, &upper)
}
