use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::model::CellValue;

/// A single cell failed numeric normalization. Recovered locally by the
/// caller (drop or zero-fill the row); never propagated as a run error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAmountError {
    pub value: String,
}

impl std::fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot parse amount '{}'", self.value)
    }
}

impl std::error::Error for ParseAmountError {}

/// Parse a localized amount string into an exact decimal.
///
/// Accepts Brazilian format (`.` thousands, `,` decimal: "1.234.567,89"),
/// parenthesized negatives ("(100,00)"), trailing-minus negatives,
/// trailing debit/credit suffix letters (`D` negates, `C` keeps), a
/// currency prefix ("R$"), and plain international forms when no comma
/// is present (one dot = decimal point, several dots = thousands).
pub fn parse_localized_amount(text: &str) -> Result<Decimal, ParseAmountError> {
    let err = || ParseAmountError {
        value: text.to_string(),
    };

    let mut s: String = text
        .trim()
        .replace('\u{00a0}', "")
        .replace(' ', "")
        .replace("R$", "")
        .replace("r$", "");

    if s.is_empty() {
        return Err(err());
    }

    let mut negative = false;

    // D/C movement suffix: D = debit balance (negate), C = credit (keep).
    let upper = s.to_uppercase();
    if upper.ends_with('D') {
        negative = true;
        s.truncate(s.len() - 1);
    } else if upper.ends_with('C') {
        s.truncate(s.len() - 1);
    }

    // Anything else non-numeric is noise from report formatting.
    s.retain(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-' | '(' | ')'));
    if s.is_empty() {
        return Err(err());
    }

    if s.starts_with('(') && s.ends_with(')') {
        negative = true;
        s = s[1..s.len() - 1].to_string();
    }
    if s.ends_with('-') {
        negative = true;
        s.truncate(s.len() - 1);
    }
    if let Some(rest) = s.strip_prefix('-') {
        negative = true;
        s = rest.to_string();
    }

    let has_comma = s.contains(',');
    let dot_count = s.matches('.').count();
    let normalized = if has_comma && dot_count > 0 {
        if s.rfind(',') > s.rfind('.') {
            // BR: 1.234,56
            s.replace('.', "").replace(',', ".")
        } else {
            // International: 1,234.56
            s.replace(',', "")
        }
    } else if has_comma {
        s.replace(',', ".")
    } else if dot_count > 1 {
        s.replace('.', "")
    } else {
        s
    };

    let value = Decimal::from_str(&normalized).map_err(|_| err())?;
    Ok(if negative { -value } else { value })
}

/// Normalize a raw supplier identifier into the canonical
/// `C` + 6-digit base + 2-digit branch form.
///
/// Raw identifiers appear as "NNNNNN-LL-Some Name" or as a digit run
/// embedded in other text. Returns `None` when no digits are present.
/// Idempotent: applying it to its own output is the identity.
pub fn normalize_supplier_code(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }

    let (base, branch) = if digits.len() >= 8 {
        (digits[..6].to_string(), digits[6..8].to_string())
    } else if digits.len() >= 6 {
        (digits[..6].to_string(), "00".to_string())
    } else {
        (format!("{digits:0>6}"), "00".to_string())
    };

    Some(format!("C{base}{branch}"))
}

/// Split a combined "code-branch-name" identifier column into its
/// normalized code and the display name, when the name part exists.
pub fn split_code_and_name(raw: &str) -> (Option<String>, String) {
    let trimmed = raw.trim();
    let parts: Vec<&str> = trimmed.splitn(3, '-').collect();

    let code = if parts.len() >= 2 {
        let base_digits: String = parts[0].chars().filter(|c| c.is_ascii_digit()).collect();
        let branch_digits: String = parts[1].chars().filter(|c| c.is_ascii_digit()).collect();
        if !base_digits.is_empty() && !branch_digits.is_empty() {
            Some(format!(
                "C{:0>6}{:0>2}",
                &base_digits[..base_digits.len().min(6)],
                &branch_digits[..branch_digits.len().min(2)]
            ))
        } else {
            normalize_supplier_code(trimmed)
        }
    } else {
        normalize_supplier_code(trimmed)
    };

    let name = if parts.len() == 3 {
        parts[2].trim().to_string()
    } else {
        trimmed.to_string()
    };

    (code, name)
}

// Excel serial epoch. Serial 1 = 1900-01-01 under the (bugged, but
// universal) 1900 date system.
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

fn from_excel_serial(serial: f64) -> Option<NaiveDate> {
    if serial < 1.0 || serial > 200_000.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(EXCEL_EPOCH.0, EXCEL_EPOCH.1, EXCEL_EPOCH.2)?;
    epoch.checked_add_signed(Duration::days(serial as i64))
}

/// Parse a date cell of any of the shapes the extracts deliver: a real
/// date, an Excel serial number (raw or as text), "dd/mm/yyyy" or
/// ISO "yyyy-mm-dd" text. Day-first is preferred for ambiguous text.
pub fn parse_flexible_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Date(d) => Some(*d),
        CellValue::Number(n) => from_excel_serial(*n),
        CellValue::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            if let Ok(n) = s.replace(',', ".").parse::<f64>() {
                return from_excel_serial(n);
            }
            for fmt in ["%d/%m/%Y", "%d/%m/%y", "%Y-%m-%d", "%d-%m-%Y"] {
                if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
                    return Some(d);
                }
            }
            None
        }
        CellValue::Empty => None,
    }
}

/// Parse an amount cell: numbers pass through exactly, text goes through
/// the localized parser.
pub fn parse_amount_cell(cell: &CellValue) -> Result<Decimal, ParseAmountError> {
    match cell {
        CellValue::Number(n) => Decimal::try_from(*n).map_err(|_| ParseAmountError {
            value: n.to_string(),
        }),
        CellValue::Text(s) => parse_localized_amount(s),
        CellValue::Date(d) => Err(ParseAmountError {
            value: d.to_string(),
        }),
        CellValue::Empty => Err(ParseAmountError {
            value: String::new(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parse_brazilian_thousands() {
        assert_eq!(
            parse_localized_amount("1.234.567,89").unwrap(),
            dec!(1234567.89)
        );
        assert_eq!(parse_localized_amount("1234,56").unwrap(), dec!(1234.56));
    }

    #[test]
    fn parse_parenthesized_negative() {
        assert_eq!(parse_localized_amount("(100,00)").unwrap(), dec!(-100.00));
        assert_eq!(parse_localized_amount("100,00-").unwrap(), dec!(-100.00));
    }

    #[test]
    fn parse_debit_credit_suffix() {
        assert_eq!(parse_localized_amount("500,00D").unwrap(), dec!(-500.00));
        assert_eq!(parse_localized_amount("500,00C").unwrap(), dec!(500.00));
    }

    #[test]
    fn parse_currency_prefix_and_spaces() {
        assert_eq!(
            parse_localized_amount("R$ 1.500,25").unwrap(),
            dec!(1500.25)
        );
    }

    #[test]
    fn parse_international_forms() {
        assert_eq!(parse_localized_amount("1234.56").unwrap(), dec!(1234.56));
        assert_eq!(parse_localized_amount("1,234.56").unwrap(), dec!(1234.56));
        assert_eq!(parse_localized_amount("1.234.567").unwrap(), dec!(1234567));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_localized_amount("").is_err());
        assert!(parse_localized_amount("abc").is_err());
        assert!(parse_localized_amount("--").is_err());
    }

    #[test]
    fn normalize_code_separator_form() {
        assert_eq!(
            normalize_supplier_code("004111-01-RODA MAIS").as_deref(),
            Some("C00411101")
        );
    }

    #[test]
    fn normalize_code_embedded_run() {
        assert_eq!(
            normalize_supplier_code("17043618").as_deref(),
            Some("C17043618")
        );
        // 6-7 digits: branch defaults to 00
        assert_eq!(
            normalize_supplier_code("170436").as_deref(),
            Some("C17043600")
        );
        // short runs are zero-padded
        assert_eq!(normalize_supplier_code("4111").as_deref(), Some("C00411100"));
        assert_eq!(normalize_supplier_code("sem numero"), None);
    }

    #[test]
    fn normalize_code_roundtrip_identity() {
        let canonical = normalize_supplier_code("004111-01").unwrap();
        assert_eq!(normalize_supplier_code(&canonical).unwrap(), canonical);
    }

    #[test]
    fn split_combined_identifier() {
        let (code, name) = split_code_and_name("004111-01-RODA MAIS RENOVADORA");
        assert_eq!(code.as_deref(), Some("C00411101"));
        assert_eq!(name, "RODA MAIS RENOVADORA");

        let (code, name) = split_code_and_name("17043618");
        assert_eq!(code.as_deref(), Some("C17043618"));
        assert_eq!(name, "17043618");
    }

    #[test]
    fn flexible_date_shapes() {
        let d = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        assert_eq!(
            parse_flexible_date(&CellValue::Text("15/01/2026".into())),
            Some(d)
        );
        assert_eq!(
            parse_flexible_date(&CellValue::Text("2026-01-15".into())),
            Some(d)
        );
        assert_eq!(parse_flexible_date(&CellValue::Date(d)), Some(d));
        // Excel serial for 2026-01-15
        let serial = (d - NaiveDate::from_ymd_opt(1899, 12, 30).unwrap()).num_days() as f64;
        assert_eq!(parse_flexible_date(&CellValue::Number(serial)), Some(d));
        assert_eq!(parse_flexible_date(&CellValue::Empty), None);
    }
}
