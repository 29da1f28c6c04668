use rust_decimal::Decimal;
use tracing::warn;

use crate::history::{extract_invoice_number, extract_supplier_code};
use crate::model::{EntryRole, LedgerEntry, MatchConfidence};
use crate::value::normalize_supplier_code;

/// Classify every filtered ledger entry in place: assign its movement
/// role, pull invoice/supplier tokens out of the history text, and stamp
/// a baseline match confidence. The tracer may upgrade or downgrade the
/// confidence later once it sees the supplier context.
pub fn classify_entries(entries: &mut [LedgerEntry]) {
    for entry in entries.iter_mut() {
        entry.entry_role = resolve_role(entry);
        entry.extracted_invoice = extract_invoice_number(&entry.history_text);
        entry.extracted_supplier_code = extract_supplier_code(&entry.history_text);

        let item_code = normalize_supplier_code(&entry.item_code);
        let history_code = entry
            .extracted_supplier_code
            .as_deref()
            .and_then(normalize_supplier_code);

        // History references name the supplier base without its branch,
        // so the comparison ignores the branch digits. A history line
        // that names the same supplier as the item field is the
        // strongest attribution available before tracing.
        match (item_code, history_code) {
            (Some(a), Some(b)) if supplier_base(&a) == supplier_base(&b) => {
                entry.match_confidence = MatchConfidence::High;
                entry.match_criterion = "code found in history".to_string();
            }
            (Some(_), _) => {
                entry.match_confidence = MatchConfidence::Low;
                entry.match_criterion = "item code".to_string();
            }
            (None, Some(_)) => {
                entry.match_confidence = MatchConfidence::Medium;
                entry.match_criterion = "history code only".to_string();
            }
            (None, None) => {
                entry.match_confidence = MatchConfidence::Low;
                entry.match_criterion = "unattributed".to_string();
            }
        }
    }
}

/// The 6-digit base of a canonical `C` + base + branch supplier code.
pub fn supplier_base(canonical: &str) -> &str {
    let stripped = canonical.strip_prefix('C').unwrap_or(canonical);
    &stripped[..stripped.len().min(6)]
}

fn resolve_role(entry: &LedgerEntry) -> EntryRole {
    let has_debit = entry.debit_amount > Decimal::ZERO;
    let has_credit = entry.credit_amount > Decimal::ZERO;
    match (has_debit, has_credit) {
        (true, true) => {
            // Extract artifacts occasionally land both movements in one
            // row. Credit carries the liability posting, so it wins.
            warn!(
                row = entry.row_index,
                debit = %entry.debit_amount,
                credit = %entry.credit_amount,
                "entry carries both movements, treating as credit"
            );
            EntryRole::Credit
        }
        (false, true) => EntryRole::Credit,
        (true, false) => EntryRole::Debit,
        (false, false) => EntryRole::Undefined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry(item: &str, history: &str, debit: Decimal, credit: Decimal) -> LedgerEntry {
        LedgerEntry {
            row_index: 0,
            account_code: "2.01.01.001".to_string(),
            entry_date: None,
            batch_id: String::new(),
            history_text: history.to_string(),
            branch: String::new(),
            cost_center: String::new(),
            item_code: item.to_string(),
            debit_amount: debit,
            credit_amount: credit,
            amount: if credit > Decimal::ZERO { credit } else { debit },
            entry_role: EntryRole::Undefined,
            extracted_invoice: None,
            extracted_supplier_code: None,
            match_confidence: MatchConfidence::Low,
            match_criterion: String::new(),
        }
    }

    #[test]
    fn roles_follow_movement_side() {
        let mut entries = vec![
            entry("004111-01", "", dec!(0), dec!(100)),
            entry("004111-01", "", dec!(100), dec!(0)),
            entry("004111-01", "", dec!(0), dec!(0)),
        ];
        classify_entries(&mut entries);
        assert_eq!(entries[0].entry_role, EntryRole::Credit);
        assert_eq!(entries[1].entry_role, EntryRole::Debit);
        assert_eq!(entries[2].entry_role, EntryRole::Undefined);
    }

    #[test]
    fn both_movements_prefer_credit() {
        let mut entries = vec![entry("004111-01", "", dec!(50), dec!(100))];
        classify_entries(&mut entries);
        assert_eq!(entries[0].entry_role, EntryRole::Credit);
    }

    #[test]
    fn history_code_matching_item_is_high() {
        let mut entries = vec![entry(
            "004111-01",
            "PAGTO NF. 123 FORN 4111",
            dec!(0),
            dec!(100),
        )];
        classify_entries(&mut entries);
        let e = &entries[0];
        assert_eq!(e.extracted_invoice.as_deref(), Some("123"));
        assert_eq!(e.extracted_supplier_code.as_deref(), Some("4111"));
        assert_eq!(e.match_confidence, MatchConfidence::High);
        assert_eq!(e.match_criterion, "code found in history");
    }

    #[test]
    fn item_only_is_low() {
        let mut entries = vec![entry("004111-01", "TARIFA MENSAL", dec!(0), dec!(100))];
        classify_entries(&mut entries);
        assert_eq!(entries[0].match_confidence, MatchConfidence::Low);
        assert_eq!(entries[0].match_criterion, "item code");
    }

    #[test]
    fn no_attribution_at_all() {
        let mut entries = vec![entry("SALDO", "AJUSTE MANUAL", dec!(100), dec!(0))];
        classify_entries(&mut entries);
        assert_eq!(entries[0].match_confidence, MatchConfidence::Low);
        assert_eq!(entries[0].match_criterion, "unattributed");
    }
}
