use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::config::ReconcileConfig;
use crate::model::{DifferenceRecord, DifferenceType, LedgerEntry, Presence, SupplierTotal};
use crate::value::split_code_and_name;

// ---------------------------------------------------------------------------
// Ledger-side aggregation
// ---------------------------------------------------------------------------

/// A supplier's net ledger position: credits post liabilities into a
/// payable account, debits settle them, so the open balance is the sum
/// of credits minus the sum of debits.
#[derive(Debug, Clone)]
pub struct LedgerPosition {
    pub total: Decimal,
    pub display_name: String,
    pub entry_count: usize,
}

/// Aggregate account-filtered ledger entries per normalized supplier
/// code (the item field of the entry). Entries whose item carries no
/// digits cannot be attributed and are skipped here; they remain
/// visible to the tracer as individual lines.
pub fn aggregate_ledger(entries: &[LedgerEntry]) -> BTreeMap<String, LedgerPosition> {
    let mut positions: BTreeMap<String, LedgerPosition> = BTreeMap::new();

    for entry in entries {
        let (code, name) = split_code_and_name(&entry.item_code);
        let Some(code) = code else {
            continue;
        };
        let position = positions.entry(code).or_insert_with(|| LedgerPosition {
            total: Decimal::ZERO,
            display_name: name.clone(),
            entry_count: 0,
        });
        position.total += entry.credit_amount - entry.debit_amount;
        position.entry_count += 1;
        if position.display_name.chars().all(|c| !c.is_alphabetic())
            && name.chars().any(|c| c.is_alphabetic())
        {
            position.display_name = name;
        }
    }

    positions
}

// ---------------------------------------------------------------------------
// Outer-join difference calculation
// ---------------------------------------------------------------------------

/// Full outer join of the two per-supplier views. Every supplier seen
/// on either side yields exactly one record; the absent side contributes
/// zero. Output is ordered largest absolute difference first, supplier
/// code as the tiebreak, so repeated runs over the same input are
/// byte-identical.
pub fn compute_differences(
    financial: &[SupplierTotal],
    ledger: &BTreeMap<String, LedgerPosition>,
    config: &ReconcileConfig,
) -> Vec<DifferenceRecord> {
    let tolerance = config.thresholds.reconcile;
    let mut records = Vec::with_capacity(financial.len() + ledger.len());
    let mut seen = std::collections::BTreeSet::new();

    for total in financial {
        seen.insert(total.supplier_code.clone());
        let position = ledger.get(&total.supplier_code);
        let ledger_amount = position.map(|p| p.total).unwrap_or(Decimal::ZERO);
        let presence = if position.is_some() {
            Presence::Both
        } else {
            Presence::FinancialOnly
        };
        records.push(build_record(
            &total.supplier_code,
            &total.display_name,
            total.total_amount,
            ledger_amount,
            presence,
            tolerance,
        ));
    }

    for (code, position) in ledger {
        if seen.contains(code) {
            continue;
        }
        records.push(build_record(
            code,
            &position.display_name,
            Decimal::ZERO,
            position.total,
            Presence::LedgerOnly,
            tolerance,
        ));
    }

    records.sort_by(|a, b| {
        b.difference_abs
            .cmp(&a.difference_abs)
            .then_with(|| a.supplier_code.cmp(&b.supplier_code))
    });
    records
}

fn build_record(
    supplier_code: &str,
    display_name: &str,
    financial_amount: Decimal,
    ledger_amount: Decimal,
    presence: Presence,
    tolerance: Decimal,
) -> DifferenceRecord {
    let difference = ledger_amount - financial_amount;
    let difference_abs = difference.abs();

    // An in-tolerance difference reconciles no matter which sides the
    // supplier appears on.
    let difference_type = if difference_abs <= tolerance {
        DifferenceType::NoDifference
    } else if presence != Presence::Both {
        DifferenceType::Exclusive
    } else if difference > Decimal::ZERO {
        DifferenceType::LedgerGreater
    } else {
        DifferenceType::FinancialGreater
    };

    let difference_pct = if financial_amount != Decimal::ZERO {
        Some(difference * Decimal::from(100) / financial_amount)
    } else {
        None
    };

    DifferenceRecord {
        supplier_code: supplier_code.to_string(),
        display_name: display_name.to_string(),
        financial_amount,
        ledger_amount,
        difference,
        difference_abs,
        difference_pct,
        difference_type,
        presence,
    }
}
