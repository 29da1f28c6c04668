use std::collections::BTreeSet;

use rust_decimal::Decimal;
use tracing::debug;

use crate::classify::supplier_base;
use crate::config::ReconcileConfig;
use crate::model::{
    DifferenceRecord, EntryRole, LedgerEntry, MatchConfidence, ReconStatus,
    SupplierReconciliation,
};
use crate::narrative::{self, TraceFigures, TraceOutcome};
use crate::value::normalize_supplier_code;

// ---------------------------------------------------------------------------
// Reconciliation tracer
// ---------------------------------------------------------------------------
//
// Given one supplier's difference and the filtered-and-classified ledger,
// explain the difference in terms of individual ledger lines: which
// credits and debits belong to the supplier, whether the traced balance
// covers the financial side, and if not, which concrete entry most
// plausibly accounts for the gap.

/// Trace every supplier difference. Each supplier is derived
/// independently from its own slice of the ledger; order follows the
/// input difference list.
pub fn trace_all(
    differences: &[DifferenceRecord],
    entries: &[LedgerEntry],
    config: &ReconcileConfig,
) -> Vec<SupplierReconciliation> {
    differences
        .iter()
        .map(|record| trace_supplier(record, entries, config))
        .collect()
}

/// Produce the full trace for one supplier. Infallible: a supplier that
/// cannot be traced still comes out with empty trace lists and a
/// diagnostic narrative, never an error.
pub fn trace_supplier(
    record: &DifferenceRecord,
    entries: &[LedgerEntry],
    config: &ReconcileConfig,
) -> SupplierReconciliation {
    let tolerance = config.thresholds.reconcile;
    let target_base = supplier_base(&record.supplier_code).to_string();

    // Step 1: every entry attributable to this supplier, by item code or
    // by a code named in the history text. Indices keep row identity so
    // the union cannot double-count.
    let selected: BTreeSet<usize> = entries
        .iter()
        .enumerate()
        .filter(|(_, e)| entry_belongs_to(e, &target_base))
        .map(|(i, _)| i)
        .collect();

    let mut credit_entries = Vec::new();
    let mut debit_entries = Vec::new();
    for &i in &selected {
        match entries[i].entry_role {
            EntryRole::Credit => credit_entries.push(entries[i].clone()),
            EntryRole::Debit => debit_entries.push(entries[i].clone()),
            EntryRole::Undefined => {}
        }
    }

    let total_credit: Decimal = credit_entries.iter().map(|e| e.credit_amount).sum();
    let total_debit: Decimal = debit_entries.iter().map(|e| e.debit_amount).sum();
    let total_traced = total_credit - total_debit;
    let financial_amount = record.financial_amount;
    let residual = financial_amount - total_traced;

    let mut unrecorded_entries = Vec::new();
    let mut orphaned_entries = Vec::new();

    let outcome = if residual.abs() <= tolerance {
        TraceOutcome::Reconciled
    } else if residual > Decimal::ZERO {
        // Credit shortfall: a liability the financial side carries that
        // the traced ledger lines do not cover. Look for a credit on the
        // account that was never attributed to this supplier. This runs
        // even when no line was attributed at all, since the missing
        // credit may sit on the account under a foreign item code.
        let candidates = value_candidates(
            entries,
            &selected,
            EntryRole::Credit,
            residual,
            config,
            false,
        );
        let count = candidates.len();
        if count == 0 && selected.is_empty() {
            debug!(supplier = %record.supplier_code, "no attributable ledger lines");
            TraceOutcome::Untraceable
        } else {
            if let Some((idx, deviation_pct)) = candidates.into_iter().next() {
                unrecorded_entries.push(stamped(&entries[idx], deviation_pct, config));
            }
            TraceOutcome::CreditShortfall {
                shortfall: residual,
                candidates: count,
            }
        }
    } else if selected.is_empty() {
        debug!(supplier = %record.supplier_code, "no attributable ledger lines");
        TraceOutcome::Untraceable
    } else {
        // Orphaned credit: the ledger carries more credit for this
        // supplier than the financial side knows about. The explaining
        // line is among the supplier's own credits.
        let excess = -residual;
        let candidates =
            value_candidates(entries, &selected, EntryRole::Credit, excess, config, true);
        let count = candidates.len();
        if let Some((idx, deviation_pct)) = candidates.into_iter().next() {
            orphaned_entries.push(stamped(&entries[idx], deviation_pct, config));
        }
        TraceOutcome::OrphanedCredit {
            excess,
            candidates: count,
        }
    };

    let status = match outcome {
        TraceOutcome::Reconciled => ReconStatus::Matched,
        _ => ReconStatus::Divergent,
    };

    let figures = TraceFigures {
        credit_count: credit_entries.len(),
        total_credit,
        debit_count: debit_entries.len(),
        total_debit,
        financial_amount,
        total_traced,
    };

    SupplierReconciliation {
        supplier_code: record.supplier_code.clone(),
        display_name: record.display_name.clone(),
        financial_amount,
        ledger_amount: record.ledger_amount,
        difference: record.difference,
        difference_type: record.difference_type,
        status,
        status_color: status.color(),
        credit_entries,
        debit_entries,
        unrecorded_entries,
        orphaned_entries,
        total_credit,
        total_debit,
        total_traced,
        untraced_difference: residual,
        observation: narrative::observation(&figures, &outcome),
        recommendation: narrative::recommendation(&outcome),
    }
}

fn entry_belongs_to(entry: &LedgerEntry, target_base: &str) -> bool {
    if let Some(code) = normalize_supplier_code(&entry.item_code) {
        if supplier_base(&code) == target_base {
            return true;
        }
    }
    if let Some(raw) = &entry.extracted_supplier_code {
        if let Some(code) = normalize_supplier_code(raw) {
            if supplier_base(&code) == target_base {
                return true;
            }
        }
    }
    false
}

/// Entries of the given role whose amount falls within the value-match
/// window of `target`, as `(index, deviation_pct)` pairs ordered best
/// first: smallest deviation, then original row order. `within_selected`
/// flips the search between the supplier's own lines (orphan case) and
/// the unattributed remainder (shortfall case).
fn value_candidates(
    entries: &[LedgerEntry],
    selected: &BTreeSet<usize>,
    role: EntryRole,
    target: Decimal,
    config: &ReconcileConfig,
    within_selected: bool,
) -> Vec<(usize, Decimal)> {
    let window = config.thresholds.value_match_pct;
    let mut candidates: Vec<(usize, Decimal)> = entries
        .iter()
        .enumerate()
        .filter(|(i, e)| selected.contains(i) == within_selected && e.entry_role == role)
        .filter_map(|(i, e)| {
            let amount = match role {
                EntryRole::Credit => e.credit_amount,
                EntryRole::Debit => e.debit_amount,
                EntryRole::Undefined => return None,
            };
            let deviation_pct = (amount - target).abs() * Decimal::from(100) / target;
            (deviation_pct <= window).then_some((i, deviation_pct))
        })
        .collect();

    candidates.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    candidates
}

/// Clone a candidate entry with its confidence re-stamped by how close
/// its value came to the target amount.
fn stamped(entry: &LedgerEntry, deviation_pct: Decimal, config: &ReconcileConfig) -> LedgerEntry {
    let mut out = entry.clone();
    out.match_confidence = if deviation_pct < config.thresholds.high_pct {
        MatchConfidence::High
    } else if deviation_pct < config.thresholds.medium_pct {
        MatchConfidence::Medium
    } else {
        MatchConfidence::Low
    };
    out.match_criterion = format!("value match, deviation {:.2}%", deviation_pct);
    out
}
