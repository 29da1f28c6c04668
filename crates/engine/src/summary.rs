use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::model::{DifferenceRecord, DifferenceType, ReconStatus, RunSummary, SupplierReconciliation};
use crate::narrative::format_brl;

/// Flag differences above this in the run's alert list.
const ALERT_THRESHOLD: Decimal = Decimal::ONE_THOUSAND;

/// Roll the per-supplier results up into run-level aggregates.
pub fn summarize(
    differences: &[DifferenceRecord],
    reconciliations: &[SupplierReconciliation],
) -> RunSummary {
    let total_suppliers = reconciliations.len();
    let matched = reconciliations
        .iter()
        .filter(|r| r.status == ReconStatus::Matched)
        .count();
    let divergent = total_suppliers - matched;

    let pct_reconciled = if total_suppliers > 0 {
        (Decimal::from(matched) * Decimal::from(100) / Decimal::from(total_suppliers)).round_dp(2)
    } else {
        Decimal::ZERO
    };

    let with_difference = differences
        .iter()
        .filter(|d| d.difference_type != DifferenceType::NoDifference)
        .count();

    let mut by_difference_type: BTreeMap<String, usize> = BTreeMap::new();
    for d in differences {
        *by_difference_type.entry(d.difference_type.to_string()).or_insert(0) += 1;
    }

    let total_financial: Decimal = differences.iter().map(|d| d.financial_amount).sum();
    let total_ledger: Decimal = differences.iter().map(|d| d.ledger_amount).sum();
    let largest_difference = differences
        .iter()
        .map(|d| d.difference_abs)
        .max()
        .unwrap_or(Decimal::ZERO);

    let net_difference = total_ledger - total_financial;
    let mut alerts = Vec::new();
    if net_difference.abs() > ALERT_THRESHOLD {
        alerts.push(format!(
            "Diferenca liquida relevante entre financeiro e razao: R$ {}",
            format_brl(net_difference.abs())
        ));
    }

    RunSummary {
        total_suppliers,
        matched,
        divergent,
        pct_reconciled,
        with_difference,
        without_difference: differences.len() - with_difference,
        total_financial,
        total_ledger,
        net_difference,
        largest_difference,
        by_difference_type,
        alerts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Presence;
    use rust_decimal_macros::dec;

    fn diff(code: &str, financial: Decimal, ledger: Decimal, ty: DifferenceType) -> DifferenceRecord {
        let d = ledger - financial;
        DifferenceRecord {
            supplier_code: code.to_string(),
            display_name: code.to_string(),
            financial_amount: financial,
            ledger_amount: ledger,
            difference: d,
            difference_abs: d.abs(),
            difference_pct: None,
            difference_type: ty,
            presence: Presence::Both,
        }
    }

    fn recon(status: ReconStatus) -> SupplierReconciliation {
        SupplierReconciliation {
            supplier_code: "C00411101".to_string(),
            display_name: String::new(),
            financial_amount: dec!(0),
            ledger_amount: dec!(0),
            difference: dec!(0),
            difference_type: DifferenceType::NoDifference,
            status,
            status_color: status.color(),
            credit_entries: Vec::new(),
            debit_entries: Vec::new(),
            unrecorded_entries: Vec::new(),
            orphaned_entries: Vec::new(),
            total_credit: dec!(0),
            total_debit: dec!(0),
            total_traced: dec!(0),
            untraced_difference: dec!(0),
            observation: String::new(),
            recommendation: String::new(),
        }
    }

    #[test]
    fn aggregates_counts_and_totals() {
        let differences = vec![
            diff("C00411101", dec!(500.00), dec!(500.00), DifferenceType::NoDifference),
            diff("C00022002", dec!(100.00), dec!(1500.00), DifferenceType::LedgerGreater),
        ];
        let recons = vec![recon(ReconStatus::Matched), recon(ReconStatus::Divergent)];
        let summary = summarize(&differences, &recons);

        assert_eq!(summary.total_suppliers, 2);
        assert_eq!(summary.matched, 1);
        assert_eq!(summary.divergent, 1);
        assert_eq!(summary.pct_reconciled, dec!(50.00));
        assert_eq!(summary.with_difference, 1);
        assert_eq!(summary.without_difference, 1);
        assert_eq!(summary.total_financial, dec!(600.00));
        assert_eq!(summary.total_ledger, dec!(2000.00));
        assert_eq!(summary.net_difference, dec!(1400.00));
        assert_eq!(summary.largest_difference, dec!(1400.00));
        assert_eq!(summary.by_difference_type["LEDGER_GREATER"], 1);
        assert_eq!(summary.alerts.len(), 1);
        assert!(summary.alerts[0].contains("1.400,00"));
    }

    #[test]
    fn empty_run_has_zero_percent() {
        let summary = summarize(&[], &[]);
        assert_eq!(summary.pct_reconciled, dec!(0));
        assert_eq!(summary.largest_difference, dec!(0));
        assert!(summary.alerts.is_empty());
    }
}
