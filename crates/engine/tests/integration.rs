use aprecon_engine::model::{DifferenceType, ReconStatus};
use aprecon_engine::{run, CellValue, RawRow, ReconInput};

// Small in-memory extract builders. Column layouts mirror the real
// upstream reports: the financial side keyed by a combined
// code-branch-name column, the ledger side one line per posting.

fn text(s: &str) -> CellValue {
    CellValue::Text(s.to_string())
}

fn financial_headers() -> Vec<String> {
    ["Fornecedor", "Tit Vencidos", "Tit a Vencer", "Dias Vencidos"]
        .iter()
        .map(|h| h.to_string())
        .collect()
}

fn ledger_headers() -> Vec<String> {
    [
        "Conta Contabil",
        "Data",
        "Lote",
        "Historico",
        "Item Conta",
        "Vlr. Debito",
        "Vlr. Credito",
    ]
    .iter()
    .map(|h| h.to_string())
    .collect()
}

fn financial_row(supplier: &str, overdue: &str, not_due: &str) -> RawRow {
    RawRow {
        cells: vec![text(supplier), text(overdue), text(not_due), text("0")],
    }
}

fn ledger_row(account: &str, history: &str, item: &str, debit: &str, credit: &str) -> RawRow {
    RawRow {
        cells: vec![
            text(account),
            text("15/01/2026"),
            text("000042"),
            text(history),
            text(item),
            text(debit),
            text(credit),
        ],
    }
}

fn input(financial: Vec<RawRow>, ledger: Vec<RawRow>) -> ReconInput {
    ReconInput {
        financial_headers: financial_headers(),
        financial,
        ledger_headers: ledger_headers(),
        ledger,
        account_code: "2.01.01.001".to_string(),
    }
}

// -------------------------------------------------------------------------
// End-to-end scenarios
// -------------------------------------------------------------------------

#[test]
fn fully_reconciled_supplier() {
    // financial 500.00 against a single 500.00 ledger credit.
    let result = run(
        &input(
            vec![financial_row("004111-01-RODA MAIS", "500,00", "0,00")],
            vec![ledger_row(
                "2.01.01.001",
                "PAGTO NF. 123 FORN 4111",
                "004111-01",
                "0,00",
                "500,00",
            )],
        ),
        &Default::default(),
    )
    .unwrap();

    assert_eq!(result.summary.total_suppliers, 1);
    assert_eq!(result.summary.matched, 1);
    let recon = &result.reconciliations[0];
    assert_eq!(recon.supplier_code, "C00411101");
    assert_eq!(recon.status, ReconStatus::Matched);
    assert_eq!(recon.status_color, "green");
    assert_eq!(recon.total_traced.to_string(), "500.00");
    assert_eq!(recon.untraced_difference.to_string(), "0.00");
}

#[test]
fn shortfall_with_unattributed_candidate() {
    // financial 500.00, attributed credit 400.00, and an exact 100.00
    // credit elsewhere on the account.
    let result = run(
        &input(
            vec![financial_row("004111-01-RODA MAIS", "500,00", "0,00")],
            vec![
                ledger_row("2.01.01.001", "PAGTO FORN 4111", "004111-01", "0,00", "400,00"),
                ledger_row("2.01.01.001", "PAGTO DIVERSOS", "AVULSO", "0,00", "100,00"),
            ],
        ),
        &Default::default(),
    )
    .unwrap();

    let recon = &result.reconciliations[0];
    assert_eq!(recon.status, ReconStatus::Divergent);
    assert_eq!(recon.status_color, "red");
    assert_eq!(recon.unrecorded_entries.len(), 1);
    assert!(recon.observation.contains("100,00"));
    assert!(recon.observation.contains("nao contabilizado"));
}

#[test]
fn orphaned_credit_flagged() {
    // financial 400.00 but the ledger holds 500.00 of credit.
    let result = run(
        &input(
            vec![financial_row("004111-01-RODA MAIS", "400,00", "0,00")],
            vec![
                ledger_row("2.01.01.001", "FORN 4111", "004111-01", "0,00", "400,00"),
                ledger_row("2.01.01.001", "FORN 4111", "004111-01", "0,00", "100,00"),
            ],
        ),
        &Default::default(),
    )
    .unwrap();

    let recon = &result.reconciliations[0];
    assert_eq!(recon.status, ReconStatus::Divergent);
    assert_eq!(recon.orphaned_entries.len(), 1);
    assert!(recon.recommendation.contains("orfao"));
}

#[test]
fn account_filter_scopes_the_trace() {
    // Five ledger rows over three accounts; the target account holds
    // exactly three (credits 500.00 and 150.00, debit 200.00).
    let result = run(
        &input(
            vec![financial_row("004111-01-RODA MAIS", "450,00", "0,00")],
            vec![
                ledger_row("2.01.01.001", "FORN 4111", "004111-01", "0,00", "500,00"),
                ledger_row("2.01.01.001", "FORN 4111", "004111-01", "0,00", "150,00"),
                ledger_row("2.01.01.001", "FORN 4111", "004111-01", "200,00", "0,00"),
                ledger_row("1.01.01.002", "FORN 4111", "004111-01", "450,00", "0,00"),
                ledger_row("3.04.01.001", "TARIFAS", "BANCO", "12,50", "0,00"),
            ],
        ),
        &Default::default(),
    )
    .unwrap();

    let recon = &result.reconciliations[0];
    assert_eq!(recon.credit_entries.len(), 2);
    assert_eq!(recon.debit_entries.len(), 1);
    assert_eq!(recon.total_credit.to_string(), "650.00");
    assert_eq!(recon.total_debit.to_string(), "200.00");
    assert_eq!(recon.total_traced.to_string(), "450.00");
    assert_eq!(recon.status, ReconStatus::Matched);
}

#[test]
fn exclusive_suppliers_appear_on_both_sides() {
    let result = run(
        &input(
            vec![financial_row("004111-01-RODA MAIS", "300,00", "0,00")],
            vec![ledger_row(
                "2.01.01.001",
                "AJUSTE",
                "999999-00",
                "0,00",
                "75,00",
            )],
        ),
        &Default::default(),
    )
    .unwrap();

    assert_eq!(result.differences.len(), 2);
    for d in &result.differences {
        assert_eq!(d.difference_type, DifferenceType::Exclusive);
    }
    // Every supplier from either side gets a reconciliation record.
    assert_eq!(result.reconciliations.len(), 2);
}

#[test]
fn conservation_invariant_holds() {
    let result = run(
        &input(
            vec![
                financial_row("004111-01-RODA MAIS", "500,00", "120,00"),
                financial_row("000220-02-OUTRA", "80,00", "0,00"),
            ],
            vec![
                ledger_row("2.01.01.001", "FORN 4111", "004111-01", "0,00", "700,00"),
                ledger_row("2.01.01.001", "FORN 4111", "004111-01", "80,00", "0,00"),
                ledger_row("2.01.01.001", "FORN 220", "000220-02", "0,00", "80,00"),
            ],
        ),
        &Default::default(),
    )
    .unwrap();

    for recon in &result.reconciliations {
        assert_eq!(recon.total_credit - recon.total_debit, recon.total_traced);
        assert_eq!(
            recon.financial_amount - recon.total_traced,
            recon.untraced_difference
        );
    }
}

#[test]
fn repeated_runs_are_identical() {
    let build = || {
        input(
            vec![
                financial_row("004111-01-RODA MAIS", "500,00", "0,00"),
                financial_row("000220-02-OUTRA", "80,00", "0,00"),
            ],
            vec![
                ledger_row("2.01.01.001", "FORN 4111", "004111-01", "0,00", "400,00"),
                ledger_row("2.01.01.001", "AVULSO", "DIVERSOS", "0,00", "100,00"),
            ],
        )
    };

    let a = run(&build(), &Default::default()).unwrap();
    let b = run(&build(), &Default::default()).unwrap();

    let a_json = serde_json::to_string(&a.reconciliations).unwrap();
    let b_json = serde_json::to_string(&b.reconciliations).unwrap();
    assert_eq!(a_json, b_json);

    let a_diff = serde_json::to_string(&a.differences).unwrap();
    let b_diff = serde_json::to_string(&b.differences).unwrap();
    assert_eq!(a_diff, b_diff);
}

#[test]
fn tolerance_boundary_is_inclusive() {
    let result = run(
        &input(
            vec![financial_row("004111-01-RODA MAIS", "500,01", "0,00")],
            vec![ledger_row(
                "2.01.01.001",
                "FORN 4111",
                "004111-01",
                "0,00",
                "500,00",
            )],
        ),
        &Default::default(),
    )
    .unwrap();

    assert_eq!(
        result.differences[0].difference_type,
        DifferenceType::NoDifference
    );
    assert_eq!(result.reconciliations[0].status, ReconStatus::Matched);
}

#[test]
fn missing_ledger_column_is_fatal_with_context() {
    let mut bad = input(
        vec![financial_row("004111-01-RODA MAIS", "1,00", "0,00")],
        vec![],
    );
    bad.ledger_headers = vec!["Conta".to_string(), "Historico".to_string()];

    let err = run(&bad, &Default::default()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("'ledger'"));
    assert!(msg.contains("Conta"));
}
