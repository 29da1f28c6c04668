use tracing::info;

use crate::config::ReconcileConfig;
use crate::error::ReconError;
use crate::model::{ReconInput, RunMeta, RunResult};
use crate::{classify, diff, filter, ingest, summary, tracer};

/// Run the full reconciliation pipeline over one pair of extracts.
///
/// Single-pass, in-memory batch: ingest both sources, restrict the
/// ledger to the account under reconciliation, classify its entries,
/// difference the two per-supplier views, and trace every difference.
/// Row-level problems never abort the run; only config and schema
/// failures do.
pub fn run(input: &ReconInput, config: &ReconcileConfig) -> Result<RunResult, ReconError> {
    config.validate()?;

    let (financial_records, financial_dropped) =
        ingest::ingest_financial(&input.financial_headers, &input.financial, config)?;
    let financial_totals = ingest::aggregate_financial(&financial_records);
    info!(
        rows = input.financial.len(),
        records = financial_records.len(),
        dropped = financial_dropped,
        suppliers = financial_totals.len(),
        "financial source ingested"
    );

    let (ledger_entries, ledger_dropped) =
        ingest::ingest_ledger(&input.ledger_headers, &input.ledger)?;
    let mut account_entries = filter::filter_by_account(ledger_entries, &input.account_code);
    classify::classify_entries(&mut account_entries);

    let ledger_positions = diff::aggregate_ledger(&account_entries);
    let differences = diff::compute_differences(&financial_totals, &ledger_positions, config);
    let reconciliations = tracer::trace_all(&differences, &account_entries, config);
    let summary = summary::summarize(&differences, &reconciliations);

    info!(
        suppliers = summary.total_suppliers,
        matched = summary.matched,
        divergent = summary.divergent,
        "reconciliation complete"
    );

    Ok(RunResult {
        meta: RunMeta {
            account_code: input.account_code.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            financial_rows_dropped: financial_dropped,
            ledger_rows_dropped: ledger_dropped,
        },
        summary,
        differences,
        reconciliations,
    })
}
