use std::collections::BTreeMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

use crate::config::ReconcileConfig;
use crate::error::ReconError;
use crate::headers::{FieldSpec, HeaderMap};
use crate::model::{
    CanonicalRecord, EntryRole, LedgerEntry, MatchConfidence, RawRow, SupplierTotal, TermClass,
};
use crate::value::{parse_amount_cell, parse_flexible_date, split_code_and_name};

// ---------------------------------------------------------------------------
// Field tables
// ---------------------------------------------------------------------------
//
// Synonyms are the normalized forms of every header variant the upstream
// report generators have been seen to emit. Priority order matters: the
// first synonym that resolves wins.

const FIN_SUPPLIER: FieldSpec = FieldSpec {
    field: "supplier",
    synonyms: &[
        "fornecedor",
        "codigo_nome_do_fornecedor",
        "codigo_lj_nome_do_fornecedor",
        "cliente_fornecedor",
        "codigo_nome",
        "codigo",
    ],
};

const FIN_OVERDUE: FieldSpec = FieldSpec {
    field: "overdue_amount",
    synonyms: &[
        "titulos_vencidos",
        "tit_vencidos",
        "valor_vencido",
        "vencidos",
    ],
};

const FIN_NOT_DUE: FieldSpec = FieldSpec {
    field: "not_due_amount",
    synonyms: &[
        "titulos_a_vencer",
        "tit_a_vencer",
        "valor_a_vencer",
        "a_vencer",
    ],
};

const FIN_DUE_DAYS: FieldSpec = FieldSpec {
    field: "overdue_days",
    synonyms: &["dias_vencidos", "dias_de_atraso", "dias_atraso"],
};

const FIN_DUE_DATE: FieldSpec = FieldSpec {
    field: "due_date",
    synonyms: &["vencimento", "data_vencimento", "dt_vencimento"],
};

const LED_ACCOUNT: FieldSpec = FieldSpec {
    field: "account",
    synonyms: &["conta_contabil", "conta", "cta"],
};

const LED_DATE: FieldSpec = FieldSpec {
    field: "entry_date",
    synonyms: &["data_lancamento", "dt_lancamento", "data"],
};

const LED_BATCH: FieldSpec = FieldSpec {
    field: "batch",
    synonyms: &["lote", "numero_lote", "nr_lote"],
};

const LED_HISTORY: FieldSpec = FieldSpec {
    field: "history",
    synonyms: &["historico", "complemento", "descricao"],
};

const LED_BRANCH: FieldSpec = FieldSpec {
    field: "branch",
    synonyms: &["filial", "cod_filial"],
};

const LED_COST_CENTER: FieldSpec = FieldSpec {
    field: "cost_center",
    synonyms: &["centro_de_custo", "centro_custo", "c_custo", "ccusto"],
};

const LED_ITEM: FieldSpec = FieldSpec {
    field: "item",
    synonyms: &["item_conta", "cod_item", "codigo_item", "item"],
};

const LED_DEBIT: FieldSpec = FieldSpec {
    field: "debit",
    synonyms: &["vlr_debito", "valor_debito", "debito"],
};

const LED_CREDIT: FieldSpec = FieldSpec {
    field: "credit",
    synonyms: &["vlr_credito", "valor_credito", "credito"],
};

// ---------------------------------------------------------------------------
// Financial ingestion
// ---------------------------------------------------------------------------

/// Normalize the financial extract into canonical per-title records.
///
/// Rows whose supplier identifier yields no code are dropped (with a
/// count); unparseable amount cells are treated as zero so a partially
/// filled row still contributes what it does carry.
pub fn ingest_financial(
    headers: &[String],
    rows: &[RawRow],
    config: &ReconcileConfig,
) -> Result<(Vec<CanonicalRecord>, usize), ReconError> {
    let map = HeaderMap::new("financial", headers);
    let supplier_idx = map.resolve(&FIN_SUPPLIER)?;
    let overdue_idx = map.resolve(&FIN_OVERDUE)?;
    let not_due_idx = map.resolve(&FIN_NOT_DUE)?;
    let due_days_idx = map.find(&FIN_DUE_DAYS);
    let due_date_idx = map.find(&FIN_DUE_DATE);

    let reference = config.reference_date();
    let mut records = Vec::with_capacity(rows.len());
    let mut dropped = 0usize;

    for (row_index, row) in rows.iter().enumerate() {
        let identifier = row.get(supplier_idx).as_text();
        let (code, name) = split_code_and_name(&identifier);
        let Some(supplier_code) = code else {
            debug!(row = row_index, identifier = %identifier, "financial row dropped: no supplier code");
            dropped += 1;
            continue;
        };

        let overdue = parse_amount_cell(row.get(overdue_idx)).unwrap_or(Decimal::ZERO);
        let not_due = parse_amount_cell(row.get(not_due_idx)).unwrap_or(Decimal::ZERO);

        // Positive = past due, negative = still in the future.
        let due_days = due_date_idx
            .and_then(|idx| parse_flexible_date(row.get(idx)))
            .map(|due| (reference - due).num_days())
            .or_else(|| {
                due_days_idx.and_then(|idx| {
                    parse_amount_cell(row.get(idx))
                        .ok()
                        .and_then(|d| d.trunc().to_i64())
                })
            });

        // Short term up to a year of aging, long term beyond it.
        let term_class = match due_days {
            Some(d) if d > 365 => TermClass::LongTerm,
            _ => TermClass::ShortTerm,
        };

        records.push(CanonicalRecord {
            supplier_code,
            display_name: name,
            amount: overdue + not_due,
            due_days,
            term_class,
        });
    }

    Ok((records, dropped))
}

/// Collapse canonical financial records into one total per supplier code.
/// BTreeMap keeps the aggregation order deterministic across runs.
pub fn aggregate_financial(records: &[CanonicalRecord]) -> Vec<SupplierTotal> {
    let mut totals: BTreeMap<String, SupplierTotal> = BTreeMap::new();

    for record in records {
        let entry = totals
            .entry(record.supplier_code.clone())
            .or_insert_with(|| SupplierTotal {
                supplier_code: record.supplier_code.clone(),
                display_name: record.display_name.clone(),
                total_amount: Decimal::ZERO,
                due_days: None,
                term_class: None,
                record_count: 0,
            });

        entry.total_amount += record.amount;
        entry.record_count += 1;
        // Keep the most overdue title's day count for the aggregate.
        entry.due_days = match (entry.due_days, record.due_days) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        // A supplier with any short-term title is reported short-term.
        entry.term_class = match (entry.term_class, record.term_class) {
            (Some(TermClass::ShortTerm), _) | (_, TermClass::ShortTerm) => {
                Some(TermClass::ShortTerm)
            }
            _ => Some(TermClass::LongTerm),
        };
        if entry.display_name.is_empty() && !record.display_name.is_empty() {
            entry.display_name = record.display_name.clone();
        }
    }

    totals.into_values().collect()
}

// ---------------------------------------------------------------------------
// Ledger ingestion
// ---------------------------------------------------------------------------

/// Normalize the general-ledger extract into entries. Classification
/// (role, token extraction, confidence) happens downstream; entries come
/// out of here with the neutral defaults.
pub fn ingest_ledger(
    headers: &[String],
    rows: &[RawRow],
) -> Result<(Vec<LedgerEntry>, usize), ReconError> {
    let map = HeaderMap::new("ledger", headers);
    let account_idx = map.resolve(&LED_ACCOUNT)?;
    let history_idx = map.resolve(&LED_HISTORY)?;
    let item_idx = map.resolve(&LED_ITEM)?;
    let debit_idx = map.resolve(&LED_DEBIT)?;
    let credit_idx = map.resolve(&LED_CREDIT)?;
    let date_idx = map.find(&LED_DATE);
    let batch_idx = map.find(&LED_BATCH);
    let branch_idx = map.find(&LED_BRANCH);
    let cost_center_idx = map.find(&LED_COST_CENTER);

    let mut entries = Vec::with_capacity(rows.len());
    let mut dropped = 0usize;

    for (row_index, row) in rows.iter().enumerate() {
        let account_code = row.get(account_idx).as_text().trim().to_string();
        let history_text = row.get(history_idx).as_text().trim().to_string();
        let debit = parse_amount_cell(row.get(debit_idx)).ok();
        let credit = parse_amount_cell(row.get(credit_idx)).ok();

        // Subtotal lines, repeated header bands and blank filler all come
        // through with no account and no parseable movement.
        if account_code.is_empty() && debit.is_none() && credit.is_none() {
            debug!(row = row_index, "ledger row dropped: no account, no movement");
            dropped += 1;
            continue;
        }

        let debit_amount = debit.unwrap_or(Decimal::ZERO).abs();
        let credit_amount = credit.unwrap_or(Decimal::ZERO).abs();

        entries.push(LedgerEntry {
            row_index,
            account_code,
            entry_date: date_idx.and_then(|idx| parse_flexible_date(row.get(idx))),
            batch_id: batch_idx
                .map(|idx| row.get(idx).as_text().trim().to_string())
                .unwrap_or_default(),
            history_text,
            branch: branch_idx
                .map(|idx| row.get(idx).as_text().trim().to_string())
                .unwrap_or_default(),
            cost_center: cost_center_idx
                .map(|idx| row.get(idx).as_text().trim().to_string())
                .unwrap_or_default(),
            item_code: row.get(item_idx).as_text().trim().to_string(),
            debit_amount,
            credit_amount,
            // The moved amount is whichever side is nonzero, always
            // positive; direction lives in entry_role.
            amount: if credit_amount > Decimal::ZERO {
                credit_amount
            } else {
                debit_amount
            },
            entry_role: EntryRole::Undefined,
            extracted_invoice: None,
            extracted_supplier_code: None,
            match_confidence: MatchConfidence::Low,
            match_criterion: String::new(),
        });
    }

    Ok((entries, dropped))
}
