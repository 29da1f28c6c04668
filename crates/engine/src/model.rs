use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One cell of a loaded spreadsheet. Upstream extracts are semi-structured:
/// the same column may carry text in one file and numbers or dates in the
/// next, so the raw value keeps its shape until the normalizer decides.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Empty,
}

impl CellValue {
    /// Text rendering used for header-keyed lookups and free-text fields.
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            Self::Date(d) => d.format("%d/%m/%Y").to_string(),
            Self::Empty => String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// A raw row: cell values positionally aligned with the source's headers.
#[derive(Debug, Clone)]
pub struct RawRow {
    pub cells: Vec<CellValue>,
}

impl RawRow {
    pub fn get(&self, idx: usize) -> &CellValue {
        self.cells.get(idx).unwrap_or(&CellValue::Empty)
    }
}

/// Pre-loaded input for one reconciliation run.
pub struct ReconInput {
    pub financial_headers: Vec<String>,
    pub financial: Vec<RawRow>,
    pub ledger_headers: Vec<String>,
    pub ledger: Vec<RawRow>,
    /// The structured account code under reconciliation, e.g. "2.01.01.001".
    pub account_code: String,
}

// ---------------------------------------------------------------------------
// Canonical records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TermClass {
    ShortTerm,
    LongTerm,
}

/// A normalized financial-source row. `supplier_code` is always present;
/// rows that fail normalization never become a CanonicalRecord.
#[derive(Debug, Clone)]
pub struct CanonicalRecord {
    pub supplier_code: String,
    pub display_name: String,
    pub amount: Decimal,
    pub due_days: Option<i64>,
    pub term_class: TermClass,
}

/// Per-supplier aggregate of one source.
#[derive(Debug, Clone, Serialize)]
pub struct SupplierTotal {
    pub supplier_code: String,
    pub display_name: String,
    pub total_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_class: Option<TermClass>,
    pub record_count: usize,
}

// ---------------------------------------------------------------------------
// Differences
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DifferenceType {
    NoDifference,
    LedgerGreater,
    FinancialGreater,
    Exclusive,
}

impl std::fmt::Display for DifferenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoDifference => write!(f, "NO_DIFFERENCE"),
            Self::LedgerGreater => write!(f, "LEDGER_GREATER"),
            Self::FinancialGreater => write!(f, "FINANCIAL_GREATER"),
            Self::Exclusive => write!(f, "EXCLUSIVE"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Presence {
    Both,
    LedgerOnly,
    FinancialOnly,
}

/// One supplier's position across the two sources. Built once per run
/// from the outer join; immutable afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct DifferenceRecord {
    pub supplier_code: String,
    pub display_name: String,
    pub financial_amount: Decimal,
    pub ledger_amount: Decimal,
    pub difference: Decimal,
    pub difference_abs: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difference_pct: Option<Decimal>,
    pub difference_type: DifferenceType,
    pub presence: Presence,
}

// ---------------------------------------------------------------------------
// Ledger entries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryRole {
    Debit,
    Credit,
    Undefined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchConfidence {
    High,
    Medium,
    Low,
}

/// A classified general-ledger line. Rows stay individually addressable
/// (keyed by `row_index`) so a discrepancy can be traced to the exact
/// lines that explain it.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntry {
    pub row_index: usize,
    pub account_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_date: Option<NaiveDate>,
    pub batch_id: String,
    pub history_text: String,
    pub branch: String,
    pub cost_center: String,
    pub item_code: String,
    pub debit_amount: Decimal,
    pub credit_amount: Decimal,
    pub amount: Decimal,
    pub entry_role: EntryRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_invoice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_supplier_code: Option<String>,
    pub match_confidence: MatchConfidence,
    pub match_criterion: String,
}

// ---------------------------------------------------------------------------
// Reconciliation output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconStatus {
    Matched,
    Divergent,
}

impl ReconStatus {
    /// Color taxonomy consumed by the presentation layer; keyed by client
    /// code elsewhere, so the strings are a contract.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Matched => "green",
            Self::Divergent => "red",
        }
    }
}

/// Full trace for one supplier. Computed once, atomically; there is no
/// incremental update path.
#[derive(Debug, Clone, Serialize)]
pub struct SupplierReconciliation {
    pub supplier_code: String,
    pub display_name: String,
    pub financial_amount: Decimal,
    pub ledger_amount: Decimal,
    pub difference: Decimal,
    pub difference_type: DifferenceType,
    pub status: ReconStatus,
    pub status_color: &'static str,
    pub credit_entries: Vec<LedgerEntry>,
    pub debit_entries: Vec<LedgerEntry>,
    pub unrecorded_entries: Vec<LedgerEntry>,
    pub orphaned_entries: Vec<LedgerEntry>,
    pub total_credit: Decimal,
    pub total_debit: Decimal,
    pub total_traced: Decimal,
    pub untraced_difference: Decimal,
    pub observation: String,
    pub recommendation: String,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub total_suppliers: usize,
    pub matched: usize,
    pub divergent: usize,
    pub pct_reconciled: Decimal,
    pub with_difference: usize,
    pub without_difference: usize,
    pub total_financial: Decimal,
    pub total_ledger: Decimal,
    pub net_difference: Decimal,
    pub largest_difference: Decimal,
    pub by_difference_type: std::collections::BTreeMap<String, usize>,
    pub alerts: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub account_code: String,
    pub engine_version: String,
    pub run_at: String,
    pub financial_rows_dropped: usize,
    pub ledger_rows_dropped: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub meta: RunMeta,
    pub summary: RunSummary,
    pub differences: Vec<DifferenceRecord>,
    pub reconciliations: Vec<SupplierReconciliation>,
}
