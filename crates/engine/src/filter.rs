use tracing::info;

use crate::model::LedgerEntry;

/// True when the entry is posted to the target account. Account codes
/// are structured literals like "2.01.01.001"; the comparison is exact
/// and case-sensitive, trimming only surrounding whitespace. Anything
/// looser would admit sibling accounts into the reconciliation.
pub fn entry_in_account(entry_account: &str, target: &str) -> bool {
    let target = target.trim();
    !target.is_empty() && entry_account.trim() == target
}

/// Keep only the entries posted to the account under reconciliation.
/// Every other component downstream sees exclusively this subset.
pub fn filter_by_account(entries: Vec<LedgerEntry>, account_code: &str) -> Vec<LedgerEntry> {
    let total = entries.len();
    let kept: Vec<LedgerEntry> = entries
        .into_iter()
        .filter(|e| entry_in_account(&e.account_code, account_code))
        .collect();
    info!(
        account = account_code,
        kept = kept.len(),
        discarded = total - kept.len(),
        "account filter applied"
    );
    kept
}
