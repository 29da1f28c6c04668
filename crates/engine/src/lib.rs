//! `aprecon-engine` — Accounts-payable vs general-ledger reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded tabular extracts, returns the
//! per-supplier reconciliation with full line-level traces. No CLI or IO
//! dependencies.

pub mod classify;
pub mod config;
pub mod diff;
pub mod engine;
pub mod error;
pub mod filter;
pub mod headers;
pub mod history;
pub mod ingest;
pub mod model;
pub mod narrative;
pub mod summary;
pub mod tracer;
pub mod value;

pub use config::ReconcileConfig;
pub use engine::run;
pub use error::ReconError;
pub use model::{CellValue, RawRow, ReconInput, RunResult, SupplierReconciliation};
