//! Core business logic - framework-agnostic ledger and scheduling operations.

/// Instance generation for one calendar month
pub mod generator;
/// Per-key locks guarding duplicate checks
pub mod locks;
/// `YYYY-MM` period arithmetic
pub mod period;
/// Read-only preview of not-yet-generated occurrences
pub mod preview;
/// Promotion of scheduled transactions once their date passes
pub mod promoter;
/// Template eligibility and target dates
pub mod recurrence;
/// Monthly totals
pub mod report;
/// The composed scheduler pass
pub mod scheduler;
/// The ledger store contract and its `SeaORM` implementation
pub mod store;
/// Recurring template management
pub mod template;
/// Manual transaction management
pub mod transaction;

pub use period::YearMonth;
pub use scheduler::{PassReport, Scheduler, format_pass_summary};
pub use store::LedgerStore;
