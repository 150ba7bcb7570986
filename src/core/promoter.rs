//! Status promotion - confirms scheduled transactions once their date passes.

use chrono::{DateTime, Utc};
use tracing::{error, info};

use super::store::{LedgerStore, TransactionFilter, TransactionUpdate};
use crate::entities::TransactionStatus;

/// Outcome of one promotion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PromotionReport {
    /// Transactions moved from scheduled to confirmed
    pub promoted: usize,
    /// Transactions whose update (or the initial query) failed
    pub failed: usize,
}

/// Confirms every scheduled transaction dated at or before `now`.
///
/// Status only ever moves from scheduled to confirmed, and a second run with
/// the same `now` writes nothing. Never fails; a failed update is logged and
/// left scheduled for the next run.
///
/// # Arguments
/// * `store` - Ledger store holding the scheduled transactions
/// * `now` - Transactions dated at or before this instant are confirmed
///
/// # Returns
/// A [`PromotionReport`]; `failed` is 1 when the initial query failed.
pub async fn promote_due<S: LedgerStore>(store: &S, now: DateTime<Utc>) -> PromotionReport {
    let mut report = PromotionReport::default();

    let scheduled = match store
        .query_transactions(&TransactionFilter::new().status(TransactionStatus::Scheduled))
        .await
    {
        Ok(scheduled) => scheduled,
        Err(e) => {
            error!("Failed to load scheduled transactions: {}", e);
            report.failed += 1;
            return report;
        }
    };

    for tx in scheduled.into_iter().filter(|tx| tx.date <= now) {
        match store
            .update_transaction(tx.id, TransactionUpdate::confirm())
            .await
        {
            Ok(_) => {
                info!("Confirmed transaction {} ({}) dated {}", tx.id, tx.description, tx.date);
                report.promoted += 1;
            }
            Err(e) => {
                error!("Failed to confirm transaction {}: {}", tx.id, e);
                report.failed += 1;
            }
        }
    }

    report
}
