//! Instance generation - materializes recurring templates into transactions.
//!
//! For one calendar month, each eligible template gets at most one
//! transaction. Re-running generation for a month that already has its
//! instances is a no-op, and a store failure for one template does not stop
//! the others.

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use super::{
    locks::{PeriodKey, PeriodLocks},
    period::YearMonth,
    recurrence,
    store::{LedgerStore, NewTransaction, existing_instance},
};
use crate::{
    entities::{recurring_template, transaction},
    errors::Result,
};

/// Outcome of generating instances for one month.
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    /// Transactions created by this run
    pub created: Vec<transaction::Model>,
    /// Templates that were ineligible or already had an instance
    pub skipped: usize,
    /// Templates whose store access failed; retried on the next run
    pub failed: usize,
}

/// Generates at most one transaction per template for `period`.
///
/// `now` decides whether a new instance starts out confirmed or scheduled.
/// Never fails; per-template errors are logged and counted in
/// [`GenerationReport::failed`].
///
/// # Arguments
/// * `store` - Ledger store to check and insert into
/// * `locks` - Per-key locks shared by every caller generating into `store`
/// * `templates` - Templates to evaluate, usually the active ones
/// * `period` - Month to generate for
/// * `now` - Evaluation instant
///
/// # Returns
/// A [`GenerationReport`] with the created transactions and the skipped and
/// failed counts.
pub async fn generate_for_period<S: LedgerStore>(
    store: &S,
    locks: &PeriodLocks,
    templates: &[recurring_template::Model],
    period: YearMonth,
    now: DateTime<Utc>,
) -> GenerationReport {
    let mut report = GenerationReport::default();

    for template in templates {
        match materialize(store, locks, template, period, now).await {
            Ok(Some(created)) => report.created.push(created),
            Ok(None) => report.skipped += 1,
            Err(e) => {
                error!(
                    template_id = template.id,
                    "Failed to generate '{}' for {}: {}", template.template_name, period, e
                );
                report.failed += 1;
            }
        }
    }

    report
}

/// Creates the instance of `template` for `period` unless it is ineligible or
/// already exists. Returns the new transaction, if one was created.
pub async fn materialize<S: LedgerStore>(
    store: &S,
    locks: &PeriodLocks,
    template: &recurring_template::Model,
    period: YearMonth,
    now: DateTime<Utc>,
) -> Result<Option<transaction::Model>> {
    let Some(date) = recurrence::materialization_date(template, period) else {
        return Ok(None);
    };

    let _guard = locks.acquire(PeriodKey::new(template.id, period)).await;

    if let Some(existing) = existing_instance(store, template.id, period).await? {
        debug!(
            template_id = template.id,
            "'{}' already has transaction {} for {}", template.template_name, existing.id, period
        );
        return Ok(None);
    }

    let record = NewTransaction::from_template(template, recurrence::target_instant(date), now);
    let created = store.add_transaction(record).await?;
    info!(
        template_id = template.id,
        "Generated transaction {} for '{}' on {} ({:?})",
        created.id,
        template.template_name,
        date,
        created.status
    );

    Ok(Some(created))
}
