//! Scheduler pass - generation followed by promotion for the current month.
//!
//! A [`Scheduler`] owns its store handle and the per-key locks used by the
//! generator. [`Scheduler::run_pass`] is what the binary calls at start-up and
//! on every tick. It is idempotent and never returns an error.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{error, info, instrument};

use super::{
    generator::{self, GenerationReport},
    locks::PeriodLocks,
    period::YearMonth,
    preview::{self, VirtualOccurrence},
    promoter::{self, PromotionReport},
    store::LedgerStore,
};
use crate::{entities::recurring_template, errors::Result};

/// Summary of one scheduler pass.
#[derive(Debug, Clone)]
pub struct PassReport {
    /// Month generation ran for
    pub period: YearMonth,
    /// Instant the pass was evaluated at
    pub ran_at: DateTime<Utc>,
    /// Active templates considered (0 when loading them failed)
    pub templates_considered: usize,
    /// Whether loading the active templates failed
    pub template_load_failed: bool,
    /// Generation outcome
    pub generation: GenerationReport,
    /// Promotion outcome
    pub promotion: PromotionReport,
}

impl PassReport {
    /// Total number of failures recorded during the pass.
    #[must_use]
    pub fn failures(&self) -> usize {
        usize::from(self.template_load_failed) + self.generation.failed + self.promotion.failed
    }
}

/// Runs recurring generation and status promotion against a store.
#[derive(Debug)]
pub struct Scheduler<S> {
    store: S,
    locks: PeriodLocks,
}

impl<S: LedgerStore> Scheduler<S> {
    /// Creates a scheduler over `store`.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: PeriodLocks::new(),
        }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Generates this month's instances and confirms due transactions.
    ///
    /// The month is the UTC calendar month containing `now`. A failure to load
    /// templates skips generation but still runs promotion.
    ///
    /// # Returns
    /// A [`PassReport`]; failures are counted there instead of returned.
    #[instrument(skip(self))]
    pub async fn run_pass(&self, now: DateTime<Utc>) -> PassReport {
        let period = YearMonth::containing(now);

        let (templates, template_load_failed) = match self.store.query_active_templates().await {
            Ok(templates) => (templates, false),
            Err(e) => {
                error!("Failed to load recurring templates: {}", e);
                (Vec::new(), true)
            }
        };

        let generation = self.generate_for_period(&templates, period, now).await;
        let promotion = self.promote_due(now).await;

        let report = PassReport {
            period,
            ran_at: now,
            templates_considered: templates.len(),
            template_load_failed,
            generation,
            promotion,
        };
        info!(
            "Scheduler pass for {}: {} generated, {} promoted, {} failures",
            period,
            report.generation.created.len(),
            report.promotion.promoted,
            report.failures()
        );
        report
    }

    /// Generates at most one instance per template for `period`.
    pub async fn generate_for_period(
        &self,
        templates: &[recurring_template::Model],
        period: YearMonth,
        now: DateTime<Utc>,
    ) -> GenerationReport {
        generator::generate_for_period(&self.store, &self.locks, templates, period, now).await
    }

    /// Confirms every scheduled transaction dated at or before `now`.
    pub async fn promote_due(&self, now: DateTime<Utc>) -> PromotionReport {
        promoter::promote_due(&self.store, now).await
    }

    /// Recurring occurrences on `date` that have not been generated yet.
    pub async fn preview_for_date(&self, date: NaiveDate) -> Result<Vec<VirtualOccurrence>> {
        preview::virtual_occurrences_for_date(&self.store, date).await
    }

    /// Recurring occurrences in `period` that have not been generated yet.
    pub async fn preview_for_month(&self, period: YearMonth) -> Result<Vec<VirtualOccurrence>> {
        preview::virtual_occurrences_for_month(&self.store, period).await
    }
}

/// Formats a pass report into a human-readable summary for logs.
#[must_use]
pub fn format_pass_summary(report: &PassReport) -> String {
    use std::fmt::Write;

    let mut summary = format!(
        "Scheduler pass - {} - {} active templates\n",
        report.period, report.templates_considered
    );

    // write! into a String cannot fail
    let _ = writeln!(
        summary,
        "  Generated: {} | Already present or ineligible: {} | Promoted: {}",
        report.generation.created.len(),
        report.generation.skipped,
        report.promotion.promoted
    );

    for tx in &report.generation.created {
        let amount = tx
            .amount
            .map_or_else(|| "variable".to_string(), |amount| format!("{amount:.2}"));
        let _ = writeln!(
            summary,
            "  + {} {} | {} | {:?}",
            tx.date.format("%Y-%m-%d"),
            tx.description,
            amount,
            tx.status
        );
    }

    if report.failures() > 0 {
        let _ = writeln!(
            summary,
            "  Failures: {} (will be retried on the next pass)",
            report.failures()
        );
    }

    summary
}
