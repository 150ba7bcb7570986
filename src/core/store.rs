//! The ledger store contract used by the scheduler.
//!
//! The scheduler never talks to the database directly; it takes any
//! [`LedgerStore`] handle. [`DatabaseConnection`] implements it with `SeaORM`,
//! and tests wrap it to inject failures.

use std::future::Future;

use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};

use super::period::YearMonth;
use crate::{
    entities::{
        RecurringTemplate, Transaction, TransactionStatus, TransactionType, recurring_template,
        transaction,
    },
    errors::{Error, Result},
};

/// A transaction to be inserted. The store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// When the transaction happens
    pub date: DateTime<Utc>,
    /// Human-readable description
    pub description: String,
    /// Optional category label
    pub category: Option<String>,
    /// Magnitude, `None` when not yet known
    pub amount: Option<f64>,
    /// Income or expense
    pub transaction_type: TransactionType,
    /// Initial status
    pub status: TransactionStatus,
    /// Producing template, if any
    pub recurring_id: Option<i64>,
}

impl NewTransaction {
    /// The instance `template` materializes into at `date`, as seen at `now`.
    ///
    /// Variable-amount templates never pass their amount through.
    #[must_use]
    pub fn from_template(
        template: &recurring_template::Model,
        date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            date,
            description: template.description.clone(),
            category: None,
            amount: if template.is_variable_amount {
                None
            } else {
                template.amount
            },
            transaction_type: template.transaction_type,
            status: TransactionStatus::for_instant(date, now),
            recurring_id: Some(template.id),
        }
    }
}

/// Partial update of a transaction. Only the fields that are `Some` change.
///
/// Status can only move towards [`TransactionStatus::Confirmed`]; there is no
/// way to express a transition back to scheduled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionUpdate {
    /// Mark the transaction confirmed
    pub confirm: bool,
    /// New date
    pub date: Option<DateTime<Utc>>,
    /// New description
    pub description: Option<String>,
    /// New category (`Some(None)` clears it)
    pub category: Option<Option<String>>,
    /// New amount
    pub amount: Option<f64>,
    /// New direction
    pub transaction_type: Option<TransactionType>,
}

impl TransactionUpdate {
    /// An update that only confirms the transaction.
    #[must_use]
    pub fn confirm() -> Self {
        Self {
            confirm: true,
            ..Self::default()
        }
    }
}

/// Typed predicate over transactions. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Only transactions generated by this template
    pub recurring_id: Option<i64>,
    /// Only transactions with this status
    pub status: Option<TransactionStatus>,
    /// Inclusive lower bound on `date`
    pub date_from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `date`
    pub date_before: Option<DateTime<Utc>>,
}

impl TransactionFilter {
    /// A filter matching every transaction.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to instances of one template.
    #[must_use]
    pub const fn recurring_id(mut self, id: i64) -> Self {
        self.recurring_id = Some(id);
        self
    }

    /// Restrict to one status.
    #[must_use]
    pub const fn status(mut self, status: TransactionStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restrict to transactions dated inside `period` (UTC).
    #[must_use]
    pub fn within_period(mut self, period: YearMonth) -> Self {
        self.date_from = Some(period.start_utc());
        self.date_before = Some(period.end_utc());
        self
    }

    /// Evaluates the filter against a single record.
    #[must_use]
    pub fn matches(&self, tx: &transaction::Model) -> bool {
        self.recurring_id.is_none_or(|id| tx.recurring_id == Some(id))
            && self.status.is_none_or(|status| tx.status == status)
            && self.date_from.is_none_or(|from| tx.date >= from)
            && self.date_before.is_none_or(|before| tx.date < before)
    }
}

/// Persistence operations the scheduler relies on.
///
/// All operations are durable on return.
pub trait LedgerStore: Send + Sync {
    /// Inserts a transaction and returns it with its assigned id.
    fn add_transaction(
        &self,
        record: NewTransaction,
    ) -> impl Future<Output = Result<transaction::Model>> + Send;

    /// Applies a partial update to the transaction with `id`.
    fn update_transaction(
        &self,
        id: i64,
        changes: TransactionUpdate,
    ) -> impl Future<Output = Result<transaction::Model>> + Send;

    /// All transactions matching `filter`, oldest first.
    fn query_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> impl Future<Output = Result<Vec<transaction::Model>>> + Send;

    /// All templates with `is_active` set.
    fn query_active_templates(
        &self,
    ) -> impl Future<Output = Result<Vec<recurring_template::Model>>> + Send;
}

/// Looks up the instance of `template_id` for `period`, if one exists.
///
/// This is the duplicate check behind the at-most-one-instance-per-month
/// guarantee.
pub async fn existing_instance<S: LedgerStore>(
    store: &S,
    template_id: i64,
    period: YearMonth,
) -> Result<Option<transaction::Model>> {
    let filter = TransactionFilter::new()
        .recurring_id(template_id)
        .within_period(period);
    let mut found = store.query_transactions(&filter).await?;
    Ok(if found.is_empty() {
        None
    } else {
        Some(found.swap_remove(0))
    })
}

impl LedgerStore for DatabaseConnection {
    async fn add_transaction(&self, record: NewTransaction) -> Result<transaction::Model> {
        let model = transaction::ActiveModel {
            date: Set(record.date),
            description: Set(record.description),
            category: Set(record.category),
            amount: Set(record.amount),
            transaction_type: Set(record.transaction_type),
            status: Set(record.status),
            recurring_id: Set(record.recurring_id),
            ..Default::default()
        };

        model.insert(self).await.map_err(Into::into)
    }

    async fn update_transaction(
        &self,
        id: i64,
        changes: TransactionUpdate,
    ) -> Result<transaction::Model> {
        let existing = Transaction::find_by_id(id)
            .one(self)
            .await?
            .ok_or(Error::TransactionNotFound { id })?;

        let mut active_model: transaction::ActiveModel = existing.into();
        if changes.confirm {
            active_model.status = Set(TransactionStatus::Confirmed);
        }
        if let Some(date) = changes.date {
            active_model.date = Set(date);
        }
        if let Some(description) = changes.description {
            active_model.description = Set(description);
        }
        if let Some(category) = changes.category {
            active_model.category = Set(category);
        }
        if let Some(amount) = changes.amount {
            active_model.amount = Set(Some(amount));
        }
        if let Some(transaction_type) = changes.transaction_type {
            active_model.transaction_type = Set(transaction_type);
        }

        active_model.update(self).await.map_err(Into::into)
    }

    async fn query_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<transaction::Model>> {
        let mut query = Transaction::find();
        if let Some(id) = filter.recurring_id {
            query = query.filter(transaction::Column::RecurringId.eq(id));
        }
        if let Some(status) = filter.status {
            query = query.filter(transaction::Column::Status.eq(status));
        }
        if let Some(from) = filter.date_from {
            query = query.filter(transaction::Column::Date.gte(from));
        }
        if let Some(before) = filter.date_before {
            query = query.filter(transaction::Column::Date.lt(before));
        }

        query
            .order_by_asc(transaction::Column::Date)
            .order_by_asc(transaction::Column::Id)
            .all(self)
            .await
            .map_err(Into::into)
    }

    async fn query_active_templates(&self) -> Result<Vec<recurring_template::Model>> {
        RecurringTemplate::find()
            .filter(recurring_template::Column::IsActive.eq(true))
            .order_by_asc(recurring_template::Column::Id)
            .all(self)
            .await
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn manual(date: DateTime<Utc>, status: TransactionStatus) -> NewTransaction {
        NewTransaction {
            date,
            description: "Coffee".to_string(),
            category: Some("cafe".to_string()),
            amount: Some(4500.0),
            transaction_type: TransactionType::Expense,
            status,
            recurring_id: None,
        }
    }

    #[tokio::test]
    async fn test_add_and_query_transaction() -> Result<()> {
        let db = setup_test_db().await?;

        let created = db
            .add_transaction(manual(at(2024, 6, 3), TransactionStatus::Confirmed))
            .await?;
        assert!(created.id > 0);

        let all = db.query_transactions(&TransactionFilter::new()).await?;
        assert_eq!(all, vec![created]);

        Ok(())
    }

    #[tokio::test]
    async fn test_query_filters_by_period_and_status() -> Result<()> {
        let db = setup_test_db().await?;

        db.add_transaction(manual(at(2024, 5, 31), TransactionStatus::Confirmed))
            .await?;
        let june = db
            .add_transaction(manual(at(2024, 6, 1), TransactionStatus::Scheduled))
            .await?;
        db.add_transaction(manual(at(2024, 7, 1), TransactionStatus::Scheduled))
            .await?;

        let period: YearMonth = "2024-06".parse()?;
        let in_june = db
            .query_transactions(&TransactionFilter::new().within_period(period))
            .await?;
        assert_eq!(in_june, vec![june]);

        let scheduled = db
            .query_transactions(&TransactionFilter::new().status(TransactionStatus::Scheduled))
            .await?;
        assert_eq!(scheduled.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_transaction_applies_only_given_fields() -> Result<()> {
        let db = setup_test_db().await?;
        let created = db
            .add_transaction(manual(at(2024, 6, 3), TransactionStatus::Scheduled))
            .await?;

        let updated = db
            .update_transaction(created.id, TransactionUpdate::confirm())
            .await?;
        assert_eq!(updated.status, TransactionStatus::Confirmed);
        assert_eq!(updated.amount, Some(4500.0));
        assert_eq!(updated.description, "Coffee");

        let updated = db
            .update_transaction(
                created.id,
                TransactionUpdate {
                    amount: Some(5000.0),
                    category: Some(None),
                    ..TransactionUpdate::default()
                },
            )
            .await?;
        assert_eq!(updated.amount, Some(5000.0));
        assert_eq!(updated.category, None);
        assert_eq!(updated.status, TransactionStatus::Confirmed);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_transaction_fails() -> Result<()> {
        let db = setup_test_db().await?;

        let result = db.update_transaction(42, TransactionUpdate::confirm()).await;
        assert!(matches!(result, Err(Error::TransactionNotFound { id: 42 })));

        Ok(())
    }

    #[tokio::test]
    async fn test_query_active_templates_skips_inactive() -> Result<()> {
        let db = setup_test_db().await?;
        let active = create_test_template(&db, "Rent", 1).await?;
        let inactive = create_test_template(&db, "Gym", 5).await?;
        crate::core::template::set_template_active(&db, inactive.id, false).await?;

        let templates = db.query_active_templates().await?;
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].id, active.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_existing_instance_is_scoped_to_template_and_period() -> Result<()> {
        let db = setup_test_db().await?;
        let template = create_test_template(&db, "Rent", 1).await?;
        let june: YearMonth = "2024-06".parse()?;

        assert!(existing_instance(&db, template.id, june).await?.is_none());

        let record = NewTransaction::from_template(&template, at(2024, 6, 1), at(2024, 6, 2));
        let created = db.add_transaction(record).await?;

        assert_eq!(
            existing_instance(&db, template.id, june).await?,
            Some(created)
        );
        assert!(
            existing_instance(&db, template.id, "2024-07".parse()?)
                .await?
                .is_none()
        );
        assert!(existing_instance(&db, template.id + 1, june).await?.is_none());

        Ok(())
    }

    #[test]
    fn test_from_template_drops_variable_amount() {
        let mut template = template_model(7, Some("2024-01"), None);
        template.amount = Some(99.0);
        template.is_variable_amount = true;

        let record = NewTransaction::from_template(&template, at(2024, 6, 1), at(2024, 6, 2));
        assert_eq!(record.amount, None);
        assert_eq!(record.recurring_id, Some(7));
        assert_eq!(record.status, TransactionStatus::Confirmed);
    }

    #[test]
    fn test_from_template_future_date_is_scheduled() {
        let template = template_model(7, Some("2024-01"), None);

        let record = NewTransaction::from_template(&template, at(2024, 6, 15), at(2024, 6, 1));
        assert_eq!(record.status, TransactionStatus::Scheduled);
        assert_eq!(record.amount, template.amount);
    }

    #[test]
    fn test_filter_matches_in_memory() {
        let tx = transaction::Model {
            id: 1,
            date: at(2024, 6, 1),
            description: "Rent".to_string(),
            category: None,
            amount: Some(1.0),
            transaction_type: TransactionType::Expense,
            status: TransactionStatus::Scheduled,
            recurring_id: Some(3),
        };
        let june: YearMonth = "2024-06".parse().unwrap();

        assert!(TransactionFilter::new().matches(&tx));
        assert!(TransactionFilter::new().recurring_id(3).within_period(june).matches(&tx));
        assert!(!TransactionFilter::new().recurring_id(4).matches(&tx));
        assert!(
            !TransactionFilter::new()
                .status(TransactionStatus::Confirmed)
                .matches(&tx)
        );
        assert!(
            !TransactionFilter::new()
                .within_period("2024-05".parse().unwrap())
                .matches(&tx)
        );
    }
}
