//! Transaction business logic - manual ledger entries.
//!
//! Entries recorded here carry no `recurring_id`. A future-dated entry starts
//! out scheduled and is confirmed by the promoter like a generated one.
//! Variable-amount instances produced by the scheduler are priced with
//! [`set_variable_amount`].

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use sea_orm::prelude::*;
use tracing::info;

use super::{
    period::YearMonth,
    store::{LedgerStore, NewTransaction, TransactionFilter, TransactionUpdate, existing_instance},
};
use crate::{
    entities::{Transaction, TransactionStatus, TransactionType, transaction},
    errors::{Error, Result},
};

/// A manually entered transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    /// When the transaction happens
    pub date: DateTime<Utc>,
    /// Human-readable description
    pub description: String,
    /// Optional category label
    pub category: Option<String>,
    /// Non-negative magnitude
    pub amount: f64,
    /// Income or expense
    pub transaction_type: TransactionType,
}

fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<()> {
    if description.trim().is_empty() {
        return Err(Error::InvalidInput {
            message: "Description cannot be empty".to_string(),
        });
    }
    Ok(())
}

/// Records a manual transaction.
///
/// The status is decided by calendar day: scheduled when the entry's day is
/// after today's (as of `now`), confirmed otherwise.
pub async fn create_transaction(
    db: &DatabaseConnection,
    draft: TransactionDraft,
    now: DateTime<Utc>,
) -> Result<transaction::Model> {
    validate_amount(draft.amount)?;
    validate_description(&draft.description)?;

    let status = if draft.date.date_naive() > now.date_naive() {
        TransactionStatus::Scheduled
    } else {
        TransactionStatus::Confirmed
    };

    let created = db
        .add_transaction(NewTransaction {
            date: draft.date,
            description: draft.description.trim().to_string(),
            category: draft.category,
            amount: Some(draft.amount),
            transaction_type: draft.transaction_type,
            status,
            recurring_id: None,
        })
        .await?;
    info!("Recorded transaction {} ({:?})", created.id, created.status);
    Ok(created)
}

/// Retrieves a specific transaction by its unique ID.
pub async fn get_transaction_by_id(
    db: &DatabaseConnection,
    transaction_id: i64,
) -> Result<Option<transaction::Model>> {
    Transaction::find_by_id(transaction_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// All transactions dated within `period`, oldest first.
pub async fn get_transactions_for_period(
    db: &DatabaseConnection,
    period: YearMonth,
) -> Result<Vec<transaction::Model>> {
    db.query_transactions(&TransactionFilter::new().within_period(period))
        .await
}

/// All transactions dated on `date` (UTC), oldest first.
pub async fn get_transactions_for_date(
    db: &DatabaseConnection,
    date: NaiveDate,
) -> Result<Vec<transaction::Model>> {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    let filter = TransactionFilter {
        date_from: Some(start),
        date_before: date
            .checked_add_days(Days::new(1))
            .map(|next| next.and_time(NaiveTime::MIN).and_utc()),
        ..TransactionFilter::default()
    };
    db.query_transactions(&filter).await
}

/// Edits a transaction. Status is never moved back to scheduled.
///
/// A generated instance can be moved to another day, but not into a month
/// that already holds another instance of the same template.
///
/// # Arguments
/// * `db` - Database connection
/// * `transaction_id` - Transaction to edit
/// * `changes` - Fields to change; `None` fields are left as they are
///
/// # Returns
/// * `Ok(model)` - The updated transaction
/// * `Err(Error::InvalidInput)` - Blank description, or the new date collides
///   with another instance of the same template
/// * `Err(Error::InvalidAmount)` - Negative or non-finite amount
/// * `Err(Error::TransactionNotFound)` - No transaction with this id
pub async fn update_transaction(
    db: &DatabaseConnection,
    transaction_id: i64,
    changes: TransactionUpdate,
) -> Result<transaction::Model> {
    if let Some(amount) = changes.amount {
        validate_amount(amount)?;
    }
    if let Some(description) = &changes.description {
        validate_description(description)?;
    }
    if let Some(date) = changes.date {
        ensure_month_is_free(db, transaction_id, date).await?;
    }

    db.update_transaction(transaction_id, changes).await
}

/// Rejects moving a generated instance into a month where its template
/// already has a different instance.
async fn ensure_month_is_free(
    db: &DatabaseConnection,
    transaction_id: i64,
    date: DateTime<Utc>,
) -> Result<()> {
    let existing = get_transaction_by_id(db, transaction_id)
        .await?
        .ok_or(Error::TransactionNotFound { id: transaction_id })?;
    let Some(template_id) = existing.recurring_id else {
        return Ok(());
    };

    let period = YearMonth::containing(date);
    match existing_instance(db, template_id, period).await? {
        Some(other) if other.id != transaction_id => Err(Error::InvalidInput {
            message: format!(
                "Template {template_id} already has transaction {} in {period}",
                other.id
            ),
        }),
        _ => Ok(()),
    }
}

/// Deletes a transaction. Deleting a generated instance does not touch its
/// template, and the scheduler will not regenerate it for an earlier month.
pub async fn delete_transaction(db: &DatabaseConnection, transaction_id: i64) -> Result<()> {
    let result = Transaction::delete_by_id(transaction_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::TransactionNotFound { id: transaction_id });
    }
    info!("Deleted transaction {}", transaction_id);
    Ok(())
}

/// Fills in the amount of an instance generated from a variable-amount
/// template.
///
/// # Errors
/// Fails when the transaction does not exist, already has an amount, or the
/// amount is invalid.
pub async fn set_variable_amount(
    db: &DatabaseConnection,
    transaction_id: i64,
    amount: f64,
) -> Result<transaction::Model> {
    validate_amount(amount)?;

    let existing = get_transaction_by_id(db, transaction_id)
        .await?
        .ok_or(Error::TransactionNotFound { id: transaction_id })?;
    if existing.amount.is_some() {
        return Err(Error::InvalidInput {
            message: format!("Transaction {transaction_id} already has an amount"),
        });
    }

    db.update_transaction(
        transaction_id,
        TransactionUpdate {
            amount: Some(amount),
            ..TransactionUpdate::default()
        },
    )
    .await
}
