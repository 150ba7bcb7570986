//! Report generation - monthly income/expense totals and overall balance.
//!
//! Unpriced transactions (variable-amount instances without an amount yet)
//! are counted but never summed.

use sea_orm::DatabaseConnection;

use super::{
    period::YearMonth,
    store::{LedgerStore, TransactionFilter},
};
use crate::{
    entities::{TransactionStatus, TransactionType, transaction},
    errors::Result,
};

/// Totals for one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySummary {
    /// Month summarized
    pub period: YearMonth,
    /// Sum of priced income
    pub total_income: f64,
    /// Sum of priced expenses
    pub total_expense: f64,
    /// Income minus expenses
    pub net: f64,
    /// Number of transactions in the month
    pub transaction_count: usize,
    /// How many of them are still scheduled
    pub scheduled_count: usize,
    /// How many of them have no amount yet
    pub unpriced_count: usize,
}

/// Summarizes `transactions` as the totals for `period`.
///
/// The caller is responsible for passing only transactions of that month.
#[must_use]
pub fn summarize(period: YearMonth, transactions: &[transaction::Model]) -> MonthlySummary {
    let mut total_income = 0.0;
    let mut total_expense = 0.0;
    let mut scheduled_count = 0;
    let mut unpriced_count = 0;

    for tx in transactions {
        if tx.status == TransactionStatus::Scheduled {
            scheduled_count += 1;
        }
        match (tx.amount, tx.transaction_type) {
            (None, _) => unpriced_count += 1,
            (Some(amount), TransactionType::Income) => total_income += amount,
            (Some(amount), TransactionType::Expense) => total_expense += amount,
        }
    }

    MonthlySummary {
        period,
        total_income,
        total_expense,
        net: total_income - total_expense,
        transaction_count: transactions.len(),
        scheduled_count,
        unpriced_count,
    }
}

/// Totals for `period` straight from the database.
pub async fn monthly_summary(db: &DatabaseConnection, period: YearMonth) -> Result<MonthlySummary> {
    let transactions = db
        .query_transactions(&TransactionFilter::new().within_period(period))
        .await?;
    Ok(summarize(period, &transactions))
}

/// Income minus expenses over every priced transaction in the ledger.
pub async fn total_assets(db: &DatabaseConnection) -> Result<f64> {
    let transactions = db.query_transactions(&TransactionFilter::new()).await?;
    Ok(transactions
        .iter()
        .filter_map(|tx| {
            tx.amount.map(|amount| match tx.transaction_type {
                TransactionType::Income => amount,
                TransactionType::Expense => -amount,
            })
        })
        .sum())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{
        core::transaction::{TransactionDraft, create_transaction},
        test_utils::*,
    };
    use chrono::{DateTime, TimeZone, Utc};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn model(amount: Option<f64>, kind: TransactionType, status: TransactionStatus) -> transaction::Model {
        transaction::Model {
            id: 0,
            date: at(2024, 6, 1),
            description: "x".to_string(),
            category: None,
            amount,
            transaction_type: kind,
            status,
            recurring_id: None,
        }
    }

    #[test]
    fn test_summarize_splits_income_and_expense() {
        let period: YearMonth = "2024-06".parse().unwrap();
        let transactions = vec![
            model(Some(3000.0), TransactionType::Income, TransactionStatus::Confirmed),
            model(Some(1200.0), TransactionType::Expense, TransactionStatus::Confirmed),
            model(Some(300.0), TransactionType::Expense, TransactionStatus::Scheduled),
            model(None, TransactionType::Expense, TransactionStatus::Scheduled),
        ];

        let summary = summarize(period, &transactions);

        assert_eq!(summary.total_income, 3000.0);
        assert_eq!(summary.total_expense, 1500.0);
        assert_eq!(summary.net, 1500.0);
        assert_eq!(summary.transaction_count, 4);
        assert_eq!(summary.scheduled_count, 2);
        assert_eq!(summary.unpriced_count, 1);
    }

    #[test]
    fn test_summarize_empty_month() {
        let summary = summarize("2024-06".parse().unwrap(), &[]);
        assert_eq!(summary.net, 0.0);
        assert_eq!(summary.transaction_count, 0);
    }

    #[tokio::test]
    async fn test_monthly_summary_and_total_assets() -> Result<()> {
        let db = setup_test_db().await?;
        let now = at(2024, 8, 1);
        for (date, amount, kind) in [
            (at(2024, 6, 25), 3000.0, TransactionType::Income),
            (at(2024, 6, 3), 800.0, TransactionType::Expense),
            (at(2024, 7, 3), 900.0, TransactionType::Expense),
        ] {
            create_transaction(
                &db,
                TransactionDraft {
                    date,
                    description: "entry".to_string(),
                    category: None,
                    amount,
                    transaction_type: kind,
                },
                now,
            )
            .await?;
        }

        let june = monthly_summary(&db, "2024-06".parse()?).await?;
        assert_eq!(june.total_income, 3000.0);
        assert_eq!(june.total_expense, 800.0);
        assert_eq!(june.net, 2200.0);

        assert_eq!(total_assets(&db).await?, 1300.0);
        Ok(())
    }
}
