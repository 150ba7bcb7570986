//! Shared test utilities.
//!
//! This module provides helpers for setting up test databases, building
//! templates with sensible defaults, and a store wrapper that injects
//! failures.

use std::collections::HashSet;

use sea_orm::{DatabaseConnection, DbErr};

use crate::{
    config::templates::TemplateConfig,
    core::{
        store::{LedgerStore, NewTransaction, TransactionFilter, TransactionUpdate},
        template,
    },
    entities::{Frequency, TransactionType, recurring_template, transaction},
    errors::{Error, Result},
};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all database tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A template definition with sensible defaults.
///
/// # Defaults
/// * `description`: `"Monthly <name in lowercase>"`
/// * `amount`: 100.0
/// * `transaction_type`: expense
/// * `frequency`: monthly
/// * active, fixed amount
#[must_use]
pub fn template_config(
    name: &str,
    day_of_month: i32,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> TemplateConfig {
    TemplateConfig {
        template_name: name.to_string(),
        description: format!("Monthly {}", name.to_lowercase()),
        amount: Some(100.0),
        transaction_type: TransactionType::Expense,
        frequency: Frequency::Monthly,
        start_date: start_date.map(str::to_string),
        end_date: end_date.map(str::to_string),
        day_of_month,
        is_active: true,
        is_variable_amount: false,
    }
}

/// Creates a stored template starting 2024-01 with no end.
pub async fn create_test_template(
    db: &DatabaseConnection,
    name: &str,
    day_of_month: i32,
) -> Result<recurring_template::Model> {
    template::create_template(db, &template_config(name, day_of_month, Some("2024-01"), None)).await
}

/// Creates a stored template from a custom definition.
pub async fn create_custom_template(
    db: &DatabaseConnection,
    config: &TemplateConfig,
) -> Result<recurring_template::Model> {
    template::create_template(db, config).await
}

/// An in-memory template model, for pure evaluator tests. Day 1, amount
/// 100.0, monthly, active.
#[must_use]
pub fn template_model(
    id: i64,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> recurring_template::Model {
    recurring_template::Model {
        id,
        template_name: format!("Template {id}"),
        description: format!("Recurring item {id}"),
        amount: Some(100.0),
        transaction_type: TransactionType::Expense,
        frequency: Frequency::Monthly,
        start_date: start_date.map(str::to_string),
        end_date: end_date.map(str::to_string),
        day_of_month: 1,
        is_active: true,
        is_variable_amount: false,
    }
}

/// A [`LedgerStore`] over a real database that fails selected operations.
#[derive(Clone)]
pub struct FlakyStore {
    inner: DatabaseConnection,
    failing_inserts: HashSet<i64>,
    failing_updates: HashSet<i64>,
    fail_queries: bool,
    fail_template_queries: bool,
}

impl FlakyStore {
    /// Wraps `inner` without any failures configured.
    #[must_use]
    pub fn new(inner: DatabaseConnection) -> Self {
        Self {
            inner,
            failing_inserts: HashSet::new(),
            failing_updates: HashSet::new(),
            fail_queries: false,
            fail_template_queries: false,
        }
    }

    /// Fail inserts of instances generated from `template_id`.
    #[must_use]
    pub fn fail_inserts_for(mut self, template_id: i64) -> Self {
        self.failing_inserts.insert(template_id);
        self
    }

    /// Fail updates of the transaction `transaction_id`.
    #[must_use]
    pub fn fail_updates_for(mut self, transaction_id: i64) -> Self {
        self.failing_updates.insert(transaction_id);
        self
    }

    /// Fail every transaction query.
    #[must_use]
    pub const fn fail_queries(mut self) -> Self {
        self.fail_queries = true;
        self
    }

    /// Fail loading active templates.
    #[must_use]
    pub const fn fail_template_queries(mut self) -> Self {
        self.fail_template_queries = true;
        self
    }
}

fn injected(operation: &str) -> Error {
    Error::Database(DbErr::Custom(format!("injected {operation} failure")))
}

impl LedgerStore for FlakyStore {
    async fn add_transaction(&self, record: NewTransaction) -> Result<transaction::Model> {
        if record
            .recurring_id
            .is_some_and(|id| self.failing_inserts.contains(&id))
        {
            return Err(injected("insert"));
        }
        self.inner.add_transaction(record).await
    }

    async fn update_transaction(
        &self,
        id: i64,
        changes: TransactionUpdate,
    ) -> Result<transaction::Model> {
        if self.failing_updates.contains(&id) {
            return Err(injected("update"));
        }
        self.inner.update_transaction(id, changes).await
    }

    async fn query_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<transaction::Model>> {
        if self.fail_queries {
            return Err(injected("query"));
        }
        self.inner.query_transactions(filter).await
    }

    async fn query_active_templates(&self) -> Result<Vec<recurring_template::Model>> {
        if self.fail_template_queries {
            return Err(injected("template query"));
        }
        self.inner.query_active_templates().await
    }
}
