//! Recurring template entity - A definition of a periodic transaction.
//!
//! Templates are not ledger entries themselves; the scheduler materializes
//! them into [`super::transaction`] rows, at most one per calendar month.
//! `start_date` and `end_date` are `YYYY-MM` strings and inclusive.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::transaction::TransactionType;

/// How often a template recurs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Once per calendar month on `day_of_month`
    #[sea_orm(string_value = "monthly")]
    Monthly,
    /// Accepted and stored, but never materialized by the scheduler
    #[sea_orm(string_value = "yearly")]
    Yearly,
}

/// Recurring template database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recurring_templates")]
pub struct Model {
    /// Unique identifier for the template
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Short label shown in template lists (e.g. "Rent", "Netflix")
    pub template_name: String,
    /// Description copied onto every generated transaction
    pub description: String,
    /// Fixed amount, `None` when `is_variable_amount` is set
    pub amount: Option<f64>,
    /// Income or expense
    pub transaction_type: TransactionType,
    /// Recurrence frequency
    pub frequency: Frequency,
    /// First month (`YYYY-MM`) the template applies to; `None` or empty is unbounded
    pub start_date: Option<String>,
    /// Last month (`YYYY-MM`) the template applies to; `None` or empty is unbounded
    pub end_date: Option<String>,
    /// Target day within the month, 1-31
    pub day_of_month: i32,
    /// Inactive templates are never evaluated
    pub is_active: bool,
    /// When set, generated transactions carry no amount
    pub is_variable_amount: bool,
}

/// Defines relationships between `RecurringTemplate` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One template generates many transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
