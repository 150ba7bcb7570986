//! Transaction entity - A materialized ledger entry.
//!
//! Transactions are either entered by hand (`recurring_id` is `None`) or
//! generated from a recurring template, in which case `recurring_id` points
//! back at the template that produced them.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Direction of money flow. The amount itself is always a magnitude.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in
    #[sea_orm(string_value = "income")]
    Income,
    /// Money going out
    #[sea_orm(string_value = "expense")]
    Expense,
}

/// Whether a transaction has happened yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Dated today or earlier, or promoted after its date passed
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    /// Dated in the future relative to when it was recorded
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
}

impl TransactionStatus {
    /// Status for a record dated `date` as seen at `now`.
    #[must_use]
    pub fn for_instant(date: DateTimeUtc, now: DateTimeUtc) -> Self {
        if date <= now {
            Self::Confirmed
        } else {
            Self::Scheduled
        }
    }
}

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// When the transaction happens
    pub date: DateTimeUtc,
    /// Human-readable description
    pub description: String,
    /// Optional free-text category label (e.g. "rent", "groceries")
    pub category: Option<String>,
    /// Non-negative magnitude; `None` for unpriced variable-amount instances
    pub amount: Option<f64>,
    /// Income or expense
    pub transaction_type: TransactionType,
    /// Confirmed or scheduled
    pub status: TransactionStatus,
    /// Template that generated this transaction, `None` for manual entries
    pub recurring_id: Option<i64>,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A generated transaction belongs to the template that produced it
    #[sea_orm(
        belongs_to = "super::recurring_template::Entity",
        from = "Column::RecurringId",
        to = "super::recurring_template::Column::Id",
        on_delete = "SetNull"
    )]
    RecurringTemplate,
}

impl Related<super::recurring_template::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecurringTemplate.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
