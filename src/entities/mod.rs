//! Entity module - Contains all SeaORM entity definitions for the database.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod recurring_template;
pub mod transaction;

// Re-export specific types to avoid conflicts
pub use recurring_template::{
    Column as RecurringTemplateColumn, Entity as RecurringTemplate, Frequency,
    Model as RecurringTemplateModel,
};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
    TransactionStatus, TransactionType,
};
