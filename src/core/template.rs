//! Recurring template business logic - creating, listing, pausing and
//! deleting templates.
//!
//! Validation happens here, at creation time. The scheduler itself tolerates
//! malformed rows (they are simply never eligible), since rows can also come
//! from older data.

use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::info;

use super::{period::parse_bound, store::LedgerStore};
use crate::{
    config::templates::TemplateConfig,
    entities::{RecurringTemplate, Transaction, recurring_template, transaction},
    errors::{Error, Result},
};

/// Checks a template definition before it is stored.
///
/// # Errors
/// Rejects an empty name or description, a missing or invalid amount on a
/// fixed-amount template, a day outside 1-31, a missing or malformed start
/// month, and an end month that is malformed or before the start month.
pub fn validate_template(config: &TemplateConfig) -> Result<()> {
    if config.template_name.trim().is_empty() {
        return Err(Error::InvalidInput {
            message: "Template name cannot be empty".to_string(),
        });
    }
    if config.description.trim().is_empty() {
        return Err(Error::InvalidInput {
            message: "Template description cannot be empty".to_string(),
        });
    }

    if !config.is_variable_amount {
        let amount = config.amount.ok_or_else(|| Error::InvalidInput {
            message: format!(
                "Template '{}' needs an amount unless it is variable",
                config.template_name
            ),
        })?;
        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::InvalidAmount { amount });
        }
    }

    if !(1..=31).contains(&config.day_of_month) {
        return Err(Error::InvalidDayOfMonth {
            day: config.day_of_month,
        });
    }

    let start = parse_bound(config.start_date.as_deref())?.ok_or_else(|| Error::InvalidInput {
        message: format!("Template '{}' needs a start month", config.template_name),
    })?;
    if let Some(end) = parse_bound(config.end_date.as_deref())?.filter(|end| *end < start) {
        return Err(Error::InvalidInput {
            message: format!("End month {end} is before start month {start}"),
        });
    }

    Ok(())
}

/// Creates a new recurring template after validating it.
///
/// Month bounds are stored normalized (`2024-3` becomes `2024-03`), and a
/// variable-amount template never stores an amount.
///
/// # Arguments
/// * `db` - Database connection
/// * `config` - Template definition, checked with [`validate_template`]
///
/// # Returns
/// * `Ok(model)` - The stored template with its assigned id
/// * `Err(_)` - The definition was rejected or the insert failed
pub async fn create_template(
    db: &DatabaseConnection,
    config: &TemplateConfig,
) -> Result<recurring_template::Model> {
    validate_template(config)?;

    let normalize = |bound: Option<&str>| -> Result<Option<String>> {
        Ok(parse_bound(bound)?.map(|period| period.to_string()))
    };

    let model = recurring_template::ActiveModel {
        template_name: Set(config.template_name.trim().to_string()),
        description: Set(config.description.trim().to_string()),
        amount: Set(if config.is_variable_amount {
            None
        } else {
            config.amount
        }),
        transaction_type: Set(config.transaction_type),
        frequency: Set(config.frequency),
        start_date: Set(normalize(config.start_date.as_deref())?),
        end_date: Set(normalize(config.end_date.as_deref())?),
        day_of_month: Set(config.day_of_month),
        is_active: Set(config.is_active),
        is_variable_amount: Set(config.is_variable_amount),
        ..Default::default()
    };

    let template = model.insert(db).await?;
    info!("Created recurring template '{}' ({})", template.template_name, template.id);
    Ok(template)
}

/// Finds a template by its id.
pub async fn get_template_by_id(
    db: &DatabaseConnection,
    template_id: i64,
) -> Result<Option<recurring_template::Model>> {
    RecurringTemplate::find_by_id(template_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a template by its name.
pub async fn get_template_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<recurring_template::Model>> {
    RecurringTemplate::find()
        .filter(recurring_template::Column::TemplateName.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// All templates, active or not, ordered by name.
pub async fn get_all_templates(db: &DatabaseConnection) -> Result<Vec<recurring_template::Model>> {
    RecurringTemplate::find()
        .order_by_asc(recurring_template::Column::TemplateName)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Templates the scheduler will evaluate.
pub async fn get_active_templates(
    db: &DatabaseConnection,
) -> Result<Vec<recurring_template::Model>> {
    db.query_active_templates().await
}

/// Pauses (`false`) or resumes (`true`) a template.
pub async fn set_template_active(
    db: &DatabaseConnection,
    template_id: i64,
    is_active: bool,
) -> Result<recurring_template::Model> {
    let template = get_template_by_id(db, template_id)
        .await?
        .ok_or(Error::TemplateNotFound { id: template_id })?;

    let mut active_model: recurring_template::ActiveModel = template.into();
    active_model.is_active = Set(is_active);
    active_model.update(db).await.map_err(Into::into)
}

/// Deletes a template. Transactions it generated are kept and detached.
pub async fn delete_template(db: &DatabaseConnection, template_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    Transaction::update_many()
        .col_expr(
            transaction::Column::RecurringId,
            Expr::value(Option::<i64>::None),
        )
        .filter(transaction::Column::RecurringId.eq(template_id))
        .exec(&txn)
        .await?;

    let deleted = RecurringTemplate::delete_by_id(template_id).exec(&txn).await?;
    if deleted.rows_affected == 0 {
        return Err(Error::TemplateNotFound { id: template_id });
    }

    txn.commit().await?;
    info!("Deleted recurring template {}", template_id);
    Ok(())
}

/// Inserts every configured template whose name is not in the database yet.
/// Returns how many were created.
pub async fn seed_templates(db: &DatabaseConnection, configs: &[TemplateConfig]) -> Result<usize> {
    let mut created = 0;
    for config in configs {
        if get_template_by_name(db, config.template_name.trim())
            .await?
            .is_some()
        {
            continue;
        }
        create_template(db, config).await?;
        created += 1;
    }

    if created > 0 {
        info!("Seeded {} recurring templates from configuration", created);
    }
    Ok(created)
}
