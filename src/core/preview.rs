//! Read-only preview of recurring occurrences that have not been generated yet.
//!
//! Calendar views use this to show upcoming recurring items before the next
//! scheduler pass runs. Eligibility and duplicate detection are exactly the
//! generator's, so a previewed occurrence is what the generator would create.

use chrono::NaiveDate;
use serde::Serialize;

use super::{
    period::YearMonth,
    recurrence,
    store::{LedgerStore, existing_instance},
};
use crate::{
    entities::{TransactionType, recurring_template},
    errors::Result,
};

/// A recurring occurrence that would be generated but does not exist yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VirtualOccurrence {
    /// Template the occurrence comes from
    pub template_id: i64,
    /// Template label
    pub template_name: String,
    /// Description the generated transaction will carry
    pub description: String,
    /// Amount the generated transaction will carry
    pub amount: Option<f64>,
    /// Income or expense
    pub transaction_type: TransactionType,
    /// Day the occurrence falls on
    pub date: NaiveDate,
}

impl VirtualOccurrence {
    fn new(template: &recurring_template::Model, date: NaiveDate) -> Self {
        Self {
            template_id: template.id,
            template_name: template.template_name.clone(),
            description: template.description.clone(),
            amount: if template.is_variable_amount {
                None
            } else {
                template.amount
            },
            transaction_type: template.transaction_type,
            date,
        }
    }
}

/// All not-yet-generated occurrences in `period`, ordered by date.
pub async fn virtual_occurrences_for_month<S: LedgerStore>(
    store: &S,
    period: YearMonth,
) -> Result<Vec<VirtualOccurrence>> {
    let templates = store.query_active_templates().await?;
    let mut occurrences = Vec::new();

    for template in &templates {
        let Some(date) = recurrence::materialization_date(template, period) else {
            continue;
        };
        if existing_instance(store, template.id, period).await?.is_none() {
            occurrences.push(VirtualOccurrence::new(template, date));
        }
    }

    occurrences.sort_by_key(|occurrence| (occurrence.date, occurrence.template_id));
    Ok(occurrences)
}

/// Not-yet-generated occurrences falling on `date`.
pub async fn virtual_occurrences_for_date<S: LedgerStore>(
    store: &S,
    date: NaiveDate,
) -> Result<Vec<VirtualOccurrence>> {
    let mut occurrences = virtual_occurrences_for_month(store, YearMonth::from_date(date)).await?;
    occurrences.retain(|occurrence| occurrence.date == date);
    Ok(occurrences)
}
