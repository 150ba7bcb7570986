//! Recurrence evaluation - decides whether and when a template materializes.
//!
//! Everything here is pure. The generator and the preview both go through
//! [`materialization_date`], so a previewed occurrence and the instance that
//! is eventually generated always agree.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use super::period::{YearMonth, in_period};
use crate::entities::{Frequency, recurring_template};

/// Whether the template applies to `period` at all.
#[must_use]
pub fn is_eligible(template: &recurring_template::Model, period: YearMonth) -> bool {
    template.is_active && in_period(template, period)
}

/// The template's `day_of_month` if it is a valid day (1-31).
#[must_use]
pub fn valid_day_of_month(template: &recurring_template::Model) -> Option<u32> {
    u32::try_from(template.day_of_month)
        .ok()
        .filter(|day| (1..=31).contains(day))
}

/// The date on which `template` materializes in `period`, if it does.
///
/// Returns `None` for ineligible templates, for yearly templates (only monthly
/// materialization exists), and for templates with an out-of-range
/// `day_of_month`. A day past the end of the month is clamped to the month's
/// last day, so the instance always lands inside `period`.
#[must_use]
pub fn materialization_date(
    template: &recurring_template::Model,
    period: YearMonth,
) -> Option<NaiveDate> {
    if !is_eligible(template, period) {
        return None;
    }

    if template.frequency != Frequency::Monthly {
        tracing::debug!(
            template_id = template.id,
            "Skipping '{}': {:?} templates are not materialized",
            template.template_name,
            template.frequency
        );
        return None;
    }

    let Some(day) = valid_day_of_month(template) else {
        tracing::warn!(
            template_id = template.id,
            "Skipping '{}': day_of_month {} is out of range",
            template.template_name,
            template.day_of_month
        );
        return None;
    };

    Some(period.day_clamped(day))
}

/// The instant a generated transaction is dated at: midnight UTC.
#[must_use]
pub fn target_instant(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
