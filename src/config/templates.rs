//! Recurring template definitions loaded from config.toml
//!
//! Templates listed under `[[templates]]` are seeded into the database on
//! start-up when no template with the same name exists. The same structure is
//! used as the input for [`crate::core::template::create_template`].

use serde::Deserialize;

use crate::entities::{Frequency, TransactionType};

const fn default_frequency() -> Frequency {
    Frequency::Monthly
}

const fn default_active() -> bool {
    true
}

/// Definition of a single recurring template
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TemplateConfig {
    /// Short label (e.g. "Rent")
    pub template_name: String,
    /// Description copied onto generated transactions
    pub description: String,
    /// Fixed amount; may be omitted for variable-amount templates
    #[serde(default)]
    pub amount: Option<f64>,
    /// `"income"` or `"expense"`
    pub transaction_type: TransactionType,
    /// `"monthly"` (default) or `"yearly"`
    #[serde(default = "default_frequency")]
    pub frequency: Frequency,
    /// First month, `YYYY-MM`
    #[serde(default)]
    pub start_date: Option<String>,
    /// Last month, `YYYY-MM`; omitted means no end
    #[serde(default)]
    pub end_date: Option<String>,
    /// Day within the month, 1-31
    pub day_of_month: i32,
    /// Whether the scheduler evaluates the template (default true)
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Whether generated transactions are left unpriced (default false)
    #[serde(default)]
    pub is_variable_amount: bool,
}
