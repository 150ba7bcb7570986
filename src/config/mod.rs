/// Database configuration and connection management
pub mod database;

/// Application settings loaded from config.toml
pub mod settings;

/// Recurring template definitions from config.toml
pub mod templates;
