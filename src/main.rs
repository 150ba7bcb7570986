use std::time::Duration;

use chrono::Utc;
use dotenvy::dotenv;
use ledger_buddy::{
    config::{database, settings},
    core::{Scheduler, format_pass_summary, template},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load the application configuration
    let app_config = settings::load_app_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Connect and make sure the tables exist
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed configured recurring templates
    template::seed_templates(&db, &app_config.templates)
        .await
        .inspect_err(|e| error!("Failed to seed recurring templates: {}", e))?;

    // 6. Start-up pass, then one pass per tick
    let scheduler = Scheduler::new(db);
    let report = scheduler.run_pass(Utc::now()).await;
    info!("{}", format_pass_summary(&report));

    let interval_secs = app_config.scheduler.tick_interval_secs;
    if interval_secs == 0 {
        return Ok(());
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    // The first tick completes immediately and the start-up pass already ran.
    ticker.tick().await;
    info!("Running scheduler every {} seconds; press Ctrl-C to stop", interval_secs);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = scheduler.run_pass(Utc::now()).await;
                if !report.generation.created.is_empty() || report.promotion.promoted > 0 {
                    info!("{}", format_pass_summary(&report));
                }
            }
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    error!("Failed to listen for Ctrl-C: {}", e);
                }
                info!("Shutting down scheduler");
                break;
            }
        }
    }

    Ok(())
}
