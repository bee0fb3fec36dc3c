//! Table size reporter
//!
//! Environment variables (a `.env` file is read when present):
//! - DB_HOST, DB_PORT (default: 3306), DB_USER, DB_PASSWORD
//! - DATABASES: Comma-separated database names
//! - REPORT_PATH: Output file (default: Database_Tables_Info.xlsx)
//! - RUST_LOG: Log level (default: info)

use courier::report::{run, ReporterConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "courier=info,size_report=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ReporterConfig::from_env().map_err(|e| {
        tracing::error!("Invalid configuration: {}", e);
        e
    })?;

    match run(&config).await {
        Ok(report) => {
            tracing::info!(
                databases = report.databases.len(),
                path = %config.output_path.display(),
                "Report complete"
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Error: {}", e);
            Err(e.into())
        }
    }
}
