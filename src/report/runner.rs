//! The batch run: collect sizes database by database, then write the workbook

use super::catalog::{MySqlCatalog, SizeCatalog};
use super::config::ReporterConfig;
use super::summary::{DatabaseReport, SizeReport};
use super::workbook::write_workbook;
use super::ReportError;

/// Gather table sizes for each database in order
///
/// Databases without tables are skipped and contribute nothing. The first
/// error aborts the run.
pub async fn collect_report<C: SizeCatalog>(
    catalog: &mut C,
    databases: &[String],
) -> Result<SizeReport, ReportError> {
    tracing::info!("Found {} databases.", databases.len());

    let mut report = SizeReport::default();

    for database in databases {
        tracing::info!(database = %database, "Processing database");

        catalog.use_database(database).await?;

        let tables = catalog.list_tables().await?;
        tracing::info!(database = %database, tables = tables.len(), "Listed tables");

        if tables.is_empty() {
            tracing::info!(database = %database, "No tables found, skipping");
            continue;
        }

        catalog.analyze_tables(&tables).await?;
        tracing::info!(database = %database, "Analyzed tables");

        let records = catalog.table_sizes(database).await?;
        for table in &records {
            tracing::info!(
                database = %database,
                table = %table.table_name,
                data_length = table.data_length,
                index_length = table.index_length,
                data_free = table.data_free,
                "Table size: {} KiB",
                table.size_kib
            );
        }

        let db_report = DatabaseReport::new(database.clone(), records);
        if db_report.summary.total_kib > 0.0 {
            tracing::info!(
                database = %database,
                "Total size: {}",
                db_report.summary.size
            );
        } else {
            tracing::info!(database = %database, "Tables are empty or contain no data");
        }

        report.push(db_report);
    }

    tracing::info!("Total size: {}", report.total());
    Ok(report)
}

/// Connect, collect, write the workbook, and always close the connection
pub async fn run(config: &ReporterConfig) -> Result<SizeReport, ReportError> {
    tracing::info!(host = %config.database.host, "Connecting to MySQL database");
    let mut catalog = MySqlCatalog::connect(&config.database).await?;
    tracing::info!("Connected to MySQL database");

    let result = collect_and_write(&mut catalog, config).await;

    match catalog.close().await {
        Ok(()) => tracing::info!("Database connection closed"),
        Err(e) => tracing::warn!(error = %e, "Failed to close database connection cleanly"),
    }

    result
}

async fn collect_and_write<C: SizeCatalog>(
    catalog: &mut C,
    config: &ReporterConfig,
) -> Result<SizeReport, ReportError> {
    let report = collect_report(catalog, &config.databases).await?;

    write_workbook(&report, &config.output_path)?;
    tracing::info!(path = %config.output_path.display(), "Excel file created");

    Ok(report)
}
