//! Size reporter: table storage sizes across MySQL databases, written to a
//! spreadsheet

pub mod catalog;
pub mod config;
pub mod runner;
pub mod size;
pub mod summary;
pub mod workbook;

pub use catalog::{MySqlCatalog, SizeCatalog};
pub use config::{DatabaseConfig, ReporterConfig};
pub use runner::{collect_report, run};
pub use size::{format_size_with_unit, SizeBreakdown};
pub use summary::{DatabaseReport, DatabaseSizeSummary, SizeReport, TableSizeRecord};
pub use workbook::write_workbook;

/// Size reporter errors
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Failed to connect to database server: {0}")]
    Connect(sqlx::Error),

    #[error("Query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("Unknown database '{0}'")]
    UnknownDatabase(String),

    #[error("Failed to write workbook: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
}
