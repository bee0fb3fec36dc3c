//! Per-table records and the summaries folded from them

use super::size::{format_size_with_unit, round2, SizeBreakdown};

/// Storage figures for one table
#[derive(Debug, Clone, PartialEq)]
pub struct TableSizeRecord {
    pub table_name: String,
    pub data_length: u64,
    pub index_length: u64,
    pub data_free: u64,
    /// data + index + free, in KiB, rounded to two decimals
    pub size_kib: f64,
}

impl TableSizeRecord {
    pub fn from_lengths(
        table_name: impl Into<String>,
        data_length: u64,
        index_length: u64,
        data_free: u64,
    ) -> Self {
        let bytes = data_length as f64 + index_length as f64 + data_free as f64;
        Self {
            table_name: table_name.into(),
            data_length,
            index_length,
            data_free,
            size_kib: round2(bytes / 1024.0),
        }
    }

    pub fn formatted_size(&self) -> String {
        format_size_with_unit(self.size_kib)
    }
}

/// The biggest table seen in one database
#[derive(Debug, Clone, PartialEq)]
pub struct LargestTable {
    pub name: String,
    pub size_kib: f64,
}

/// Totals for one database
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseSizeSummary {
    pub database_name: String,
    pub total_kib: f64,
    pub size: SizeBreakdown,
    /// None when no table has a positive size
    pub largest_table: Option<LargestTable>,
}

impl DatabaseSizeSummary {
    /// Fold table records into a summary
    ///
    /// Largest-table tracking uses a strict comparison, so on equal sizes the
    /// first table seen wins.
    pub fn from_tables(database_name: impl Into<String>, tables: &[TableSizeRecord]) -> Self {
        let (total_kib, largest) = tables.iter().fold(
            (0.0_f64, None::<&TableSizeRecord>),
            |(total, largest), table| {
                let best = largest.map_or(0.0, |t| t.size_kib);
                let largest = if table.size_kib > best { Some(table) } else { largest };
                (total + table.size_kib, largest)
            },
        );

        Self {
            database_name: database_name.into(),
            total_kib,
            size: SizeBreakdown::from_kib(total_kib),
            largest_table: largest.map(|t| LargestTable {
                name: t.table_name.clone(),
                size_kib: t.size_kib,
            }),
        }
    }

    pub fn largest_table_name(&self) -> &str {
        self.largest_table.as_ref().map_or("", |t| t.name.as_str())
    }

    pub fn largest_table_formatted_size(&self) -> String {
        self.largest_table
            .as_ref()
            .map_or_else(|| "0 KiB".to_string(), |t| format_size_with_unit(t.size_kib))
    }
}

/// One processed database and its tables
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseReport {
    pub name: String,
    pub tables: Vec<TableSizeRecord>,
    pub summary: DatabaseSizeSummary,
}

impl DatabaseReport {
    pub fn new(name: impl Into<String>, tables: Vec<TableSizeRecord>) -> Self {
        let name = name.into();
        let summary = DatabaseSizeSummary::from_tables(name.clone(), &tables);
        Self {
            name,
            tables,
            summary,
        }
    }
}

/// A row of the consolidated sheet
#[derive(Debug, Clone, PartialEq)]
pub struct ConsolidatedRow<'a> {
    pub database_name: &'a str,
    pub table_name: &'a str,
    pub size: String,
}

/// Everything gathered during one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SizeReport {
    pub databases: Vec<DatabaseReport>,
}

impl SizeReport {
    pub fn push(&mut self, database: DatabaseReport) {
        self.databases.push(database);
    }

    /// Summary rows: only databases holding data
    pub fn summaries(&self) -> impl Iterator<Item = &DatabaseSizeSummary> {
        self.databases
            .iter()
            .map(|db| &db.summary)
            .filter(|summary| summary.total_kib > 0.0)
    }

    /// Every table of every database, in processing order
    pub fn consolidated_rows(&self) -> Vec<ConsolidatedRow<'_>> {
        self.databases
            .iter()
            .flat_map(|db| {
                db.tables.iter().map(move |table| ConsolidatedRow {
                    database_name: &db.name,
                    table_name: &table.table_name,
                    size: table.formatted_size(),
                })
            })
            .collect()
    }

    /// Sum of every table size across all databases
    pub fn total_kib(&self) -> f64 {
        self.databases
            .iter()
            .flat_map(|db| db.tables.iter())
            .fold(0.0, |total, table| total + table.size_kib)
    }

    pub fn total(&self) -> SizeBreakdown {
        SizeBreakdown::from_kib(self.total_kib())
    }
}
