//! Spreadsheet output
//!
//! Sheets are first laid out as plain data, then written with
//! rust_xlsxwriter. Order: one sheet per database, the consolidated sheet,
//! the summary sheet.

use rust_xlsxwriter::{Format, Workbook};
use std::collections::HashSet;
use std::path::Path;

use super::summary::SizeReport;
use super::ReportError;

pub const CONSOLIDATED_SHEET: &str = "Consolidated Data";
pub const SUMMARY_SHEET: &str = "Database Size Summary";

const MAX_SHEET_NAME: usize = 31;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub header: &'static str,
    pub width: f64,
}

const fn column(header: &'static str, width: f64) -> Column {
    Column { header, width }
}

/// One worksheet's content
#[derive(Debug, Clone, PartialEq)]
pub struct SheetData {
    pub name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Cell>>,
}

/// Lay out every sheet of the report
pub fn build_sheets(report: &SizeReport) -> Vec<SheetData> {
    let mut used = HashSet::new();
    // Reserve the fixed sheet names so a database cannot take them
    used.insert(CONSOLIDATED_SHEET.to_lowercase());
    used.insert(SUMMARY_SHEET.to_lowercase());

    let mut sheets: Vec<SheetData> = report
        .databases
        .iter()
        .map(|db| SheetData {
            name: unique_sheet_name(&db.name, &mut used),
            columns: vec![column("Table Name", 30.0), column("Size (KiB)", 15.0)],
            rows: db
                .tables
                .iter()
                .map(|t| vec![Cell::from(t.table_name.as_str()), Cell::from(t.size_kib)])
                .collect(),
        })
        .collect();

    sheets.push(SheetData {
        name: CONSOLIDATED_SHEET.to_string(),
        columns: vec![
            column("Database Name", 30.0),
            column("Table Name", 30.0),
            column("Size", 20.0),
        ],
        rows: report
            .consolidated_rows()
            .into_iter()
            .map(|row| {
                vec![
                    Cell::from(row.database_name),
                    Cell::from(row.table_name),
                    Cell::from(row.size),
                ]
            })
            .collect(),
    });

    let mut summary_rows: Vec<Vec<Cell>> = report
        .summaries()
        .map(|s| {
            vec![
                Cell::from(s.database_name.as_str()),
                Cell::from(s.size.kib.clone()),
                Cell::from(s.size.mib.clone()),
                Cell::from(s.size.gib.clone()),
                Cell::from(s.largest_table_name()),
                Cell::from(s.largest_table_formatted_size()),
            ]
        })
        .collect();

    let total = report.total();
    summary_rows.push(vec![
        Cell::from("Total"),
        Cell::from(total.kib),
        Cell::from(total.mib),
        Cell::from(total.gib),
        Cell::from("N/A"),
        Cell::from("N/A"),
    ]);

    sheets.push(SheetData {
        name: SUMMARY_SHEET.to_string(),
        columns: vec![
            column("Database Name", 30.0),
            column("Size (KiB)", 15.0),
            column("Size (MiB)", 15.0),
            column("Size (GiB)", 15.0),
            column("Largest Table Name", 30.0),
            column("Largest Table Size", 20.0),
        ],
        rows: summary_rows,
    });

    sheets
}

/// Write the report to an .xlsx file
pub fn write_workbook(report: &SizeReport, path: &Path) -> Result<(), ReportError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    for sheet in build_sheets(report) {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;

        for (col, column) in sheet.columns.iter().enumerate() {
            let col = col as u16;
            worksheet.set_column_width(col, column.width)?;
            worksheet.write_string_with_format(0, col, column.header, &header)?;
        }

        for (i, row) in sheet.rows.iter().enumerate() {
            let row_idx = i as u32 + 1;
            for (col, cell) in row.iter().enumerate() {
                match cell {
                    Cell::Text(text) => worksheet.write_string(row_idx, col as u16, text)?,
                    Cell::Number(value) => worksheet.write_number(row_idx, col as u16, *value)?,
                };
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

/// Make a valid worksheet name that is not yet used (case-insensitive)
fn unique_sheet_name(name: &str, used: &mut HashSet<String>) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            _ => c,
        })
        .collect();
    let cleaned = cleaned.trim_matches('\'');
    let base = if cleaned.is_empty() { "Sheet" } else { cleaned };

    let mut candidate: String = base.chars().take(MAX_SHEET_NAME).collect();
    let mut n = 2;
    while used.contains(&candidate.to_lowercase()) {
        let suffix = format!(" ({})", n);
        let keep = MAX_SHEET_NAME - suffix.chars().count();
        candidate = base.chars().take(keep).collect::<String>() + &suffix;
        n += 1;
    }

    used.insert(candidate.to_lowercase());
    candidate
}
