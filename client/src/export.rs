//! Multi-sheet spreadsheet export of one month.

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use thiserror::Error;

use crate::stat::datatype::CategoryType;
use crate::stat::{Ledger, MonthKey};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] XlsxError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}
impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Text(v)
    }
}
impl From<Decimal> for Cell {
    fn from(v: Decimal) -> Self {
        Cell::Number(v.to_f64().unwrap_or(0.0))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub header: Vec<&'static str>,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportBook {
    pub sheets: Vec<Sheet>,
}

impl ExportBook {
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

pub fn default_file_name(month: MonthKey) -> String {
    format!("ledger_{:04}_{:02}.xlsx", month.year, month.month)
}

/// Lays out the month as `Transactions`, `Summary` and `Categories` sheets.
pub fn build_workbook(ledger: &Ledger, month: MonthKey) -> ExportBook {
    let transactions = Sheet {
        name: "Transactions".into(),
        header: vec!["Date", "Type", "Category", "Description", "Amount"],
        rows: ledger
            .transactions_in(month)
            .into_iter()
            .map(|t| {
                vec![
                    Cell::from(t.transaction_date.format("%Y-%m-%d").to_string()),
                    Cell::from(t.kind().label()),
                    Cell::from(t.category_name()),
                    Cell::from(t.description.clone().unwrap_or_default()),
                    Cell::from(t.signed_amount()),
                ]
            })
            .collect(),
    };

    let stats = ledger.monthly_stats(month);
    let summary = Sheet {
        name: "Summary".into(),
        header: vec!["Month", "Income", "Expense", "Total"],
        rows: vec![vec![
            Cell::from(month.to_string()),
            Cell::from(stats.income),
            Cell::from(stats.expense),
            Cell::from(stats.total),
        ]],
    };

    let mut category_rows = Vec::new();
    for kind in [CategoryType::Income, CategoryType::Expense] {
        for row in ledger.category_breakdown(month, kind) {
            category_rows.push(vec![
                Cell::from(kind.label()),
                Cell::from(row.name),
                Cell::Number(row.count as f64),
                Cell::from(row.total),
                Cell::Number(row.percentage),
            ]);
        }
    }
    let categories = Sheet {
        name: "Categories".into(),
        header: vec!["Type", "Category", "Count", "Total", "Percentage"],
        rows: category_rows,
    };

    ExportBook {
        sheets: vec![transactions, summary, categories],
    }
}

pub fn write_xlsx(book: &ExportBook, path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    for sheet in &book.sheets {
        let ws = workbook.add_worksheet();
        ws.set_name(&sheet.name)?;
        for (col, title) in sheet.header.iter().enumerate() {
            ws.write_string_with_format(0, col as u16, *title, &bold)?;
        }
        for (r, row) in sheet.rows.iter().enumerate() {
            let r = r as u32 + 1;
            for (c, cell) in row.iter().enumerate() {
                match cell {
                    Cell::Text(s) => ws.write_string(r, c as u16, s)?,
                    Cell::Number(n) => ws.write_number(r, c as u16, *n)?,
                };
            }
        }
    }
    workbook.save(path)?;
    Ok(())
}

/// Builds and writes the month into `dir`, returning the file written.
pub fn export_month(ledger: &Ledger, month: MonthKey, dir: &Path) -> Result<PathBuf, ExportError> {
    let path = dir.join(default_file_name(month));
    let book = build_workbook(ledger, month);
    write_xlsx(&book, &path)?;
    tracing::info!(path = %path.display(), rows = book.sheets[0].rows.len(), "exported month");
    Ok(path)
}
