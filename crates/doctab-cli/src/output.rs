//! Output writers and terminal formatting.

use crate::batch::{DocumentReport, DocumentStatus};
use crate::error::{CliError, Result};
use colored::*;
use doctab_domain::MergedResult;
use rust_xlsxwriter::{Workbook, XlsxError};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Name of the single worksheet in every workbook
pub const WORKSHEET_NAME: &str = "data";

/// Write `{dir}/{stem}.json` with the merged schema and records.
pub fn write_json(dir: &Path, stem: &str, result: &MergedResult) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.json", stem));
    fs::write(&path, serde_json::to_string_pretty(result)?)?;
    Ok(path)
}

/// Write `{dir}/{stem}.xlsx`: header row = schema, one row per record.
pub fn write_xlsx(dir: &Path, stem: &str, result: &MergedResult) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.xlsx", stem));

    let mut workbook = Workbook::new();
    {
        let worksheet = workbook
            .add_worksheet()
            .set_name(WORKSHEET_NAME)
            .map_err(|e| map_xlsx_error("name worksheet", e))?;

        for (col, field) in result.schema.iter().enumerate() {
            worksheet
                .write_string(0, column_index(col)?, field)
                .map_err(|e| map_xlsx_error("write header", e))?;
        }

        for (row_idx, row) in result.rows().enumerate() {
            let row_num = u32::try_from(row_idx + 1)
                .map_err(|_| CliError::Output(format!("row {} exceeds Excel limits", row_idx + 1)))?;
            for (col, value) in row.iter().enumerate() {
                let col_num = column_index(col)?;
                let written = match value {
                    Value::String(text) => worksheet.write_string(row_num, col_num, text),
                    Value::Bool(flag) => worksheet.write_boolean(row_num, col_num, *flag),
                    Value::Number(number) => match number.as_f64() {
                        Some(n) => worksheet.write_number(row_num, col_num, n),
                        None => worksheet.write_string(row_num, col_num, number.to_string()),
                    },
                    Value::Null => worksheet.write_string(row_num, col_num, ""),
                    other => worksheet.write_string(row_num, col_num, other.to_string()),
                };
                written.map_err(|e| map_xlsx_error("write cell", e))?;
            }
        }
    }

    workbook
        .save(&path)
        .map_err(|e| map_xlsx_error("save workbook", e))?;
    Ok(path)
}

fn column_index(index: usize) -> Result<u16> {
    u16::try_from(index)
        .map_err(|_| CliError::Output(format!("column index {} exceeds Excel limits", index)))
}

fn map_xlsx_error(action: &str, err: XlsxError) -> CliError {
    CliError::Output(format!("failed to {}: {}", action, err))
}

/// Terminal formatter.
pub struct Formatter {
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(color_enabled: bool) -> Self {
        Self { color_enabled }
    }

    /// Summary table, one row per document.
    pub fn summary(&self, reports: &[DocumentReport]) -> String {
        if reports.is_empty() {
            return self.warning("No PDF files found.");
        }

        let mut builder = Builder::default();
        builder.push_record(["Document", "Chunks", "Cached", "Records", "Fields", "Status"]);

        for report in reports {
            let status = match &report.status {
                DocumentStatus::Ok => self.colorize("ok", "green"),
                DocumentStatus::Skipped => self.colorize("skipped", "yellow"),
                DocumentStatus::Failed(message) => {
                    self.colorize(&format!("failed: {}", message), "red")
                }
            };
            builder.push_record([
                report.name.clone(),
                report.chunks.to_string(),
                report.cached.to_string(),
                report.records.to_string(),
                report.fields.to_string(),
                status,
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}
