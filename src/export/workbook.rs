use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};

use super::columns::{export_row, COLUMNS};
use super::defaults::Cell;
use super::ExportError;
use crate::records::types::TestReport;

pub const SHEET_NAME: &str = "Data Tes Psikologis";

/// `Data_Tes_<no_tes>_<nama_peserta>.xlsx`, with path separators replaced.
pub fn single_file_name(report: &TestReport) -> String {
    let info = &report.personal.info;
    format!(
        "Data_Tes_{}_{}.xlsx",
        file_safe(&info.no_tes),
        file_safe(&info.nama_peserta)
    )
}

/// `Data_Tes_Psikologis_<YYYY-MM-DD>.xlsx`
pub fn bulk_file_name(date: NaiveDate) -> String {
    format!("Data_Tes_Psikologis_{}.xlsx", date.format("%Y-%m-%d"))
}

fn file_safe(part: &str) -> String {
    part.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            other => other,
        })
        .collect()
}

/// One sheet: a bold header row, then a row per report.
pub fn build_workbook(reports: &[TestReport]) -> Result<Workbook, ExportError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, name) in COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &header)?;
    }

    for (i, report) in reports.iter().enumerate() {
        let row = (i + 1) as u32;
        for (col, cell) in export_row(report).iter().enumerate() {
            match cell {
                Cell::Text(text) => worksheet.write_string(row, col as u16, text)?,
                Cell::Number(n) => worksheet.write_number(row, col as u16, *n)?,
            };
        }
    }

    worksheet.set_freeze_panes(1, 0)?;
    Ok(workbook)
}

/// Write `reports` to `path`.
pub fn write_workbook(reports: &[TestReport], path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ExportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut workbook = build_workbook(reports)?;
    workbook.save(path)?;
    tracing::info!(path = %path.display(), rows = reports.len(), "workbook written");
    Ok(())
}

/// Export one record into `dir`. Returns the written path.
pub fn export_single(report: &TestReport, dir: &Path) -> Result<PathBuf, ExportError> {
    let path = dir.join(single_file_name(report));
    write_workbook(std::slice::from_ref(report), &path)?;
    Ok(path)
}

/// Export every record into `dir`, named after `today`. Returns the written
/// path.
pub fn export_all(
    reports: &[TestReport],
    dir: &Path,
    today: NaiveDate,
) -> Result<PathBuf, ExportError> {
    let path = dir.join(bulk_file_name(today));
    write_workbook(reports, &path)?;
    Ok(path)
}
