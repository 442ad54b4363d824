//! Department import from a spreadsheet upload.
//!
//! The first worksheet is read with `calamine`; its first row is a header
//! naming the columns `dnumber`, `dname` and (optionally) `mgr_ssn`. Every
//! later row becomes one department. Rows are parsed and inserted one at a
//! time so a bad row never blocks the good ones.

use std::io::Cursor;

use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use diesel::sqlite::SqliteConnection;
use thiserror::Error;

use crate::error::PortalError;
use crate::models::NewDepartment;
use crate::orm::department::insert_department;

/// How many row errors the summary spells out before collapsing the rest.
pub const MAX_REPORTED_ERRORS: usize = 5;

/// Failures that abort the whole import.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Could not read spreadsheet")]
    Unreadable(#[from] calamine::Error),
    #[error("Could not read spreadsheet: the workbook has no worksheets")]
    NoWorksheet,
    #[error("The header row must contain a '{0}' column")]
    MissingColumn(&'static str),
}

/// One data row of the sheet, either parsed or with the reason it was refused.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    /// 1-based row number as shown by spreadsheet programs.
    pub row: usize,
    pub department: Result<NewDepartment, String>,
}

/// Outcome of an import: how many departments went in, and why the others
/// did not.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ImportReport {
    pub imported: usize,
    pub errors: Vec<String>,
}

impl ImportReport {
    /// Lines for the result flash: the count, up to
    /// [`MAX_REPORTED_ERRORS`] row errors and a tally of the remainder.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Imported {} department(s).", self.imported)];
        lines.extend(self.errors.iter().take(MAX_REPORTED_ERRORS).cloned());
        if self.errors.len() > MAX_REPORTED_ERRORS {
            lines.push(format!(
                "…and {} more error(s).",
                self.errors.len() - MAX_REPORTED_ERRORS
            ));
        }
        lines
    }
}

struct Columns {
    dnumber: usize,
    dname: usize,
    mgr_ssn: Option<usize>,
}

impl Columns {
    fn from_header(header: &[Data]) -> Result<Self, ImportError> {
        let find = |name: &str| {
            header
                .iter()
                .position(|cell| cell_text(cell).is_some_and(|t| t.eq_ignore_ascii_case(name)))
        };

        Ok(Columns {
            dnumber: find("dnumber").ok_or(ImportError::MissingColumn("dnumber"))?,
            dname: find("dname").ok_or(ImportError::MissingColumn("dname"))?,
            mgr_ssn: find("mgr_ssn"),
        })
    }
}

/// Reads the first worksheet of an `.xlsx`, `.xls`, `.xlsb` or `.ods` file.
pub fn read_departments(bytes: &[u8]) -> Result<Vec<ParsedRow>, ImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ImportError::NoWorksheet)??;
    parse_departments(&range)
}

/// Parses every non-empty row below the header.
pub fn parse_departments(range: &Range<Data>) -> Result<Vec<ParsedRow>, ImportError> {
    // calamine trims leading empty rows; keep numbering relative to the sheet.
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let mut rows = range.rows();

    let header = match rows.next() {
        Some(header) => header,
        None => return Err(ImportError::MissingColumn("dnumber")),
    };
    let columns = Columns::from_header(header)?;

    Ok(rows
        .enumerate()
        .filter(|(_, cells)| !is_empty_row(cells))
        .map(|(offset, cells)| ParsedRow {
            // +1 for the header, +1 for 1-based numbering
            row: first_row + offset + 2,
            department: parse_row(cells, &columns),
        })
        .collect())
}

fn parse_row(cells: &[Data], columns: &Columns) -> Result<NewDepartment, String> {
    let cell = |idx: usize| cells.get(idx).unwrap_or(&Data::Empty);

    let dnumber = match cell(columns.dnumber) {
        Data::Empty => return Err("dnumber is required".to_string()),
        value => parse_whole_number(value)
            .ok_or_else(|| format!("dnumber '{}' is not a whole number", value))?,
    };

    let dname = cell_text(cell(columns.dname)).ok_or_else(|| "dname is required".to_string())?;

    let mgr_ssn = columns.mgr_ssn.and_then(|idx| cell_text(cell(idx)));

    Ok(NewDepartment {
        dnumber,
        dname,
        mgr_ssn,
    })
}

fn parse_whole_number(value: &Data) -> Option<i32> {
    match value {
        Data::Int(i) => i32::try_from(*i).ok(),
        Data::Float(f) if f.fract() == 0.0 && *f >= i32::MIN as f64 && *f <= i32::MAX as f64 => {
            Some(*f as i32)
        }
        Data::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Text content of a cell, trimmed. Numeric cells (SSNs typed as numbers)
/// are rendered without a fractional part.
fn cell_text(value: &Data) -> Option<String> {
    let text = match value {
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{:.0}", f),
        Data::Float(f) => f.to_string(),
        _ => return None,
    };
    if text.is_empty() { None } else { Some(text) }
}

fn is_empty_row(cells: &[Data]) -> bool {
    cells.iter().all(|cell| match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    })
}

/// Inserts each parsed row on its own, collecting `Row N: message` errors.
pub fn import_departments(conn: &mut SqliteConnection, rows: Vec<ParsedRow>) -> ImportReport {
    let mut report = ImportReport::default();

    for ParsedRow { row, department } in rows {
        let department = match department {
            Ok(department) => department,
            Err(msg) => {
                report.errors.push(format!("Row {}: {}", row, msg));
                continue;
            }
        };

        match insert_department(conn, &department) {
            Ok(()) => report.imported += 1,
            Err(PortalError::Duplicate(_)) => report.errors.push(format!(
                "Row {}: department {} or name '{}' already exists",
                row, department.dnumber, department.dname
            )),
            Err(PortalError::ForeignKey(_)) => report.errors.push(format!(
                "Row {}: no employee with SSN '{}'",
                row,
                department.mgr_ssn.as_deref().unwrap_or_default()
            )),
            Err(e) => {
                error!("Department import failed on row {}: {:?}", row, e);
                report
                    .errors
                    .push(format!("Row {}: could not be saved", row));
            }
        }
    }

    info!(
        "Department import finished: {} imported, {} rejected",
        report.imported,
        report.errors.len()
    );
    report
}
