//! CSV export of the project listing.

use rocket::Responder;
use rocket::http::Header;

use crate::models::ProjectSummaryRow;

pub const PROJECTS_CSV_HEADER: [&str; 5] = [
    "project_number",
    "project_name",
    "owning_department",
    "headcount",
    "total_hours",
];

/// A CSV attachment. Browsers save it under `filename` instead of showing it.
#[derive(Responder)]
#[response(content_type = "text/csv")]
pub struct CsvDownload {
    body: Vec<u8>,
    disposition: Header<'static>,
}

impl CsvDownload {
    pub fn new(filename: &str, body: Vec<u8>) -> Self {
        CsvDownload {
            body,
            disposition: Header::new(
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", filename),
            ),
        }
    }
}

/// Serializes project summary rows, header first, even when there are no rows.
pub fn projects_csv(rows: &[ProjectSummaryRow]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(PROJECTS_CSV_HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}
