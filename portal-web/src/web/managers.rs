//! Department overview and the spreadsheet import of departments.

use std::io;

use rocket::Route;
use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::http::Status;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::tokio::io::AsyncReadExt;
use rocket_dyn_templates::{Template, context};

use super::{UserView, flash_view, unexpected_error};
use crate::DbConn;
use crate::import::{ImportError, import_departments, read_departments};
use crate::orm::department::department_overview;
use crate::session_guards::{AdminUser, AuthenticatedUser};

const IMPORT: &str = "/managers/import";
const OVERVIEW: &str = "/managers/overview";

#[derive(FromForm)]
pub struct ImportUpload<'r> {
    pub file: Option<TempFile<'r>>,
}

async fn read_upload(file: &TempFile<'_>) -> io::Result<Vec<u8>> {
    let mut reader = Box::pin(file.open().await?);
    let mut bytes = Vec::with_capacity(file.len() as usize);
    reader.read_to_end(&mut bytes).await?;
    Ok(bytes)
}

#[get("/overview")]
pub async fn overview(
    auth_user: AuthenticatedUser,
    db: DbConn,
    flash: Option<FlashMessage<'_>>,
) -> Result<Template, Status> {
    let departments = db.run(department_overview).await.map_err(|e| {
        error!("Failed to load department overview: {:?}", e);
        Status::InternalServerError
    })?;

    Ok(Template::render(
        "managers/overview",
        context! {
            user: UserView::from(&auth_user.user),
            flash: flash_view(flash),
            departments,
        },
    ))
}

#[get("/import")]
pub fn import_form(admin: AdminUser, flash: Option<FlashMessage<'_>>) -> Template {
    Template::render(
        "managers/import",
        context! {
            user: UserView::from(&admin.user),
            flash: flash_view(flash),
        },
    )
}

/// Imports departments from the uploaded workbook, one row at a time.
///
/// The result flash lists the number imported and the first row errors.
#[post("/import", data = "<upload>")]
pub async fn import(
    admin: AdminUser,
    db: DbConn,
    upload: Form<ImportUpload<'_>>,
) -> Flash<Redirect> {
    let file = match upload.file.as_ref().filter(|f| f.len() > 0) {
        Some(file) => file,
        None => return Flash::error(Redirect::to(IMPORT), "Please choose a spreadsheet to upload."),
    };

    let bytes = match read_upload(file).await {
        Ok(bytes) => bytes,
        Err(e) => return unexpected_error("Failed to read uploaded file", e, IMPORT),
    };

    let rows = match read_departments(&bytes) {
        Ok(rows) => rows,
        Err(e @ ImportError::Unreadable(_)) => {
            warn!("Rejected department upload: {:?}", e);
            return Flash::error(Redirect::to(IMPORT), e.to_string());
        }
        Err(e) => return Flash::error(Redirect::to(IMPORT), e.to_string()),
    };

    let report = db.run(move |conn| import_departments(conn, rows)).await;
    info!(
        "'{}' imported {} department(s) with {} error(s)",
        admin.user.username,
        report.imported,
        report.errors.len()
    );

    let summary = report.summary_lines().join("\n");
    if report.errors.is_empty() {
        Flash::success(Redirect::to(OVERVIEW), summary)
    } else {
        Flash::warning(Redirect::to(IMPORT), summary)
    }
}

pub fn routes() -> Vec<Route> {
    routes![overview, import_form, import]
}
