//! Project listing, project detail, hours entry and CSV export.

use rocket::Route;
use rocket::form::Form;
use rocket::http::Status;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket_dyn_templates::{Template, context};

use super::{UserView, flash_view, non_blank, unexpected_error};
use crate::DbConn;
use crate::error::PortalError;
use crate::export::{CsvDownload, projects_csv};
use crate::models::AppUser;
use crate::orm::department::get_department;
use crate::orm::employee::{employee_choices, resolve_employee_index};
use crate::orm::project::{ProjectSort, get_project, project_assignments, project_summaries};
use crate::orm::works_on::{MAX_HOURS, add_hours};
use crate::session_guards::{AdminUser, AuthenticatedUser};

const LISTING: &str = "/projects";

fn detail_uri(pnumber: i32) -> String {
    uri!("/projects", detail(pnumber)).to_string()
}

pub fn hours_ceiling_message() -> String {
    format!(
        "Hours would exceed the maximum of {:.1} for this assignment.",
        MAX_HOURS
    )
}

#[derive(FromForm, Debug)]
pub struct SortForm {
    pub method: Option<String>,
    pub direction: Option<String>,
}

#[derive(FromForm, Debug)]
pub struct HoursForm {
    /// Position in the name-sorted employee dropdown, not an SSN.
    pub employee_index: Option<usize>,
    #[field(default = String::new())]
    pub hours: String,
}

/// Hours must be a finite number greater than zero.
pub fn parse_hours(raw: &str) -> Result<f64, String> {
    let raw = non_blank(raw).ok_or_else(|| "Hours are required".to_string())?;
    let hours: f64 = raw
        .parse()
        .ok()
        .filter(|h: &f64| h.is_finite())
        .ok_or_else(|| "Hours must be a number".to_string())?;
    if hours <= 0.0 {
        return Err("Hours must be greater than zero".to_string());
    }
    Ok(hours)
}

async fn render_listing(
    user: &AppUser,
    db: DbConn,
    flash: Option<FlashMessage<'_>>,
    sort: ProjectSort,
) -> Result<Template, Status> {
    let projects = db
        .run(move |conn| project_summaries(conn, sort))
        .await
        .map_err(|e| {
            error!("Failed to load project listing: {:?}", e);
            Status::InternalServerError
        })?;

    Ok(Template::render(
        "projects/list",
        context! {
            user: UserView::from(user),
            flash: flash_view(flash),
            projects,
            method: sort.method.as_str(),
            direction: sort.direction.as_str(),
        },
    ))
}

/// `GET /projects?method=&direction=`
#[get("/?<method>&<direction>")]
pub async fn listing(
    auth_user: AuthenticatedUser,
    db: DbConn,
    flash: Option<FlashMessage<'_>>,
    method: Option<String>,
    direction: Option<String>,
) -> Result<Template, Status> {
    let sort = ProjectSort::from_params(method.as_deref(), direction.as_deref());
    render_listing(&auth_user.user, db, flash, sort).await
}

/// The sort form posts here; values outside the whitelist fall back to the defaults.
#[post("/", data = "<form>")]
pub async fn listing_sorted(
    auth_user: AuthenticatedUser,
    db: DbConn,
    flash: Option<FlashMessage<'_>>,
    form: Form<SortForm>,
) -> Result<Template, Status> {
    let sort = ProjectSort::from_params(form.method.as_deref(), form.direction.as_deref());
    render_listing(&auth_user.user, db, flash, sort).await
}

/// `GET /projects/export`: the listing as a CSV attachment, in the requested order.
#[get("/export?<method>&<direction>")]
pub async fn export(
    admin: AdminUser,
    db: DbConn,
    method: Option<String>,
    direction: Option<String>,
) -> Result<CsvDownload, Flash<Redirect>> {
    let sort = ProjectSort::from_params(method.as_deref(), direction.as_deref());
    let rows = db
        .run(move |conn| project_summaries(conn, sort))
        .await
        .map_err(|e| unexpected_error("Failed to load projects for export", e, LISTING))?;

    let body = projects_csv(&rows)
        .map_err(|e| unexpected_error("Failed to write project CSV", e, LISTING))?;

    info!(
        "'{}' exported {} project(s) as CSV",
        admin.user.username,
        rows.len()
    );
    Ok(CsvDownload::new("projects.csv", body))
}

#[get("/<pnumber>")]
pub async fn detail(
    auth_user: AuthenticatedUser,
    db: DbConn,
    flash: Option<FlashMessage<'_>>,
    pnumber: i32,
) -> Result<Template, Flash<Redirect>> {
    let loaded = db
        .run(move |conn| {
            let project = match get_project(conn, pnumber)? {
                Some(project) => project,
                None => return Ok(None),
            };
            let department = get_department(conn, project.dnum)?;
            let assignments = project_assignments(conn, pnumber)?;
            let choices = employee_choices(conn)?;
            Ok::<_, diesel::result::Error>(Some((project, department, assignments, choices)))
        })
        .await
        .map_err(|e| unexpected_error("Failed to load project", e, LISTING))?;

    let (project, department, assignments, employees) = loaded
        .ok_or_else(|| Flash::error(Redirect::to(LISTING), "Project not found"))?;

    let total_hours: f64 = assignments.iter().map(|a| a.hours).sum();

    Ok(Template::render(
        "projects/detail",
        context! {
            user: UserView::from(&auth_user.user),
            flash: flash_view(flash),
            project,
            department_name: department.map(|d| d.dname),
            assignments,
            total_hours,
            employees,
            max_hours: MAX_HOURS,
        },
    ))
}

/// Adds hours for the employee at `employee_index` of the name-sorted list.
///
/// Hours accumulate; a total past the ceiling is refused by the database
/// and the stored value stays as it was.
#[post("/<pnumber>/hours", data = "<form>")]
pub async fn add_project_hours(
    admin: AdminUser,
    db: DbConn,
    pnumber: i32,
    form: Form<HoursForm>,
) -> Flash<Redirect> {
    let back = detail_uri(pnumber);

    let hours = match parse_hours(&form.hours) {
        Ok(hours) => hours,
        Err(msg) => return Flash::error(Redirect::to(back), msg),
    };
    let index = match form.employee_index {
        Some(index) => index,
        None => return Flash::error(Redirect::to(back), "Selected employee no longer exists"),
    };

    let result = db
        .run(move |conn| {
            let ssn = match resolve_employee_index(conn, index)? {
                Some(ssn) => ssn,
                None => return Ok(None),
            };
            add_hours(conn, &ssn, pnumber, hours)?;
            Ok::<_, PortalError>(Some(ssn))
        })
        .await;

    match result {
        Ok(Some(ssn)) => {
            info!(
                "'{}' added {} hour(s) for {} on project {}",
                admin.user.username, hours, ssn, pnumber
            );
            Flash::success(Redirect::to(back), "Hours updated successfully")
        }
        Ok(None) => Flash::error(Redirect::to(back), "Selected employee no longer exists"),
        Err(PortalError::CheckViolation(_)) => {
            Flash::error(Redirect::to(back), hours_ceiling_message())
        }
        Err(PortalError::ForeignKey(_)) => Flash::error(
            Redirect::to(LISTING),
            format!("Project {} no longer exists", pnumber),
        ),
        Err(e) => unexpected_error("Failed to record hours", e, back),
    }
}

pub fn routes() -> Vec<Route> {
    routes![
        listing,
        listing_sorted,
        export,
        detail,
        add_project_hours
    ]
}
