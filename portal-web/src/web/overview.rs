//! The home page: employee overview with filters.

use rocket::Route;
use rocket::http::Status;
use rocket::request::FlashMessage;
use rocket_dyn_templates::{Template, context};

use super::{UserView, flash_view, non_blank};
use crate::DbConn;
use crate::orm::department::list_departments;
use crate::orm::employee::{EmployeeFilter, EmployeeSort, employee_overview};
use crate::session_guards::AuthenticatedUser;

/// `GET /?department=&name=&sort=`
///
/// A department value that is not a number is treated as "all departments",
/// and an unknown sort key falls back to name ascending.
#[get("/?<department>&<name>&<sort>")]
pub async fn home(
    auth_user: AuthenticatedUser,
    db: DbConn,
    flash: Option<FlashMessage<'_>>,
    department: Option<String>,
    name: Option<String>,
    sort: Option<String>,
) -> Result<Template, Status> {
    let filter = EmployeeFilter {
        department: department
            .as_deref()
            .and_then(non_blank)
            .and_then(|d| d.parse().ok()),
        name: name.as_deref().and_then(non_blank).map(str::to_string),
        sort: EmployeeSort::from_param(sort.as_deref()),
    };

    let query_filter = filter.clone();
    let (employees, departments) = db
        .run(move |conn| {
            let employees = employee_overview(conn, &query_filter)?;
            let departments = list_departments(conn)?;
            Ok::<_, diesel::result::Error>((employees, departments))
        })
        .await
        .map_err(|e| {
            error!("Failed to load employee overview: {:?}", e);
            Status::InternalServerError
        })?;

    Ok(Template::render(
        "index",
        context! {
            user: UserView::from(&auth_user.user),
            flash: flash_view(flash),
            employees,
            departments,
            selected_department: filter.department,
            name: filter.name.unwrap_or_default(),
            sort: filter.sort.as_str(),
        },
    ))
}

pub fn routes() -> Vec<Route> {
    routes![home]
}
