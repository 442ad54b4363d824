//! Employee management: list, add, edit and delete.

use chrono::NaiveDate;
use rocket::Route;
use rocket::form::Form;
use rocket::http::Status;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket_dyn_templates::{Template, context};

use super::{UserView, flash_view, non_blank, unexpected_error};
use crate::DbConn;
use crate::error::PortalError;
use crate::models::{EmployeeUpdate, NewEmployee};
use crate::orm::department::list_departments;
use crate::orm::employee::{
    delete_employee, employee_choices, get_employee, insert_employee, list_employees,
    update_employee,
};
use crate::session_guards::{AdminUser, AuthenticatedUser};

const MANAGE: &str = "/employees/manage";
const ADD: &str = "/employees/add";

pub const EMPLOYEE_IN_USE_MESSAGE: &str = "Cannot delete employee: They are still assigned to projects, have dependents listed, or are a manager/supervisor.";

/// Percent-encodes the SSN so any path segment round-trips through `Location`.
fn edit_uri(ssn: &str) -> String {
    uri!("/employees", edit_form(ssn)).to_string()
}

#[derive(FromForm, Debug, Default)]
pub struct EmployeeForm {
    #[field(default = String::new())]
    pub ssn: String,
    #[field(default = String::new())]
    pub fname: String,
    #[field(default = String::new())]
    pub minit: String,
    #[field(default = String::new())]
    pub lname: String,
    #[field(default = String::new())]
    pub address: String,
    #[field(default = String::new())]
    pub salary: String,
    #[field(default = String::new())]
    pub sex: String,
    #[field(default = String::new())]
    pub dno: String,
    #[field(default = String::new())]
    pub super_ssn: String,
    #[field(default = String::new())]
    pub bdate: String,
    #[field(default = String::new())]
    pub empdate: String,
}

#[derive(FromForm, Debug, Default)]
pub struct EmployeeEditForm {
    #[field(default = String::new())]
    pub address: String,
    #[field(default = String::new())]
    pub salary: String,
    #[field(default = String::new())]
    pub dno: String,
}

fn parse_salary(raw: &str) -> Result<f64, String> {
    let salary: f64 = raw
        .trim()
        .parse()
        .ok()
        .filter(|s: &f64| s.is_finite())
        .ok_or_else(|| "Salary must be a valid number".to_string())?;
    if salary <= 0.0 {
        return Err("Salary must be positive".to_string());
    }
    Ok(salary)
}

fn parse_department(raw: &str) -> Result<i32, String> {
    raw.trim()
        .parse()
        .map_err(|_| "Department number must be a whole number".to_string())
}

fn parse_date(raw: &str, label: &str) -> Result<Option<NaiveDate>, String> {
    match non_blank(raw) {
        None => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| format!("{} must be a date in YYYY-MM-DD format", label)),
    }
}

impl EmployeeForm {
    /// Checks required fields and converts the form into an insertable row.
    pub fn validate(&self) -> Result<NewEmployee, String> {
        let required = [
            &self.ssn,
            &self.fname,
            &self.lname,
            &self.address,
            &self.salary,
            &self.dno,
        ];
        if required.iter().any(|field| non_blank(field).is_none()) {
            return Err("All fields are required".to_string());
        }

        Ok(NewEmployee {
            ssn: self.ssn.trim().to_string(),
            fname: self.fname.trim().to_string(),
            minit: non_blank(&self.minit).map(str::to_string),
            lname: self.lname.trim().to_string(),
            address: self.address.trim().to_string(),
            salary: parse_salary(&self.salary)?,
            sex: non_blank(&self.sex).map(str::to_string),
            dno: parse_department(&self.dno)?,
            super_ssn: non_blank(&self.super_ssn).map(str::to_string),
            bdate: parse_date(&self.bdate, "Birth date")?,
            empdate: parse_date(&self.empdate, "Employment date")?,
        })
    }
}

impl EmployeeEditForm {
    pub fn validate(&self) -> Result<EmployeeUpdate, String> {
        if [&self.address, &self.salary, &self.dno]
            .iter()
            .any(|field| non_blank(field).is_none())
        {
            return Err("All fields are required".to_string());
        }

        Ok(EmployeeUpdate {
            address: self.address.trim().to_string(),
            salary: parse_salary(&self.salary)?,
            dno: parse_department(&self.dno)?,
        })
    }
}

/// `GET /employees/manage`: every employee by last name, then first name.
#[get("/manage")]
pub async fn manage(
    auth_user: AuthenticatedUser,
    db: DbConn,
    flash: Option<FlashMessage<'_>>,
) -> Result<Template, Status> {
    let employees = db.run(list_employees).await.map_err(|e| {
        error!("Failed to list employees: {:?}", e);
        Status::InternalServerError
    })?;

    Ok(Template::render(
        "employees/list",
        context! {
            user: UserView::from(&auth_user.user),
            flash: flash_view(flash),
            employees,
        },
    ))
}

#[get("/add")]
pub async fn add_form(
    admin: AdminUser,
    db: DbConn,
    flash: Option<FlashMessage<'_>>,
) -> Result<Template, Flash<Redirect>> {
    let (departments, supervisors) = db
        .run(|conn| Ok::<_, diesel::result::Error>((list_departments(conn)?, employee_choices(conn)?)))
        .await
        .map_err(|e| unexpected_error("Failed to load add-employee form", e, MANAGE))?;

    Ok(Template::render(
        "employees/add",
        context! {
            user: UserView::from(&admin.user),
            flash: flash_view(flash),
            departments,
            supervisors,
        },
    ))
}

#[post("/add", data = "<form>")]
pub async fn add(admin: AdminUser, db: DbConn, form: Form<EmployeeForm>) -> Flash<Redirect> {
    let new_employee = match form.validate() {
        Ok(new_employee) => new_employee,
        Err(msg) => return Flash::error(Redirect::to(ADD), msg),
    };

    let ssn = new_employee.ssn.clone();
    match db.run(move |conn| insert_employee(conn, &new_employee)).await {
        Ok(()) => {
            info!("'{}' added employee {}", admin.user.username, ssn);
            Flash::success(Redirect::to(MANAGE), "Employee added successfully")
        }
        Err(PortalError::Duplicate(_)) => {
            Flash::error(Redirect::to(ADD), "Error: SSN must be unique")
        }
        Err(PortalError::ForeignKey(_)) => Flash::error(
            Redirect::to(ADD),
            "Error: Invalid department number or supervisor SSN",
        ),
        Err(e) => unexpected_error("Failed to add employee", e, ADD),
    }
}

#[get("/edit/<ssn>")]
pub async fn edit_form(
    admin: AdminUser,
    db: DbConn,
    flash: Option<FlashMessage<'_>>,
    ssn: String,
) -> Result<Template, Flash<Redirect>> {
    let (employee, departments) = db
        .run(move |conn| {
            Ok::<_, diesel::result::Error>((get_employee(conn, &ssn)?, list_departments(conn)?))
        })
        .await
        .map_err(|e| unexpected_error("Failed to load employee", e, MANAGE))?;

    let employee =
        employee.ok_or_else(|| Flash::error(Redirect::to(MANAGE), "Employee not found"))?;

    Ok(Template::render(
        "employees/edit",
        context! {
            user: UserView::from(&admin.user),
            flash: flash_view(flash),
            full_name: employee.full_name(),
            employee,
            departments,
        },
    ))
}

/// Updates address, salary and department. The SSN in the path is never changed.
#[post("/edit/<ssn>", data = "<form>")]
pub async fn edit(
    admin: AdminUser,
    db: DbConn,
    ssn: String,
    form: Form<EmployeeEditForm>,
) -> Flash<Redirect> {
    let changes = match form.validate() {
        Ok(changes) => changes,
        Err(msg) => return Flash::error(Redirect::to(edit_uri(&ssn)), msg),
    };

    let target = ssn.clone();
    match db
        .run(move |conn| update_employee(conn, &target, &changes))
        .await
    {
        Ok(()) => {
            info!("'{}' updated employee {}", admin.user.username, ssn);
            Flash::success(Redirect::to(MANAGE), "Employee updated successfully")
        }
        Err(PortalError::NotFound) => Flash::error(Redirect::to(MANAGE), "Employee not found"),
        Err(PortalError::ForeignKey(_)) => Flash::error(
            Redirect::to(edit_uri(&ssn)),
            "Error: Invalid department number",
        ),
        Err(e) => unexpected_error("Failed to update employee", e, edit_uri(&ssn)),
    }
}

/// Refused while the employee is still referenced anywhere; nothing is removed then.
#[post("/delete/<ssn>")]
pub async fn delete(admin: AdminUser, db: DbConn, ssn: String) -> Flash<Redirect> {
    let target = ssn.clone();
    match db.run(move |conn| delete_employee(conn, &target)).await {
        Ok(()) => {
            info!("'{}' deleted employee {}", admin.user.username, ssn);
            Flash::success(Redirect::to(MANAGE), "Employee deleted successfully")
        }
        Err(PortalError::ForeignKey(_)) => {
            Flash::error(Redirect::to(MANAGE), EMPLOYEE_IN_USE_MESSAGE)
        }
        Err(PortalError::NotFound) => Flash::error(Redirect::to(MANAGE), "Employee not found"),
        Err(e) => unexpected_error("Failed to delete employee", e, MANAGE),
    }
}

pub fn routes() -> Vec<Route> {
    routes![manage, add_form, add, edit_form, edit, delete]
}
