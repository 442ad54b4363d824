//! Employee reads and writes, plus the overview report on the home page.

use diesel::prelude::*;
use diesel::sql_types::{Integer, Nullable, Text};
use diesel::sqlite::SqliteConnection;

use crate::error::{PortalError, PortalResult};
use crate::models::{
    Employee, EmployeeChoice, EmployeeOverviewRow, EmployeeUpdate, NewEmployee, full_name,
};
use crate::schema::employee;

/// Sort orders accepted by the employee overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmployeeSort {
    #[default]
    NameAsc,
    NameDesc,
    HoursAsc,
    HoursDesc,
}

impl EmployeeSort {
    /// Parses the `sort` query value. Anything unrecognized becomes the default.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("name_desc") => EmployeeSort::NameDesc,
            Some("hours_asc") => EmployeeSort::HoursAsc,
            Some("hours_desc") => EmployeeSort::HoursDesc,
            _ => EmployeeSort::NameAsc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeSort::NameAsc => "name_asc",
            EmployeeSort::NameDesc => "name_desc",
            EmployeeSort::HoursAsc => "hours_asc",
            EmployeeSort::HoursDesc => "hours_desc",
        }
    }

    fn order_by_clause(&self) -> &'static str {
        match self {
            EmployeeSort::NameAsc => "full_name ASC",
            EmployeeSort::NameDesc => "full_name DESC",
            EmployeeSort::HoursAsc => "total_hours ASC",
            EmployeeSort::HoursDesc => "total_hours DESC",
        }
    }
}

/// Filters for the employee overview. Empty strings mean "no filter".
#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter {
    pub department: Option<i32>,
    pub name: Option<String>,
    pub sort: EmployeeSort,
}

/// Escapes `%`, `_` and `\` so user input matches literally inside LIKE.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Employee overview: department, dependent count, project count and total hours.
///
/// The ORDER BY clause comes from the [`EmployeeSort`] whitelist; filter
/// values are always bound parameters. The name filter matches
/// `fname minit lname` without the display period, case-insensitively
/// (SQLite `LIKE` folds ASCII case).
pub fn employee_overview(
    conn: &mut SqliteConnection,
    filter: &EmployeeFilter,
) -> Result<Vec<EmployeeOverviewRow>, diesel::result::Error> {
    let sql = format!(
        r#"
        WITH dep_counts AS (
            SELECT essn, COUNT(*) AS dependent_count
            FROM dependent
            GROUP BY essn
        ),
        proj_stats AS (
            SELECT essn,
                   COUNT(DISTINCT pno) AS project_count,
                   SUM(hours) AS total_hours
            FROM works_on
            GROUP BY essn
        )
        SELECT * FROM (
            SELECT
                e.ssn AS ssn,
                e.dno AS dno,
                CASE WHEN e.minit IS NULL OR TRIM(e.minit) = ''
                     THEN e.fname || ' ' || e.lname
                     ELSE e.fname || ' ' || e.minit || '. ' || e.lname
                END AS full_name,
                e.fname || ' ' || COALESCE(e.minit || ' ', '') || e.lname AS search_name,
                d.dname AS department_name,
                COALESCE(dc.dependent_count, 0) AS num_dependents,
                COALESCE(ps.project_count, 0) AS num_projects,
                COALESCE(ps.total_hours, 0.0) AS total_hours
            FROM employee e
            LEFT JOIN department d ON e.dno = d.dnumber
            LEFT JOIN dep_counts dc ON dc.essn = e.ssn
            LEFT JOIN proj_stats ps ON ps.essn = e.ssn
        ) overview
        WHERE (? IS NULL OR dno = ?)
          AND (? IS NULL OR search_name LIKE ? ESCAPE '\')
        ORDER BY {}, ssn ASC
        "#,
        filter.sort.order_by_clause()
    );

    let name_pattern = filter
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(like_pattern);

    diesel::sql_query(sql)
        .bind::<Nullable<Integer>, _>(filter.department)
        .bind::<Nullable<Integer>, _>(filter.department)
        .bind::<Nullable<Text>, _>(name_pattern.clone())
        .bind::<Nullable<Text>, _>(name_pattern)
        .load::<EmployeeOverviewRow>(conn)
}

/// All employees ordered by last name, then first name.
pub fn list_employees(conn: &mut SqliteConnection) -> Result<Vec<Employee>, diesel::result::Error> {
    employee::table
        .order((employee::lname.asc(), employee::fname.asc(), employee::ssn.asc()))
        .select(Employee::as_select())
        .load(conn)
}

pub fn get_employee(
    conn: &mut SqliteConnection,
    employee_ssn: &str,
) -> Result<Option<Employee>, diesel::result::Error> {
    employee::table
        .find(employee_ssn)
        .select(Employee::as_select())
        .first(conn)
        .optional()
}

/// The name-sorted employee list offered by the hours form.
///
/// Order is `lname, fname, ssn`; the position of an entry in this list is
/// what the form submits, see [`resolve_employee_index`].
pub fn employee_choices(
    conn: &mut SqliteConnection,
) -> Result<Vec<EmployeeChoice>, diesel::result::Error> {
    let rows = employee::table
        .order((employee::lname.asc(), employee::fname.asc(), employee::ssn.asc()))
        .select((employee::ssn, employee::fname, employee::minit, employee::lname))
        .load::<(String, String, Option<String>, String)>(conn)?;

    Ok(rows
        .into_iter()
        .map(|(ssn, fname, minit, lname)| EmployeeChoice {
            full_name: full_name(&fname, minit.as_deref(), &lname),
            ssn,
        })
        .collect())
}

/// Maps a position in the name-sorted employee list back to an SSN.
///
/// The list is re-read at submission time, so an employee added or removed
/// after the form was rendered shifts the positions.
pub fn resolve_employee_index(
    conn: &mut SqliteConnection,
    index: usize,
) -> Result<Option<String>, diesel::result::Error> {
    let offset = match i64::try_from(index) {
        Ok(offset) => offset,
        Err(_) => return Ok(None),
    };

    employee::table
        .order((employee::lname.asc(), employee::fname.asc(), employee::ssn.asc()))
        .select(employee::ssn)
        .offset(offset)
        .first::<String>(conn)
        .optional()
}

pub fn insert_employee(conn: &mut SqliteConnection, new_employee: &NewEmployee) -> PortalResult<()> {
    conn.transaction::<_, diesel::result::Error, _>(|c| {
        diesel::insert_into(employee::table)
            .values(new_employee)
            .execute(c)?;
        Ok(())
    })
    .map_err(PortalError::from)
}

/// Updates address, salary and department. The SSN is immutable.
pub fn update_employee(
    conn: &mut SqliteConnection,
    employee_ssn: &str,
    changes: &EmployeeUpdate,
) -> PortalResult<()> {
    let affected = conn
        .transaction::<_, diesel::result::Error, _>(|c| {
            diesel::update(employee::table.find(employee_ssn))
                .set(changes)
                .execute(c)
        })
        .map_err(PortalError::from)?;

    if affected == 0 {
        return Err(PortalError::NotFound);
    }
    Ok(())
}

/// Deletes an employee.
///
/// Fails with [`PortalError::ForeignKey`] while the employee is still
/// referenced by `works_on`, `dependent`, a department manager or a
/// supervised employee; nothing is removed in that case.
pub fn delete_employee(conn: &mut SqliteConnection, employee_ssn: &str) -> PortalResult<()> {
    let affected = conn
        .transaction::<_, diesel::result::Error, _>(|c| {
            diesel::delete(employee::table.find(employee_ssn)).execute(c)
        })
        .map_err(PortalError::from)?;

    if affected == 0 {
        return Err(PortalError::NotFound);
    }
    Ok(())
}
