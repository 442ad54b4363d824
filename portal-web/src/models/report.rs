//! Row types for the aggregate report queries.
//!
//! These are loaded with `diesel::sql_query`, so every field names its SQL
//! type explicitly and must match a column alias in the query.

use diesel::QueryableByName;
use diesel::sql_types::{BigInt, Double, Integer, Nullable, Text};
use serde::Serialize;

/// A line of the employee overview on the home page.
#[derive(QueryableByName, Debug, Clone, Serialize)]
pub struct EmployeeOverviewRow {
    #[diesel(sql_type = Text)]
    pub ssn: String,
    #[diesel(sql_type = Text)]
    pub full_name: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub department_name: Option<String>,
    #[diesel(sql_type = BigInt)]
    pub num_dependents: i64,
    #[diesel(sql_type = BigInt)]
    pub num_projects: i64,
    #[diesel(sql_type = Double)]
    pub total_hours: f64,
}

/// A line of the project listing and its CSV export.
#[derive(QueryableByName, Debug, Clone, Serialize)]
pub struct ProjectSummaryRow {
    #[diesel(sql_type = Integer)]
    pub project_number: i32,
    #[diesel(sql_type = Text)]
    pub project_name: String,
    #[diesel(sql_type = Text)]
    pub owning_department: String,
    #[diesel(sql_type = BigInt)]
    pub headcount: i64,
    #[diesel(sql_type = Double)]
    pub total_hours: f64,
}

/// Per-department statistics for the managers overview.
#[derive(QueryableByName, Debug, Clone, Serialize)]
pub struct DepartmentOverviewRow {
    #[diesel(sql_type = Text)]
    pub department_name: String,
    #[diesel(sql_type = Integer)]
    pub department_number: i32,
    #[diesel(sql_type = Text)]
    pub manager_name: String,
    #[diesel(sql_type = BigInt)]
    pub employee_count: i64,
    #[diesel(sql_type = Double)]
    pub total_hours: f64,
}

/// An employee's accumulated hours on one project.
#[derive(QueryableByName, Debug, Clone, Serialize)]
pub struct AssignmentRow {
    #[diesel(sql_type = Text)]
    pub ssn: String,
    #[diesel(sql_type = Text)]
    pub full_name: String,
    #[diesel(sql_type = Double)]
    pub hours: f64,
}
