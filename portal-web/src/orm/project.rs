//! Project listing, project detail and the hours report behind them.

use diesel::prelude::*;
use diesel::sql_types::Integer;
use diesel::sqlite::SqliteConnection;

use crate::error::{PortalError, PortalResult};
use crate::models::{AssignmentRow, NewProject, Project, ProjectSummaryRow};
use crate::schema::project;

/// Column the project listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectSortMethod {
    #[default]
    Headcount,
    TotalHours,
    ProjectNumber,
}

impl ProjectSortMethod {
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("total_hours") => ProjectSortMethod::TotalHours,
            Some("project_number") => ProjectSortMethod::ProjectNumber,
            _ => ProjectSortMethod::Headcount,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectSortMethod::Headcount => "headcount",
            ProjectSortMethod::TotalHours => "total_hours",
            ProjectSortMethod::ProjectNumber => "project_number",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Only the exact keywords are accepted, like the listing form sends them.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("DESC") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Whitelisted ordering for the project listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProjectSort {
    pub method: ProjectSortMethod,
    pub direction: SortDirection,
}

impl ProjectSort {
    pub fn from_params(method: Option<&str>, direction: Option<&str>) -> Self {
        ProjectSort {
            method: ProjectSortMethod::from_param(method),
            direction: SortDirection::from_param(direction),
        }
    }

    fn order_by_clause(&self) -> String {
        format!("{} {}", self.method.as_str(), self.direction.as_str())
    }
}

/// Project listing: owning department, headcount and total hours.
///
/// Ties are broken by project number so the order is stable.
pub fn project_summaries(
    conn: &mut SqliteConnection,
    sort: ProjectSort,
) -> Result<Vec<ProjectSummaryRow>, diesel::result::Error> {
    let sql = format!(
        r#"
        SELECT
            p.pnumber AS project_number,
            p.pname AS project_name,
            d.dname AS owning_department,
            COUNT(w.essn) AS headcount,
            COALESCE(SUM(w.hours), 0.0) AS total_hours
        FROM project p
        JOIN department d ON p.dnum = d.dnumber
        LEFT JOIN works_on w ON p.pnumber = w.pno
        GROUP BY p.pnumber, p.pname, d.dname
        ORDER BY {}, project_number ASC
        "#,
        sort.order_by_clause()
    );

    diesel::sql_query(sql).load::<ProjectSummaryRow>(conn)
}

pub fn get_project(
    conn: &mut SqliteConnection,
    number: i32,
) -> Result<Option<Project>, diesel::result::Error> {
    project::table
        .find(number)
        .select(Project::as_select())
        .first(conn)
        .optional()
}

pub fn insert_project(conn: &mut SqliteConnection, new_project: &NewProject) -> PortalResult<()> {
    diesel::insert_into(project::table)
        .values(new_project)
        .execute(conn)
        .map(|_| ())
        .map_err(PortalError::from)
}

/// Employees assigned to a project with their accumulated hours, by name.
pub fn project_assignments(
    conn: &mut SqliteConnection,
    number: i32,
) -> Result<Vec<AssignmentRow>, diesel::result::Error> {
    diesel::sql_query(
        r#"
        SELECT
            e.ssn AS ssn,
            CASE WHEN e.minit IS NULL OR TRIM(e.minit) = ''
                 THEN e.fname || ' ' || e.lname
                 ELSE e.fname || ' ' || e.minit || '. ' || e.lname
            END AS full_name,
            w.hours AS hours
        FROM works_on w
        JOIN employee e ON e.ssn = w.essn
        WHERE w.pno = ?
        ORDER BY e.lname, e.fname, e.ssn
        "#,
    )
    .bind::<Integer, _>(number)
    .load::<AssignmentRow>(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::fixtures::seed_company;
    use crate::orm::testing::setup_test_db;

    fn numbers(rows: &[ProjectSummaryRow]) -> Vec<i32> {
        rows.iter().map(|r| r.project_number).collect()
    }

    #[test]
    fn test_sort_whitelist_falls_back() {
        let sort = ProjectSort::from_params(Some("pname; DROP TABLE project"), Some("sideways"));
        assert_eq!(sort, ProjectSort::default());

        let sort = ProjectSort::from_params(Some("project_number"), Some("DESC"));
        assert_eq!(sort.method, ProjectSortMethod::ProjectNumber);
        assert_eq!(sort.direction, SortDirection::Desc);

        // Direction keywords are matched exactly.
        assert_eq!(SortDirection::from_param(Some("desc")), SortDirection::Asc);
    }

    #[test]
    fn test_project_summaries_default_order() {
        let mut conn = setup_test_db();
        seed_company(&mut conn);

        let rows = project_summaries(&mut conn, ProjectSort::default()).expect("summaries");
        // headcount ASC, then project number
        assert_eq!(numbers(&rows), vec![10, 1, 2, 20]);

        let product_y = rows.iter().find(|r| r.project_number == 2).expect("ProductY");
        assert_eq!(product_y.owning_department, "Research");
        assert_eq!(product_y.headcount, 2);
        assert!((product_y.total_hours - 17.5).abs() < 1e-9);

        let computerization = rows.iter().find(|r| r.project_number == 10).expect("Computerization");
        assert_eq!(computerization.headcount, 0);
        assert_eq!(computerization.total_hours, 0.0);
    }

    #[test]
    fn test_project_summaries_by_hours_desc() {
        let mut conn = setup_test_db();
        seed_company(&mut conn);

        let sort = ProjectSort::from_params(Some("total_hours"), Some("DESC"));
        let rows = project_summaries(&mut conn, sort).expect("summaries");
        assert_eq!(numbers(&rows), vec![1, 2, 20, 10]);
    }

    #[test]
    fn test_project_assignments() {
        let mut conn = setup_test_db();
        seed_company(&mut conn);

        let rows = project_assignments(&mut conn, 2).expect("assignments");
        let names: Vec<&str> = rows.iter().map(|r| r.full_name.as_str()).collect();
        assert_eq!(names, vec!["John B. Smith", "Franklin T. Wong"]);

        assert!(project_assignments(&mut conn, 10).expect("assignments").is_empty());
        assert!(get_project(&mut conn, 999).expect("query").is_none());
    }
}
