use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::error::{PortalError, PortalResult};
use crate::models::{Department, DepartmentOverviewRow, NewDepartment};
use crate::schema::department;

/// All departments ordered by name, as shown in dropdowns.
pub fn list_departments(
    conn: &mut SqliteConnection,
) -> Result<Vec<Department>, diesel::result::Error> {
    department::table
        .order(department::dname.asc())
        .select(Department::as_select())
        .load(conn)
}

pub fn get_department(
    conn: &mut SqliteConnection,
    number: i32,
) -> Result<Option<Department>, diesel::result::Error> {
    department::table
        .find(number)
        .select(Department::as_select())
        .first(conn)
        .optional()
}

/// Inserts one department as its own statement.
pub fn insert_department(conn: &mut SqliteConnection, new_department: &NewDepartment) -> PortalResult<()> {
    diesel::insert_into(department::table)
        .values(new_department)
        .execute(conn)
        .map(|_| ())
        .map_err(PortalError::from)
}

pub fn set_department_manager(
    conn: &mut SqliteConnection,
    number: i32,
    manager_ssn: Option<&str>,
) -> PortalResult<()> {
    let affected = diesel::update(department::table.find(number))
        .set(department::mgr_ssn.eq(manager_ssn))
        .execute(conn)
        .map_err(PortalError::from)?;
    if affected == 0 {
        return Err(PortalError::NotFound);
    }
    Ok(())
}

/// Per-department manager name, distinct employee count and total hours
/// worked by the department's employees.
pub fn department_overview(
    conn: &mut SqliteConnection,
) -> Result<Vec<DepartmentOverviewRow>, diesel::result::Error> {
    diesel::sql_query(
        r#"
        SELECT
            d.dname AS department_name,
            d.dnumber AS department_number,
            COALESCE(
                CASE WHEN m.minit IS NULL OR TRIM(m.minit) = ''
                     THEN m.fname || ' ' || m.lname
                     ELSE m.fname || ' ' || m.minit || '. ' || m.lname
                END,
                'N/A'
            ) AS manager_name,
            COUNT(DISTINCT emp.ssn) AS employee_count,
            COALESCE(SUM(w.hours), 0.0) AS total_hours
        FROM department d
        LEFT JOIN employee m ON d.mgr_ssn = m.ssn
        LEFT JOIN employee emp ON d.dnumber = emp.dno
        LEFT JOIN works_on w ON emp.ssn = w.essn
        GROUP BY d.dnumber, d.dname, m.fname, m.minit, m.lname
        ORDER BY d.dname
        "#,
    )
    .load::<DepartmentOverviewRow>(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::fixtures::seed_company;
    use crate::orm::testing::setup_test_db;

    #[test]
    fn test_list_departments_by_name() {
        let mut conn = setup_test_db();
        seed_company(&mut conn);

        let names: Vec<String> = list_departments(&mut conn)
            .expect("list")
            .into_iter()
            .map(|d| d.dname)
            .collect();
        assert_eq!(names, vec!["Administration", "Headquarters", "Research"]);
    }

    #[test]
    fn test_insert_duplicate_department_number() {
        let mut conn = setup_test_db();
        seed_company(&mut conn);

        let dup = NewDepartment {
            dnumber: 5,
            dname: "Another".to_string(),
            mgr_ssn: None,
        };
        let err = insert_department(&mut conn, &dup).unwrap_err();
        assert!(matches!(err, PortalError::Duplicate(_)), "got {:?}", err);
    }

    #[test]
    fn test_insert_department_with_unknown_manager() {
        let mut conn = setup_test_db();
        let dept = NewDepartment {
            dnumber: 9,
            dname: "Ghosts".to_string(),
            mgr_ssn: Some("000000000".to_string()),
        };
        let err = insert_department(&mut conn, &dept).unwrap_err();
        assert!(matches!(err, PortalError::ForeignKey(_)), "got {:?}", err);
        assert!(get_department(&mut conn, 9).expect("query").is_none());
    }

    #[test]
    fn test_department_overview_stats() {
        let mut conn = setup_test_db();
        seed_company(&mut conn);

        let rows = department_overview(&mut conn).expect("overview");
        assert_eq!(rows.len(), 3);

        let research = rows.iter().find(|r| r.department_number == 5).expect("research");
        assert_eq!(research.manager_name, "Franklin T. Wong");
        assert_eq!(research.employee_count, 2);
        assert!((research.total_hours - 60.0).abs() < 1e-9);

        let admin = rows.iter().find(|r| r.department_number == 4).expect("administration");
        assert_eq!(admin.manager_name, "N/A");
        assert_eq!(admin.employee_count, 1);
        assert_eq!(admin.total_hours, 0.0);
    }
}
