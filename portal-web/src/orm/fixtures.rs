//! A small sample company used by unit and integration tests.
//!
//! Departments: Headquarters (1), Administration (4), Research (5).
//! Employees: Borg (HQ manager), Wong (Research manager, supervises Smith),
//! Smith (on ProductX and ProductY, one dependent) and Zelaya (no
//! references at all, so she can be deleted).

use chrono::NaiveDate;
use diesel::sqlite::SqliteConnection;

use crate::models::{NewDepartment, NewDependent, NewEmployee, NewProject};
use crate::orm::department::{insert_department, set_department_manager};
use crate::orm::dependent::insert_dependent;
use crate::orm::employee::insert_employee;
use crate::orm::project::insert_project;
use crate::orm::works_on::add_hours;

/// An employee with the given SSN and department and otherwise fixed data.
pub fn sample_employee(ssn: &str, dno: i32) -> NewEmployee {
    NewEmployee {
        ssn: ssn.to_string(),
        fname: "Sample".to_string(),
        minit: None,
        lname: "Person".to_string(),
        address: "1 Sample Road".to_string(),
        salary: 30000.0,
        sex: None,
        dno,
        super_ssn: None,
        bdate: None,
        empdate: None,
    }
}

fn employee(
    ssn: &str,
    (fname, minit, lname): (&str, &str, &str),
    salary: f64,
    dno: i32,
    super_ssn: Option<&str>,
    bdate: (i32, u32, u32),
) -> NewEmployee {
    NewEmployee {
        ssn: ssn.to_string(),
        fname: fname.to_string(),
        minit: Some(minit.to_string()),
        lname: lname.to_string(),
        address: format!("{} Houston, TX", ssn),
        salary,
        sex: None,
        dno,
        super_ssn: super_ssn.map(str::to_string),
        bdate: NaiveDate::from_ymd_opt(bdate.0, bdate.1, bdate.2),
        empdate: None,
    }
}

/// Loads the sample company. Panics on failure; this is test data.
pub fn seed_company(conn: &mut SqliteConnection) {
    for (dnumber, dname) in [(1, "Headquarters"), (4, "Administration"), (5, "Research")] {
        insert_department(
            conn,
            &NewDepartment {
                dnumber,
                dname: dname.to_string(),
                mgr_ssn: None,
            },
        )
        .expect("insert department");
    }

    let employees = [
        employee("888665555", ("James", "E", "Borg"), 55000.0, 1, None, (1937, 11, 10)),
        employee("333445555", ("Franklin", "T", "Wong"), 40000.0, 5, Some("888665555"), (1955, 12, 8)),
        employee("123456789", ("John", "B", "Smith"), 30000.0, 5, Some("333445555"), (1965, 1, 9)),
        employee("999887777", ("Alicia", "J", "Zelaya"), 25000.0, 4, None, (1968, 1, 19)),
    ];
    for new_employee in &employees {
        insert_employee(conn, new_employee).expect("insert employee");
    }

    set_department_manager(conn, 1, Some("888665555")).expect("set manager");
    set_department_manager(conn, 5, Some("333445555")).expect("set manager");

    for (pnumber, pname, dnum) in [
        (1, "ProductX", 5),
        (2, "ProductY", 5),
        (10, "Computerization", 4),
        (20, "Reorganization", 1),
    ] {
        insert_project(
            conn,
            &NewProject {
                pnumber,
                pname: pname.to_string(),
                dnum,
            },
        )
        .expect("insert project");
    }

    for (essn, pno, hours) in [
        ("123456789", 1, 32.5),
        ("123456789", 2, 7.5),
        ("333445555", 2, 10.0),
        ("333445555", 20, 10.0),
        ("888665555", 20, 5.0),
    ] {
        add_hours(conn, essn, pno, hours).expect("insert works_on");
    }

    for (essn, name, relationship) in [("123456789", "Alice", "Daughter"), ("333445555", "Theodore", "Son")] {
        insert_dependent(
            conn,
            &NewDependent {
                essn: essn.to_string(),
                dependent_name: name.to_string(),
                sex: None,
                bdate: None,
                relationship: Some(relationship.to_string()),
            },
        )
        .expect("insert dependent");
    }
}
