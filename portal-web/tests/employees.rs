//! Employee management through the web forms.

mod common;

use rocket::http::Status;

use common::{ADMIN, VIEWER, follow, location, login, portal_client, post_form, with_db};
use portal_web::orm::employee::get_employee;
use portal_web::orm::works_on::get_works_on;

const NEW_EMPLOYEE: &str = "ssn=555667777&fname=Joyce&minit=A&lname=English\
    &address=5631+Rice+Houston&salary=25000&dno=5&super_ssn=333445555&bdate=1972-07-31";

#[rocket::async_test]
async fn test_manage_lists_employees_for_viewer() {
    let client = portal_client().await;
    let session = login(&client, VIEWER).await;

    let response = client.get("/employees/manage").cookie(session).dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let html = response.into_string().await.expect("body");
    assert!(html.contains("Zelaya"));
    assert!(!html.contains("Add employee"), "viewers get no admin links");
}

#[rocket::async_test]
async fn test_admin_adds_employee() {
    let client = portal_client().await;
    let session = login(&client, ADMIN).await;

    let response = post_form(&client, "/employees/add", &session, NEW_EMPLOYEE).await;
    assert_eq!(location(&response).as_deref(), Some("/employees/manage"));
    let html = follow(&client, response, &session).await;
    assert!(html.contains("Employee added successfully"));

    let stored = with_db(&client, |conn| get_employee(conn, "555667777"))
        .await
        .expect("query")
        .expect("employee stored");
    assert_eq!(stored.super_ssn.as_deref(), Some("333445555"));
    assert_eq!(stored.salary, 25000.0);
}

#[rocket::async_test]
async fn test_add_employee_errors() {
    let client = portal_client().await;
    let session = login(&client, ADMIN).await;

    let duplicate = NEW_EMPLOYEE.replace("ssn=555667777", "ssn=123456789");
    let response = post_form(&client, "/employees/add", &session, &duplicate).await;
    assert_eq!(location(&response).as_deref(), Some("/employees/add"));
    let html = follow(&client, response, &session).await;
    assert!(html.contains("Error: SSN must be unique"));

    let bad_department = NEW_EMPLOYEE.replace("dno=5", "dno=42");
    let response = post_form(&client, "/employees/add", &session, &bad_department).await;
    let html = follow(&client, response, &session).await;
    assert!(html.contains("Error: Invalid department number or supervisor SSN"));

    let bad_salary = NEW_EMPLOYEE.replace("salary=25000", "salary=-1");
    let response = post_form(&client, "/employees/add", &session, &bad_salary).await;
    let html = follow(&client, response, &session).await;
    assert!(html.contains("Salary must be positive"));

    let nothing_stored = with_db(&client, |conn| get_employee(conn, "555667777"))
        .await
        .expect("query");
    assert!(nothing_stored.is_none());
}

#[rocket::async_test]
async fn test_admin_edits_employee() {
    let client = portal_client().await;
    let session = login(&client, ADMIN).await;

    let response = client
        .get("/employees/edit/999887777")
        .cookie(session.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    assert!(response.into_string().await.expect("body").contains("Alicia J. Zelaya"));

    let response = post_form(
        &client,
        "/employees/edit/999887777",
        &session,
        "address=3321+Castle+Spring&salary=26000&dno=5",
    )
    .await;
    let html = follow(&client, response, &session).await;
    assert!(html.contains("Employee updated successfully"));

    let stored = with_db(&client, |conn| get_employee(conn, "999887777"))
        .await
        .expect("query")
        .expect("employee");
    assert_eq!(stored.dno, 5);
    assert_eq!(stored.address, "3321 Castle Spring");
}

#[rocket::async_test]
async fn test_edit_unknown_employee() {
    let client = portal_client().await;
    let session = login(&client, ADMIN).await;

    let response = client
        .get("/employees/edit/000000000")
        .cookie(session.clone())
        .dispatch()
        .await;
    assert_eq!(location(&response).as_deref(), Some("/employees/manage"));
    let html = follow(&client, response, &session).await;
    assert!(html.contains("Employee not found"));
}

#[rocket::async_test]
async fn test_delete_referenced_employee_keeps_rows() {
    let client = portal_client().await;
    let session = login(&client, ADMIN).await;

    // Smith works on two projects and has a dependent.
    let response = post_form(&client, "/employees/delete/123456789", &session, "").await;
    assert_eq!(location(&response).as_deref(), Some("/employees/manage"));
    let html = follow(&client, response, &session).await;
    assert!(html.contains("Cannot delete employee: They are still assigned to projects"));

    let (employee, assignment) = with_db(&client, |conn| {
        (
            get_employee(conn, "123456789").expect("query"),
            get_works_on(conn, "123456789", 1).expect("query"),
        )
    })
    .await;
    assert!(employee.is_some());
    assert_eq!(assignment.map(|w| w.hours), Some(32.5));

    // Borg only manages a department and supervises Wong.
    let response = post_form(&client, "/employees/delete/888665555", &session, "").await;
    let html = follow(&client, response, &session).await;
    assert!(html.contains("Cannot delete employee"));
}

#[rocket::async_test]
async fn test_delete_unreferenced_employee() {
    let client = portal_client().await;
    let session = login(&client, ADMIN).await;

    let response = post_form(&client, "/employees/delete/999887777", &session, "").await;
    let html = follow(&client, response, &session).await;
    assert!(html.contains("Employee deleted successfully"));

    let gone = with_db(&client, |conn| get_employee(conn, "999887777"))
        .await
        .expect("query");
    assert!(gone.is_none());
}

#[rocket::async_test]
async fn test_viewer_cannot_change_employees() {
    let client = portal_client().await;
    let session = login(&client, VIEWER).await;

    for page in ["/employees/add", "/employees/edit/999887777"] {
        let response = client.get(page).cookie(session.clone()).dispatch().await;
        assert_eq!(response.status(), Status::SeeOther, "GET {}", page);
        assert_eq!(location(&response).as_deref(), Some("/"), "GET {}", page);
        let html = follow(&client, response, &session).await;
        assert!(html.contains("You do not have permission to perform that action."));
    }

    for (uri, body) in [
        ("/employees/add", NEW_EMPLOYEE),
        ("/employees/edit/999887777", "address=Nowhere&salary=1&dno=1"),
        ("/employees/delete/999887777", ""),
    ] {
        let response = post_form(&client, uri, &session, body).await;
        assert_eq!(response.status(), Status::SeeOther, "POST {}", uri);
        assert_eq!(location(&response).as_deref(), Some("/"), "POST {}", uri);
    }

    let untouched = with_db(&client, |conn| get_employee(conn, "999887777"))
        .await
        .expect("query")
        .expect("employee");
    assert_eq!(untouched.dno, 4);
    let not_added = with_db(&client, |conn| get_employee(conn, "555667777"))
        .await
        .expect("query");
    assert!(not_added.is_none());
}
