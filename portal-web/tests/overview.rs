//! Filters on the home page.

mod common;

use rocket::http::Status;

use common::{VIEWER, login, portal_client};

#[rocket::async_test]
async fn test_overview_filters() {
    let client = portal_client().await;
    let session = login(&client, VIEWER).await;

    let response = client
        .get("/?department=5")
        .cookie(session.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let html = response.into_string().await.expect("body");
    assert!(html.contains("Franklin T. Wong"));
    assert!(html.contains("John B. Smith"));
    assert!(!html.contains("Alicia J. Zelaya"));

    let response = client.get("/?name=ZEL").cookie(session.clone()).dispatch().await;
    let html = response.into_string().await.expect("body");
    assert!(html.contains("Alicia J. Zelaya"));
    assert!(!html.contains("John B. Smith"));

    let response = client
        .get("/?name=John+B+Smith")
        .cookie(session.clone())
        .dispatch()
        .await;
    let html = response.into_string().await.expect("body");
    assert!(html.contains("John B. Smith"));
    assert!(!html.contains("Franklin T. Wong"));

    let response = client
        .get("/?name=nobody-by-that-name")
        .cookie(session.clone())
        .dispatch()
        .await;
    let html = response.into_string().await.expect("body");
    assert!(html.contains("No employees match the filters."));
}

#[rocket::async_test]
async fn test_overview_ignores_bad_parameters() {
    let client = portal_client().await;
    let session = login(&client, VIEWER).await;

    let response = client
        .get("/?department=research&sort=salary")
        .cookie(session)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let html = response.into_string().await.expect("body");

    // every employee, full name ascending
    let borg = html.find("James E. Borg").expect("Borg listed");
    let smith = html.find("John B. Smith").expect("Smith listed");
    let wong = html.find("Franklin T. Wong").expect("Wong listed");
    let zelaya = html.find("Alicia J. Zelaya").expect("Zelaya listed");
    assert!(zelaya < wong && wong < borg && borg < smith);
}
