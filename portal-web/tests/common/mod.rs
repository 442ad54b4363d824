//! Helpers shared by the integration tests.
//!
//! Every client gets its own in-memory database holding the sample company,
//! the default `admin` account created at ignition and a `viewer` account.

#![allow(dead_code)]

use rocket::http::{ContentType, Cookie, Status};
use rocket::local::asynchronous::{Client, LocalResponse};

use portal_web::DbConn;
use portal_web::models::Role;
use portal_web::orm::app_user::insert_app_user;
use portal_web::orm::fixtures::seed_company;
use portal_web::orm::login::hash_password;
use portal_web::orm::testing::test_rocket;

pub const ADMIN: (&str, &str) = ("admin", "test123");
pub const VIEWER: (&str, &str) = ("viewer", "viewer123");

pub async fn portal_client() -> Client {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");

    let db = DbConn::get_one(client.rocket())
        .await
        .expect("database connection");
    db.run(|conn| {
        seed_company(conn);
        let hash = hash_password(VIEWER.1).expect("hash viewer password");
        insert_app_user(conn, VIEWER.0, &hash, Role::Viewer).expect("insert viewer");
    })
    .await;

    client
}

/// Runs a closure against the client's database.
pub async fn with_db<F, R>(client: &Client, f: F) -> R
where
    F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
    R: Send + 'static,
{
    DbConn::get_one(client.rocket())
        .await
        .expect("database connection")
        .run(f)
        .await
}

/// Posts the login form and returns the session cookie.
pub async fn login(client: &Client, (username, password): (&str, &str)) -> Cookie<'static> {
    let response = client
        .post("/auth/login")
        .header(ContentType::Form)
        .body(format!("username={}&password={}", username, password))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::SeeOther, "login as {}", username);
    assert_eq!(response.headers().get_one("Location"), Some("/"));
    response
        .cookies()
        .get("session")
        .expect("session cookie should be set")
        .clone()
        .into_owned()
}

pub fn location(response: &LocalResponse<'_>) -> Option<String> {
    response.headers().get_one("Location").map(str::to_string)
}

/// Follows a redirect with the given session and returns the page body.
///
/// The tracked client carries the flash cookie along, so the page shows the
/// message set by the redirecting handler.
pub async fn follow(client: &Client, response: LocalResponse<'_>, session: &Cookie<'static>) -> String {
    assert_eq!(response.status(), Status::SeeOther);
    let target = location(&response).expect("redirect location");
    drop(response);

    let page = client.get(target).cookie(session.clone()).dispatch().await;
    assert_eq!(page.status(), Status::Ok);
    page.into_string().await.expect("page body")
}

/// Posts a urlencoded form with the given session.
pub async fn post_form<'c>(
    client: &'c Client,
    uri: &str,
    session: &Cookie<'static>,
    body: &str,
) -> LocalResponse<'c> {
    client
        .post(uri.to_string())
        .header(ContentType::Form)
        .cookie(session.clone())
        .body(body.to_string())
        .dispatch()
        .await
}
