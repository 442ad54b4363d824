use std::sync::Mutex;

use diesel::connection::SimpleConnection;
use diesel::sqlite::SqliteConnection;
use rocket::fairing::AdHoc;
use rocket::figment::{
    util::map,
    value::{Map, Value},
};
use rocket::{Build, Rocket};
use rocket_sync_db_pools::diesel;

use super::db::{DbConn, run_pending_migrations, set_foreign_keys};
use crate::admin_init_fairing::admin_init_fairing;

/// Configures SQLite with performance-optimized settings for testing.
///
/// These settings make SQLite faster but less durable - only use for testing.
fn set_sqlite_test_pragmas(conn: &mut diesel::SqliteConnection) {
    conn.batch_execute(
        r#"
        PRAGMA synchronous = OFF;
        PRAGMA journal_mode = OFF;
        "#,
    )
    .expect("Failed to set SQLite PRAGMAs");
}

fn set_sqlite_test_pragmas_fairing() -> AdHoc {
    AdHoc::on_ignite("Set SQLite Test Pragmas", |rocket| async {
        let conn = DbConn::get_one(&rocket)
            .await
            .expect("database connection for test pragmas");
        conn.run(|c| {
            set_sqlite_test_pragmas(c);
        })
        .await;
        rocket
    })
}

/// Creates and configures a Rocket instance for testing with an in-memory SQLite database.
///
/// The returned Rocket instance will have:
/// - A uniquely named shared-cache in-memory database, so every pooled
///   connection of this instance sees the same data
/// - Migrations run and the default admin account created
/// - Templates loaded from this crate's `templates` directory
/// - All portal routes and catchers mounted
pub fn test_rocket() -> Rocket<Build> {
    use uuid::Uuid;

    let unique_db_name = format!("file:portal_test_{}?mode=memory&cache=shared", Uuid::new_v4());

    let db_config: Map<_, Value> = map! {
        "url" => unique_db_name.into(),
        "pool_size" => 5.into(),
        "timeout" => 5.into(),
    };

    let figment = rocket::Config::figment()
        .merge(("databases", map!["portal_db" => db_config]))
        .merge((
            "template_dir",
            concat!(env!("CARGO_MANIFEST_DIR"), "/templates"),
        ));

    let rocket = rocket::custom(figment)
        .attach(DbConn::fairing())
        .attach(set_sqlite_test_pragmas_fairing())
        .attach(super::db::run_migrations_fairing())
        .attach(admin_init_fairing());
    crate::mount_portal(rocket)
}

/// Creates a synchronous in-memory SQLite database connection for unit tests.
///
/// Runs all embedded migrations and enables foreign key support. Each call
/// returns a new, independent database.
pub fn setup_test_db() -> SqliteConnection {
    use diesel::Connection;

    let mut conn = SqliteConnection::establish(":memory:")
        .expect("Failed to create in-memory SQLite database");
    set_foreign_keys(&mut conn).expect("Could not enable foreign keys");
    run_pending_migrations(&mut conn);
    conn
}

/// An async-compatible wrapper around a synchronous SQLite connection.
///
/// Lets unit tests drive functions written against [`DbRunner`](super::login::DbRunner)
/// (the Rocket-style `.run()` interface) with a connection from
/// [`setup_test_db`].
pub struct FakeDbConn<'a>(Mutex<&'a mut diesel::SqliteConnection>);

impl<'a> FakeDbConn<'a> {
    /// Executes a closure with exclusive access to the wrapped connection.
    pub async fn run<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static,
    {
        let mut guard = self.0.lock().expect("test connection mutex poisoned");
        f(&mut **guard)
    }
}

/// Creates a `FakeDbConn` for async-style testing with the given SQLite connection.
pub fn setup_test_dbconn<'a>(conn: &'a mut diesel::SqliteConnection) -> FakeDbConn<'a> {
    FakeDbConn(Mutex::new(conn))
}
