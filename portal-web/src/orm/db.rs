use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use rocket::fairing::AdHoc;
use rocket_sync_db_pools::{database, diesel};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Pooled connection to the company database.
///
/// The pool's connection customizer enables `PRAGMA foreign_keys` on every
/// connection it hands out, which is what makes employee deletes fail when
/// the employee is still referenced.
#[database("portal_db")]
pub struct DbConn(diesel::SqliteConnection);

/// Enables foreign key support on a SQLite connection that did not come from
/// the Rocket pool (CLI, unit tests).
///
/// Foreign keys are disabled by default in SQLite for backwards
/// compatibility.
pub fn set_foreign_keys(conn: &mut diesel::SqliteConnection) -> Result<(), diesel::result::Error> {
    use diesel::connection::SimpleConnection;
    conn.batch_execute("PRAGMA foreign_keys = ON")
}

/// Runs all pending database migrations on the provided connection.
///
/// # Panics
/// Panics if any migration fails to run
pub fn run_pending_migrations(conn: &mut diesel::SqliteConnection) {
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run pending migrations");
}

/// Creates a Rocket fairing that runs database migrations on ignition.
pub fn run_migrations_fairing() -> AdHoc {
    AdHoc::on_ignite("Diesel Migrations", |rocket| async {
        let conn = DbConn::get_one(&rocket)
            .await
            .expect("database connection for migration");
        conn.run(|c| {
            run_pending_migrations(c);
        })
        .await;
        rocket
    })
}
