use diesel::{prelude::*, sqlite::SqliteConnection};
use dotenvy::dotenv;
use portal_web::orm::{run_pending_migrations, set_foreign_keys};

/// Opens the database named by `DATABASE_URL` and brings its schema up to date.
pub fn establish_connection() -> Result<SqliteConnection, Box<dyn std::error::Error>> {
    dotenv().ok();
    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?;
    let mut conn = SqliteConnection::establish(&database_url)?;
    set_foreign_keys(&mut conn)?;
    run_pending_migrations(&mut conn);
    Ok(conn)
}
