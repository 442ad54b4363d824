use diesel::prelude::*;
use dotenvy::dotenv;
use rocket::Rocket;
use rocket::fairing::AdHoc;

use crate::models::Role;
use crate::orm::DbConn;
use crate::orm::app_user::insert_app_user_if_absent;
use crate::orm::login::hash_password;

/// Add the default admin account if needed.
///
/// Set the default admin username/password based on envars
/// PORTAL_DEFAULT_USERNAME and PORTAL_DEFAULT_PASSWORD.
pub fn admin_init_fairing() -> AdHoc {
    AdHoc::try_on_ignite("Admin User Initialization", |rocket| async {
        dotenv().ok();

        let conn = match get_db_connection(&rocket).await {
            Some(conn) => conn,
            None => return Err(rocket),
        };

        let admin_username = get_admin_username();
        let admin_password = get_admin_password();

        let result = conn
            .run(move |c| create_admin_user_if_needed(c, &admin_username, &admin_password))
            .await;

        match result {
            Ok(()) => Ok(rocket),
            Err(e) => {
                error!("[admin-init] FATAL: Admin user creation failed: {}", e);
                Err(rocket)
            }
        }
    })
}

async fn get_db_connection(rocket: &Rocket<rocket::Build>) -> Option<DbConn> {
    match DbConn::get_one(rocket).await {
        Some(conn) => Some(conn),
        None => {
            error!("[admin-init] ERROR: Could not get DB connection.");
            None
        }
    }
}

fn get_admin_username() -> String {
    std::env::var("PORTAL_DEFAULT_USERNAME").unwrap_or_else(|_| "admin".to_string())
}

fn get_admin_password() -> String {
    std::env::var("PORTAL_DEFAULT_PASSWORD").unwrap_or_else(|_| "test123".to_string())
}

#[derive(Debug, thiserror::Error)]
enum AdminInitError {
    #[error("could not hash password: {0}")]
    Hash(argon2::password_hash::Error),
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
}

fn create_admin_user_if_needed(
    c: &mut SqliteConnection,
    admin_username: &str,
    admin_password: &str,
) -> Result<(), AdminInitError> {
    let passhash = hash_password(admin_password).map_err(AdminInitError::Hash)?;

    if insert_app_user_if_absent(c, admin_username, &passhash, Role::Admin)? {
        info!("[admin-init] Created admin user: '{}'", admin_username);
    } else {
        info!("[admin-init] Admin user '{}' already exists", admin_username);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::app_user::get_app_user_by_username;
    use crate::orm::login::verify_password;
    use crate::orm::testing::setup_test_db;

    #[test]
    fn test_create_admin_user_is_idempotent() {
        let mut conn = setup_test_db();

        create_admin_user_if_needed(&mut conn, "root", "first").expect("first run");
        create_admin_user_if_needed(&mut conn, "root", "second").expect("second run");

        let user = get_app_user_by_username(&mut conn, "root")
            .expect("query")
            .expect("admin exists");
        assert!(user.is_admin());
        // The second run must not overwrite the existing password.
        assert!(verify_password("first", &user.password_hash));
    }
}
