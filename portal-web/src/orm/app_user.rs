//! Account management for `app_user`.
//!
//! Web handlers only read accounts; these writers serve the startup fairing
//! and the admin CLI.

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::models::{AppUser, NewAppUser, Role};
use crate::schema::app_user::dsl::*;

pub fn get_app_user_by_username(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<Option<AppUser>, diesel::result::Error> {
    app_user
        .filter(username.eq(name))
        .select(AppUser::as_select())
        .first(conn)
        .optional()
}

pub fn get_app_user(
    conn: &mut SqliteConnection,
    user_id: i32,
) -> Result<Option<AppUser>, diesel::result::Error> {
    app_user
        .find(user_id)
        .select(AppUser::as_select())
        .first(conn)
        .optional()
}

/// Returns all accounts ordered by username.
pub fn list_app_users(conn: &mut SqliteConnection) -> Result<Vec<AppUser>, diesel::result::Error> {
    app_user
        .order(username.asc())
        .select(AppUser::as_select())
        .load(conn)
}

/// Inserts an account with an already-hashed password.
pub fn insert_app_user(
    conn: &mut SqliteConnection,
    name: &str,
    hash: &str,
    user_role: Role,
) -> Result<AppUser, diesel::result::Error> {
    let new_user = NewAppUser {
        username: name.to_string(),
        password_hash: hash.to_string(),
        role: user_role.as_str().to_string(),
    };

    diesel::insert_into(app_user)
        .values(&new_user)
        .execute(conn)?;

    app_user
        .filter(username.eq(name))
        .select(AppUser::as_select())
        .first(conn)
}

/// Inserts an account unless the username is already taken.
///
/// # Returns
/// * `Ok(true)` - The account was created
/// * `Ok(false)` - An account with that username already existed
pub fn insert_app_user_if_absent(
    conn: &mut SqliteConnection,
    name: &str,
    hash: &str,
    user_role: Role,
) -> Result<bool, diesel::result::Error> {
    let new_user = NewAppUser {
        username: name.to_string(),
        password_hash: hash.to_string(),
        role: user_role.as_str().to_string(),
    };

    let inserted = diesel::insert_into(app_user)
        .values(&new_user)
        .on_conflict(username)
        .do_nothing()
        .execute(conn)?;
    Ok(inserted == 1)
}

pub fn update_password_hash(
    conn: &mut SqliteConnection,
    name: &str,
    hash: &str,
) -> Result<usize, diesel::result::Error> {
    diesel::update(app_user.filter(username.eq(name)))
        .set(password_hash.eq(hash))
        .execute(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::testing::setup_test_db;

    #[test]
    fn test_insert_and_find_app_user() {
        let mut conn = setup_test_db();

        let created = insert_app_user(&mut conn, "ada", "hash", Role::Admin).expect("insert");
        assert!(created.id > 0);
        assert!(created.is_admin());

        let found = get_app_user_by_username(&mut conn, "ada")
            .expect("query")
            .expect("user exists");
        assert_eq!(found.id, created.id);
        assert_eq!(found.role(), Some(Role::Admin));

        let by_id = get_app_user(&mut conn, created.id).expect("query");
        assert!(by_id.is_some());
    }

    #[test]
    fn test_insert_if_absent_keeps_existing_account() {
        let mut conn = setup_test_db();

        assert!(insert_app_user_if_absent(&mut conn, "viewer", "first", Role::Viewer).expect("insert"));
        assert!(!insert_app_user_if_absent(&mut conn, "viewer", "second", Role::Admin).expect("insert"));

        let found = get_app_user_by_username(&mut conn, "viewer")
            .expect("query")
            .expect("user exists");
        assert_eq!(found.password_hash, "first");
        assert_eq!(found.role(), Some(Role::Viewer));
    }

    #[test]
    fn test_duplicate_username_is_rejected() {
        let mut conn = setup_test_db();
        insert_app_user(&mut conn, "ada", "hash", Role::Viewer).expect("insert");
        assert!(insert_app_user(&mut conn, "ada", "hash", Role::Viewer).is_err());
    }

    #[test]
    fn test_update_password_hash() {
        let mut conn = setup_test_db();
        insert_app_user(&mut conn, "ada", "old", Role::Viewer).expect("insert");

        assert_eq!(update_password_hash(&mut conn, "ada", "new").expect("update"), 1);
        assert_eq!(update_password_hash(&mut conn, "ghost", "new").expect("update"), 0);

        let users = list_app_users(&mut conn).expect("list");
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].password_hash, "new");
    }
}
