//! Database operations for user authentication and session management.
//!
//! This module provides the login workflow: credential lookup against
//! `app_user`, Argon2 password verification, session creation and the session
//! cookie. It is written against the [`DbRunner`] trait so the same code runs
//! on the Rocket pool and on the in-memory test connection.

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{self, PasswordHash, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use diesel::prelude::*;
use rocket::http::{Cookie, CookieJar, SameSite};
use thiserror::Error;
use uuid::Uuid;

use crate::DbConn;
use crate::models::{AppUser, NewSession};
use crate::orm::testing::FakeDbConn;
use crate::schema::{app_user, sessions};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";

/// Trait for abstracting database operations to support both production and testing.
///
/// This trait allows the same functions to work with both `DbConn` (production)
/// and `FakeDbConn` (testing) by providing a unified interface for database operations.
pub trait DbRunner {
    fn run<F, R>(&self, f: F) -> impl std::future::Future<Output = R>
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static;
}

impl DbRunner for DbConn {
    fn run<F, R>(&self, f: F) -> impl std::future::Future<Output = R>
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static,
    {
        DbConn::run(self, f)
    }
}

impl<'a> DbRunner for FakeDbConn<'a> {
    fn run<F, R>(&self, f: F) -> impl std::future::Future<Output = R>
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static,
    {
        FakeDbConn::run(self, f)
    }
}

/// Why a login attempt was rejected. The `Display` text is what the user sees.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Username and password are required.")]
    MissingCredentials,
    #[error("Invalid username or password.")]
    InvalidCredentials,
    #[error("An unexpected error occurred. Please try again.")]
    Database(#[from] diesel::result::Error),
}

/// Generates a new UUID-based session token.
fn generate_session_token() -> String {
    Uuid::new_v4().to_string()
}

/// Finds an account by username.
///
/// # Returns
/// * `Ok(Some(AppUser))` - Account found
/// * `Ok(None)` - No account with that username
/// * `Err(diesel::result::Error)` - Database query failed
pub async fn find_user_by_username<D: DbRunner>(
    db: &D,
    username: &str,
) -> Result<Option<AppUser>, diesel::result::Error> {
    let username = username.to_owned();
    db.run(move |conn| {
        app_user::table
            .filter(app_user::username.eq(username))
            .select(AppUser::as_select())
            .first(conn)
            .optional()
    })
    .await
}

/// Verifies a password against a stored Argon2 hash.
///
/// Returns `false` both for a wrong password and for a hash that cannot be
/// parsed, so a corrupt row simply cannot log in.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(e) => {
            warn!("Stored password hash could not be parsed: {}", e);
            false
        }
    }
}

/// Creates a new session row and returns its token.
pub async fn create_and_store_session<D: DbRunner>(
    db: &D,
    user_id: i32,
) -> Result<String, diesel::result::Error> {
    let session_token = generate_session_token();
    let now = Utc::now().naive_utc();

    let new_session = NewSession {
        id: session_token.clone(),
        user_id,
        created_at: now,
        expires_at: None,
        revoked: false,
    };

    db.run(move |conn| {
        diesel::insert_into(sessions::table)
            .values(&new_session)
            .execute(conn)
    })
    .await?;

    Ok(session_token)
}

/// Builds the session cookie: HTTP-only, SameSite=Lax, secure outside tests.
pub fn session_cookie(session_token: &str) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session_token.to_string()))
        .http_only(true)
        .secure(!cfg!(test))
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

/// Runs the complete login workflow.
///
/// Validates the input, finds the account, verifies the password, creates a
/// session and sets the session cookie. Unknown usernames and wrong passwords
/// produce the same error.
pub async fn process_login<D: DbRunner>(
    db: &D,
    cookies: &CookieJar<'_>,
    username: &str,
    password: &str,
) -> Result<AppUser, LoginError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(LoginError::MissingCredentials);
    }

    let user = find_user_by_username(db, username)
        .await?
        .ok_or(LoginError::InvalidCredentials)?;

    if !verify_password(password, &user.password_hash) {
        return Err(LoginError::InvalidCredentials);
    }

    let session_token = create_and_store_session(db, user.id).await?;
    cookies.add(session_cookie(&session_token));

    Ok(user)
}

/// Hashes a password using Argon2 with a random salt.
pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}
