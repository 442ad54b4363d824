//! Session-based authentication and authorization guards for Rocket routes.
//!
//! Every page except the login form requires a session. The guards fail with
//! `401 Unauthorized` when there is no valid session and `403 Forbidden` when
//! the account lacks the admin role; the catchers registered in `lib.rs` turn
//! those into a redirect to the login page and a flash + redirect home.
//!
//! ```rust
//! use rocket::get;
//! use portal_web::session_guards::{AdminUser, AuthenticatedUser};
//!
//! #[get("/whoami")]
//! fn whoami(user: AuthenticatedUser) -> String {
//!     format!("{} ({})", user.user.username, user.user.role)
//! }
//!
//! #[get("/admin-only")]
//! fn admin_only(admin: AdminUser) -> String {
//!     format!("Admin access granted to {}", admin.user.username)
//! }
//! ```

use chrono::Utc;
use diesel::prelude::*;
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};

use crate::DbConn;
use crate::models::{AppUser, Role, Session};
use crate::orm::app_user::get_app_user;
use crate::orm::login::SESSION_COOKIE;
use crate::schema::sessions;

/// A request guard for routes that require a logged-in user.
///
/// Resolves the `session` cookie to a non-revoked, non-expired row of the
/// sessions table and loads the owning account.
///
/// # Returns
///
/// - `Outcome::Success(AuthenticatedUser)` if the session is valid
/// - `Outcome::Error(Status::Unauthorized)` if the cookie is missing, the
///   session is unknown, revoked or expired, or the account is gone
/// - `Outcome::Error(Status::InternalServerError)` if no database connection
///   could be obtained
#[derive(Debug)]
pub struct AuthenticatedUser {
    pub user: AppUser,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let session_id = match request.cookies().get(SESSION_COOKIE) {
            Some(cookie) => cookie.value().to_string(),
            None => return Outcome::Error((Status::Unauthorized, ())),
        };

        let db = match request.guard::<DbConn>().await {
            Outcome::Success(db) => db,
            _ => return Outcome::Error((Status::InternalServerError, ())),
        };

        let lookup = db
            .run(move |conn| {
                let session = sessions::table
                    .filter(sessions::id.eq(&session_id))
                    .filter(sessions::revoked.eq(false))
                    .filter(
                        sessions::expires_at
                            .is_null()
                            .or(sessions::expires_at.gt(Utc::now().naive_utc())),
                    )
                    .first::<Session>(conn)
                    .optional()?;

                match session {
                    Some(session) => get_app_user(conn, session.user_id),
                    None => Ok(None),
                }
            })
            .await;

        match lookup {
            Ok(Some(user)) => Outcome::Success(AuthenticatedUser { user }),
            Ok(None) => Outcome::Error((Status::Unauthorized, ())),
            Err(e) => {
                error!("Database error resolving session: {:?}", e);
                Outcome::Error((Status::Unauthorized, ()))
            }
        }
    }
}

impl AuthenticatedUser {
    pub fn role(&self) -> Option<Role> {
        self.user.role()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role() == Some(role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}

/// Macro to create role-specific request guards
macro_rules! create_role_guard {
    ($name:ident, $role:expr) => {
        #[derive(Debug)]
        pub struct $name {
            pub user: AppUser,
        }

        #[rocket::async_trait]
        impl<'r> FromRequest<'r> for $name {
            type Error = ();

            async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
                let auth_user = match AuthenticatedUser::from_request(request).await {
                    Outcome::Success(user) => user,
                    Outcome::Error(e) => return Outcome::Error(e),
                    Outcome::Forward(f) => return Outcome::Forward(f),
                };

                if auth_user.has_role($role) {
                    Outcome::Success($name {
                        user: auth_user.user,
                    })
                } else {
                    info!(
                        "'{}' lacks the {} role for {}",
                        auth_user.user.username,
                        $role,
                        request.uri().path()
                    );
                    Outcome::Error((Status::Forbidden, ()))
                }
            }
        }
    };
}

// A request guard that requires the "admin" role: every route that changes
// data or exports it.
create_role_guard!(AdminUser, Role::Admin);
