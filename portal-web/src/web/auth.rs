//! Login and logout pages.

use rocket::form::Form;
use rocket::http::{Cookie, CookieJar};
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::{Either, Route};
use rocket_dyn_templates::{Template, context};

use super::flash_view;
use crate::DbConn;
use crate::orm::login::{LoginError, SESSION_COOKIE, process_login};
use crate::orm::logout::revoke_session;
use crate::session_guards::AuthenticatedUser;

#[derive(FromForm)]
pub struct LoginForm {
    #[field(default = String::new())]
    pub username: String,
    #[field(default = String::new())]
    pub password: String,
}

/// Login form. Someone who is already logged in goes straight home.
#[get("/login")]
pub fn login_page(
    user: Option<AuthenticatedUser>,
    flash: Option<FlashMessage<'_>>,
) -> Either<Redirect, Template> {
    if user.is_some() {
        return Either::Left(Redirect::to("/"));
    }
    Either::Right(Template::render(
        "auth/login",
        context! { flash: flash_view(flash) },
    ))
}

/// Checks the credentials and, on success, sets the session cookie.
///
/// Unknown usernames and wrong passwords get the same message.
#[post("/login", data = "<form>")]
pub async fn login(
    db: DbConn,
    cookies: &CookieJar<'_>,
    form: Form<LoginForm>,
) -> Result<Redirect, Flash<Redirect>> {
    match process_login(&db, cookies, &form.username, &form.password).await {
        Ok(user) => {
            info!("'{}' logged in", user.username);
            Ok(Redirect::to("/"))
        }
        Err(LoginError::Database(e)) => {
            error!("Database error during login: {:?}", e);
            Err(Flash::error(
                Redirect::to("/auth/login"),
                LoginError::Database(e).to_string(),
            ))
        }
        Err(e) => {
            info!("Rejected login for '{}': {}", form.username.trim(), e);
            Err(Flash::error(Redirect::to("/auth/login"), e.to_string()))
        }
    }
}

/// Revokes the current session, if any, and returns to the login page.
#[get("/logout")]
pub async fn logout(db: DbConn, cookies: &CookieJar<'_>) -> Flash<Redirect> {
    let cookie_value = cookies.get(SESSION_COOKIE).map(|c| c.value().to_string());

    if let Some(session_id) = cookie_value {
        if let Err(e) = revoke_session(&db, &session_id).await {
            error!("Failed to revoke session: {:?}", e);
        }
        cookies.remove(Cookie::build(SESSION_COOKIE).path("/"));
    }

    Flash::success(Redirect::to("/auth/login"), "You have been logged out.")
}

pub fn routes() -> Vec<Route> {
    routes![login_page, login, logout]
}
