//! HTML pages and form handlers.
//!
//! Each submodule owns one area of the portal and exposes `routes()`; they
//! are mounted under their prefixes by [`mount`]. Handlers follow the
//! post/redirect/get pattern: a form submission answers with a redirect and a
//! flash message, never with a rendered page.

use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::{Build, Rocket};
use serde::Serialize;

use crate::error::UNEXPECTED_ERROR_MESSAGE;
use crate::models::AppUser;

pub mod auth;
pub mod employees;
pub mod managers;
pub mod overview;
pub mod projects;

pub fn mount(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .mount("/", overview::routes())
        .mount("/auth", auth::routes())
        .mount("/employees", employees::routes())
        .mount("/projects", projects::routes())
        .mount("/managers", managers::routes())
}

/// A flash message as the templates see it. Multi-line messages (the import
/// summary) are split so each line renders on its own.
#[derive(Debug, Serialize)]
pub struct FlashView {
    pub kind: String,
    pub lines: Vec<String>,
}

pub fn flash_view(flash: Option<FlashMessage<'_>>) -> Option<FlashView> {
    flash.map(|f| FlashView {
        kind: f.kind().to_string(),
        lines: f.message().lines().map(str::to_string).collect(),
    })
}

/// The logged-in account as the navigation bar sees it.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub username: String,
    pub is_admin: bool,
}

impl From<&AppUser> for UserView {
    fn from(user: &AppUser) -> Self {
        UserView {
            username: user.username.clone(),
            is_admin: user.is_admin(),
        }
    }
}

/// Logs a failure the user is not told about and flashes the generic message.
pub fn unexpected_error(
    context: &str,
    err: impl std::fmt::Debug,
    redirect_to: impl Into<String>,
) -> Flash<Redirect> {
    error!("{}: {:?}", context, err);
    Flash::error(Redirect::to(redirect_to.into()), UNEXPECTED_ERROR_MESSAGE)
}

/// Treats a blank form value as absent.
pub fn non_blank(value: &str) -> Option<&str> {
    let value = value.trim();
    if value.is_empty() { None } else { Some(value) }
}
