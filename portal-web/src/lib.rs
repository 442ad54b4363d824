#[macro_use]
extern crate rocket;

use rocket::figment::value::{Map, Value};
use rocket::figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{Flash, Redirect};
use rocket::{Build, Rocket};
use rocket_dyn_templates::{Template, context};

pub mod admin_init_fairing;
pub mod error;
pub mod export;
pub mod import;
pub mod models;
pub mod orm;
pub use orm::DbConn;
pub mod schema;
pub mod session_guards;
pub mod web;

pub const PERMISSION_DENIED_MESSAGE: &str = "You do not have permission to perform that action.";

/// No valid session: send the browser to the login page.
#[catch(401)]
fn unauthorized() -> Redirect {
    Redirect::to("/auth/login")
}

/// Logged in, but not an admin.
#[catch(403)]
fn forbidden(req: &Request) -> Flash<Redirect> {
    info!("Permission denied for {}", req.uri().path());
    Flash::error(Redirect::to("/"), PERMISSION_DENIED_MESSAGE)
}

#[catch(default)]
fn default_catcher(status: Status, req: &Request) -> Template {
    if status.code >= 500 {
        error!("{} while serving {}", status, req.uri().path());
    }
    Template::render(
        "error",
        context! {
            code: status.code,
            reason: status.reason().unwrap_or("Unknown Error"),
            path: req.uri().path().to_string(),
        },
    )
}

/// Attaches the template engine, mounts every page and registers the
/// catchers. Shared by [`rocket`] and the test instance.
pub fn mount_portal(rocket: Rocket<Build>) -> Rocket<Build> {
    web::mount(rocket.attach(Template::fairing())).register(
        "/",
        catchers![unauthorized, forbidden, default_catcher],
    )
}

fn log_rocket_info(rocket: &Rocket<Build>) {
    let figment = rocket.figment();

    if let Ok(address) = figment.extract_inner::<String>("address") {
        info!("Rocket is running at: {}", address);
    }

    if let Ok(port) = figment.extract_inner::<u16>("port") {
        info!("Rocket is listening on port: {}", port);
    }

    if let Ok(dir) = figment.extract_inner::<String>("template_dir") {
        info!("Templates loaded from: {}", dir);
    }

    match figment.extract_inner::<Map<String, Value>>("databases.portal_db") {
        Ok(db_config) => {
            if let Some(Value::String(_, url)) = db_config.get("url") {
                info!("Database URL: {}", url);
            } else {
                warn!("Database URL not found in configuration");
            }
        }
        Err(e) => {
            warn!("Failed to extract database configuration: {}", e);
        }
    }
}

/// Builds the production instance.
///
/// Configuration comes from `Rocket.toml` and `ROCKET_*` variables; the
/// database location always comes from `DATABASE_URL` (a `.env` file is
/// honored). Tests use `orm::testing::test_rocket` instead.
pub fn rocket() -> Rocket<Build> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let figment = Figment::from(rocket::Config::default())
        .merge(Toml::file("Rocket.toml").nested())
        .merge(Env::prefixed("ROCKET_").global())
        .merge(("databases.portal_db.url", database_url));

    let rocket = rocket::custom(figment)
        .attach(DbConn::fairing())
        .attach(orm::run_migrations_fairing())
        .attach(admin_init_fairing::admin_init_fairing());

    log_rocket_info(&rocket);

    mount_portal(rocket)
}
