pub mod app_user;
mod db;
pub mod department;
pub mod dependent;
pub mod employee;
pub mod fixtures;
pub mod login;
pub mod logout;
pub mod project;
pub mod testing;
pub mod works_on;

pub use db::*;
